use crate::options::CompressorOptions;
use crate::LenZuError;

/// Default ceiling on the declared output length of a single stream.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 512 * 1024 * 1024;

/// Runtime parameters for the decompressor.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Largest declared length the decoder will allocate for. Streams
    /// announcing more fail with `AllocationRefused`.
    pub max_output_len: usize,
    /// Compare the output against the header checksum.
    pub verify_checksum: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
            verify_checksum: true,
        }
    }
}

/// Runtime parameters for the no-op encoder.
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// Table bit count written into the options. Blocks hold
    /// `2^huff_bit_count` bytes.
    pub huff_bit_count: u8,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self { huff_bit_count: 7 }
    }
}

impl EncodeConfig {
    /// Option bytes the encoder writes: every bit count set to
    /// `huff_bit_count`, no low distance bits, base distance 2. A bit count
    /// outside 3..=15 is `OptionsOutOfRange`.
    pub fn compressor_options(&self) -> Result<CompressorOptions, LenZuError> {
        let bits = self.huff_bit_count;
        let mut options = CompressorOptions::new(bits, bits, bits, 0, 2)?;
        options.reserved = bits;
        Ok(options)
    }
}
