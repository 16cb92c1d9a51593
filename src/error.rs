use thiserror::Error;

/// Failures reported by the LenZu codec.
///
/// Every variant is terminal for the call that produced it. The caller
/// decides whether to propagate the failure or skip the file.
#[derive(Error, Debug)]
pub enum LenZuError {
    /// Bad magic or a buffer too short to hold the preamble.
    #[error("header invalid: {0}")]
    HeaderInvalid(String),

    /// A compressor option is outside its range or the options are
    /// inconsistent with each other.
    #[error("compressor options out of range: {0}")]
    OptionsOutOfRange(String),

    /// A bit or byte read ran past the end of the input.
    #[error("truncated stream at byte {offset}")]
    TruncatedStream { offset: usize },

    /// A bit sequence did not resolve to any path in the Huffman table.
    #[error("corrupt huffman code at byte {offset}")]
    CorruptHuffmanCode { offset: usize },

    /// A backreference pointed before the start of the output.
    #[error("backreference distance {distance} reaches before output start at {position}")]
    InvalidBackreference { distance: usize, position: usize },

    /// The decoded bytes do not match the checksum stored in the header.
    #[error("checksum mismatch (expected {expected:016x}, got {actual:016x})")]
    ChecksumMismatch { expected: u64, actual: u64 },

    /// The declared length exceeds the caller's budget or could not be
    /// allocated.
    #[error("allocation of {requested} bytes refused (limit {limit})")]
    AllocationRefused { requested: usize, limit: usize },

    /// Propagated I/O error from a reader or writer entry point.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LenZuError {
    /// True for the variants the decoder raises on a damaged bitstream.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            LenZuError::TruncatedStream { .. }
                | LenZuError::CorruptHuffmanCode { .. }
                | LenZuError::InvalidBackreference { .. }
                | LenZuError::ChecksumMismatch { .. }
        )
    }
}
