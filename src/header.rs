//! Fixed preamble of a LenZu stream.
//!
//! ```text
//! 0x00  16  magic "LenZuCompressor\0"
//! 0x10  16  version tail (opaque)
//! 0x20   4  decompressed length, u32 LE
//! 0x24   4  checksum high half, u32 LE
//! 0x28   4  checksum low half, u32 LE
//! 0x2C   4  reserved
//! 0x30   6  compressor options
//! 0x36      bitstream
//! ```

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::LenZuError;

pub const MAGIC: [u8; 16] = *b"LenZuCompressor\0";
/// Version tail written by the reference encoder.
pub const DEFAULT_VERSION: [u8; 16] = *b"1\0\0\x000\0\0\0\0\0\0\0\0\0\0\0";

/// Size of the fixed header fields, up to the compressor options.
pub const HEADER_SIZE: usize = 0x30;
pub const OPTIONS_OFFSET: usize = 0x30;
pub const BITSTREAM_OFFSET: usize = 0x36;
/// Smallest buffer that can hold a header, options and a table count.
pub const MIN_STREAM_LEN: usize = 0x37;
/// Offset of the checksum halves, patched after encoding.
pub const CHECKSUM_OFFSET: usize = 0x24;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RawHeader {
    magic: [u8; 16],
    version: [u8; 16],
    decompressed_length: [u8; 4],
    checksum_hi: [u8; 4],
    checksum_lo: [u8; 4],
    reserved: [u8; 4],
}

/// Parsed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Bytes 0x10..0x20, carried through verbatim.
    pub version: [u8; 16],
    /// Output size announced by the stream. Untrusted until checked against
    /// a budget.
    pub decompressed_length: u32,
    pub checksum: u64,
}

impl Header {
    /// Header with the reference version tail and a zero checksum, to be
    /// patched once the output checksum is known.
    pub fn new(decompressed_length: u32) -> Self {
        Self {
            version: DEFAULT_VERSION,
            decompressed_length,
            checksum: 0,
        }
    }

    /// Parse the header from the start of a compressed stream.
    pub fn parse(data: &[u8]) -> Result<Self, LenZuError> {
        if data.len() < MIN_STREAM_LEN {
            return Err(LenZuError::HeaderInvalid(format!(
                "stream is {} bytes, need at least {MIN_STREAM_LEN}",
                data.len()
            )));
        }
        let raw: RawHeader = bytemuck::pod_read_unaligned(&data[..HEADER_SIZE]);
        if raw.magic != MAGIC {
            return Err(LenZuError::HeaderInvalid("bad magic".into()));
        }
        let hi = u32::from_le_bytes(raw.checksum_hi) as u64;
        let lo = u32::from_le_bytes(raw.checksum_lo) as u64;
        Ok(Self {
            version: raw.version,
            decompressed_length: u32::from_le_bytes(raw.decompressed_length),
            checksum: (hi << 32) | lo,
        })
    }

    /// Serialize the fixed fields. Reserved bytes are zero.
    pub fn write(&self) -> [u8; HEADER_SIZE] {
        let raw = RawHeader {
            magic: MAGIC,
            version: self.version,
            decompressed_length: self.decompressed_length.to_le_bytes(),
            checksum_hi: ((self.checksum >> 32) as u32).to_le_bytes(),
            checksum_lo: (self.checksum as u32).to_le_bytes(),
            reserved: [0; 4],
        };
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&raw));
        out
    }
}

/// The 8 bytes stored at [`CHECKSUM_OFFSET`]: high half then low half,
/// each little-endian.
pub fn checksum_halves(checksum: u64) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&((checksum >> 32) as u32).to_le_bytes());
    out[4..].copy_from_slice(&(checksum as u32).to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(header: &Header) -> Vec<u8> {
        let mut v = header.write().to_vec();
        v.resize(MIN_STREAM_LEN, 0);
        v
    }

    #[test]
    fn layout_matches_offsets() {
        let h = Header {
            version: DEFAULT_VERSION,
            decompressed_length: 0x0102_0304,
            checksum: 0x1122_3344_5566_7788,
        };
        let bytes = h.write();
        assert_eq!(&bytes[..16], &MAGIC);
        assert_eq!(bytes[0x10], b'1');
        assert_eq!(bytes[0x14], b'0');
        assert_eq!(&bytes[0x20..0x24], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[0x24..0x28], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(&bytes[0x28..0x2C], &[0x88, 0x77, 0x66, 0x55]);
        assert_eq!(&bytes[0x2C..0x30], &[0; 4]);
    }

    #[test]
    fn parse_inverts_write() {
        let h = Header {
            version: [7; 16],
            decompressed_length: 42,
            checksum: u64::MAX - 5,
        };
        assert_eq!(Header::parse(&padded(&h)).unwrap(), h);
    }

    #[test]
    fn short_buffer_rejected() {
        let bytes = padded(&Header::new(1));
        assert!(matches!(
            Header::parse(&bytes[..MIN_STREAM_LEN - 1]),
            Err(LenZuError::HeaderInvalid(_))
        ));
    }

    #[test]
    fn any_magic_byte_matters() {
        for i in 0..MAGIC.len() {
            let mut bytes = padded(&Header::new(1));
            bytes[i] ^= 0x20;
            assert!(matches!(
                Header::parse(&bytes),
                Err(LenZuError::HeaderInvalid(_))
            ));
        }
    }
}
