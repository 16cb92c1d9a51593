//! Codec for the LenZu compressed stream format.
//!
//! A LenZu stream is a fixed 0x30 byte header (magic, version tail, declared
//! length, 64-bit checksum), six option bytes, a Huffman table preamble and
//! a bitstream of literal runs and backreferences. [`decode`] reverses any
//! such stream; [`encode`] writes a valid stream made only of literal
//! blocks, so `decode(&encode(b)?)? == b` for every input.
//!
//! ```
//! let packed = lenzu::encode(b"hello hello hello").unwrap();
//! assert_eq!(lenzu::decode(&packed).unwrap(), b"hello hello hello");
//! ```

pub mod bitstream;
pub mod checksum;
pub mod compress;
pub mod config;
pub mod decompress;
mod error;
pub mod header;
pub mod huffman;
pub mod io_utils;
pub mod options;

pub use bitstream::BitCursor;
pub use checksum::{checksum, Checksum};
pub use compress::{compress_to, encode, encode_with_config, Encoder};
pub use config::{DecodeConfig, EncodeConfig, DEFAULT_MAX_OUTPUT_LEN};
pub use decompress::{
    decode, decode_from_reader, decode_with_config, inspect, Decoder, DecoderState, Stage,
};
pub use error::LenZuError;
pub use header::Header;
pub use huffman::HuffmanTable;
pub use options::CompressorOptions;
