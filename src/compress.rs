//! Format-compatible writer that never compresses.
//!
//! The output is a valid LenZu stream made only of literal runs: the input
//! is cut into blocks of `2^huff_bit_count` bytes and each block is written
//! verbatim behind a one byte marker. The table weights are fixed so that
//! the marker byte itself decodes as the literal instruction for its block.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::checksum::Checksum;
use crate::config::EncodeConfig;
use crate::header::{checksum_halves, Header, CHECKSUM_OFFSET};
use crate::LenZuError;

/// Weights at the start of every encoder table.
pub const PRECOMPUTED_WEIGHTS: [u32; 6] = [4, 6, 10, 16, 26, 42];
/// Weight of the slot that decodes to the short final block.
pub const LEFTOVER_WEIGHT: u32 = 2;
/// Weight of the slot that decodes to a full block.
pub const BLOCK_WEIGHT: u32 = 3;

/// Marker before a full block: flag 0 and the code `0000000`.
pub const FULL_BLOCK_MARKER: u8 = 0;
/// Marker before the short final block: flag 0 and the code `0000001`.
pub const END_BLOCK_MARKER: u8 = 1;

/// Terminal weights for a table of `block_size` slots.
///
/// The weights form a comb: merging always pairs the newest internal node
/// with the next heavier terminal, so the two lightest terminals end up
/// seven levels deep. The block slot (`block_size - 1`) gets the all-zero
/// code and the leftover slot (`leftover - 1`) the code ending in 1.
pub fn precomputed_weights(block_size: usize, leftover: usize) -> Vec<u32> {
    debug_assert!(block_size >= 8 && leftover < block_size);
    let mut weights = vec![0u32; block_size];
    weights[..PRECOMPUTED_WEIGHTS.len()].copy_from_slice(&PRECOMPUTED_WEIGHTS);
    if leftover != 0 {
        weights.copy_within(leftover - 1..block_size - 1, leftover);
        weights[leftover - 1] = LEFTOVER_WEIGHT;
    } else {
        weights[PRECOMPUTED_WEIGHTS.len()] = LEFTOVER_WEIGHT;
    }
    weights[block_size - 1] = BLOCK_WEIGHT;
    weights
}

/// No-op LenZu encoder.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncodeConfig,
}

impl Encoder {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    /// Encode an in-memory buffer.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, LenZuError> {
        let mut out = Cursor::new(Vec::with_capacity(data.len() + data.len() / 64 + 0x400));
        self.compress_to(Cursor::new(data), &mut out)?;
        Ok(out.into_inner())
    }

    /// Stream `src` into `dst` starting at the current position of `dst`,
    /// then seek back to fill in the checksum. Returns the number of bytes
    /// written; `dst` is left positioned after them.
    pub fn compress_to<R, W>(&self, mut src: R, mut dst: W) -> Result<u64, LenZuError>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let options = self.config.compressor_options()?;
        let block_size = options.first_real_entry();
        let width = options.index_byte_width();

        let size = src.seek(SeekFrom::End(0))?;
        src.seek(SeekFrom::Start(0))?;
        let declared = u32::try_from(size).map_err(|_| LenZuError::AllocationRefused {
            requested: usize::try_from(size).unwrap_or(usize::MAX),
            limit: u32::MAX as usize,
        })?;
        let leftover = (size % block_size as u64) as usize;

        let start = dst.stream_position()?;
        dst.write_all(&Header::new(declared).write())?;
        dst.write_all(&options.to_bytes())?;

        // A count that does not fit its field is written as 0, read back as
        // "every terminal".
        let count = if block_size < 1usize << (8 * width) {
            block_size as u32
        } else {
            0
        };
        dst.write_all(&count.to_le_bytes()[..width])?;
        for weight in precomputed_weights(block_size, leftover) {
            dst.write_all(&weight.to_le_bytes())?;
        }

        let mut checksum = Checksum::new();
        let mut block = vec![0u8; block_size + 1];
        let mut remaining = size;
        let mut blocks = 0u64;
        while remaining > 0 {
            let len = (block_size as u64).min(remaining) as usize;
            src.read_exact(&mut block[1..=len])?;
            checksum.update(&block[1..=len]);
            block[0] = if len == block_size {
                FULL_BLOCK_MARKER
            } else {
                END_BLOCK_MARKER
            };
            dst.write_all(&block[..=len])?;
            remaining -= len as u64;
            blocks += 1;
        }

        let end = dst.stream_position()?;
        dst.seek(SeekFrom::Start(start + CHECKSUM_OFFSET as u64))?;
        dst.write_all(&checksum_halves(checksum.value()))?;
        dst.seek(SeekFrom::Start(end))?;

        debug!(
            input = size,
            output = end - start,
            blocks,
            block_size,
            checksum = checksum.value(),
            "encode finished"
        );
        Ok(end - start)
    }
}

/// Encode with the reference settings (128 byte blocks).
pub fn encode(data: &[u8]) -> Result<Vec<u8>, LenZuError> {
    Encoder::default().encode(data)
}

pub fn encode_with_config(data: &[u8], config: &EncodeConfig) -> Result<Vec<u8>, LenZuError> {
    Encoder::new(config.clone()).encode(data)
}

/// Encode from one seekable byte store into another.
pub fn compress_to<R, W>(src: R, dst: W, config: &EncodeConfig) -> Result<u64, LenZuError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    Encoder::new(config.clone()).compress_to(src, dst)
}
