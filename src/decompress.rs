use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, trace, warn};

use crate::bitstream::BitCursor;
use crate::checksum::checksum;
use crate::config::DecodeConfig;
use crate::header::{Header, BITSTREAM_OFFSET, OPTIONS_OFFSET};
use crate::huffman::HuffmanTable;
use crate::options::CompressorOptions;
use crate::LenZuError;

/// Steps of a decode, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadHeader,
    ReadOptions,
    BuildTable,
    DecodeLoop,
    VerifyChecksum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Ready,
    Running(Stage),
    Done,
    /// Stopped by an error raised in the given stage.
    Failed(Stage),
}

/// Decoder over an in-memory compressed stream.
///
/// Decoding is a pure function of the input, so running a decoder again
/// starts over from the header and yields the same result.
pub struct Decoder<'a> {
    data: &'a [u8],
    config: DecodeConfig,
    state: DecoderState,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], config: DecodeConfig) -> Self {
        Self {
            data,
            config,
            state: DecoderState::Ready,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    fn enter(&mut self, stage: Stage) {
        self.state = DecoderState::Running(stage);
    }

    /// Run every stage to completion.
    pub fn run(&mut self) -> Result<Vec<u8>, LenZuError> {
        let result = self.run_stages();
        match &result {
            Ok(out) => {
                self.state = DecoderState::Done;
                debug!(len = out.len(), "decode finished");
            }
            Err(e) => {
                if let DecoderState::Running(stage) = self.state {
                    debug!(?stage, error = %e, "decode failed");
                    self.state = DecoderState::Failed(stage);
                }
            }
        }
        result
    }

    fn run_stages(&mut self) -> Result<Vec<u8>, LenZuError> {
        self.enter(Stage::ReadHeader);
        let header = Header::parse(self.data)?;
        let declared = header.decompressed_length as usize;
        debug!(declared, checksum = header.checksum, "header parsed");
        if declared > self.config.max_output_len {
            return Err(LenZuError::AllocationRefused {
                requested: declared,
                limit: self.config.max_output_len,
            });
        }

        self.enter(Stage::ReadOptions);
        let options = CompressorOptions::parse(&self.data[OPTIONS_OFFSET..])?;
        debug!(?options, "compressor options");

        self.enter(Stage::BuildTable);
        let mut cursor = BitCursor::at(self.data, BITSTREAM_OFFSET);
        let table = HuffmanTable::read(&options, &mut cursor)?;

        self.enter(Stage::DecodeLoop);
        let mut out = Vec::new();
        out.try_reserve_exact(declared)
            .map_err(|_| LenZuError::AllocationRefused {
                requested: declared,
                limit: self.config.max_output_len,
            })?;
        decode_instructions(&options, &table, &mut cursor, &mut out, declared)?;
        if out.len() < declared {
            warn!(
                produced = out.len(),
                declared, "input ended before the declared length"
            );
        }

        self.enter(Stage::VerifyChecksum);
        if self.config.verify_checksum {
            let actual = checksum(&out);
            if actual != header.checksum {
                return Err(LenZuError::ChecksumMismatch {
                    expected: header.checksum,
                    actual,
                });
            }
        }
        Ok(out)
    }
}

/// Run the literal/backreference loop until `declared` bytes exist or the
/// input is exhausted on an instruction boundary.
///
/// Each instruction starts with a flag bit followed by a Huffman symbol
/// `x`. Flag 0 copies `x + 1` raw bytes from the bitstream. Flag 1 is a
/// backreference of `x + base` bytes whose distance is a second symbol
/// shifted left by `backref_low_bit_count`, or'd with that many raw bits,
/// plus `base`. Copies stop early once the output is full.
fn decode_instructions(
    options: &CompressorOptions,
    table: &HuffmanTable,
    cursor: &mut BitCursor,
    out: &mut Vec<u8>,
    declared: usize,
) -> Result<(), LenZuError> {
    let base = options.backref_base_distance as usize;
    let low_bits = options.backref_low_bit_count as u32;

    while out.len() < declared && !cursor.is_at_end() {
        let is_backref = cursor.read_bit()?;
        let symbol = table.decode_one(cursor)?;

        if is_backref {
            let count = symbol + base;
            let high = table.decode_one(cursor)?;
            let low = if low_bits > 0 {
                cursor.read_bits(low_bits)? as usize
            } else {
                0
            };
            let distance = ((high << low_bits) | low) + base;
            let position = out.len();
            if distance > position {
                return Err(LenZuError::InvalidBackreference { distance, position });
            }
            trace!(position, count, distance, "backreference");
            // Source and destination may overlap; copy one byte at a time.
            for _ in 0..count {
                if out.len() >= declared {
                    break;
                }
                let byte = out[out.len() - distance];
                out.push(byte);
            }
        } else {
            trace!(position = out.len(), count = symbol + 1, "literal run");
            for _ in 0..=symbol {
                if out.len() >= declared {
                    break;
                }
                out.push(cursor.read_bits(8)? as u8);
            }
        }
    }
    Ok(())
}

/// Parse the header and compressor options without decoding the body.
pub fn inspect(data: &[u8]) -> Result<(Header, CompressorOptions), LenZuError> {
    let header = Header::parse(data)?;
    let options = CompressorOptions::parse(&data[OPTIONS_OFFSET..])?;
    Ok((header, options))
}

/// Decompress a LenZu stream with the default configuration.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, LenZuError> {
    decode_with_config(data, &DecodeConfig::default())
}

pub fn decode_with_config(data: &[u8], config: &DecodeConfig) -> Result<Vec<u8>, LenZuError> {
    Decoder::new(data, config.clone()).run()
}

/// Decompress a stream held in a seekable byte store.
///
/// The whole stream is read into memory first. Stores larger than twice the
/// output budget are refused before anything is read.
pub fn decode_from_reader<R: Read + Seek>(
    mut reader: R,
    config: &DecodeConfig,
) -> Result<Vec<u8>, LenZuError> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let limit = config.max_output_len.saturating_mul(2);
    let len = usize::try_from(len)
        .ok()
        .filter(|&l| l <= limit)
        .ok_or(LenZuError::AllocationRefused {
            requested: usize::try_from(len).unwrap_or(usize::MAX),
            limit,
        })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| LenZuError::AllocationRefused {
            requested: len,
            limit,
        })?;
    reader.take(len as u64).read_to_end(&mut data)?;
    decode_with_config(&data, config)
}
