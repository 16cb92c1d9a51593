use serde::Serialize;

use crate::LenZuError;

pub const OPTIONS_LEN: usize = 6;
pub const MIN_HUFF_BIT_COUNT: u8 = 3;
pub const MAX_HUFF_BIT_COUNT: u8 = 15;
pub const MIN_BACKREF_BASE_DISTANCE: u8 = 2;
pub const MAX_BACKREF_BASE_DISTANCE: u8 = 8;

/// Tunables stored in the six option bytes at 0x30.
///
/// The reference decoder clamps each field into range and reports failure
/// if any clamp fired. Here every out-of-range field is rejected with
/// [`LenZuError::OptionsOutOfRange`] instead of being adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressorOptions {
    /// Leading byte, unused by the decoder and written back as-is.
    pub reserved: u8,
    pub huff_bit_count_raw: u8,
    pub huff_bit_count_min: u8,
    pub backref_low_upper_bound: u8,
    pub backref_low_bit_count: u8,
    pub backref_base_distance: u8,
}

impl CompressorOptions {
    /// Build options, checking every range and the cross-field invariant.
    pub fn new(
        huff_bit_count_raw: u8,
        huff_bit_count_min: u8,
        backref_low_upper_bound: u8,
        backref_low_bit_count: u8,
        backref_base_distance: u8,
    ) -> Result<Self, LenZuError> {
        let options = Self {
            reserved: 0,
            huff_bit_count_raw,
            huff_bit_count_min,
            backref_low_upper_bound,
            backref_low_bit_count,
            backref_base_distance,
        };
        options.validate()?;
        Ok(options)
    }

    /// Parse the option bytes found at 0x30.
    pub fn parse(data: &[u8]) -> Result<Self, LenZuError> {
        let bytes: [u8; OPTIONS_LEN] = data
            .get(..OPTIONS_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                LenZuError::OptionsOutOfRange(format!(
                    "need {OPTIONS_LEN} option bytes, got {}",
                    data.len()
                ))
            })?;
        let options = Self {
            reserved: bytes[0],
            huff_bit_count_raw: bytes[1],
            huff_bit_count_min: bytes[2],
            backref_low_upper_bound: bytes[3],
            backref_low_bit_count: bytes[4],
            backref_base_distance: bytes[5],
        };
        options.validate()?;
        Ok(options)
    }

    pub fn to_bytes(&self) -> [u8; OPTIONS_LEN] {
        [
            self.reserved,
            self.huff_bit_count_raw,
            self.huff_bit_count_min,
            self.backref_low_upper_bound,
            self.backref_low_bit_count,
            self.backref_base_distance,
        ]
    }

    fn validate(&self) -> Result<(), LenZuError> {
        let huff_range = MIN_HUFF_BIT_COUNT..=MAX_HUFF_BIT_COUNT;
        if !huff_range.contains(&self.huff_bit_count_raw) {
            return Err(out_of_range(format!(
                "huffman bit count {} not in {MIN_HUFF_BIT_COUNT}..={MAX_HUFF_BIT_COUNT}",
                self.huff_bit_count_raw
            )));
        }
        if !huff_range.contains(&self.huff_bit_count_min) {
            return Err(out_of_range(format!(
                "minimum huffman bit count {} not in {MIN_HUFF_BIT_COUNT}..={MAX_HUFF_BIT_COUNT}",
                self.huff_bit_count_min
            )));
        }
        if !(self.huff_bit_count_min..=MAX_HUFF_BIT_COUNT).contains(&self.backref_low_upper_bound) {
            return Err(out_of_range(format!(
                "backreference upper bound {} not in {}..={MAX_HUFF_BIT_COUNT}",
                self.backref_low_upper_bound, self.huff_bit_count_min
            )));
        }
        if self.backref_low_bit_count >= self.backref_low_upper_bound {
            return Err(out_of_range(format!(
                "backreference low bit count {} must be below {}",
                self.backref_low_bit_count, self.backref_low_upper_bound
            )));
        }
        if self.backref_low_upper_bound - self.backref_low_bit_count > self.huff_bit_count() {
            return Err(out_of_range(format!(
                "backreference high bits {} exceed huffman bit count {}",
                self.backref_low_upper_bound - self.backref_low_bit_count,
                self.huff_bit_count()
            )));
        }
        if !(MIN_BACKREF_BASE_DISTANCE..=MAX_BACKREF_BASE_DISTANCE)
            .contains(&self.backref_base_distance)
        {
            return Err(out_of_range(format!(
                "backreference base distance {} not in {MIN_BACKREF_BASE_DISTANCE}..={MAX_BACKREF_BASE_DISTANCE}",
                self.backref_base_distance
            )));
        }
        Ok(())
    }

    /// Effective table bit count: the larger of the raw and minimum counts.
    pub fn huff_bit_count(&self) -> u8 {
        self.huff_bit_count_raw.max(self.huff_bit_count_min)
    }

    /// Index of the first internal node. Slots below it are terminals.
    pub fn first_real_entry(&self) -> usize {
        1usize << self.huff_bit_count()
    }

    /// Closed-form bound on the number of table slots.
    pub fn table_size(&self) -> usize {
        let n = self.first_real_entry();
        n * (n + 1) / 2
    }

    /// Width in bytes of the table entry count and explicit indices.
    pub fn index_byte_width(&self) -> usize {
        (self.huff_bit_count() as usize).div_ceil(8)
    }
}

fn out_of_range(msg: String) -> LenZuError {
    LenZuError::OptionsOutOfRange(msg)
}
