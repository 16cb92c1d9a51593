//! Bit level cursor over a LenZu bitstream.
//!
//! Bits are consumed most significant first within each byte. The bit index
//! counts down: `7` is the first (highest) bit of a fresh byte and `0` the
//! last, after which the cursor moves to bit `7` of the following byte.
//!
//! ```text
//! 7......0 7......0
//! abcdefgh ijklmnop
//!      ^ bit_index = 2: an 8-bit read yields fghijklm
//! ```

use crate::LenZuError;

/// Read position inside an immutable byte buffer.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_index: u8,
}

impl<'a> BitCursor<'a> {
    /// Cursor at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_offset: 0,
            bit_index: 7,
        }
    }

    /// Cursor at bit 7 of `data[byte_offset]`. Offsets reported by the
    /// cursor stay relative to the start of `data`.
    pub fn at(data: &'a [u8], byte_offset: usize) -> Self {
        Self {
            data,
            byte_offset,
            bit_index: 7,
        }
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// True once every byte of the buffer has been fully consumed.
    pub fn is_at_end(&self) -> bool {
        self.byte_offset >= self.data.len()
    }

    /// Number of unread bits left in the buffer.
    pub fn remaining_bits(&self) -> usize {
        match self.data.len().checked_sub(self.byte_offset) {
            Some(0) | None => 0,
            Some(bytes) => bytes * 8 - (7 - self.bit_index as usize),
        }
    }

    fn truncated(&self) -> LenZuError {
        LenZuError::TruncatedStream {
            offset: self.byte_offset,
        }
    }

    /// Return the next bit without consuming it.
    pub fn peek_bit(&self) -> Result<bool, LenZuError> {
        let byte = self.data.get(self.byte_offset).ok_or_else(|| self.truncated())?;
        Ok((byte >> self.bit_index) & 1 != 0)
    }

    /// Consume a single bit.
    pub fn read_bit(&mut self) -> Result<bool, LenZuError> {
        let bit = self.peek_bit()?;
        if self.bit_index == 0 {
            self.bit_index = 7;
            self.byte_offset += 1;
        } else {
            self.bit_index -= 1;
        }
        Ok(bit)
    }

    /// Read `count` bits (at most 32) as a big-endian value, the first bit
    /// read becoming the highest bit of the result.
    ///
    /// The read may start anywhere inside a byte and span as many following
    /// bytes as needed. A read that ends exactly on a byte boundary leaves
    /// the cursor at bit 7 of the next unread byte, so nothing is read twice.
    /// Nothing is consumed when the buffer holds fewer than `count` bits.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, LenZuError> {
        debug_assert!(count <= 32);
        if count as usize > self.remaining_bits() {
            return Err(self.truncated());
        }
        let mut value = 0u32;
        let mut left = count;
        while left > 0 {
            let available = self.bit_index as u32 + 1;
            let take = left.min(available);
            let byte = self.data[self.byte_offset] as u32;
            let chunk = (byte >> (available - take)) & ((1u32 << take) - 1);
            value = (value << take) | chunk;
            left -= take;
            if take == available {
                self.byte_offset += 1;
                self.bit_index = 7;
            } else {
                self.bit_index -= take as u8;
            }
        }
        Ok(value)
    }

    /// Read `bytes` consecutive 8-bit values and assemble them
    /// little-endian, the first byte read being the least significant.
    ///
    /// This is how the table preamble stores its counts, indices and
    /// weights. The individual bytes need not be aligned.
    pub fn read_le(&mut self, bytes: usize) -> Result<u32, LenZuError> {
        debug_assert!((1..=4).contains(&bytes));
        if bytes * 8 > self.remaining_bits() {
            return Err(self.truncated());
        }
        let mut value = 0u32;
        for i in 0..bytes {
            value |= self.read_bits(8)? << (i * 8);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_reads_take_whole_bytes() {
        let data = [0xAB, 0xCD];
        let mut c = BitCursor::new(&data);
        assert_eq!(c.read_bits(8).unwrap(), 0xAB);
        assert_eq!((c.byte_offset(), c.bit_index()), (1, 7));
        assert_eq!(c.read_bits(8).unwrap(), 0xCD);
        assert!(c.is_at_end());
    }

    #[test]
    fn unaligned_byte_spans_two_bytes() {
        // 1010_1011 1100_1101, skip three bits then read eight
        let data = [0xAB, 0xCD];
        let mut c = BitCursor::new(&data);
        assert_eq!(c.read_bits(3).unwrap(), 0b101);
        assert_eq!(c.bit_index(), 4);
        assert_eq!(c.read_bits(8).unwrap(), 0b0101_1110);
        assert_eq!((c.byte_offset(), c.bit_index()), (1, 4));
    }

    #[test]
    fn sixteen_bits_from_byte_start_advance_two_bytes() {
        let data = [0x12, 0x34, 0x56];
        let mut c = BitCursor::new(&data);
        assert_eq!(c.read_bits(16).unwrap(), 0x1234);
        assert_eq!((c.byte_offset(), c.bit_index()), (2, 7));
        assert_eq!(c.read_bits(8).unwrap(), 0x56);
    }

    #[test]
    fn read_ending_on_boundary_moves_to_next_byte() {
        let data = [0xFF, 0x00];
        let mut c = BitCursor::new(&data);
        c.read_bits(5).unwrap();
        assert_eq!(c.read_bits(3).unwrap(), 0b111);
        assert_eq!((c.byte_offset(), c.bit_index()), (1, 7));
    }

    #[test]
    fn wide_read_spans_three_bytes() {
        let data = [0x01, 0xFF, 0x80];
        let mut c = BitCursor::new(&data);
        c.read_bits(7).unwrap();
        assert_eq!(c.read_bits(10).unwrap(), 0b11_1111_1111);
        assert_eq!((c.byte_offset(), c.bit_index()), (2, 6));
        assert_eq!(c.remaining_bits(), 7);
    }

    #[test]
    fn single_bits_walk_down_the_byte() {
        let data = [0b1000_0001];
        let mut c = BitCursor::new(&data);
        assert!(c.peek_bit().unwrap());
        assert!(c.read_bit().unwrap());
        for _ in 0..6 {
            assert!(!c.read_bit().unwrap());
        }
        assert!(c.read_bit().unwrap());
        assert!(c.is_at_end());
        assert!(matches!(
            c.read_bit(),
            Err(LenZuError::TruncatedStream { offset: 1 })
        ));
    }

    #[test]
    fn overlong_read_fails_without_consuming() {
        let data = [0xAA];
        let mut c = BitCursor::new(&data);
        c.read_bits(4).unwrap();
        assert!(c.read_bits(5).is_err());
        assert_eq!(c.remaining_bits(), 4);
        assert_eq!(c.read_bits(4).unwrap(), 0xA);
    }

    #[test]
    fn cursor_at_offset_reports_absolute_positions() {
        let data = [0xFF, 0xFF, 0x0F];
        let mut c = BitCursor::at(&data, 2);
        assert_eq!(c.read_bits(4).unwrap(), 0);
        assert_eq!(c.read_bits(4).unwrap(), 0xF);
        assert!(matches!(
            c.read_bit(),
            Err(LenZuError::TruncatedStream { offset: 3 })
        ));
    }

    #[test]
    fn little_endian_assembly() {
        let data = [0x78, 0x56, 0x34, 0x12];
        let mut c = BitCursor::new(&data);
        assert_eq!(c.read_le(4).unwrap(), 0x1234_5678);
    }

    #[test]
    fn little_endian_unaligned() {
        // one flag bit, then bytes 0x01 0x02 shifted by one
        let data = [0b1000_0000, 0b1000_0001, 0b0000_0000];
        let mut c = BitCursor::new(&data);
        assert!(c.read_bit().unwrap());
        assert_eq!(c.read_le(2).unwrap(), 0x0201);
        assert_eq!(c.bit_index(), 6);
    }
}
