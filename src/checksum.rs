/// Multipliers cycled by output position.
pub const CHECKSUM_LUT: [u64; 4] = [0xE9, 0x115, 0x137, 0x1B1];

/// Running checksum over decompressed bytes.
///
/// Each byte is added to the accumulator, which is then multiplied by
/// `CHECKSUM_LUT[position & 3]`, all modulo 2^64. The position is the byte's
/// offset in the whole output, so the checksum can be fed block by block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    value: u64,
    position: usize,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next run of output bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.value = self
                .value
                .wrapping_add(b as u64)
                .wrapping_mul(CHECKSUM_LUT[self.position & 3]);
            self.position += 1;
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

/// Checksum of a complete buffer.
pub fn checksum(bytes: &[u8]) -> u64 {
    let mut c = Checksum::new();
    c.update(bytes);
    c.value()
}
