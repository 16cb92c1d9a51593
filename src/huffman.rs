//! Huffman table carried in the stream preamble.
//!
//! The stream does not store codes. It stores a weight per terminal slot,
//! and both sides rebuild the same tree by repeatedly merging the two
//! lightest unmerged nodes. Terminals occupy slots `0..first_real_entry`
//! and their index is the decoded value; every merge appends an internal
//! node after them. The last node appended is the root.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use crate::bitstream::BitCursor;
use crate::options::CompressorOptions;
use crate::LenZuError;

/// One slot of the table arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanEntry {
    /// Weight; zero marks an unused terminal.
    pub weight: u64,
    /// Child reached on a 1 bit (the lighter of the merged pair).
    pub child_low: Option<usize>,
    /// Child reached on a 0 bit.
    pub child_high: Option<usize>,
    /// Bit leading to this node from its parent, once merged.
    pub bit_value: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    entries: Vec<HuffmanEntry>,
    first_real_entry: usize,
    start_entry: usize,
    single_symbol: Option<usize>,
}

impl HuffmanTable {
    /// Read the weight list following the option bytes and build the table.
    ///
    /// Preamble layout, all fields little-endian:
    /// * entry count, `index_byte_width` bytes, `0` meaning every terminal;
    /// * per entry an optional slot index (same width), then a 4 byte weight.
    ///
    /// Indices are only present when they are cheaper than listing every
    /// terminal, i.e. when `first_real * 4 >= (width + 4) * count`. Without
    /// them all `first_real` terminal weights are listed in order.
    pub fn read(options: &CompressorOptions, cursor: &mut BitCursor) -> Result<Self, LenZuError> {
        let first_real = options.first_real_entry();
        let width = options.index_byte_width();

        let mut count = cursor.read_le(width)? as usize;
        if count == 0 {
            count = first_real;
        }
        let explicit_indices = first_real * 4 >= (width + 4) * count;
        if !explicit_indices {
            count = first_real;
        }

        let mut weights = vec![0u32; first_real];
        for i in 0..count {
            let slot = if explicit_indices {
                cursor.read_le(width)? as usize
            } else {
                i
            };
            let weight = cursor.read_le(4)?;
            match weights.get_mut(slot) {
                Some(w) => *w = weight,
                // Internal slots are overwritten while building.
                None => warn!(slot, weight, "ignoring weight for non-terminal slot"),
            }
        }

        let table = Self::from_weights(first_real, &weights)?;
        debug!(
            first_real,
            count,
            explicit_indices,
            start_entry = table.start_entry,
            "huffman table built"
        );
        Ok(table)
    }

    /// Build the tree from terminal weights (`weights.len() <= first_real_entry`,
    /// missing slots are unused).
    ///
    /// Each step takes the two lightest nodes that are nonzero and not yet
    /// merged, ordered by `(weight, index)` so equal weights resolve to the
    /// lower slot. The lightest gets bit 1, the other bit 0, and a new node
    /// with their summed weight is appended. A lone terminal gets bit 1 and
    /// forms a single-symbol table.
    pub fn from_weights(first_real_entry: usize, weights: &[u32]) -> Result<Self, LenZuError> {
        if weights.len() > first_real_entry {
            return Err(LenZuError::CorruptHuffmanCode { offset: 0 });
        }
        let table_bound = first_real_entry * (first_real_entry + 1) / 2;

        let mut entries = Vec::with_capacity(first_real_entry * 2);
        entries.extend(weights.iter().map(|&w| HuffmanEntry {
            weight: w as u64,
            ..HuffmanEntry::default()
        }));
        entries.resize(first_real_entry, HuffmanEntry::default());

        let mut open: BinaryHeap<Reverse<(u64, usize)>> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.weight != 0)
            .map(|(i, e)| Reverse((e.weight, i)))
            .collect();

        let mut single_symbol = None;
        while let Some(Reverse((low_weight, low))) = open.pop() {
            let Some(Reverse((high_weight, high))) = open.pop() else {
                if entries.len() == first_real_entry {
                    entries[low].bit_value = Some(true);
                    single_symbol = Some(low);
                }
                break;
            };
            if entries.len() >= table_bound {
                return Err(LenZuError::CorruptHuffmanCode { offset: 0 });
            }
            entries[low].bit_value = Some(true);
            entries[high].bit_value = Some(false);
            let current = entries.len();
            let weight = low_weight + high_weight;
            entries.push(HuffmanEntry {
                weight,
                child_low: Some(low),
                child_high: Some(high),
                bit_value: None,
            });
            open.push(Reverse((weight, current)));
        }

        Ok(Self {
            start_entry: entries.len(),
            entries,
            first_real_entry,
            single_symbol,
        })
    }

    pub fn first_real_entry(&self) -> usize {
        self.first_real_entry
    }

    /// One past the root node.
    pub fn start_entry(&self) -> usize {
        self.start_entry
    }

    pub fn entry(&self, index: usize) -> Option<&HuffmanEntry> {
        self.entries.get(index)
    }

    /// Walk from the root one bit at a time until a terminal is reached.
    ///
    /// A single-symbol table has no internal nodes; it still consumes one
    /// bit per symbol. A table with no symbols at all cannot decode anything.
    pub fn decode_one(&self, cursor: &mut BitCursor) -> Result<usize, LenZuError> {
        if self.start_entry <= self.first_real_entry {
            let offset = cursor.byte_offset();
            let symbol = self
                .single_symbol
                .ok_or(LenZuError::CorruptHuffmanCode { offset })?;
            cursor.read_bit()?;
            return Ok(symbol);
        }

        let mut node = self.start_entry - 1;
        while node >= self.first_real_entry {
            let offset = cursor.byte_offset();
            let bit = cursor.read_bit()?;
            let entry = &self.entries[node];
            node = [entry.child_low, entry.child_high]
                .into_iter()
                .flatten()
                .find(|&c| self.entries[c].bit_value == Some(bit))
                .ok_or(LenZuError::CorruptHuffmanCode { offset })?;
        }
        Ok(node)
    }

    /// Bit sequence that decodes to `symbol`, root first.
    pub fn code_for(&self, symbol: usize) -> Option<Vec<bool>> {
        if symbol >= self.first_real_entry {
            return None;
        }
        if self.start_entry <= self.first_real_entry {
            return (self.single_symbol == Some(symbol)).then(|| vec![true]);
        }
        let mut stack = vec![(self.start_entry - 1, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            if node == symbol {
                return Some(path);
            }
            let entry = &self.entries[node];
            for child in [entry.child_low, entry.child_high].into_iter().flatten() {
                if let Some(bit) = self.entries[child].bit_value {
                    let mut next = path.clone();
                    next.push(bit);
                    stack.push((child, next));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
        let mut out = vec![0u8; bits.len().div_ceil(8).max(1)];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                out[i / 8] |= 0x80 >> (i % 8);
            }
        }
        out
    }

    #[test]
    fn equal_weights_merge_lowest_slots_first() {
        let t = HuffmanTable::from_weights(8, &[1, 1, 1]).unwrap();
        assert_eq!(t.start_entry(), 10);
        let first = t.entry(8).unwrap();
        assert_eq!((first.child_low, first.child_high), (Some(0), Some(1)));
        assert_eq!(first.weight, 2);
        let root = t.entry(9).unwrap();
        assert_eq!((root.child_low, root.child_high), (Some(2), Some(8)));
        assert_eq!(t.entry(0).unwrap().bit_value, Some(true));
        assert_eq!(t.entry(1).unwrap().bit_value, Some(false));
        assert_eq!(t.entry(9).unwrap().bit_value, None);
    }

    #[test]
    fn comb_weights_give_expected_codes() {
        let mut weights = vec![0u32; 128];
        weights[..7].copy_from_slice(&[4, 6, 10, 16, 26, 42, 2]);
        weights[127] = 3;
        let t = HuffmanTable::from_weights(128, &weights).unwrap();
        assert_eq!(t.code_for(127).unwrap(), vec![false; 7]);
        let mut leftover = vec![false; 6];
        leftover.push(true);
        assert_eq!(t.code_for(6).unwrap(), leftover);
        assert_eq!(t.code_for(5).unwrap(), vec![true]);
        assert_eq!(t.code_for(50), None);

        let data = [0x00, 0x01];
        let mut c = BitCursor::new(&data);
        c.read_bit().unwrap();
        assert_eq!(t.decode_one(&mut c).unwrap(), 127);
        c.read_bit().unwrap();
        assert_eq!(t.decode_one(&mut c).unwrap(), 6);
        assert!(c.is_at_end());
    }

    #[test]
    fn decode_inverts_code_for() {
        let weights = [5, 9, 1, 1, 30, 2, 0, 7];
        let t = HuffmanTable::from_weights(8, &weights).unwrap();
        for symbol in [0usize, 1, 2, 3, 4, 5, 7] {
            let bits = t.code_for(symbol).unwrap();
            let bytes = bits_to_bytes(&bits);
            let mut c = BitCursor::new(&bytes);
            assert_eq!(t.decode_one(&mut c).unwrap(), symbol);
        }
        assert_eq!(t.code_for(6), None);
    }

    #[test]
    fn single_symbol_consumes_one_bit() {
        let mut weights = [0u32; 8];
        weights[5] = 11;
        let t = HuffmanTable::from_weights(8, &weights).unwrap();
        assert_eq!(t.start_entry(), 8);
        let data = [0xFF];
        let mut c = BitCursor::new(&data);
        assert_eq!(t.decode_one(&mut c).unwrap(), 5);
        assert_eq!(c.bit_index(), 6);
    }

    #[test]
    fn empty_table_cannot_decode() {
        let t = HuffmanTable::from_weights(8, &[]).unwrap();
        let data = [0xFF];
        let mut c = BitCursor::new(&data);
        assert!(matches!(
            t.decode_one(&mut c),
            Err(LenZuError::CorruptHuffmanCode { .. })
        ));
    }

    #[test]
    fn decode_runs_out_of_bits() {
        let t = HuffmanTable::from_weights(8, &[1, 2, 4, 8]).unwrap();
        let data: [u8; 0] = [];
        let mut c = BitCursor::new(&data);
        assert!(matches!(
            t.decode_one(&mut c),
            Err(LenZuError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn read_with_explicit_indices() {
        let options = CompressorOptions::new(3, 3, 3, 0, 2).unwrap();
        let mut data = vec![2u8, 3];
        data.extend_from_slice(&5u32.to_le_bytes());
        data.push(6);
        data.extend_from_slice(&9u32.to_le_bytes());
        data.push(0b1000_0000);
        let mut c = BitCursor::new(&data);
        let t = HuffmanTable::read(&options, &mut c).unwrap();
        assert_eq!(t.start_entry(), 9);
        assert_eq!(t.entry(3).unwrap().weight, 5);
        assert_eq!(t.entry(6).unwrap().weight, 9);
        assert_eq!(t.decode_one(&mut c).unwrap(), 3);
        assert_eq!(t.decode_one(&mut c).unwrap(), 6);
    }

    #[test]
    fn read_identity_listing() {
        let options = CompressorOptions::new(3, 3, 3, 0, 2).unwrap();
        let mut data = vec![0u8];
        for w in [1u32, 0, 0, 0, 0, 0, 0, 1] {
            data.extend_from_slice(&w.to_le_bytes());
        }
        let mut c = BitCursor::new(&data);
        let t = HuffmanTable::read(&options, &mut c).unwrap();
        assert!(c.is_at_end());
        assert_eq!(t.start_entry(), 9);
        assert_eq!(t.code_for(0), Some(vec![true]));
        assert_eq!(t.code_for(7), Some(vec![false]));
    }

    #[test]
    fn truncated_weight_list() {
        let options = CompressorOptions::new(3, 3, 3, 0, 2).unwrap();
        let data = [0u8, 1, 0, 0];
        let mut c = BitCursor::new(&data);
        assert!(matches!(
            HuffmanTable::read(&options, &mut c),
            Err(LenZuError::TruncatedStream { .. })
        ));
    }
}
