use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Word-granular data bus. Callers are responsible for alignment; see
/// `exec::effective_address`.
pub trait Bus {
    fn read_word(&self, addr: u32) -> i32;
    fn write_word(&mut self, addr: u32, val: i32);
}

/// Sparse word-addressable data memory. Only addresses that were loaded
/// from the data segment or stored to are defined; everything else reads 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataMemory {
    words: BTreeMap<u32, i32>,
}

impl DataMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, addr: u32) -> Option<i32> {
        self.words.get(&addr).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Defined words in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.words.iter().map(|(&a, &v)| (a, v))
    }

    /// Start addresses of `row_bytes`-wide windows that together cover
    /// every defined word. Each window opens at a defined address, so
    /// there are never more windows than defined words.
    pub fn row_starts(&self, row_bytes: u32) -> Vec<u32> {
        let mut starts: Vec<u32> = Vec::new();
        for &addr in self.words.keys() {
            match starts.last() {
                Some(&start) if addr - start < row_bytes => {}
                _ => starts.push(addr),
            }
        }
        starts
    }
}

impl Bus for DataMemory {
    fn read_word(&self, addr: u32) -> i32 {
        self.get(addr).unwrap_or(0)
    }

    fn write_word(&mut self, addr: u32, val: i32) {
        self.words.insert(addr, val);
    }
}

impl FromIterator<(u32, i32)> for DataMemory {
    fn from_iter<I: IntoIterator<Item = (u32, i32)>>(iter: I) -> Self {
        Self { words: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_reads_zero_without_defining() {
        let mem = DataMemory::new();
        assert_eq!(mem.read_word(128), 0);
        assert!(mem.is_empty());
        assert!(mem.row_starts(32).is_empty());
    }

    #[test]
    fn iterates_in_address_order() {
        let mut mem: DataMemory = [(140, 3), (132, 1)].into_iter().collect();
        mem.write_word(136, 2);
        let v: Vec<_> = mem.iter().collect();
        assert_eq!(v, vec![(132, 1), (136, 2), (140, 3)]);
        assert_eq!(mem.row_starts(32), vec![132]);
    }

    #[test]
    fn rows_open_only_at_defined_words() {
        let mem: DataMemory = [(100, 1), (128, 2), (132, 3), (8_384_512, 4)].into_iter().collect();
        assert_eq!(mem.row_starts(32), vec![100, 132, 8_384_512]);
    }
}
