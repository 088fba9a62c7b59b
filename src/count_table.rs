//! `CountTable`: a mapping from clique size k to a 64-bit count. One
//! instance per worker, created empty, mutated only by that worker's
//! enumerator, read only at result transmission.

use std::collections::BTreeMap;

use crate::error::{EngineError, Result};

#[derive(Debug, Default, Clone)]
pub struct CountTable {
    counts: BTreeMap<usize, u64>,
}

impl CountTable {
    pub fn new() -> CountTable {
        CountTable::default()
    }

    /// Arithmetic overflow is a correctness failure: it must be detected
    /// and must panic, not saturate or wrap.
    pub fn increment(&mut self, size: usize) {
        let entry = self.counts.entry(size).or_insert(0);
        *entry = entry
            .checked_add(1)
            .unwrap_or_else(|| panic!("clique count for size {size} overflowed a 64-bit counter"));
    }

    pub fn add(&mut self, size: usize, amount: u64) {
        let entry = self.counts.entry(size).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .unwrap_or_else(|| panic!("clique count for size {size} overflowed a 64-bit counter"));
    }

    pub fn get(&self, size: usize) -> u64 {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }

    /// Merges `other` into `self`, summing counts pairwise by size.
    pub fn merge(&mut self, other: &CountTable) {
        for (size, count) in other.iter() {
            self.add(size, count);
        }
    }

    /// Converts to the wire's signed representation. A count that
    /// overflows `i64` is the same fatal condition spec §7 mandates for
    /// counter overflow, just discovered at transmission instead of at
    /// `increment`.
    pub fn to_wire(&self) -> Result<Vec<(usize, i64)>> {
        self.counts
            .iter()
            .map(|(&k, &v)| {
                i64::try_from(v)
                    .map(|v| (k, v))
                    .map_err(|_| EngineError::CountOverflow { size: k })
            })
            .collect()
    }

    pub fn from_wire(pairs: &[(usize, i64)]) -> Result<CountTable> {
        let mut table = CountTable::new();
        for &(size, count) in pairs {
            if count < 0 {
                return Err(EngineError::CountOverflow { size });
            }
            table.add(size, count as u64);
        }
        Ok(table)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_pairwise() {
        let mut a = CountTable::new();
        a.add(3, 2);
        a.add(4, 1);
        let mut b = CountTable::new();
        b.add(3, 5);
        b.add(5, 1);
        a.merge(&b);
        assert_eq!(a.get(3), 7);
        assert_eq!(a.get(4), 1);
        assert_eq!(a.get(5), 1);
    }

    #[test]
    fn wire_round_trip() {
        let mut a = CountTable::new();
        a.add(3, 4);
        a.add(5, 1);
        let wire = a.to_wire().unwrap();
        let b = CountTable::from_wire(&wire).unwrap();
        assert_eq!(a.get(3), b.get(3));
        assert_eq!(a.get(5), b.get(5));
    }

    #[test]
    fn to_wire_rejects_counts_past_i64_max() {
        let mut a = CountTable::new();
        a.add(3, u64::MAX);
        let err = a.to_wire().unwrap_err();
        matches!(err, EngineError::CountOverflow { size: 3 });
    }
}
