//! Compact candidate set: one bit per digit 1..=9.

use serde::{Deserialize, Serialize};

/// Set of candidate digits (1..=9) backed by a u16 bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitSet(u16);

const FULL_MASK: u16 = 0b1_1111_1111;

impl BitSet {
    /// The empty set.
    #[inline]
    pub const fn empty() -> Self {
        BitSet(0)
    }

    /// The set containing all nine digits.
    #[inline]
    pub const fn full() -> Self {
        BitSet(FULL_MASK)
    }

    /// Whether `digit` (1..=9) is in the set.
    #[inline]
    pub fn contains(self, digit: u8) -> bool {
        debug_assert!((1..=9).contains(&digit));
        self.0 & (1 << (digit - 1)) != 0
    }

    /// Add `digit` to the set.
    #[inline]
    pub fn insert(&mut self, digit: u8) {
        debug_assert!((1..=9).contains(&digit));
        self.0 |= 1 << (digit - 1);
    }

    /// Remove `digit` from the set.
    #[inline]
    pub fn remove(&mut self, digit: u8) {
        debug_assert!((1..=9).contains(&digit));
        self.0 &= !(1 << (digit - 1));
    }

    /// Number of digits in the set.
    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the digits in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=9u8).filter(move |&d| self.contains(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut set = BitSet::empty();
        assert!(set.is_empty());
        set.insert(3);
        set.insert(7);
        assert!(set.contains(3));
        assert!(set.contains(7));
        assert!(!set.contains(5));
        assert_eq!(set.count(), 2);
        set.remove(3);
        assert!(!set.contains(3));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn test_full() {
        let set = BitSet::full();
        assert_eq!(set.count(), 9);
        assert_eq!(set.iter().collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
    }
}
