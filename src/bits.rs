//! Ordered bit-sets used for supports, index sets and saturation rows.
//!
//! [`BitSet`] is a thin wrapper over [`fixedbitset::FixedBitSet`] that grows
//! on demand (rows gain columns as generators/constraints are inserted) and
//! adds the small set-algebra vocabulary the conversion algorithm needs:
//! containment, intersection-size, "is subset of any row in a list" and so
//! on: a single place that owns indexing arithmetic so the rest of the
//! crate never pokes at a raw bit buffer.

use fixedbitset::FixedBitSet;
use std::fmt;

// ======================================================================
// BitSet - PUBLIC

/// An ordered, growable set of non-negative indices (dimensions, or row
/// numbers into a skeletal system).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: FixedBitSet,
}

impl BitSet {
    /// Empty set.
    pub fn new() -> Self {
        Self {
            bits: FixedBitSet::new(),
        }
    }

    /// Empty set with room for `n` members without reallocating.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(n),
        }
    }

    /// Singleton `{i}`.
    pub fn singleton(i: usize) -> Self {
        let mut s = Self::with_capacity(i + 1);
        s.set(i, true);
        s
    }

    /// Number of bits currently allocated (not the cardinality).
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Cardinality, i.e. number of members.
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// True iff this set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.count_ones(..) == 0
    }

    /// True iff `i` is a member.
    pub fn contains(&self, i: usize) -> bool {
        i < self.bits.len() && self.bits.contains(i)
    }

    /// Sets or clears membership of `i`, growing the backing storage if
    /// `i` is beyond current capacity.
    pub fn set(&mut self, i: usize, value: bool) {
        if i >= self.bits.len() {
            self.bits.grow(i + 1);
        }
        self.bits.set(i, value);
    }

    /// Clears all members, keeping capacity.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Grows backing storage (if needed) so that indices `< n` are valid,
    /// without changing membership.
    pub fn ensure_capacity(&mut self, n: usize) {
        if n > self.bits.len() {
            self.bits.grow(n);
        }
    }

    /// Smallest member, if any.
    pub fn first(&self) -> Option<usize> {
        self.bits.ones().next()
    }

    /// Iterator over members in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }

    /// True iff `self` and `other` share no members.
    pub fn is_disjoint(&self, other: &BitSet) -> bool {
        self.bits.is_disjoint(&other.bits)
    }

    /// True iff every member of `self` is also a member of `other`
    /// (`self ⊆ other`).
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.bits.is_subset(&other.bits)
    }

    /// True iff `self` is a subset of `other` but not equal to it.
    pub fn is_strict_subset(&self, other: &BitSet) -> bool {
        self.is_subset(other) && self.len() < other.len()
    }

    /// Number of members shared by `self` and `other`.
    pub fn intersection_len(&self, other: &BitSet) -> usize {
        self.bits.intersection(&other.bits).count()
    }

    /// Set union, in place.
    pub fn union_assign(&mut self, other: &BitSet) {
        let n = self.bits.len().max(other.bits.len());
        self.bits.grow(n);
        self.bits.union_with(&other.bits);
    }

    /// Set intersection, in place.
    pub fn intersect_assign(&mut self, other: &BitSet) {
        self.bits.intersect_with(&other.bits);
    }

    /// Removes every member also present in `other`.
    pub fn remove_all(&mut self, other: &BitSet) {
        self.bits.difference_with(&other.bits);
    }

    /// Shifts every member index `>= from` down by one; used when a row is
    /// deleted from the system this bitset indexes into.
    pub fn remove_index(&mut self, removed: usize) {
        // Indices below `removed` keep their position, indices above shift
        // down by one, `removed` itself is dropped.
        let mut out = BitSet::new();
        for i in self.bits.ones() {
            if i < removed {
                out.set(i, true);
            } else if i > removed {
                out.set(i - 1, true);
            }
        }
        *self = out;
    }

    /// Returns a new set containing members `0..n` union-ed from an
    /// iterator, for convenient construction in tests and callers.
    pub fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut s = Self::new();
        for i in iter {
            s.set(i, true);
        }
        s
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        BitSet::from_iter(iter)
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_and_growth() {
        let mut s = BitSet::new();
        assert!(s.is_empty());
        s.set(5, true);
        assert!(s.contains(5));
        assert!(!s.contains(4));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn subset_and_disjoint() {
        let a = BitSet::from_iter([0, 1, 2]);
        let b = BitSet::from_iter([1, 2]);
        let c = BitSet::from_iter([3, 4]);
        assert!(b.is_subset(&a));
        assert!(b.is_strict_subset(&a));
        assert!(!a.is_subset(&b));
        assert!(a.is_disjoint(&c));
        assert!(!a.is_disjoint(&b));
    }

    #[test]
    fn union_intersect_remove() {
        let mut a = BitSet::from_iter([0, 1, 2]);
        let b = BitSet::from_iter([2, 3]);
        assert_eq!(a.intersection_len(&b), 1);
        let mut u = a.clone();
        u.union_assign(&b);
        assert_eq!(u, BitSet::from_iter([0, 1, 2, 3]));
        a.remove_all(&b);
        assert_eq!(a, BitSet::from_iter([0, 1]));
    }

    #[test]
    fn remove_index_shifts_higher_members_down() {
        let mut a = BitSet::from_iter([0, 2, 4]);
        a.remove_index(2);
        assert_eq!(a, BitSet::from_iter([0, 3]));
    }
}
