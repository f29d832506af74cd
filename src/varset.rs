//! Compact variable sets for monomials.
//!
//! A monomial over GF(2) is fully described by the set of variables it
//! multiplies, so every term, common factor and unique set in the engine
//! is a [`VarSet`].

use std::fmt::{Display, Formatter};

use crate::types::Var;

/// A set of variable indices backed by a vector of u64 words.
///
/// The set grows as needed when inserting indices beyond the current
/// capacity. Trailing zero words are never stored, so two sets with the
/// same members compare equal and hash identically.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct VarSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
}

impl VarSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates an empty set.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Returns the number of variables in the set (the monomial degree).
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if the set is empty (the constant monomial).
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    fn word_and_bit(index: u32) -> (usize, usize) {
        let index = index as usize;
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    /// Returns true if the variable is a member.
    pub fn contains(&self, var: Var) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var.index());
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Adds the variable. Returns true if it was not present before.
    pub fn insert(&mut self, var: Var) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var.index());
        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }
        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        self.words[word_idx] |= mask;
        was_clear
    }

    /// Removes the variable. Returns true if it was present.
    pub fn remove(&mut self, var: Var) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var.index());
        if word_idx >= self.words.len() {
            return false;
        }
        let mask = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & mask != 0;
        self.words[word_idx] &= !mask;
        self.trim();
        was_set
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }

    /// Variables present in both sets.
    pub fn intersection(&self, other: &VarSet) -> VarSet {
        let mut words: Vec<u64> = self.words.iter().zip(&other.words).map(|(a, b)| a & b).collect();
        while words.last() == Some(&0) {
            words.pop();
        }
        VarSet { words }
    }

    /// Variables of `self` that are not in `other`.
    pub fn difference(&self, other: &VarSet) -> VarSet {
        let mut words = self.words.clone();
        for (w, o) in words.iter_mut().zip(&other.words) {
            *w &= !o;
        }
        let mut res = VarSet { words };
        res.trim();
        res
    }

    /// Variables in either set.
    pub fn union(&self, other: &VarSet) -> VarSet {
        let n = self.words.len().max(other.words.len());
        let words = (0..n)
            .map(|i| self.words.get(i).copied().unwrap_or(0) | other.words.get(i).copied().unwrap_or(0))
            .collect();
        VarSet { words }
    }

    /// Returns true if every member of `self` is in `other`.
    pub fn is_subset(&self, other: &VarSet) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, w)| w & !other.words.get(i).copied().unwrap_or(0) == 0)
    }

    /// Returns an iterator over the members in ascending index order.
    pub fn iter(&self) -> VarSetIter<'_> {
        VarSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }

    /// Members in ascending order.
    pub fn to_vec(&self) -> Vec<Var> {
        self.iter().collect()
    }

    /// Renders the monomial in canonical form: ascending variables
    /// concatenated (`x0x3x7`), or `1` for the empty set.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl FromIterator<Var> for VarSet {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        let mut set = VarSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Var> for VarSet {
    fn extend<I: IntoIterator<Item = Var>>(&mut self, iter: I) {
        for var in iter {
            self.insert(var);
        }
    }
}

impl<'a> IntoIterator for &'a VarSet {
    type Item = Var;
    type IntoIter = VarSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the members of a [`VarSet`].
pub struct VarSetIter<'a> {
    set: &'a VarSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for VarSetIter<'_> {
    type Item = Var;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                let index = self.word_idx * VarSet::BITS_PER_WORD + bit_idx;
                return Some(Var::new(index as u32));
            }

            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}

impl Display for VarSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "1");
        }
        for var in self.iter() {
            write!(f, "{}", var)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(vars: &[u32]) -> VarSet {
        vars.iter().map(|&v| Var::new(v)).collect()
    }

    #[test]
    fn test_empty() {
        let s = VarSet::new();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert!(!s.contains(Var::new(0)));
        assert_eq!(s.to_string(), "1");
    }

    #[test]
    fn test_insert_remove() {
        let mut s = VarSet::new();
        assert!(s.insert(Var::new(70)));
        assert!(!s.insert(Var::new(70)));
        assert!(s.contains(Var::new(70)));
        assert_eq!(s.len(), 1);
        assert!(s.remove(Var::new(70)));
        assert!(!s.remove(Var::new(70)));
        assert!(s.is_empty());
        assert_eq!(s, VarSet::new());
    }

    #[test]
    fn test_iter_ascending() {
        let s = set(&[65, 3, 10, 64, 5]);
        let indices: Vec<u32> = s.iter().map(|v| v.index()).collect();
        assert_eq!(indices, vec![3, 5, 10, 64, 65]);
    }

    #[test]
    fn test_set_algebra() {
        let a = set(&[0, 1, 2, 3, 4, 5]);
        let b = set(&[0, 1, 2, 3, 6]);
        assert_eq!(a.intersection(&b), set(&[0, 1, 2, 3]));
        assert_eq!(a.difference(&b), set(&[4, 5]));
        assert_eq!(b.difference(&a), set(&[6]));
        assert_eq!(a.union(&b), set(&[0, 1, 2, 3, 4, 5, 6]));
        assert!(set(&[1, 3]).is_subset(&a));
        assert!(!b.is_subset(&a));
        assert!(VarSet::new().is_subset(&a));
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let a = set(&[1, 100]).intersection(&set(&[1]));
        assert_eq!(a, set(&[1]));
    }

    #[test]
    fn test_canonical() {
        assert_eq!(set(&[7, 0, 3]).canonical(), "x0x3x7");
    }
}
