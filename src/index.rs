//! Per-function term arena grouped by degree.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::term::{parse_term, ParseError, Term, SUM_SEPARATOR};
use crate::varset::VarSet;

/// Handle of a term inside one [`DegreeIndex`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TermId(u32);

impl TermId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle of a term within one function's processing.
///
/// A term leaves `Available` exactly once and never returns.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TermState {
    Available,
    /// Taken by a pattern match (fresh or reused).
    Consumed,
    /// Handed to the leftover stage.
    Leftover,
}

/// The terms of one function, bucketed by degree.
///
/// Terms live in an arena and are referred to by [`TermId`]. Each degree
/// group lists only the still-available ids, in insertion order. Taking a
/// term out of the pool removes it from its group, so pattern searches
/// never see it again.
#[derive(Debug, Clone, Default)]
pub struct DegreeIndex {
    terms: Vec<Term>,
    states: Vec<TermState>,
    groups: BTreeMap<usize, Vec<TermId>>,
}

impl DegreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from already parsed terms, keeping their order.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut index = Self::new();
        for term in terms {
            index.push(term);
        }
        index
    }

    /// Splits a polynomial on `+`, parses every fragment leniently and
    /// buckets the terms by degree.
    ///
    /// Blank fragments are skipped. Malformed fragments are dropped with a
    /// warning.
    pub fn group_by_degree(polynomial: &str) -> Self {
        let mut index = Self::new();
        for fragment in polynomial.split(SUM_SEPARATOR) {
            let term = parse_term(fragment);
            if term.text().is_empty() {
                continue;
            }
            if term.is_malformed() {
                warn!("Dropping malformed monomial {:?}", fragment);
                continue;
            }
            index.push(term);
        }
        debug!(
            "Grouped {} terms into degrees {:?}",
            index.len(),
            index.groups.iter().map(|(d, ids)| (*d, ids.len())).collect::<Vec<_>>()
        );
        index
    }

    /// Like [`group_by_degree`][Self::group_by_degree], but rejects any
    /// fragment that is not a well-formed monomial.
    pub fn parse_strict(polynomial: &str) -> Result<Self, ParseError> {
        let terms = polynomial
            .split(SUM_SEPARATOR)
            .map(|fragment| fragment.parse::<Term>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_terms(terms))
    }

    /// Appends a term as available and returns its handle.
    pub fn push(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.groups.entry(term.degree()).or_default().push(id);
        self.terms.push(term);
        self.states.push(TermState::Available);
        id
    }
}

// Getters
impl DegreeIndex {
    /// Total number of terms ever added.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    pub fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> {
        self.terms.iter().enumerate().map(|(i, t)| (TermId(i as u32), t))
    }

    pub fn state(&self, id: TermId) -> TermState {
        self.states[id.index()]
    }

    pub fn is_available(&self, id: TermId) -> bool {
        self.state(id) == TermState::Available
    }

    /// Available terms of the given degree, in insertion order.
    pub fn available(&self, degree: usize) -> &[TermId] {
        self.groups.get(&degree).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Degrees that still have available terms, ascending.
    pub fn degrees(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().filter(|(_, ids)| !ids.is_empty()).map(|(d, _)| *d)
    }

    pub fn max_degree(&self) -> usize {
        self.terms.iter().map(|t| t.degree()).max().unwrap_or(0)
    }

    /// One past the largest variable index used by any term.
    pub fn num_vars(&self) -> usize {
        self.terms
            .iter()
            .flat_map(|t| t.vars().iter())
            .map(|v| v.index() as usize + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn count(&self, state: TermState) -> usize {
        self.states.iter().filter(|&&s| s == state).count()
    }

    /// Finds the first available term of the given degree with exactly
    /// these variables, skipping the ids in `exclude`.
    pub fn find_available(&self, vars: &VarSet, exclude: &[TermId]) -> Option<TermId> {
        self.available(vars.len())
            .iter()
            .copied()
            .find(|id| !exclude.contains(id) && self.term(*id).vars() == vars)
    }
}

// Ownership transfer
impl DegreeIndex {
    fn release(&mut self, ids: &[TermId], state: TermState) {
        for (i, id) in ids.iter().enumerate() {
            assert!(self.is_available(*id), "Term {:?} is not available", id);
            assert!(!ids[..i].contains(id), "Term {:?} is claimed twice", id);
        }
        for &id in ids {
            let degree = self.term(id).degree();
            if let Some(group) = self.groups.get_mut(&degree) {
                group.retain(|&other| other != id);
            }
            self.states[id.index()] = state;
        }
    }

    /// Takes all the given terms out of the pool at once.
    ///
    /// # Panics
    ///
    /// Panics if any term is already taken or listed twice. Nothing is
    /// taken in that case.
    pub fn claim(&mut self, ids: &[TermId]) {
        self.release(ids, TermState::Consumed);
    }

    /// Hands every remaining term of the given degree to the leftover
    /// stage and returns them in group order.
    pub fn take_leftovers(&mut self, degree: usize) -> Vec<TermId> {
        let ids = self.available(degree).to_vec();
        self.release(&ids, TermState::Leftover);
        ids
    }
}
