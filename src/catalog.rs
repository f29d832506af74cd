//! Cross-function reuse tables.
//!
//! Both tables are keyed by canonical expressions (see
//! [`canonicalize`][crate::expr::canonicalize]) so that a later function can
//! borrow a gate built for an earlier one whenever the algebra matches exactly.

use std::collections::HashMap;

use log::debug;

use crate::expr::canonicalize;
use crate::index::{DegreeIndex, TermId};
use crate::pattern::{PatternKind, PatternMatch, Shape};
use crate::signal::Signal;
use crate::synth::Synthesized;
use crate::term::parse_term;
use crate::varset::VarSet;

/// Lookup counters of a catalog.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CatalogStats {
    pub hits: usize,
    pub misses: usize,
}

/// Builds the catalog key of a pattern from its component expressions.
///
/// Components are canonicalized and the middle ones sorted, so the key does
/// not depend on term spelling or discovery order.
pub fn signature_for(kind: PatternKind, high: &str, middle: &[&str], low: Option<&str>) -> String {
    let mut key = format!("{}|H:{}", kind.tag(), canonicalize(high));
    if !middle.is_empty() {
        let mut middle: Vec<String> = middle.iter().map(|m| canonicalize(m)).collect();
        middle.sort();
        key.push_str("|M:");
        key.push_str(&middle.join(","));
    }
    if let Some(low) = low {
        key.push_str("|L:");
        key.push_str(&canonicalize(low));
    }
    key
}

/// Signature of a match against the terms of `index`.
pub fn pattern_signature(index: &DegreeIndex, m: &PatternMatch) -> String {
    let text = move |id: TermId| index.term(id).text();
    match m.shape {
        Shape::Single { high, low } => signature_for(PatternKind::Single, text(high), &[], Some(text(low))),
        Shape::Double { high, middle, low } => signature_for(
            PatternKind::Double,
            text(high),
            &[text(middle[0]), text(middle[1])],
            Some(text(low)),
        ),
        Shape::Virtual { high, middle } => {
            signature_for(PatternKind::Virtual, text(high), &[text(middle[0]), text(middle[1])], None)
        }
    }
}

/// A remembered pattern and the gate that computes it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PatternRecord {
    pub signature: String,
    pub kind: PatternKind,
    /// Canonical component expressions: high, middles, low.
    pub components: Vec<String>,
    pub common: VarSet,
    pub unique: VarSet,
    pub output: Signal,
    pub depth: u32,
    pub residue: Vec<VarSet>,
}

impl PatternRecord {
    fn component_vars(&self) -> Vec<VarSet> {
        self.components.iter().map(|c| parse_term(c).vars().clone()).collect()
    }
}

/// Memoized pattern matches, keyed by signature.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    records: Vec<PatternRecord>,
    by_signature: HashMap<String, usize>,
    stats: CatalogStats,
}

impl PatternCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    pub fn get(&self, signature: &str) -> Option<&PatternRecord> {
        self.by_signature.get(signature).map(|&i| &self.records[i])
    }

    /// Signatures of all records of one kind, in insertion order.
    pub fn signatures(&self, kind: PatternKind) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.signature.clone())
            .collect()
    }

    /// Stores a synthesized match. A record with the same signature is
    /// replaced in place.
    pub fn remember_pattern(&mut self, index: &DegreeIndex, m: &PatternMatch, result: &Synthesized) -> String {
        let signature = pattern_signature(index, m);
        let components = m
            .terms()
            .into_iter()
            .map(|id| canonicalize(index.term(id).text()))
            .collect();
        let record = PatternRecord {
            signature: signature.clone(),
            kind: m.kind(),
            components,
            common: m.common.clone(),
            unique: m.unique.clone(),
            output: result.output,
            depth: result.depth,
            residue: result.residue.clone(),
        };
        match self.by_signature.get(&signature) {
            Some(&i) => self.records[i] = record,
            None => {
                self.by_signature.insert(signature.clone(), self.records.len());
                self.records.push(record);
            }
        }
        debug!("Remembered pattern {} -> {}", signature, result.output);
        signature
    }

    /// Tries to borrow a remembered pattern for the current function.
    ///
    /// Every component must resolve to a distinct available term with the
    /// same variables. On success those terms are claimed and the stored
    /// output is returned; no gates are created. Any missing component is a
    /// plain miss and leaves the index untouched.
    pub fn try_reuse_pattern(
        &mut self,
        signature: &str,
        index: &mut DegreeIndex,
    ) -> Option<(PatternMatch, Synthesized)> {
        let Some(&i) = self.by_signature.get(signature) else {
            self.stats.misses += 1;
            return None;
        };
        let record = &self.records[i];

        let mut ids: Vec<TermId> = Vec::with_capacity(record.components.len());
        for vars in record.component_vars() {
            match index.find_available(&vars, &ids) {
                Some(id) => ids.push(id),
                None => {
                    self.stats.misses += 1;
                    return None;
                }
            }
        }

        let shape = match (record.kind, &ids[..]) {
            (PatternKind::Single, &[high, low]) => Shape::Single { high, low },
            (PatternKind::Double, &[high, m1, m2, low]) => Shape::Double {
                high,
                middle: [m1, m2],
                low,
            },
            (PatternKind::Virtual, &[high, m1, m2]) => Shape::Virtual {
                high,
                middle: [m1, m2],
            },
            _ => {
                self.stats.misses += 1;
                return None;
            }
        };

        index.claim(&ids);
        self.stats.hits += 1;
        debug!("Reused pattern {} -> {}", signature, record.output);
        Some((
            PatternMatch {
                shape,
                common: record.common.clone(),
                unique: record.unique.clone(),
            },
            Synthesized {
                output: record.output,
                depth: record.depth,
                residue: record.residue.clone(),
            },
        ))
    }
}

/// Memoized XOR merges, keyed by depth and the unordered pair of operand
/// expressions.
#[derive(Debug, Clone, Default)]
pub struct XorCatalog {
    merges: HashMap<(u32, String, String), Signal>,
    stats: CatalogStats,
}

impl XorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        self.stats
    }

    fn key(depth: u32, left: &str, right: &str) -> (u32, String, String) {
        let a = canonicalize(left);
        let b = canonicalize(right);
        if a <= b {
            (depth, a, b)
        } else {
            (depth, b, a)
        }
    }

    pub fn remember_xor_merge(&mut self, depth: u32, left: &str, right: &str, output: Signal) {
        self.merges.insert(Self::key(depth, left, right), output);
    }

    pub fn try_reuse_xor_at_depth(&mut self, depth: u32, left: &str, right: &str) -> Option<Signal> {
        let found = self.merges.get(&Self::key(depth, left, right)).copied();
        match found {
            Some(output) => {
                self.stats.hits += 1;
                debug!("Reused XOR merge at depth {} -> {}", depth, output);
            }
            None => self.stats.misses += 1,
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::GateDag;
    use crate::pattern::find_single_factor;
    use crate::synth::synthesize;
    use crate::types::NodeId;

    use test_log::test;

    #[test]
    fn test_signature_normalized() {
        let a = signature_for(PatternKind::Double, "x5x4x3", &["x4x3", "x3x5"], Some("x3"));
        let b = signature_for(PatternKind::Double, "x3x4x5", &["x3x5", "x3x4"], Some("x3"));
        assert_eq!(a, b);
        assert_eq!(a, "double|H:x3x4x5|M:x3x4,x3x5|L:x3");
        assert_eq!(signature_for(PatternKind::Single, "x1x0", &[], Some("x0")), "single|H:x0x1|L:x0");
        assert_eq!(
            signature_for(PatternKind::Virtual, "x0x1x2x3", &["x0x1x3", "x0x1x2"], None),
            "virtual|H:x0x1x2x3|M:x0x1x2,x0x1x3"
        );
    }

    #[test]
    fn test_pattern_reuse_across_functions() {
        let mut dag = GateDag::default();
        let mut catalog = PatternCatalog::new();

        let mut first = DegreeIndex::group_by_degree("x0x1x2 + x0x1");
        let m = find_single_factor(&first, 3, 2, 2).unwrap();
        first.claim(&m.terms());
        let built = synthesize(&mut dag, &first, &m);
        let signature = catalog.remember_pattern(&first, &m, &built);
        assert_eq!(signature, "single|H:x0x1x2|L:x0x1");
        let nodes = dag.len();

        // Same monomials, different spelling and order.
        let mut second = DegreeIndex::group_by_degree("x5 + x1x0 + x2x1x0");
        let (reused, result) = catalog.try_reuse_pattern(&signature, &mut second).unwrap();
        assert_eq!(result.output, built.output);
        assert_eq!(result.depth, built.depth);
        assert_eq!(dag.len(), nodes);
        assert_eq!(second.available(2).len(), 0);
        assert_eq!(second.available(3).len(), 0);
        assert_eq!(reused.common, m.common);
        assert_eq!(catalog.stats().hits, 1);
    }

    #[test]
    fn test_pattern_reuse_miss() {
        let mut dag = GateDag::default();
        let mut catalog = PatternCatalog::new();
        let mut first = DegreeIndex::group_by_degree("x0x1x2 + x0x1");
        let m = find_single_factor(&first, 3, 2, 2).unwrap();
        first.claim(&m.terms());
        let built = synthesize(&mut dag, &first, &m);
        let signature = catalog.remember_pattern(&first, &m, &built);

        let mut other = DegreeIndex::group_by_degree("x0x1x2 + x0x3");
        assert!(catalog.try_reuse_pattern(&signature, &mut other).is_none());
        assert_eq!(other.available(3).len(), 1);
        assert!(catalog.try_reuse_pattern("single|H:x9|L:x8", &mut other).is_none());
        assert_eq!(catalog.stats().misses, 2);
    }

    #[test]
    fn test_remember_overwrites() {
        let mut dag = GateDag::default();
        let mut catalog = PatternCatalog::new();
        let index = DegreeIndex::group_by_degree("x0x1x2 + x0x1");
        let m = find_single_factor(&index, 3, 2, 2).unwrap();
        let built = synthesize(&mut dag, &index, &m);
        catalog.remember_pattern(&index, &m, &built);
        catalog.remember_pattern(&index, &m, &built);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.signatures(PatternKind::Single).len(), 1);
        assert!(catalog.signatures(PatternKind::Double).is_empty());
    }

    #[test]
    fn test_xor_catalog_unordered() {
        let mut catalog = XorCatalog::new();
        let out = Signal::node(NodeId::new(7));
        catalog.remember_xor_merge(2, "(x1x0)", "x3", out);
        assert_eq!(catalog.try_reuse_xor_at_depth(2, "x3", "(x0x1)"), Some(out));
        assert_eq!(catalog.try_reuse_xor_at_depth(3, "x3", "(x0x1)"), None);
        assert_eq!(catalog.try_reuse_xor_at_depth(2, "x3", "(x0+1)"), None);
        assert_eq!(catalog.stats(), CatalogStats { hits: 1, misses: 2 });
    }

    #[test]
    fn test_xor_key_distinguishes_negation() {
        let mut catalog = XorCatalog::new();
        catalog.remember_xor_merge(1, "(x0+1)", "x1", Signal::node(NodeId::new(0)));
        assert_eq!(catalog.try_reuse_xor_at_depth(1, "x0", "x1"), None);
    }
}
