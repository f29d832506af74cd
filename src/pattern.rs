//! Factoring pattern search over a [`DegreeIndex`].
//!
//! Every search is a pure function of the index: it inspects available
//! terms only and returns at most one match. Callers claim the matched
//! terms (see [`PatternMatch::terms`]) and loop until the search comes
//! back empty.
//!
//! Iteration order is part of the contract. High terms are visited in
//! group order, and for each of them the partner terms in group order; the
//! first acceptable tuple wins.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::index::{DegreeIndex, TermId};
use crate::varset::VarSet;

/// The three factoring strategies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PatternKind {
    /// A high term and a low term sharing a common factor.
    Single,
    /// A high term, a low term and two middle terms that each add one of
    /// the two unique variables.
    Double,
    /// A high term and two middle terms; the common quadratic is implied.
    Virtual,
}

impl PatternKind {
    /// Tag used in catalog signatures.
    pub fn tag(self) -> &'static str {
        match self {
            PatternKind::Single => "single",
            PatternKind::Double => "double",
            PatternKind::Virtual => "virtual",
        }
    }
}

impl Display for PatternKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Terms taking part in a match, per kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    Single { high: TermId, low: TermId },
    Double { high: TermId, middle: [TermId; 2], low: TermId },
    Virtual { high: TermId, middle: [TermId; 2] },
}

/// A matched factoring pattern.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PatternMatch {
    pub shape: Shape,
    /// Variables shared by the high term and its partners.
    pub common: VarSet,
    /// Variables of the high term outside the common set.
    pub unique: VarSet,
}

impl PatternMatch {
    pub fn kind(&self) -> PatternKind {
        match self.shape {
            Shape::Single { .. } => PatternKind::Single,
            Shape::Double { .. } => PatternKind::Double,
            Shape::Virtual { .. } => PatternKind::Virtual,
        }
    }

    pub fn high(&self) -> TermId {
        match self.shape {
            Shape::Single { high, .. } | Shape::Double { high, .. } | Shape::Virtual { high, .. } => high,
        }
    }

    /// Every participating term: high, then middles, then low.
    pub fn terms(&self) -> Vec<TermId> {
        match self.shape {
            Shape::Single { high, low } => vec![high, low],
            Shape::Double { high, middle, low } => vec![high, middle[0], middle[1], low],
            Shape::Virtual { high, middle } => vec![high, middle[0], middle[1]],
        }
    }
}

/// SingleFactor search.
///
/// Accepts the first (high, low) pair of available terms whose
/// intersection has exactly `required` (and at least two) variables and
/// whose difference `high \ low` has one or two variables.
pub fn find_single_factor(index: &DegreeIndex, high: usize, low: usize, required: usize) -> Option<PatternMatch> {
    for &h in index.available(high) {
        let hv = index.term(h).vars();
        for &l in index.available(low) {
            if h == l {
                continue;
            }
            let lv = index.term(l).vars();
            let common = hv.intersection(lv);
            if common.len() < 2 || common.len() != required {
                continue;
            }
            let unique = hv.difference(lv);
            if (1..=2).contains(&unique.len()) {
                debug!("SingleFactor: {} with {}", index.term(h), index.term(l));
                return Some(PatternMatch {
                    shape: Shape::Single { high: h, low: l },
                    common,
                    unique,
                });
            }
        }
    }
    None
}

/// DoubleFactor search.
///
/// For a (high, low) pair with exactly `required` common variables and two
/// unique ones, scans the available middle terms for those sharing as many
/// variables with the low term and adding exactly one variable, which must
/// be unique. The pair is accepted only when exactly two such middle terms
/// exist.
pub fn find_double_factor(
    index: &DegreeIndex,
    high: usize,
    middle: usize,
    low: usize,
    required: usize,
) -> Option<PatternMatch> {
    for &h in index.available(high) {
        let hv = index.term(h).vars();
        for &l in index.available(low) {
            if h == l {
                continue;
            }
            let lv = index.term(l).vars();
            let common = hv.intersection(lv);
            if common.len() < 2 || common.len() != required {
                continue;
            }
            let unique = hv.difference(lv);
            if unique.len() != 2 {
                continue;
            }

            let found: Vec<TermId> = index
                .available(middle)
                .iter()
                .copied()
                .filter(|&m| m != h && m != l)
                .filter(|&m| {
                    let mv = index.term(m).vars();
                    let shared = mv.intersection(lv);
                    let extra = mv.difference(lv);
                    shared.len() == common.len()
                        && extra.len() == 1
                        && extra.iter().all(|v| unique.contains(v))
                })
                .collect();

            if let [m1, m2] = found[..] {
                debug!(
                    "DoubleFactor: {} with {}, {} and {}",
                    index.term(h),
                    index.term(m1),
                    index.term(m2),
                    index.term(l)
                );
                return Some(PatternMatch {
                    shape: Shape::Double {
                        high: h,
                        middle: [m1, m2],
                        low: l,
                    },
                    common,
                    unique,
                });
            }
        }
    }
    None
}

/// VirtualFactor search.
///
/// Only `required == 2` is supported. For every available high term of
/// exactly `high` variables, each pair `{a, b}` of its variables (in
/// ascending order) is tried as the common set `C`. The rest must be two
/// unique variables `u1 < u2`, and both `C ∪ {u1}` and `C ∪ {u2}` must be
/// available middle terms.
pub fn find_virtual_factor(index: &DegreeIndex, high: usize, middle: usize, required: usize) -> Option<PatternMatch> {
    if required != 2 {
        return None;
    }
    for &h in index.available(high) {
        let hv = index.term(h).vars();
        if hv.len() != high {
            continue;
        }
        let vars = hv.to_vec();
        for i in 0..vars.len() {
            for j in (i + 1)..vars.len() {
                let common: VarSet = [vars[i], vars[j]].into_iter().collect();
                let unique = hv.difference(&common);
                if unique.len() != 2 {
                    continue;
                }
                let u = unique.to_vec();
                let mut need1 = common.clone();
                need1.insert(u[0]);
                let mut need2 = common.clone();
                need2.insert(u[1]);

                let mut m1 = None;
                let mut m2 = None;
                for &m in index.available(middle) {
                    if m == h {
                        continue;
                    }
                    let mv = index.term(m).vars();
                    if m1.is_none() && *mv == need1 {
                        m1 = Some(m);
                    } else if m2.is_none() && *mv == need2 {
                        m2 = Some(m);
                    }
                    if m1.is_some() && m2.is_some() {
                        break;
                    }
                }

                if let (Some(m1), Some(m2)) = (m1, m2) {
                    debug!(
                        "VirtualFactor: {} with {} and {}, implied {}",
                        index.term(h),
                        index.term(m1),
                        index.term(m2),
                        common
                    );
                    return Some(PatternMatch {
                        shape: Shape::Virtual {
                            high: h,
                            middle: [m1, m2],
                        },
                        common,
                        unique,
                    });
                }
            }
        }
    }
    None
}

/// One entry of a pattern schedule: a strategy with its degrees.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PatternStep {
    Single {
        high: usize,
        low: usize,
        common: usize,
    },
    Double {
        high: usize,
        middle: usize,
        low: usize,
        common: usize,
    },
    Virtual {
        high: usize,
        middle: usize,
        common: usize,
    },
}

impl PatternStep {
    pub fn kind(&self) -> PatternKind {
        match self {
            PatternStep::Single { .. } => PatternKind::Single,
            PatternStep::Double { .. } => PatternKind::Double,
            PatternStep::Virtual { .. } => PatternKind::Virtual,
        }
    }

    /// Runs the search this step describes.
    pub fn find(&self, index: &DegreeIndex) -> Option<PatternMatch> {
        match *self {
            PatternStep::Single { high, low, common } => find_single_factor(index, high, low, common),
            PatternStep::Double {
                high,
                middle,
                low,
                common,
            } => find_double_factor(index, high, middle, low, common),
            PatternStep::Virtual { high, middle, common } => find_virtual_factor(index, high, middle, common),
        }
    }
}

impl Display for PatternStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternStep::Single { high, low, common } => write!(f, "single({}+{}, c={})", high, low, common),
            PatternStep::Double {
                high,
                middle,
                low,
                common,
            } => write!(f, "double({}+2*{}+{}, c={})", high, middle, low, common),
            PatternStep::Virtual { high, middle, common } => {
                write!(f, "virtual({}+2*{}, c={})", high, middle, common)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Var;

    use test_log::test;

    fn set(vars: &[u32]) -> VarSet {
        vars.iter().map(|&v| Var::new(v)).collect()
    }

    #[test]
    fn test_single_factor_first_partner() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x6");
        let m = find_single_factor(&index, 6, 5, 5).unwrap();
        assert_eq!(m.kind(), PatternKind::Single);
        assert_eq!(m.common, set(&[0, 1, 2, 3, 4]));
        assert_eq!(m.unique, set(&[5]));
        assert_eq!(m.terms(), vec![index.available(6)[0], index.available(5)[0]]);
    }

    #[test]
    fn test_single_factor_common_must_match_exactly() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x6");
        // The first low term shares five variables, so only the second fits.
        let m = find_single_factor(&index, 6, 5, 4).unwrap();
        assert_eq!(m.common, set(&[0, 1, 2, 3]));
        assert_eq!(m.unique, set(&[4, 5]));
        assert_eq!(m.terms()[1], index.available(5)[1]);
    }

    #[test]
    fn test_single_factor_none() {
        let index = DegreeIndex::group_by_degree("x0x1x2 + x3x4");
        assert!(find_single_factor(&index, 3, 2, 2).is_none());
        assert!(find_single_factor(&index, 4, 2, 2).is_none());
        // Fewer than two common variables never qualify.
        let index = DegreeIndex::group_by_degree("x0x1 + x0");
        assert!(find_single_factor(&index, 2, 1, 1).is_none());
    }

    #[test]
    fn test_single_factor_skips_claimed() {
        let mut index = DegreeIndex::group_by_degree("x0x1x2 + x0x1 + x0x1x3");
        let first = find_single_factor(&index, 3, 2, 2).unwrap();
        index.claim(&first.terms());
        assert!(find_single_factor(&index, 3, 2, 2).is_none());
    }

    #[test]
    fn test_double_factor() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x5 + x0x1x2x3");
        let m = find_double_factor(&index, 6, 5, 4, 4).unwrap();
        assert_eq!(m.kind(), PatternKind::Double);
        assert_eq!(m.common, set(&[0, 1, 2, 3]));
        assert_eq!(m.unique, set(&[4, 5]));
        assert_eq!(m.terms().len(), 4);
    }

    #[test]
    fn test_double_factor_needs_exactly_two_middles() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3");
        assert!(find_double_factor(&index, 6, 5, 4, 4).is_none());
        let index = DegreeIndex::group_by_degree(
            "x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x5 + x0x1x2x3x4 + x0x1x2x3",
        );
        assert!(find_double_factor(&index, 6, 5, 4, 4).is_none());
    }

    #[test]
    fn test_virtual_factor() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3 + x0x2x3 + x0x1x2");
        let m = find_virtual_factor(&index, 4, 3, 2).unwrap();
        assert_eq!(m.kind(), PatternKind::Virtual);
        // Pairs are tried in order {0,1}, {0,2}, ...; {0,2} is the first with both targets.
        assert_eq!(m.common, set(&[0, 2]));
        assert_eq!(m.unique, set(&[1, 3]));
        match m.shape {
            Shape::Virtual { middle, .. } => {
                assert_eq!(index.term(middle[0]).vars(), &set(&[0, 1, 2]));
                assert_eq!(index.term(middle[1]).vars(), &set(&[0, 2, 3]));
            }
            _ => panic!("expected a virtual match"),
        }
    }

    #[test]
    fn test_virtual_factor_requires_two_common() {
        let index = DegreeIndex::group_by_degree("x0x1x2x3 + x0x2x3 + x0x1x2");
        assert!(find_virtual_factor(&index, 4, 3, 3).is_none());
        let index = DegreeIndex::group_by_degree("x0x1x2x3 + x0x2x3");
        assert!(find_virtual_factor(&index, 4, 3, 2).is_none());
    }

    #[test]
    fn test_step_dispatch() {
        let index = DegreeIndex::group_by_degree("x0x1x2 + x0x1");
        let step = PatternStep::Single {
            high: 3,
            low: 2,
            common: 2,
        };
        assert_eq!(step.kind(), PatternKind::Single);
        assert!(step.find(&index).is_some());
        assert_eq!(step.to_string(), "single(3+2, c=2)");
    }
}
