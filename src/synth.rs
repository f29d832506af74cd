//! Gate synthesis for matched patterns and leftover monomials.
//!
//! A matched pattern with common set `C` and unique set `U` is built as
//! `C · Π (u + 1)`, which expands to the sum of `C ∪ S` over all subsets
//! `S ⊆ U`. Whatever that expansion does not share with the consumed terms
//! is the pattern's *residue*; it is handed to the leftover stage so that
//! the final sum stays equal to the source polynomial.

use log::debug;

use crate::dag::GateDag;
use crate::index::DegreeIndex;
use crate::ledger::{DepthLedger, EntryTag};
use crate::pattern::PatternMatch;
use crate::signal::Signal;
use crate::varset::VarSet;

/// Output of a synthesized (or reused) pattern subtree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Synthesized {
    pub output: Signal,
    pub depth: u32,
    /// Monomials the subtree computes beyond (or misses from) the consumed
    /// terms, in emission order.
    pub residue: Vec<VarSet>,
}

/// Toggles `item` in `items` modulo 2, keeping first-occurrence order of
/// the survivors.
fn toggle(items: &mut Vec<VarSet>, item: VarSet) {
    match items.iter().position(|x| *x == item) {
        Some(pos) => {
            items.remove(pos);
        }
        None => items.push(item),
    }
}

/// Expansion of `C · Π (u + 1)`: one monomial per subset of `unique`,
/// in binary counting order over the ascending unique variables.
pub fn expansion(common: &VarSet, unique: &VarSet) -> Vec<VarSet> {
    let u = unique.to_vec();
    (0..1usize << u.len())
        .map(|mask| {
            let subset: VarSet = u
                .iter()
                .enumerate()
                .filter(|&(i, _)| mask & (1 << i) != 0)
                .map(|(_, &var)| var)
                .collect();
            common.union(&subset)
        })
        .collect()
}

/// GF(2) difference between the subtree's expansion and the consumed
/// terms of the match.
pub fn residue(index: &DegreeIndex, m: &PatternMatch) -> Vec<VarSet> {
    let mut items = Vec::new();
    for monomial in expansion(&m.common, &m.unique) {
        toggle(&mut items, monomial);
    }
    for id in m.terms() {
        toggle(&mut items, index.term(id).vars().clone());
    }
    items
}

/// Builds the gate subtree of a match.
///
/// One NOT gate at depth 0 per unique variable (ascending), then an AND
/// tree over the common variables followed by the NOT outputs, starting at
/// depth 1.
pub fn synthesize(dag: &mut GateDag, index: &DegreeIndex, m: &PatternMatch) -> Synthesized {
    let nots: Vec<Signal> = m.unique.iter().map(|u| dag.not(Signal::input(u), 0)).collect();
    let inputs: Vec<Signal> = m.common.iter().map(Signal::input).chain(nots).collect();
    let (output, depth) = dag.build_and_tree(&inputs, 1);
    let residue = residue(index, m);
    debug!(
        "Synthesized {} pattern {}·{} -> {} at depth {}, residue {:?}",
        m.kind(),
        m.common,
        m.unique,
        output,
        depth,
        residue.iter().map(|r| r.to_string()).collect::<Vec<_>>()
    );
    Synthesized { output, depth, residue }
}

/// Terms that survive the leftover stage for one degree.
#[derive(Debug, Clone, Default)]
pub struct LeftoverReport {
    /// Number of leftover items that cancelled in pairs.
    pub cancelled: usize,
    /// Number of ledger entries produced.
    pub emitted: usize,
}

/// Hands every remaining term and every residue monomial to the ledger.
///
/// Degrees are visited `2, 3, ..., max`, then `1`, then `0`. Within a
/// degree the available terms (group order) come first, then the residue
/// monomials of that degree (emission order); equal monomials cancel in
/// pairs. Degree `>= 2` survivors become an AND tree over their ascending
/// variables starting at depth 1, degree 1 survivors are the raw input and
/// the constant is the constant-one signal.
pub fn emit_leftovers(
    dag: &mut GateDag,
    index: &mut DegreeIndex,
    residue: &[VarSet],
    ledger: &mut DepthLedger,
) -> LeftoverReport {
    let max = residue
        .iter()
        .map(|r| r.len())
        .chain(std::iter::once(index.max_degree()))
        .max()
        .unwrap_or(0);
    let order = (2..=max).chain([1, 0]);

    let mut report = LeftoverReport::default();
    for degree in order {
        let mut items: Vec<(VarSet, usize)> = Vec::new();
        let taken = index.take_leftovers(degree);
        let sources = taken
            .iter()
            .map(|&id| index.term(id).vars().clone())
            .chain(residue.iter().filter(|r| r.len() == degree).cloned());
        let mut total = 0;
        for vars in sources {
            total += 1;
            match items.iter_mut().find(|(v, _)| *v == vars) {
                Some((_, count)) => *count += 1,
                None => items.push((vars, 1)),
            }
        }
        let survivors: Vec<VarSet> = items
            .into_iter()
            .filter(|(_, count)| count % 2 == 1)
            .map(|(v, _)| v)
            .collect();
        report.cancelled += total - survivors.len();

        for vars in survivors {
            let (output, depth, tag) = match degree {
                0 => (Signal::one(), 0, EntryTag::Constant),
                1 => {
                    let var = vars.iter().next().map(Signal::input).unwrap_or(Signal::one());
                    (var, 0, EntryTag::Leftover { degree })
                }
                _ => {
                    let inputs: Vec<Signal> = vars.iter().map(Signal::input).collect();
                    let (output, depth) = dag.build_and_tree(&inputs, 1);
                    (output, depth, EntryTag::Leftover { degree })
                }
            };
            let expression = dag.expression(output);
            debug!("Leftover {} -> {} at depth {}", vars, output, depth);
            ledger.push(depth, output, tag, Some(expression));
            report.emitted += 1;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use crate::pattern::{find_single_factor, find_virtual_factor};
    use crate::types::Var;

    use test_log::test;

    fn set(vars: &[u32]) -> VarSet {
        vars.iter().map(|&v| Var::new(v)).collect()
    }

    #[test]
    fn test_expansion() {
        let e = expansion(&set(&[0, 1]), &set(&[4, 5]));
        assert_eq!(e, vec![set(&[0, 1]), set(&[0, 1, 4]), set(&[0, 1, 5]), set(&[0, 1, 4, 5])]);
        assert_eq!(expansion(&set(&[2]), &VarSet::new()), vec![set(&[2])]);
    }

    #[test]
    fn test_synthesize_single() {
        let mut dag = GateDag::default();
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x6");
        let m = find_single_factor(&index, 6, 5, 5).unwrap();
        let s = synthesize(&mut dag, &index, &m);
        // NOT(x5), then ((x0x1)(x2x3))(x4 t0): three layers.
        assert_eq!(dag.count(GateKind::Not), 1);
        assert_eq!(dag.count(GateKind::And), 5);
        assert_eq!(s.depth, 3);
        assert_eq!(dag.depth(s.output), 3);
        assert!(s.residue.is_empty());
    }

    #[test]
    fn test_synthesize_concrete_scenario() {
        let mut dag = GateDag::default();
        let index = DegreeIndex::group_by_degree("x0x1x2x3x4x5 + x0x1x2x3x4 + x0x1x2x3x6");
        let m = find_single_factor(&index, 6, 5, 4).unwrap();
        let s = synthesize(&mut dag, &index, &m);
        assert_eq!(dag.count(GateKind::Not), 2);
        let not4 = dag.node(crate::types::NodeId::new(0));
        assert_eq!(not4.expression, "(x4+1)");
        assert_eq!(not4.depth, 0);
        // x0x1x2x3 (x4+1)(x5+1) + x0x1x2x3x4x5 + x0x1x2x3x6
        assert_eq!(
            s.residue,
            vec![set(&[0, 1, 2, 3]), set(&[0, 1, 2, 3, 4]), set(&[0, 1, 2, 3, 5]), set(&[0, 1, 2, 3, 6])]
        );
    }

    #[test]
    fn test_synthesize_virtual_residue() {
        let mut dag = GateDag::default();
        let index = DegreeIndex::group_by_degree("x0x1x2x3 + x0x2x3 + x0x1x2");
        let m = find_virtual_factor(&index, 4, 3, 2).unwrap();
        let s = synthesize(&mut dag, &index, &m);
        assert_eq!(s.residue, vec![set(&[0, 2])]);
        // x0 x2 t(x1+1) t(x3+1) in two layers.
        assert_eq!(s.depth, 2);
    }

    #[test]
    fn test_emit_leftovers_cancels() {
        let mut dag = GateDag::default();
        let mut index = DegreeIndex::group_by_degree("x0x1 + x2 + x1x0 + x3x4x5 + 1");
        let mut ledger = DepthLedger::new();
        let report = emit_leftovers(&mut dag, &mut index, &[set(&[3, 4, 5]), set(&[6, 7])], &mut ledger);
        assert_eq!(report.cancelled, 4);
        assert_eq!(report.emitted, 3);
        let outputs: Vec<String> = ledger.entries().iter().map(|e| e.output.to_string()).collect();
        assert_eq!(outputs, vec!["t0", "x2", "1"]);
        assert_eq!(ledger.entries()[0].depth, 1);
        assert_eq!(ledger.entries()[2].tag, EntryTag::Constant);
        assert_eq!(index.count(crate::index::TermState::Leftover), 5);
    }

    #[test]
    fn test_emit_leftovers_tree_depth() {
        let mut dag = GateDag::default();
        let mut index = DegreeIndex::group_by_degree("x3x1x2x0x4");
        let mut ledger = DepthLedger::new();
        emit_leftovers(&mut dag, &mut index, &[], &mut ledger);
        let entry = &ledger.entries()[0];
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.expression.as_deref(), Some("(((x0x1)(x2x3))x4)"));
    }
}
