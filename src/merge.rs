use log::debug;

use crate::catalog::XorCatalog;
use crate::dag::GateDag;
use crate::ledger::DepthLedger;
use crate::signal::Signal;

/// Result of reducing a ledger to one signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MergeOutcome {
    pub output: Signal,
    /// Depth of the last XOR layer (or of the single input).
    pub depth: u32,
    /// XOR steps that produced a node not borrowed from the catalog.
    pub xor_built: usize,
    /// XOR steps answered by the catalog.
    pub xor_reused: usize,
}

/// XORs `items` pairwise, left to right, starting at `level`. Odd items
/// pass through. Returns the root and the depth of the last layer.
fn reduce_bucket(
    dag: &mut GateDag,
    xors: &mut XorCatalog,
    reuse: bool,
    mut items: Vec<Signal>,
    mut level: u32,
    outcome: &mut MergeOutcome,
) -> (Signal, u32) {
    while items.len() > 1 {
        let mut next = Vec::with_capacity((items.len() + 1) / 2);
        for pair in items.chunks(2) {
            match pair {
                &[a, b] => {
                    let left = dag.expression(a);
                    let right = dag.expression(b);
                    let reused = if reuse {
                        xors.try_reuse_xor_at_depth(level, &left, &right)
                    } else {
                        None
                    };
                    let output = match reused {
                        Some(output) => {
                            outcome.xor_reused += 1;
                            output
                        }
                        None => {
                            let output = dag.xor(a, b, level);
                            xors.remember_xor_merge(level, &left, &right, output);
                            outcome.xor_built += 1;
                            output
                        }
                    };
                    debug!("Merge {} ^ {} -> {} at depth {}", a, b, output, level);
                    next.push(output);
                }
                &[a] => next.push(a),
                _ => unreachable!(),
            }
        }
        items = next;
        level += 1;
    }
    (items[0], level - 1)
}

/// Reduces every ledger entry to a single output through depth-bucketed
/// XOR layers.
///
/// Buckets are processed in ascending depth. A bucket with two or more
/// items is reduced starting at `depth + 1`; its result joins the bucket of
/// its own completion depth. A bucket with a single item hands it to the
/// next remaining bucket. When no bucket is left, the last result is the
/// output. An empty ledger yields constant zero.
///
/// The ledger is consumed, so it cannot be merged twice.
pub fn merge_all(ledger: DepthLedger, dag: &mut GateDag, xors: &mut XorCatalog, reuse: bool) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        output: Signal::zero(),
        depth: 0,
        xor_built: 0,
        xor_reused: 0,
    };
    let mut buckets = ledger.by_depth();

    while let Some((depth, items)) = buckets.pop_first() {
        let (result, done) = if items.len() >= 2 {
            reduce_bucket(dag, xors, reuse, items, depth + 1, &mut outcome)
        } else {
            (items[0], depth)
        };
        debug!("Bucket {} reduced to {} at depth {}", depth, result, done);

        if buckets.is_empty() {
            outcome.output = result;
            outcome.depth = done;
            break;
        }
        if done > depth {
            buckets.entry(done).or_default().push(result);
        } else if let Some(mut next) = buckets.first_entry() {
            next.get_mut().push(result);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use crate::ledger::EntryTag;
    use crate::types::Var;

    use test_log::test;

    fn x(i: u32) -> Signal {
        Signal::input(Var::new(i))
    }

    fn leftover(ledger: &mut DepthLedger, depth: u32, s: Signal) {
        ledger.push(depth, s, EntryTag::Leftover { degree: 1 }, None);
    }

    #[test]
    fn test_merge_empty() {
        let mut dag = GateDag::default();
        let mut xors = XorCatalog::new();
        let outcome = merge_all(DepthLedger::new(), &mut dag, &mut xors, true);
        assert_eq!(outcome.output, Signal::zero());
        assert_eq!(outcome.depth, 0);
    }

    #[test]
    fn test_merge_single() {
        let mut dag = GateDag::default();
        let mut xors = XorCatalog::new();
        let mut ledger = DepthLedger::new();
        leftover(&mut ledger, 0, x(3));
        let outcome = merge_all(ledger, &mut dag, &mut xors, true);
        assert_eq!(outcome.output, x(3));
        assert_eq!(outcome.depth, 0);
        assert!(dag.is_empty());
    }

    #[test]
    fn test_merge_one_bucket() {
        let mut dag = GateDag::default();
        let mut xors = XorCatalog::new();
        let mut ledger = DepthLedger::new();
        for i in 0..3 {
            leftover(&mut ledger, 0, x(i));
        }
        let outcome = merge_all(ledger, &mut dag, &mut xors, true);
        // (x0 ^ x1) at depth 1, then ^ x2 at depth 2.
        assert_eq!(outcome.depth, 2);
        assert_eq!(dag.count(GateKind::Xor), 2);
        assert_eq!(dag.expression(outcome.output), "((x0 + x1) + x2)");
        assert_eq!(outcome.xor_built, 2);
    }

    #[test]
    fn test_merge_carries_every_bucket() {
        let mut dag = GateDag::default();
        let a = dag.and(x(0), x(1), 1);
        let b = dag.and(x(2), x(3), 1);
        let mut xors = XorCatalog::new();
        let mut ledger = DepthLedger::new();
        leftover(&mut ledger, 0, x(4));
        leftover(&mut ledger, 0, x(5));
        leftover(&mut ledger, 1, a);
        leftover(&mut ledger, 3, b);
        let outcome = merge_all(ledger, &mut dag, &mut xors, true);
        // Bucket 0 -> depth 1, joins bucket 1 (a, r0) -> depth 2,
        // lone bucket 2 hands over to bucket 3 (b, r1) -> depth 4.
        assert_eq!(outcome.depth, 4);
        assert_eq!(dag.count(GateKind::Xor), 3);
        assert_eq!(
            dag.expression(outcome.output),
            "((x2x3) + ((x0x1) + (x4 + x5)))"
        );
    }

    #[test]
    fn test_merge_reuses_xor() {
        let mut dag = GateDag::default();
        let mut xors = XorCatalog::new();
        let mut first = DepthLedger::new();
        leftover(&mut first, 0, x(0));
        leftover(&mut first, 0, x(1));
        let one = merge_all(first, &mut dag, &mut xors, true);

        let mut second = DepthLedger::new();
        leftover(&mut second, 0, x(1));
        leftover(&mut second, 0, x(0));
        let two = merge_all(second, &mut dag, &mut xors, true);
        assert_eq!(one.output, two.output);
        assert_eq!(two.xor_reused, 1);
        assert_eq!(dag.count(GateKind::Xor), 1);

        let mut third = DepthLedger::new();
        leftover(&mut third, 0, x(1));
        leftover(&mut third, 0, x(0));
        let three = merge_all(third, &mut dag, &mut xors, false);
        assert_ne!(three.output, one.output);
        assert_eq!(dag.count(GateKind::Xor), 2);
    }
}
