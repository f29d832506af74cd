use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::pattern::PatternKind;
use crate::signal::Signal;

/// What produced a ledger entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EntryTag {
    /// Output of a pattern subtree, freshly built or borrowed from the catalog.
    Pattern { kind: PatternKind, reused: bool },
    /// A monomial that no pattern consumed.
    Leftover { degree: usize },
    /// The constant term.
    Constant,
}

impl Display for EntryTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryTag::Pattern { kind, reused: false } => write!(f, "{}", kind),
            EntryTag::Pattern { kind, reused: true } => write!(f, "{} (reused)", kind),
            EntryTag::Leftover { degree } => write!(f, "leftover degree {}", degree),
            EntryTag::Constant => write!(f, "constant"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LedgerEntry {
    pub seq: usize,
    /// Depth at which the output becomes available.
    pub depth: u32,
    pub output: Signal,
    pub tag: EntryTag,
    pub expression: Option<String>,
}

/// Outputs of one function awaiting the final XOR reduction.
///
/// The ledger accepts entries while the function is processed and is then
/// moved into [`merge_all`][crate::merge::merge_all], which drains it.
#[derive(Debug, Clone, Default)]
pub struct DepthLedger {
    entries: Vec<LedgerEntry>,
}

impl DepthLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an output and returns its sequence index.
    pub fn push(&mut self, depth: u32, output: Signal, tag: EntryTag, expression: Option<String>) -> usize {
        let seq = self.entries.len();
        self.entries.push(LedgerEntry {
            seq,
            depth,
            output,
            tag,
            expression,
        });
        seq
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outputs bucketed by depth, each bucket in sequence order.
    pub fn by_depth(&self) -> BTreeMap<u32, Vec<Signal>> {
        let mut buckets: BTreeMap<u32, Vec<Signal>> = BTreeMap::new();
        for entry in &self.entries {
            buckets.entry(entry.depth).or_default().push(entry.output);
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Var};

    #[test]
    fn test_push_and_bucket() {
        let mut ledger = DepthLedger::new();
        assert!(ledger.is_empty());
        let a = Signal::node(NodeId::new(3));
        let b = Signal::input(Var::new(1));
        let c = Signal::node(NodeId::new(5));
        assert_eq!(ledger.push(2, a, EntryTag::Pattern { kind: PatternKind::Single, reused: false }, None), 0);
        assert_eq!(ledger.push(0, b, EntryTag::Leftover { degree: 1 }, Some("x1".into())), 1);
        assert_eq!(ledger.push(2, c, EntryTag::Leftover { degree: 3 }, None), 2);
        assert_eq!(ledger.len(), 3);

        let buckets = ledger.by_depth();
        assert_eq!(buckets.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(buckets[&2], vec![a, c]);
        assert_eq!(ledger.entries()[1].seq, 1);
    }

    #[test]
    fn test_tag_display() {
        let tag = EntryTag::Pattern {
            kind: PatternKind::Virtual,
            reused: true,
        };
        assert_eq!(tag.to_string(), "virtual (reused)");
        assert_eq!(EntryTag::Leftover { degree: 4 }.to_string(), "leftover degree 4");
    }
}
