///! Type-safe wrappers for polynomial variables and gate nodes.
///!
///! This module provides newtype wrappers that keep primary-input
///! variables and synthesized gate nodes apart, so a node index can never
///! be mistaken for a variable index.
use std::fmt;

/// A primary-input variable (0-indexed).
///
/// Variables are written `x0`, `x1`, ... in polynomial text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Indices accepted from polynomial text are strictly below this bound.
    pub const LIMIT: u32 = 1 << 16;

    /// Creates a new variable with the given index.
    pub const fn new(index: u32) -> Self {
        Var(index)
    }

    /// Returns the raw variable index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

impl From<u32> for Var {
    fn from(index: u32) -> Self {
        Var(index)
    }
}

/// Identifier of a gate node in the [`GateDag`][crate::dag::GateDag].
///
/// Ids are dense and assigned in creation order, so operands always have
/// smaller ids than the nodes that use them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node id from a raw index.
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Returns the raw node index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_display() {
        let v = Var::new(7);
        assert_eq!(v.index(), 7);
        assert_eq!(v.to_string(), "x7");
        assert!(Var::new(2) < Var::new(10));
    }

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new(12);
        assert_eq!(id.index(), 12);
        assert_eq!(id.to_string(), "t12");
        assert!(NodeId::new(3) < NodeId::new(4));
    }
}
