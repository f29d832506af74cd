use std::fmt::{Debug, Display, Formatter};

use crate::types::{NodeId, Var};

/// Reference to a value in the circuit: a constant, a primary input or a
/// gate node.
///
/// Layout of the raw `u32`: `0` and `1` are the constants, values with the
/// top bit set are primary inputs, everything else is a gate node offset
/// by two.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Signal(u32);

const MAGIC: u32 = 1 << 31; // 0x8000_0000
const NODE_OFFSET: u32 = 2;

// Constructors
impl Signal {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    pub const fn input(var: Var) -> Self {
        assert!(var.index() < MAGIC);
        Self(MAGIC | var.index())
    }

    pub const fn node(id: NodeId) -> Self {
        let raw = id.index() as u32 + NODE_OFFSET;
        assert!(raw < MAGIC);
        Self(raw)
    }
}

// Getters
impl Signal {
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }

    pub const fn var(&self) -> Option<Var> {
        if self.is_input() {
            Some(Var::new(self.0 & !MAGIC))
        } else {
            None
        }
    }

    pub const fn node_id(&self) -> Option<NodeId> {
        if self.is_node() {
            Some(NodeId::new(self.0 - NODE_OFFSET))
        } else {
            None
        }
    }
}

// Checks
impl Signal {
    pub const fn is_const(&self) -> bool {
        self.0 < NODE_OFFSET
    }

    pub const fn is_input(&self) -> bool {
        self.0 & MAGIC != 0
    }

    pub const fn is_node(&self) -> bool {
        !self.is_input() && !self.is_const()
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl From<Var> for Signal {
    fn from(var: Var) -> Self {
        Self::input(var)
    }
}

impl From<NodeId> for Signal {
    fn from(id: NodeId) -> Self {
        Self::node(id)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_const() {
            write!(f, "{}", self.0)
        } else if let Some(var) = self.var() {
            write!(f, "{}", var)
        } else {
            write!(f, "t{}", self.0 - NODE_OFFSET)
        }
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
