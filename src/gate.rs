use std::fmt::{Display, Formatter};

use crate::signal::Signal;
use crate::utils::{pairing2, pairing3, MyHash};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryType {
    And,
    Xor,
}

/// Operation kind of a gate, as handed to a netlist exporter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GateKind {
    Not,
    And,
    Xor,
}

impl Display for GateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::Not => write!(f, "NOT"),
            GateKind::And => write!(f, "AND"),
            GateKind::Xor => write!(f, "XOR2"),
        }
    }
}

/// Operation descriptor: the hash-consing key of a gate node.
///
/// Operands are ordered, so `AND(a, b)` and `AND(b, a)` are distinct
/// descriptors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Gate {
    Not(Signal),
    Binary(BinaryType, [Signal; 2]),
}

// Constructors
impl Gate {
    pub fn not(a: Signal) -> Gate {
        Gate::Not(a)
    }

    pub fn and(a: Signal, b: Signal) -> Gate {
        Gate::Binary(BinaryType::And, [a, b])
    }

    pub fn xor(a: Signal, b: Signal) -> Gate {
        Gate::Binary(BinaryType::Xor, [a, b])
    }
}

// Getters
impl Gate {
    pub fn inputs(&self) -> &[Signal] {
        match self {
            Gate::Not(input) => std::slice::from_ref(input),
            Gate::Binary(_, inputs) => inputs,
        }
    }

    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Not(_) => GateKind::Not,
            Gate::Binary(BinaryType::And, _) => GateKind::And,
            Gate::Binary(BinaryType::Xor, _) => GateKind::Xor,
        }
    }
}

impl MyHash for Gate {
    fn hash(&self) -> u64 {
        match self {
            Gate::Not(a) => pairing2(0, a.raw() as u64),
            Gate::Binary(BinaryType::And, [a, b]) => pairing3(1, a.raw() as u64, b.raw() as u64),
            Gate::Binary(BinaryType::Xor, [a, b]) => pairing3(2, a.raw() as u64, b.raw() as u64),
        }
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Not(a) => write!(f, "NOT({})", a),
            Gate::Binary(_, [a, b]) => write!(f, "{}({}, {})", self.kind(), a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Var};

    #[test]
    fn test_gate_and() {
        let a = Signal::input(Var::new(1));
        let b = Signal::input(Var::new(2));
        let gate = Gate::and(a, b);
        assert_eq!(gate.inputs(), &[a, b]);
        assert_eq!(gate.kind(), GateKind::And);
        assert_eq!(gate.to_string(), "AND(x1, x2)");
    }

    #[test]
    fn test_gate_xor() {
        let a = Signal::input(Var::new(1));
        let b = Signal::node(NodeId::new(3));
        let gate = Gate::xor(a, b);
        assert_eq!(gate.inputs(), &[a, b]);
        assert_eq!(gate.to_string(), "XOR2(x1, t3)");
    }

    #[test]
    fn test_gate_not() {
        let a = Signal::input(Var::new(4));
        let gate = Gate::not(a);
        assert_eq!(gate.inputs(), &[a]);
        assert_eq!(gate.kind(), GateKind::Not);
        assert_eq!(gate.to_string(), "NOT(x4)");
    }

    #[test]
    fn test_operand_order_matters() {
        let a = Signal::input(Var::new(1));
        let b = Signal::input(Var::new(2));
        assert_ne!(Gate::and(a, b), Gate::and(b, a));
        assert_ne!(Gate::and(a, b), Gate::xor(a, b));
    }
}
