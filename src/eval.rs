//! Exhaustive evaluation of polynomials and circuits.
//!
//! A [`TruthTable`] stores a function of `n` variables as a `2^n`-bit
//! integer: bit `i` is the value under the assignment where variable `j`
//! equals bit `j` of `i`. Tables are combined with the usual operators,
//! which makes comparing a synthesized circuit against its source
//! polynomial a single equality check.

use std::collections::HashMap;
use std::ops::{BitAnd, BitXor, Not};

use num_bigint::BigUint;

use crate::dag::GateDag;
use crate::gate::{BinaryType, Gate};
use crate::index::DegreeIndex;
use crate::signal::Signal;
use crate::types::{NodeId, Var};
use crate::varset::VarSet;

/// Largest supported number of variables.
pub const MAX_VARS: usize = 24;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TruthTable {
    num_vars: usize,
    bits: BigUint,
}

impl TruthTable {
    fn mask(num_vars: usize) -> BigUint {
        (BigUint::from(1u32) << (1usize << num_vars)) - 1u32
    }

    pub fn zero(num_vars: usize) -> Self {
        assert!(num_vars <= MAX_VARS, "At most {} variables are supported", MAX_VARS);
        Self {
            num_vars,
            bits: BigUint::default(),
        }
    }

    pub fn one(num_vars: usize) -> Self {
        assert!(num_vars <= MAX_VARS, "At most {} variables are supported", MAX_VARS);
        Self {
            num_vars,
            bits: Self::mask(num_vars),
        }
    }

    /// The projection onto one variable.
    pub fn var(num_vars: usize, var: Var) -> Self {
        let mut table = Self::zero(num_vars);
        let j = var.index() as usize;
        assert!(j < num_vars, "Variable {} is out of range", var);
        for i in 0..(1u64 << num_vars) {
            if (i >> j) & 1 == 1 {
                table.bits.set_bit(i, true);
            }
        }
        table
    }

    /// Product of the variables of a monomial (`1` for the empty set).
    pub fn monomial(num_vars: usize, vars: &VarSet) -> Self {
        vars.iter()
            .fold(Self::one(num_vars), |acc, v| &acc & &Self::var(num_vars, v))
    }

    /// Sum of monomials.
    pub fn polynomial<'a>(num_vars: usize, monomials: impl IntoIterator<Item = &'a VarSet>) -> Self {
        monomials
            .into_iter()
            .fold(Self::zero(num_vars), |acc, m| &acc ^ &Self::monomial(num_vars, m))
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Value under the assignment encoded by `assignment`.
    pub fn get(&self, assignment: u64) -> bool {
        self.bits.bit(assignment)
    }

    /// Number of satisfying assignments.
    pub fn weight(&self) -> u64 {
        (0..(1u64 << self.num_vars)).filter(|&i| self.get(i)).count() as u64
    }
}

impl BitAnd for &TruthTable {
    type Output = TruthTable;

    fn bitand(self, rhs: Self) -> Self::Output {
        assert_eq!(self.num_vars, rhs.num_vars);
        TruthTable {
            num_vars: self.num_vars,
            bits: &self.bits & &rhs.bits,
        }
    }
}

impl BitXor for &TruthTable {
    type Output = TruthTable;

    fn bitxor(self, rhs: Self) -> Self::Output {
        assert_eq!(self.num_vars, rhs.num_vars);
        TruthTable {
            num_vars: self.num_vars,
            bits: &self.bits ^ &rhs.bits,
        }
    }
}

impl Not for &TruthTable {
    type Output = TruthTable;

    fn not(self) -> Self::Output {
        TruthTable {
            num_vars: self.num_vars,
            bits: &TruthTable::mask(self.num_vars) ^ &self.bits,
        }
    }
}

impl DegreeIndex {
    /// Truth table of the whole source polynomial, regardless of which
    /// terms have been consumed.
    pub fn truth_table(&self, num_vars: usize) -> TruthTable {
        TruthTable::polynomial(num_vars, self.terms().map(|(_, t)| t.vars()))
    }
}

/// Truth table of a polynomial given as text.
pub fn polynomial_truth_table(polynomial: &str, num_vars: usize) -> TruthTable {
    DegreeIndex::group_by_degree(polynomial).truth_table(num_vars)
}

impl GateDag {
    /// Nodes reachable from `signal`, in ascending id order.
    fn cone(&self, signal: Signal) -> Vec<NodeId> {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![signal];
        while let Some(s) = stack.pop() {
            if let Some(id) = s.node_id() {
                if !seen[id.index()] {
                    seen[id.index()] = true;
                    stack.extend_from_slice(self.node(id).operands());
                }
            }
        }
        (0..self.len()).filter(|&i| seen[i]).map(|i| NodeId::new(i as u32)).collect()
    }

    /// One past the largest primary input reachable from `signal`.
    pub fn support_size(&self, signal: Signal) -> usize {
        self.cone(signal)
            .into_iter()
            .flat_map(|id| self.node(id).operands().iter().filter_map(|s| s.var()))
            .chain(signal.var())
            .map(|v| v.index() as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Truth table of a signal over `num_vars` inputs.
    ///
    /// Only the nodes reachable from `signal` are evaluated, so nodes built
    /// for other functions over wider inputs do not matter.
    ///
    /// # Panics
    ///
    /// Panics if `num_vars` exceeds [`MAX_VARS`] or is below
    /// [`support_size`][Self::support_size] of `signal`.
    pub fn truth_table(&self, signal: Signal, num_vars: usize) -> TruthTable {
        let mut tables: HashMap<NodeId, TruthTable> = HashMap::new();
        let eval = |s: Signal, tables: &HashMap<NodeId, TruthTable>| -> TruthTable {
            if s == Signal::zero() {
                TruthTable::zero(num_vars)
            } else if s == Signal::one() {
                TruthTable::one(num_vars)
            } else if let Some(v) = s.var() {
                TruthTable::var(num_vars, v)
            } else {
                s.node_id()
                    .and_then(|id| tables.get(&id))
                    .cloned()
                    .unwrap_or_else(|| TruthTable::zero(num_vars))
            }
        };

        // Operands always have smaller ids than their users.
        for id in self.cone(signal) {
            let table = match self.node(id).gate {
                Gate::Not(a) => !&eval(a, &tables),
                Gate::Binary(BinaryType::And, [a, b]) => &eval(a, &tables) & &eval(b, &tables),
                Gate::Binary(BinaryType::Xor, [a, b]) => &eval(a, &tables) ^ &eval(b, &tables),
            };
            tables.insert(id, table);
        }
        eval(signal, &tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn x(i: u32) -> Signal {
        Signal::input(Var::new(i))
    }

    #[test]
    fn test_constants() {
        assert_eq!(TruthTable::zero(3).weight(), 0);
        assert_eq!(TruthTable::one(3).weight(), 8);
        assert_eq!(!&TruthTable::zero(2), TruthTable::one(2));
    }

    #[test]
    fn test_var() {
        let t = TruthTable::var(3, Var::new(1));
        assert!(!t.get(0b000));
        assert!(t.get(0b010));
        assert!(t.get(0b111));
        assert_eq!(t.weight(), 4);
    }

    #[test]
    fn test_polynomial() {
        // x0x1 + x0 = x0 (x1 + 1)
        let t = polynomial_truth_table("x0x1 + x0", 2);
        assert!(t.get(0b01));
        assert!(!t.get(0b11));
        assert_eq!(t.weight(), 1);
        // Equal monomials cancel.
        assert_eq!(polynomial_truth_table("x0 + x0", 2), TruthTable::zero(2));
        assert_eq!(polynomial_truth_table("1", 2), TruthTable::one(2));
    }

    #[test]
    fn test_circuit_matches_polynomial() {
        let mut dag = GateDag::default();
        let n = dag.not(x(1), 0);
        let a = dag.and(x(0), n, 1);
        let s = dag.xor(a, x(2), 2);
        assert_eq!(dag.support_size(s), 3);
        let expected = polynomial_truth_table("x0x1 + x0 + x2", 3);
        assert_eq!(dag.truth_table(s, 3), expected);
        assert_eq!(dag.truth_table(x(2), 3), TruthTable::var(3, Var::new(2)));
        assert_eq!(dag.truth_table(Signal::one(), 3), TruthTable::one(3));
    }

    #[test]
    fn test_truth_table_ignores_unrelated_nodes() {
        let mut dag = GateDag::default();
        // Built first, over x7.
        dag.and(x(0), x(7), 1);
        let s = dag.and(x(1), x(2), 1);
        assert_eq!(dag.support_size(s), 3);
        assert_eq!(dag.truth_table(s, 3), polynomial_truth_table("x1x2", 3));
        assert_eq!(dag.support_size(x(5)), 6);
        assert_eq!(dag.support_size(Signal::one()), 0);
    }
}
