use log::debug;

use crate::gate::{Gate, GateKind};
use crate::signal::Signal;
use crate::table::Table;
use crate::types::{NodeId, Var};

/// A gate node of the shared circuit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GateNode {
    pub id: NodeId,
    pub gate: Gate,
    /// Human-readable algebraic expression, e.g. `(x2(x4+1))`.
    pub expression: String,
    /// Number of gate layers between this node and the primary inputs.
    pub depth: u32,
}

impl GateNode {
    /// Stable name of the node, `t<id>`.
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    pub fn kind(&self) -> GateKind {
        self.gate.kind()
    }

    pub fn operands(&self) -> &[Signal] {
        self.gate.inputs()
    }
}

/// Hash-consed store of NOT, AND and XOR nodes.
///
/// The DAG never holds two nodes with the same [`Gate`] descriptor, and
/// nodes are never mutated or removed once created.
#[derive(Debug, Clone)]
pub struct GateDag {
    table: Table<Gate>,
    nodes: Vec<GateNode>,
}

impl GateDag {
    /// Create an empty DAG whose hash-consing table has `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        Self {
            table: Table::new(bits),
            nodes: Vec::new(),
        }
    }
}

impl Default for GateDag {
    fn default() -> Self {
        Self::new(16)
    }
}

// Node access
impl GateDag {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order. Operands always precede their users.
    pub fn nodes(&self) -> &[GateNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &GateNode {
        &self.nodes[id.index()]
    }

    /// Node referenced by a signal, if it is a gate node.
    pub fn get(&self, signal: Signal) -> Option<&GateNode> {
        signal.node_id().and_then(|id| self.nodes.get(id.index()))
    }

    /// Looks up an existing node by descriptor without creating it.
    pub fn lookup(&self, gate: &Gate) -> Option<Signal> {
        self.table.find(gate).map(|i| Signal::node(NodeId::new(i as u32)))
    }

    /// Resolves a signal name: `0`, `1`, `x<i>` or `t<i>`.
    ///
    /// Unknown or malformed names resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<Signal> {
        match name {
            "0" => return Some(Signal::zero()),
            "1" => return Some(Signal::one()),
            _ => {}
        }
        let (prefix, digits) = name.split_at(name.char_indices().nth(1)?.0);
        let index: u32 = digits.parse().ok()?;
        match prefix {
            "x" => Some(Signal::input(Var::new(index))),
            "t" if (index as usize) < self.nodes.len() => Some(Signal::node(NodeId::new(index))),
            _ => None,
        }
    }

    /// Looks up a gate node by its `t<id>` name.
    pub fn find_by_name(&self, name: &str) -> Option<&GateNode> {
        self.resolve(name).and_then(|s| self.get(s))
    }

    /// Algebraic expression of a signal. Inputs and constants render as
    /// their name.
    pub fn expression(&self, signal: Signal) -> String {
        match self.get(signal) {
            Some(node) => node.expression.clone(),
            None => signal.to_string(),
        }
    }

    /// Depth of a signal. Inputs and constants have depth 0.
    pub fn depth(&self, signal: Signal) -> u32 {
        self.get(signal).map(|node| node.depth).unwrap_or(0)
    }

    /// Number of nodes of the given kind.
    pub fn count(&self, kind: GateKind) -> usize {
        self.nodes.iter().filter(|n| n.kind() == kind).count()
    }
}

// Node construction
impl GateDag {
    /// Returns the node with this descriptor, creating it with the given
    /// expression and depth if it does not exist yet.
    ///
    /// An existing node keeps the expression and depth it was created with.
    pub fn find_or_create_node(&mut self, gate: Gate, expression: impl Into<String>, depth: u32) -> Signal {
        let (index, created) = self.table.put(gate);
        let id = NodeId::new(index as u32);
        if created {
            assert_eq!(index, self.nodes.len());
            let node = GateNode {
                id,
                gate,
                expression: expression.into(),
                depth,
            };
            debug!("Created {} = {} at depth {}: {}", id, gate, depth, node.expression);
            self.nodes.push(node);
        } else {
            debug!("Reused {} = {}", id, gate);
        }
        Signal::node(id)
    }

    /// `NOT(a)`, with expression `(a+1)`.
    pub fn not(&mut self, a: Signal, depth: u32) -> Signal {
        let expression = format!("({}+1)", self.expression(a));
        self.find_or_create_node(Gate::not(a), expression, depth)
    }

    /// `AND(a, b)`, with expression `(ab)`.
    pub fn and(&mut self, a: Signal, b: Signal, depth: u32) -> Signal {
        let expression = format!("({}{})", self.expression(a), self.expression(b));
        self.find_or_create_node(Gate::and(a, b), expression, depth)
    }

    /// `XOR(a, b)`, with expression `(a + b)`.
    pub fn xor(&mut self, a: Signal, b: Signal, depth: u32) -> Signal {
        let expression = format!("({} + {})", self.expression(a), self.expression(b));
        self.find_or_create_node(Gate::xor(a, b), expression, depth)
    }

    /// Builds a left-to-right AND reduction of `inputs`.
    ///
    /// The first layer of pairs is created at `start_depth`; each following
    /// layer one deeper. An odd element passes through to the next layer
    /// unchanged. Returns the root and the depth of the last layer built
    /// (`start_depth - 1` when there was nothing to pair).
    pub fn build_and_tree(&mut self, inputs: &[Signal], start_depth: u32) -> (Signal, u32) {
        if inputs.is_empty() {
            return (Signal::one(), 0);
        }
        let mut level = inputs.to_vec();
        let mut depth = start_depth;
        while level.len() > 1 {
            let mut next = Vec::with_capacity((level.len() + 1) / 2);
            for pair in level.chunks(2) {
                match pair {
                    &[a, b] => next.push(self.and(a, b, depth)),
                    &[a] => next.push(a),
                    _ => unreachable!(),
                }
            }
            level = next;
            depth += 1;
        }
        (level[0], depth.saturating_sub(1))
    }
}
