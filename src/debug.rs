//! Debug utilities for inspecting the gate DAG.
//!
//! Lookups here are lenient: an unknown name produces a [`NodeInfo`] with
//! empty fields instead of failing, so reports can still be printed for a
//! partially built circuit.

use std::fmt::Write;

use crate::dag::GateDag;
use crate::gate::GateKind;
use crate::signal::Signal;

/// Description of a single signal, looked up by name.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NodeInfo {
    /// The name that was asked for
    pub name: String,
    /// Resolved signal (None for unknown names)
    pub signal: Option<Signal>,
    /// Gate kind (None for inputs, constants and unknown names)
    pub kind: Option<GateKind>,
    /// Operand names
    pub operands: Vec<String>,
    /// Depth of the node (None for unknown names)
    pub depth: Option<u32>,
    /// Algebraic expression (empty for unknown names)
    pub expression: String,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(kind={}, operands=[{}], depth={}, expr={})",
            self.name,
            self.kind.map_or("?".to_string(), |k| k.to_string()),
            self.operands.join(", "),
            self.depth.map_or("?".to_string(), |d| d.to_string()),
            if self.expression.is_empty() { "?" } else { &self.expression },
        )
    }
}

impl GateDag {
    /// Get information about the signal with the given name.
    pub fn node_info(&self, name: &str) -> NodeInfo {
        let Some(signal) = self.resolve(name) else {
            return NodeInfo {
                name: name.to_string(),
                ..NodeInfo::default()
            };
        };
        match self.get(signal) {
            Some(node) => NodeInfo {
                name: node.name(),
                signal: Some(signal),
                kind: Some(node.kind()),
                operands: node.operands().iter().map(|s| s.to_string()).collect(),
                depth: Some(node.depth),
                expression: node.expression.clone(),
            },
            None => NodeInfo {
                name: name.to_string(),
                signal: Some(signal),
                kind: None,
                operands: Vec::new(),
                depth: Some(0),
                expression: self.expression(signal),
            },
        }
    }

    /// Depth of a named signal, or `None` if the name is unknown.
    pub fn depth_of(&self, name: &str) -> Option<u32> {
        self.node_info(name).depth
    }

    /// Expression of a named signal, or an empty string if the name is unknown.
    pub fn expression_of(&self, name: &str) -> String {
        self.node_info(name).expression
    }

    /// Lists every node, one per line, in creation order.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            let operands: Vec<String> = node.operands().iter().map(|s| s.to_string()).collect();
            writeln!(
                out,
                "{} = {}({}) @{} : {}",
                node.name(),
                node.kind(),
                operands.join(", "),
                node.depth,
                node.expression
            )
            .unwrap();
        }
        out
    }
}
