//! Boolean networks of named wires connected by AND, OR and NOT gates.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Write;

use petgraph::{prelude::*, visit::EdgeRef};

use crate::error::BuildError;

/// A logic operator in the unmapped network.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Op {
    /// Two-input conjunction.
    And,
    /// Two-input disjunction.
    Or,
    /// Negation.
    Not,
}

impl Op {
    /// Number of inputs the operator takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::And | Self::Or => 2,
            Self::Not => 1,
        }
    }

    /// Parses an operator keyword as written in a netlist.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        })
    }
}

/// What drives a wire.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum WireKind {
    /// A primary input of the network.
    Input,
    /// A port that forwards its single fan-in.
    Output,
    /// The output of a logic gate.
    Gate(Op),
}

/// A named wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Wire {
    name: String,
    kind: Option<WireKind>,
}

impl Wire {
    /// The wire name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What drives the wire, or `None` if the wire is referenced but was never declared.
    #[must_use]
    pub const fn kind(&self) -> Option<WireKind> {
        self.kind
    }
}

/// A combinational network with one designated output.
///
/// Edges run from a driver to its consumer and are weighted with the input position on the consumer, so the fan-in
/// order of each gate is preserved.
#[derive(Clone, Debug, Default)]
pub struct Network {
    graph: StableGraph<Wire, usize, Directed>,
    names: HashMap<String, NodeIndex>,
    output: Option<NodeIndex>,
}

impl Network {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a wire by name, creating an undeclared placeholder if it does not exist yet.
    fn wire_index(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.names.get(name) {
            return node;
        }

        let node = self.graph.add_node(Wire {
            name: name.to_string(),
            kind: None,
        });
        self.names.insert(name.to_string(), node);
        node
    }

    fn declare(&mut self, name: &str, kind: WireKind) -> Result<NodeIndex, BuildError> {
        let node = self.wire_index(name);
        let wire = &mut self.graph[node];
        if wire.kind.is_some() {
            return Err(BuildError::Redefinition(name.to_string()));
        }
        wire.kind = Some(kind);
        Ok(node)
    }

    fn connect<S: AsRef<str>>(&mut self, node: NodeIndex, fanin: &[S]) {
        for (port, input) in fanin.iter().enumerate() {
            let input = self.wire_index(input.as_ref());
            self.graph.add_edge(input, node, port);
        }
    }

    /// Declares a primary input.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Redefinition`] if `name` is already declared.
    pub fn add_input(&mut self, name: &str) -> Result<NodeIndex, BuildError> {
        self.declare(name, WireKind::Input)
    }

    /// Declares a gate driving `name`. Fan-in wires may be declared later.
    ///
    /// The number of inputs is not checked here; a gate with the wrong arity is reported when it is mapped.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Redefinition`] if `name` is already declared.
    pub fn add_gate<S: AsRef<str>>(&mut self, name: &str, op: Op, fanin: &[S]) -> Result<NodeIndex, BuildError> {
        let node = self.declare(name, WireKind::Gate(op))?;
        self.connect(node, fanin);
        Ok(node)
    }

    /// Declares a port wire `name` that forwards `driver`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Redefinition`] if `name` is already declared.
    pub fn add_output(&mut self, name: &str, driver: &str) -> Result<NodeIndex, BuildError> {
        let node = self.declare(name, WireKind::Output)?;
        self.connect(node, &[driver]);
        Ok(node)
    }

    /// Designates the wire whose cost is to be computed. The wire may be declared later.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MultipleOutputs`] if a different wire was already designated.
    pub fn set_output(&mut self, name: &str) -> Result<NodeIndex, BuildError> {
        let node = self.wire_index(name);
        match self.output {
            Some(output) if output != node => Err(BuildError::MultipleOutputs {
                first: self.graph[output].name.clone(),
                second: name.to_string(),
            }),
            _ => {
                self.output = Some(node);
                Ok(node)
            }
        }
    }

    /// The designated output, if any.
    #[must_use]
    pub const fn output(&self) -> Option<NodeIndex> {
        self.output
    }

    /// Looks up a wire by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    /// Returns the wire at `node`.
    #[must_use]
    pub fn wire(&self, node: NodeIndex) -> &Wire {
        &self.graph[node]
    }

    /// Number of wires, including undeclared placeholders.
    #[must_use]
    pub fn wire_count(&self) -> usize {
        self.graph.node_count()
    }

    /// One past the largest node index, for sizing per-node tables.
    #[must_use]
    pub fn node_bound(&self) -> usize {
        self.graph.node_indices().map(|node| node.index() + 1).max().unwrap_or(0)
    }

    /// The inputs of a wire, in declaration order.
    #[must_use]
    pub fn fanin(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges = self.graph.edges_directed(node, Incoming).map(|edge| (*edge.weight(), edge.source())).collect::<Vec<_>>();
        edges.sort_unstable_by_key(|(port, _)| *port);
        edges.into_iter().map(|(_, source)| source).collect()
    }

    /// Number of gate inputs this wire drives.
    #[must_use]
    pub fn fanout_count(&self, node: NodeIndex) -> usize {
        self.graph.edges_directed(node, Outgoing).count()
    }

    /// Returns the operator and inputs of a gate, or `None` if the wire is not a gate.
    #[must_use]
    pub fn try_unwrap_gate(&self, node: NodeIndex) -> Option<(Op, Vec<NodeIndex>)> {
        match self.graph[node].kind? {
            WireKind::Gate(op) => Some((op, self.fanin(node))),
            WireKind::Input | WireKind::Output => None,
        }
    }

    /// Returns the input of `node` if it is a well-formed one-input `op` gate.
    #[must_use]
    pub fn unary(&self, node: NodeIndex, op: Op) -> Option<NodeIndex> {
        match self.try_unwrap_gate(node)? {
            (gate_op, fanin) if gate_op == op => match fanin[..] {
                [a] => Some(a),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the inputs of `node` if it is a well-formed two-input `op` gate.
    #[must_use]
    pub fn binary(&self, node: NodeIndex, op: Op) -> Option<(NodeIndex, NodeIndex)> {
        match self.try_unwrap_gate(node)? {
            (gate_op, fanin) if gate_op == op => match fanin[..] {
                [a, b] => Some((a, b)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Writes the network as a Graphviz digraph.
    #[allow(clippy::missing_errors_doc)]
    pub fn to_graphviz<T: Write>(&self, mut writer: T) -> std::io::Result<()> {
        writeln!(writer, "strict digraph {{")?;

        for node in self.graph.node_indices() {
            let wire = &self.graph[node];
            match wire.kind {
                Some(WireKind::Input) => {
                    writeln!(writer, "{} [shape=box,color=blue,label=\"Input {}\"];", node.index(), wire.name)?;
                },
                Some(WireKind::Output) => {
                    writeln!(writer, "{} [shape=box,color=green,label=\"Output {}\"];", node.index(), wire.name)?;
                },
                Some(WireKind::Gate(op)) => {
                    let peripheries = if Some(node) == self.output { 2 } else { 1 };
                    writeln!(writer, "{} [label=\"{} {}\",peripheries={}];", node.index(), op, wire.name, peripheries)?;
                },
                None => {
                    writeln!(writer, "{} [style=dashed,color=red,label=\"{}?\"];", node.index(), wire.name)?;
                },
            }
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                writeln!(writer, "{} -> {} [label=\"{}\"];", from.index(), to.index(), self.graph[edge])?;
            }
        }

        writeln!(writer, "}}")
    }

    /// Writes the cone of the output as an indented tree.
    ///
    /// A wire reachable along several paths is expanded the first time and written as `name ^` afterwards.
    #[allow(clippy::missing_errors_doc)]
    pub fn write_tree<T: Write>(&self, mut writer: T) -> std::io::Result<()> {
        let Some(output) = self.output else {
            return writeln!(writer, "(no output)");
        };

        let mut expanded = HashSet::new();
        let mut stack = vec![(output, 0_usize)];

        while let Some((node, depth)) = stack.pop() {
            let wire = &self.graph[node];
            let indent = "  ".repeat(depth);

            if !expanded.insert(node) {
                writeln!(writer, "{}{} ^", indent, wire.name)?;
                continue;
            }

            match wire.kind {
                Some(WireKind::Input) => writeln!(writer, "{}{} [INPUT]", indent, wire.name)?,
                Some(WireKind::Output) => writeln!(writer, "{}{} [OUTPUT]", indent, wire.name)?,
                Some(WireKind::Gate(op)) => writeln!(writer, "{}{} [{}]", indent, wire.name, op)?,
                None => writeln!(writer, "{}{} [?]", indent, wire.name)?,
            }

            stack.extend(self.fanin(node).into_iter().rev().map(|input| (input, depth + 1)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Network, Op, WireKind};
    use crate::error::BuildError;

    fn aoi21() -> Network {
        let mut network = Network::new();
        network.set_output("g").unwrap();
        network.add_gate("g", Op::Not, &["f"]).unwrap();
        network.add_gate("f", Op::Or, &["e", "c"]).unwrap();
        network.add_gate("e", Op::And, &["a", "b"]).unwrap();
        for input in ["a", "b", "c"] {
            network.add_input(input).unwrap();
        }
        network
    }

    #[test]
    fn forward_references_are_bound() {
        let network = aoi21();

        let f = network.find("f").unwrap();
        let e = network.find("e").unwrap();
        let c = network.find("c").unwrap();

        assert_eq!(network.try_unwrap_gate(f), Some((Op::Or, vec![e, c])));
        assert_eq!(network.wire(c).kind(), Some(WireKind::Input));
        assert_eq!(network.output(), network.find("g"));
        assert_eq!(network.wire_count(), 6);
    }

    #[test]
    fn fanin_order_is_preserved() {
        let mut network = Network::new();
        network.add_gate("x", Op::And, &["b", "a"]).unwrap();

        let a = network.find("a").unwrap();
        let b = network.find("b").unwrap();
        let x = network.find("x").unwrap();

        assert_eq!(network.fanin(x), vec![b, a]);
        assert_eq!(network.binary(x, Op::And), Some((b, a)));
        assert_eq!(network.binary(x, Op::Or), None);
        assert_eq!(network.unary(x, Op::And), None);
    }

    #[test]
    fn repeated_input_is_two_edges() {
        let mut network = Network::new();
        network.add_input("a").unwrap();
        network.add_gate("x", Op::Or, &["a", "a"]).unwrap();

        let a = network.find("a").unwrap();
        let x = network.find("x").unwrap();

        assert_eq!(network.binary(x, Op::Or), Some((a, a)));
        assert_eq!(network.fanout_count(a), 2);
    }

    #[test]
    fn undeclared_wire_has_no_kind() {
        let mut network = Network::new();
        network.add_gate("x", Op::Not, &["ghost"]).unwrap();

        let ghost = network.find("ghost").unwrap();
        assert_eq!(network.wire(ghost).kind(), None);
        assert_eq!(network.try_unwrap_gate(ghost), None);
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut network = Network::new();
        network.add_input("a").unwrap();

        assert!(matches!(network.add_gate("a", Op::Not, &["b"]), Err(BuildError::Redefinition(name)) if name == "a"));
        assert!(matches!(network.add_input("a"), Err(BuildError::Redefinition(_))));
    }

    #[test]
    fn second_output_is_rejected() {
        let mut network = Network::new();
        network.set_output("x").unwrap();
        network.set_output("x").unwrap();

        assert!(matches!(
            network.set_output("y"),
            Err(BuildError::MultipleOutputs { first, second }) if first == "x" && second == "y"
        ));
    }

    #[test]
    fn write_tree() {
        let mut network = Network::new();
        network.set_output("y").unwrap();
        network.add_gate("y", Op::And, &["s", "t"]).unwrap();
        network.add_gate("s", Op::Not, &["a"]).unwrap();
        network.add_gate("t", Op::Or, &["s", "b"]).unwrap();
        network.add_input("a").unwrap();
        network.add_input("b").unwrap();

        let mut out = Vec::new();
        network.write_tree(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "y [AND]\n  s [NOT]\n    a [INPUT]\n  t [OR]\n    s ^\n    b [INPUT]\n"
        );
    }

    #[test]
    fn to_graphviz() {
        let network = aoi21();

        let mut out = Vec::new();
        network.to_graphviz(&mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("strict digraph {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("label=\"Input a\""));
        assert!(dot.contains("[label=\"NOT g\",peripheries=2];"));
        assert_eq!(dot.matches("->").count(), 5);
    }
}
