//! Minimum-area covering of a network with library cells.

use std::collections::BTreeMap;
use std::io::Write;

use itertools::Itertools;
use num_bigint::BigUint;
use petgraph::prelude::*;

use crate::error::Error;
use crate::library::{Cell, Pattern};
use crate::matcher::{self, Candidate};
use crate::network::Network;

/// The pattern chosen for one wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Choice {
    pattern: Pattern,
    leaves: Vec<NodeIndex>,
    cost: BigUint,
}

impl Choice {
    /// The cells building the wire.
    #[must_use]
    pub const fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// The wires feeding the pattern.
    #[must_use]
    pub fn leaves(&self) -> &[NodeIndex] {
        &self.leaves
    }

    /// Cost of the pattern plus the cost of each leaf, counting every path separately.
    ///
    /// This doubles at every level of reconvergent fan-out, so it is not bounded by any machine integer.
    #[must_use]
    pub const fn tree_cost(&self) -> &BigUint {
        &self.cost
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Unvisited,
    InProgress,
    Resolved(Choice),
}

enum Frame {
    Enter(NodeIndex),
    Exit(NodeIndex, Vec<Candidate>),
}

/// Chooses a pattern for every wire in the cone of the output.
///
/// Each wire is resolved once: it is marked in progress, everything any of its candidates consumes is resolved,
/// and then the candidate with the lowest tree cost is kept. Meeting a wire that is still in progress means the
/// network has a cycle through it. Resolution uses an explicit stack, so deep networks do not exhaust the call
/// stack.
pub struct Mapper<'a> {
    network: &'a Network,
    state: Vec<State>,
}

impl<'a> Mapper<'a> {
    /// Creates a mapper with every wire of `network` unvisited.
    #[must_use]
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            state: vec![State::Unvisited; network.node_bound()],
        }
    }

    fn cycle(&self, node: NodeIndex) -> Error {
        Error::CyclicDefinition(self.network.wire(node).name().to_string())
    }

    fn resolved(&self, node: NodeIndex) -> &Choice {
        match &self.state[node.index()] {
            State::Resolved(choice) => choice,
            State::Unvisited | State::InProgress => panic!("wire {} used before it was resolved", self.network.wire(node).name()),
        }
    }

    fn choose(&self, candidates: Vec<Candidate>) -> Choice {
        candidates
            .into_iter()
            .map(|Candidate { pattern, leaves }| {
                let cost = leaves.iter().fold(BigUint::from(pattern.area()), |cost, leaf| cost + &self.resolved(*leaf).cost);
                Choice { pattern, leaves, cost }
            })
            .min_by(|a, b| a.cost.cmp(&b.cost))
            .expect("every declared wire has at least one candidate")
    }

    fn resolve(&mut self, root: NodeIndex) -> Result<(), Error> {
        let mut stack = vec![Frame::Enter(root)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    match &self.state[node.index()] {
                        State::Resolved(_) => continue,
                        State::InProgress => return Err(self.cycle(node)),
                        State::Unvisited => {},
                    }

                    let candidates = matcher::candidates(self.network, node)?;
                    let leaves = candidates.iter().flat_map(|candidate| candidate.leaves.iter().copied()).unique().collect::<Vec<_>>();

                    self.state[node.index()] = State::InProgress;
                    stack.push(Frame::Exit(node, candidates));

                    for leaf in leaves {
                        match &self.state[leaf.index()] {
                            State::Resolved(_) => {},
                            State::InProgress => return Err(self.cycle(leaf)),
                            State::Unvisited => stack.push(Frame::Enter(leaf)),
                        }
                    }
                },
                Frame::Exit(node, candidates) => {
                    let choice = self.choose(candidates);
                    log::debug!("{}: {} (tree cost {})", self.network.wire(node).name(), choice.pattern, choice.cost);
                    self.state[node.index()] = State::Resolved(choice);
                },
            }
        }

        Ok(())
    }

    /// Maps the network output.
    ///
    /// # Errors
    ///
    /// Fails if there is no output, or if the cone of the output contains a cycle, an undeclared wire, or a gate
    /// with the wrong number of inputs. Nothing is returned on failure.
    pub fn map(mut self) -> Result<Mapping, Error> {
        let output = self.network.output().ok_or(Error::MissingOutput)?;
        if self.network.wire(output).kind().is_none() {
            return Err(Error::MissingOutput);
        }

        self.resolve(output)?;

        // Walk the chosen patterns down from the output. A wire used by several patterns is built once.
        let mut visited = vec![false; self.state.len()];
        let mut stack = vec![output];
        let mut cover = Vec::new();
        let mut cost = 0_u64;

        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node.index()], true) {
                continue;
            }

            let choice = self.resolved(node);
            stack.extend(choice.leaves.iter().rev().copied());

            match choice.pattern {
                Pattern::Source | Pattern::Alias => {},
                _ => {
                    cost = cost.saturating_add(choice.pattern.area());
                    cover.push((node, choice.clone()));
                },
            }
        }

        let resolved = self.state.iter().filter(|state| matches!(state, State::Resolved(_))).count();
        log::info!("Resolved {} wires", resolved);
        log::info!("Mapped to {} patterns, cost {}", cover.len(), cost);

        Ok(Mapping { cost, cover })
    }
}

/// The result of mapping a network.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mapping {
    cost: u64,
    cover: Vec<(NodeIndex, Choice)>,
}

impl Mapping {
    /// Total area of the cells built, counting each built wire once.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// The wires that are built and how, from the output downwards.
    #[must_use]
    pub fn cover(&self) -> &[(NodeIndex, Choice)] {
        &self.cover
    }

    /// Number of instances of each library cell.
    #[must_use]
    pub fn cell_counts(&self) -> BTreeMap<Cell, usize> {
        let mut counts = BTreeMap::new();
        for cell in self.cover.iter().flat_map(|(_, choice)| choice.pattern.cells()) {
            *counts.entry(*cell).or_insert(0) += 1;
        }
        counts
    }

    /// Writes one line per built wire, e.g. `g = AOI21(a, b, c)`.
    #[allow(clippy::missing_errors_doc)]
    pub fn write_cover<T: Write>(&self, network: &Network, mut writer: T) -> std::io::Result<()> {
        for (node, choice) in &self.cover {
            let leaves = choice.leaves.iter().map(|leaf| network.wire(*leaf).name()).join(", ");
            writeln!(writer, "{} = {}({})", network.wire(*node).name(), choice.pattern, leaves)?;
        }
        Ok(())
    }
}

/// Returns the minimum cost of building the network output from library cells.
///
/// # Errors
///
/// See [`Mapper::map`].
pub fn minimum_cost(network: &Network) -> Result<u64, Error> {
    Mapper::new(network).map().map(|mapping| mapping.cost())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::{minimum_cost, Mapper};
    use crate::error::Error;
    use crate::library::{Cell, Pattern};
    use crate::network::{Network, Op};

    fn network(text: &str) -> Network {
        Network::from_netlist(text).unwrap()
    }

    fn cost(text: &str) -> u64 {
        minimum_cost(&network(text)).unwrap()
    }

    #[test]
    fn input_costs_nothing() {
        assert_eq!(cost("a INPUT\na OUTPUT\n"), 0);
    }

    #[test]
    fn double_negation_cancels() {
        assert_eq!(cost("a INPUT\nb = NOT a\nc = NOT b\nc OUTPUT\n"), 0);
        assert_eq!(cost("a INPUT\nx INPUT\nb = AND a x\nc = NOT b\nd = NOT c\nd OUTPUT\n"), 4);
    }

    #[test]
    fn inverter() {
        assert_eq!(cost("a INPUT\nb = NOT a\nb OUTPUT\n"), Cell::Inv.cost());
    }

    #[test]
    fn nor() {
        assert_eq!(cost("a INPUT\nb INPUT\nc = OR a b\nd = NOT c\nd OUTPUT\n"), 6);
    }

    #[test]
    fn nand() {
        assert_eq!(cost("a INPUT\nb INPUT\nc = AND a b\nd = NOT c\nd OUTPUT\n"), 3);
    }

    #[test]
    fn aoi21() {
        assert_eq!(cost("a INPUT\nb INPUT\nc INPUT\ne = AND a b\nf = OR e c\ng = NOT f\ng OUTPUT\n"), 7);
        assert_eq!(cost("a INPUT\nb INPUT\nc INPUT\ne = AND a b\nf = OR c e\ng = NOT f\ng OUTPUT\n"), 7);
    }

    #[test]
    fn aoi22() {
        let text = "a INPUT\nb INPUT\nc INPUT\nd INPUT\ne = AND a b\nf = AND c d\no = OR e f\nn = NOT o\nn OUTPUT\n";
        assert_eq!(cost(text), 7);
    }

    #[test]
    fn and_prefers_and2() {
        assert_eq!(cost("a INPUT\nb INPUT\nh = AND a b\nh OUTPUT\n"), 4);
    }

    #[test]
    fn or_prefers_or2() {
        assert_eq!(cost("a INPUT\nb INPUT\nh = OR a b\nh OUTPUT\n"), 4);
    }

    #[test]
    fn nand_or_nor() {
        let text = "p INPUT\nq INPUT\nr INPUT\ns INPUT\npq = AND p q\nrs = OR r s\nnrs = NOT rs\nx = AND pq nrs\nx OUTPUT\n";
        assert_eq!(cost(text), 13);

        let swapped = "p INPUT\nq INPUT\nr INPUT\ns INPUT\npq = AND p q\nrs = OR r s\nnrs = NOT rs\nx = AND nrs pq\nx OUTPUT\n";
        assert_eq!(cost(swapped), 13);
    }

    #[test]
    fn shared_wire_is_built_once() {
        let shared = "a INPUT\nb INPUT\nc INPUT\nd INPUT\ns = AND a b\nx = OR s c\ny = OR s d\nz = AND x y\nz OUTPUT\n";
        let duplicated = "a INPUT\nb INPUT\nc INPUT\nd INPUT\ns1 = AND a b\ns2 = AND a b\nx = OR s1 c\ny = OR s2 d\nz = AND x y\nz OUTPUT\n";

        assert_eq!(cost(shared), 16);
        assert_eq!(cost(duplicated), 20);
    }

    #[test]
    fn shared_wire_absorbed_by_one_consumer() {
        // `e` disappears into the AOI21 for `g`, but `h` still needs it built.
        let text = "a INPUT\nb INPUT\nc INPUT\nd INPUT\ne = AND a b\nf = OR e c\ng = NOT f\nh = AND e d\nz = OR g h\nz OUTPUT\n";
        let network = network(text);
        let mapping = Mapper::new(&network).map().unwrap();

        assert_eq!(mapping.cost(), 19);
        let patterns = mapping.cover().iter().map(|(node, choice)| (network.wire(*node).name(), choice.pattern())).collect::<Vec<_>>();
        assert_eq!(patterns, vec![("z", Pattern::Or), ("g", Pattern::Aoi21), ("h", Pattern::And), ("e", Pattern::And)]);
    }

    #[test]
    fn reconvergent_cost_counts_each_wire_once() {
        // Every level reuses the previous one twice; the tree cost doubles per level but the area does not.
        let mut text = String::from("a INPUT\nb INPUT\nw0 = AND a b\n");
        for level in 1..=80 {
            text.push_str(&format!("w{} = OR w{} w{}\n", level, level - 1, level - 1));
        }
        text.push_str("w80 OUTPUT\n");

        assert_eq!(cost(&text), 4 + 80 * 4);
    }

    #[test]
    fn deep_reconvergence_still_finds_compound_cells() {
        // The tree cost of `w70` is far beyond `u64::MAX`; `g` must still pick the AOI21.
        let mut text = String::from("a INPUT\nb INPUT\nc INPUT\nd INPUT\nw0 = AND a b\n");
        for level in 1..=70 {
            text.push_str(&format!("w{} = OR w{} w{}\n", level, level - 1, level - 1));
        }
        text.push_str("e = AND w70 c\nf = OR e d\ng = NOT f\ng OUTPUT\n");

        let network = network(&text);
        let mapping = Mapper::new(&network).map().unwrap();

        assert_eq!(mapping.cost(), 4 + 70 * 4 + 7);
        assert_eq!(mapping.cover()[0].1.pattern(), Pattern::Aoi21);
        assert!(mapping.cover()[0].1.tree_cost().bits() > 64);
    }

    #[test]
    fn deep_reconvergence_still_finds_aoi22() {
        let mut text = String::from("a INPUT\nb INPUT\nc INPUT\nd INPUT\nx INPUT\nw0 = AND a b\n");
        for level in 1..=70 {
            text.push_str(&format!("w{} = OR w{} w{}\n", level, level - 1, level - 1));
        }
        text.push_str("e = AND w70 c\nh = AND d x\no = OR e h\nn = NOT o\nn OUTPUT\n");

        assert_eq!(cost(&text), 4 + 70 * 4 + 7);
    }

    #[test]
    fn repeated_resolution_is_stable() {
        let network = network("a INPUT\nb INPUT\nc INPUT\ne = AND a b\nf = OR e c\ng = NOT f\ng OUTPUT\n");

        let first = Mapper::new(&network).map().unwrap();
        let second = Mapper::new(&network).map().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.cost(), 7);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut network = Network::new();
        network.add_input("a").unwrap();
        network.add_input("w0").unwrap();
        for i in 1..=100_000 {
            network.add_gate(&format!("w{}", i), Op::And, &[format!("w{}", i - 1), "a".to_string()]).unwrap();
        }
        network.set_output("w100000").unwrap();

        assert_eq!(minimum_cost(&network), Ok(400_000));
    }

    #[test]
    fn cycle_is_reported() {
        let network = network("a INPUT\nb INPUT\nx = AND y a\ny = AND x b\nx OUTPUT\n");
        assert!(matches!(minimum_cost(&network), Err(Error::CyclicDefinition(_))));
    }

    #[test]
    fn self_loop_is_reported() {
        let network = network("n = NOT n\nn OUTPUT\n");
        assert_eq!(minimum_cost(&network), Err(Error::CyclicDefinition("n".to_string())));
    }

    #[test]
    fn dangling_reference_is_reported() {
        let network = network("a INPUT\ng = AND a ghost\ng OUTPUT\n");
        assert_eq!(minimum_cost(&network), Err(Error::DanglingReference("ghost".to_string())));
    }

    #[test]
    fn unreachable_problems_are_ignored() {
        let network = network("a INPUT\ng = NOT a\nx = AND y ghost\ny = NOT x\ng OUTPUT\n");
        assert_eq!(minimum_cost(&network), Ok(2));
    }

    #[test]
    fn missing_output_is_reported() {
        assert_eq!(minimum_cost(&network("a INPUT\n")), Err(Error::MissingOutput));
        assert_eq!(minimum_cost(&network("a INPUT\nb OUTPUT\n")), Err(Error::MissingOutput));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut network = Network::new();
        network.add_input("a").unwrap();
        network.add_gate("x", Op::And, &["a"]).unwrap();
        network.set_output("x").unwrap();

        assert_eq!(
            minimum_cost(&network),
            Err(Error::ArityMismatch {
                wire: "x".to_string(),
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn output_port_forwards_its_driver() {
        assert_eq!(cost("a INPUT\nb INPUT\nx = AND a b\ny = x\ny OUTPUT\n"), 4);
    }

    #[test]
    fn cell_counts_and_cover_listing() {
        let network = network("p INPUT\nq INPUT\nr INPUT\ns INPUT\npq = AND p q\nrs = OR r s\nnrs = NOT rs\nx = AND pq nrs\nx OUTPUT\n");
        let mapping = Mapper::new(&network).map().unwrap();

        let counts = mapping.cell_counts().into_iter().collect::<Vec<_>>();
        assert_eq!(counts, vec![(Cell::Nand2, 1), (Cell::Or2, 1), (Cell::Nor2, 1)]);

        let mut out = Vec::new();
        mapping.write_cover(&network, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x = NAND2+OR2+NOR2(p, q, r, s)\n");
    }
}
