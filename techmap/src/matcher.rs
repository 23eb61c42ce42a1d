//! Structural matchers from network wires to library patterns.
//!
//! Every matcher looks at the shape of the network below one wire, without looking at costs, and proposes at most
//! one way of building that wire. The mapper costs every proposal and keeps the cheapest.

use petgraph::prelude::*;

use crate::error::Error;
use crate::library::Pattern;
use crate::network::{Network, Op, WireKind};

/// A proposed way of building a wire: a pattern and the wires feeding it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    /// The cells used.
    pub pattern: Pattern,
    /// The wires consumed by the pattern, in the order documented on [`Pattern`].
    pub leaves: Vec<NodeIndex>,
}

impl Candidate {
    fn new(pattern: Pattern, leaves: Vec<NodeIndex>) -> Self {
        debug_assert_eq!(pattern.leaf_count(), leaves.len());
        Self { pattern, leaves }
    }
}

type Matcher = fn(&Network, NodeIndex) -> Option<Candidate>;

/// Matchers for a NOT gate, tried after double negation has been ruled out.
const NOT_MATCHERS: &[Matcher] = &[match_inverter, match_nand, match_nor, match_aoi21, match_aoi22];

const AND_MATCHERS: &[Matcher] = &[match_and, match_nand_inverter, match_nand_or_nor];

const OR_MATCHERS: &[Matcher] = &[match_or, match_nor_inverter, match_de_morgan];

/// Returns every way of building `node`.
///
/// The result is never empty for a well-formed wire. `NOT(NOT(x))` yields only an alias of `x`, since the pair
/// cancels and any cell built on top of `x` would cost more.
///
/// # Errors
///
/// Returns [`Error::DanglingReference`] for an undeclared wire and [`Error::ArityMismatch`] for a gate or output
/// port with the wrong number of inputs.
pub fn candidates(network: &Network, node: NodeIndex) -> Result<Vec<Candidate>, Error> {
    let wire = network.wire(node);
    let kind = wire.kind().ok_or_else(|| Error::DanglingReference(wire.name().to_string()))?;

    let fanin = network.fanin(node);

    match kind {
        WireKind::Input => Ok(vec![Candidate::new(Pattern::Source, vec![])]),
        WireKind::Output => match fanin[..] {
            [driver] => Ok(vec![Candidate::new(Pattern::Alias, vec![driver])]),
            _ => Err(Error::ArityMismatch {
                wire: wire.name().to_string(),
                expected: 1,
                found: fanin.len(),
            }),
        },
        WireKind::Gate(op) => {
            if fanin.len() != op.arity() {
                return Err(Error::ArityMismatch {
                    wire: wire.name().to_string(),
                    expected: op.arity(),
                    found: fanin.len(),
                });
            }

            let matchers = match op {
                Op::Not => {
                    if let Some(candidate) = match_double_negation(network, node) {
                        return Ok(vec![candidate]);
                    }
                    NOT_MATCHERS
                },
                Op::And => AND_MATCHERS,
                Op::Or => OR_MATCHERS,
            };

            Ok(matchers.iter().filter_map(|matcher| matcher(network, node)).collect())
        },
    }
}

/// `NOT(NOT(x))` => `x`
fn match_double_negation(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let inner = network.unary(node, Op::Not)?;
    let x = network.unary(inner, Op::Not)?;
    Some(Candidate::new(Pattern::Alias, vec![x]))
}

/// `NOT(a)` => `INV(a)`
fn match_inverter(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let a = network.unary(node, Op::Not)?;
    Some(Candidate::new(Pattern::Inverter, vec![a]))
}

/// `NOT(AND(a, b))` => `NAND2(a, b)`
fn match_nand(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let inner = network.unary(node, Op::Not)?;
    let (a, b) = network.binary(inner, Op::And)?;
    Some(Candidate::new(Pattern::Nand, vec![a, b]))
}

/// `NOT(OR(a, b))` => `NOR2(a, b)`
fn match_nor(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let inner = network.unary(node, Op::Not)?;
    let (a, b) = network.binary(inner, Op::Or)?;
    Some(Candidate::new(Pattern::Nor, vec![a, b]))
}

/// `NOT(OR(AND(a, b), c))` => `AOI21(a, b, c)`, with exactly one AND leg in either position.
fn match_aoi21(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let inner = network.unary(node, Op::Not)?;
    let (left, right) = network.binary(inner, Op::Or)?;

    match (network.binary(left, Op::And), network.binary(right, Op::And)) {
        (Some((a, b)), None) => Some(Candidate::new(Pattern::Aoi21, vec![a, b, right])),
        (None, Some((a, b))) => Some(Candidate::new(Pattern::Aoi21, vec![a, b, left])),
        _ => None,
    }
}

/// `NOT(OR(AND(a, b), AND(c, d)))` => `AOI22(a, b, c, d)`
fn match_aoi22(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let inner = network.unary(node, Op::Not)?;
    let (left, right) = network.binary(inner, Op::Or)?;
    let (a, b) = network.binary(left, Op::And)?;
    let (c, d) = network.binary(right, Op::And)?;
    Some(Candidate::new(Pattern::Aoi22, vec![a, b, c, d]))
}

/// `AND(a, b)` => `AND2(a, b)`
fn match_and(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (a, b) = network.binary(node, Op::And)?;
    Some(Candidate::new(Pattern::And, vec![a, b]))
}

/// `AND(a, b)` => `INV(NAND2(a, b))`
fn match_nand_inverter(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (a, b) = network.binary(node, Op::And)?;
    Some(Candidate::new(Pattern::NandInverter, vec![a, b]))
}

/// `AND(AND(p, q), NOT(OR(r, s)))` => `NOR2(NAND2(p, q), OR2(r, s))`, in either operand order.
fn match_nand_or_nor(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (left, right) = network.binary(node, Op::And)?;

    let legs = |and: NodeIndex, not: NodeIndex| {
        let (p, q) = network.binary(and, Op::And)?;
        let (r, s) = network.binary(network.unary(not, Op::Not)?, Op::Or)?;
        Some(Candidate::new(Pattern::NandOrNor, vec![p, q, r, s]))
    };

    legs(left, right).or_else(|| legs(right, left))
}

/// `OR(a, b)` => `OR2(a, b)`
fn match_or(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (a, b) = network.binary(node, Op::Or)?;
    Some(Candidate::new(Pattern::Or, vec![a, b]))
}

/// `OR(a, b)` => `INV(NOR2(a, b))`
fn match_nor_inverter(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (a, b) = network.binary(node, Op::Or)?;
    Some(Candidate::new(Pattern::NorInverter, vec![a, b]))
}

/// `OR(a, b)` => `NAND2(INV(a), INV(b))`
fn match_de_morgan(network: &Network, node: NodeIndex) -> Option<Candidate> {
    let (a, b) = network.binary(node, Op::Or)?;
    Some(Candidate::new(Pattern::DeMorgan, vec![a, b]))
}
