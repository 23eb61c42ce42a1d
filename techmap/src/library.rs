//! The standard-cell library and the cell combinations the mapper can choose from.

use std::fmt;

/// A cell in the standard-cell library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Cell {
    /// Inverter: `a'`.
    Inv,
    /// Two-input NAND: `(a & b)'`.
    Nand2,
    /// Two-input AND: `a & b`.
    And2,
    /// Two-input OR: `a | b`.
    Or2,
    /// Two-input NOR: `(a | b)'`.
    Nor2,
    /// AND-OR-invert with one AND leg: `((a & b) | c)'`.
    Aoi21,
    /// AND-OR-invert with two AND legs: `((a & b) | (c & d))'`.
    Aoi22,
}

impl Cell {
    /// Every cell in the library.
    pub const ALL: [Self; 7] = [Self::Inv, Self::Nand2, Self::And2, Self::Or2, Self::Nor2, Self::Aoi21, Self::Aoi22];

    /// Number of inputs of the cell.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Inv => 1,
            Self::Nand2 | Self::And2 | Self::Or2 | Self::Nor2 => 2,
            Self::Aoi21 => 3,
            Self::Aoi22 => 4,
        }
    }

    /// Area cost of one instance of the cell.
    #[must_use]
    pub const fn cost(self) -> u64 {
        match self {
            Self::Inv => 2,
            Self::Nand2 => 3,
            Self::And2 | Self::Or2 => 4,
            Self::Nor2 => 6,
            Self::Aoi21 | Self::Aoi22 => 7,
        }
    }

    /// Library name of the cell.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inv => "INV",
            Self::Nand2 => "NAND2",
            Self::And2 => "AND2",
            Self::Or2 => "OR2",
            Self::Nor2 => "NOR2",
            Self::Aoi21 => "AOI21",
            Self::Aoi22 => "AOI22",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A way of realizing one wire out of library cells.
///
/// Each pattern covers one or more logic levels rooted at the wire being mapped. The leaves of the pattern are
/// the wires it consumes; they are mapped separately. The leaf order documented on each variant is the order
/// the matcher emits them in.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Pattern {
    /// A primary input. No cells, no leaves.
    Source,
    /// The wire carries the same value as its single leaf: an output port, or `NOT(NOT(x))` cancelling to `x`.
    Alias,
    /// `NOT(a)` as an inverter.
    Inverter,
    /// `NOT(AND(a, b))` as a NAND2. Leaves: `a, b`.
    Nand,
    /// `NOT(OR(a, b))` as a NOR2. Leaves: `a, b`.
    Nor,
    /// `NOT(OR(AND(a, b), c))` as an AOI21. Leaves: `a, b, c`.
    Aoi21,
    /// `NOT(OR(AND(a, b), AND(c, d)))` as an AOI22. Leaves: `a, b, c, d`.
    Aoi22,
    /// `AND(a, b)` as an AND2. Leaves: `a, b`.
    And,
    /// `AND(a, b)` as a NAND2 followed by an inverter. Leaves: `a, b`.
    NandInverter,
    /// `AND(AND(p, q), NOT(OR(r, s)))` as `NOR2(NAND2(p, q), OR2(r, s))`. Leaves: `p, q, r, s`.
    NandOrNor,
    /// `OR(a, b)` as an OR2. Leaves: `a, b`.
    Or,
    /// `OR(a, b)` as a NOR2 followed by an inverter. Leaves: `a, b`.
    NorInverter,
    /// `OR(a, b)` as a NAND2 of the two inverted legs. Leaves: `a, b`.
    DeMorgan,
}

impl Pattern {
    /// The cells instantiated by this pattern.
    #[must_use]
    pub const fn cells(self) -> &'static [Cell] {
        match self {
            Self::Source | Self::Alias => &[],
            Self::Inverter => &[Cell::Inv],
            Self::Nand => &[Cell::Nand2],
            Self::Nor => &[Cell::Nor2],
            Self::Aoi21 => &[Cell::Aoi21],
            Self::Aoi22 => &[Cell::Aoi22],
            Self::And => &[Cell::And2],
            Self::NandInverter => &[Cell::Nand2, Cell::Inv],
            Self::NandOrNor => &[Cell::Nand2, Cell::Or2, Cell::Nor2],
            Self::Or => &[Cell::Or2],
            Self::NorInverter => &[Cell::Nor2, Cell::Inv],
            Self::DeMorgan => &[Cell::Inv, Cell::Inv, Cell::Nand2],
        }
    }

    /// Number of leaves this pattern consumes.
    #[must_use]
    pub const fn leaf_count(self) -> usize {
        match self {
            Self::Source => 0,
            Self::Alias | Self::Inverter => 1,
            Self::Nand | Self::Nor | Self::And | Self::NandInverter | Self::Or | Self::NorInverter | Self::DeMorgan => 2,
            Self::Aoi21 => 3,
            Self::Aoi22 | Self::NandOrNor => 4,
        }
    }

    /// Total area of the cells in this pattern.
    #[must_use]
    pub fn area(self) -> u64 {
        self.cells().iter().map(|cell| cell.cost()).sum()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("input"),
            Self::Alias => f.write_str("alias"),
            _ => {
                let mut cells = self.cells().iter();
                if let Some(first) = cells.next() {
                    write!(f, "{}", first)?;
                }
                for cell in cells {
                    write!(f, "+{}", cell)?;
                }
                Ok(())
            }
        }
    }
}
