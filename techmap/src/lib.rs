//! Technology mapping of small AND/OR/NOT networks onto a fixed standard-cell library.
//!
//! A network is a set of named wires, each either a primary input, an output port forwarding another wire, or the
//! output of a two-input AND, two-input OR, or NOT gate. The library offers seven cells:
//!
//! | Cell  | Inputs | Cost | Function            |
//! |-------|--------|------|---------------------|
//! | INV   | 1      | 2    | `a'`                |
//! | NAND2 | 2      | 3    | `(ab)'`             |
//! | AND2  | 2      | 4    | `ab`                |
//! | OR2   | 2      | 4    | `a + b`             |
//! | NOR2  | 2      | 6    | `(a + b)'`          |
//! | AOI21 | 3      | 7    | `(ab + c)'`         |
//! | AOI22 | 4      | 7    | `(ab + cd)'`        |
//!
//! Some cells cover more than one gate of the network: a NOT over an OR is one NOR2, a NOT over an OR over an AND is
//! one AOI21. Mapping picks, for every wire, the pattern of cells that builds it most cheaply, and then reports the
//! total area of everything that has to be built to produce the output.
//!
//! A wire that fans out to several gates is built once and its area counted once, the way a fabricated circuit
//! reuses the output of one physical gate.
//!
//! ```
//! use techmap::{minimum_cost, Network};
//!
//! let network = Network::from_netlist("
//!     a INPUT
//!     b INPUT
//!     c INPUT
//!     e = AND a b
//!     f = OR e c
//!     g = NOT f
//!     g OUTPUT
//! ").unwrap();
//!
//! assert_eq!(minimum_cost(&network), Ok(7));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod aig;
pub mod error;
pub mod library;
pub mod mapper;
pub mod matcher;
pub mod netlist;
pub mod network;

pub use error::{BuildError, Error};
pub use library::{Cell, Pattern};
pub use mapper::{minimum_cost, Mapper, Mapping};
pub use network::{Network, Op, WireKind};
