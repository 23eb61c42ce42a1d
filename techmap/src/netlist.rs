//! Reading networks from gate-list text.
//!
//! Each non-blank line is one of:
//!
//! ```text
//! <name> INPUT
//! <name> OUTPUT
//! <name> = <AND|OR|NOT> <input>...
//! <name> = <wire>
//! ```
//!
//! Lines may come in any order. Lines starting with `#`, and banner lines starting with `Test` or `Script`, are
//! ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::BuildError;
use crate::network::{Network, Op};

fn is_ignored(tokens: &[&str]) -> bool {
    let Some(first) = tokens.first() else {
        return true;
    };

    if first.starts_with('#') {
        return true;
    }

    // A wire may be called `Test1`; only treat the line as a banner if it is not a declaration.
    (first.starts_with("Test") || first.starts_with("Script")) && !matches!(tokens.get(1), Some(&("INPUT" | "OUTPUT" | "=")))
}

impl Network {
    /// Parses a gate list.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if a line is malformed or a wire is declared twice. Undeclared and cyclic wires are
    /// accepted here and reported when the network is mapped.
    pub fn from_netlist(text: &str) -> Result<Self, BuildError> {
        Self::from_reader(text.as_bytes())
    }

    /// Parses a gate list from a file.
    ///
    /// # Errors
    ///
    /// See [`Network::from_netlist`]; also fails if the file cannot be read.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BuildError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a gate list from a reader.
    ///
    /// # Errors
    ///
    /// See [`Network::from_netlist`]; also fails if reading fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, BuildError> {
        let mut network = Self::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            let tokens = line.split_whitespace().collect::<Vec<_>>();

            if is_ignored(&tokens) {
                continue;
            }

            match tokens[..] {
                [name, "INPUT"] => {
                    network.add_input(name)?;
                },
                [name, "OUTPUT"] => {
                    network.set_output(name)?;
                },
                [_, "="] => {
                    return Err(BuildError::Syntax {
                        line: number,
                        reason: "missing right-hand side".to_string(),
                    });
                },
                [name, "=", keyword, ref inputs @ ..] => match Op::from_keyword(keyword) {
                    Some(op) => {
                        network.add_gate(name, op, inputs)?;
                    },
                    None => match inputs {
                        [] => {
                            network.add_output(name, keyword)?;
                        },
                        _ => {
                            return Err(BuildError::UnknownOperator {
                                line: number,
                                op: keyword.to_string(),
                            })
                        },
                    },
                },
                _ => {
                    return Err(BuildError::Syntax {
                        line: number,
                        reason: format!("expected `<name> INPUT`, `<name> OUTPUT` or `<name> = <OP> <inputs>`, found `{}`", line.trim()),
                    });
                },
            }
        }

        log::debug!("Parsed {} wires", network.wire_count());

        Ok(network)
    }
}
