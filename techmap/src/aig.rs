//! Reading networks from AIGER and-inverter graphs.

use std::io::Read;

use aiger::Literal;

use crate::error::BuildError;
use crate::network::{Network, Op};

fn variable_name(variable: usize) -> String {
    format!("v{}", variable)
}

impl Network {
    /// Builds a network from an AIGER file, with output number `output` as the network output.
    ///
    /// Every AND gate becomes an AND wire `v<variable>`, and every inverted literal becomes a NOT wire `!v<variable>`
    /// shared by all its users. If the file has fewer outputs than requested the network is left without an output.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Aiger`] if the file is malformed and [`BuildError::Unsupported`] if it contains latches
    /// or constants.
    pub fn from_aiger<R: Read>(reader: R, output: usize) -> Result<Self, BuildError> {
        let reader = aiger::Reader::from_reader(reader).map_err(|error| BuildError::Aiger(format!("{:?}", error)))?;

        if reader.header().l > 0 {
            return Err(BuildError::Unsupported("AIGER latches".to_string()));
        }

        let output_count = reader.header().o;
        if output >= output_count {
            log::warn!("Output {} requested but the file has {} outputs", output, output_count);
        }

        let mut network = Self::new();
        let mut outputs = 0;

        for record in reader.records() {
            match record.map_err(|error| BuildError::Aiger(format!("{:?}", error)))? {
                aiger::Aiger::Input(literal) => {
                    network.add_input(&variable_name(literal.variable()))?;
                },
                aiger::Aiger::Latch { output: _, input: _ } => {
                    return Err(BuildError::Unsupported("AIGER latches".to_string()));
                },
                aiger::Aiger::Output(literal) => {
                    if outputs == output {
                        let driver = network.aiger_literal(literal)?;
                        let name = format!("o{}", outputs);
                        network.add_output(&name, &driver)?;
                        network.set_output(&name)?;
                    }
                    outputs += 1;
                },
                aiger::Aiger::AndGate { output, inputs } => {
                    let a = network.aiger_literal(inputs[0])?;
                    let b = network.aiger_literal(inputs[1])?;
                    network.add_gate(&variable_name(output.variable()), Op::And, &[a, b])?;
                },
                aiger::Aiger::Symbol { .. } => {},
            }
        }

        if output_count > 1 {
            log::warn!("Mapping output {} only, ignoring {} others", output, output_count - 1);
        }

        Ok(network)
    }

    /// Returns the wire carrying `literal`, adding an inverter for negated literals.
    fn aiger_literal(&mut self, literal: Literal) -> Result<String, BuildError> {
        if literal.variable() == 0 {
            return Err(BuildError::Unsupported("AIGER constants".to_string()));
        }

        let name = variable_name(literal.variable());
        if !literal.is_inverted() {
            return Ok(name);
        }

        let inverted = format!("!{}", name);
        if self.find(&inverted).is_none() {
            self.add_gate(&inverted, Op::Not, &[name])?;
        }
        Ok(inverted)
    }
}
