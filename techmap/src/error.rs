/// A failure to map a network.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A gate consumes a wire that was never declared.
    #[error("wire `{0}` is used but never declared")]
    DanglingReference(String),
    /// A wire depends on itself.
    #[error("wire `{0}` is part of a combinational cycle")]
    CyclicDefinition(String),
    /// No output was designated, or the designated output was never declared.
    #[error("network has no output")]
    MissingOutput,
    /// A gate has the wrong number of inputs for its operator.
    #[error("wire `{wire}` has {found} inputs, expected {expected}")]
    ArityMismatch {
        /// The offending wire.
        wire: String,
        /// Inputs required by the operator.
        expected: usize,
        /// Inputs actually connected.
        found: usize,
    },
}

/// A failure to build a network from a description.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The description could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A line does not follow the netlist grammar.
    #[error("line {line}: {reason}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// A gate uses an operator other than AND, OR or NOT.
    #[error("line {line}: unknown operator `{op}`")]
    UnknownOperator {
        /// 1-based line number.
        line: usize,
        /// The operator as written.
        op: String,
    },
    /// A wire is declared twice.
    #[error("wire `{0}` is declared more than once")]
    Redefinition(String),
    /// Two different outputs were designated.
    #[error("output already designated as `{first}`, cannot also designate `{second}`")]
    MultipleOutputs {
        /// The output designated first.
        first: String,
        /// The conflicting designation.
        second: String,
    },
    /// The AIGER reader rejected the file.
    #[error("malformed AIGER file: {0}")]
    Aiger(String),
    /// The file uses something a combinational network cannot express.
    #[error("unsupported: {0}")]
    Unsupported(String),
}
