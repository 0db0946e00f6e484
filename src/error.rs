//! Error types for the crate.

use thiserror::Error;

use crate::ir::GateKind;

/// A malformed gate graph or circuit.
///
/// These are fatal: no partial result is produced.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum StructuralError {
    /// An operation references a qubit beyond the declared register.
    #[error("qubit {qubit} out of range (circuit has {num_qubits} qubits)")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: usize,
        /// Declared number of qubits.
        num_qubits: usize,
    },

    /// A measurement targets a classical bit beyond the declared register.
    #[error("classical bit {cbit} out of range (circuit has {num_cbits} bits)")]
    ClbitOutOfRange {
        /// The offending bit index.
        cbit: usize,
        /// Declared number of classical bits.
        num_cbits: usize,
    },

    /// The same qubit appears twice in one operation.
    #[error("qubit {qubit} used twice in one operation")]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: usize,
    },

    /// A gate was given the wrong number of qubit operands.
    #[error("gate '{kind}' requires {expected} qubits, got {got}")]
    ArityMismatch {
        /// The gate kind.
        kind: GateKind,
        /// Required operand count.
        expected: usize,
        /// Supplied operand count.
        got: usize,
    },

    /// A gate was given the wrong number of parameters.
    #[error("gate '{kind}' requires {expected} parameters, got {got}")]
    ParamCountMismatch {
        /// The gate kind.
        kind: GateKind,
        /// Required parameter count.
        expected: usize,
        /// Supplied parameter count.
        got: usize,
    },

    /// The graph contains a cycle.
    #[error("cycle detected in gate graph")]
    Cycle,

    /// A wire does not form a single chain from its input to its output.
    #[error("broken timeline on {wire}: {reason}")]
    BrokenTimeline {
        /// Human-readable wire name, e.g. `q[0]`.
        wire: String,
        /// What went wrong.
        reason: String,
    },

    /// A node id that is not an operation node of this graph.
    #[error("invalid node index")]
    InvalidNode,

    /// Two nodes handed to a rewrite are not neighbours on a single shared qubit.
    #[error("nodes are not adjacent on qubit {qubit}")]
    NotAdjacent {
        /// The qubit the rewrite was requested on.
        qubit: usize,
    },
}

/// An invalid rewrite rule table or pass configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A rule names a gate the IR does not know.
    #[error("unsupported gate kind '{0}'")]
    UnsupportedKind(String),

    /// A rule names a gate that is not a parameterless single-qubit gate.
    #[error("gate '{0}' cannot appear in a merge rule (only parameterless single-qubit gates)")]
    NonMergeableKind(GateKind),

    /// Two rules map the same pair to different replacements.
    #[error("conflicting rules for ({first}, {second}): '{existing}' vs '{replacement}'")]
    ConflictingRule {
        /// First gate of the pair.
        first: GateKind,
        /// Second gate of the pair.
        second: GateKind,
        /// Replacement already in the table.
        existing: GateKind,
        /// Replacement that was rejected.
        replacement: GateKind,
    },

    /// A rule whose replacement is not the product of its pair.
    #[error("rule ({first}, {second}) -> {replacement} is not a valid identity")]
    NotEquivalent {
        /// First gate of the pair.
        first: GateKind,
        /// Second gate of the pair.
        second: GateKind,
        /// Claimed replacement.
        replacement: GateKind,
    },

    /// Malformed line in the text rule format.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What was expected.
        message: String,
    },

    /// Unknown preset name.
    #[error("unknown rule preset '{0}'")]
    UnknownPreset(String),

    /// CSV decoding failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// OpenQASM 2.0 reader errors.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QasmError {
    /// Missing or malformed `OPENQASM` header.
    #[error("Missing or invalid OPENQASM header. File must start with 'OPENQASM 2.0;'")]
    MissingHeader,

    /// Header names a version other than 2.0.
    #[error("Unsupported OpenQASM version: '{0}'. Only '2.0' is supported.")]
    UnsupportedVersion(String),

    /// `include` statements are not resolved.
    #[error("Includes are not supported. Please resolve all imports before parsing. Found: 'include \"{0}\"'")]
    IncludeNotSupported(String),

    /// Input that matches no statement.
    #[error("Parse error at: {0}")]
    Syntax(String),

    /// A register name declared twice.
    #[error("Register already declared: {0}")]
    DuplicateRegister(String),

    /// Reference to an undeclared register.
    #[error("Undefined register: {0}")]
    UndefinedRegister(String),

    /// Register index past the register size.
    #[error("Index out of bounds: {name}[{index}]")]
    IndexOutOfBounds {
        /// Register name.
        name: String,
        /// Requested index.
        index: usize,
    },

    /// Broadcast over registers of different sizes.
    #[error("Register size mismatch in '{0}'")]
    SizeMismatch(String),

    /// Gate name with no known kind.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Wrong number of parameters or qubits for a gate.
    #[error("Gate '{name}' expects {expected} {what}, got {got}")]
    WrongArgCount {
        /// Gate name as written.
        name: String,
        /// "params" or "qubits".
        what: &'static str,
        /// Required count.
        expected: usize,
        /// Supplied count.
        got: usize,
    },

    /// Parameter expression could not be evaluated.
    #[error("Invalid parameter expression: {0}")]
    Expression(String),
}

/// Top-level error for pass execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranspileError {
    /// Malformed circuit or graph.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid QASM input.
    #[error(transparent)]
    Qasm(#[from] QasmError),
}

/// Result type for graph operations.
pub type StructuralResult<T> = Result<T, StructuralError>;

/// Result type for pass execution.
pub type TranspileResult<T> = Result<T, TranspileError>;
