//! A peephole gate-merging pass for quantum circuits.
//!
//! Circuits are loaded into a [`dag::GateGraph`], where every qubit is a
//! chain of operations. The [`transpiler::MergeAdjacentGates`] pass walks
//! those chains and replaces neighbouring gate pairs according to a
//! [`transpiler::RuleTable`], so `T T` becomes `S` and `Tdg Tdg` becomes
//! `Sdg`.
//!
//! ```
//! use q_peephole::parser::parse_qasm;
//! use q_peephole::transpiler::{MergeAdjacentGates, Pass};
//!
//! let circuit = parse_qasm("OPENQASM 2.0; qreg q[1]; t q[0]; t q[0];").unwrap();
//! let optimized = MergeAdjacentGates::default().run(&circuit).unwrap();
//! assert_eq!(optimized.to_qasm(), "OPENQASM 2.0;\nqreg q[1];\ns q[0];\n");
//! ```

pub mod config;
pub mod dag;
pub mod error;
pub mod ir;
pub mod parser;
pub mod transpiler;

pub use error::{ConfigError, QasmError, StructuralError, TranspileError, TranspileResult};
