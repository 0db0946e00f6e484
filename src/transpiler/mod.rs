//! Transpiler passes: the adjacent-gate merge pass and its building blocks.

pub mod merge;
pub mod pass;
pub mod rules;
pub mod scanner;

pub use merge::{DriverState, MergeAdjacentGates, MergeStats};
pub use pass::{Pass, PassManager};
pub use rules::{RawRule, RewriteRule, RuleTable};
pub use scanner::{AdjacencyScanner, Candidate};
