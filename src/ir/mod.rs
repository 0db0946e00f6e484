pub mod circuit;
pub mod gates;
pub mod matrix;
pub mod operations;

// Re-export for easier access
pub use circuit::Circuit;
pub use gates::GateKind;
pub use operations::Operation;
