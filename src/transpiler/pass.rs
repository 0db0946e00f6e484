use tracing::{debug, info};

use crate::error::TranspileResult;
use crate::ir::Circuit;

/// A trait for transpiler passes.
///
/// A pass takes a circuit and returns a transformed circuit. Passes hold no
/// per-run state, so one instance may serve several threads.
pub trait Pass: Send + Sync {
    /// Returns the name of the pass.
    fn name(&self) -> &str;

    /// Runs the pass on the given circuit.
    fn run(&self, circuit: &Circuit) -> TranspileResult<Circuit>;
}

/// Manages a sequence of transpiler passes.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Creates a new empty PassManager.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Adds a pass to the manager.
    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// True if no pass is registered.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs all passes in sequence on the given circuit.
    ///
    /// Stops at the first failing pass; no partial result is returned.
    pub fn run(&self, circuit: &Circuit) -> TranspileResult<Circuit> {
        info!(
            "Running {} passes on circuit with {} qubits",
            self.passes.len(),
            circuit.num_qubits
        );
        let mut current_circuit = circuit.clone();
        for pass in &self.passes {
            debug!("Running pass: {}", pass.name());
            current_circuit = pass.run(&current_circuit)?;
            debug!(
                "Pass {} completed, ops: {}",
                pass.name(),
                current_circuit.operations.len()
            );
        }
        Ok(current_circuit)
    }
}
