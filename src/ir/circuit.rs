use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::operations::Operation;

/// Intermediate Representation of a Quantum Circuit.
///
/// A `Circuit` consists of a sequence of operations and metadata about the
/// number of qubits and classical bits required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Total number of qubits in the circuit.
    pub num_qubits: usize,
    /// Total number of classical bits in the circuit.
    pub num_cbits: usize,
    /// Sequence of operations (gates, measurements, etc.).
    pub operations: Vec<Operation>,
}

impl Circuit {
    /// Creates a new empty circuit.
    ///
    /// # Arguments
    ///
    /// * `num_qubits` - The number of qubits to allocate.
    /// * `num_cbits` - The number of classical bits to allocate.
    pub fn new(num_qubits: usize, num_cbits: usize) -> Self {
        Self {
            num_qubits,
            num_cbits,
            operations: Vec::new(),
        }
    }

    /// Adds an operation to the circuit.
    pub fn add_op(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Number of gate operations (measurements, resets and barriers excluded).
    pub fn gate_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Gate { .. }))
            .count()
    }

    /// Emits the circuit as OpenQASM 2.0 with a single `q` and `c` register.
    ///
    /// The output is accepted by [`parse_qasm`](crate::parser::parse_qasm).
    pub fn to_qasm(&self) -> String {
        let mut out = String::from("OPENQASM 2.0;\n");
        if self.num_qubits > 0 {
            let _ = writeln!(out, "qreg q[{}];", self.num_qubits);
        }
        if self.num_cbits > 0 {
            let _ = writeln!(out, "creg c[{}];", self.num_cbits);
        }
        for op in &self.operations {
            match op {
                Operation::Gate {
                    kind,
                    qubits,
                    params,
                } => {
                    out.push_str(kind.name());
                    if !params.is_empty() {
                        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                        let _ = write!(out, "({})", params.join(","));
                    }
                    let _ = writeln!(out, " {};", qubit_list(qubits));
                }
                Operation::Measure { qubit, cbit } => {
                    let _ = writeln!(out, "measure q[{}] -> c[{}];", qubit, cbit);
                }
                Operation::Reset { qubit } => {
                    let _ = writeln!(out, "reset q[{}];", qubit);
                }
                // `barrier ;` is not valid QASM
                Operation::Barrier { qubits } if qubits.is_empty() => {}
                Operation::Barrier { qubits } => {
                    let _ = writeln!(out, "barrier {};", qubit_list(qubits));
                }
            }
        }
        out
    }
}

fn qubit_list(qubits: &[usize]) -> String {
    qubits
        .iter()
        .map(|q| format!("q[{}]", q))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::gates::GateKind;

    #[test]
    fn test_circuit_creation() {
        let circuit = Circuit::new(2, 2);
        assert_eq!(circuit.num_qubits, 2);
        assert_eq!(circuit.num_cbits, 2);
        assert!(circuit.operations.is_empty());
    }

    #[test]
    fn test_add_op() {
        let mut circuit = Circuit::new(1, 0);
        let op = Operation::gate(GateKind::H, vec![0]);
        circuit.add_op(op.clone());
        assert_eq!(circuit.operations.len(), 1);
        assert_eq!(circuit.operations[0], op);
    }

    #[test]
    fn test_gate_count_skips_non_gates() {
        let mut circuit = Circuit::new(1, 1);
        circuit.add_op(Operation::gate(GateKind::T, vec![0]));
        circuit.add_op(Operation::Barrier { qubits: vec![0] });
        circuit.add_op(Operation::Measure { qubit: 0, cbit: 0 });
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn test_to_qasm() {
        let mut circuit = Circuit::new(2, 1);
        circuit.add_op(Operation::gate(GateKind::Tdg, vec![0]));
        circuit.add_op(Operation::Gate {
            kind: GateKind::RZ,
            qubits: vec![1],
            params: vec![0.5],
        });
        circuit.add_op(Operation::gate(GateKind::CX, vec![0, 1]));
        circuit.add_op(Operation::Measure { qubit: 1, cbit: 0 });

        let expected = "OPENQASM 2.0;\n\
                        qreg q[2];\n\
                        creg c[1];\n\
                        tdg q[0];\n\
                        rz(0.5) q[1];\n\
                        cx q[0],q[1];\n\
                        measure q[1] -> c[0];\n";
        assert_eq!(circuit.to_qasm(), expected);
    }

    #[test]
    fn test_to_qasm_skips_empty_barrier() {
        let mut circuit = Circuit::new(1, 0);
        circuit.add_op(Operation::Barrier { qubits: vec![] });
        circuit.add_op(Operation::Barrier { qubits: vec![0] });
        assert_eq!(
            circuit.to_qasm(),
            "OPENQASM 2.0;\nqreg q[1];\nbarrier q[0];\n"
        );
    }
}
