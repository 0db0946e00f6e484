use serde::{Deserialize, Serialize};

use super::gates::GateKind;

/// Represents a single operation in the quantum circuit.
///
/// Operations can be quantum gates, measurements, resets, or barriers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// A quantum gate application.
    Gate {
        /// Kind of the gate (e.g., H, CX).
        kind: GateKind,
        /// Indices of the qubits involved.
        qubits: Vec<usize>,
        /// Parameters for the gate (if any).
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<f64>,
    },
    /// A measurement operation.
    Measure {
        /// Index of the qubit to measure.
        qubit: usize,
        /// Index of the classical bit to store the result.
        cbit: usize,
    },
    /// Reset a qubit to the |0> state.
    Reset {
        /// Index of the qubit to reset.
        qubit: usize,
    },
    /// A barrier to prevent optimizations across a boundary.
    Barrier {
        /// Indices of the qubits involved in the barrier.
        qubits: Vec<usize>,
    },
}

impl Operation {
    /// A parameterless gate.
    pub fn gate(kind: GateKind, qubits: Vec<usize>) -> Self {
        Operation::Gate {
            kind,
            qubits,
            params: vec![],
        }
    }

    /// Qubits touched by this operation, in operand order.
    pub fn qubits(&self) -> &[usize] {
        match self {
            Operation::Gate { qubits, .. } | Operation::Barrier { qubits } => qubits,
            Operation::Measure { qubit, .. } | Operation::Reset { qubit } => {
                std::slice::from_ref(qubit)
            }
        }
    }

    /// Classical bits written by this operation.
    pub fn cbits(&self) -> &[usize] {
        match self {
            Operation::Measure { cbit, .. } => std::slice::from_ref(cbit),
            _ => &[],
        }
    }

    /// The gate kind, if this is a gate.
    pub fn kind(&self) -> Option<GateKind> {
        match self {
            Operation::Gate { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The single qubit a parameterless one-qubit gate acts on.
    ///
    /// This is the shape every rewrite rule requires of both its operands.
    pub fn fixed_single_qubit(&self) -> Option<(GateKind, usize)> {
        match self {
            Operation::Gate {
                kind,
                qubits,
                params,
            } if kind.is_fixed_single_qubit() && qubits.len() == 1 && params.is_empty() => {
                Some((*kind, qubits[0]))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubits_and_cbits() {
        let m = Operation::Measure { qubit: 2, cbit: 1 };
        assert_eq!(m.qubits(), &[2]);
        assert_eq!(m.cbits(), &[1]);

        let cx = Operation::gate(GateKind::CX, vec![0, 1]);
        assert_eq!(cx.qubits(), &[0, 1]);
        assert!(cx.cbits().is_empty());
        assert_eq!(cx.kind(), Some(GateKind::CX));
    }

    #[test]
    fn test_fixed_single_qubit() {
        assert_eq!(
            Operation::gate(GateKind::T, vec![3]).fixed_single_qubit(),
            Some((GateKind::T, 3))
        );
        let rz = Operation::Gate {
            kind: GateKind::RZ,
            qubits: vec![0],
            params: vec![0.5],
        };
        assert_eq!(rz.fixed_single_qubit(), None);
        assert_eq!(Operation::Reset { qubit: 0 }.fixed_single_qubit(), None);
    }

    #[test]
    fn test_json_shape() {
        let op = Operation::gate(GateKind::T, vec![0]);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "op": "gate", "kind": "t", "qubits": [0] })
        );
        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }
}
