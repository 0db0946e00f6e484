use q_peephole::ir::{GateKind, Operation};
use q_peephole::parser::parse_qasm;
use q_peephole::QasmError;

#[test]
fn test_teleportation_circuit() {
    let qasm = r#"
        OPENQASM 2.0;
        qreg q[3];
        creg c0[1];
        creg c1[1];
        creg c2[1];

        // Bell pair
        h q[1];
        cx q[1], q[2];

        // Prepare payload
        rx(0.5) q[0];

        // Teleportation
        cx q[0], q[1];
        h q[0];
        measure q[0] -> c0[0];
        measure q[1] -> c1[0];

        z q[2];
        x q[2];
    "#;

    let circuit = parse_qasm(qasm).expect("Failed to parse teleportation circuit");
    assert_eq!(circuit.num_qubits, 3);
    assert_eq!(circuit.num_cbits, 3);

    // H, CX, RX, CX, H, M, M, Z, X
    assert_eq!(circuit.operations.len(), 9);
    assert_eq!(
        circuit.operations[6],
        Operation::Measure { qubit: 1, cbit: 1 }
    );
}

#[test]
fn test_whitespace_tolerance() {
    let qasm = r#"
        OPENQASM 2.0;

        qreg    q[2]   ;
          creg  c[2];

        h   q[0]  ; // Comment

        cx q[0] ,  q[1];
    "#;
    let circuit = parse_qasm(qasm).expect("Failed to parse whitespace");
    assert_eq!(circuit.num_qubits, 2);
    assert_eq!(circuit.operations.len(), 2);
    assert_eq!(circuit.operations[1], Operation::gate(GateKind::CX, vec![0, 1]));
}

#[test]
fn test_undeclared_qubit() {
    let qasm = r#"
        OPENQASM 2.0;
        qreg q[1];
        x q[10]; // Index out of bounds
    "#;
    let err = parse_qasm(qasm).unwrap_err();
    assert_eq!(
        err,
        QasmError::IndexOutOfBounds {
            name: "q".to_string(),
            index: 10
        }
    );
}

#[test]
fn test_unknown_register() {
    let qasm = r#"
        OPENQASM 2.0;
        qreg q[1];
        x r[0]; // Unknown register
    "#;
    let err = parse_qasm(qasm).unwrap_err();
    assert_eq!(err, QasmError::UndefinedRegister("r".to_string()));
}

#[test]
fn test_missing_semicolon() {
    let qasm = r#"
        OPENQASM 2.0;
        qreg q[1]
        x q[0];
    "#;
    let err = parse_qasm(qasm).unwrap_err();
    assert!(matches!(err, QasmError::Syntax(_)));
    assert!(err.to_string().contains("Parse error"));
}

#[test]
fn test_parameterized_gate() {
    let qasm = "OPENQASM 2.0; qreg q[1]; rx(0.5) q[0];";
    let circuit = parse_qasm(qasm).expect("Failed to parse parameterized gate");
    assert_eq!(
        circuit.operations,
        vec![Operation::Gate {
            kind: GateKind::RX,
            qubits: vec![0],
            params: vec![0.5],
        }]
    );
}

#[test]
fn test_custom_include_error() {
    let qasm = r#"
        OPENQASM 2.0;
        include "custom.inc";
    "#;
    let err = parse_qasm(qasm).unwrap_err();
    assert_eq!(err, QasmError::IncludeNotSupported("custom.inc".to_string()));
    assert!(err.to_string().contains("Includes are not supported"));
}

#[test]
fn test_qelib1_include_rejected() {
    let qasm = r#"
        OPENQASM 2.0;
        include "qelib1.inc";
    "#;
    let err = parse_qasm(qasm).unwrap_err();
    assert!(err.to_string().contains("Includes are not supported"));
}

#[test]
fn test_t_gate_chain() {
    let qasm = r#"
        OPENQASM 2.0;
        qreg q[4];
        creg c[4];

        h q;
        barrier q;

        t q[0];
        tdg q[1];
        t q;
        measure q -> c;
    "#;

    let circuit = parse_qasm(qasm).expect("Failed to parse T chain");
    assert_eq!(circuit.num_qubits, 4);
    assert_eq!(circuit.num_cbits, 4);
    // 4 H, 1 barrier, T, Tdg, 4 T, 4 measure
    assert_eq!(circuit.operations.len(), 15);
    assert_eq!(circuit.operations[4], Operation::Barrier { qubits: vec![0, 1, 2, 3] });
    assert_eq!(circuit.gate_count(), 10);
}
