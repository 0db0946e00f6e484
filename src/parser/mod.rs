pub mod ast;
pub mod rules;

use self::ast::{Arg, ParsedStatement};
use self::rules::{
    barrier, comment, creg, gate_call, include, measure, openqasm_version, qreg, reset,
};
use crate::error::QasmError;
use crate::ir::{Circuit, GateKind, Operation};
use nom::{branch::alt, character::complete::multispace0};
use std::collections::HashMap;

// --- Resolution & Mapping ---

fn map_gate(name: &str, params: Vec<f64>) -> Result<(GateKind, Vec<f64>), QasmError> {
    let wrong_params = |expected| QasmError::WrongArgCount {
        name: name.to_string(),
        what: "params",
        expected,
        got: params.len(),
    };
    // u2(phi, lambda) = U(pi/2, phi, lambda)
    if name == "u2" {
        return match params[..] {
            [phi, lambda] => Ok((GateKind::U, vec![std::f64::consts::FRAC_PI_2, phi, lambda])),
            _ => Err(wrong_params(2)),
        };
    }
    let kind: GateKind = name
        .parse()
        .map_err(|_| QasmError::UnknownGate(name.to_string()))?;
    if params.len() != kind.num_params() {
        return Err(wrong_params(kind.num_params()));
    }
    Ok((kind, params))
}

/// Register name -> (start index, size).
type Registers = HashMap<String, (usize, usize)>;

fn resolve_argument(arg: &Arg, regs: &Registers) -> Result<Vec<usize>, QasmError> {
    let (name, idx) = arg;
    let &(start, size) = regs
        .get(name)
        .ok_or_else(|| QasmError::UndefinedRegister(name.clone()))?;
    match idx {
        Some(i) if *i < size => Ok(vec![start + i]),
        Some(i) => Err(QasmError::IndexOutOfBounds {
            name: name.clone(),
            index: *i,
        }),
        // Broadcasting: the whole register
        None => Ok((start..start + size).collect()),
    }
}

/// Expands register arguments into one operand list per broadcast step.
fn broadcast(args: Vec<Vec<usize>>, context: &str) -> Result<Vec<Vec<usize>>, QasmError> {
    let max_len = args.iter().map(Vec::len).max().unwrap_or(1);
    if args.iter().any(|a| a.len() != 1 && a.len() != max_len) {
        return Err(QasmError::SizeMismatch(context.to_string()));
    }
    Ok((0..max_len)
        .map(|i| {
            args.iter()
                .map(|a| if a.len() == 1 { a[0] } else { a[i] })
                .collect()
        })
        .collect())
}

#[derive(Default)]
struct ParseContext {
    qregs: Registers,
    cregs: Registers,
    num_qubits: usize,
    num_cbits: usize,
}

fn skip_trivia(mut input: &str) -> &str {
    loop {
        if let Ok((rem, _)) = multispace0::<&str, nom::error::Error<&str>>(input) {
            input = rem;
        }
        match comment(input) {
            Ok((rem, _)) => input = rem,
            Err(_) => return input,
        }
    }
}

fn syntax_error(input: &str) -> QasmError {
    QasmError::Syntax(input.lines().next().unwrap_or_default().to_string())
}

/// Parses an OpenQASM 2.0 program into a [`Circuit`].
///
/// Registers are flattened in declaration order: the first `qreg` gets
/// indices `0..n`, the next one continues from `n`.
pub fn parse_qasm(input: &str) -> Result<Circuit, QasmError> {
    let mut circuit = Circuit::new(0, 0);
    let mut ctx = ParseContext::default();

    // 1. Header
    let current_input = skip_trivia(input);
    if current_input.is_empty() {
        return Err(QasmError::MissingHeader);
    }
    let (rem, version) =
        openqasm_version(current_input).map_err(|_| QasmError::MissingHeader)?;
    if version != "2.0" {
        return Err(QasmError::UnsupportedVersion(version));
    }
    let mut current_input = rem;

    // 2. Remaining statements
    loop {
        current_input = skip_trivia(current_input);
        if current_input.is_empty() {
            break;
        }

        let (rem, stmt) = alt((include, qreg, creg, measure, reset, barrier, gate_call))(
            current_input,
        )
        .map_err(|_| syntax_error(current_input))?;
        current_input = rem;

        match stmt {
            ParsedStatement::Include(filename) => {
                return Err(QasmError::IncludeNotSupported(filename));
            }
            ParsedStatement::QReg(name, size) => {
                if ctx.qregs.contains_key(&name) {
                    return Err(QasmError::DuplicateRegister(name));
                }
                ctx.qregs.insert(name, (ctx.num_qubits, size));
                ctx.num_qubits += size;
            }
            ParsedStatement::CReg(name, size) => {
                if ctx.cregs.contains_key(&name) {
                    return Err(QasmError::DuplicateRegister(name));
                }
                ctx.cregs.insert(name, (ctx.num_cbits, size));
                ctx.num_cbits += size;
            }
            ParsedStatement::Gate(name, qubits, params) => {
                let params = params
                    .iter()
                    .map(|p| p.evaluate())
                    .collect::<Result<Vec<_>, _>>()?;
                let (kind, params) = map_gate(&name, params)?;
                if qubits.len() != kind.num_qubits() {
                    return Err(QasmError::WrongArgCount {
                        name,
                        what: "qubits",
                        expected: kind.num_qubits(),
                        got: qubits.len(),
                    });
                }
                let args = qubits
                    .iter()
                    .map(|q| resolve_argument(q, &ctx.qregs))
                    .collect::<Result<Vec<_>, _>>()?;
                for operands in broadcast(args, &name)? {
                    circuit.add_op(Operation::Gate {
                        kind,
                        qubits: operands,
                        params: params.clone(),
                    });
                }
            }
            ParsedStatement::Measure(q, c) => {
                let q_indices = resolve_argument(&q, &ctx.qregs)?;
                let c_indices = resolve_argument(&c, &ctx.cregs)?;
                if q_indices.len() != c_indices.len() {
                    return Err(QasmError::SizeMismatch("measure".to_string()));
                }
                for (qubit, cbit) in q_indices.into_iter().zip(c_indices) {
                    circuit.add_op(Operation::Measure { qubit, cbit });
                }
            }
            ParsedStatement::Reset(q) => {
                for qubit in resolve_argument(&q, &ctx.qregs)? {
                    circuit.add_op(Operation::Reset { qubit });
                }
            }
            ParsedStatement::Barrier(args) => {
                let mut qubits: Vec<usize> = Vec::new();
                for arg in &args {
                    for q in resolve_argument(arg, &ctx.qregs)? {
                        if !qubits.contains(&q) {
                            qubits.push(q);
                        }
                    }
                }
                // a barrier over empty registers has no wires
                if !qubits.is_empty() {
                    circuit.add_op(Operation::Barrier { qubits });
                }
            }
        }
    }

    circuit.num_qubits = ctx.num_qubits;
    circuit.num_cbits = ctx.num_cbits;
    Ok(circuit)
}
