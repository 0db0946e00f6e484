//! 2x2 unitaries of single-qubit gates, used to check rewrite rules.

use nalgebra::Matrix2;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use super::gates::GateKind;

/// Tolerance for matrix comparisons.
pub const EPSILON: f64 = 1e-10;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn phase(theta: f64) -> Complex64 {
    Complex64::from_polar(1.0, theta)
}

/// Unitary of a single-qubit gate, or `None` for multi-qubit kinds or a
/// parameter list of the wrong length.
pub fn single_qubit_unitary(kind: GateKind, params: &[f64]) -> Option<Matrix2<Complex64>> {
    if kind.num_qubits() != 1 || params.len() != kind.num_params() {
        return None;
    }
    let zero = c(0.0, 0.0);
    let one = c(1.0, 0.0);
    let m = match kind {
        GateKind::ID => Matrix2::identity(),
        GateKind::H => {
            let h = c(FRAC_1_SQRT_2, 0.0);
            Matrix2::new(h, h, h, -h)
        }
        GateKind::X => Matrix2::new(zero, one, one, zero),
        GateKind::Y => Matrix2::new(zero, c(0.0, -1.0), c(0.0, 1.0), zero),
        GateKind::Z => Matrix2::new(one, zero, zero, -one),
        GateKind::S => Matrix2::new(one, zero, zero, phase(FRAC_PI_2)),
        GateKind::Sdg => Matrix2::new(one, zero, zero, phase(-FRAC_PI_2)),
        GateKind::T => Matrix2::new(one, zero, zero, phase(FRAC_PI_4)),
        GateKind::Tdg => Matrix2::new(one, zero, zero, phase(-FRAC_PI_4)),
        GateKind::SX => Matrix2::new(c(0.5, 0.5), c(0.5, -0.5), c(0.5, -0.5), c(0.5, 0.5)),
        GateKind::SXdg => Matrix2::new(c(0.5, -0.5), c(0.5, 0.5), c(0.5, 0.5), c(0.5, -0.5)),
        GateKind::RX => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            Matrix2::new(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
        }
        GateKind::RY => {
            let (s, co) = (params[0] / 2.0).sin_cos();
            Matrix2::new(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
        }
        GateKind::RZ => {
            let half = params[0] / 2.0;
            Matrix2::new(phase(-half), zero, zero, phase(half))
        }
        GateKind::U1 => Matrix2::new(one, zero, zero, phase(params[0])),
        GateKind::U => {
            let (theta, phi, lambda) = (params[0], params[1], params[2]);
            let (s, co) = (theta / 2.0).sin_cos();
            Matrix2::new(
                c(co, 0.0),
                -phase(lambda) * s,
                phase(phi) * s,
                phase(phi + lambda) * co,
            )
        }
        GateKind::CX | GateKind::CZ | GateKind::SWAP | GateKind::CCX => return None,
    };
    Some(m)
}

/// True when `a = e^{i phi} b` for some global phase `phi`.
pub fn equivalent_up_to_phase(a: &Matrix2<Complex64>, b: &Matrix2<Complex64>) -> bool {
    // Pick the largest entry of `b` to fix the phase.
    let (idx, pivot) = b
        .iter()
        .enumerate()
        .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
        .map(|(i, v)| (i, *v))
        .unwrap_or((0, c(0.0, 0.0)));
    if pivot.norm() < EPSILON {
        return a.iter().all(|v| v.norm() < EPSILON);
    }
    let ratio = a[idx] / pivot;
    if (ratio.norm() - 1.0).abs() > EPSILON {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (x - ratio * y).norm() < EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn u(kind: GateKind) -> Matrix2<Complex64> {
        single_qubit_unitary(kind, &[]).unwrap()
    }

    #[test]
    fn test_t_squared_is_s() {
        assert!(equivalent_up_to_phase(&(u(GateKind::T) * u(GateKind::T)), &u(GateKind::S)));
        assert!(equivalent_up_to_phase(
            &(u(GateKind::Tdg) * u(GateKind::Tdg)),
            &u(GateKind::Sdg)
        ));
    }

    #[test]
    fn test_sx_squared_is_x() {
        assert!(equivalent_up_to_phase(&(u(GateKind::SX) * u(GateKind::SX)), &u(GateKind::X)));
    }

    #[test]
    fn test_phase_sensitive_mismatch() {
        assert!(!equivalent_up_to_phase(&u(GateKind::T), &u(GateKind::S)));
        assert!(!equivalent_up_to_phase(&u(GateKind::X), &u(GateKind::Z)));
    }

    #[test]
    fn test_global_phase_ignored() {
        // RZ(pi) = -i Z
        let rz = single_qubit_unitary(GateKind::RZ, &[PI]).unwrap();
        assert!(equivalent_up_to_phase(&rz, &u(GateKind::Z)));
        let u1 = single_qubit_unitary(GateKind::U1, &[PI / 4.0]).unwrap();
        assert!(equivalent_up_to_phase(&u1, &u(GateKind::T)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(single_qubit_unitary(GateKind::CX, &[]).is_none());
        assert!(single_qubit_unitary(GateKind::RX, &[]).is_none());
    }
}
