use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quantum Gate Kinds
///
/// This enum is the closed set of gates the IR understands. Parameters
/// (rotation angles) are not part of the kind; they travel next to it in
/// [`Operation::Gate`](super::Operation::Gate), so two `RZ` gates share a
/// kind regardless of their angles and rule lookups stay a plain table hit.
///
/// # Examples
///
/// ```
/// use q_peephole::ir::GateKind;
/// let t = GateKind::T;
/// assert_eq!(t.num_qubits(), 1);
/// assert_eq!("tdg".parse::<GateKind>().unwrap(), GateKind::Tdg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GateKind {
    /// Hadamard gate
    H,
    /// Pauli-X gate (NOT)
    X,
    /// Pauli-Y gate
    Y,
    /// Pauli-Z gate
    Z,
    /// S gate (sqrt(Z))
    S,
    /// S-dagger gate (inverse of S)
    Sdg,
    /// T gate (sqrt(S))
    T,
    /// T-dagger gate (inverse of T)
    Tdg,
    /// Square root of X
    SX,
    /// Inverse square root of X
    SXdg,
    /// Identity gate (wait)
    ID,
    /// Rotation around X-axis, one angle parameter
    RX,
    /// Rotation around Y-axis, one angle parameter
    RY,
    /// Rotation around Z-axis, one angle parameter
    RZ,
    /// Phase gate diag(1, e^{i lambda}), one angle parameter
    U1,
    /// General unitary U(theta, phi, lambda)
    U,
    /// Controlled-NOT gate
    CX,
    /// Controlled-Z gate
    CZ,
    /// Swap gate
    SWAP,
    /// Toffoli gate (CCX)
    CCX,
}

impl GateKind {
    /// Every kind, in declaration order.
    pub const ALL: [GateKind; 20] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::S,
        GateKind::Sdg,
        GateKind::T,
        GateKind::Tdg,
        GateKind::SX,
        GateKind::SXdg,
        GateKind::ID,
        GateKind::RX,
        GateKind::RY,
        GateKind::RZ,
        GateKind::U1,
        GateKind::U,
        GateKind::CX,
        GateKind::CZ,
        GateKind::SWAP,
        GateKind::CCX,
    ];

    /// Number of qubit operands this gate takes.
    pub fn num_qubits(self) -> usize {
        match self {
            GateKind::CX | GateKind::CZ | GateKind::SWAP => 2,
            GateKind::CCX => 3,
            _ => 1,
        }
    }

    /// Number of angle parameters this gate takes.
    pub fn num_params(self) -> usize {
        match self {
            GateKind::RX | GateKind::RY | GateKind::RZ | GateKind::U1 => 1,
            GateKind::U => 3,
            _ => 0,
        }
    }

    /// True for single-qubit gates without parameters, the only kinds a
    /// rewrite rule may mention.
    pub fn is_fixed_single_qubit(self) -> bool {
        self.num_qubits() == 1 && self.num_params() == 0
    }

    /// Lowercase OpenQASM 2.0 name of the gate.
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::SX => "sx",
            GateKind::SXdg => "sxdg",
            GateKind::ID => "id",
            GateKind::RX => "rx",
            GateKind::RY => "ry",
            GateKind::RZ => "rz",
            GateKind::U1 => "u1",
            GateKind::U => "u3",
            GateKind::CX => "cx",
            GateKind::CZ => "cz",
            GateKind::SWAP => "swap",
            GateKind::CCX => "ccx",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateKind {
    type Err = ConfigError;

    /// Accepts the OpenQASM names plus the common aliases `p`, `u`, `cnot`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "h" => GateKind::H,
            "x" => GateKind::X,
            "y" => GateKind::Y,
            "z" => GateKind::Z,
            "s" => GateKind::S,
            "sdg" => GateKind::Sdg,
            "t" => GateKind::T,
            "tdg" => GateKind::Tdg,
            "sx" => GateKind::SX,
            "sxdg" => GateKind::SXdg,
            "id" => GateKind::ID,
            "rx" => GateKind::RX,
            "ry" => GateKind::RY,
            "rz" => GateKind::RZ,
            "u1" | "p" => GateKind::U1,
            "u3" | "u" => GateKind::U,
            "cx" | "cnot" => GateKind::CX,
            "cz" => GateKind::CZ,
            "swap" => GateKind::SWAP,
            "ccx" => GateKind::CCX,
            _ => return Err(ConfigError::UnsupportedKind(s.trim().to_string())),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for GateKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GateKind> for String {
    fn from(kind: GateKind) -> Self {
        kind.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in GateKind::ALL {
            assert_eq!(kind.name().parse::<GateKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("P".parse::<GateKind>().unwrap(), GateKind::U1);
        assert_eq!("cnot".parse::<GateKind>().unwrap(), GateKind::CX);
        assert_eq!(" Tdg ".parse::<GateKind>().unwrap(), GateKind::Tdg);
    }

    #[test]
    fn test_unknown_name() {
        let err = "toffoli".parse::<GateKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedKind(ref n) if n == "toffoli"));
    }

    #[test]
    fn test_fixed_single_qubit() {
        assert!(GateKind::T.is_fixed_single_qubit());
        assert!(!GateKind::RZ.is_fixed_single_qubit());
        assert!(!GateKind::CX.is_fixed_single_qubit());
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&GateKind::Sdg).unwrap();
        assert_eq!(json, "\"sdg\"");
        let kind: GateKind = serde_json::from_str("\"t\"").unwrap();
        assert_eq!(kind, GateKind::T);
        assert!(serde_json::from_str::<GateKind>("\"bogus\"").is_err());
    }
}
