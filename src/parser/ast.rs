use crate::error::QasmError;

/// Parameter expression of a gate call.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Float(f64),
    Pi,
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Evaluates the expression; NaN and infinite results are errors.
    pub fn evaluate(&self) -> Result<f64, QasmError> {
        let value = self.eval()?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(QasmError::Expression(format!("non-finite value {}", value)))
        }
    }

    fn eval(&self) -> Result<f64, QasmError> {
        match self {
            Expr::Float(val) => Ok(*val),
            Expr::Pi => Ok(std::f64::consts::PI),
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Add(lhs, rhs) => Ok(lhs.eval()? + rhs.eval()?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval()? - rhs.eval()?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval()? * rhs.eval()?),
            Expr::Div(lhs, rhs) => {
                let denom = rhs.eval()?;
                if denom == 0.0 {
                    Err(QasmError::Expression("Division by zero".to_string()))
                } else {
                    Ok(lhs.eval()? / denom)
                }
            }
        }
    }
}

/// Register reference: `q[0]` is `("q", Some(0))`, a bare `q` is `("q", None)`.
pub type Arg = (String, Option<usize>);

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStatement {
    QReg(String, usize),
    CReg(String, usize),
    Include(String),
    Gate(String, Vec<Arg>, Vec<Expr>), // Name, Qubits, Params
    Measure(Arg, Arg),                 // Qubit -> Cbit
    Reset(Arg),
    Barrier(Vec<Arg>),
}
