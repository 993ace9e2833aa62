use std::fmt;
use std::str::FromStr;

use crate::chebfunerror::ChebfunError;

/// Algorithm used to evaluate a Chebyshev series at arbitrary points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvaluationMethod {
    /// Barycentric interpolation through the values on the second-kind grid.
    Barycentric,
    /// Clenshaw recurrence directly on the coefficients.
    #[default]
    Clenshaw,
}

impl FromStr for EvaluationMethod {
    type Err = ChebfunError;

    fn from_str(token: &str) -> Result<EvaluationMethod, ChebfunError> {
        match token {
            "bary" | "barycentric" => Ok(EvaluationMethod::Barycentric),
            "clenshaw" => Ok(EvaluationMethod::Clenshaw),
            _ => Err(ChebfunError::UnknownEvaluationMethod(token.to_owned())),
        }
    }
}

impl fmt::Display for EvaluationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMethod::Barycentric => write!(f, "bary"),
            EvaluationMethod::Clenshaw => write!(f, "clenshaw"),
        }
    }
}

/// Clenshaw recurrence for Σ a_k·T_k(x), two terms per step.
///
/// `coefficients` must not be empty.
pub fn clenshaw(x: f64, coefficients: &[f64]) -> f64 {
    let n = coefficients.len();
    let x2 = 2.0 * x;
    let mut bk1 = 0.0;
    let mut bk2 = 0.0;
    let mut k = n - 1;
    while k > 1 {
        bk2 = coefficients[k] + x2 * bk1 - bk2;
        bk1 = coefficients[k - 1] + x2 * bk2 - bk1;
        k -= 2;
    }
    if (n - 1) % 2 == 1 {
        let next = coefficients[1] + x2 * bk1 - bk2;
        bk2 = bk1;
        bk1 = next;
    }
    coefficients[0] + 0.5 * x2 * bk1 - bk2
}

/// Barycentric formula of the second kind:
///
///   p(x) = Σ w_k·f_k/(x-x_k) / Σ w_k/(x-x_k)
///
/// A point that coincides with a node returns the node value exactly.
pub fn barycentric(x: f64, values: &[f64], nodes: &[f64], weights: &[f64]) -> f64 {
    if values.len() == 1 {
        return values[0];
    }
    if let Some(k) = nodes.iter().position(|&node| node == x) {
        return values[k];
    }
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for ((&fk, &xk), &wk) in values.iter().zip(nodes).zip(weights) {
        let temp = wk / (x - xk);
        numerator += temp * fk;
        denominator += temp;
    }
    numerator / denominator
}
