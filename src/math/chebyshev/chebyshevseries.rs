use std::ops::{
    Add,
    Mul,
    Neg,
    Sub
};

use serde::{
    Deserialize,
    Serialize
};
use tracing::{
    debug,
    warn
};

use crate::chebfunerror::{
    ChebfunError,
    Result
};
use crate::configuration::Preferences;
use crate::math::chebyshev::evaluation::{
    barycentric,
    clenshaw,
    EvaluationMethod
};
use crate::math::chebyshev::rootfinding::roots_unit;
use crate::math::chebyshev::standardchop::standard_chop;
use crate::math::chebyshev::transform::{
    barycentric_weights,
    chebyshev_points,
    coefficients_to_values,
    values_to_coefficients
};

// ─────────────────────────────────────────────────────────────────────────────
// ChebyshevSeries
// ─────────────────────────────────────────────────────────────────────────────
//
//   f(x) = Σ_{k=0}^{n-1} c_k·T_k(x),  x in [-1, 1]
//
// n = 0 is the empty series. It absorbs every algebraic operation and, in
// calculus and pointwise evaluation, stands for the zero function. n = 1
// is a constant.

#[derive(Clone, Debug, PartialEq)]
enum Representation {
    Empty,
    /// Never holds an empty vector.
    Populated(Vec<f64>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct ChebyshevSeries {
    representation: Representation,
}

impl ChebyshevSeries {
    pub fn empty() -> ChebyshevSeries {
        ChebyshevSeries { representation: Representation::Empty }
    }

    pub fn constant(value: f64) -> ChebyshevSeries {
        ChebyshevSeries::from_coefficients(vec![value])
    }

    pub fn from_coefficients(coefficients: Vec<f64>) -> ChebyshevSeries {
        let representation = if coefficients.is_empty() {
            Representation::Empty
        } else {
            Representation::Populated(coefficients)
        };
        ChebyshevSeries { representation }
    }

    /// Interpolant of `f` on the `n`-point second-kind grid.
    pub fn fixed_length<F>(f: F, n: usize) -> ChebyshevSeries
    where
        F: Fn(f64) -> f64,
    {
        let values: Vec<f64> = chebyshev_points(n).into_iter().map(f).collect();
        ChebyshevSeries::from_coefficients(values_to_coefficients(&values))
    }

    pub fn adaptive<F>(f: F) -> Result<ChebyshevSeries>
    where
        F: Fn(f64) -> f64,
    {
        ChebyshevSeries::adaptive_with(f, &Preferences::DEFAULT)
    }

    /// Samples `f` on grids of 2^k + 1 points for k = min_pow2..=max_pow2
    /// and keeps the first expansion whose chop point falls strictly inside
    /// the grid.
    ///
    /// Reaching the largest grid without such a point is an error: no
    /// partially resolved expansion is ever returned.
    pub fn adaptive_with<F>(f: F, preferences: &Preferences) -> Result<ChebyshevSeries>
    where
        F: Fn(f64) -> f64,
    {
        for k in preferences.min_pow2..=preferences.max_pow2 {
            let n = (1usize << k) + 1;
            let values: Vec<f64> = chebyshev_points(n).into_iter().map(&f).collect();
            let mut coefficients = values_to_coefficients(&values);
            let cutoff = standard_chop(&coefficients, preferences.eps);
            debug!(points = n, cutoff, "adaptive construction step");
            if cutoff < n {
                coefficients.truncate(cutoff);
                return Ok(ChebyshevSeries::from_coefficients(coefficients));
            }
        }
        let length = preferences.max_length();
        warn!(points = length, "adaptive construction did not converge");
        Err(ChebfunError::NotConverged { length })
    }

    // ------------
    //  properties
    // ------------

    pub fn size(&self) -> usize {
        self.coefficients().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.representation, Representation::Empty)
    }

    pub fn is_const(&self) -> bool {
        self.size() == 1
    }

    pub fn coefficients(&self) -> &[f64] {
        match &self.representation {
            Representation::Empty => &[],
            Representation::Populated(coefficients) => coefficients,
        }
    }

    pub fn coefficients_mut(&mut self) -> &mut [f64] {
        match &mut self.representation {
            Representation::Empty => &mut [],
            Representation::Populated(coefficients) => coefficients,
        }
    }

    /// Values on the second-kind grid of the same length.
    pub fn values(&self) -> Vec<f64> {
        coefficients_to_values(self.coefficients())
    }

    /// Largest absolute value on the grid; 0 for the empty series.
    pub fn vscale(&self) -> f64 {
        self.values().iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    // ------------
    //  evaluation
    // ------------

    /// Evaluates at every point of `xs`. The empty series yields no values.
    pub fn eval(&self, xs: &[f64], method: EvaluationMethod) -> Vec<f64> {
        match (&self.representation, method) {
            (Representation::Empty, _) => Vec::new(),
            (Representation::Populated(coefficients), EvaluationMethod::Clenshaw) => {
                xs.iter().map(|&x| clenshaw(x, coefficients)).collect()
            }
            (Representation::Populated(coefficients), EvaluationMethod::Barycentric) => {
                let n = coefficients.len();
                let values = coefficients_to_values(coefficients);
                let nodes = chebyshev_points(n);
                let weights = barycentric_weights(n);
                xs.iter()
                    .map(|&x| barycentric(x, &values, &nodes, &weights))
                    .collect()
            }
        }
    }

    /// Clenshaw evaluation at a single point; the empty series is the zero
    /// function here.
    pub fn value(&self, x: f64) -> f64 {
        match &self.representation {
            Representation::Empty => 0.0,
            Representation::Populated(coefficients) => clenshaw(x, coefficients),
        }
    }

    // -----------
    //  utilities
    // -----------

    /// Copy truncated to the chop point of its own coefficients.
    pub fn simplify(&self) -> ChebyshevSeries {
        let old_len = self.size();
        let long = self.prolong(old_len.max(17));
        let cutoff = standard_chop(long.coefficients(), Preferences::DEFAULT.eps).min(old_len);
        ChebyshevSeries::from_coefficients(long.coefficients()[..cutoff].to_vec())
    }

    /// Series of exactly `n` coefficients for the same function: zero-padded
    /// when growing, reinterpolated on the `n`-point grid when shrinking.
    pub fn prolong(&self, n: usize) -> ChebyshevSeries {
        let m = self.size();
        if n > m {
            let mut coefficients = self.coefficients().to_vec();
            coefficients.resize(n, 0.0);
            ChebyshevSeries::from_coefficients(coefficients)
        } else if n < m {
            ChebyshevSeries::fixed_length(|x| self.value(x), n)
        } else {
            self.clone()
        }
    }

    // ----------
    //  calculus
    // ----------

    /// Definite integral over [-1, 1].
    pub fn sum(&self) -> f64 {
        self.coefficients()
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(k, &c)| {
                let weight = if k == 0 {
                    2.0
                } else {
                    2.0 / (1.0 - (k * k) as f64)
                };
                weight * c
            })
            .sum()
    }

    /// Indefinite integral, one coefficient longer, vanishing at x = -1.
    pub fn cumsum(&self) -> ChebyshevSeries {
        let Representation::Populated(coefficients) = &self.representation else {
            return ChebyshevSeries::empty();
        };
        let n = coefficients.len();
        let mut ak = coefficients.clone();
        ak.extend([0.0, 0.0]);

        let mut bk = vec![0.0; n + 1];
        for k in 2..=n {
            bk[k] = 0.5 * (ak[k - 1] - ak[k + 1]) / k as f64;
        }
        bk[1] = ak[0] - 0.5 * ak[2];
        // T_k(-1) = (-1)^k
        let mut anchor = 0.0;
        for (k, &b) in bk.iter().enumerate().skip(1) {
            if k % 2 == 1 {
                anchor += b;
            } else {
                anchor -= b;
            }
        }
        bk[0] = anchor;
        ChebyshevSeries::from_coefficients(bk)
    }

    /// Derivative, one coefficient shorter. Constants and the empty series
    /// differentiate to the empty series.
    pub fn diff(&self) -> ChebyshevSeries {
        let coefficients = self.coefficients();
        let n = coefficients.len();
        if n <= 1 {
            return ChebyshevSeries::empty();
        }
        let vk: Vec<f64> = (1..n)
            .map(|k| 2.0 * k as f64 * coefficients[k])
            .collect();
        let mut zk = vec![0.0; n - 1];
        for i in (0..n - 1).rev() {
            zk[i] = vk[i] + if i + 2 < n - 1 { zk[i + 2] } else { 0.0 };
        }
        zk[0] *= 0.5;
        ChebyshevSeries::from_coefficients(zk)
    }

    // -------------
    //  rootfinding
    // -------------

    pub fn roots(&self) -> Vec<f64> {
        self.roots_with(&Preferences::DEFAULT)
    }

    /// Real roots in [-1, 1], sorted ascending, polished by Newton steps.
    pub fn roots_with(&self, preferences: &Preferences) -> Vec<f64> {
        if self.size() <= 1 {
            return Vec::new();
        }
        let htol = 1e2 * preferences.eps;
        let mut roots = roots_unit(self.coefficients(), htol, preferences);
        if roots.is_empty() {
            return roots;
        }

        let derivative = self.diff();
        let tol = 2.0 * preferences.eps;
        for root in roots.iter_mut() {
            for _ in 0..preferences.newton_max_iterations {
                let slope = derivative.value(*root);
                if slope == 0.0 {
                    break;
                }
                let step = self.value(*root) / slope;
                if !step.is_finite() {
                    break;
                }
                *root -= step;
                if step.abs() <= tol {
                    break;
                }
            }
            *root = root.clamp(-1.0, 1.0);
        }
        roots.sort_by(f64::total_cmp);
        roots
    }
}

impl Default for ChebyshevSeries {
    fn default() -> ChebyshevSeries {
        ChebyshevSeries::empty()
    }
}

impl From<Vec<f64>> for ChebyshevSeries {
    fn from(coefficients: Vec<f64>) -> ChebyshevSeries {
        ChebyshevSeries::from_coefficients(coefficients)
    }
}

impl From<ChebyshevSeries> for Vec<f64> {
    fn from(series: ChebyshevSeries) -> Vec<f64> {
        match series.representation {
            Representation::Empty => Vec::new(),
            Representation::Populated(coefficients) => coefficients,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Algebra
// ─────────────────────────────────────────────────────────────────────────────

fn add_series(f: &ChebyshevSeries, g: &ChebyshevSeries) -> ChebyshevSeries {
    match (&f.representation, &g.representation) {
        (Representation::Empty, _) | (_, Representation::Empty) => ChebyshevSeries::empty(),
        (Representation::Populated(fc), Representation::Populated(gc)) => {
            let n = fc.len().max(gc.len());
            let coefficients: Vec<f64> = (0..n)
                .map(|k| fc.get(k).unwrap_or(&0.0) + gc.get(k).unwrap_or(&0.0))
                .collect();
            let tol = 0.5 * Preferences::DEFAULT.eps * f.vscale().max(g.vscale());
            if coefficients.iter().all(|c| c.abs() < tol) {
                ChebyshevSeries::constant(0.0)
            } else {
                ChebyshevSeries::from_coefficients(coefficients)
            }
        }
    }
}

fn sub_series(f: &ChebyshevSeries, g: &ChebyshevSeries) -> ChebyshevSeries {
    add_series(f, &negate(g))
}

/// Product via T_j·T_k = (T_{j+k} + T_{|j-k|}) / 2.
fn mul_series(f: &ChebyshevSeries, g: &ChebyshevSeries) -> ChebyshevSeries {
    match (&f.representation, &g.representation) {
        (Representation::Empty, _) | (_, Representation::Empty) => ChebyshevSeries::empty(),
        (Representation::Populated(fc), Representation::Populated(gc)) => {
            let mut product = vec![0.0; fc.len() + gc.len() - 1];
            for (j, &a) in fc.iter().enumerate() {
                for (k, &b) in gc.iter().enumerate() {
                    let half = 0.5 * a * b;
                    product[j + k] += half;
                    product[j.abs_diff(k)] += half;
                }
            }
            ChebyshevSeries::from_coefficients(product)
        }
    }
}

fn add_scalar(f: &ChebyshevSeries, value: f64) -> ChebyshevSeries {
    let mut out = f.clone();
    if let Representation::Populated(coefficients) = &mut out.representation {
        coefficients[0] += value;
    }
    out
}

fn mul_scalar(f: &ChebyshevSeries, value: f64) -> ChebyshevSeries {
    let mut out = f.clone();
    for c in out.coefficients_mut() {
        *c *= value;
    }
    out
}

fn negate(f: &ChebyshevSeries) -> ChebyshevSeries {
    let mut out = f.clone();
    for c in out.coefficients_mut() {
        *c = -*c;
    }
    out
}

macro_rules! series_binary_op {
    ($op:ident, $method:ident, $series_fn:ident) => {
        impl $op<&ChebyshevSeries> for &ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: &ChebyshevSeries) -> ChebyshevSeries {
                $series_fn(self, rhs)
            }
        }

        impl $op<ChebyshevSeries> for ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: ChebyshevSeries) -> ChebyshevSeries {
                $series_fn(&self, &rhs)
            }
        }

        impl $op<&ChebyshevSeries> for ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: &ChebyshevSeries) -> ChebyshevSeries {
                $series_fn(&self, rhs)
            }
        }

        impl $op<ChebyshevSeries> for &ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: ChebyshevSeries) -> ChebyshevSeries {
                $series_fn(self, &rhs)
            }
        }
    };
}

series_binary_op!(Add, add, add_series);
series_binary_op!(Sub, sub, sub_series);
series_binary_op!(Mul, mul, mul_series);

macro_rules! series_scalar_op {
    ($op:ident, $method:ident, |$s:ident, $v:ident| $series_scalar:expr, $scalar_series:expr) => {
        impl $op<f64> for &ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, $v: f64) -> ChebyshevSeries {
                let $s = self;
                $series_scalar
            }
        }

        impl $op<f64> for ChebyshevSeries {
            type Output = ChebyshevSeries;
            fn $method(self, $v: f64) -> ChebyshevSeries {
                let $s = &self;
                $series_scalar
            }
        }

        impl $op<&ChebyshevSeries> for f64 {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: &ChebyshevSeries) -> ChebyshevSeries {
                let ($s, $v) = (rhs, self);
                $scalar_series
            }
        }

        impl $op<ChebyshevSeries> for f64 {
            type Output = ChebyshevSeries;
            fn $method(self, rhs: ChebyshevSeries) -> ChebyshevSeries {
                let ($s, $v) = (&rhs, self);
                $scalar_series
            }
        }
    };
}

series_scalar_op!(Add, add, |s, v| add_scalar(s, v), add_scalar(s, v));
series_scalar_op!(Sub, sub, |s, v| add_scalar(s, -v), add_scalar(&negate(s), v));
series_scalar_op!(Mul, mul, |s, v| mul_scalar(s, v), mul_scalar(s, v));

impl Neg for &ChebyshevSeries {
    type Output = ChebyshevSeries;
    fn neg(self) -> ChebyshevSeries {
        negate(self)
    }
}

impl Neg for ChebyshevSeries {
    type Output = ChebyshevSeries;
    fn neg(self) -> ChebyshevSeries {
        negate(&self)
    }
}
