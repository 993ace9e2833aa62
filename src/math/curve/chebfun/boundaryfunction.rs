use std::sync::OnceLock;

use serde::{
    Deserialize,
    Serialize
};

use crate::chebfunerror::{
    ChebfunError,
    Result
};
use crate::configuration::Preferences;
use crate::math::chebyshev::chebyshevseries::ChebyshevSeries;
use crate::math::chebyshev::evaluation::EvaluationMethod;
use crate::math::curve::curve::Curve;
use crate::math::domain::interval::Interval;

// ─────────────────────────────────────────────────────────────────────────────
// BoundaryFunction
// ─────────────────────────────────────────────────────────────────────────────
//
// A ChebyshevSeries living on [-1, 1] composed with the affine map of an
// Interval:
//
//   g(x) = f(invmap(x)),  x in [a, b]
//
// Derivatives pick up 1/drvmap, integrals pick up drvmap. The derivative
// series is built on first use and kept for later point evaluations.

// Upper bound on constant-term corrections in shifted_to_left_value.
const MAX_SHIFT_CORRECTIONS: usize = 4;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoundaryFunction {
    series: ChebyshevSeries,
    interval: Interval,
    #[serde(skip)]
    derivative: OnceLock<ChebyshevSeries>,
}

impl PartialEq for BoundaryFunction {
    fn eq(&self, other: &BoundaryFunction) -> bool {
        self.series == other.series && self.interval == other.interval
    }
}

impl BoundaryFunction {
    pub fn new(series: ChebyshevSeries, interval: Interval) -> BoundaryFunction {
        BoundaryFunction {
            series,
            interval,
            derivative: OnceLock::new(),
        }
    }

    pub fn empty(interval: Interval) -> BoundaryFunction {
        BoundaryFunction::new(ChebyshevSeries::empty(), interval)
    }

    pub fn constant(value: f64, interval: Interval) -> BoundaryFunction {
        BoundaryFunction::new(ChebyshevSeries::constant(value), interval)
    }

    pub fn adaptive<F>(f: F, interval: Interval) -> Result<BoundaryFunction>
    where
        F: Fn(f64) -> f64,
    {
        BoundaryFunction::adaptive_with(f, interval, &Preferences::DEFAULT)
    }

    pub fn adaptive_with<F>(
        f: F,
        interval: Interval,
        preferences: &Preferences,
    ) -> Result<BoundaryFunction>
    where
        F: Fn(f64) -> f64,
    {
        let series = ChebyshevSeries::adaptive_with(|y| f(interval.formap(y)), preferences)?;
        Ok(BoundaryFunction::new(series, interval))
    }

    pub fn fixed_length<F>(f: F, n: usize, interval: Interval) -> BoundaryFunction
    where
        F: Fn(f64) -> f64,
    {
        let series = ChebyshevSeries::fixed_length(|y| f(interval.formap(y)), n);
        BoundaryFunction::new(series, interval)
    }

    // ------------
    //  properties
    // ------------

    pub fn series(&self) -> &ChebyshevSeries {
        &self.series
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Raw coefficients of the underlying series.
    pub fn coefficients(&self) -> &[f64] {
        self.series.coefficients()
    }

    pub fn size(&self) -> usize {
        self.series.size()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn is_const(&self) -> bool {
        self.series.is_const()
    }

    pub fn vscale(&self) -> f64 {
        self.series.vscale()
    }

    /// Values at the left and right endpoints; zero for an empty piece.
    pub fn endvalues(&self) -> (f64, f64) {
        (self.series.value(-1.0), self.series.value(1.0))
    }

    // ------------
    //  evaluation
    // ------------

    pub fn eval(&self, xs: &[f64], method: EvaluationMethod) -> Vec<f64> {
        let ys: Vec<f64> = xs.iter().map(|&x| self.interval.invmap(x)).collect();
        self.series.eval(&ys, method)
    }

    // -----------
    //  utilities
    // -----------

    /// The same function resampled onto `subinterval` at the current length.
    pub fn restrict(&self, subinterval: Interval) -> Result<BoundaryFunction> {
        if !self.interval.contains(&subinterval) {
            return Err(ChebfunError::NotSubinterval {
                sub: subinterval.to_string(),
                interval: self.interval.to_string(),
            });
        }
        if subinterval == self.interval {
            return Ok(self.clone());
        }
        Ok(BoundaryFunction::fixed_length(
            |x| self.value(x),
            self.size(),
            subinterval,
        ))
    }

    pub fn simplify(&self) -> BoundaryFunction {
        BoundaryFunction::new(self.series.simplify(), self.interval)
    }

    // ----------
    //  calculus
    // ----------

    pub fn sum(&self) -> f64 {
        self.interval.drvmap() * self.series.sum()
    }

    /// Antiderivative vanishing at the left endpoint.
    pub fn cumsum(&self) -> BoundaryFunction {
        BoundaryFunction::new(self.series.cumsum() * self.interval.drvmap(), self.interval)
    }

    pub fn diff(&self) -> BoundaryFunction {
        BoundaryFunction::new(self.derivative_series().clone(), self.interval)
    }

    fn derivative_series(&self) -> &ChebyshevSeries {
        self.derivative
            .get_or_init(|| self.series.diff() * (1.0 / self.interval.drvmap()))
    }

    // -------------
    //  rootfinding
    // -------------

    pub fn roots(&self) -> Vec<f64> {
        self.roots_with(&Preferences::DEFAULT)
    }

    pub fn roots_with(&self, preferences: &Preferences) -> Vec<f64> {
        self.series
            .roots_with(preferences)
            .into_iter()
            .map(|y| self.interval.formap(y))
            .collect()
    }

    // ---------
    //  algebra
    // ---------

    fn combine(
        &self,
        other: &BoundaryFunction,
        op: impl Fn(&ChebyshevSeries, &ChebyshevSeries) -> ChebyshevSeries,
    ) -> Result<BoundaryFunction> {
        if self.interval != other.interval {
            return Err(ChebfunError::IntervalMismatch);
        }
        Ok(BoundaryFunction::new(op(&self.series, &other.series), self.interval))
    }

    pub fn try_add(&self, other: &BoundaryFunction) -> Result<BoundaryFunction> {
        self.combine(other, |f, g| f + g)
    }

    pub fn try_sub(&self, other: &BoundaryFunction) -> Result<BoundaryFunction> {
        self.combine(other, |f, g| f - g)
    }

    pub fn try_mul(&self, other: &BoundaryFunction) -> Result<BoundaryFunction> {
        self.combine(other, |f, g| f * g)
    }

    pub fn add_scalar(&self, value: f64) -> BoundaryFunction {
        BoundaryFunction::new(&self.series + value, self.interval)
    }

    pub fn sub_scalar(&self, value: f64) -> BoundaryFunction {
        BoundaryFunction::new(&self.series - value, self.interval)
    }

    pub fn mul_scalar(&self, value: f64) -> BoundaryFunction {
        BoundaryFunction::new(&self.series * value, self.interval)
    }

    pub fn neg(&self) -> BoundaryFunction {
        BoundaryFunction::new(-&self.series, self.interval)
    }

    /// Copy shifted by a constant so that its left end value is `target`.
    ///
    /// The constant term is corrected by the remaining miss a few times.
    /// When the last Clenshaw step cancels, the attainable end values are
    /// spaced more coarsely than `target`, and the closest one is kept.
    pub fn shifted_to_left_value(&self, target: f64) -> BoundaryFunction {
        let mut series = &self.series + target;
        let mut best = series.clone();
        for _ in 0..MAX_SHIFT_CORRECTIONS {
            let miss = target - series.value(-1.0);
            if miss == 0.0 {
                break;
            }
            let Some(c0) = series.coefficients_mut().first_mut() else {
                break;
            };
            *c0 += miss;
            if (target - series.value(-1.0)).abs() < (target - best.value(-1.0)).abs() {
                best = series.clone();
            }
        }
        BoundaryFunction::new(best, self.interval)
    }
}

impl Curve for BoundaryFunction {
    fn value(&self, x: f64) -> f64 {
        self.series.value(self.interval.invmap(x))
    }

    fn derivative(&self, x: f64) -> f64 {
        self.derivative_series().value(self.interval.invmap(x))
    }

    fn endpoints(&self) -> (f64, f64) {
        self.interval.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    const EPS: f64 = f64::EPSILON;

    fn interval(a: f64, b: f64) -> Interval {
        Interval::new(a, b).unwrap()
    }

    fn sample_points(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|k| a + (b - a) * ((k as f64 + 0.5) * 0.618033988749895).fract())
            .collect()
    }

    #[test]
    fn test_construction_on_interval() {
        let i = interval(-2.0, 3.0);
        let f = BoundaryFunction::adaptive(|x| x.exp(), i).unwrap();
        assert_eq!(f.interval(), i);
        assert_eq!(f.endpoints(), (-2.0, 3.0));
        let (left, right) = f.endvalues();
        assert_abs_diff_eq!(left, (-2.0f64).exp(), epsilon = 1e2 * EPS);
        assert_abs_diff_eq!(right, 3.0f64.exp(), epsilon = 1e2 * EPS * 3.0f64.exp());

        let xx = sample_points(-2.0, 3.0, 50);
        for (x, v) in xx.iter().zip(f.eval(&xx, EvaluationMethod::Clenshaw)) {
            assert_abs_diff_eq!(v, x.exp(), epsilon = 1e2 * EPS * 3.0f64.exp());
        }
        assert_eq!(BoundaryFunction::fixed_length(|x| x, 7, i).size(), 7);
    }

    #[test]
    fn test_empty_and_constant() {
        let i = interval(0.0, 1.0);
        let e = BoundaryFunction::empty(i);
        assert!(e.is_empty());
        assert_eq!(e.size(), 0);
        assert!(e.eval(&[0.5], EvaluationMethod::Clenshaw).is_empty());
        assert_eq!(e.endvalues(), (0.0, 0.0));

        let c = BoundaryFunction::constant(2.5, i);
        assert!(c.is_const());
        assert_eq!(c.value(0.3), 2.5);
        assert_eq!(c.endvalues(), (2.5, 2.5));
    }

    #[test]
    fn test_restrict() {
        let f = BoundaryFunction::adaptive(|x| x.sin(), interval(-2.0, 3.0)).unwrap();
        let sub = interval(-1.0, 0.5);
        let g = f.restrict(sub).unwrap();
        assert_eq!(g.interval(), sub);
        assert_eq!(g.size(), f.size());
        for x in sample_points(-1.0, 0.5, 30) {
            assert_abs_diff_eq!(g.value(x), x.sin(), epsilon = 1e2 * EPS);
        }

        assert_eq!(f.restrict(f.interval()).unwrap(), f);
        assert!(matches!(
            f.restrict(interval(-3.0, 0.0)),
            Err(ChebfunError::NotSubinterval { .. })
        ));
    }

    #[test]
    fn test_calculus_scales_with_interval() {
        let f = BoundaryFunction::adaptive(|x| x.cos(), interval(0.0, 2.0)).unwrap();
        assert_abs_diff_eq!(f.sum(), 2.0f64.sin(), epsilon = 1e1 * EPS);

        let antiderivative = f.cumsum();
        assert_abs_diff_eq!(antiderivative.value(0.0), 0.0, epsilon = 1e1 * EPS);
        for x in sample_points(0.0, 2.0, 30) {
            assert_abs_diff_eq!(antiderivative.value(x), x.sin(), epsilon = 1e2 * EPS);
        }

        let derivative = f.diff();
        for x in sample_points(0.0, 2.0, 30) {
            assert_abs_diff_eq!(derivative.value(x), -x.sin(), epsilon = 1e-12);
            assert_abs_diff_eq!(f.derivative(x), -x.sin(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_derivative_is_kept_between_calls() {
        let f = BoundaryFunction::adaptive(|x| (3.0 * x).sin(), interval(-1.0, 2.0)).unwrap();
        let g = f.clone();
        let d = f.diff();
        for x in sample_points(-1.0, 2.0, 40) {
            let first = f.derivative(x);
            assert_eq!(f.derivative(x), first);
            assert_eq!(d.value(x), first);
            assert_abs_diff_eq!(first, 3.0 * (3.0 * x).cos(), epsilon = 1e-12);
        }
        // the stored derivative plays no part in equality or serialization
        assert_eq!(f, g);
        let json = serde_json::to_string(&f).unwrap();
        let restored: BoundaryFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, g);
        assert_eq!(restored.derivative(0.25), f.derivative(0.25));

        let c = BoundaryFunction::constant(4.0, interval(0.0, 1.0));
        assert_eq!(c.derivative(0.5), 0.0);
        assert!(c.diff().is_empty());
    }

    #[test]
    fn test_shifted_to_left_value() {
        let i = interval(0.3, 2.0);
        for k in 1..30 {
            let omega = 0.41 * k as f64;
            let f = BoundaryFunction::adaptive(|x| (omega * x).cos() + x, i).unwrap().cumsum();
            let target = 0.1 * k as f64 - 1.3;
            let g = f.shifted_to_left_value(target);
            assert_eq!(g.size(), f.size());
            assert!((g.endvalues().0 - target).abs() <= EPS * target.abs().max(1.0));
            assert_eq!(&g.coefficients()[1..], &f.coefficients()[1..]);
        }
        let e = BoundaryFunction::empty(i).shifted_to_left_value(2.0);
        assert!(e.is_empty());
    }

    #[test]
    fn test_roots_are_mapped() {
        let f = BoundaryFunction::adaptive(|x| (PI * x).sin(), interval(-0.5, 3.5)).unwrap();
        let roots = f.roots();
        assert_eq!(roots.len(), 4);
        for (r, e) in roots.iter().zip([0.0, 1.0, 2.0, 3.0]) {
            assert_abs_diff_eq!(*r, e, epsilon = 1e2 * EPS);
        }
    }

    #[test]
    fn test_algebra() {
        let i = interval(1.0, 2.0);
        let f = BoundaryFunction::adaptive(|x| x.ln(), i).unwrap();
        let g = BoundaryFunction::adaptive(|x| x * x, i).unwrap();
        let sum = f.try_add(&g).unwrap();
        let difference = f.try_sub(&g).unwrap();
        let product = f.try_mul(&g).unwrap();
        for x in sample_points(1.0, 2.0, 20) {
            assert_abs_diff_eq!(sum.value(x), x.ln() + x * x, epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(difference.value(x), x.ln() - x * x, epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(product.value(x), x.ln() * x * x, epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(f.add_scalar(2.0).value(x), x.ln() + 2.0, epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(f.sub_scalar(2.0).value(x), x.ln() - 2.0, epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(f.mul_scalar(-3.0).value(x), -3.0 * x.ln(), epsilon = 1e2 * EPS);
            assert_abs_diff_eq!(f.neg().value(x), -x.ln(), epsilon = 1e2 * EPS);
        }

        let h = BoundaryFunction::adaptive(|x| x, interval(1.0, 3.0)).unwrap();
        assert!(matches!(f.try_add(&h), Err(ChebfunError::IntervalMismatch)));
    }

    #[test]
    fn test_simplify_keeps_interval() {
        let i = interval(-1.0, 4.0);
        let f = BoundaryFunction::fixed_length(|x| x.cos(), 100, i);
        let g = f.simplify();
        assert_eq!(g.interval(), i);
        assert!(g.size() < f.size());
    }
}
