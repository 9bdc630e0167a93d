//! Numeric sampling for plots
//!
//! A range is sampled at evenly spaced points. If any point fails to
//! evaluate, the whole range is retried exactly once on a fallback range:
//! `[0.1, 2*x_opt]` when an optimum is known, otherwise `[-10, 10]`. A
//! fallback equal to the failed range is not sampled again.

use crate::error::{SampleFailure, SamplingError};
use crate::expr::Expr;
use crate::optimize::OptimizationResult;

/// Samples per function or derivative curve
pub const DEFAULT_SAMPLE_COUNT: usize = 400;
/// Samples for the curve around an optimum
pub const OPTIMIZATION_SAMPLE_COUNT: usize = 500;
/// Samples across the shaded region of a definite integral
pub const INTEGRAL_SAMPLE_COUNT: usize = 100;
/// Range used when nothing better is known
pub const DEFAULT_RANGE: (f64, f64) = (-10.0, 10.0);

/// `count` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Evaluate `expr` at `count` evenly spaced points
///
/// Poles come back as `±inf`; only real evaluation errors fail.
pub fn sample(
    expr: &Expr,
    var: &str,
    start: f64,
    end: f64,
    count: usize,
) -> Result<Vec<(f64, f64)>, SampleFailure> {
    linspace(start, end, count)
        .into_iter()
        .map(|x| {
            expr.eval_at(var, x)
                .map(|y| (x, y))
                .map_err(|cause| SampleFailure { x, cause })
        })
        .collect()
}

// =============================================================================
// FALLBACK
// =============================================================================

/// Where to look when the requested range cannot be sampled
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackPolicy {
    /// Lower end used when an optimum is known
    pub start_near_optimum: f64,
    /// Upper end is `optimum_scale * x_opt`
    pub optimum_scale: f64,
    /// Used when no optimum is known
    pub default_range: (f64, f64),
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy {
            start_near_optimum: 0.1,
            optimum_scale: 2.0,
            default_range: DEFAULT_RANGE,
        }
    }
}

impl FallbackPolicy {
    pub fn range(&self, optimum: Option<f64>) -> (f64, f64) {
        match optimum {
            Some(x) if x.is_finite() => (self.start_near_optimum, self.optimum_scale * x),
            _ => self.default_range,
        }
    }
}

/// Sampled curve and the range it was actually taken over
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlotSeries {
    pub points: Vec<(f64, f64)>,
    pub range: (f64, f64),
    pub used_fallback: bool,
}

impl PlotSeries {
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.0)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sample `[start, end]`, retrying once on the policy's fallback range
pub fn sample_with_fallback(
    expr: &Expr,
    var: &str,
    (start, end): (f64, f64),
    count: usize,
    optimum: Option<f64>,
    policy: &FallbackPolicy,
) -> Result<PlotSeries, SamplingError> {
    sample_or_retry(expr, var, (start, end), count, policy.range(optimum))
}

/// Sample `[start, end]`, else `fallback_range` once
fn sample_or_retry(
    expr: &Expr,
    var: &str,
    (start, end): (f64, f64),
    count: usize,
    fallback_range: (f64, f64),
) -> Result<PlotSeries, SamplingError> {
    let primary = match sample(expr, var, start, end, count) {
        Ok(points) => {
            return Ok(PlotSeries {
                points,
                range: (start, end),
                used_fallback: false,
            });
        }
        Err(failure) => failure,
    };

    if fallback_range == (start, end) {
        log::warn!("sampling {expr} on [{start}, {end}] failed ({primary}); no distinct fallback range");
        return Err(SamplingError {
            primary_range: (start, end),
            primary: primary.clone(),
            fallback_range,
            fallback: primary,
        });
    }

    log::warn!(
        "sampling {expr} on [{start}, {end}] failed ({primary}); retrying on [{}, {}]",
        fallback_range.0,
        fallback_range.1
    );
    match sample(expr, var, fallback_range.0, fallback_range.1, count) {
        Ok(points) => Ok(PlotSeries {
            points,
            range: fallback_range,
            used_fallback: true,
        }),
        Err(fallback) => Err(SamplingError {
            primary_range: (start, end),
            primary,
            fallback_range,
            fallback,
        }),
    }
}

// =============================================================================
// PLOT SERIES
// =============================================================================

/// A function and its derivative over the same requested range
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionPlot {
    pub function: PlotSeries,
    pub derivative: PlotSeries,
}

/// Objective curve around the optimum, plus the optimum marker
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationPlot {
    pub curve: PlotSeries,
    pub marker: Option<(f64, f64)>,
}

/// Integrand curve plus the shaded region between the bounds
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegralPlot {
    /// `None` when neither the padded range nor the bounds could be sampled
    pub curve: Option<PlotSeries>,
    pub region: PlotSeries,
}

pub fn plot_function(
    function: &Expr,
    derivative: &Expr,
    var: &str,
    range: (f64, f64),
    count: usize,
    policy: &FallbackPolicy,
) -> Result<FunctionPlot, SamplingError> {
    Ok(FunctionPlot {
        function: sample_with_fallback(function, var, range, count, None, policy)?,
        derivative: sample_with_fallback(derivative, var, range, count, None, policy)?,
    })
}

/// `[max(0.1, x - 5x/4), x + 5x/4]` around a known optimum, else `[0.1, 10]`
pub fn optimization_range(optimum: Option<f64>) -> (f64, f64) {
    match optimum {
        Some(x) if x.is_finite() => {
            let spread = 1.25 * x;
            ((x - spread).max(0.1), x + spread)
        }
        _ => (0.1, 10.0),
    }
}

pub fn plot_optimization(
    result: &OptimizationResult,
    policy: &FallbackPolicy,
) -> Result<OptimizationPlot, SamplingError> {
    let optimum = result.approx_point();
    let curve = sample_with_fallback(
        result.objective(),
        result.variable(),
        optimization_range(optimum),
        OPTIMIZATION_SAMPLE_COUNT,
        optimum,
        policy,
    )?;
    let marker = optimum.zip(result.approx_value());
    Ok(OptimizationPlot { curve, marker })
}

/// The bounds widened by a quarter of their width on each side, or by 1 when they coincide
pub fn integral_range(lower: f64, upper: f64) -> (f64, f64) {
    let (lo, hi) = (lower.min(upper), lower.max(upper));
    let pad = if hi > lo { 0.25 * (hi - lo) } else { 1.0 };
    (lo - pad, hi + pad)
}

/// The region is sampled on the bounds alone; the curve on the padded range,
/// falling back to the bounds.
pub fn plot_integral(
    integrand: &Expr,
    var: &str,
    (lower, upper): (f64, f64),
    count: usize,
) -> Result<IntegralPlot, SamplingError> {
    let bounds = (lower, upper);
    let region = sample_or_retry(integrand, var, bounds, INTEGRAL_SAMPLE_COUNT, bounds)?;
    let curve = sample_or_retry(integrand, var, integral_range(lower, upper), count, bounds)
        .inspect_err(|e| log::warn!("integral curve dropped: {e}"))
        .ok();
    Ok(IntegralPlot { curve, region })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::parse;
    use approx::assert_relative_eq;

    fn f(input: &str) -> Expr {
        parse(input, "x").unwrap()
    }

    #[test]
    fn test_linspace_edges() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert_eq!(linspace(-1.0, 1.0, 3), vec![-1.0, 0.0, 1.0]);
        let xs = linspace(0.0, 1.0, 11);
        assert_eq!(xs.len(), 11);
        assert_eq!(xs[10], 1.0);
        assert_relative_eq!(xs[3], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_polynomial() {
        let pts = sample(&f("x^2"), "x", 0.0, 2.0, 3).unwrap();
        assert_eq!(pts, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
    }

    #[test]
    fn test_poles_pass_through() {
        let pts = sample(&f("1/x"), "x", -1.0, 1.0, 3).unwrap();
        assert!(pts[1].1.is_infinite());
    }

    #[test]
    fn test_domain_violation_is_an_error() {
        let err = sample(&f("ln(x)"), "x", -1.0, 1.0, 3).unwrap_err();
        assert_eq!(err.x, -1.0);
        assert!(matches!(err.cause, EvalError::Domain { .. }));
    }

    #[test]
    fn test_removable_singularity_fails_twice() {
        let err = sample_with_fallback(&f("sin(x)/x"), "x", (-1.0, 1.0), 3, None, &FallbackPolicy::default())
            .unwrap_err();
        assert_eq!(err.primary.cause, EvalError::Indeterminate);
        assert_eq!(err.fallback_range, (-10.0, 10.0));
        assert_eq!(err.fallback.x, 0.0);
    }

    #[test]
    fn test_fallback_near_optimum() {
        let series =
            sample_with_fallback(&f("ln(x)"), "x", (-1.0, 1.0), 5, Some(2.0), &FallbackPolicy::default()).unwrap();
        assert!(series.used_fallback);
        assert_eq!(series.range, (0.1, 4.0));
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_no_fallback_when_primary_succeeds() {
        let series =
            sample_with_fallback(&f("sin(x)/x"), "x", (-1.0, 1.0), 4, None, &FallbackPolicy::default()).unwrap();
        assert!(!series.used_fallback);
        assert_eq!(series.range, (-1.0, 1.0));
    }

    #[test]
    fn test_identical_fallback_is_not_retried() {
        let err = sample_with_fallback(&f("ln(x)"), "x", DEFAULT_RANGE, 5, None, &FallbackPolicy::default())
            .unwrap_err();
        assert_eq!(err.primary_range, err.fallback_range);
        assert_eq!(err.primary, err.fallback);
        assert_eq!(err.primary.x, -10.0);
    }

    #[test]
    fn test_integral_range() {
        assert_eq!(integral_range(0.0, 2.0), (-0.5, 2.5));
        assert_eq!(integral_range(2.0, 0.0), (-0.5, 2.5));
        assert_eq!(integral_range(3.0, 3.0), (2.0, 4.0));
    }

    #[test]
    fn test_integral_plot_around_the_bounds() {
        let plot = plot_integral(&f("x^2"), "x", (0.0, 2.0), 50).unwrap();
        let curve = plot.curve.unwrap();
        assert!(!curve.used_fallback);
        assert_eq!(curve.range, (-0.5, 2.5));
        assert_eq!(curve.len(), 50);
        assert_eq!(plot.region.range, (0.0, 2.0));
        assert_eq!(plot.region.len(), INTEGRAL_SAMPLE_COUNT);
    }

    #[test]
    fn test_integral_plot_of_root_stays_in_domain() {
        // sqrt is undefined left of 0, so the padded curve falls back to the bounds
        let plot = plot_integral(&f("sqrt(x)"), "x", (0.0, 4.0), DEFAULT_SAMPLE_COUNT).unwrap();
        let curve = plot.curve.unwrap();
        assert!(curve.used_fallback);
        assert_eq!(curve.range, (0.0, 4.0));
        assert_eq!(plot.region.points.last(), Some(&(4.0, 2.0)));
    }

    #[test]
    fn test_integral_region_survives_a_failed_curve() {
        // Undefined left of 0, and 0/0 at x = 1, which only the 400-point grid hits
        let integrand = f("sqrt(x)*sin(x - 1)/(x - 1)");
        let plot = plot_integral(&integrand, "x", (0.0, 399.0), 400).unwrap();
        assert!(plot.curve.is_none());
        assert_eq!(plot.region.len(), INTEGRAL_SAMPLE_COUNT);
    }

    #[test]
    fn test_optimization_range() {
        assert_eq!(optimization_range(Some(15.0)), (0.1, 33.75));
        assert_eq!(optimization_range(None), (0.1, 10.0));
    }
}
