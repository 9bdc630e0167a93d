//! Builder pattern API for the full worked-solution pipeline
//!
//! Configuration travels explicitly with the [`Solver`]; nothing is global.
//!
//! # Example
//! ```
//! use storymath::Solver;
//!
//! let result = Solver::new()
//!     .variable("t")
//!     .solve_optimization("60t - 2t^2")
//!     .unwrap();
//! assert_eq!(result.summary(), "The maximum value is 450 at t = 15");
//! ```

use crate::error::{IntegrationFailure, ParseError, SamplingError};
use crate::integrate::{DefiniteIntegral, integrate_definite};
use crate::optimize::{ObjectiveKind, OptimizationResult, profit_objective, select_optimum};
use crate::parser::{ParseLimits, parse_with_limits};
use crate::problems::{RawInput, WordProblemCategory, WordProblemSolution};
use crate::sampling::{
    DEFAULT_SAMPLE_COUNT, FallbackPolicy, FunctionPlot, IntegralPlot, OptimizationPlot, PlotSeries, plot_function,
    plot_integral, plot_optimization, sample_with_fallback,
};
use crate::solve::{CriticalPointSet, DEFAULT_ROOT_BOUND, solve_zero_bounded};
use crate::Expr;

/// Builder for parsing, solving and sampling with one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Solver {
    variable: String,
    limits: ParseLimits,
    root_bound: u64,
    sample_count: usize,
    fallback: FallbackPolicy,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            variable: "x".to_string(),
            limits: ParseLimits::default(),
            root_bound: DEFAULT_ROOT_BOUND,
            sample_count: DEFAULT_SAMPLE_COUNT,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl Solver {
    /// Create a solver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the single free variable (default `x`)
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Set maximum AST depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.limits.max_depth = depth;
        self
    }

    /// Set maximum AST node count
    pub fn max_nodes(mut self, nodes: usize) -> Self {
        self.limits.max_nodes = nodes;
        self
    }

    /// Largest numerator or denominator tried by the rational root search
    pub fn root_bound(mut self, bound: u64) -> Self {
        self.root_bound = bound;
        self
    }

    /// Samples per curve for function plots
    pub fn sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    pub fn var(&self) -> &str {
        &self.variable
    }

    pub fn limits(&self) -> ParseLimits {
        self.limits
    }

    pub fn fallback_policy(&self) -> &FallbackPolicy {
        &self.fallback
    }

    pub fn default_sample_count(&self) -> usize {
        self.sample_count
    }

    // ===== Pipeline stages =====

    pub fn parse(&self, formula: &str) -> Result<Expr, ParseError> {
        parse_with_limits(formula, &self.variable, self.limits)
    }

    pub fn differentiate(&self, expr: &Expr) -> Expr {
        expr.derive(&self.variable)
    }

    pub fn solve_zero(&self, expr: &Expr) -> CriticalPointSet {
        solve_zero_bounded(expr, &self.variable, self.root_bound)
    }

    /// Differentiate, solve for critical points and select the optimum
    pub fn optimize(&self, objective: &Expr, kind: ObjectiveKind) -> OptimizationResult {
        let derivative = self.differentiate(objective);
        let points = self.solve_zero(&derivative);
        log::debug!("{}({}) = {objective}: critical points {points}", kind.symbol(), self.variable);
        select_optimum(objective, &derivative, &points, &self.variable).with_kind(kind)
    }

    /// Parse `formula` and maximize it
    pub fn solve_optimization(&self, formula: &str) -> Result<OptimizationResult, ParseError> {
        self.solve_objective(formula, ObjectiveKind::Function)
    }

    /// [`Solver::solve_optimization`] with an objective label
    pub fn solve_objective(&self, formula: &str, kind: ObjectiveKind) -> Result<OptimizationResult, ParseError> {
        Ok(self.optimize(&self.parse(formula)?, kind))
    }

    /// Maximize `P(x) = x*p(x) - C(x)`
    pub fn solve_profit(&self, price: &str, cost: &str) -> Result<OptimizationResult, ParseError> {
        let profit = profit_objective(&self.parse(price)?, &self.parse(cost)?, &self.variable);
        Ok(self.optimize(&profit, ObjectiveKind::Profit))
    }

    pub fn integrate(
        &self,
        integrand: &Expr,
        lower: &Expr,
        upper: &Expr,
    ) -> Result<DefiniteIntegral, IntegrationFailure> {
        integrate_definite(integrand, &self.variable, lower, upper)
    }

    /// Sample over `[start, end]`, retrying once on the fallback range
    pub fn sample_for_plot(
        &self,
        expr: &Expr,
        start: f64,
        end: f64,
        count: usize,
        optimum: Option<f64>,
    ) -> Result<PlotSeries, SamplingError> {
        sample_with_fallback(expr, &self.variable, (start, end), count, optimum, &self.fallback)
    }

    /// A function and its derivative over `range` at the configured sample count
    pub fn plot_function(&self, function: &Expr, range: (f64, f64)) -> Result<FunctionPlot, SamplingError> {
        let derivative = self.differentiate(function);
        plot_function(function, &derivative, &self.variable, range, self.sample_count, &self.fallback)
    }

    pub fn plot_optimization(&self, result: &OptimizationResult) -> Result<OptimizationPlot, SamplingError> {
        plot_optimization(result, &self.fallback)
    }

    /// Integrand around `bounds` plus the region between them
    pub fn plot_integral(&self, integrand: &Expr, bounds: (f64, f64)) -> Result<IntegralPlot, SamplingError> {
        plot_integral(integrand, &self.variable, bounds, self.sample_count)
    }

    /// Run the routine for `category`; failures come back as unsuccessful solutions
    pub fn solve_word_problem(&self, category: WordProblemCategory, input: &RawInput) -> WordProblemSolution {
        crate::problems::dispatch(self, category, input)
    }
}
