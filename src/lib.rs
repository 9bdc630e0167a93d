//! Worked single-variable calculus solutions
//!
//! Parses a formula over one declared variable, differentiates it exactly,
//! solves for critical points in closed form, picks the optimum a student
//! expects and explains every step.
//!
//! # Features
//! - Exact rational arithmetic and canonical expression trees
//! - Implicit multiplication (`2x`, `3sin(x)`, `(x+1)(x-1)`) and `**` powers
//! - Closed-form critical points: polynomials, rational functions, zero products,
//!   single-term isolation through inverse functions
//! - Labeled solution steps in plain text and LaTeX
//! - Plot sampling with a one-shot fallback range
//! - **Builder pattern API** through [`Solver`]
//!
//! # Usage Examples
//!
//! ## Free functions
//! ```
//! use storymath::solve_optimization;
//!
//! let result = solve_optimization("60*x - 2*x**2").unwrap();
//! assert_eq!(result.derivative().to_string(), "60 - 4*x");
//! assert_eq!(result.summary(), "The maximum value is 450 at x = 15");
//! ```
//!
//! ## Word problems
//! ```
//! use storymath::{RawInput, WordProblemCategory, solve_word_problem};
//!
//! let solution = solve_word_problem(WordProblemCategory::PlaneAreaPerimeter, &RawInput::from("10, 5"));
//! assert!(solution.success);
//! assert_eq!(solution.summary, "The area is 50 and the perimeter is 30");
//! ```

mod builder;
mod differentiation;
mod display;
mod error;
mod evaluate;
mod expr;
mod formulas;
pub mod functions;
mod integrate;
mod optimize;
mod parser;
mod poly;
mod problems;
pub mod sampling;
mod simplification;
mod solve;
pub mod steps;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

// Re-export key types for easier usage
pub use builder::Solver;
pub use display::LatexFormatter;
pub use error::{
    Error, EvalError, InputShapeError, IntegrationFailure, ParseError, Result, SampleFailure, SamplingError,
    SolveFailure, Span,
};
pub use expr::{Constant, Expr, ExprKind};
pub use formulas::list_formulas;
pub use functions::Func;
pub use integrate::{DefiniteIntegral, antiderivative, integrate_definite};
pub use optimize::{ObjectiveKind, OptimizationResult, profit_objective, select_optimum};
pub use parser::{ParseLimits, parse, parse_with_limits};
pub use problems::{RawInput, UnknownCategory, WordProblemCategory, WordProblemSolution};
pub use sampling::{FallbackPolicy, PlotSeries, sample};
pub use simplification::{expand, simplify_rational, together};
pub use solve::{CriticalPointSet, solve_zero};
pub use steps::SolutionStep;

/// Default maximum AST depth
pub const DEFAULT_MAX_DEPTH: usize = 100;
/// Default maximum AST node count
pub const DEFAULT_MAX_NODES: usize = 10_000;

/// Symbolic first derivative of `expr` with respect to `variable`
///
/// # Example
/// ```
/// use storymath::{differentiate, parse};
///
/// let f = parse("3x^2 + 5x - 7", "x").unwrap();
/// assert_eq!(differentiate(&f, "x").to_string(), "5 + 6*x");
/// ```
pub fn differentiate(expr: &Expr, variable: &str) -> Expr {
    expr.derive(variable)
}

/// Parse `function_text` in `x`, differentiate, solve and select the optimum
///
/// # Errors
/// Returns `ParseError` if the formula does not parse. A missing optimum is
/// not an error: it is reported through [`OptimizationResult::failure_reason`].
pub fn solve_optimization(function_text: &str) -> std::result::Result<OptimizationResult, ParseError> {
    Solver::default().solve_optimization(function_text)
}

/// Run the routine for `category` with the default configuration
///
/// Never fails: errors come back as `success = false` with the message as summary.
pub fn solve_word_problem(category: WordProblemCategory, raw_input: &RawInput) -> WordProblemSolution {
    Solver::default().solve_word_problem(category, raw_input)
}

/// Sample `expr` in `x` over `[start, end]`; on failure retry once on
/// `[0.1, 2*optimum]` if an optimum is known, else on `[-10, 10]`
///
/// # Errors
/// Returns `SamplingError` carrying both failures when the retry also fails.
pub fn sample_for_plot(
    expr: &Expr,
    start: f64,
    end: f64,
    count: usize,
    optimum: Option<f64>,
) -> std::result::Result<PlotSeries, SamplingError> {
    Solver::default().sample_for_plot(expr, start, end, count, optimum)
}
