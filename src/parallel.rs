//! Parallel batch solving using Rayon
//!
//! Requests share nothing, so a batch is simply mapped over the thread pool.
//! Results come back in input order.
//!
//! Enable with the `parallel` feature:
//! ```toml
//! storymath = { version = "0.1", features = ["parallel"] }
//! ```

use rayon::prelude::*;

use crate::builder::Solver;
use crate::error::ParseError;
use crate::optimize::OptimizationResult;
use crate::problems::{RawInput, WordProblemCategory, WordProblemSolution};

/// Solve many word problems with one configuration
///
/// # Example
/// ```ignore
/// use storymath::{RawInput, Solver, WordProblemCategory};
/// use storymath::parallel::solve_word_problems_parallel;
///
/// let batch = vec![
///     (WordProblemCategory::SolidVolume, RawInput::from("10, 5, 3")),
///     (WordProblemCategory::Optimization, RawInput::from("60x - 2x^2")),
/// ];
/// let solutions = solve_word_problems_parallel(&Solver::new(), &batch);
/// assert!(solutions.iter().all(|s| s.success));
/// ```
pub fn solve_word_problems_parallel(
    solver: &Solver,
    requests: &[(WordProblemCategory, RawInput)],
) -> Vec<WordProblemSolution> {
    requests
        .par_iter()
        .map(|(category, input)| solver.solve_word_problem(*category, input))
        .collect()
}

/// Maximize many objective formulas with one configuration
pub fn solve_optimizations_parallel(
    solver: &Solver,
    formulas: &[&str],
) -> Vec<Result<OptimizationResult, ParseError>> {
    formulas
        .par_iter()
        .map(|formula| solver.solve_optimization(formula))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Expr;

    #[test]
    fn test_batch_keeps_order() {
        let batch = vec![
            (WordProblemCategory::SolidVolume, RawInput::from("10, 5, 3")),
            (WordProblemCategory::PlaneAreaPerimeter, RawInput::from("10")),
            (WordProblemCategory::Optimization, RawInput::from("60x - 2x^2")),
        ];
        let solutions = solve_word_problems_parallel(&Solver::new(), &batch);
        assert_eq!(solutions.len(), 3);
        assert_eq!(solutions[0].summary, "The volume is 150");
        assert!(!solutions[1].success);
        assert!(solutions[2].success);
    }

    #[test]
    fn test_optimizations() {
        let results = solve_optimizations_parallel(&Solver::new(), &["60x - 2x^2", "x^2", "2x +"]);
        assert_eq!(results[0].as_ref().unwrap().chosen_point(), Some(&Expr::integer(15)));
        assert!(!results[1].as_ref().unwrap().is_success());
        assert!(results[2].is_err());
    }
}
