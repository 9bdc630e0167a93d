//! Critical points checked against the derivative they came from

use crate::{CriticalPointSet, Expr, Solver, parse, solve_zero};
use approx::assert_abs_diff_eq;

fn derivative_of(input: &str) -> Expr {
    parse(input, "x").unwrap().derive("x")
}

/// Every real point must zero the derivative numerically
fn assert_points_are_roots(input: &str) -> CriticalPointSet {
    let df = derivative_of(input);
    let set = solve_zero(&df, "x");
    for p in set.iter().filter(|p| !p.is_syntactically_complex()) {
        let at = df.substitute("x", p).eval_constant().unwrap();
        assert_abs_diff_eq!(at, 0.0, epsilon = 1e-9);
    }
    set
}

#[test]
fn test_points_zero_the_derivative() {
    for input in [
        "60x - 2x^2",
        "x(12 - 2x)^2",
        "x^3 - 6x^2 + 9x",
        "x^4 - 8x^2",
        "x + 1/x",
        "x/(x^2 + 1)",
        "x*exp(-x)",
        "x^2*exp(-x)",
        "x*ln(x)",
        "sqrt(x) - x/4",
        "sin(x)",
        "2x - x^3/3",
        "(x - 1)^2*(x - 3)^2",
    ] {
        let set = assert_points_are_roots(input);
        assert!(set.is_exhaustive(), "{input}");
        assert!(!set.is_empty(), "{input}");
    }
}

#[test]
fn test_solving_is_deterministic() {
    for input in ["x^4 - 8x^2", "x^3/3 + x", "x + 1/x", "sin(x) + cos(x)"] {
        let df = derivative_of(input);
        let first = solve_zero(&df, "x");
        for _ in 0..5 {
            assert_eq!(solve_zero(&df, "x"), first, "{input}");
        }
    }
}

#[test]
fn test_real_points_come_first_in_ascending_order() {
    // f' = 4x^3 - 16x = 4x(x - 2)(x + 2)
    let set = solve_zero(&derivative_of("x^4 - 8x^2"), "x");
    assert_eq!(set.to_string(), "[-2, 0, 2]");

    // f' = x^4 - 1: real roots, then -I and I
    let set = solve_zero(&derivative_of("x^5/5 - x"), "x");
    assert_eq!(set.len(), 4);
    let points = set.points();
    assert_eq!(&points[..2], &[Expr::integer(-1), Expr::integer(1)]);
    assert!(points[2..].iter().all(Expr::is_syntactically_complex));
}

#[test]
fn test_poles_are_never_critical_points() {
    // f' = 1 - 1/x^2, undefined at 0
    let set = solve_zero(&derivative_of("x + 1/x"), "x");
    assert!(!set.iter().any(Expr::is_zero));
    assert_eq!(set.to_string(), "[-1, 1]");
}

#[test]
fn test_small_root_bound_still_solves_quadratics() {
    // Rational root search is skipped, the quadratic formula is not
    let solver = Solver::new().root_bound(1);
    let set = solver.solve_zero(&solver.parse("x^2 - 5x + 6").unwrap());
    assert_eq!(set.to_string(), "[2, 3]");
}

#[test]
fn test_solver_respects_declared_variable() {
    let solver = Solver::new().variable("w");
    let result = solver.solve_optimization("w(10 - w)").unwrap();
    assert_eq!(result.chosen_point(), Some(&Expr::integer(5)));
    assert_eq!(result.summary(), "The maximum value is 25 at w = 5");
}
