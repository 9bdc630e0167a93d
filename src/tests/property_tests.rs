//! Property-Based and Fuzz Testing
//!
//! Uses quickcheck for property-based testing of:
//! - Parser robustness (fuzz testing)
//! - Canonical rendering idempotence
//! - Power rule and linearity of the derivative
//! - The optimum selector's domain filter

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

use crate::{Expr, Solver, parse};

// ============================================================
// PART 1: EXPRESSION GENERATORS FOR PROPERTY TESTS
// ============================================================

fn small_int(g: &mut Gen, range: i64) -> i64 {
    i64::from(i8::arbitrary(g)) % (range + 1)
}

fn gen_leaf(g: &mut Gen) -> String {
    match u8::arbitrary(g) % 5 {
        0 | 1 => "x".to_string(),
        2 => format!("{}", small_int(g, 9)),
        3 => format!("{}x", small_int(g, 5)),
        _ => format!("x^{}", u8::arbitrary(g) % 4),
    }
}

fn gen_formula(g: &mut Gen, depth: usize) -> String {
    if depth == 0 {
        return gen_leaf(g);
    }
    match u8::arbitrary(g) % 9 {
        0..=2 => {
            let ops = ["+", "-", "*", "/"];
            let op = ops[usize::arbitrary(g) % ops.len()];
            let left = gen_formula(g, depth - 1);
            let right = gen_formula(g, depth - 1);
            format!("({left} {op} {right})")
        }
        3..=4 => {
            let fns = ["sin", "cos", "exp", "ln", "sqrt", "atan"];
            let f = fns[usize::arbitrary(g) % fns.len()];
            format!("{f}({})", gen_formula(g, depth - 1))
        }
        5 => format!("-({})", gen_formula(g, depth - 1)),
        6 => format!("({})^{}", gen_formula(g, depth - 1), u8::arbitrary(g) % 4),
        _ => gen_formula(g, depth - 1),
    }
}

/// A formula over `x` built from the parser's own grammar
#[derive(Debug, Clone)]
struct Formula(String);

impl Arbitrary for Formula {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(3);
        Formula(gen_formula(g, depth))
    }
}

/// Polynomial with small integer coefficients, as text
#[derive(Debug, Clone)]
struct Poly(String);

impl Arbitrary for Poly {
    fn arbitrary(g: &mut Gen) -> Self {
        let terms: Vec<String> = (0..=u8::arbitrary(g) % 4)
            .map(|k| format!("({})*x^{k}", small_int(g, 20)))
            .collect();
        Poly(terms.join(" + "))
    }
}

// ============================================================
// PART 2: PARSER FUZZ TESTS
// ============================================================

#[cfg(test)]
mod parser_fuzz_tests {
    use super::*;

    /// Property: Parser should never panic on arbitrary input
    #[test]
    fn test_parser_never_panics_on_random_input() {
        fn prop_parser_no_panic(input: String) -> TestResult {
            // Parser should either succeed or return Err, never panic
            let _ = parse(&input, "x");
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(1000)
            .max_tests(2000)
            .quickcheck(prop_parser_no_panic as fn(String) -> TestResult);
    }

    /// Fuzz test with specifically crafted edge cases
    #[test]
    fn test_parser_edge_cases() {
        let edge_cases = [
            "",
            "   ",
            "()",
            "((()))",
            "+++",
            "---x",
            "1+",
            "+1",
            "sin()",
            "sin(x,x)",
            "1..2",
            "x^x^x",
            "((((x))))",
            "sin(cos(tan(exp(ln(x)))))",
            "1/0",
            "0/0",
            "0^-1",
            "(-0)",
            "∞",
            "π",
            "xé",
            "**",
            "2**",
            ")(",
        ];

        for case in &edge_cases {
            // Should not panic - may succeed or fail with error
            let _ = parse(case, "x");
        }
    }

    /// Test deeply nested expressions don't stack overflow
    #[test]
    fn test_parser_deep_nesting() {
        let mut expr = "x".to_string();
        for _ in 0..50 {
            expr = format!("({expr}+1)");
        }
        let result = parse(&expr, "x");
        assert!(result.is_ok(), "Deep nesting should parse: {}", result.unwrap_err());
    }
}

// ============================================================
// PART 3: CANONICAL FORM PROPERTIES
// ============================================================

#[cfg(test)]
mod canonical_form_tests {
    use super::*;

    /// Property: render(parse(render(e))) == render(e)
    #[test]
    fn test_render_is_idempotent() {
        fn prop(f: Formula) -> TestResult {
            let Ok(e) = parse(&f.0, "x") else {
                return TestResult::discard();
            };
            let rendered = e.to_string();
            match parse(&rendered, "x") {
                Ok(again) => TestResult::from_bool(again.to_string() == rendered),
                Err(err) => TestResult::error(format!("{rendered:?} does not re-parse: {err}")),
            }
        }
        QuickCheck::new()
            .tests(300)
            .max_tests(3000)
            .quickcheck(prop as fn(Formula) -> TestResult);
    }

    #[test]
    fn test_render_fixed_cases() {
        for input in [
            "3x^2 + 5x - 7",
            "x(12 - 2x)^2",
            "sin(x)/x",
            "1/(x+1)^2",
            "sqrt(8x)",
            "exp(-x) - x*exp(-x)",
            "x^(2/3) - 1/2",
            "-(x - 1)/3",
            "2^x * ln(2)",
        ] {
            let e = parse(input, "x").unwrap();
            let rendered = e.to_string();
            assert_eq!(parse(&rendered, "x").unwrap().to_string(), rendered, "{input}");
        }
    }
}

// ============================================================
// PART 4: DERIVATIVE PROPERTIES
// ============================================================

#[cfg(test)]
mod derivative_tests {
    use super::*;

    /// Property: d/dx x^n = n*x^(n-1)
    #[test]
    fn test_power_rule() {
        fn prop(n: u8) -> bool {
            let n = i64::from(n % 40) + 1;
            let f = parse(&format!("x^{n}"), "x").unwrap();
            let expected = Expr::mul_expr(Expr::integer(n), Expr::symbol("x").powi(n - 1));
            f.derive("x") == expected
        }
        QuickCheck::new().tests(200).quickcheck(prop as fn(u8) -> bool);
    }

    /// Property: d(f + g) = df + dg for polynomials
    #[test]
    fn test_linearity_on_polynomials() {
        fn prop(f: Poly, g: Poly) -> bool {
            let pf = parse(&f.0, "x").unwrap();
            let pg = parse(&g.0, "x").unwrap();
            let sum = parse(&format!("({}) + ({})", f.0, g.0), "x").unwrap();
            sum.derive("x") == Expr::add_expr(pf.derive("x"), pg.derive("x"))
        }
        QuickCheck::new().tests(200).quickcheck(prop as fn(Poly, Poly) -> bool);
    }

    /// Property: derivatives of generated formulas render and re-parse
    #[test]
    fn test_derivative_renders() {
        fn prop(f: Formula) -> TestResult {
            let Ok(e) = parse(&f.0, "x") else {
                return TestResult::discard();
            };
            let rendered = e.derive("x").to_string();
            TestResult::from_bool(parse(&rendered, "x").is_ok())
        }
        QuickCheck::new()
            .tests(200)
            .max_tests(2000)
            .quickcheck(prop as fn(Formula) -> TestResult);
    }
}

// ============================================================
// PART 5: SELECTOR PROPERTIES
// ============================================================

#[cfg(test)]
mod selector_tests {
    use super::*;

    /// Property: a chosen point is always real and strictly positive
    #[test]
    fn test_chosen_point_is_positive_real() {
        fn prop(a: i8, b: i8, c: i8, d: i8) -> bool {
            let formula = format!("({a})*x^3 + ({b})*x^2 + ({c})*x + ({d})");
            let result = Solver::new().solve_optimization(&formula).unwrap();
            match result.chosen_point() {
                Some(p) => {
                    !p.is_syntactically_complex()
                        && result.approx_point().is_some_and(|v| v > 0.0)
                        && result.failure_reason().is_none()
                }
                None => result.failure_reason().is_some(),
            }
        }
        QuickCheck::new()
            .tests(300)
            .quickcheck(prop as fn(i8, i8, i8, i8) -> bool);
    }
}
