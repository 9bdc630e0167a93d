//! Definite integrals by table lookup and a few rewrite rules
//!
//! Antiderivatives are found for sums, constant multiples, powers of a linear
//! argument and elementary functions of a linear argument. Products are tried
//! by substitution `c*u'*f(u)` and by parts for `x^n` against an exponential,
//! a sine or cosine, a logarithm or an inverse trig function. `sin^2`, `cos^2`
//! and reciprocal quadratics without real roots have their own rules. Anything
//! else is reported as having no closed-form antiderivative.

use num_traits::{Signed, Zero};

use crate::error::IntegrationFailure;
use crate::expr::{Expr, ExprKind};
use crate::functions::Func;
use crate::poly::Polynomial;
use crate::sampling::sample;
use crate::simplification::expand;
use crate::solve::real_value;
use crate::traits::{Rational, int};

/// Points checked between the bounds before the antiderivative is trusted
const INTERVAL_CHECKS: usize = 101;

/// Highest power of `x` integrated by parts against an exponential or sine
const MAX_PARTS_DEGREE: i64 = 8;

/// An evaluated definite integral
#[derive(Debug, Clone, PartialEq)]
pub struct DefiniteIntegral {
    pub integrand: Expr,
    pub antiderivative: Expr,
    pub lower: Expr,
    pub upper: Expr,
    /// Exact `F(upper) - F(lower)`
    pub value: Expr,
    pub approx: f64,
}

/// `a` for a linear `u = a*x + b`, with `a` free of `var`
fn linear_slope(u: &Expr, var: &str) -> Option<Expr> {
    let a = u.derive(var);
    (!a.contains_var(var) && !a.is_zero()).then_some(a)
}

/// Antiderivative of `f(u)` with respect to `u`
fn table_entry(func: Func, u: &Expr) -> Option<Expr> {
    let call = |f: Func| Expr::call(f, u.clone());
    let entry = match func {
        Func::Sin => call(Func::Cos).negate(),
        Func::Cos => call(Func::Sin),
        Func::Tan => Expr::call(Func::Ln, Expr::call(Func::Abs, call(Func::Cos))).negate(),
        Func::Cot => Expr::call(Func::Ln, Expr::call(Func::Abs, call(Func::Sin))),
        Func::Sinh => call(Func::Cosh),
        Func::Cosh => call(Func::Sinh),
        Func::Tanh => Expr::call(Func::Ln, call(Func::Cosh)),
        Func::Exp => call(Func::Exp),
        // u ln u - u
        Func::Ln => Expr::sub_expr(Expr::mul_expr(u.clone(), call(Func::Ln)), u.clone()),
        Func::Atan => Expr::sub_expr(
            Expr::mul_expr(u.clone(), call(Func::Atan)),
            Expr::div_expr(
                Expr::call(Func::Ln, Expr::add_expr(Expr::one(), u.clone().powi(2))),
                Expr::integer(2),
            ),
        ),
        Func::Asin => Expr::add_expr(
            Expr::mul_expr(u.clone(), call(Func::Asin)),
            Expr::sub_expr(Expr::one(), u.clone().powi(2)).sqrt(),
        ),
        Func::Acos => Expr::sub_expr(
            Expr::mul_expr(u.clone(), call(Func::Acos)),
            Expr::sub_expr(Expr::one(), u.clone().powi(2)).sqrt(),
        ),
        Func::Abs => Expr::div_expr(Expr::mul_expr(u.clone(), call(Func::Abs)), Expr::integer(2)),
        Func::Sec | Func::Csc => return None,
    };
    Some(entry)
}

fn integrate_power(base: &Expr, exponent: &Expr, var: &str) -> Option<Expr> {
    // a^(k x + b)
    if !base.contains_var(var) {
        let k = linear_slope(exponent, var)?;
        let scale = Expr::mul_expr(k, Expr::call(Func::Ln, base.clone()));
        return Some(Expr::div_expr(
            Expr::pow(base.clone(), exponent.clone()),
            scale,
        ));
    }
    if exponent.contains_var(var) {
        return None;
    }

    let squared = exponent.as_number().is_some_and(|n| *n == int(2));

    // sec(u)^2 and csc(u)^2
    if let ExprKind::Call(func @ (Func::Sec | Func::Csc), u) = base.kind()
        && squared
    {
        let a = linear_slope(u, var)?;
        let f = match func {
            Func::Sec => Expr::call(Func::Tan, u.as_ref().clone()),
            _ => Expr::call(Func::Cot, u.as_ref().clone()).negate(),
        };
        return Some(Expr::div_expr(f, a));
    }

    // sin(u)^2 = (1 - cos(2u))/2, cos(u)^2 = (1 + cos(2u))/2
    if let ExprKind::Call(func @ (Func::Sin | Func::Cos), u) = base.kind()
        && squared
    {
        let double = Expr::call(Func::Cos, Expr::mul_expr(Expr::integer(2), u.as_ref().clone()));
        let signed = if *func == Func::Sin { double.negate() } else { double };
        let reduced = Expr::div_expr(Expr::add_expr(Expr::one(), signed), Expr::integer(2));
        return integrate_term(&reduced, var);
    }

    if exponent.as_number().is_some_and(|n| *n == int(-1))
        && let Some(f) = reciprocal_quadratic(base, var)
    {
        return Some(f);
    }

    let a = linear_slope(base, var)?;
    let raised = Expr::add_expr(exponent.clone(), Expr::one());
    if raised.is_zero() {
        return Some(Expr::div_expr(
            Expr::call(Func::Ln, Expr::call(Func::Abs, base.clone())),
            a,
        ));
    }
    Some(Expr::div_expr(
        Expr::pow(base.clone(), raised.clone()),
        Expr::mul_expr(raised, a),
    ))
}

/// `1/(a*x^2 + c*x + b)` with no real roots, as `atan` of the completed square
fn reciprocal_quadratic(base: &Expr, var: &str) -> Option<Expr> {
    let p = Polynomial::try_from_expr(base, var)?;
    if p.degree() != 2 {
        return None;
    }
    let (a, c, b) = (p.coeff(2), p.coeff(1), p.coeff(0));
    // a*(x + h)^2 + k
    let h = &c / (&a * int(2));
    let k = &b - &c * &c / (&a * int(4));
    if k.is_zero() || a.is_positive() != k.is_positive() {
        return None;
    }

    let shifted = Expr::add_expr(Expr::symbol(var), Expr::number(h));
    let scale = Expr::number(&a / &k).sqrt();
    let atan = Expr::call(Func::Atan, Expr::mul_expr(shifted, scale));
    let f = Expr::div_expr(atan, Expr::number(&a * &k).sqrt());
    Some(if a.is_negative() { f.negate() } else { f })
}

/// `integral(u^n du)`, with `ln|u|` for `n = -1`
fn power_in(u: &Expr, n: &Expr) -> Expr {
    let raised = Expr::add_expr(n.clone(), Expr::one());
    if raised.is_zero() {
        return Expr::call(Func::Ln, Expr::call(Func::Abs, u.clone()));
    }
    Expr::div_expr(Expr::pow(u.clone(), raised.clone()), raised)
}

/// `c*u'(x)*f(u)` integrates to `c*F(u)`
///
/// Each factor is tried as the outer function of `u`: a table function of
/// `u`, a constant power of `u`, or `u` itself.
fn substitution(factors: &[Expr], var: &str) -> Option<Expr> {
    for (i, factor) in factors.iter().enumerate() {
        let rest = Expr::product(
            factors
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, f)| f.clone())
                .collect(),
        );

        let mut outer: Vec<(Expr, Expr)> = Vec::with_capacity(2);
        match factor.kind() {
            ExprKind::Call(func, u) => {
                if let Some(big_f) = table_entry(*func, u) {
                    outer.push((u.as_ref().clone(), big_f));
                }
            }
            ExprKind::Pow(b, n) if !n.contains_var(var) => {
                outer.push((b.as_ref().clone(), power_in(b, n)));
            }
            _ => {}
        }
        outer.push((factor.clone(), power_in(factor, &Expr::one())));

        for (u, big_f) in outer {
            let du = u.derive(var);
            if du.is_zero() {
                continue;
            }
            let ratio = Expr::div_expr(rest.clone(), du);
            if !ratio.contains_var(var) {
                log::trace!("substituting u = {u}");
                return Some(Expr::mul_expr(ratio, big_f));
            }
        }
    }
    None
}

/// Exponent `n` of a factor `x^n`
fn monomial_power(factor: &Expr, var: &str) -> Option<Rational> {
    match factor.kind() {
        ExprKind::Symbol(_) if factor.is_symbol(var) => Some(int(1)),
        ExprKind::Pow(b, n) if b.is_symbol(var) => n.as_number().cloned(),
        _ => None,
    }
}

/// `integral(u dv) = u*v - integral(v du)` for `x^n` against one function of a linear argument
fn by_parts(factors: &[Expr], var: &str) -> Option<Expr> {
    let [first, second] = factors else {
        return None;
    };
    let (n, power, other) = match (monomial_power(first, var), monomial_power(second, var)) {
        (Some(n), None) => (n, first, second),
        (None, Some(n)) => (n, second, first),
        _ => return None,
    };
    let ExprKind::Call(func, u) = other.kind() else {
        return None;
    };
    let a = linear_slope(u, var)?;

    let (u_part, v) = match func {
        // Differentiate the power down to a constant
        Func::Exp | Func::Sin | Func::Cos | Func::Sinh | Func::Cosh => {
            let in_range = n.is_integer() && n >= int(1) && n <= int(MAX_PARTS_DEGREE);
            if !in_range {
                return None;
            }
            (power.clone(), Expr::div_expr(table_entry(*func, u)?, a))
        }
        // Differentiate the logarithm or inverse function away
        Func::Ln | Func::Atan | Func::Asin | Func::Acos => {
            if n == int(-1) {
                return None;
            }
            (other.clone(), power_in(&Expr::symbol(var), &Expr::number(n)))
        }
        _ => return None,
    };

    log::trace!("by parts with u = {u_part}");
    let remaining = integrate_term(&Expr::mul_expr(v.clone(), u_part.derive(var)), var)?;
    Some(Expr::sub_expr(Expr::mul_expr(u_part, v), remaining))
}

fn integrate_term(expr: &Expr, var: &str) -> Option<Expr> {
    if !expr.contains_var(var) {
        return Some(Expr::mul_expr(expr.clone(), Expr::symbol(var)));
    }
    match expr.kind() {
        ExprKind::Symbol(_) => Some(Expr::div_expr(expr.clone().powi(2), Expr::integer(2))),
        ExprKind::Sum(terms) => terms
            .iter()
            .map(|t| integrate_term(t, var))
            .collect::<Option<Vec<_>>>()
            .map(Expr::sum),
        ExprKind::Product(factors) => {
            let (dependent, constant): (Vec<Expr>, Vec<Expr>) = factors
                .iter()
                .map(|f| f.as_ref().clone())
                .partition(|f| f.contains_var(var));
            let integrated = match dependent.as_slice() {
                [single] => integrate_term(single, var)?,
                several => substitution(several, var).or_else(|| by_parts(several, var))?,
            };
            Some(Expr::mul_expr(Expr::product(constant), integrated))
        }
        ExprKind::Pow(base, exponent) => integrate_power(base, exponent, var),
        ExprKind::Call(func, u) => {
            let a = linear_slope(u, var)?;
            Some(Expr::div_expr(table_entry(*func, u)?, a))
        }
        ExprKind::Number(_) | ExprKind::Constant(_) => None,
    }
}

/// A closed-form antiderivative of `expr`, if the table covers it
///
/// ```
/// use storymath::{antiderivative, parse};
///
/// let f = parse("3x^2 + cos(2x)", "x").unwrap();
/// let big_f = antiderivative(&f, "x").unwrap();
/// assert_eq!(big_f.derive("x"), f);
/// ```
pub fn antiderivative(expr: &Expr, var: &str) -> Option<Expr> {
    integrate_term(expr, var).or_else(|| {
        let expanded = expand(expr);
        (expanded != *expr).then(|| integrate_term(&expanded, var)).flatten()
    })
}

/// Evaluate `integral(integrand, var = lower..upper)` exactly
pub fn integrate_definite(
    integrand: &Expr,
    var: &str,
    lower: &Expr,
    upper: &Expr,
) -> Result<DefiniteIntegral, IntegrationFailure> {
    let (Some(a), Some(b)) = (real_value(lower), real_value(upper)) else {
        return Err(IntegrationFailure::InvalidBounds);
    };

    let points = sample(integrand, var, a, b, INTERVAL_CHECKS).map_err(|failure| {
        IntegrationFailure::NotDefinedOnInterval {
            lower: a,
            upper: b,
            failure,
        }
    })?;
    if let Some((at, _)) = points.iter().find(|(_, y)| !y.is_finite()) {
        return Err(IntegrationFailure::Divergent { at: *at });
    }

    let antiderivative = antiderivative(integrand, var).ok_or_else(|| IntegrationFailure::NoAntiderivative {
        integrand: integrand.to_string(),
    })?;
    let value = Expr::sub_expr(
        antiderivative.substitute(var, upper),
        antiderivative.substitute(var, lower),
    );
    let approx = value.eval_constant().map_err(IntegrationFailure::Unevaluable)?;
    log::debug!("integral of {integrand} over [{lower}, {upper}] = {value}");

    Ok(DefiniteIntegral {
        integrand: integrand.clone(),
        antiderivative,
        lower: lower.clone(),
        upper: upper.clone(),
        value,
        approx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use approx::assert_relative_eq;
    use std::f64::consts::{E, FRAC_PI_2, FRAC_PI_4, PI};

    fn f(input: &str) -> Expr {
        parse(input, "x").unwrap()
    }

    fn definite(input: &str, a: &str, b: &str) -> Result<DefiniteIntegral, IntegrationFailure> {
        integrate_definite(&f(input), "x", &f(a), &f(b))
    }

    #[test]
    fn test_power_rule() {
        let r = definite("x^2", "0", "2").unwrap();
        assert_eq!(r.value, Expr::rational(8, 3));
        assert_relative_eq!(r.approx, 8.0 / 3.0);
        assert_eq!(r.antiderivative.to_string(), "x^3/3");
    }

    #[test]
    fn test_trig_with_exact_bounds() {
        let r = definite("sin(x)", "0", "pi").unwrap();
        assert_eq!(r.value, Expr::integer(2));
    }

    #[test]
    fn test_reciprocal_gives_log() {
        let r = definite("1/x", "1", "e").unwrap();
        assert_eq!(r.value, Expr::one());
    }

    #[test]
    fn test_linear_substitution() {
        let r = definite("exp(2x)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, (E * E - 1.0) / 2.0, epsilon = 1e-12);
        let r = definite("(2x + 1)^3", "0", "1").unwrap();
        assert_eq!(r.value, Expr::integer(10));
    }

    #[test]
    fn test_product_is_expanded() {
        let r = definite("x(x + 1)", "0", "3").unwrap();
        assert_eq!(r.value, Expr::rational(27, 2));
    }

    #[test]
    fn test_no_antiderivative() {
        assert!(matches!(
            definite("exp(x^2)", "0", "1"),
            Err(IntegrationFailure::NoAntiderivative { .. })
        ));
        assert!(matches!(
            definite("sin(x)^3", "0", "1"),
            Err(IntegrationFailure::NoAntiderivative { .. })
        ));
    }

    /// `F' = f` checked numerically at a few points
    fn assert_antiderivative(input: &str) {
        let integrand = f(input);
        let big_f = antiderivative(&integrand, "x").unwrap_or_else(|| panic!("no antiderivative for {input}"));
        let derived = big_f.derive("x");
        for x in [0.3, 0.7, 1.1, 1.9] {
            let expected = integrand.eval_at("x", x).unwrap();
            assert_relative_eq!(derived.eval_at("x", x).unwrap(), expected, epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_by_parts() {
        let r = definite("x exp(x)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, 1.0, epsilon = 1e-12);
        let r = definite("x^2 exp(x)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, E - 2.0, epsilon = 1e-12);
        let r = definite("x sin(x)", "0", "pi").unwrap();
        assert_relative_eq!(r.approx, PI, epsilon = 1e-12);
        let r = definite("x cos(x)", "0", "pi/2").unwrap();
        assert_relative_eq!(r.approx, FRAC_PI_2 - 1.0, epsilon = 1e-12);
        let r = definite("x ln(x)", "1", "e").unwrap();
        assert_relative_eq!(r.approx, (E * E + 1.0) / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_substitution() {
        let r = definite("2x exp(x^2)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, E - 1.0, epsilon = 1e-12);
        let r = definite("x/(1 + x^2)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, 2f64.ln() / 2.0, epsilon = 1e-12);
        let r = definite("sin(x)cos(x)", "0", "pi/2").unwrap();
        assert_relative_eq!(r.approx, 0.5, epsilon = 1e-12);
        let r = definite("ln(x)/x", "1", "e").unwrap();
        assert_relative_eq!(r.approx, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_reciprocal_quadratic() {
        let r = definite("1/(1 + x^2)", "0", "1").unwrap();
        assert_relative_eq!(r.approx, FRAC_PI_4, epsilon = 1e-12);
        // (x + 1)^2 + 1
        let r = definite("1/(x^2 + 2x + 2)", "-1", "0").unwrap();
        assert_relative_eq!(r.approx, FRAC_PI_4, epsilon = 1e-12);
        // Real roots: would need partial fractions
        assert!(antiderivative(&f("1/(x^2 - 1)"), "x").is_none());
    }

    #[test]
    fn test_square_of_sine_and_cosine() {
        let r = definite("sin(x)^2", "0", "pi").unwrap();
        assert_relative_eq!(r.approx, FRAC_PI_2, epsilon = 1e-12);
        let r = definite("cos(x)^2", "0", "pi").unwrap();
        assert_relative_eq!(r.approx, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_antiderivatives_differentiate_back() {
        for input in [
            "x exp(2x)",
            "x^3 exp(-x)",
            "x^2 cos(3x)",
            "x sinh(x)",
            "x^2 ln(x)",
            "atan(x)",
            "asin(x/2)",
            "x exp(x^2)",
            "cos(x) exp(sin(x))",
            "sin(x)^2 cos(x)",
            "x sqrt(1 + x^2)",
            "3/(2x^2 + 1)",
            "-1/(x^2 + 4) + sin(2x + 1)^2",
        ] {
            assert_antiderivative(input);
        }
    }

    #[test]
    fn test_undefined_on_interval() {
        assert!(matches!(
            definite("ln(x)", "-1", "1"),
            Err(IntegrationFailure::NotDefinedOnInterval { .. })
        ));
        assert!(matches!(definite("1/x", "0", "1"), Err(IntegrationFailure::Divergent { .. })));
    }

    #[test]
    fn test_bounds_must_be_real() {
        assert_eq!(definite("x", "I", "1"), Err(IntegrationFailure::InvalidBounds));
    }
}
