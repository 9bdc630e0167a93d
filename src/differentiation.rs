// Differentiation engine - applies calculus rules
//
// Every result is rebuilt through the canonical constructors, so trivial
// terms (0 + u, 1 * u, u^1) never survive into the output and the
// derivative of a polynomial is again a sorted polynomial.

use std::sync::Arc;

use crate::expr::{Expr, ExprKind};
use crate::functions::Func;

impl Expr {
    /// Differentiate this expression with respect to `var`
    ///
    /// Every other symbol is treated as a constant.
    pub fn derive(&self, var: &str) -> Expr {
        if !self.contains_var(var) {
            return Expr::zero();
        }

        match self.kind() {
            // Base cases
            ExprKind::Number(_) | ExprKind::Constant(_) => Expr::zero(),

            ExprKind::Symbol(name) => {
                if name.as_ref() == var {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }

            // Chain rule: f(u)' = f'(u) * u'
            ExprKind::Call(func, arg) => {
                let inner_prime = arg.derive(var);
                if inner_prime.is_zero() {
                    return Expr::zero();
                }
                Expr::mul_expr(func.derivative_at(arg), inner_prime)
            }

            // Sum rule: (a + b)' = a' + b'
            ExprKind::Sum(terms) => Expr::sum(terms.iter().map(|t| t.derive(var)).collect()),

            // N-ary product rule: (a*b*c)' = a'*b*c + a*b'*c + a*b*c'
            ExprKind::Product(factors) => derive_product(factors, var),

            ExprKind::Pow(u, v) => derive_power(u, v, var),
        }
    }
}

fn derive_product(factors: &[Arc<Expr>], var: &str) -> Expr {
    let mut terms = Vec::with_capacity(factors.len());
    for (i, factor) in factors.iter().enumerate() {
        let factor_prime = factor.derive(var);
        if factor_prime.is_zero() {
            continue;
        }
        let mut parts: Vec<Expr> = Vec::with_capacity(factors.len());
        for (j, other) in factors.iter().enumerate() {
            if i != j {
                parts.push(other.as_ref().clone());
            }
        }
        parts.push(factor_prime);
        terms.push(Expr::product(parts));
    }
    Expr::sum(terms)
}

fn derive_power(u: &Expr, v: &Expr, var: &str) -> Expr {
    let u_prime = u.derive(var);

    if !v.contains_var(var) {
        // Constant exponent - standard power rule
        // (u^n)' = n * u^(n-1) * u'
        let n_minus_1 = Expr::sub_expr(v.clone(), Expr::one());
        return Expr::product(vec![v.clone(), Expr::pow(u.clone(), n_minus_1), u_prime]);
    }

    let v_prime = v.derive(var);
    let ln_u = Expr::call(Func::Ln, u.clone());
    let power = Expr::pow(u.clone(), v.clone());

    if !u.contains_var(var) {
        // Constant base: (a^v)' = a^v * ln(a) * v'
        return Expr::product(vec![power, ln_u, v_prime]);
    }

    // Logarithmic differentiation: (u^v)' = u^v * (v' * ln(u) + v * u'/u)
    let log_term = Expr::mul_expr(v_prime, ln_u);
    let ratio_term = Expr::product(vec![v.clone(), u_prime, Expr::powi(u.clone(), -1)]);
    Expr::mul_expr(power, Expr::add_expr(log_term, ratio_term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn d(input: &str) -> String {
        parse(input, "x").unwrap().derive("x").to_string()
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(d("3x^2 + 5x - 7"), "5 + 6*x");
        assert_eq!(d("60x - 2x^2"), "60 - 4*x");
        assert_eq!(d("42"), "0");
    }

    #[test]
    fn test_product_rule() {
        let expected = parse("sin(x) + x*cos(x)", "x").unwrap();
        assert_eq!(d("x*sin(x)"), expected.to_string());
    }

    #[test]
    fn test_chain_rule() {
        assert_eq!(d("sin(x^2)"), parse("2x*cos(x^2)", "x").unwrap().to_string());
        assert_eq!(d("exp(3x)"), parse("3exp(3x)", "x").unwrap().to_string());
    }

    #[test]
    fn test_quotient_through_negative_power() {
        assert_eq!(d("1/x"), "-1/x^2");
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(d("sqrt(x)"), "1/(2*sqrt(x))");
    }

    #[test]
    fn test_constant_base_and_variable_exponent() {
        let e = parse("2^x", "x").unwrap();
        let expected = Expr::mul_expr(e.clone(), Expr::call(Func::Ln, Expr::integer(2)));
        assert_eq!(e.derive("x"), expected);

        // x^x = x^x * (ln(x) + 1)
        let e = parse("x^x", "x").unwrap();
        let expected = Expr::mul_expr(
            e.clone(),
            Expr::add_expr(Expr::call(Func::Ln, Expr::symbol("x")), Expr::one()),
        );
        assert_eq!(e.derive("x"), expected);
    }

    #[test]
    fn test_ln() {
        assert_eq!(d("ln(x)"), "1/x");
    }

    #[test]
    fn test_other_symbols_are_constants() {
        let e = Expr::mul_expr(Expr::symbol("a"), Expr::symbol("x").powi(2));
        let expected = Expr::product(vec![Expr::integer(2), Expr::symbol("a"), Expr::symbol("x")]);
        assert_eq!(e.derive("x"), expected);
    }
}
