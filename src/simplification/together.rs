//! Common-denominator form

use num_traits::Signed;

use crate::expr::{Expr, ExprKind};
use crate::traits::as_small_int;

fn add_fractions((n1, d1): (Expr, Expr), (n2, d2): (Expr, Expr)) -> (Expr, Expr) {
    if d1 == d2 {
        (Expr::add_expr(n1, n2), d1)
    } else if d2.is_one() {
        (Expr::add_expr(n1, Expr::mul_expr(n2, d1.clone())), d1)
    } else if d1.is_one() {
        (Expr::add_expr(Expr::mul_expr(n1, d2.clone()), n2), d2)
    } else {
        let numerator = Expr::add_expr(
            Expr::mul_expr(n1, d2.clone()),
            Expr::mul_expr(n2, d1.clone()),
        );
        (numerator, Expr::mul_expr(d1, d2))
    }
}

/// Split `expr` into `(numerator, denominator)` with `expr = numerator / denominator`
///
/// Negative powers move to the denominator and the terms of a sum are
/// brought over one denominator. Function arguments are left untouched.
pub fn together(expr: &Expr) -> (Expr, Expr) {
    match expr.kind() {
        ExprKind::Number(n) => (
            Expr::number(n.numer().clone().into()),
            Expr::number(n.denom().clone().into()),
        ),
        ExprKind::Constant(_) | ExprKind::Symbol(_) | ExprKind::Call(..) => (expr.clone(), Expr::one()),
        ExprKind::Sum(terms) => terms
            .iter()
            .map(|t| together(t))
            .reduce(add_fractions)
            .unwrap_or_else(|| (Expr::zero(), Expr::one())),
        ExprKind::Product(factors) => {
            let mut numerators = Vec::with_capacity(factors.len());
            let mut denominators = Vec::new();
            for f in factors {
                let (n, d) = together(f);
                numerators.push(n);
                denominators.push(d);
            }
            (Expr::product(numerators), Expr::product(denominators))
        }
        ExprKind::Pow(base, exponent) => {
            let Some(e) = exponent.as_number() else {
                return (expr.clone(), Expr::one());
            };
            match as_small_int(e) {
                Some(n) => {
                    let (num, den) = together(base);
                    let k = n.abs();
                    let (top, bottom) = (num.powi(k), den.powi(k));
                    if n < 0 { (bottom, top) } else { (top, bottom) }
                }
                None if e.is_negative() => (
                    Expr::one(),
                    Expr::pow(base.as_ref().clone(), Expr::number(-e)),
                ),
                None => (expr.clone(), Expr::one()),
            }
        }
    }
}
