//! Distribution of products over sums

use crate::expr::{Expr, ExprKind};
use crate::traits::as_small_int;

/// Largest integer power of a sum that gets multiplied out
const MAX_EXPAND_POWER: i64 = 12;

/// Give up distributing once a single product would produce this many terms
const MAX_EXPANDED_TERMS: usize = 4096;

fn terms_of(expr: &Expr) -> Vec<Expr> {
    match expr.kind() {
        ExprKind::Sum(terms) => terms.iter().map(|t| t.as_ref().clone()).collect(),
        _ => vec![expr.clone()],
    }
}

/// Multiply out `factors`, or return their plain product if that would blow up
fn distribute(factors: Vec<Expr>) -> Expr {
    let mut acc: Vec<Expr> = vec![Expr::one()];
    for factor in &factors {
        let terms = terms_of(factor);
        if acc.len().saturating_mul(terms.len()) > MAX_EXPANDED_TERMS {
            log::debug!("expansion exceeds {MAX_EXPANDED_TERMS} terms, keeping the product");
            return Expr::product(factors);
        }
        let mut next = Vec::with_capacity(acc.len() * terms.len());
        for a in &acc {
            for t in &terms {
                next.push(Expr::mul_expr(a.clone(), t.clone()));
            }
        }
        acc = next;
    }
    Expr::sum(acc)
}

/// Fully expand products and small integer powers of sums
pub fn expand(expr: &Expr) -> Expr {
    match expr.kind() {
        ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => expr.clone(),
        ExprKind::Call(func, arg) => Expr::call(*func, expand(arg)),
        ExprKind::Sum(terms) => Expr::sum(terms.iter().map(|t| expand(t)).collect()),
        ExprKind::Product(factors) => distribute(factors.iter().map(|f| expand(f)).collect()),
        ExprKind::Pow(base, exponent) => {
            let base = expand(base);
            let power = exponent.as_number().and_then(as_small_int);
            match power {
                Some(n) if (2..=MAX_EXPAND_POWER).contains(&n) && matches!(base.kind(), ExprKind::Sum(_)) => {
                    distribute(vec![base; n as usize])
                }
                _ => Expr::pow(base, expand(exponent)),
            }
        }
    }
}
