// =============================================================================
// CANONICAL ORDERING FOR EXPRESSIONS
// =============================================================================

use std::cmp::Ordering;

use super::{Expr, ExprKind};

/// Compare expressions for canonical ordering.
/// Numbers first; then terms are keyed by (base, exponent, coefficient) so that
/// `x` < `x^2` < `x^3` and polynomials read in ascending degree.
/// Base order: Constant < Symbol < Call < Pow < Sum < Product
pub(crate) fn expr_cmp(a: &Expr, b: &Expr) -> Ordering {
    use ExprKind::*;

    match (a.kind(), b.kind()) {
        (Number(x), Number(y)) => return x.cmp(y),
        (Number(_), _) => return Ordering::Less,
        (_, Number(_)) => return Ordering::Greater,
        _ => {}
    }

    let (coeff_a, rest_a) = a.coefficient_and_rest();
    let (coeff_b, rest_b) = b.coefficient_and_rest();
    let (base_a, exp_a) = split_power(&rest_a);
    let (base_b, exp_b) = split_power(&rest_b);

    rank(base_a)
        .cmp(&rank(base_b))
        .then_with(|| same_rank_cmp(base_a, base_b))
        .then_with(|| exponent_cmp(exp_a, exp_b))
        .then_with(|| coeff_a.cmp(&coeff_b))
}

fn split_power(e: &Expr) -> (&Expr, Option<&Expr>) {
    match e.kind() {
        ExprKind::Pow(b, exp) => (b.as_ref(), Some(exp.as_ref())),
        _ => (e, None),
    }
}

fn rank(e: &Expr) -> u8 {
    match e.kind() {
        ExprKind::Number(_) => 0,
        ExprKind::Constant(_) => 1,
        ExprKind::Symbol(_) => 2,
        ExprKind::Call(..) => 3,
        ExprKind::Pow(..) => 4,
        ExprKind::Sum(_) => 5,
        ExprKind::Product(_) => 6,
    }
}

fn exponent_cmp(a: Option<&Expr>, b: Option<&Expr>) -> Ordering {
    let one = Expr::one();
    let a = a.unwrap_or(&one);
    let b = b.unwrap_or(&one);
    match (a.kind(), b.kind()) {
        (ExprKind::Number(x), ExprKind::Number(y)) => x.cmp(y),
        (ExprKind::Number(_), _) => Ordering::Less,
        (_, ExprKind::Number(_)) => Ordering::Greater,
        _ => expr_cmp(a, b),
    }
}

fn lexicographic(a: &[std::sync::Arc<Expr>], b: &[std::sync::Arc<Expr>]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match expr_cmp(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

// Both arguments have the same rank
fn same_rank_cmp(a: &Expr, b: &Expr) -> Ordering {
    use ExprKind::*;
    match (a.kind(), b.kind()) {
        (Number(x), Number(y)) => x.cmp(y),
        (Constant(x), Constant(y)) => x.cmp(y),
        (Symbol(x), Symbol(y)) => x.as_ref().cmp(y.as_ref()),
        (Call(f1, a1), Call(f2, a2)) => f1.cmp(f2).then_with(|| expr_cmp(a1, a2)),
        (Pow(b1, e1), Pow(b2, e2)) => expr_cmp(b1, b2).then_with(|| expr_cmp(e1, e2)),
        (Sum(t1), Sum(t2)) => lexicographic(t1, t2),
        (Product(f1), Product(f2)) => lexicographic(f1, f2),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Func;

    #[test]
    fn test_numbers_first_then_ascending_degree() {
        let x = Expr::symbol("x");
        let mut terms = vec![
            Expr::product(vec![Expr::integer(3), x.clone().powi(2)]),
            Expr::integer(-7),
            Expr::product(vec![Expr::integer(5), x.clone()]),
        ];
        terms.sort_by(expr_cmp);
        assert_eq!(terms[0], Expr::integer(-7));
        assert_eq!(terms[1], Expr::product(vec![Expr::integer(5), x.clone()]));
        assert_eq!(terms[2], Expr::product(vec![Expr::integer(3), x.powi(2)]));
    }

    #[test]
    fn test_fractional_powers_sort_by_value() {
        let x = Expr::symbol("x");
        let root = x.clone().sqrt();
        let square = x.clone().powi(2);
        assert_eq!(expr_cmp(&root, &x), Ordering::Less);
        assert_eq!(expr_cmp(&x, &square), Ordering::Less);
    }

    #[test]
    fn test_constants_before_symbols_before_calls() {
        let x = Expr::symbol("x");
        let sin = Expr::call(Func::Sin, x.clone());
        assert_eq!(expr_cmp(&Expr::pi(), &x), Ordering::Less);
        assert_eq!(expr_cmp(&x, &sin), Ordering::Less);
    }
}
