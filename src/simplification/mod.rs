//! Simplification framework - algebraic rewrites on top of the canonical form
//!
//! The constructors already fold numbers and collect like terms. The passes
//! here do the rewrites that change the shape of a tree and are therefore only
//! run on request: distributing products over sums, and bringing a rational
//! expression over one denominator.
mod expand;
mod together;

pub use expand::expand;
pub use together::together;

use crate::Expr;

/// Expand, then collect over a common denominator and expand both halves
///
/// The result is `numerator / denominator` with both parts polynomial-shaped
/// whenever the input is a rational function.
pub fn simplify_rational(expr: &Expr) -> Expr {
    let (numerator, denominator) = together(expr);
    Expr::div_expr(expand(&numerator), expand(&denominator))
}
