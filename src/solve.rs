//! Critical point solver: exact solutions of `expr = 0`
//!
//! Strategies, tried in order on the numerator of the common-denominator form:
//! polynomial roots, zero-product splitting (including factors common to every
//! term of a sum), and isolation of a single term `a + b*g(x) = 0` through the
//! inverse of `g`. Candidates where the denominator vanishes are dropped.
//! No numeric root finding is attempted: without a closed form the set is
//! empty and marked as not exhaustive.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use num_integer::Integer;
use num_traits::{One, Signed};

use crate::expr::{Expr, ExprKind, expr_cmp};
use crate::functions::Func;
use crate::poly::{Polynomial, closed_form_roots};
use crate::simplification::{expand, together};
use crate::traits::{FLOAT_TOLERANCE, is_zero_f64};

/// Default bound for the rational root search (divisors up to `bound^2`)
pub const DEFAULT_ROOT_BOUND: u64 = 10_000;

/// Nested inversions give up below this depth
const MAX_SOLVE_DEPTH: usize = 8;

// =============================================================================
// CRITICAL POINT SET
// =============================================================================

/// Ordered solutions of `derivative = 0`
///
/// Real solutions come first, ascending by value, then non-real ones in
/// structural order. Each solution appears once.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPointSet {
    points: Vec<Expr>,
    exhaustive: bool,
}

impl CriticalPointSet {
    /// Wrap points already in solver order
    pub(crate) fn from_ordered(points: Vec<Expr>, exhaustive: bool) -> Self {
        CriticalPointSet { points, exhaustive }
    }

    pub fn points(&self) -> &[Expr] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// False when part of the equation had no closed form and was given up on
    pub fn is_exhaustive(&self) -> bool {
        self.exhaustive
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Expr> {
        self.points
    }
}

impl<'a> IntoIterator for &'a CriticalPointSet {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl fmt::Display for CriticalPointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str("]")
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Solve `expr = 0` for `var`
///
/// ```
/// use storymath::{parse, solve_zero};
///
/// let points = solve_zero(&parse("60 - 4x", "x").unwrap(), "x");
/// assert_eq!(points.to_string(), "[15]");
/// ```
pub fn solve_zero(expr: &Expr, var: &str) -> CriticalPointSet {
    solve_zero_bounded(expr, var, DEFAULT_ROOT_BOUND)
}

pub(crate) fn solve_zero_bounded(expr: &Expr, var: &str, root_bound: u64) -> CriticalPointSet {
    let solver = EquationSolver { var, root_bound };
    let found = solver.solve(expr, 0);
    let points = order_points(found.roots);
    if found.complete {
        log::debug!("solved {expr} = 0: {} point(s)", points.len());
    } else {
        log::debug!("no closed form for part of {expr} = 0: {} point(s) found", points.len());
    }
    CriticalPointSet {
        points,
        exhaustive: found.complete,
    }
}

/// Real points ascending, then non-real ones; duplicates dropped
fn order_points(candidates: Vec<Expr>) -> Vec<Expr> {
    let mut real: Vec<(f64, Expr)> = Vec::new();
    let mut complex: Vec<Expr> = Vec::new();
    for c in candidates {
        match real_value(&c) {
            Some(v) => {
                let duplicate = real
                    .iter()
                    .any(|(w, e)| *e == c || (v - w).abs() <= FLOAT_TOLERANCE * v.abs().max(1.0));
                if !duplicate {
                    real.push((v, c));
                }
            }
            None => {
                if !complex.contains(&c) {
                    complex.push(c);
                }
            }
        }
    }
    real.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    complex.sort_by(expr_cmp);
    real.into_iter().map(|(_, e)| e).chain(complex).collect()
}

pub(crate) fn real_value(e: &Expr) -> Option<f64> {
    if !e.is_real_constant() {
        return None;
    }
    e.eval_constant().ok().filter(|v| v.is_finite())
}

// =============================================================================
// SOLVER
// =============================================================================

/// Solutions found so far, and whether nothing was given up on
#[derive(Debug, Default)]
struct Found {
    roots: Vec<Expr>,
    complete: bool,
}

impl Found {
    fn all(roots: Vec<Expr>) -> Self {
        Found { roots, complete: true }
    }

    fn give_up() -> Self {
        Found::default()
    }

    fn absorb(&mut self, other: Found) {
        self.roots.extend(other.roots);
        self.complete &= other.complete;
    }
}

struct EquationSolver<'a> {
    var: &'a str,
    root_bound: u64,
}

impl EquationSolver<'_> {
    fn solve(&self, expr: &Expr, depth: usize) -> Found {
        if depth > MAX_SOLVE_DEPTH {
            log::debug!("solver depth limit reached at {expr}");
            return Found::give_up();
        }
        if !expr.contains_var(self.var) {
            // Constant, or identically zero: no isolated points
            return Found::all(Vec::new());
        }

        let (numerator, denominator) = together(expr);
        let numerator = expand(&numerator);
        let mut found = self.solve_numerator(&numerator, depth);
        found.roots.retain(|c| !self.vanishes(&denominator, c));
        found
    }

    fn vanishes(&self, expr: &Expr, point: &Expr) -> bool {
        if !expr.contains_var(self.var) {
            return expr.is_zero();
        }
        let value = expr.substitute(self.var, point);
        value.is_zero() || value.eval_constant().is_ok_and(is_zero_f64)
    }

    fn solve_numerator(&self, numerator: &Expr, depth: usize) -> Found {
        if let Some(p) = Polynomial::try_from_expr(numerator, self.var) {
            log::trace!("polynomial strategy on {numerator}");
            let (roots, complete) = closed_form_roots(&p, self.root_bound);
            return Found { roots, complete };
        }

        match numerator.kind() {
            ExprKind::Product(factors) => {
                log::trace!("zero-product strategy on {numerator}");
                self.solve_factors(factors.iter().map(|f| f.as_ref().clone()), depth)
            }
            ExprKind::Sum(terms) => {
                if let Some((common, cofactor)) = self.common_factor(terms) {
                    log::trace!("factored {common} out of {numerator}");
                    return self.solve_factors([common, cofactor].into_iter(), depth);
                }
                self.isolate(numerator, depth)
            }
            _ => self.isolate(numerator, depth),
        }
    }

    /// Union over the factors; one unsolved factor keeps the others' roots
    fn solve_factors(&self, factors: impl Iterator<Item = Expr>, depth: usize) -> Found {
        let mut found = Found::all(Vec::new());
        for f in factors.filter(|f| f.contains_var(self.var)) {
            found.absorb(self.solve(&f, depth + 1));
        }
        found
    }

    /// A non-numeric factor shared by every term, and the sum divided by it
    fn common_factor(&self, terms: &[Arc<Expr>]) -> Option<(Expr, Expr)> {
        fn factors_of(term: &Expr) -> Vec<Expr> {
            match term.kind() {
                ExprKind::Product(fs) => fs
                    .iter()
                    .filter(|f| f.as_number().is_none())
                    .map(|f| f.as_ref().clone())
                    .collect(),
                _ => vec![term.clone()],
            }
        }

        let first = terms.first()?;
        let common = factors_of(first).into_iter().find(|candidate| {
            candidate.contains_var(self.var)
                && terms[1..].iter().all(|t| factors_of(t).contains(candidate))
        })?;
        let cofactor = Expr::sum(
            terms
                .iter()
                .map(|t| Expr::div_expr(t.as_ref().clone(), common.clone()))
                .collect(),
        );
        Some((common, cofactor))
    }

    /// `c + k*g(u) = 0` with exactly one term depending on the variable
    fn isolate(&self, expr: &Expr, depth: usize) -> Found {
        let terms: Vec<Expr> = match expr.kind() {
            ExprKind::Sum(ts) => ts.iter().map(|t| t.as_ref().clone()).collect(),
            _ => vec![expr.clone()],
        };
        let (dependent, constant): (Vec<Expr>, Vec<Expr>) =
            terms.into_iter().partition(|t| t.contains_var(self.var));
        let [term] = dependent.as_slice() else {
            log::trace!("cannot isolate a single term in {expr}");
            return Found::give_up();
        };

        let (k, g) = match term.kind() {
            ExprKind::Product(fs) => {
                let (dep, free): (Vec<Expr>, Vec<Expr>) = fs
                    .iter()
                    .map(|f| f.as_ref().clone())
                    .partition(|f| f.contains_var(self.var));
                (Expr::product(free), Expr::product(dep))
            }
            _ => (Expr::one(), term.clone()),
        };
        // g = -c / k
        let rhs = Expr::div_expr(Expr::sum(constant).negate(), k);
        log::trace!("isolating {g} = {rhs}");
        if g.is_symbol(self.var) {
            return Found::all(vec![rhs]);
        }

        let Some(inner_values) = self.invert(&g, &rhs) else {
            return Found::give_up();
        };
        let inner = match g.kind() {
            ExprKind::Call(_, u) => u.as_ref().clone(),
            ExprKind::Pow(b, e) if e.contains_var(self.var) && !b.contains_var(self.var) => e.as_ref().clone(),
            ExprKind::Pow(b, _) => b.as_ref().clone(),
            _ => return Found::give_up(),
        };

        let mut found = Found::all(Vec::new());
        for v in inner_values {
            found.absorb(self.solve(&Expr::sub_expr(inner.clone(), v), depth + 1));
        }
        found
    }

    /// Values `u` with `g(u) = rhs`, principal branches only
    fn invert(&self, g: &Expr, rhs: &Expr) -> Option<Vec<Expr>> {
        let r = real_value(rhs);
        let nonneg = r.is_some_and(|v| v >= 0.0);
        let within = |lo: f64, hi: f64| r.is_some_and(|v| v >= lo - FLOAT_TOLERANCE && v <= hi + FLOAT_TOLERANCE);
        let pi = Expr::pi;
        let recip = || Expr::pow(rhs.clone(), Expr::integer(-1));
        let call = |f: Func, arg: Expr| Expr::call(f, arg);

        match g.kind() {
            ExprKind::Call(func, _) => Some(match func {
                Func::Exp => {
                    if r.is_some_and(|v| v <= 0.0) || rhs.is_syntactically_complex() {
                        Vec::new()
                    } else {
                        vec![call(Func::Ln, rhs.clone())]
                    }
                }
                Func::Ln => vec![call(Func::Exp, rhs.clone())],
                Func::Sin | Func::Csc => {
                    let s = if *func == Func::Sin { rhs.clone() } else { recip() };
                    if !real_value(&s).is_some_and(|v| v.abs() <= 1.0 + FLOAT_TOLERANCE) {
                        return Some(Vec::new());
                    }
                    let a = call(Func::Asin, s);
                    vec![a.clone(), Expr::sub_expr(pi(), a)]
                }
                Func::Cos | Func::Sec => {
                    let c = if *func == Func::Cos { rhs.clone() } else { recip() };
                    if !real_value(&c).is_some_and(|v| v.abs() <= 1.0 + FLOAT_TOLERANCE) {
                        return Some(Vec::new());
                    }
                    let a = call(Func::Acos, c);
                    vec![a.clone(), Expr::sub_expr(Expr::mul_expr(Expr::integer(2), pi()), a)]
                }
                Func::Tan => vec![call(Func::Atan, rhs.clone())],
                Func::Cot => {
                    if rhs.is_zero() {
                        vec![Expr::mul_expr(Expr::rational(1, 2), pi())]
                    } else {
                        vec![call(Func::Atan, recip())]
                    }
                }
                Func::Asin if within(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2) => {
                    vec![call(Func::Sin, rhs.clone())]
                }
                Func::Acos if within(0.0, std::f64::consts::PI) => vec![call(Func::Cos, rhs.clone())],
                Func::Atan
                    if r.is_some_and(|v| v.abs() < std::f64::consts::FRAC_PI_2 - FLOAT_TOLERANCE) =>
                {
                    vec![call(Func::Tan, rhs.clone())]
                }
                Func::Asin | Func::Acos | Func::Atan => Vec::new(),
                Func::Sinh => {
                    // asinh(r) = ln(r + sqrt(r^2 + 1))
                    let root = Expr::add_expr(rhs.clone().powi(2), Expr::one()).sqrt();
                    vec![call(Func::Ln, Expr::add_expr(rhs.clone(), root))]
                }
                Func::Tanh if r.is_some_and(|v| v.abs() < 1.0) => {
                    // atanh(r) = ln((1 + r)/(1 - r)) / 2
                    let quotient = Expr::div_expr(
                        Expr::add_expr(Expr::one(), rhs.clone()),
                        Expr::sub_expr(Expr::one(), rhs.clone()),
                    );
                    vec![Expr::mul_expr(Expr::rational(1, 2), call(Func::Ln, quotient))]
                }
                Func::Tanh => Vec::new(),
                Func::Cosh if r.is_some_and(|v| v >= 1.0) => {
                    let root = Expr::sub_expr(rhs.clone().powi(2), Expr::one()).sqrt();
                    let a = call(Func::Ln, Expr::add_expr(rhs.clone(), root));
                    vec![a.clone().negate(), a]
                }
                Func::Cosh => Vec::new(),
                Func::Abs if nonneg => vec![rhs.clone().negate(), rhs.clone()],
                Func::Abs => Vec::new(),
            }),

            // Constant base: a^v = r  =>  v = ln(r)/ln(a)
            ExprKind::Pow(base, exponent) if exponent.contains_var(self.var) => {
                if base.contains_var(self.var) {
                    return None;
                }
                if !r.is_some_and(|v| v > 0.0) {
                    return Some(Vec::new());
                }
                let ln_a = call(Func::Ln, base.as_ref().clone());
                Some(vec![Expr::div_expr(call(Func::Ln, rhs.clone()), ln_a)])
            }

            // u^(p/q) = r  =>  u = r^(q/p), both signs for even p
            ExprKind::Pow(_, exponent) => {
                let e = exponent.as_number()?;
                if rhs.is_zero() {
                    return Some(if e.is_positive() { vec![Expr::zero()] } else { Vec::new() });
                }
                let even_root = !e.denom().is_one() && e.denom().is_even();
                if even_root && !nonneg {
                    return Some(Vec::new());
                }
                let value = Expr::pow(rhs.clone(), Expr::number(e.recip()));
                let even_power = e.numer().is_even();
                Some(if even_power {
                    vec![value.clone().negate(), value]
                } else {
                    vec![value]
                })
            }

            _ => None,
        }
    }
}
