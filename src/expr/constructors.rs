//! Canonical constructors
//!
//! `sum`, `product`, `pow` and `call` are the only way composite nodes get
//! built. They flatten, fold exact numbers, combine like terms and like bases,
//! and sort with [`expr_cmp`], which keeps the tree unique for a given value shape.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;

use super::{Constant, Expr, ExprKind, expr_cmp};
use crate::functions::Func;
use crate::traits::{self, Rational};

/// Upper bound on re-merge passes when a power folds into a new product
const MAX_MERGE_PASSES: usize = 16;

/// Largest root index folded exactly (`x^(1/q)`)
const MAX_ROOT_INDEX: u32 = 64;

fn raw_pow(base: Expr, exponent: Expr) -> Expr {
    Expr::new(ExprKind::Pow(Arc::new(base), Arc::new(exponent)))
}

/// `c * rest` where `rest` is already canonical and carries no coefficient
fn scaled(c: Rational, rest: Expr) -> Expr {
    if c.is_zero() {
        return Expr::zero();
    }
    if c.is_one() {
        return rest;
    }
    match rest.kind() {
        ExprKind::Number(n) => Expr::number(c * n),
        ExprKind::Product(factors) if factors.first().is_some_and(|f| f.as_number().is_none()) => {
            let mut out = Vec::with_capacity(factors.len() + 1);
            out.push(Arc::new(Expr::number(c)));
            out.extend(factors.iter().cloned());
            Expr::new(ExprKind::Product(out))
        }
        ExprKind::Product(_) | ExprKind::Sum(_) => Expr::product(vec![Expr::number(c), rest]),
        _ => Expr::new(ExprKind::Product(vec![
            Arc::new(Expr::number(c)),
            Arc::new(rest),
        ])),
    }
}

/// Factor viewed as `base^exponent` for merging; `exp(u)` merges as `e^u`
fn base_and_exponent(factor: &Expr) -> (Expr, Expr) {
    match factor.kind() {
        ExprKind::Pow(b, e) => (b.as_ref().clone(), e.as_ref().clone()),
        ExprKind::Call(Func::Exp, u) => (Expr::constant(Constant::E), u.as_ref().clone()),
        _ => (factor.clone(), Expr::one()),
    }
}

fn imaginary_power(n: &BigInt) -> Expr {
    let r: BigInt = ((n % 4) + 4) % 4;
    match r.to_u8() {
        Some(0) => Expr::one(),
        Some(1) => Expr::imaginary_unit(),
        Some(2) => Expr::integer(-1),
        _ => Expr::new(ExprKind::Product(vec![
            Arc::new(Expr::integer(-1)),
            Arc::new(Expr::imaginary_unit()),
        ])),
    }
}

/// Fold `b^e` for rational `b` and `e`, pulling perfect powers out of roots.
/// `None` leaves the power unevaluated.
fn numeric_pow(b: &Rational, e: &Rational) -> Option<Expr> {
    if e.is_integer() {
        let exp = e.numer().to_i64()?;
        return traits::pow_int(b, exp).map(Expr::number);
    }
    if b.is_zero() {
        return e.is_positive().then(Expr::zero);
    }
    if b.is_one() {
        return Some(Expr::one());
    }

    let p = e.numer().to_i64()?;
    let q = e.denom().to_u32()?;
    if q > MAX_ROOT_INDEX || p.unsigned_abs() > u64::from(traits::MAX_EXACT_EXPONENT) {
        return None;
    }

    if b.is_negative() {
        let magnitude = numeric_pow(&-b, e)
            .unwrap_or_else(|| raw_pow(Expr::number(-b), Expr::number(e.clone())));
        return if q % 2 == 1 {
            // Real odd root
            let odd = p.rem_euclid(2) == 1;
            Some(if odd {
                Expr::product(vec![Expr::integer(-1), magnitude])
            } else {
                magnitude
            })
        } else if q == 2 {
            Some(Expr::product(vec![imaginary_power(&BigInt::from(p)), magnitude]))
        } else {
            None
        };
    }

    let raised = traits::pow_int(b, p.abs())?;
    let (out_n, in_n) = traits::extract_root(raised.numer(), q);
    let (out_d, in_d) = traits::extract_root(raised.denom(), q);

    if p.abs() == 1 && out_n.is_one() && out_d.is_one() && in_d.is_one() {
        // Integer radicand with nothing to extract: already canonical
        return None;
    }

    let root = Rational::new(BigInt::one(), BigInt::from(q));
    let mut coeff = Rational::new(out_n, out_d);
    let (mut num_exp, mut den_exp) = (root.clone(), -root);
    if p < 0 {
        coeff = coeff.recip();
        std::mem::swap(&mut num_exp, &mut den_exp);
    }

    let mut factors = vec![Expr::number(coeff)];
    if !in_n.is_one() {
        factors.push(raw_pow(Expr::number(Rational::from_integer(in_n)), Expr::number(num_exp)));
    }
    if !in_d.is_one() {
        factors.push(raw_pow(Expr::number(Rational::from_integer(in_d)), Expr::number(den_exp)));
    }
    Some(Expr::product(factors))
}

impl Expr {
    // -------------------------------------------------------------------------
    // N-ary sum
    // -------------------------------------------------------------------------

    pub fn sum(terms: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(terms.len());
        for t in terms {
            if let ExprKind::Sum(inner) = t.kind() {
                flat.extend(inner.iter().map(|a| a.as_ref().clone()));
            } else {
                flat.push(t);
            }
        }

        let mut constant = Rational::zero();
        let mut like: Vec<(Expr, Rational)> = Vec::new();
        let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
        for t in flat {
            if let ExprKind::Number(n) = t.kind() {
                constant += n;
                continue;
            }
            let (c, rest) = t.coefficient_and_rest();
            match index.get(&rest) {
                Some(&i) => like[i].1 += c,
                None => {
                    index.insert(rest.clone(), like.len());
                    like.push((rest, c));
                }
            }
        }

        let mut out: Vec<Expr> = like
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(rest, c)| scaled(c, rest))
            .collect();
        out.sort_by(expr_cmp);

        match (out.len(), constant.is_zero()) {
            (0, _) => Expr::number(constant),
            (1, true) => out.pop().unwrap_or_else(Expr::zero),
            _ => {
                let mut items = Vec::with_capacity(out.len() + 1);
                if !constant.is_zero() {
                    items.push(Arc::new(Expr::number(constant)));
                }
                items.extend(out.into_iter().map(Arc::new));
                Expr::new(ExprKind::Sum(items))
            }
        }
    }

    // -------------------------------------------------------------------------
    // N-ary product
    // -------------------------------------------------------------------------

    pub fn product(factors: Vec<Expr>) -> Expr {
        let mut coeff = Rational::one();
        let mut pending = factors;
        let mut merged: Vec<Expr> = Vec::new();

        for pass in 0..MAX_MERGE_PASSES {
            let mut flat = Vec::with_capacity(pending.len());
            for f in pending.drain(..) {
                if let ExprKind::Product(inner) = f.kind() {
                    flat.extend(inner.iter().map(|a| a.as_ref().clone()));
                } else {
                    flat.push(f);
                }
            }

            let mut bases: Vec<(Expr, Vec<Expr>)> = Vec::new();
            let mut index: FxHashMap<Expr, usize> = FxHashMap::default();
            for f in flat.into_iter().chain(merged.drain(..)) {
                if let ExprKind::Number(n) = f.kind() {
                    coeff *= n;
                    continue;
                }
                let (base, exponent) = base_and_exponent(&f);
                match index.get(&base) {
                    Some(&i) => bases[i].1.push(exponent),
                    None => {
                        index.insert(base.clone(), bases.len());
                        bases.push((base, vec![exponent]));
                    }
                }
            }
            if coeff.is_zero() {
                return Expr::zero();
            }

            let mut changed = false;
            for (base, mut exponents) in bases {
                let exponent = if exponents.len() == 1 {
                    exponents.pop().unwrap_or_else(Expr::one)
                } else {
                    Expr::sum(exponents)
                };
                let power = Expr::pow(base, exponent);
                match power.kind() {
                    ExprKind::Number(n) => coeff *= n,
                    ExprKind::Product(_) => {
                        changed = true;
                        pending.push(power);
                    }
                    _ => merged.push(power),
                }
            }
            if coeff.is_zero() {
                return Expr::zero();
            }
            if !changed || pass + 1 == MAX_MERGE_PASSES {
                merged.extend(pending.drain(..));
                break;
            }
        }

        merged.sort_by(expr_cmp);

        if merged.is_empty() {
            return Expr::number(coeff);
        }
        if merged.len() == 1 {
            if coeff.is_one() {
                return merged.pop().unwrap_or_else(Expr::one);
            }
            if let ExprKind::Sum(terms) = merged[0].kind() {
                // Numeric coefficients distribute over a lone sum
                let distributed = terms
                    .iter()
                    .map(|t| {
                        let (c, rest) = t.coefficient_and_rest();
                        scaled(&coeff * c, rest)
                    })
                    .collect();
                return Expr::sum(distributed);
            }
        }

        let mut items = Vec::with_capacity(merged.len() + 1);
        if !coeff.is_one() {
            items.push(Arc::new(Expr::number(coeff)));
        }
        items.extend(merged.into_iter().map(Arc::new));
        Expr::new(ExprKind::Product(items))
    }

    // -------------------------------------------------------------------------
    // Power
    // -------------------------------------------------------------------------

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        if exponent.is_zero() {
            return Expr::one();
        }
        if exponent.is_one() {
            return base;
        }

        match (base.kind(), exponent.kind()) {
            (ExprKind::Number(b), ExprKind::Number(e)) => {
                if let Some(folded) = numeric_pow(b, e) {
                    return folded;
                }
            }
            (ExprKind::Number(b), _) if b.is_one() => return Expr::one(),
            (ExprKind::Constant(Constant::E), _) => return Expr::call(Func::Exp, exponent.clone()),
            (ExprKind::Constant(Constant::I), ExprKind::Number(e)) if e.is_integer() => {
                return imaginary_power(e.numer());
            }
            (ExprKind::Call(Func::Exp, u), ExprKind::Number(_)) => {
                return Expr::call(Func::Exp, Expr::product(vec![u.as_ref().clone(), exponent.clone()]));
            }
            (ExprKind::Pow(inner_base, inner_exp), ExprKind::Number(e)) if e.is_integer() => {
                let combined = Expr::product(vec![inner_exp.as_ref().clone(), exponent.clone()]);
                return Expr::pow(inner_base.as_ref().clone(), combined);
            }
            (ExprKind::Product(factors), ExprKind::Number(e)) if e.is_integer() => {
                return Expr::product(
                    factors
                        .iter()
                        .map(|f| Expr::pow(f.as_ref().clone(), exponent.clone()))
                        .collect(),
                );
            }
            _ => {}
        }
        raw_pow(base, exponent)
    }

    // -------------------------------------------------------------------------
    // Function application
    // -------------------------------------------------------------------------

    pub fn call(func: Func, arg: Expr) -> Expr {
        match func.exact_value(&arg) {
            Some(value) => value,
            None => Expr::new(ExprKind::Call(func, Arc::new(arg))),
        }
    }

    // -------------------------------------------------------------------------
    // Binary conveniences
    // -------------------------------------------------------------------------

    pub fn add_expr(left: Expr, right: Expr) -> Expr {
        Expr::sum(vec![left, right])
    }

    pub fn sub_expr(left: Expr, right: Expr) -> Expr {
        Expr::sum(vec![left, right.negate()])
    }

    pub fn mul_expr(left: Expr, right: Expr) -> Expr {
        Expr::product(vec![left, right])
    }

    pub fn div_expr(left: Expr, right: Expr) -> Expr {
        Expr::product(vec![left, Expr::pow(right, Expr::integer(-1))])
    }

    pub fn negate(self) -> Expr {
        Expr::product(vec![Expr::integer(-1), self])
    }

    pub fn sqrt(self) -> Expr {
        Expr::pow(self, Expr::rational(1, 2))
    }

    pub fn powi(self, n: i64) -> Expr {
        Expr::pow(self, Expr::integer(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn test_like_terms_combine() {
        let e = Expr::sum(vec![
            Expr::product(vec![Expr::integer(2), x()]),
            Expr::product(vec![Expr::integer(3), x()]),
            Expr::integer(4),
            Expr::integer(-4),
        ]);
        assert_eq!(e, Expr::product(vec![Expr::integer(5), x()]));
    }

    #[test]
    fn test_cancelling_terms_vanish() {
        let e = Expr::sub_expr(x(), x());
        assert!(e.is_zero());
    }

    #[test]
    fn test_like_bases_merge() {
        let e = Expr::mul_expr(x().powi(2), x().powi(3));
        assert_eq!(e, x().powi(5));
        let e = Expr::div_expr(x(), x());
        assert!(e.is_one());
    }

    #[test]
    fn test_exact_division() {
        let e = Expr::div_expr(Expr::integer(6), Expr::integer(4));
        assert_eq!(e, Expr::rational(3, 2));
    }

    #[test]
    fn test_root_extraction() {
        let e = Expr::integer(8).sqrt();
        let expected = Expr::product(vec![Expr::integer(2), Expr::integer(2).sqrt()]);
        assert_eq!(e, expected);
        assert_eq!(Expr::integer(144).sqrt(), Expr::integer(12));
        assert_eq!(Expr::rational(1, 4).sqrt(), Expr::rational(1, 2));
    }

    #[test]
    fn test_square_roots_multiply_back() {
        let r = Expr::integer(2).sqrt();
        assert_eq!(Expr::mul_expr(r.clone(), r), Expr::integer(2));
    }

    #[test]
    fn test_negative_square_root_is_imaginary() {
        let e = Expr::integer(-4).sqrt();
        assert_eq!(e, Expr::product(vec![Expr::integer(2), Expr::imaginary_unit()]));
        let i = Expr::imaginary_unit();
        assert_eq!(Expr::mul_expr(i.clone(), i), Expr::integer(-1));
    }

    #[test]
    fn test_integer_powers_of_i_cycle() {
        let i = Expr::imaginary_unit;
        let minus_i = Expr::product(vec![Expr::integer(-1), i()]);
        assert_eq!(Expr::pow(i(), Expr::integer(2)), Expr::integer(-1));
        assert_eq!(Expr::pow(i(), Expr::integer(3)), minus_i);
        assert_eq!(Expr::pow(i(), Expr::integer(4)), Expr::one());
        assert_eq!(Expr::pow(i(), Expr::integer(-1)), minus_i);
        assert_eq!(Expr::pow(i(), Expr::integer(-6)), Expr::integer(-1));
    }

    #[test]
    fn test_odd_root_of_negative_is_real() {
        let e = Expr::pow(Expr::integer(-8), Expr::rational(1, 3));
        assert_eq!(e, Expr::integer(-2));
    }

    #[test]
    fn test_coefficient_distributes_over_sum() {
        let s = Expr::sum(vec![x(), Expr::integer(1)]);
        let e = Expr::mul_expr(Expr::integer(2), s);
        let expected = Expr::sum(vec![Expr::integer(2), Expr::product(vec![Expr::integer(2), x()])]);
        assert_eq!(e, expected);
    }

    #[test]
    fn test_power_of_product_distributes() {
        let e = Expr::product(vec![Expr::integer(2), x()]).powi(2);
        assert_eq!(e, Expr::product(vec![Expr::integer(4), x().powi(2)]));
    }

    #[test]
    fn test_exponentials_merge() {
        let e = Expr::mul_expr(Expr::call(Func::Exp, x()), Expr::call(Func::Exp, x()));
        assert_eq!(e, Expr::call(Func::Exp, Expr::product(vec![Expr::integer(2), x()])));
        let e = Expr::div_expr(Expr::one(), Expr::call(Func::Exp, x()));
        assert_eq!(e, Expr::call(Func::Exp, x().negate()));
    }

    #[test]
    fn test_trivial_exponents() {
        assert_eq!(x().powi(1), x());
        assert!(x().powi(0).is_one());
        assert!(Expr::pow(Expr::one(), x()).is_one());
    }

    #[test]
    fn test_e_power_becomes_exp() {
        let e = Expr::pow(Expr::constant(Constant::E), x());
        assert_eq!(e, Expr::call(Func::Exp, x()));
    }
}
