//! Univariate polynomials with exact rational coefficients
//!
//! Used by the critical point solver once a numerator has been expanded:
//! `c0 + c1*x + ... + cn*x^n` is stored as `[c0, c1, ..., cn]`.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::expr::{Expr, ExprKind};
use crate::functions::Func;
use crate::traits::{Rational, as_small_int, denominator_lcm, divisors};

/// Highest degree accepted when reading a polynomial out of an expression
const MAX_DEGREE: i64 = 64;

// =============================================================================
// POLYNOMIAL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Polynomial {
    coeffs: Vec<Rational>,
}

impl Polynomial {
    pub(crate) fn from_coeffs(mut coeffs: Vec<Rational>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Polynomial { coeffs }
    }

    /// Read an expanded expression as a polynomial in `var`
    pub(crate) fn try_from_expr(expr: &Expr, var: &str) -> Option<Self> {
        let terms: Vec<&Expr> = match expr.kind() {
            ExprKind::Sum(terms) => terms.iter().map(|t| t.as_ref()).collect(),
            _ => vec![expr],
        };
        let mut coeffs: Vec<Rational> = Vec::new();
        for t in terms {
            let (c, k) = monomial(t, var)?;
            if coeffs.len() <= k {
                coeffs.resize(k + 1, Rational::zero());
            }
            coeffs[k] += c;
        }
        Some(Polynomial::from_coeffs(coeffs))
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub(crate) fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub(crate) fn coeff(&self, k: usize) -> Rational {
        self.coeffs.get(k).cloned().unwrap_or_else(Rational::zero)
    }

    /// Evaluate exactly with Horner's scheme
    pub(crate) fn eval(&self, x: &Rational) -> Rational {
        self.coeffs
            .iter()
            .rev()
            .fold(Rational::zero(), |acc, c| acc * x + c)
    }

    /// Divide by `(x - root)`, dropping the remainder
    pub(crate) fn deflate(&self, root: &Rational) -> Polynomial {
        let n = self.coeffs.len();
        if n <= 1 {
            return Polynomial::from_coeffs(Vec::new());
        }
        let mut quotient = vec![Rational::zero(); n - 1];
        let mut carry = Rational::zero();
        for k in (1..n).rev() {
            carry = &self.coeffs[k] + carry * root;
            quotient[k - 1] = carry.clone();
        }
        Polynomial::from_coeffs(quotient)
    }

    /// Multiplicity of the root `0`
    pub(crate) fn zero_root_order(&self) -> usize {
        self.coeffs.iter().take_while(|c| c.is_zero()).count()
    }

    /// Divide by `x^k`
    pub(crate) fn shift_down(&self, k: usize) -> Polynomial {
        Polynomial::from_coeffs(self.coeffs.iter().skip(k).cloned().collect())
    }

    /// `q` with `self(x) = q(x^2)`, when every odd coefficient is zero
    pub(crate) fn in_square(&self) -> Option<Polynomial> {
        let odd_free = self.coeffs.iter().skip(1).step_by(2).all(|c| c.is_zero());
        odd_free.then(|| Polynomial::from_coeffs(self.coeffs.iter().step_by(2).cloned().collect()))
    }

    /// `w` with `self = a*(x^n - w)`, when only the end coefficients are nonzero
    pub(crate) fn binomial_value(&self) -> Option<Rational> {
        let n = self.degree();
        let (first, last) = (self.coeffs.first()?, self.coeffs.last()?);
        if n == 0 || first.is_zero() || self.coeffs[1..n].iter().any(|c| !c.is_zero()) {
            return None;
        }
        Some(-first / last)
    }

    /// Rational roots by the rational root theorem, ascending, each listed once.
    /// The search is skipped when either end coefficient has no divisors within `bound`.
    pub(crate) fn rational_roots(&self, bound: u64) -> Vec<Rational> {
        if self.degree() == 0 {
            return Vec::new();
        }
        let scale = Rational::from_integer(denominator_lcm(&self.coeffs));
        let ints: Vec<BigInt> = self.coeffs.iter().map(|c| (c * &scale).to_integer()).collect();

        let (Some(ps), Some(qs)) = (
            ints.first().and_then(|a0| divisors(a0, bound)),
            ints.last().and_then(|an| divisors(an, bound)),
        ) else {
            log::debug!("rational root search skipped: coefficients outside bound {bound}");
            return Vec::new();
        };

        let mut candidates: Vec<Rational> = Vec::with_capacity(ps.len() * qs.len() * 2);
        for p in &ps {
            for q in &qs {
                let r = Rational::new(p.clone(), q.clone());
                candidates.push(-r.clone());
                candidates.push(r);
            }
        }
        candidates.sort();
        candidates.dedup();
        candidates.retain(|r| self.eval(r).is_zero());
        candidates
    }

    pub(crate) fn to_expr(&self, var: &str) -> Expr {
        let x = Expr::symbol(var);
        Expr::sum(
            self.coeffs
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_zero())
                .map(|(k, c)| {
                    Expr::mul_expr(Expr::number(c.clone()), Expr::pow(x.clone(), Expr::integer(k as i64)))
                })
                .collect(),
        )
    }
}

/// `c * var^k` for a single term
fn monomial(term: &Expr, var: &str) -> Option<(Rational, usize)> {
    fn power(e: &Expr, var: &str) -> Option<usize> {
        match e.kind() {
            ExprKind::Symbol(s) if s.as_ref() == var => Some(1),
            ExprKind::Pow(b, k) if b.is_symbol(var) => {
                let k = k.as_number().and_then(as_small_int)?;
                (1..=MAX_DEGREE).contains(&k).then_some(k as usize)
            }
            _ => None,
        }
    }

    match term.kind() {
        ExprKind::Number(n) => Some((n.clone(), 0)),
        ExprKind::Product(factors) => match factors.as_slice() {
            [c, rest] => Some((c.as_number()?.clone(), power(rest, var)?)),
            _ => None,
        },
        _ => Some((Rational::one(), power(term, var)?)),
    }
}

// =============================================================================
// ROOTS
// =============================================================================

/// Roots of `a*x^2 + b*x + c`, one entry for a double root
fn quadratic_roots(a: &Rational, b: &Rational, c: &Rational) -> Vec<Expr> {
    let two_a = Expr::number(a * Rational::from_integer(BigInt::from(2)));
    let disc = b * b - Rational::from_integer(BigInt::from(4)) * a * c;
    let minus_b = Expr::number(-b);
    if disc.is_zero() {
        return vec![Expr::div_expr(minus_b, two_a)];
    }
    let root = Expr::number(disc).sqrt();
    vec![
        Expr::div_expr(Expr::sub_expr(minus_b.clone(), root.clone()), two_a.clone()),
        Expr::div_expr(Expr::add_expr(minus_b, root), two_a),
    ]
}

/// Roots of `p` in closed form, and whether they are all of them
///
/// Rational roots are deflated out first. A remainder of degree three or
/// more is solved when it is a binomial `a*x^n + c` or quadratic in `x^2`;
/// otherwise the roots found so far are returned with the flag cleared.
pub(crate) fn closed_form_roots(p: &Polynomial, bound: u64) -> (Vec<Expr>, bool) {
    let mut roots = Vec::new();
    if p.is_zero() {
        return (roots, true);
    }

    let mut rest = p.clone();
    let zeros = rest.zero_root_order();
    if zeros > 0 {
        roots.push(Expr::zero());
        rest = rest.shift_down(zeros);
    }

    if rest.degree() < 3 || rest.binomial_value().is_none() {
        for r in rest.clone().rational_roots(bound) {
            while rest.degree() > 0 && rest.eval(&r).is_zero() {
                rest = rest.deflate(&r);
            }
            roots.push(Expr::number(r));
        }
    }

    let complete = match rest.degree() {
        0 => true,
        1 => {
            roots.push(Expr::number(-rest.coeff(0) / rest.coeff(1)));
            true
        }
        2 => {
            roots.extend(quadratic_roots(&rest.coeff(2), &rest.coeff(1), &rest.coeff(0)));
            true
        }
        d => {
            if let Some(w) = rest.binomial_value() {
                let (found, complete) = binomial_roots(d, &w);
                roots.extend(found);
                complete
            } else if let Some(q) = (d == 4).then(|| rest.in_square()).flatten() {
                for y in quadratic_roots(&q.coeff(2), &q.coeff(1), &q.coeff(0)) {
                    let r = y.sqrt();
                    roots.push(r.clone().negate());
                    roots.push(r);
                }
                true
            } else {
                log::debug!("no closed form for degree {d} remainder {}", rest.to_expr("x"));
                false
            }
        }
    };
    (roots, complete)
}

/// Binomials above this degree only have their real roots listed
const MAX_BINOMIAL_DEGREE: usize = 12;

/// Roots of `x^n = w` for nonzero `w`
///
/// `|w|^(1/n)` times `exp(I*pi*(2k + s)/n)`, with `s = 1` when `w` is
/// negative. Real roots come out as plain radicals.
fn binomial_roots(n: usize, w: &Rational) -> (Vec<Expr>, bool) {
    let index = BigInt::from(n);
    let modulus = Expr::pow(
        Expr::number(w.abs()),
        Expr::number(Rational::new(BigInt::one(), index.clone())),
    );
    let shift = usize::from(w.is_negative());
    let complete = n <= MAX_BINOMIAL_DEGREE;

    let mut roots = Vec::new();
    for k in 0..n {
        let turn = Rational::new(BigInt::from(2 * k + shift), index.clone());
        if turn.is_zero() {
            roots.push(modulus.clone());
        } else if turn.is_one() {
            roots.push(modulus.clone().negate());
        } else if complete {
            let angle = Expr::mul_expr(Expr::number(turn), Expr::pi());
            let re = Expr::mul_expr(modulus.clone(), Expr::call(Func::Cos, angle.clone()));
            let im = Expr::product(vec![
                Expr::imaginary_unit(),
                modulus.clone(),
                Expr::call(Func::Sin, angle),
            ]);
            roots.push(Expr::add_expr(re, im));
        }
    }
    (roots, complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::traits::{int, ratio};

    fn poly(input: &str) -> Polynomial {
        Polynomial::try_from_expr(&parse(input, "x").unwrap(), "x").unwrap()
    }

    fn roots(input: &str) -> Option<Vec<String>> {
        let (rs, complete) = closed_form_roots(&poly(input), 10_000);
        complete.then(|| rs.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn test_read_coefficients() {
        let p = poly("3x^2 + 5x - 7");
        assert_eq!(p.degree(), 2);
        assert_eq!(p.coeff(0), int(-7));
        assert_eq!(p.coeff(2), int(3));
        assert!(Polynomial::try_from_expr(&parse("sin(x)", "x").unwrap(), "x").is_none());
        assert!(Polynomial::try_from_expr(&parse("sqrt(x)", "x").unwrap(), "x").is_none());
    }

    #[test]
    fn test_eval_and_deflate() {
        let p = poly("x^2 - 3x + 2");
        assert!(p.eval(&int(1)).is_zero());
        assert_eq!(p.deflate(&int(1)), poly("x - 2"));
    }

    #[test]
    fn test_rational_roots() {
        assert_eq!(poly("6x^2 - 5x + 1").rational_roots(1000), vec![ratio(1, 3), ratio(1, 2)]);
        assert!(poly("x^2 - 2").rational_roots(1000).is_empty());
    }

    #[test]
    fn test_closed_forms() {
        assert_eq!(roots("60 - 4x"), Some(vec!["15".to_string()]));
        assert_eq!(roots("x^2"), Some(vec!["0".to_string()]));
        assert_eq!(
            roots("x^2 - 2"),
            Some(vec!["-sqrt(2)".to_string(), "sqrt(2)".to_string()])
        );
        assert_eq!(roots("x^2 + 1"), Some(vec!["-I".to_string(), "I".to_string()]));
        assert_eq!(roots("7"), Some(vec![]));
    }

    #[test]
    fn test_biquadratic() {
        let rs = roots("x^4 - 5x^2 + 6").unwrap();
        assert_eq!(rs.len(), 4);
        assert!(rs.contains(&"sqrt(2)".to_string()));
        assert!(rs.contains(&"-sqrt(3)".to_string()));
    }

    #[test]
    fn test_irreducible_cubic_has_no_closed_form() {
        assert_eq!(roots("x^3 - 3x + 1"), None);
    }

    #[test]
    fn test_rational_roots_kept_beside_unsolved_remainder() {
        // (x - 2)(x^3 - 3x + 1)
        let (rs, complete) = closed_form_roots(&poly("x^4 - 2x^3 - 3x^2 + 7x - 2"), 10_000);
        assert!(!complete);
        assert_eq!(rs, vec![Expr::integer(2)]);

        // x^5 - 32 = (x - 2)(x^4 + 2x^3 + 4x^2 + 8x + 16)
        let (rs, complete) = closed_form_roots(&poly("x^5 - 32"), 10_000);
        assert!(complete);
        assert_eq!(rs.len(), 5);
        assert_eq!(rs[0], Expr::integer(2));
        assert!(rs[1..].iter().all(Expr::is_syntactically_complex));
    }

    #[test]
    fn test_binomials() {
        assert_eq!(poly("12 - 4x^3").binomial_value(), Some(int(3)));
        assert_eq!(poly("x^3 - 3x + 1").binomial_value(), None);

        let rs = roots("12 - 4x^3").unwrap();
        assert_eq!(rs.len(), 3);
        assert_eq!(rs[0], "cbrt(3)");

        // x^4 = -16 has no real root
        let (rs, complete) = closed_form_roots(&poly("x^4 + 16"), 10_000);
        assert!(complete);
        assert_eq!(rs.len(), 4);
        assert!(rs.iter().all(Expr::is_syntactically_complex));

        // Odd degree, negative value: the real root is negated
        let rs = roots("x^3 + 2").unwrap();
        assert_eq!(rs[1], "-cbrt(2)");
    }

    #[test]
    fn test_high_degree_binomial_lists_real_roots() {
        let (rs, complete) = closed_form_roots(&poly("x^14 - 3"), 10_000);
        assert!(!complete);
        assert_eq!(rs.len(), 2);
        assert!(rs.iter().all(|r| !r.is_syntactically_complex()));
    }

    #[test]
    fn test_to_expr_roundtrip() {
        let p = poly("1 + 2x + x^2");
        assert_eq!(p.to_expr("x"), parse("(x+1)^2", "x").map(|e| crate::simplification::expand(&e)).unwrap());
    }
}
