//! Exact values of elementary functions at special arguments
//!
//! Applied by `Expr::call`, so `sin(pi)` is built as `0` and `ln(exp(u))` as `u`.

use num_traits::{One, Signed, Zero};

use super::Func;
use crate::expr::{Constant, Expr, ExprKind};
use crate::traits::{Rational, int, ratio};

/// `k` such that `arg = k*pi`
fn pi_multiple(arg: &Expr) -> Option<Rational> {
    match arg.kind() {
        ExprKind::Number(n) if n.is_zero() => Some(Rational::zero()),
        ExprKind::Constant(Constant::Pi) => Some(Rational::one()),
        ExprKind::Product(factors) if factors.len() == 2 => {
            let k = factors[0].as_number()?;
            matches!(factors[1].kind(), ExprKind::Constant(Constant::Pi)).then(|| k.clone())
        }
        _ => None,
    }
}

fn pi_times(k: Rational) -> Expr {
    Expr::product(vec![Expr::number(k), Expr::pi()])
}

/// `sin(k*pi)` for `k` a multiple of 1/6 or 1/4
fn sin_of_pi_multiple(k: &Rational) -> Option<Expr> {
    let two = int(2);
    let mut t = k % &two;
    if t.is_negative() {
        t += &two;
    }
    let mut negative = false;
    if t >= Rational::one() {
        t -= Rational::one();
        negative = true;
    }
    if t > ratio(1, 2) {
        t = Rational::one() - t;
    }

    let value = if t.is_zero() {
        Expr::zero()
    } else if t == ratio(1, 6) {
        Expr::rational(1, 2)
    } else if t == ratio(1, 4) {
        Expr::mul_expr(Expr::rational(1, 2), Expr::integer(2).sqrt())
    } else if t == ratio(1, 3) {
        Expr::mul_expr(Expr::rational(1, 2), Expr::integer(3).sqrt())
    } else if t == ratio(1, 2) {
        Expr::one()
    } else {
        return None;
    };
    Some(if negative { value.negate() } else { value })
}

fn cos_of_pi_multiple(k: &Rational) -> Option<Expr> {
    sin_of_pi_multiple(&(k + ratio(1, 2)))
}

fn is_odd(func: Func) -> bool {
    matches!(
        func,
        Func::Sin | Func::Tan | Func::Cot | Func::Csc | Func::Asin | Func::Atan | Func::Sinh | Func::Tanh
    )
}

fn is_even(func: Func) -> bool {
    matches!(func, Func::Cos | Func::Sec | Func::Cosh | Func::Abs)
}

impl Func {
    /// Exact simplification of `self(arg)`, if one applies
    pub(crate) fn exact_value(self, arg: &Expr) -> Option<Expr> {
        if arg.is_negative_term() && (is_odd(self) || is_even(self)) {
            let flipped = Expr::call(self, arg.clone().negate());
            return Some(if is_odd(self) { flipped.negate() } else { flipped });
        }

        let number = arg.as_number();
        match self {
            Func::Sin => sin_of_pi_multiple(&pi_multiple(arg)?),
            Func::Cos => cos_of_pi_multiple(&pi_multiple(arg)?),
            Func::Tan | Func::Cot | Func::Sec | Func::Csc => {
                let k = pi_multiple(arg)?;
                let s = sin_of_pi_multiple(&k)?;
                let c = cos_of_pi_multiple(&k)?;
                let (num, den) = match self {
                    Func::Tan => (s, c),
                    Func::Cot => (c, s),
                    Func::Sec => (Expr::one(), c),
                    _ => (Expr::one(), s),
                };
                // Poles stay symbolic
                (!den.is_zero()).then(|| Expr::div_expr(num, den))
            }
            Func::Asin => {
                let n = number?;
                if n.is_zero() {
                    Some(Expr::zero())
                } else if *n == ratio(1, 2) {
                    Some(pi_times(ratio(1, 6)))
                } else if n.is_one() {
                    Some(pi_times(ratio(1, 2)))
                } else {
                    None
                }
            }
            Func::Acos => {
                let n = number?;
                let k = if n.is_one() {
                    Rational::zero()
                } else if *n == ratio(1, 2) {
                    ratio(1, 3)
                } else if n.is_zero() {
                    ratio(1, 2)
                } else if *n == ratio(-1, 2) {
                    ratio(2, 3)
                } else if *n == int(-1) {
                    Rational::one()
                } else {
                    return None;
                };
                Some(pi_times(k))
            }
            Func::Atan => {
                let n = number?;
                if n.is_zero() {
                    Some(Expr::zero())
                } else if n.is_one() {
                    Some(pi_times(ratio(1, 4)))
                } else {
                    None
                }
            }
            Func::Sinh | Func::Tanh => number.filter(|n| n.is_zero()).map(|_| Expr::zero()),
            Func::Cosh => number.filter(|n| n.is_zero()).map(|_| Expr::one()),
            Func::Exp => match arg.kind() {
                ExprKind::Number(n) if n.is_zero() => Some(Expr::one()),
                ExprKind::Number(n) if n.is_one() => Some(Expr::constant(Constant::E)),
                ExprKind::Call(Func::Ln, u) => Some(u.as_ref().clone()),
                _ => None,
            },
            Func::Ln => match arg.kind() {
                ExprKind::Number(n) if n.is_one() => Some(Expr::zero()),
                ExprKind::Constant(Constant::E) => Some(Expr::one()),
                ExprKind::Call(Func::Exp, u) => Some(u.as_ref().clone()),
                _ => None,
            },
            Func::Abs => match arg.kind() {
                ExprKind::Number(n) => Some(Expr::number(n.abs())),
                ExprKind::Constant(Constant::Pi | Constant::E)
                | ExprKind::Call(Func::Exp | Func::Abs, _) => Some(arg.clone()),
                ExprKind::Pow(_, e) if e.as_number().is_some_and(|n| n.is_integer() && (n % int(2)).is_zero()) => {
                    Some(arg.clone())
                }
                _ => None,
            },
        }
    }
}
