//! Real-valued numeric evaluation
//!
//! Walks the tree in `f64`. A real-domain violation, an indeterminate `0/0`
//! or overflow from finite operands is an [`EvalError`]. Poles produce
//! `±inf` and non-finite operands propagate unchanged, so callers can tell a
//! vertical asymptote from an undefined point.

use num_integer::Integer;

use crate::error::EvalError;
use crate::expr::{Expr, ExprKind};
use crate::functions::Func;
use crate::traits::to_f64;

struct Evaluator<'a> {
    var: &'a str,
    value: f64,
}

fn overflowed(inputs_finite: bool, result: f64) -> bool {
    inputs_finite && !result.is_finite() && !result.is_nan()
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Result<f64, EvalError> {
        match expr.kind() {
            ExprKind::Number(n) => Ok(to_f64(n)),
            ExprKind::Constant(c) => c.value().ok_or(EvalError::NonReal),
            ExprKind::Symbol(name) => {
                if name.as_ref() == self.var {
                    Ok(self.value)
                } else {
                    Err(EvalError::UnboundSymbol {
                        name: name.to_string(),
                    })
                }
            }
            ExprKind::Call(func, arg) => self.eval_call(*func, arg),
            ExprKind::Sum(terms) => {
                let mut total = 0.0;
                let mut finite = true;
                for t in terms {
                    let v = self.eval(t)?;
                    finite &= v.is_finite();
                    total += v;
                }
                if overflowed(finite, total) {
                    return Err(EvalError::Overflow {
                        operation: "addition".to_string(),
                    });
                }
                Ok(total)
            }
            ExprKind::Product(factors) => {
                let mut values = Vec::with_capacity(factors.len());
                for f in factors {
                    values.push(self.eval(f)?);
                }
                let has_zero = values.contains(&0.0);
                let has_infinite = values.iter().any(|v| v.is_infinite());
                if has_zero && has_infinite {
                    return Err(EvalError::Indeterminate);
                }
                let finite = values.iter().all(|v| v.is_finite());
                let product: f64 = values.iter().product();
                if overflowed(finite, product) {
                    return Err(EvalError::Overflow {
                        operation: "multiplication".to_string(),
                    });
                }
                Ok(product)
            }
            ExprKind::Pow(base, exponent) => self.eval_pow(base, exponent),
        }
    }

    fn eval_call(&self, func: Func, arg: &Expr) -> Result<f64, EvalError> {
        let a = self.eval(arg)?;
        if !a.is_finite() {
            return Ok((func.definition().eval)(a));
        }
        let result = func.eval_real(a).ok_or_else(|| EvalError::Domain {
            operation: func.name().to_string(),
            argument: a,
        })?;
        // cot, csc, sec and tan blow up at poles; the rest only by overflow
        let grows_without_pole = matches!(func, Func::Exp | Func::Sinh | Func::Cosh);
        if grows_without_pole && overflowed(true, result) {
            return Err(EvalError::Overflow {
                operation: func.name().to_string(),
            });
        }
        Ok(result)
    }

    fn eval_pow(&self, base: &Expr, exponent: &Expr) -> Result<f64, EvalError> {
        let b = self.eval(base)?;
        let e = self.eval(exponent)?;
        if !b.is_finite() || !e.is_finite() {
            return Ok(b.powf(e));
        }
        if b == 0.0 && e < 0.0 {
            // Pole: c / 0
            return Ok(f64::INFINITY);
        }

        let result = if b < 0.0 && e.fract() != 0.0 {
            // Real odd roots of negatives are defined; even roots are not
            let odd_root = exponent
                .as_number()
                .filter(|r| r.denom().is_odd())
                .map(|r| r.numer().is_odd());
            match odd_root {
                Some(odd_numerator) => {
                    let magnitude = (-b).powf(e);
                    if odd_numerator { -magnitude } else { magnitude }
                }
                None => {
                    return Err(EvalError::Domain {
                        operation: "power".to_string(),
                        argument: b,
                    });
                }
            }
        } else if e.fract() == 0.0 && e.abs() <= f64::from(i32::MAX) {
            b.powi(e as i32)
        } else {
            b.powf(e)
        };

        if overflowed(true, result) {
            return Err(EvalError::Overflow {
                operation: "power".to_string(),
            });
        }
        Ok(result)
    }
}

impl Expr {
    /// Evaluate at `var = value`
    ///
    /// ```
    /// use storymath::parse;
    ///
    /// let f = parse("60x - 2x^2", "x").unwrap();
    /// assert_eq!(f.eval_at("x", 15.0), Ok(450.0));
    /// ```
    pub fn eval_at(&self, var: &str, value: f64) -> Result<f64, EvalError> {
        Evaluator { var, value }.eval(self)
    }

    /// Numeric value of a closed form with no free symbols
    pub fn eval_constant(&self) -> Result<f64, EvalError> {
        Evaluator {
            var: "",
            value: f64::NAN,
        }
        .eval(self)
    }

    /// True if the value is provably real: no `I`, and it evaluates
    pub(crate) fn is_real_constant(&self) -> bool {
        !self.is_syntactically_complex() && self.eval_constant().is_ok_and(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use approx::assert_relative_eq;

    fn at(input: &str, x: f64) -> Result<f64, EvalError> {
        parse(input, "x").unwrap().eval_at("x", x)
    }

    #[test]
    fn test_basic_values() {
        assert_relative_eq!(at("3x^2 + 5x - 7", 2.0).unwrap(), 15.0);
        assert_relative_eq!(at("sin(x)*exp(x)", 0.0).unwrap(), 0.0);
        assert_relative_eq!(at("sqrt(x)", 9.0).unwrap(), 3.0);
        assert_relative_eq!(at("pi", 0.0).unwrap(), std::f64::consts::PI);
    }

    #[test]
    fn test_domain_errors() {
        assert!(matches!(at("ln(x)", -1.0), Err(EvalError::Domain { .. })));
        assert!(matches!(at("ln(x)", 0.0), Err(EvalError::Domain { .. })));
        assert!(matches!(at("sqrt(x)", -4.0), Err(EvalError::Domain { .. })));
        assert!(matches!(at("asin(x)", 2.0), Err(EvalError::Domain { .. })));
    }

    #[test]
    fn test_odd_root_of_negative_is_real() {
        assert_relative_eq!(at("cbrt(x)", -8.0).unwrap(), -2.0);
    }

    #[test]
    fn test_indeterminate_and_pole() {
        assert_eq!(at("sin(x)/x", 0.0), Err(EvalError::Indeterminate));
        assert_eq!(at("1/x", 0.0), Ok(f64::INFINITY));
        assert_eq!(at("-1/x", 0.0), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(at("exp(x)", 1000.0), Err(EvalError::Overflow { .. })));
        assert!(matches!(at("x^400", 1e10), Err(EvalError::Overflow { .. })));
    }

    #[test]
    fn test_imaginary_is_not_real() {
        assert_eq!(Expr::imaginary_unit().eval_constant(), Err(EvalError::NonReal));
        assert!(!Expr::integer(-4).sqrt().is_real_constant());
        assert!(Expr::integer(2).sqrt().is_real_constant());
    }

    #[test]
    fn test_unbound_symbol() {
        assert!(matches!(
            Expr::symbol("y").eval_at("x", 1.0),
            Err(EvalError::UnboundSymbol { .. })
        ));
    }
}
