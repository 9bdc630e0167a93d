//! Evaluation and symbolic differentiation rules for the supported functions
//!
//! Derivative formulas follow any standard calculus text:
//! d/du sin(u) = cos(u), d/du tan(u) = sec(u)^2, d/du asin(u) = 1/sqrt(1 - u^2),
//! d/du tanh(u) = 1 - tanh(u)^2, d/du ln(u) = 1/u, d/du |u| = u/|u|.

use super::registry::FunctionDefinition;
use super::{Func, call, neg, one_minus_square};
use crate::Expr;

fn everywhere(_: f64) -> bool {
    true
}

fn unit_interval(x: f64) -> bool {
    (-1.0..=1.0).contains(&x)
}

fn positive(x: f64) -> bool {
    x > 0.0
}

pub(crate) fn definition(func: Func) -> FunctionDefinition {
    match func {
        // Trigonometric
        Func::Sin => FunctionDefinition {
            name: "sin",
            aliases: &[],
            latex: "\\sin",
            eval: f64::sin,
            domain: everywhere,
            derivative: |u| call(Func::Cos, u),
        },
        Func::Cos => FunctionDefinition {
            name: "cos",
            aliases: &[],
            latex: "\\cos",
            eval: f64::cos,
            domain: everywhere,
            derivative: |u| neg(call(Func::Sin, u)),
        },
        Func::Tan => FunctionDefinition {
            name: "tan",
            aliases: &[],
            latex: "\\tan",
            eval: f64::tan,
            domain: everywhere,
            derivative: |u| call(Func::Sec, u).powi(2),
        },
        Func::Cot => FunctionDefinition {
            name: "cot",
            aliases: &[],
            latex: "\\cot",
            eval: |x| 1.0 / x.tan(),
            domain: everywhere,
            derivative: |u| neg(call(Func::Csc, u).powi(2)),
        },
        Func::Sec => FunctionDefinition {
            name: "sec",
            aliases: &[],
            latex: "\\sec",
            eval: |x| 1.0 / x.cos(),
            domain: everywhere,
            derivative: |u| Expr::mul_expr(call(Func::Sec, u), call(Func::Tan, u)),
        },
        Func::Csc => FunctionDefinition {
            name: "csc",
            aliases: &[],
            latex: "\\csc",
            eval: |x| 1.0 / x.sin(),
            domain: everywhere,
            derivative: |u| neg(Expr::mul_expr(call(Func::Csc, u), call(Func::Cot, u))),
        },

        // Inverse trigonometric
        Func::Asin => FunctionDefinition {
            name: "asin",
            aliases: &["arcsin"],
            latex: "\\arcsin",
            eval: f64::asin,
            domain: unit_interval,
            derivative: |u| Expr::pow(one_minus_square(u), Expr::rational(-1, 2)),
        },
        Func::Acos => FunctionDefinition {
            name: "acos",
            aliases: &["arccos"],
            latex: "\\arccos",
            eval: f64::acos,
            domain: unit_interval,
            derivative: |u| neg(Expr::pow(one_minus_square(u), Expr::rational(-1, 2))),
        },
        Func::Atan => FunctionDefinition {
            name: "atan",
            aliases: &["arctan"],
            latex: "\\arctan",
            eval: f64::atan,
            domain: everywhere,
            derivative: |u| Expr::pow(Expr::add_expr(Expr::one(), u.clone().powi(2)), Expr::integer(-1)),
        },

        // Hyperbolic
        Func::Sinh => FunctionDefinition {
            name: "sinh",
            aliases: &[],
            latex: "\\sinh",
            eval: f64::sinh,
            domain: everywhere,
            derivative: |u| call(Func::Cosh, u),
        },
        Func::Cosh => FunctionDefinition {
            name: "cosh",
            aliases: &[],
            latex: "\\cosh",
            eval: f64::cosh,
            domain: everywhere,
            derivative: |u| call(Func::Sinh, u),
        },
        Func::Tanh => FunctionDefinition {
            name: "tanh",
            aliases: &[],
            latex: "\\tanh",
            eval: f64::tanh,
            domain: everywhere,
            derivative: |u| Expr::sub_expr(Expr::one(), call(Func::Tanh, u).powi(2)),
        },

        // Exponential and logarithm
        Func::Exp => FunctionDefinition {
            name: "exp",
            aliases: &[],
            latex: "\\exp",
            eval: f64::exp,
            domain: everywhere,
            derivative: |u| call(Func::Exp, u),
        },
        Func::Ln => FunctionDefinition {
            name: "ln",
            aliases: &["log"],
            latex: "\\ln",
            eval: f64::ln,
            domain: positive,
            derivative: |u| Expr::pow(u.clone(), Expr::integer(-1)),
        },

        Func::Abs => FunctionDefinition {
            name: "abs",
            aliases: &[],
            latex: "",
            eval: f64::abs,
            domain: everywhere,
            derivative: |u| Expr::div_expr(u.clone(), call(Func::Abs, u)),
        },
    }
}

impl Func {
    /// Evaluate on a real argument, honouring the real domain
    pub(crate) fn eval_real(self, x: f64) -> Option<f64> {
        let def = self.definition();
        if x.is_nan() || (def.domain)(x) {
            Some((def.eval)(x))
        } else {
            None
        }
    }

    /// `d/du f(u)` without the chain-rule factor
    pub(crate) fn derivative_at(self, u: &Expr) -> Expr {
        (self.definition().derivative)(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eval_real_respects_domain() {
        assert_eq!(Func::Ln.eval_real(-1.0), None);
        assert_eq!(Func::Asin.eval_real(2.0), None);
        assert_relative_eq!(Func::Ln.eval_real(1.0).unwrap(), 0.0);
        assert_relative_eq!(Func::Sec.eval_real(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_poles_evaluate_to_infinity() {
        assert!(Func::Cot.eval_real(0.0).unwrap().is_infinite());
        assert!(Func::Csc.eval_real(0.0).unwrap().is_infinite());
    }

    #[test]
    fn test_derivative_shapes() {
        let x = Expr::symbol("x");
        assert_eq!(Func::Sin.derivative_at(&x), Expr::call(Func::Cos, x.clone()));
        assert_eq!(Func::Ln.derivative_at(&x), x.clone().powi(-1));
        assert_eq!(Func::Exp.derivative_at(&x), Expr::call(Func::Exp, x));
    }
}
