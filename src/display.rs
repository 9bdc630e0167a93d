//! Display implementations for expressions.
//!
//! ## Standard Display (`to_string()` / `{}`)
//! The canonical textual form. It always re-parses to the same tree:
//! - `-7 + 5*x + 3*x^2`
//! - `x/2`, `1/(2*x)`, `sqrt(2)/2`
//! - `sin(x)*exp(-x)`
//!
//! ## LaTeX Format (`to_latex()`)
//! For typesetting steps:
//! - `3 \cdot x^{2} + 5 \cdot x - 7`
//! - `\frac{x}{2}`, `\sqrt{x}`, `\sin\left(x\right)`
//!
//! # Display Behavior Notes for N-ary AST
//! - Sum displays terms with +/- signs based on leading coefficients
//! - Product splits negative powers into a denominator
//! - `e^x` is always built as `exp(x)`; LaTeX renders it as `e^{x}`

use std::fmt;
use std::sync::Arc;

use num_traits::{One, Signed};

use crate::expr::{Constant, Expr, ExprKind};
use crate::functions::Func;
use crate::traits::{Rational, ratio};

#[derive(Clone, Copy, PartialEq, Eq)]
enum FormatMode {
    Standard,
    Latex,
}

impl FormatMode {
    fn times(self) -> &'static str {
        match self {
            FormatMode::Standard => "*",
            FormatMode::Latex => r" \cdot ",
        }
    }

    fn wrap(self, inner: &str) -> String {
        match self {
            FormatMode::Standard => format!("({inner})"),
            FormatMode::Latex => format!(r"\left({inner}\right)"),
        }
    }
}

fn format_number(n: &Rational, mode: FormatMode) -> String {
    if n.is_integer() {
        return n.numer().to_string();
    }
    match mode {
        FormatMode::Standard => format!("{}/{}", n.numer(), n.denom()),
        FormatMode::Latex => {
            let sign = if n.is_negative() { "-" } else { "" };
            format!(r"{sign}\frac{{{}}}{{{}}}", n.numer().abs(), n.denom())
        }
    }
}

fn format_expr(expr: &Expr, mode: FormatMode) -> String {
    match expr.kind() {
        ExprKind::Number(n) => format_number(n, mode),
        ExprKind::Constant(c) => match (c, mode) {
            (Constant::Pi, FormatMode::Latex) => r"\pi".to_string(),
            (Constant::I, FormatMode::Latex) => "i".to_string(),
            _ => c.name().to_string(),
        },
        ExprKind::Symbol(s) => s.to_string(),
        ExprKind::Call(func, arg) => format_call(*func, arg, mode),
        ExprKind::Sum(terms) => format_sum(terms, mode),
        ExprKind::Product(factors) => format_product(factors, mode),
        ExprKind::Pow(b, e) => {
            if e.as_number().is_some_and(|n| n.is_negative()) {
                format_product(std::slice::from_ref(&Arc::new(expr.clone())), mode)
            } else {
                format_pow(b, e, mode)
            }
        }
    }
}

fn format_call(func: Func, arg: &Expr, mode: FormatMode) -> String {
    let inner = format_expr(arg, mode);
    match mode {
        FormatMode::Standard => format!("{}({inner})", func.name()),
        FormatMode::Latex => match func {
            Func::Abs => format!(r"\left|{inner}\right|"),
            Func::Exp => format!("e^{{{inner}}}"),
            _ => format!(r"{}\left({inner}\right)", func.definition().latex),
        },
    }
}

fn format_sum(terms: &[Arc<Expr>], mode: FormatMode) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if term.is_negative_term() {
            out.push_str(if i == 0 { "-" } else { " - " });
            out.push_str(&format_expr(&term.as_ref().clone().negate(), mode));
        } else {
            if i > 0 {
                out.push_str(" + ");
            }
            out.push_str(&format_expr(term, mode));
        }
    }
    out
}

/// A factor printed next to others: sums need parentheses
fn format_factor(expr: &Expr, mode: FormatMode) -> String {
    let text = format_expr(expr, mode);
    if matches!(expr.kind(), ExprKind::Sum(_)) {
        mode.wrap(&text)
    } else {
        text
    }
}

fn format_product(factors: &[Arc<Expr>], mode: FormatMode) -> String {
    let mut coeff = Rational::one();
    let mut numer: Vec<String> = Vec::new();
    let mut denom: Vec<String> = Vec::new();
    let mut leads_with_sum = false;

    for f in factors {
        match f.kind() {
            ExprKind::Number(n) => coeff = n.clone(),
            ExprKind::Pow(b, e) if e.as_number().is_some_and(|n| n.is_negative()) => {
                let flipped = Expr::pow(b.as_ref().clone(), e.as_ref().clone().negate());
                denom.push(format_factor(&flipped, mode));
            }
            _ => {
                if numer.is_empty() && matches!(f.kind(), ExprKind::Sum(_)) {
                    leads_with_sum = true;
                }
                numer.push(format_factor(f, mode));
            }
        }
    }

    let sign = if coeff.is_negative() { "-" } else { "" };
    let coeff = coeff.abs();
    // `-(a + b)*c` would re-parse as `(-a - b)*c`
    if !sign.is_empty() && coeff.numer().is_one() && leads_with_sum && mode == FormatMode::Standard {
        numer.insert(0, "1".to_string());
    } else if !coeff.numer().is_one() {
        numer.insert(0, coeff.numer().to_string());
    }
    if !coeff.denom().is_one() {
        denom.insert(0, coeff.denom().to_string());
    }

    let sep = mode.times();
    let top = if numer.is_empty() {
        "1".to_string()
    } else {
        numer.join(sep)
    };
    if denom.is_empty() {
        return format!("{sign}{top}");
    }

    match mode {
        FormatMode::Standard => {
            let bottom = if denom.len() == 1 {
                denom.remove(0)
            } else {
                format!("({})", denom.join(sep))
            };
            format!("{sign}{top}/{bottom}")
        }
        FormatMode::Latex => format!(r"{sign}\frac{{{top}}}{{{}}}", denom.join(sep)),
    }
}

fn needs_parens_as_base(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::Sum(_) | ExprKind::Product(_) | ExprKind::Pow(..) => true,
        ExprKind::Number(n) => n.is_negative() || !n.is_integer(),
        _ => false,
    }
}

fn format_pow(base: &Expr, exponent: &Expr, mode: FormatMode) -> String {
    let radicand = || format_expr(base, mode);
    if let Some(e) = exponent.as_number() {
        if *e == ratio(1, 2) {
            return match mode {
                FormatMode::Standard => format!("sqrt({})", radicand()),
                FormatMode::Latex => format!(r"\sqrt{{{}}}", radicand()),
            };
        }
        if *e == ratio(1, 3) {
            return match mode {
                FormatMode::Standard => format!("cbrt({})", radicand()),
                FormatMode::Latex => format!(r"\sqrt[3]{{{}}}", radicand()),
            };
        }
    }

    let base_text = if needs_parens_as_base(base) {
        mode.wrap(&format_expr(base, mode))
    } else {
        format_expr(base, mode)
    };
    let exp_text = format_expr(exponent, mode);

    match mode {
        FormatMode::Latex => format!("{base_text}^{{{exp_text}}}"),
        FormatMode::Standard => {
            let exp_simple = match exponent.kind() {
                ExprKind::Number(n) => n.is_integer() && !n.is_negative(),
                ExprKind::Symbol(_) | ExprKind::Constant(_) => true,
                _ => false,
            };
            if exp_simple {
                format!("{base_text}^{exp_text}")
            } else {
                format!("{base_text}^({exp_text})")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_expr(self, FormatMode::Standard))
    }
}

/// Wrapper that renders an expression as LaTeX through `Display`
pub struct LatexFormatter<'expr> {
    expr: &'expr Expr,
}

impl fmt::Display for LatexFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_expr(self.expr, FormatMode::Latex))
    }
}

impl Expr {
    /// Convert the expression to LaTeX format
    pub fn to_latex(&self) -> String {
        self.latex().to_string()
    }

    pub fn latex(&self) -> LatexFormatter<'_> {
        LatexFormatter { expr: self }
    }
}
