//! Abstract Syntax Tree for single-variable expressions
//!
//! N-ary Sum/Product architecture with exact rational coefficients.
//! Every node is built through the canonical constructors in
//! [`constructors`](self::constructors), so two equal expressions always have
//! the same tree and the same rendering.

mod constructors;
mod ordering;

use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use num_traits::{One, Signed, Zero};
use rustc_hash::FxHasher;

use crate::functions::Func;
use crate::traits::Rational;

pub(crate) use ordering::expr_cmp;

// =============================================================================
// EXPR - The main expression type
// =============================================================================

#[derive(Debug, Clone)]
pub struct Expr {
    /// Structural hash for O(1) equality rejection
    hash: u64,
    kind: ExprKind,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

// Structural equality based on KIND only (with hash fast-reject)
impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// Named constants understood by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Pi,
    E,
    /// Imaginary unit, `I^2 = -1`
    I,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
            Constant::I => "I",
        }
    }

    pub(crate) fn value(self) -> Option<f64> {
        match self {
            Constant::Pi => Some(std::f64::consts::PI),
            Constant::E => Some(std::f64::consts::E),
            Constant::I => None,
        }
    }
}

// =============================================================================
// EXPRKIND - N-ary Sum/Product architecture
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Exact rational number
    Number(Rational),

    Constant(Constant),

    /// The declared variable (or, in hand-built trees, any named symbol)
    Symbol(Arc<str>),

    /// Elementary function applied to one argument
    Call(Func, Arc<Expr>),

    /// N-ary sum, flat and sorted. `a - b` is `Sum([a, Product([-1, b])])`
    Sum(Vec<Arc<Expr>>),

    /// N-ary product, flat and sorted, numeric coefficient first.
    /// `a / b` is `Product([a, Pow(b, -1)])`
    Product(Vec<Arc<Expr>>),

    Pow(Arc<Expr>, Arc<Expr>),
}

fn structural_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// EXPR CONSTRUCTORS AND METHODS
// =============================================================================

impl Expr {
    /// Wrap a kind without normalizing it. Callers must already hold canonical parts.
    pub(crate) fn new(kind: ExprKind) -> Self {
        Expr {
            hash: structural_hash(&kind),
            kind,
        }
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn number(n: Rational) -> Self {
        Expr::new(ExprKind::Number(n))
    }

    pub fn integer(n: i64) -> Self {
        Expr::number(crate::traits::int(n))
    }

    pub fn rational(numer: i64, denom: i64) -> Self {
        Expr::number(crate::traits::ratio(numer, denom))
    }

    pub fn symbol(s: impl AsRef<str>) -> Self {
        Expr::new(ExprKind::Symbol(Arc::from(s.as_ref())))
    }

    pub fn constant(c: Constant) -> Self {
        Expr::new(ExprKind::Constant(c))
    }

    pub fn pi() -> Self {
        Expr::constant(Constant::Pi)
    }

    pub fn imaginary_unit() -> Self {
        Expr::constant(Constant::I)
    }

    pub fn zero() -> Self {
        Expr::number(Rational::zero())
    }

    pub fn one() -> Self {
        Expr::number(Rational::one())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn as_number(&self) -> Option<&Rational> {
        match &self.kind {
            ExprKind::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(&self.kind, ExprKind::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(&self.kind, ExprKind::Number(n) if n.is_one())
    }

    pub fn is_symbol(&self, var: &str) -> bool {
        matches!(&self.kind, ExprKind::Symbol(s) if s.as_ref() == var)
    }

    /// Split off the rational coefficient: `3*x^2` gives `(3, x^2)`, `7` gives `(7, 1)`
    pub fn coefficient_and_rest(&self) -> (Rational, Expr) {
        match &self.kind {
            ExprKind::Number(n) => (n.clone(), Expr::one()),
            ExprKind::Product(factors) => match factors.first().and_then(|f| f.as_number()) {
                Some(c) => {
                    let rest = match &factors[1..] {
                        [single] => single.as_ref().clone(),
                        many => Expr::new(ExprKind::Product(many.to_vec())),
                    };
                    (c.clone(), rest)
                }
                None => (Rational::one(), self.clone()),
            },
            _ => (Rational::one(), self.clone()),
        }
    }

    /// True for terms that print with a leading minus sign
    pub(crate) fn is_negative_term(&self) -> bool {
        match &self.kind {
            ExprKind::Number(n) => n.is_negative(),
            ExprKind::Product(factors) => factors
                .first()
                .and_then(|f| f.as_number())
                .is_some_and(|c| c.is_negative()),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Analysis methods
    // -------------------------------------------------------------------------

    /// Count the total number of nodes in the AST
    pub fn node_count(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Call(_, arg) => 1 + arg.node_count(),
            ExprKind::Sum(items) | ExprKind::Product(items) => {
                1 + items.iter().map(|t| t.node_count()).sum::<usize>()
            }
            ExprKind::Pow(b, e) => 1 + b.node_count() + e.node_count(),
        }
    }

    /// Get the maximum nesting depth of the AST
    pub fn max_depth(&self) -> usize {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => 1,
            ExprKind::Call(_, arg) => 1 + arg.max_depth(),
            ExprKind::Sum(items) | ExprKind::Product(items) => {
                1 + items.iter().map(|t| t.max_depth()).max().unwrap_or(0)
            }
            ExprKind::Pow(b, e) => 1 + b.max_depth().max(e.max_depth()),
        }
    }

    /// Check if the expression contains a specific variable
    pub fn contains_var(&self, var: &str) -> bool {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) => false,
            ExprKind::Symbol(s) => s.as_ref() == var,
            ExprKind::Call(_, arg) => arg.contains_var(var),
            ExprKind::Sum(items) | ExprKind::Product(items) => {
                items.iter().any(|t| t.contains_var(var))
            }
            ExprKind::Pow(b, e) => b.contains_var(var) || e.contains_var(var),
        }
    }

    /// First symbol that is not `var`, if any
    pub(crate) fn foreign_symbol(&self, var: &str) -> Option<Arc<str>> {
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) => None,
            ExprKind::Symbol(s) => (s.as_ref() != var).then(|| s.clone()),
            ExprKind::Call(_, arg) => arg.foreign_symbol(var),
            ExprKind::Sum(items) | ExprKind::Product(items) => {
                items.iter().find_map(|t| t.foreign_symbol(var))
            }
            ExprKind::Pow(b, e) => b.foreign_symbol(var).or_else(|| e.foreign_symbol(var)),
        }
    }

    /// Syntactic test for a non-real value: mentions `I`, or takes an even
    /// root of a negative literal
    pub fn is_syntactically_complex(&self) -> bool {
        match &self.kind {
            ExprKind::Constant(c) => *c == Constant::I,
            ExprKind::Number(_) | ExprKind::Symbol(_) => false,
            ExprKind::Call(_, arg) => arg.is_syntactically_complex(),
            ExprKind::Sum(items) | ExprKind::Product(items) => {
                items.iter().any(|t| t.is_syntactically_complex())
            }
            ExprKind::Pow(b, e) => {
                let even_root_of_negative = matches!(
                    (&b.kind, &e.kind),
                    (ExprKind::Number(base), ExprKind::Number(exp))
                        if base.is_negative() && !exp.is_integer()
                );
                even_root_of_negative || b.is_syntactically_complex() || e.is_syntactically_complex()
            }
        }
    }

    /// Transform the expression tree (post-order), renormalizing every node
    pub fn map<F>(&self, f: &F) -> Expr
    where
        F: Fn(&Expr) -> Option<Expr>,
    {
        if let Some(replaced) = f(self) {
            return replaced;
        }
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Constant(_) | ExprKind::Symbol(_) => self.clone(),
            ExprKind::Call(func, arg) => Expr::call(*func, arg.map(f)),
            ExprKind::Sum(terms) => Expr::sum(terms.iter().map(|t| t.map(f)).collect()),
            ExprKind::Product(factors) => {
                Expr::product(factors.iter().map(|t| t.map(f)).collect())
            }
            ExprKind::Pow(b, e) => Expr::pow(b.map(f), e.map(f)),
        }
    }

    /// Substitute a variable with another expression and renormalize
    pub fn substitute(&self, var: &str, replacement: &Expr) -> Expr {
        self.map(&|node: &Expr| node.is_symbol(var).then(|| replacement.clone()))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::integer(n)
    }
}

impl From<Rational> for Expr {
    fn from(n: Rational) -> Self {
        Expr::number(n)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_flattening() {
        let x = Expr::symbol("x");
        let s = Expr::sum(vec![Expr::sum(vec![x.clone(), Expr::pi()]), Expr::integer(2)]);
        match s.kind() {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("Expected Sum, got {other:?}"),
        }
    }

    #[test]
    fn test_product_flattening() {
        let x = Expr::symbol("x");
        let inner = Expr::product(vec![Expr::pi(), x.clone()]);
        let outer = Expr::product(vec![inner, Expr::call(Func::Sin, x)]);
        match outer.kind() {
            ExprKind::Product(factors) => assert_eq!(factors.len(), 3),
            other => panic!("Expected Product, got {other:?}"),
        }
    }

    #[test]
    fn test_subtraction_as_sum() {
        let x = Expr::symbol("x");
        let result = Expr::sub_expr(x, Expr::pi());
        match result.kind() {
            ExprKind::Sum(terms) => assert_eq!(terms.len(), 2),
            other => panic!("Expected Sum from subtraction, got {other:?}"),
        }
    }

    #[test]
    fn test_contains_var_and_counts() {
        let x = Expr::symbol("x");
        let e = Expr::pow(Expr::sum(vec![x.clone(), Expr::integer(1)]), Expr::integer(2));
        assert!(e.contains_var("x"));
        assert!(!e.contains_var("y"));
        assert_eq!(e.max_depth(), 3);
        assert_eq!(e.node_count(), 5);
    }

    #[test]
    fn test_substitute_renormalizes() {
        let x = Expr::symbol("x");
        let e = Expr::sum(vec![
            Expr::product(vec![Expr::integer(60), x.clone()]),
            Expr::product(vec![Expr::integer(-2), Expr::pow(x, Expr::integer(2))]),
        ]);
        assert_eq!(e.substitute("x", &Expr::integer(15)), Expr::integer(450));
    }

    #[test]
    fn test_complex_detection() {
        let root = Expr::pow(Expr::integer(-3), Expr::rational(1, 2));
        assert!(root.is_syntactically_complex());
        assert!(!Expr::pow(Expr::integer(3), Expr::rational(1, 2)).is_syntactically_complex());
    }
}
