//! Centralized elementary function registry
//!
//! A single source of truth for the functions the parser accepts: names and
//! aliases, numeric evaluation, real domain, derivative formulas and exact
//! special values.

use std::fmt;

use crate::Expr;

pub(crate) mod definitions;
pub(crate) mod registry;
mod special_values;

pub(crate) use registry::{FunctionDefinition, Registry};

/// Elementary functions of one argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Abs,
}

impl Func {
    /// Every function, in declaration order
    pub const ALL: [Func; 15] = [
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Cot,
        Func::Sec,
        Func::Csc,
        Func::Asin,
        Func::Acos,
        Func::Atan,
        Func::Sinh,
        Func::Cosh,
        Func::Tanh,
        Func::Exp,
        Func::Ln,
        Func::Abs,
    ];

    /// Look up a function by its name or alias (`log` is `ln`)
    pub fn from_name(name: &str) -> Option<Func> {
        Registry::lookup(name)
    }

    pub(crate) fn definition(self) -> &'static FunctionDefinition {
        Registry::definition(self)
    }

    /// Canonical name used by the printer
    pub fn name(self) -> &'static str {
        self.definition().name
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== Helpers for building derivative expressions =====

pub(crate) fn call(func: Func, arg: &Expr) -> Expr {
    Expr::call(func, arg.clone())
}

pub(crate) fn neg(e: Expr) -> Expr {
    e.negate()
}

/// `1 - u^2`, shared by the inverse trig derivatives
pub(crate) fn one_minus_square(u: &Expr) -> Expr {
    Expr::sub_expr(Expr::one(), u.clone().powi(2))
}
