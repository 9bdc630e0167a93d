//! Labeled solution steps
//!
//! Every step renders its expressions through the canonical printer and the
//! LaTeX printer, so the same expression reads the same in every step.

use std::fmt;

use crate::expr::Expr;

/// Stable step labels, in the order the routines emit them
pub mod labels {
    pub const GIVEN_FUNCTION: &str = "Given function";
    pub const FIRST_DERIVATIVE: &str = "First derivative";
    pub const DIMENSIONS: &str = "Dimensions";
    pub const AREA: &str = "Area";
    pub const PERIMETER: &str = "Perimeter";
    pub const VOLUME: &str = "Volume";
    pub const OBJECTIVE: &str = "Objective function";
    pub const DERIVATIVE_TO_ZERO: &str = "Set the first derivative to zero";
    pub const CRITICAL_POINT: &str = "Solve for the critical point";
    pub const INTEGRAND: &str = "Integrand";
    pub const BOUNDS: &str = "Integration bounds";
    pub const EVALUATED_INTEGRAL: &str = "Evaluated integral";
}

/// One labeled fragment of a worked solution
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionStep {
    label: String,
    text: String,
    latex: String,
}

impl SolutionStep {
    pub fn new(label: impl Into<String>, text: impl Into<String>, latex: impl Into<String>) -> Self {
        SolutionStep {
            label: label.into(),
            text: text.into(),
            latex: latex.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Canonical plain-text fragment
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn latex(&self) -> &str {
        &self.latex
    }
}

impl fmt::Display for SolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.text)
    }
}

/// Accumulates steps in emission order
#[derive(Debug, Default)]
pub(crate) struct StepTrace {
    steps: Vec<SolutionStep>,
}

impl StepTrace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `lhs = expr`
    pub(crate) fn define(&mut self, label: &str, lhs: &str, expr: &Expr) -> &mut Self {
        self.steps.push(SolutionStep::new(
            label,
            format!("{lhs} = {expr}"),
            format!("{lhs} = {}", expr.to_latex()),
        ));
        self
    }

    /// `lhs = expr = 0`
    pub(crate) fn set_to_zero(&mut self, label: &str, lhs: &str, expr: &Expr) -> &mut Self {
        self.steps.push(SolutionStep::new(
            label,
            format!("{lhs} = {expr} = 0"),
            format!("{lhs} = {} = 0", expr.to_latex()),
        ));
        self
    }

    pub(crate) fn note(&mut self, label: &str, text: impl Into<String>, latex: impl Into<String>) -> &mut Self {
        self.steps.push(SolutionStep::new(label, text, latex));
        self
    }

    pub(crate) fn finish(self) -> Vec<SolutionStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_trace_keeps_order_and_renders_both_forms() {
        let f = parse("x^2/2", "x").unwrap();
        let mut trace = StepTrace::new();
        trace
            .define(labels::GIVEN_FUNCTION, "f(x)", &f)
            .set_to_zero(labels::DERIVATIVE_TO_ZERO, "f'(x)", &f.derive("x"));
        let steps = trace.finish();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].label(), "Given function");
        assert_eq!(steps[0].text(), "f(x) = x^2/2");
        assert_eq!(steps[0].latex(), r"f(x) = \frac{x^{2}}{2}");
        assert_eq!(steps[1].to_string(), "Set the first derivative to zero: f'(x) = x = 0");
    }
}
