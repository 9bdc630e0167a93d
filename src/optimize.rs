//! Optimum selection over a set of critical points
//!
//! The selector keeps real, strictly positive points and returns the one with
//! the largest objective value. No second-derivative test is performed, so a
//! lone positive minimum is reported as the optimum.

use std::fmt;

use num_traits::Signed;

use crate::error::SolveFailure;
use crate::expr::{Expr, ExprKind};
use crate::simplification::expand;
use crate::solve::{CriticalPointSet, real_value};
use crate::traits::FLOAT_TOLERANCE;

/// What the objective measures; drives labels and the summary sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveKind {
    #[default]
    Function,
    Area,
    Volume,
    Profit,
}

impl ObjectiveKind {
    /// Function name used in labels: `A(x)`, `P(x)`
    pub fn symbol(self) -> &'static str {
        match self {
            ObjectiveKind::Function => "f",
            ObjectiveKind::Area => "A",
            ObjectiveKind::Volume => "V",
            ObjectiveKind::Profit => "P",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            ObjectiveKind::Function => "value",
            ObjectiveKind::Area => "area",
            ObjectiveKind::Volume => "volume",
            ObjectiveKind::Profit => "profit",
        }
    }

    pub fn label(self, variable: &str) -> String {
        format!("{}({variable})", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Chosen {
        point: Expr,
        value: Expr,
        approx_point: f64,
        approx_value: f64,
    },
    Failed(SolveFailure),
}

/// Objective, derivative and the selected optimum (or why there is none)
///
/// A chosen point is present exactly when no failure reason is.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    objective: Expr,
    derivative: Expr,
    critical_points: CriticalPointSet,
    variable: String,
    kind: ObjectiveKind,
    outcome: Outcome,
}

impl OptimizationResult {
    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    pub fn derivative(&self) -> &Expr {
        &self.derivative
    }

    pub fn critical_points(&self) -> &CriticalPointSet {
        &self.critical_points
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.kind
    }

    pub fn chosen_point(&self) -> Option<&Expr> {
        match &self.outcome {
            Outcome::Chosen { point, .. } => Some(point),
            Outcome::Failed(_) => None,
        }
    }

    pub fn chosen_value(&self) -> Option<&Expr> {
        match &self.outcome {
            Outcome::Chosen { value, .. } => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn approx_point(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Chosen { approx_point, .. } => Some(approx_point),
            Outcome::Failed(_) => None,
        }
    }

    pub fn approx_value(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Chosen { approx_value, .. } => Some(approx_value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&SolveFailure> {
        match &self.outcome {
            Outcome::Chosen { .. } => None,
            Outcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Chosen { .. })
    }

    pub(crate) fn with_kind(mut self, kind: ObjectiveKind) -> Self {
        self.kind = kind;
        self
    }

    /// "The maximum profit is 450 at x = 15", or the failure reason
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Chosen { point, value, .. } => format!(
                "The maximum {} is {value} at {} = {point}",
                self.kind.noun(),
                self.variable
            ),
            Outcome::Failed(reason) => reason.to_string(),
        }
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Real and strictly positive, compared exactly for rationals
fn positive_real(point: &Expr) -> Option<f64> {
    if let ExprKind::Number(n) = point.kind() {
        return n.is_positive().then(|| real_value(point)).flatten();
    }
    real_value(point).filter(|v| *v > 0.0)
}

/// Pick the positive real critical point with the largest objective value
///
/// Ties keep the earlier point in solver order.
pub fn select_optimum(
    objective: &Expr,
    derivative: &Expr,
    critical_points: &CriticalPointSet,
    variable: &str,
) -> OptimizationResult {
    let finish = |outcome| OptimizationResult {
        objective: objective.clone(),
        derivative: derivative.clone(),
        critical_points: critical_points.clone(),
        variable: variable.to_string(),
        kind: ObjectiveKind::default(),
        outcome,
    };

    let candidates: Vec<(&Expr, f64)> = critical_points
        .iter()
        .filter_map(|p| positive_real(p).map(|v| (p, v)))
        .collect();

    if candidates.is_empty() {
        let reason = if !critical_points.is_exhaustive() {
            SolveFailure::NoClosedForm
        } else {
            SolveFailure::NoPositiveRealCriticalPoint
        };
        log::debug!("selector: {reason} among {critical_points}");
        return finish(Outcome::Failed(reason));
    }

    let mut best: Option<(Expr, Expr, f64, f64)> = None;
    for (point, approx_point) in candidates {
        let value = objective.substitute(variable, point);
        let Some(approx_value) = real_value(&value) else {
            log::debug!("objective undefined at {variable} = {point}");
            continue;
        };
        let better = best
            .as_ref()
            .is_none_or(|(_, b_value, _, b)| improves(&value, approx_value, b_value, *b));
        if better {
            best = Some((point.clone(), value, approx_point, approx_value));
        }
    }

    match best {
        Some((point, value, approx_point, approx_value)) => finish(Outcome::Chosen {
            point,
            value,
            approx_point,
            approx_value,
        }),
        None => finish(Outcome::Failed(SolveFailure::ObjectiveUndefined)),
    }
}

/// Strictly larger: exactly for two rationals, else by more than the float tolerance
fn improves(value: &Expr, approx: f64, best: &Expr, best_approx: f64) -> bool {
    match (value.as_number(), best.as_number()) {
        (Some(v), Some(b)) => v > b,
        _ => approx > best_approx + FLOAT_TOLERANCE * best_approx.abs().max(1.0),
    }
}

/// `P(x) = x*p(x) - C(x)` from a unit price and a cost function, multiplied out
pub fn profit_objective(price: &Expr, cost: &Expr, variable: &str) -> Expr {
    let revenue = Expr::mul_expr(Expr::symbol(variable), price.clone());
    expand(&Expr::sub_expr(revenue, cost.clone()))
}
