//! Word-problem dispatcher
//!
//! One stateless routine per category. Every routine reports through
//! [`crate::error::Error`]; the dispatcher turns any failure into an
//! unsuccessful [`WordProblemSolution`] with no steps.

mod category;
mod input;

pub use category::{UnknownCategory, WordProblemCategory};
pub use input::RawInput;

use crate::builder::Solver;
use crate::error::{InputShapeError, Result};
use crate::expr::Expr;
use crate::steps::{SolutionStep, StepTrace, labels};
use crate::traits::Rational;

/// Steps, summary sentence and whether the problem was solved
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordProblemSolution {
    pub steps: Vec<SolutionStep>,
    pub summary: String,
    pub success: bool,
}

impl WordProblemSolution {
    fn solved(steps: Vec<SolutionStep>, summary: String) -> Self {
        WordProblemSolution {
            steps,
            summary,
            success: true,
        }
    }

    fn failed(summary: String) -> Self {
        WordProblemSolution {
            steps: Vec::new(),
            summary,
            success: false,
        }
    }
}

pub(crate) fn dispatch(solver: &Solver, category: WordProblemCategory, input: &RawInput) -> WordProblemSolution {
    log::debug!("solving {category} word problem");
    let outcome = match category {
        WordProblemCategory::BasicFunction => basic_function(solver, input),
        WordProblemCategory::PlaneAreaPerimeter => plane_area_perimeter(input),
        WordProblemCategory::SolidVolume => solid_volume(input),
        WordProblemCategory::Optimization => optimization(solver, input),
        WordProblemCategory::DefiniteIntegral => definite_integral(solver, input),
    };
    outcome.unwrap_or_else(|err| {
        log::debug!("{category} word problem failed: {err}");
        WordProblemSolution::failed(err.to_string())
    })
}

fn text_input<'a>(input: &'a RawInput, expected: &'static str) -> Result<&'a str> {
    match input {
        RawInput::Text(s) => Ok(s.as_str()),
        _ => Err(InputShapeError::WrongInputKind { expected }.into()),
    }
}

fn shown(n: &Rational) -> Expr {
    Expr::number(n.clone())
}

// =============================================================================
// ROUTINES
// =============================================================================

fn basic_function(solver: &Solver, input: &RawInput) -> Result<WordProblemSolution> {
    let f = solver.parse(text_input(input, "a function")?)?;
    let df = solver.differentiate(&f);
    let var = solver.var();

    let mut trace = StepTrace::new();
    trace
        .define(labels::GIVEN_FUNCTION, &format!("f({var})"), &f)
        .define(labels::FIRST_DERIVATIVE, &format!("f'({var})"), &df);
    let summary = format!("The first derivative is f'({var}) = {df}");
    Ok(WordProblemSolution::solved(trace.finish(), summary))
}

fn plane_area_perimeter(input: &RawInput) -> Result<WordProblemSolution> {
    let raw = text_input(input, "comma-separated dimensions")?;
    let dims = input::dimensions(raw, &["length", "width"], "length, width")?;
    let (l, w) = (shown(&dims[0]), shown(&dims[1]));
    let area = Expr::mul_expr(l.clone(), w.clone());
    let perimeter = Expr::mul_expr(Expr::integer(2), Expr::add_expr(l.clone(), w.clone()));

    let mut trace = StepTrace::new();
    trace
        .note(
            labels::DIMENSIONS,
            format!("length = {l}, width = {w}"),
            format!(r"l = {}, \quad w = {}", l.to_latex(), w.to_latex()),
        )
        .note(
            labels::AREA,
            format!("A = l*w = {l}*{w} = {area}"),
            format!(r"A = l \cdot w = {} \cdot {} = {}", l.to_latex(), w.to_latex(), area.to_latex()),
        )
        .note(
            labels::PERIMETER,
            format!("P = 2*(l + w) = 2*({l} + {w}) = {perimeter}"),
            format!(
                r"P = 2 (l + w) = 2 ({} + {}) = {}",
                l.to_latex(),
                w.to_latex(),
                perimeter.to_latex()
            ),
        );
    let summary = format!("The area is {area} and the perimeter is {perimeter}");
    Ok(WordProblemSolution::solved(trace.finish(), summary))
}

fn solid_volume(input: &RawInput) -> Result<WordProblemSolution> {
    let raw = text_input(input, "comma-separated dimensions")?;
    let dims = input::dimensions(raw, &["length", "width", "height"], "length, width, height")?;
    let (l, w, h) = (shown(&dims[0]), shown(&dims[1]), shown(&dims[2]));
    let volume = Expr::product(vec![l.clone(), w.clone(), h.clone()]);

    let mut trace = StepTrace::new();
    trace
        .note(
            labels::DIMENSIONS,
            format!("length = {l}, width = {w}, height = {h}"),
            format!(r"l = {}, \quad w = {}, \quad h = {}", l.to_latex(), w.to_latex(), h.to_latex()),
        )
        .note(
            labels::VOLUME,
            format!("V = l*w*h = {l}*{w}*{h} = {volume}"),
            format!(
                r"V = l \cdot w \cdot h = {} \cdot {} \cdot {} = {}",
                l.to_latex(),
                w.to_latex(),
                h.to_latex(),
                volume.to_latex()
            ),
        );
    let summary = format!("The volume is {volume}");
    Ok(WordProblemSolution::solved(trace.finish(), summary))
}

fn optimization(solver: &Solver, input: &RawInput) -> Result<WordProblemSolution> {
    let result = match input {
        RawInput::Text(f) => solver.solve_optimization(f)?,
        RawInput::Objective { function, kind } => solver.solve_objective(function, *kind)?,
        RawInput::Profit { price, cost } => solver.solve_profit(price, cost)?,
        RawInput::Integral { .. } => {
            return Err(InputShapeError::WrongInputKind {
                expected: "an objective function",
            }
            .into());
        }
    };

    let var = solver.var();
    let name = result.kind().symbol();
    let mut trace = StepTrace::new();
    trace
        .define(labels::OBJECTIVE, &result.kind().label(var), result.objective())
        .set_to_zero(labels::DERIVATIVE_TO_ZERO, &format!("{name}'({var})"), result.derivative());
    match result.chosen_point() {
        Some(point) => trace.define(labels::CRITICAL_POINT, var, point),
        None => {
            let points = result.critical_points();
            let latex = points.iter().map(|p| p.to_latex()).collect::<Vec<_>>().join(", ");
            trace.note(
                labels::CRITICAL_POINT,
                format!("{var} in {points}"),
                format!(r"{var} \in \left\{{{latex}\right\}}"),
            )
        }
    };

    let success = result.is_success();
    Ok(WordProblemSolution {
        steps: trace.finish(),
        summary: result.summary(),
        success,
    })
}

fn definite_integral(solver: &Solver, input: &RawInput) -> Result<WordProblemSolution> {
    let (function, lower, upper) = match input {
        RawInput::Text(raw) => input::integral_fields(raw)?,
        RawInput::Integral { function, lower, upper } => (function.clone(), lower.clone(), upper.clone()),
        _ => {
            return Err(InputShapeError::WrongInputKind {
                expected: "an integrand and two bounds",
            }
            .into());
        }
    };
    let integrand = solver.parse(&function)?;
    let (a, b) = (solver.parse(&lower)?, solver.parse(&upper)?);
    let integral = solver.integrate(&integrand, &a, &b)?;
    let var = solver.var();

    let mut trace = StepTrace::new();
    trace
        .define(labels::INTEGRAND, &format!("f({var})"), &integrand)
        .note(
            labels::BOUNDS,
            format!("a = {a}, b = {b}"),
            format!(r"a = {}, \quad b = {}", a.to_latex(), b.to_latex()),
        )
        .note(
            labels::EVALUATED_INTEGRAL,
            format!(
                "integral of {integrand} from {a} to {b} = [{}] = {} (approximately {:.6})",
                integral.antiderivative, integral.value, integral.approx
            ),
            format!(
                r"\int_{{{}}}^{{{}}} {}\,d{var} = \left[{}\right]_{{{}}}^{{{}}} = {}",
                a.to_latex(),
                b.to_latex(),
                integrand.to_latex(),
                integral.antiderivative.to_latex(),
                a.to_latex(),
                b.to_latex(),
                integral.value.to_latex()
            ),
        );
    let summary = format!(
        "The definite integral equals {} (approximately {:.6})",
        integral.value, integral.approx
    );
    Ok(WordProblemSolution::solved(trace.finish(), summary))
}
