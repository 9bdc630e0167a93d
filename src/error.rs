//! Error types for every stage of a worked solution
//!
//! Parsing, input-shape validation, solving, sampling and integration each
//! report through their own enum; [`Error`] unifies them for callers that just
//! want `?` to work.

use std::fmt;

use thiserror::Error;

/// Source location span for error reporting
/// Represents a range of characters in the input string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start position (0-indexed byte offset)
    pub start: usize,
    /// End position (exclusive, 0-indexed byte offset)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span for a single position
    pub fn at(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Format the span for display (1-indexed for users)
    pub fn display(&self) -> String {
        if !self.is_valid() {
            String::new()
        } else if self.end - self.start == 1 {
            format!(" at position {}", self.start + 1)
        } else {
            format!(" at positions {}-{}", self.start + 1, self.end)
        }
    }
}

fn located(span: &Option<Span>) -> String {
    span.map_or(String::new(), |s| s.display())
}

/// Errors raised while turning text into an expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Formula cannot be empty")]
    EmptyFormula,

    #[error("Invalid syntax: {msg}{}", located(.span))]
    InvalidSyntax { msg: String, span: Option<Span> },

    #[error("Invalid number format: '{value}'{}", located(.span))]
    InvalidNumber { value: String, span: Option<Span> },

    #[error("Invalid token: '{token}'{}", located(.span))]
    InvalidToken { token: String, span: Option<Span> },

    #[error("Expected '{expected}', but got '{got}'{}", located(.span))]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Option<Span>,
    },

    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("Undeclared variable '{name}' (only '{variable}' is allowed){}", located(.span))]
    UndeclaredVariable {
        name: String,
        variable: String,
        span: Option<Span>,
    },

    #[error("Unknown function '{name}'{}", located(.span))]
    UnknownFunction { name: String, span: Option<Span> },

    #[error("Function '{name}' takes {expected} argument(s), got {got}{}", located(.span))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Option<Span>,
    },

    #[error("Division by zero{}", located(.span))]
    DivisionByZero { span: Option<Span> },

    #[error("Expression nesting depth exceeds maximum limit")]
    MaxDepthExceeded,

    #[error("Expression size exceeds maximum node count limit")]
    MaxNodesExceeded,
}

impl ParseError {
    pub fn invalid_syntax(msg: impl Into<String>) -> Self {
        ParseError::InvalidSyntax {
            msg: msg.into(),
            span: None,
        }
    }

    pub fn invalid_syntax_at(msg: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            msg: msg.into(),
            span: Some(span),
        }
    }

    pub fn invalid_token_at(token: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidToken {
            token: token.into(),
            span: Some(span),
        }
    }

    pub fn unexpected_at(expected: impl Into<String>, got: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            got: got.into(),
            span: Some(span),
        }
    }
}

/// Raw word-problem input that does not have the shape its category needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputShapeError {
    #[error("expected exactly {expected} comma-separated values ({fields}), got {got}")]
    WrongFieldCount {
        expected: usize,
        got: usize,
        fields: &'static str,
    },

    #[error("value {index} ('{value}') is not a number")]
    NotNumeric { index: usize, value: String },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: String },

    #[error("this category expects {expected}")]
    WrongInputKind { expected: &'static str },
}

/// Why the selector could not choose an optimum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveFailure {
    #[error("no positive real critical point")]
    NoPositiveRealCriticalPoint,

    #[error("no closed-form critical point")]
    NoClosedForm,

    #[error("objective is undefined at every positive real critical point")]
    ObjectiveUndefined,
}

/// Why a single numeric evaluation failed
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalError {
    #[error("{operation} is undefined for {argument}")]
    Domain { operation: String, argument: f64 },

    #[error("indeterminate form 0/0")]
    Indeterminate,

    #[error("overflow in {operation}")]
    Overflow { operation: String },

    #[error("value is not real")]
    NonReal,

    #[error("symbol '{name}' has no value")]
    UnboundSymbol { name: String },
}

/// A failed evaluation at a specific sample point
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleFailure {
    pub x: f64,
    pub cause: EvalError,
}

impl fmt::Display for SampleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at x = {}", self.cause, self.x)
    }
}

impl std::error::Error for SampleFailure {}

fn interval(range: &(f64, f64)) -> String {
    format!("[{}, {}]", range.0, range.1)
}

/// Both the primary range and the single fallback range failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "could not sample {} ({primary}) nor fallback {} ({fallback})",
    interval(.primary_range),
    interval(.fallback_range)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplingError {
    pub primary_range: (f64, f64),
    pub primary: SampleFailure,
    pub fallback_range: (f64, f64),
    pub fallback: SampleFailure,
}

/// Errors from definite integral evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationFailure {
    #[error("no closed-form antiderivative found for {integrand}")]
    NoAntiderivative { integrand: String },

    #[error("integrand is not defined on [{lower}, {upper}]: {failure}")]
    NotDefinedOnInterval {
        lower: f64,
        upper: f64,
        failure: SampleFailure,
    },

    #[error("integrand has a pole at x = {at} inside the bounds")]
    Divergent { at: f64 },

    #[error("integration bounds must be finite real numbers")]
    InvalidBounds,

    #[error("the integral value could not be evaluated numerically: {0}")]
    Unevaluable(EvalError),
}

/// Any failure the crate can report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    InputShape(#[from] InputShapeError),

    #[error(transparent)]
    Solve(#[from] SolveFailure),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Integration(#[from] IntegrationFailure),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        assert_eq!(Span::at(4).display(), " at position 5");
        assert_eq!(Span::new(2, 5).display(), " at positions 3-5");
        assert_eq!(Span::default().display(), "");
    }

    #[test]
    fn test_parse_error_messages_carry_position() {
        let err = ParseError::invalid_token_at("$", Span::at(3));
        assert_eq!(err.to_string(), "Invalid token: '$' at position 4");

        let err = ParseError::DivisionByZero { span: None };
        assert_eq!(err.to_string(), "Division by zero");
    }

    #[test]
    fn test_shape_error_message() {
        let err = InputShapeError::WrongFieldCount {
            expected: 2,
            got: 1,
            fields: "length, width",
        };
        assert_eq!(
            err.to_string(),
            "expected exactly 2 comma-separated values (length, width), got 1"
        );
    }

    #[test]
    fn test_umbrella_is_transparent() {
        let err: Error = SolveFailure::NoPositiveRealCriticalPoint.into();
        assert_eq!(err.to_string(), "no positive real critical point");
    }
}
