//! Raw word-problem input and its shape checks

use num_traits::Signed;

use crate::error::InputShapeError;
use crate::optimize::ObjectiveKind;
use crate::traits::{Rational, parse_decimal};

/// What the user typed, before any parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawInput {
    /// A formula, or comma-separated values, depending on the category
    Text(String),
    /// Integrand and bounds entered separately
    Integral {
        function: String,
        lower: String,
        upper: String,
    },
    /// An objective with a label: area `A(x)`, volume `V(x)`, ...
    Objective { function: String, kind: ObjectiveKind },
    /// Profit from a unit price `p(x)` and a total cost `C(x)`
    Profit { price: String, cost: String },
}

impl RawInput {
    pub fn text(s: impl Into<String>) -> Self {
        RawInput::Text(s.into())
    }
}

impl From<&str> for RawInput {
    fn from(s: &str) -> Self {
        RawInput::Text(s.to_string())
    }
}

impl From<String> for RawInput {
    fn from(s: String) -> Self {
        RawInput::Text(s)
    }
}

/// Exactly `names.len()` strictly positive comma-separated numbers
pub(crate) fn dimensions(
    raw: &str,
    names: &[&'static str],
    fields: &'static str,
) -> Result<Vec<Rational>, InputShapeError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != names.len() {
        return Err(InputShapeError::WrongFieldCount {
            expected: names.len(),
            got: parts.len(),
            fields,
        });
    }

    parts
        .iter()
        .zip(names)
        .enumerate()
        .map(|(i, (part, name))| {
            let value = parse_decimal(part).ok_or_else(|| InputShapeError::NotNumeric {
                index: i + 1,
                value: part.to_string(),
            })?;
            if !value.is_positive() {
                return Err(InputShapeError::NonPositive {
                    name: *name,
                    value: part.to_string(),
                });
            }
            Ok(value)
        })
        .collect()
}

/// `"f(x), a, b"`; the bounds are split off from the right
pub(crate) fn integral_fields(raw: &str) -> Result<(String, String, String), InputShapeError> {
    let mut parts: Vec<&str> = raw.rsplitn(3, ',').map(str::trim).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(InputShapeError::WrongFieldCount {
            expected: 3,
            got: raw.split(',').filter(|p| !p.trim().is_empty()).count(),
            fields: "function, lower bound, upper bound",
        });
    }
    parts.reverse();
    Ok((parts[0].to_string(), parts[1].to_string(), parts[2].to_string()))
}
