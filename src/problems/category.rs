//! Word-problem categories and their stable keys

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The kinds of word problem the dispatcher can solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WordProblemCategory {
    /// Differentiate a function once
    BasicFunction,
    /// Area and perimeter of a rectangle
    PlaneAreaPerimeter,
    /// Volume of a cuboid
    SolidVolume,
    Optimization,
    DefiniteIntegral,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown word-problem category '{0}'")]
pub struct UnknownCategory(pub String);

impl WordProblemCategory {
    pub const ALL: [WordProblemCategory; 5] = [
        WordProblemCategory::BasicFunction,
        WordProblemCategory::PlaneAreaPerimeter,
        WordProblemCategory::SolidVolume,
        WordProblemCategory::Optimization,
        WordProblemCategory::DefiniteIntegral,
    ];

    /// Stable machine key, round-trips through [`FromStr`]
    pub fn key(self) -> &'static str {
        match self {
            WordProblemCategory::BasicFunction => "basic_function",
            WordProblemCategory::PlaneAreaPerimeter => "plane_area_perimeter",
            WordProblemCategory::SolidVolume => "solid_volume",
            WordProblemCategory::Optimization => "optimization",
            WordProblemCategory::DefiniteIntegral => "definite_integral",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WordProblemCategory::BasicFunction => "Function & derivative",
            WordProblemCategory::PlaneAreaPerimeter => "Plane area & perimeter",
            WordProblemCategory::SolidVolume => "Solid volume",
            WordProblemCategory::Optimization => "Optimization (maximum value)",
            WordProblemCategory::DefiniteIntegral => "Definite integral",
        }
    }

    /// What the user is asked to enter
    pub fn prompt(self) -> &'static str {
        match self {
            WordProblemCategory::BasicFunction => "Enter a function f(x) to differentiate",
            WordProblemCategory::PlaneAreaPerimeter => "Enter the dimensions (length, width), separated by a comma",
            WordProblemCategory::SolidVolume => {
                "Enter the dimensions (length, width, height), separated by commas"
            }
            WordProblemCategory::Optimization => "Enter the function f(x) to maximize",
            WordProblemCategory::DefiniteIntegral => "Enter the integrand f(x) and the bounds a, b",
        }
    }

    /// A representative input for the prompt
    pub fn example_input(self) -> &'static str {
        match self {
            WordProblemCategory::BasicFunction => "3*x**2 + 5*x - 7",
            WordProblemCategory::PlaneAreaPerimeter => "10, 5",
            WordProblemCategory::SolidVolume => "10, 5, 3",
            WordProblemCategory::Optimization => "60*x - 2*x**2",
            WordProblemCategory::DefiniteIntegral => "x**2, 0, 2",
        }
    }
}

impl fmt::Display for WordProblemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WordProblemCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        WordProblemCategory::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or(UnknownCategory(s.to_string()))
    }
}
