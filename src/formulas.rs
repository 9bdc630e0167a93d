//! Reference formulas shown next to each word-problem category
//!
//! Entries are LaTeX source, read-only and keyed by category.

use crate::problems::WordProblemCategory;

const BASIC_FUNCTION: &[&str] = &[
    r"\frac{d}{dx} x^{n} = n x^{n-1}",
    r"\frac{d}{dx} \left(f g\right) = f' g + f g'",
    r"\frac{d}{dx} \frac{f}{g} = \frac{f' g - f g'}{g^{2}}",
    r"\frac{d}{dx} f\left(g(x)\right) = f'\left(g(x)\right) g'(x)",
    r"\frac{d}{dx} \sin x = \cos x, \quad \frac{d}{dx} \cos x = -\sin x",
    r"\frac{d}{dx} e^{x} = e^{x}, \quad \frac{d}{dx} \ln x = \frac{1}{x}",
];

const PLANE_AREA_PERIMETER: &[&str] = &[
    r"A_{\text{rectangle}} = l \cdot w",
    r"P_{\text{rectangle}} = 2 (l + w)",
    r"A_{\text{square}} = s^{2}, \quad P_{\text{square}} = 4 s",
    r"A_{\text{triangle}} = \frac{1}{2} b h",
    r"A_{\text{circle}} = \pi r^{2}, \quad C_{\text{circle}} = 2 \pi r",
];

const SOLID_VOLUME: &[&str] = &[
    r"V_{\text{cuboid}} = l \cdot w \cdot h",
    r"V_{\text{cube}} = s^{3}",
    r"V_{\text{cylinder}} = \pi r^{2} h",
    r"V_{\text{cone}} = \frac{1}{3} \pi r^{2} h",
    r"V_{\text{sphere}} = \frac{4}{3} \pi r^{3}",
];

const OPTIMIZATION: &[&str] = &[
    r"f'(x) = 0",
    r"f''(x) < 0 \Rightarrow \text{local maximum}",
    r"f''(x) > 0 \Rightarrow \text{local minimum}",
    r"P(x) = R(x) - C(x) = x \cdot p(x) - C(x)",
];

const DEFINITE_INTEGRAL: &[&str] = &[
    r"\int_{a}^{b} f(x)\,dx = F(b) - F(a)",
    r"\int x^{n}\,dx = \frac{x^{n+1}}{n+1} + C, \quad n \neq -1",
    r"\int \frac{1}{x}\,dx = \ln\left|x\right| + C",
    r"\int e^{x}\,dx = e^{x} + C",
    r"V = \pi \int_{a}^{b} \left(f(x)\right)^{2}\,dx",
];

/// Formulas related to `category`
///
/// ```
/// use storymath::{WordProblemCategory, list_formulas};
///
/// assert!(!list_formulas(WordProblemCategory::SolidVolume).is_empty());
/// ```
pub fn list_formulas(category: WordProblemCategory) -> &'static [&'static str] {
    match category {
        WordProblemCategory::BasicFunction => BASIC_FUNCTION,
        WordProblemCategory::PlaneAreaPerimeter => PLANE_AREA_PERIMETER,
        WordProblemCategory::SolidVolume => SOLID_VOLUME,
        WordProblemCategory::Optimization => OPTIMIZATION,
        WordProblemCategory::DefiniteIntegral => DEFINITE_INTEGRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_formulas() {
        for category in WordProblemCategory::ALL {
            assert!(!list_formulas(category).is_empty(), "{category}");
        }
    }

    #[test]
    fn test_table_is_category_specific() {
        assert!(list_formulas(WordProblemCategory::SolidVolume)[0].contains("cuboid"));
        assert!(list_formulas(WordProblemCategory::DefiniteIntegral)[0].contains(r"\int"));
    }
}
