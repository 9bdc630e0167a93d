//! Parser module - converts formula strings to canonical expressions
mod implicit_mul;
mod lexer;
mod pratt;
mod tokens;

use crate::Expr;
use crate::error::ParseError;

/// Size limits enforced on every parsed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseLimits {
    /// Maximum nesting depth of the resulting tree
    pub max_depth: usize,
    /// Maximum number of nodes in the resulting tree
    pub max_nodes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        ParseLimits {
            max_depth: crate::DEFAULT_MAX_DEPTH,
            max_nodes: crate::DEFAULT_MAX_NODES,
        }
    }
}

/// Parse a formula string into a canonical expression in one variable
///
/// Accepts numbers (`2`, `0.5`, `1e-3`), the declared `variable`, the
/// constants `pi`, `e` and `I`, the operators `+ - * / ^` (and `**` for
/// powers), parentheses, the elementary functions, `sqrt` and `cbrt`.
/// Multiplication may be implicit: `2x`, `3sin(x)`, `(x+1)(x-1)`.
///
/// The result is already in canonical form: like terms are combined,
/// numeric subexpressions are folded exactly and `x/x` is `1`.
///
/// # Example
/// ```
/// use storymath::parse;
///
/// let expr = parse("60x - 2x^2", "x").unwrap();
/// assert_eq!(expr.to_string(), "60*x - 2*x^2");
/// ```
///
/// # Errors
/// Returns `ParseError` if:
/// - The input is empty
/// - A character, number or name is not recognised
/// - A name other than `variable` appears
/// - Parentheses are unbalanced or an operator is dangling
/// - A divisor folds to exactly zero
/// - The tree exceeds the default [`ParseLimits`]
pub fn parse(input: &str, variable: &str) -> Result<Expr, ParseError> {
    parse_with_limits(input, variable, ParseLimits::default())
}

/// [`parse`] with explicit size limits
pub fn parse_with_limits(
    input: &str,
    variable: &str,
    limits: ParseLimits,
) -> Result<Expr, ParseError> {
    // Pipeline: validate -> lex -> implicit_mul -> parse -> limits

    // Step 1: Validate input
    if input.trim().is_empty() {
        return Err(ParseError::EmptyFormula);
    }

    // Step 2: Lexing
    let tokens = lexer::lex(input, variable)?;

    // Step 3: Insert implicit multiplication
    let tokens = implicit_mul::insert_implicit_multiplication(tokens);
    log::trace!(
        "tokens: {:?}",
        tokens.iter().map(|l| l.token.to_user_string()).collect::<Vec<_>>()
    );

    // Step 4: Build the tree
    let expr = pratt::parse_expression(&tokens, limits.max_depth)?;

    // Step 5: Enforce size limits on the canonical result
    if expr.max_depth() > limits.max_depth {
        return Err(ParseError::MaxDepthExceeded);
    }
    if expr.node_count() > limits.max_nodes {
        return Err(ParseError::MaxNodesExceeded);
    }

    log::debug!("parsed {input:?} as {expr}");
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprKind;
    use crate::functions::Func;

    fn p(input: &str) -> Expr {
        parse(input, "x").unwrap()
    }

    #[test]
    fn test_parse_polynomial() {
        assert_eq!(p("60x - 2x^2").to_string(), "60*x - 2*x^2");
        assert_eq!(p("3x^2 + 5x - 7").to_string(), "-7 + 5*x + 3*x^2");
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(p("2^3^2"), Expr::integer(512));
        assert_eq!(p("-x^2"), Expr::symbol("x").powi(2).negate());
        assert_eq!(p("1 + 2*3"), Expr::integer(7));
        assert_eq!(p("8/4/2"), Expr::one());
        assert_eq!(p("2^-1"), Expr::rational(1, 2));
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(p("2x"), p("2*x"));
        assert_eq!(p("(x+1)(x-1)"), p("(x+1)*(x-1)"));
        assert_eq!(p("2pi"), p("2*pi"));
        assert_eq!(p("x**2"), p("x^2"));
    }

    #[test]
    fn test_functions_and_roots() {
        let e = p("sin(x)");
        assert!(matches!(e.kind(), ExprKind::Call(Func::Sin, _)));
        assert_eq!(p("sqrt(8)").to_string(), "2*sqrt(2)");
        assert_eq!(p("cbrt(-8)"), Expr::integer(-2));
        assert_eq!(p("log(x)"), p("ln(x)"));
    }

    #[test]
    fn test_exact_decimals() {
        assert_eq!(p("0.1 + 0.2"), Expr::rational(3, 10));
    }

    #[test]
    fn test_canonical_cancellation() {
        assert_eq!(p("x/x"), Expr::one());
        assert_eq!(p("x - x"), Expr::zero());
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("", "x"), Err(ParseError::EmptyFormula));
        assert_eq!(parse("   ", "x"), Err(ParseError::EmptyFormula));
        assert_eq!(parse("x +", "x"), Err(ParseError::UnexpectedEndOfInput));
        assert!(matches!(parse("(x + 1", "x"), Err(ParseError::InvalidSyntax { .. })));
        assert!(matches!(parse("x + 1)", "x"), Err(ParseError::InvalidSyntax { .. })));
        assert!(matches!(parse("x / (2 - 2)", "x"), Err(ParseError::DivisionByZero { .. })));
        assert!(matches!(parse("sin(x, x)", "x"), Err(ParseError::ArityMismatch { got: 2, .. })));
        assert!(matches!(parse("2 3", "x"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(parse("y^2", "x"), Err(ParseError::UndeclaredVariable { .. })));
        assert!(matches!(parse("sin x", "x"), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_custom_variable() {
        let e = parse("t^2 + tan(t)", "t").unwrap();
        assert!(e.contains_var("t"));
        assert!(parse("x", "t").is_err());
    }

    #[test]
    fn test_size_limits() {
        let deep = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&deep, "x"), Err(ParseError::MaxDepthExceeded));

        let tight = ParseLimits {
            max_depth: 100,
            max_nodes: 3,
        };
        assert_eq!(
            parse_with_limits("sin(x) + cos(x)", "x", tight),
            Err(ParseError::MaxNodesExceeded)
        );
    }
}
