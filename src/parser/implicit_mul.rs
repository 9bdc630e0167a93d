//! Implicit multiplication insertion for natural notation
//!
//! Inserts `*` operators between tokens where multiplication is implied, e.g. `2x` → `2 * x`.

use crate::error::Span;
use crate::parser::tokens::{Lexeme, Operator, Token};

/// Check if implicit multiplication should be inserted between two tokens
fn should_insert_mul(current: &Token, next: &Token) -> bool {
    match (current, next) {
        // Coalesced arms for standard multiplication cases:
        // Number * Identifier: 2x
        // Number * Constant: 2pi
        // Number * Function: 4sin(x)
        // Number * (: 2(x)
        // Identifier * Constant: xe
        // ) * Function: (a)sin(x)
        // ) * (: )(
        (
            Token::Number(_) | Token::Identifier(_) | Token::Constant(_) | Token::RightParen,
            Token::Identifier(_) | Token::Constant(_) | Token::Function(_) | Token::LeftParen,
        ) => true,

        // Identifier * Number: x2
        // ) * Number: )2
        (Token::Identifier(_) | Token::Constant(_) | Token::RightParen, Token::Number(_)) => true,

        // Function followed by ( is a call, and two numbers in a row stay an error
        _ => false,
    }
}

/// Insert implicit multiplication operators between appropriate tokens
///
/// Rules:
/// - Number * Identifier/Constant/Function: `2 x` → `2 * x`
/// - Identifier/Constant * anything but an operator: `x pi` → `x * pi`
/// - ) * Identifier/Number/(: `(a) x` → `(a) * x`
///
/// Exception: Function followed by ( is NOT multiplication
pub(crate) fn insert_implicit_multiplication(tokens: Vec<Lexeme>) -> Vec<Lexeme> {
    if tokens.len() < 2 {
        return tokens;
    }

    let needs_insert = tokens
        .windows(2)
        .any(|w| should_insert_mul(&w[0].token, &w[1].token));
    if !needs_insert {
        return tokens;
    }

    let mut result = Vec::with_capacity(tokens.len() * 3 / 2);
    let mut it = tokens.into_iter().peekable();

    while let Some(current) = it.next() {
        let insert = it
            .peek()
            .is_some_and(|next| should_insert_mul(&current.token, &next.token));
        let at = current.span.end;
        result.push(current);
        if insert {
            // Zero-width span: there is no character to point at
            result.push(Lexeme::new(Token::Operator(Operator::Mul), Span::new(at, at)));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;

    fn shapes(input: &str) -> Vec<String> {
        insert_implicit_multiplication(lex(input, "x").unwrap())
            .iter()
            .map(|l| l.token.to_user_string())
            .collect()
    }

    #[test]
    fn test_number_identifier() {
        assert_eq!(shapes("2x"), vec!["2", "*", "x"]);
    }

    #[test]
    fn test_function_call_keeps_paren() {
        assert_eq!(shapes("3sin(x)"), vec!["3", "*", "sin", "(", "x", ")"]);
    }

    #[test]
    fn test_adjacent_parens() {
        assert_eq!(shapes("(x)(x)"), vec!["(", "x", ")", "*", "(", "x", ")"]);
        assert_eq!(shapes("x(x+1)"), vec!["x", "*", "(", "x", "+", "1", ")"]);
    }

    #[test]
    fn test_constants() {
        assert_eq!(shapes("2pix"), vec!["2", "*", "pi", "*", "x"]);
    }

    #[test]
    fn test_no_insertion_between_numbers() {
        assert_eq!(shapes("2 3"), vec!["2", "3"]);
    }
}
