use num_traits::Signed;

use crate::error::{ParseError, Span};
use crate::expr::Expr;
use crate::parser::tokens::{Callable, Lexeme, Operator, Token};
use crate::traits::ratio;

/// Parse tokens into an AST using Pratt parsing algorithm
///
/// `max_nesting` bounds the recursion so hostile input cannot exhaust the stack.
pub(crate) fn parse_expression(tokens: &[Lexeme], max_nesting: usize) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyFormula);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        nesting: 0,
        max_nesting,
    };

    let expr = parser.parse_expr(0)?;

    // Anything left over means the formula did not end where an expression can
    if let Some(lexeme) = parser.current() {
        return Err(match lexeme.token {
            Token::RightParen => ParseError::invalid_syntax_at("unmatched ')'", lexeme.span),
            _ => ParseError::unexpected_at(
                "operator or end of input",
                lexeme.token.to_user_string(),
                lexeme.span,
            ),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Lexeme],
    pos: usize,
    nesting: usize,
    max_nesting: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Lexeme> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect_right_paren(&mut self, opened_at: Span) -> Result<(), ParseError> {
        match self.current() {
            Some(Lexeme {
                token: Token::RightParen,
                ..
            }) => {
                self.advance(); // consume )
                Ok(())
            }
            Some(other) => Err(ParseError::unexpected_at(
                ")",
                other.token.to_user_string(),
                other.span,
            )),
            None => Err(ParseError::invalid_syntax_at(
                "missing closing parenthesis",
                opened_at,
            )),
        }
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        self.nesting += 1;
        if self.nesting > self.max_nesting {
            return Err(ParseError::MaxDepthExceeded);
        }

        // Parse left side (prefix)
        let mut left = self.parse_prefix()?;

        // Parse operators and right side (infix)
        while let Some(lexeme) = self.current() {
            let precedence = match lexeme.token {
                Token::Operator(op) => op.precedence(),
                _ => break,
            };

            if precedence < min_precedence {
                break;
            }

            left = self.parse_infix(left, precedence)?;
        }

        self.nesting -= 1;
        Ok(left)
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(Lexeme {
            token: Token::RightParen,
            ..
        }) = self.current()
        {
            return Ok(args); // Empty argument list
        }

        loop {
            args.push(self.parse_expr(0)?);

            match self.current().map(|l| &l.token) {
                Some(Token::Comma) => {
                    self.advance(); // consume ,
                }
                _ => break,
            }
        }

        Ok(args)
    }

    fn parse_call(&mut self, callable: Callable, name_span: Span) -> Result<Expr, ParseError> {
        // Function must be followed by (
        let open = match self.current() {
            Some(l) if l.token == Token::LeftParen => l.span,
            Some(other) => {
                return Err(ParseError::unexpected_at(
                    "(",
                    other.token.to_user_string(),
                    other.span,
                ));
            }
            None => return Err(ParseError::UnexpectedEndOfInput),
        };
        self.advance(); // consume (
        let mut args = self.parse_arguments()?;
        self.expect_right_paren(open)?;

        if args.len() != 1 {
            return Err(ParseError::ArityMismatch {
                name: callable.name().to_string(),
                expected: 1,
                got: args.len(),
                span: Some(name_span),
            });
        }
        let arg = args.remove(0);

        Ok(match callable {
            Callable::Func(func) => Expr::call(func, arg),
            Callable::Root(q) => Expr::pow(arg, Expr::number(ratio(1, i64::from(q)))),
        })
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let lexeme = self.current().ok_or(ParseError::UnexpectedEndOfInput)?;

        match &lexeme.token {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::number(n.clone()))
            }

            Token::Identifier(name) => {
                self.advance();
                Ok(Expr::symbol(name))
            }

            Token::Constant(c) => {
                self.advance();
                Ok(Expr::constant(*c))
            }

            Token::Function(callable) => {
                self.advance();
                self.parse_call(*callable, lexeme.span)
            }

            // Unary minus: precedence between Mul (20) and Pow (30)
            // This ensures -x^2 parses as -(x^2), not (-x)^2
            Token::Operator(Operator::Sub) => {
                self.advance();
                let expr = self.parse_expr(25)?;
                Ok(expr.negate())
            }

            // Unary plus: same precedence as unary minus, just returns the expression
            Token::Operator(Operator::Add) => {
                self.advance();
                self.parse_expr(25)
            }

            Token::LeftParen => {
                self.advance(); // consume (
                let expr = self.parse_expr(0)?;
                self.expect_right_paren(lexeme.span)?;
                Ok(expr)
            }

            other => Err(ParseError::unexpected_at(
                "expression",
                other.to_user_string(),
                lexeme.span,
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr, precedence: u8) -> Result<Expr, ParseError> {
        let lexeme = self.current().ok_or(ParseError::UnexpectedEndOfInput)?;
        let Token::Operator(op) = lexeme.token else {
            return Err(ParseError::unexpected_at(
                "operator",
                lexeme.token.to_user_string(),
                lexeme.span,
            ));
        };
        self.advance();

        // Pow is right-associative: a^b^c = a^(b^c)
        let next_precedence = if op == Operator::Pow {
            precedence
        } else {
            precedence + 1
        };
        let right = self.parse_expr(next_precedence)?;

        match op {
            Operator::Add => Ok(Expr::add_expr(left, right)),
            Operator::Sub => Ok(Expr::sub_expr(left, right)),
            Operator::Mul => Ok(Expr::mul_expr(left, right)),
            Operator::Div => {
                if right.is_zero() {
                    return Err(ParseError::DivisionByZero {
                        span: Some(lexeme.span),
                    });
                }
                Ok(Expr::div_expr(left, right))
            }
            Operator::Pow => {
                if left.is_zero() && right.as_number().is_some_and(|n| n.is_negative()) {
                    return Err(ParseError::DivisionByZero {
                        span: Some(lexeme.span),
                    });
                }
                Ok(Expr::pow(left, right))
            }
        }
    }
}
