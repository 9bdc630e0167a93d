use crate::error::Span;
use crate::expr::Constant;
use crate::functions::Func;
use crate::traits::Rational;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Operator {
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 10,
            Operator::Mul | Operator::Div => 20,
            Operator::Pow => 30,
        }
    }

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
        }
    }
}

/// Anything that can be applied with call syntax `name(arg)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Callable {
    Func(Func),
    /// `sqrt` and `cbrt`, which become fractional powers
    Root(u32),
}

impl Callable {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Callable::Func(f) => f.name(),
            Callable::Root(2) => "sqrt",
            Callable::Root(_) => "cbrt",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(Rational),
    /// The declared variable
    Identifier(String),
    Constant(Constant),
    Function(Callable),
    Operator(Operator),
    LeftParen,
    RightParen,
    Comma,
}

impl Token {
    /// Convert token to a user-friendly string for error messages
    pub(crate) fn to_user_string(&self) -> String {
        match self {
            Token::Number(n) => {
                if n.is_integer() {
                    n.numer().to_string()
                } else {
                    format!("{}/{}", n.numer(), n.denom())
                }
            }
            Token::Identifier(s) => s.clone(),
            Token::Constant(c) => c.name().to_string(),
            Token::Function(f) => f.name().to_string(),
            Token::Operator(op) => op.symbol().to_string(),
            Token::LeftParen => "(".to_string(),
            Token::RightParen => ")".to_string(),
            Token::Comma => ",".to_string(),
        }
    }
}

/// A token with its location in the source text
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub span: Span,
}

impl Lexeme {
    pub(crate) fn new(token: Token, span: Span) -> Self {
        Lexeme { token, span }
    }
}
