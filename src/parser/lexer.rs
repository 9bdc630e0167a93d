//! Lexer: source text to spanned tokens
//!
//! Letter runs are split greedily against the known vocabulary, longest
//! word first, so `2xsin(x)` lexes as `2`, `x`, `sin`, `(`, `x`, `)` and
//! `pix` as `pi`, `x`. Anything left over is an undeclared name.

use std::sync::OnceLock;

use crate::error::{ParseError, Span};
use crate::expr::Constant;
use crate::functions::Registry;
use crate::parser::tokens::{Callable, Lexeme, Operator, Token};
use crate::traits::parse_decimal;

#[derive(Clone, Copy)]
enum Word {
    Callable(Callable),
    Constant(Constant),
}

/// Function names, aliases and constants, longest first
static VOCABULARY: OnceLock<Vec<(&'static str, Word)>> = OnceLock::new();

fn vocabulary() -> &'static [(&'static str, Word)] {
    VOCABULARY.get_or_init(|| {
        let mut words: Vec<(&'static str, Word)> = Registry::names()
            .filter_map(|name| Registry::lookup(name).map(|f| (name, Word::Callable(Callable::Func(f)))))
            .collect();
        words.push(("sqrt", Word::Callable(Callable::Root(2))));
        words.push(("cbrt", Word::Callable(Callable::Root(3))));
        words.push(("pi", Word::Constant(Constant::Pi)));
        words.push(("e", Word::Constant(Constant::E)));
        words.push(("I", Word::Constant(Constant::I)));
        // Ties broken alphabetically so the order never depends on hash iteration
        words.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        words
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) struct Lexer<'src> {
    input: &'src str,
    variable: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    out: Vec<Lexeme>,
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(input: &'src str, variable: &'src str) -> Self {
        Lexer {
            input,
            variable,
            chars: input.char_indices().collect(),
            pos: 0,
            out: Vec::with_capacity(input.len() / 2 + 1),
        }
    }

    fn offset(&self, idx: usize) -> usize {
        self.chars.get(idx).map_or(self.input.len(), |&(o, _)| o)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn push(&mut self, token: Token, start: usize, end: usize) {
        self.out.push(Lexeme::new(token, Span::new(start, end)));
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Lexeme>, ParseError> {
        while let Some(c) = self.peek(0) {
            let start = self.offset(self.pos);
            match c {
                c if c.is_whitespace() => self.pos += 1,
                '0'..='9' | '.' => self.number()?,
                c if is_word_char(c) => self.word()?,
                '*' if self.peek(1) == Some('*') => {
                    self.pos += 2;
                    self.push(Token::Operator(Operator::Pow), start, start + 2);
                }
                _ => {
                    let token = match c {
                        '+' => Token::Operator(Operator::Add),
                        '-' => Token::Operator(Operator::Sub),
                        '*' => Token::Operator(Operator::Mul),
                        '/' => Token::Operator(Operator::Div),
                        '^' => Token::Operator(Operator::Pow),
                        '(' => Token::LeftParen,
                        ')' => Token::RightParen,
                        ',' => Token::Comma,
                        other => {
                            let end = start + other.len_utf8();
                            return Err(ParseError::invalid_token_at(
                                other.to_string(),
                                Span::new(start, end),
                            ));
                        }
                    };
                    self.pos += 1;
                    self.push(token, start, start + c.len_utf8());
                }
            }
        }
        log::trace!("lexed {} tokens from {:?}", self.out.len(), self.input);
        Ok(self.out)
    }

    /// Digits and dots, then an exponent only when digits follow the `e`.
    /// `2e` therefore lexes as `2` times the constant `e`.
    fn number(&mut self) -> Result<(), ParseError> {
        let begin = self.pos;
        while matches!(self.peek(0), Some('0'..='9' | '.')) {
            self.pos += 1;
        }
        if matches!(self.peek(0), Some('e' | 'E')) {
            let digits_at = match self.peek(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += digits_at;
                while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let (start, end) = (self.offset(begin), self.offset(self.pos));
        let text = &self.input[start..end];
        match parse_decimal(text) {
            Some(value) => {
                self.push(Token::Number(value), start, end);
                Ok(())
            }
            None => Err(ParseError::InvalidNumber {
                value: text.to_string(),
                span: Some(Span::new(start, end)),
            }),
        }
    }

    fn word(&mut self) -> Result<(), ParseError> {
        let begin = self.pos;
        while self.peek(0).is_some_and(is_word_char) {
            self.pos += 1;
        }
        let (start, end) = (self.offset(begin), self.offset(self.pos));
        let followed_by_paren = self.chars[self.pos..]
            .iter()
            .find(|(_, c)| !c.is_whitespace())
            .is_some_and(|&(_, c)| c == '(');

        let word = &self.input[start..end];
        let mut at = 0;
        while at < word.len() {
            let rest = &word[at..];
            let known = vocabulary().iter().find(|(name, _)| rest.starts_with(name));
            let variable_len = if !self.variable.is_empty() && rest.starts_with(self.variable) {
                self.variable.len()
            } else {
                0
            };

            let token_start = start + at;
            match known {
                Some((name, word)) if name.len() >= variable_len => {
                    let token = match *word {
                        Word::Callable(c) => Token::Function(c),
                        Word::Constant(c) => Token::Constant(c),
                    };
                    self.push(token, token_start, token_start + name.len());
                    at += name.len();
                }
                _ if variable_len > 0 => {
                    self.push(
                        Token::Identifier(self.variable.to_string()),
                        token_start,
                        token_start + variable_len,
                    );
                    at += variable_len;
                }
                _ => {
                    let span = Some(Span::new(token_start, end));
                    return Err(if followed_by_paren {
                        ParseError::UnknownFunction {
                            name: rest.to_string(),
                            span,
                        }
                    } else {
                        ParseError::UndeclaredVariable {
                            name: rest.to_string(),
                            variable: self.variable.to_string(),
                            span,
                        }
                    });
                }
            }
        }
        Ok(())
    }
}

/// Tokenize `input`, recognising `variable` as the only free name
pub(crate) fn lex(input: &str, variable: &str) -> Result<Vec<Lexeme>, ParseError> {
    Lexer::new(input, variable).tokenize()
}
