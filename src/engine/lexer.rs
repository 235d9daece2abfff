//! Hand-written lexer for the progression script language.
//!
//! Breaks the raw source string into position-tagged `Token`s. Keywords
//! (`state`, `if`, `else`) and binding fields (`reps`, `weight`,
//! `completed`) all come out as `Ident` — the parser interprets them later.
//
//  Lexical items:
//
//      Ident    ::= [A-Za-z_][A-Za-z0-9_]*
//      Number   ::= [0-9]+ ('.' [0-9]+)?  with optional unit suffix kg|lb
//      Ops      ::= + - * / = == != < <= > >= && || !
//      Punct    ::= ( ) { } [ ] , .
//      Whitespace and comments (# until end-of-line) are discarded.

use std::iter::Peekable;
use std::str::Chars;

use super::error::{LexError, Pos};
use crate::model::weight::Unit;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal; a `kg`/`lb` suffix is attached here as metadata,
    /// not emitted as a separate token.
    Number { value: f64, unit: Option<Unit> },
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Assign,   // '='
    EqEq,     // '=='
    BangEq,   // '!='
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,   // '&&'
    OrOr,     // '||'
    Bang,     // '!'
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

impl Token {
    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self {
            Token::Number { value, unit: None } => format!("number `{value}`"),
            Token::Number {
                value,
                unit: Some(u),
            } => format!("number `{value}{u}`"),
            Token::Ident(name) => format!("`{name}`"),
            Token::Plus => "`+`".into(),
            Token::Minus => "`-`".into(),
            Token::Star => "`*`".into(),
            Token::Slash => "`/`".into(),
            Token::Assign => "`=`".into(),
            Token::EqEq => "`==`".into(),
            Token::BangEq => "`!=`".into(),
            Token::Lt => "`<`".into(),
            Token::LtEq => "`<=`".into(),
            Token::Gt => "`>`".into(),
            Token::GtEq => "`>=`".into(),
            Token::AndAnd => "`&&`".into(),
            Token::OrOr => "`||`".into(),
            Token::Bang => "`!`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::LBrace => "`{`".into(),
            Token::RBrace => "`}`".into(),
            Token::LBracket => "`[`".into(),
            Token::RBracket => "`]`".into(),
            Token::Comma => "`,`".into(),
            Token::Dot => "`.`".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: Pos,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Pos,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            pos: Pos {
                offset: 0,
                line: 1,
                col: 1,
            },
        }
    }

    /// Collect the whole stream; position of end-of-input comes back too so
    /// the parser can point "unexpected end" errors somewhere.
    pub fn tokenize(src: &'a str) -> Result<(Vec<Spanned>, Pos), LexError> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        for item in &mut lexer {
            tokens.push(item?);
        }
        Ok((tokens, lexer.pos))
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut id = String::new();
        id.push(first);
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut id);
        id
    }

    fn read_number(&mut self, first: char, start: Pos) -> Result<Token, LexError> {
        let mut num = String::new();
        num.push(first);
        self.consume_while(|c| c.is_ascii_digit(), &mut num);
        if self.peek_char() == Some('.') {
            // Only consume the dot when a fraction follows; `reps.foo` is
            // not valid anyway but the number must not eat the dot.
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                num.push('.');
                self.next_char();
                self.consume_while(|c| c.is_ascii_digit(), &mut num);
            }
        }
        let value: f64 = num.parse().map_err(|_| LexError {
            pos: start,
            message: format!("invalid number `{num}`"),
        })?;

        // Unit suffix sticks directly to the digits: `20lb`, `2.5kg`.
        let unit = if self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            let suffix_pos = self.pos;
            let first = self.next_char().unwrap_or('\0');
            let suffix = self.read_identifier(first);
            match suffix.parse::<Unit>() {
                Ok(u) => Some(u),
                Err(_) => {
                    return Err(LexError {
                        pos: suffix_pos,
                        message: format!("unknown unit suffix `{suffix}`"),
                    });
                }
            }
        } else {
            None
        };

        Ok(Token::Number { value, unit })
    }

    /// Two-character operator if the next char matches, else the fallback.
    fn two_char(&mut self, expect: char, double: Token, single: Token) -> Token {
        if self.peek_char() == Some(expect) {
            self.next_char();
            double
        } else {
            single
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Spanned, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Skip whitespace and # comments
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some('#') => {
                    while let Some(c) = self.next_char() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }

        let start = self.pos;
        let ch = self.next_char()?;

        let tok_res = match ch {
            '+' => Ok(Token::Plus),
            '-' => Ok(Token::Minus),
            '*' => Ok(Token::Star),
            '/' => Ok(Token::Slash),
            '(' => Ok(Token::LParen),
            ')' => Ok(Token::RParen),
            '{' => Ok(Token::LBrace),
            '}' => Ok(Token::RBrace),
            '[' => Ok(Token::LBracket),
            ']' => Ok(Token::RBracket),
            ',' => Ok(Token::Comma),
            '.' => Ok(Token::Dot),
            '=' => Ok(self.two_char('=', Token::EqEq, Token::Assign)),
            '!' => Ok(self.two_char('=', Token::BangEq, Token::Bang)),
            '<' => Ok(self.two_char('=', Token::LtEq, Token::Lt)),
            '>' => Ok(self.two_char('=', Token::GtEq, Token::Gt)),
            '&' => {
                if self.peek_char() == Some('&') {
                    self.next_char();
                    Ok(Token::AndAnd)
                } else {
                    Err(LexError {
                        pos: start,
                        message: "expected `&&`".into(),
                    })
                }
            }
            '|' => {
                if self.peek_char() == Some('|') {
                    self.next_char();
                    Ok(Token::OrOr)
                } else {
                    Err(LexError {
                        pos: start,
                        message: "expected `||`".into(),
                    })
                }
            }
            c if c.is_ascii_digit() => self.read_number(c, start),
            c if c.is_ascii_alphabetic() || c == '_' => {
                Ok(Token::Ident(self.read_identifier(c)))
            }
            c => Err(LexError {
                pos: start,
                message: format!("unexpected character `{c}`"),
            }),
        };

        Some(tok_res.map(|token| Spanned { token, pos: start }))
    }
}
