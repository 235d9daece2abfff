//! Parser that consumes the lexer and builds the statement list.
//!
//! Expressions use Pratt-style precedence climbing:
//!
//! ```text
//!     ||  <  &&  <  == !=  <  < <= > >=  <  + -  <  * /  <  unary - !
//! ```
//!
//! Parsing is pure: no binding environment is needed, which is what lets the
//! host validate a finish-day script while the author edits it. Whether a
//! called name exists in the function table is the evaluator's problem.

use super::ast::{BinOp, Expr, SetField, Stmt, UnaryOp};
use super::error::{ParseError, Pos};
use super::lexer::{Lexer, Spanned, Token};

pub struct Parser {
    tokens: Vec<Spanned>,
    idx: usize,
    end: Pos,
}

impl Parser {
    pub fn new(src: &str) -> Result<Self, super::error::LexError> {
        let (tokens, end) = Lexer::tokenize(src)?;
        Ok(Self {
            tokens,
            idx: 0,
            end,
        })
    }

    /// Parse the whole token stream into a statement list; trailing input
    /// that doesn't start a statement is an error.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.idx).map(|s| &s.token)
    }

    fn peek_at(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.idx + n).map(|s| &s.token)
    }

    /// Position of the current token, or end-of-input.
    fn pos(&self) -> Pos {
        self.tokens.get(self.idx).map(|s| s.pos).unwrap_or(self.end)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.idx).cloned();
        if tok.is_some() {
            self.idx += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            pos: self.pos(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t == expected => {
                self.idx += 1;
                Ok(())
            }
            Some(t) => Err(self.error(format!("expected {what}, found {}", t.describe()))),
            None => Err(self.error(format!("expected {what}, found end of script"))),
        }
    }

    fn is_ident(&self, n: usize, name: &str) -> bool {
        matches!(self.peek_at(n), Some(Token::Ident(id)) if id == name)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.is_ident(0, "if") {
            return self.parse_if();
        }

        // `state.x = …` needs four tokens of lookahead; `x = …` two. A bare
        // `state.x` or `x` without `=` falls through to an expression
        // statement.
        if self.is_ident(0, "state")
            && self.peek_at(1) == Some(&Token::Dot)
            && matches!(self.peek_at(2), Some(Token::Ident(_)))
            && self.peek_at(3) == Some(&Token::Assign)
        {
            self.advance(); // state
            self.advance(); // .
            let name = match self.advance().map(|s| s.token) {
                Some(Token::Ident(name)) => name,
                _ => unreachable!(),
            };
            self.advance(); // =
            let value = self.parse_expr(0)?;
            return Ok(Stmt::AssignState { name, value });
        }

        if matches!(self.peek(), Some(Token::Ident(_)))
            && self.peek_at(1) == Some(&Token::Assign)
        {
            let name = match self.advance().map(|s| s.token) {
                Some(Token::Ident(name)) => name,
                _ => unreachable!(),
            };
            self.advance(); // =
            let value = self.parse_expr(0)?;
            return Ok(Stmt::AssignLocal { name, value });
        }

        Ok(Stmt::Expr(self.parse_expr(0)?))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // if
        let cond = self.parse_expr(0)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.is_ident(0, "else") {
            self.advance();
            if self.is_ident(0, "if") {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&Token::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    return Ok(stmts);
                }
                Some(_) => stmts.push(self.parse_stmt()?),
                None => return Err(self.error("expected `}`, found end of script")),
            }
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, bp)) = self.peek().and_then(binding_power) {
            if bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(bp + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Some(Token::Bang) => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Number { .. }) => {
                let Some(Spanned {
                    token: Token::Number { value, unit },
                    ..
                }) = self.advance()
                else {
                    unreachable!()
                };
                Ok(Expr::Number { value, unit })
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::Ident(_)) => self.parse_ident_expr(),
            Some(t) => Err(self.error(format!("unexpected {}", t.describe()))),
            None => Err(self.error("unexpected end of script")),
        }
    }

    fn parse_ident_expr(&mut self) -> Result<Expr, ParseError> {
        let Some(Spanned {
            token: Token::Ident(name),
            ..
        }) = self.advance()
        else {
            unreachable!()
        };

        // state.x
        if name == "state" && self.peek() == Some(&Token::Dot) {
            self.advance();
            match self.advance().map(|s| s.token) {
                Some(Token::Ident(field)) => return Ok(Expr::StateRef(field)),
                _ => return Err(self.error("expected state variable name after `state.`")),
            }
        }

        // reps[exercise, n] / weight[…] / completed[…]
        if let Some(field) = SetField::from_ident(&name) {
            if self.peek() == Some(&Token::LBracket) {
                self.advance();
                let exercise = match self.advance().map(|s| s.token) {
                    Some(Token::Ident(ex)) => ex,
                    _ => {
                        return Err(self.error(format!(
                            "expected exercise name in `{}[…]`",
                            field.name()
                        )));
                    }
                };
                self.expect(&Token::Comma, "`,`")?;
                let set = self.parse_expr(0)?;
                self.expect(&Token::RBracket, "`]`")?;
                return Ok(Expr::SetBinding {
                    field,
                    exercise,
                    set: Box::new(set),
                });
            }
        }

        // function call
        if self.peek() == Some(&Token::LParen) {
            self.advance();
            let mut args = Vec::new();
            if self.peek() != Some(&Token::RParen) {
                loop {
                    args.push(self.parse_expr(0)?);
                    match self.peek() {
                        Some(Token::Comma) => {
                            self.advance();
                        }
                        _ => break,
                    }
                }
            }
            self.expect(&Token::RParen, "`)`")?;
            return Ok(Expr::Call { name, args });
        }

        Ok(Expr::Variable(name))
    }
}

fn binding_power(token: &Token) -> Option<(BinOp, u8)> {
    let pair = match token {
        Token::OrOr => (BinOp::Or, 1),
        Token::AndAnd => (BinOp::And, 2),
        Token::EqEq => (BinOp::Eq, 3),
        Token::BangEq => (BinOp::NotEq, 3),
        Token::Lt => (BinOp::Lt, 4),
        Token::LtEq => (BinOp::LtEq, 4),
        Token::Gt => (BinOp::Gt, 4),
        Token::GtEq => (BinOp::GtEq, 4),
        Token::Plus => (BinOp::Add, 5),
        Token::Minus => (BinOp::Sub, 5),
        Token::Star => (BinOp::Mul, 6),
        Token::Slash => (BinOp::Div, 6),
        _ => return None,
    };
    Some(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::weight::Unit;

    fn parse(src: &str) -> Result<Vec<Stmt>, ParseError> {
        Parser::new(src).expect("lexes").parse()
    }

    fn num(value: f64) -> Expr {
        Expr::Number { value, unit: None }
    }

    #[test]
    fn test_parse_assignments() {
        let test_cases = vec![
            (
                "state.x = 5",
                Stmt::AssignState {
                    name: "x".into(),
                    value: num(5.0),
                },
            ),
            (
                "state.x = state.x + 5",
                Stmt::AssignState {
                    name: "x".into(),
                    value: Expr::Binary(
                        BinOp::Add,
                        Box::new(Expr::StateRef("x".into())),
                        Box::new(num(5.0)),
                    ),
                },
            ),
            (
                "reps = 8",
                Stmt::AssignLocal {
                    name: "reps".into(),
                    value: num(8.0),
                },
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(parse(src), Ok(vec![expected]), "parsing {src:?}");
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let stmts = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Expr(Expr::Binary(
                BinOp::Add,
                Box::new(num(1.0)),
                Box::new(Expr::Binary(
                    BinOp::Mul,
                    Box::new(num(2.0)),
                    Box::new(num(3.0))
                )),
            ))]
        );

        // comparison binds looser than arithmetic, && looser still
        let stmts = parse("a + 1 > b && !done").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Expr(Expr::Binary(
                BinOp::And,
                Box::new(Expr::Binary(
                    BinOp::Gt,
                    Box::new(Expr::Binary(
                        BinOp::Add,
                        Box::new(Expr::Variable("a".into())),
                        Box::new(num(1.0)),
                    )),
                    Box::new(Expr::Variable("b".into())),
                )),
                Box::new(Expr::Unary(
                    UnaryOp::Not,
                    Box::new(Expr::Variable("done".into()))
                )),
            ))]
        );
    }

    #[test]
    fn test_parse_if_else_chain() {
        let src = "if completed[squat, 3] { state.w = state.w + 2.5kg } \
                   else if day == 2 { state.w = state.w } \
                   else { state.fails = state.fails + 1 }";
        let stmts = parse(src).unwrap();
        assert_eq!(stmts.len(), 1);
        let Stmt::If {
            cond, else_branch, ..
        } = &stmts[0]
        else {
            panic!("expected if, got {stmts:?}");
        };
        assert_eq!(
            *cond,
            Expr::SetBinding {
                field: SetField::Completed,
                exercise: "squat".into(),
                set: Box::new(num(3.0)),
            }
        );
        // else-if nests as a single-statement else branch
        let inner = else_branch.as_ref().unwrap();
        assert!(matches!(inner[0], Stmt::If { .. }));
    }

    #[test]
    fn test_parse_calls_and_units() {
        let stmts = parse("state.tm = calculateTrainingMax(weight[press, 1], reps[press, 1])")
            .unwrap();
        let Stmt::AssignState { value, .. } = &stmts[0] else {
            panic!();
        };
        let Expr::Call { name, args } = value else {
            panic!("expected call, got {value:?}");
        };
        assert_eq!(name, "calculateTrainingMax");
        assert_eq!(args.len(), 2);

        let stmts = parse("bodyweight - 20lb").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Expr(Expr::Binary(
                BinOp::Sub,
                Box::new(Expr::Variable("bodyweight".into())),
                Box::new(Expr::Number {
                    value: 20.0,
                    unit: Some(Unit::Lb),
                }),
            ))]
        );
    }

    #[test]
    fn test_deterministic() {
        let src = "if day == 1 { state.x = roundWeight(state.x * 1.05) } else { 5 }";
        assert_eq!(parse(src).unwrap(), parse(src).unwrap());
    }

    #[test]
    fn test_parse_errors() {
        // double `=`: error lands exactly on the second `=`
        let err = parse("state.x = = 5").unwrap_err();
        assert_eq!((err.pos.line, err.pos.col), (1, 11));
        assert!(err.message.contains("`=`"), "{}", err.message);

        // unmatched grouping
        let err = parse("(1 + 2").unwrap_err();
        assert!(err.message.contains("`)`"), "{}", err.message);

        // unmatched block
        let err = parse("if done { state.x = 1").unwrap_err();
        assert!(err.message.contains("`}`"), "{}", err.message);

        // trailing garbage after a complete statement
        let err = parse("state.x = 5 )").unwrap_err();
        assert_eq!((err.pos.line, err.pos.col), (1, 13));
    }
}
