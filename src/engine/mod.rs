//! The scripting engine: lexer → parser → evaluator.
//!
//! Script grammar (informal):
//!
//! ```text
//!     program  ::= stmt*
//!     stmt     ::= "state" "." IDENT "=" expr
//!                | IDENT "=" expr
//!                | "if" expr "{" stmt* "}" ("else" ("if" … | "{" stmt* "}"))?
//!                | expr
//!     expr     ::= numbers (optional kg/lb suffix), bare identifiers,
//!                  state.x, reps|weight|completed "[" exercise "," n "]",
//!                  calls f(a, b), grouping, and the operators
//!                  || && == != < <= > >= + - * / with unary - and !
//! ```
//!
//! The grammar is versioned with the crate: script text persists as data
//! inside saved programs, so changes here must stay backward compatible.

pub mod ast;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use env::{ScriptBindings, ScriptFunctions, Value};
pub use error::{EvalError, LexError, ParseError, Pos, ScriptError};
pub use evaluator::ScriptTarget;

use crate::model::program::ProgramState;
use crate::model::weight::Unit;
use ast::Stmt;
use env::Environment;

/// Validate syntax only. Needs no binding environment; used while the
/// author edits a script that has never run.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let mut parser = parser::Parser::new(source)?;
    Ok(parser.parse()?)
}

/// One script plus everything it is allowed to see. The state handed in is
/// already a snapshot; the runner never touches the caller's dictionary.
pub struct ScriptRunner<'a> {
    source: &'a str,
    state: ProgramState,
    bindings: ScriptBindings,
    functions: ScriptFunctions,
    unit: Unit,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(
        source: &'a str,
        state: ProgramState,
        bindings: ScriptBindings,
        functions: ScriptFunctions,
        unit: Unit,
    ) -> Self {
        Self {
            source,
            state,
            bindings,
            functions,
            unit,
        }
    }

    pub fn parse(&self) -> Result<Vec<Stmt>, ScriptError> {
        parse(self.source)
    }

    /// Planning mode: project one target value; local bindings only,
    /// nothing persists.
    pub fn plan(&self, target: ScriptTarget) -> Result<Value, ScriptError> {
        let stmts = self.parse()?;
        let env = Environment::new(
            self.state.clone(),
            &self.bindings,
            &self.functions,
            self.unit,
        );
        Ok(evaluator::run_planning(&stmts, env, target)?)
    }

    /// Execution mode: run the whole script against a working copy and
    /// return it as the new state dictionary. All-or-nothing.
    pub fn execute(&self) -> Result<ProgramState, ScriptError> {
        let stmts = self.parse()?;
        let env = Environment::new(
            self.state.clone(),
            &self.bindings,
            &self.functions,
            self.unit,
        );
        Ok(evaluator::run_execution(&stmts, env)?)
    }
}
