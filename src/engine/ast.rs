//! AST for one progression script.
//!
//! Scripts are bounded straight-line/branching statement sequences: there is
//! no loop form, so evaluation always terminates.

use crate::model::weight::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// The three per-set fields a script can read from the completed workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Reps,
    Weight,
    Completed,
}

impl SetField {
    pub fn from_ident(name: &str) -> Option<SetField> {
        match name {
            "reps" => Some(SetField::Reps),
            "weight" => Some(SetField::Weight),
            "completed" => Some(SetField::Completed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SetField::Reps => "reps",
            SetField::Weight => "weight",
            SetField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, optionally unit-tagged: `5`, `2.5`, `20lb`.
    Number { value: f64, unit: Option<Unit> },

    /// Bare identifier; resolved at evaluation time
    /// (locals, then state, then `day`).
    Variable(String),

    /// `state.x` — explicit state-dictionary access.
    StateRef(String),

    /// `reps[benchPress, 1]` — one field of one performed set,
    /// scoped to the day under evaluation. Set index is 1-based.
    SetBinding {
        field: SetField,
        exercise: String,
        set: Box<Expr>,
    },

    Unary(UnaryOp, Box<Expr>),

    Binary(BinOp, Box<Expr>, Box<Expr>),

    /// `roundWeight(state.tm * 0.9)` — call into the settings-supplied
    /// function table. Resolution happens at evaluation time.
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `state.x = expr` — persisted (via the run's working copy).
    AssignState { name: String, value: Expr },

    /// `x = expr` — local binding, never persisted.
    AssignLocal { name: String, value: Expr },

    /// `if cond { … } else { … }`; `else if` chains nest here.
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    /// Bare expression statement; in planning mode its value feeds the
    /// requested target.
    Expr(Expr),
}
