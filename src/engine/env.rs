//! The read/write context a script runs against: the working copy of the
//! state dictionary, the completion bindings from the workout being
//! evaluated, and the unit-aware function table supplied by settings.

use std::collections::{BTreeMap, HashMap};

use super::error::EvalError;
use crate::model::history::{HistoryRecord, PerformedSet};
use crate::model::program::ProgramState;
use crate::model::settings::Settings;
use crate::model::weight::{StateValue, Unit, Weight};

/// Runtime value of one expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Weight(Weight),
    Bool(bool),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Weight(_) => "weight",
            Value::Bool(_) => "boolean",
        }
    }
}

impl From<StateValue> for Value {
    fn from(v: StateValue) -> Self {
        match v {
            StateValue::Number(n) => Value::Number(n),
            StateValue::Weight(w) => Value::Weight(w),
        }
    }
}

/// Read-only per-run table of what the workout under evaluation looked
/// like: the day index plus every exercise's performed sets. Planning runs
/// get an empty table (just the day).
#[derive(Debug, Clone, Default)]
pub struct ScriptBindings {
    pub day: u32,
    pub entries: HashMap<String, Vec<PerformedSet>>,
}

impl ScriptBindings {
    /// Bindings for planning mode: no history yet, only the day index.
    pub fn empty(day: u32) -> Self {
        Self {
            day,
            entries: HashMap::new(),
        }
    }

    pub fn from_record(record: &HistoryRecord) -> Self {
        let mut entries = HashMap::new();
        for entry in &record.entries {
            entries.insert(entry.exercise.clone(), entry.sets.clone());
        }
        Self {
            day: record.day,
            entries,
        }
    }
}

/// Unit-aware helpers scripts may call; derived from user settings.
#[derive(Debug, Clone)]
pub struct ScriptFunctions {
    settings: Settings,
}

impl ScriptFunctions {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: *settings,
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match name {
            // Round to the nearest weight the lifter can actually load.
            "roundWeight" => {
                let [arg] = expect_args(name, args)?;
                let w = self.as_weight(name, arg)?;
                Ok(Value::Weight(w.round_to(self.settings.increment)))
            }
            // Epley one-rep-max estimate scaled to a 90% training max,
            // rounded to a loadable weight.
            "calculateTrainingMax" => {
                let [w, reps] = expect_args(name, args)?;
                let w = self.as_weight(name, w)?;
                let reps = match reps {
                    Value::Number(n) => n,
                    other => {
                        return Err(EvalError::Arithmetic(format!(
                            "`{name}` expects a rep count, got a {}",
                            other.kind()
                        )));
                    }
                };
                let one_rm = w.value * (1.0 + reps / 30.0);
                let tm = Weight::new(one_rm * 0.9, w.unit);
                Ok(Value::Weight(tm.round_to(self.settings.increment)))
            }
            _ => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }

    /// Plain numbers passed to weight functions are read in the settings
    /// unit.
    fn as_weight(&self, name: &str, value: Value) -> Result<Weight, EvalError> {
        match value {
            Value::Weight(w) => Ok(w),
            Value::Number(n) => Ok(Weight::new(n, self.settings.units)),
            Value::Bool(_) => Err(EvalError::Arithmetic(format!(
                "`{name}` expects a weight, got a boolean"
            ))),
        }
    }
}

fn expect_args<const N: usize>(name: &str, args: &[Value]) -> Result<[Value; N], EvalError> {
    <[Value; N]>::try_from(args).map_err(|_| EvalError::ArityMismatch {
        name: name.to_string(),
        expected: N,
        got: args.len(),
    })
}

/// One run's environment. `state` is a working copy owned here; the
/// caller's dictionary is only replaced after the whole script succeeds.
pub struct Environment<'a> {
    state: ProgramState,
    locals: BTreeMap<String, Value>,
    bindings: &'a ScriptBindings,
    functions: &'a ScriptFunctions,
    pub unit: Unit,
}

impl<'a> Environment<'a> {
    pub fn new(
        state: ProgramState,
        bindings: &'a ScriptBindings,
        functions: &'a ScriptFunctions,
        unit: Unit,
    ) -> Self {
        Self {
            state,
            locals: BTreeMap::new(),
            bindings,
            functions,
            unit,
        }
    }

    /// Bare identifiers: locals shadow state, `day` comes last.
    pub fn lookup_variable(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(v) = self.locals.get(name) {
            return Ok(*v);
        }
        if let Some(v) = self.state.get(name) {
            return Ok((*v).into());
        }
        if name == "day" {
            return Ok(Value::Number(self.bindings.day as f64));
        }
        Err(EvalError::UnknownVariable(name.to_string()))
    }

    pub fn lookup_state(&self, name: &str) -> Result<Value, EvalError> {
        self.state
            .get(name)
            .map(|v| (*v).into())
            .ok_or_else(|| EvalError::UnknownVariable(format!("state.{name}")))
    }

    /// `set_index` is 1-based, as the script author counts sets.
    pub fn lookup_set_binding(
        &self,
        field: super::ast::SetField,
        exercise: &str,
        set_index: usize,
    ) -> Result<Value, EvalError> {
        let missing = || EvalError::UnknownBinding {
            field: field.name().to_string(),
            exercise: exercise.to_string(),
            set: set_index,
        };
        let sets = self.bindings.entries.get(exercise).ok_or_else(missing)?;
        let set = set_index
            .checked_sub(1)
            .and_then(|i| sets.get(i))
            .ok_or_else(missing)?;
        Ok(match field {
            super::ast::SetField::Reps => Value::Number(set.reps as f64),
            super::ast::SetField::Weight => Value::Weight(set.weight),
            super::ast::SetField::Completed => Value::Bool(set.completed),
        })
    }

    pub fn call_function(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        self.functions.call(name, args)
    }

    /// Write into the working copy. Booleans are not a state type.
    pub fn assign_state(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        let stored = match value {
            Value::Number(n) => StateValue::Number(n),
            Value::Weight(w) => StateValue::Weight(w),
            Value::Bool(_) => {
                return Err(EvalError::Arithmetic(format!(
                    "cannot store a boolean in state.{name}"
                )));
            }
        };
        self.state.insert(name.to_string(), stored);
        Ok(())
    }

    pub fn assign_local(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }

    pub fn local(&self, name: &str) -> Option<Value> {
        self.locals.get(name).copied()
    }

    /// Hand the finished working copy back; only called after a fully
    /// successful execution-mode run.
    pub fn into_state(self) -> ProgramState {
        self.state
    }
}
