//! Programs: the days, the scripts, and the persisted state they mutate.
//!
//! Two driving workflows live here. `plan_next_record` evaluates every
//! set's reps/weight expressions read-only to project the next workout;
//! `run_finish_day_script` runs the finish-day script against a working
//! copy and hands back the new state for the caller to commit atomically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::history::{
    HistoryRecord, PlannedEntry, PlannedRecord, PlannedSet, WarmupCatalog,
};
use super::settings::Settings;
use super::weight::{StateValue, Weight};
use crate::engine::{
    EvalError, ScriptBindings, ScriptError, ScriptFunctions, ScriptRunner, ScriptTarget, Value,
};

/// Flat author-chosen key → number-or-weight mapping. Only scripts add or
/// change keys; the engine never invents or deletes them.
pub type ProgramState = BTreeMap<String, StateValue>;

/// The day counter lives apart from the author's state but is merged into
/// it (as `nextDay`) for the duration of a finish-day run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInternalState {
    pub next_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSet {
    pub reps_expr: String,
    pub weight_expr: String,
    #[serde(default)]
    pub is_amrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDayEntry {
    pub exercise: String,
    pub sets: Vec<ProgramSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDay {
    pub name: String,
    pub exercises: Vec<ProgramDayEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: String,
    pub days: Vec<ProgramDay>,
    pub state: ProgramState,
    pub internal_state: ProgramInternalState,
    pub finish_day_expr: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Day rotation rule: `(day mod numberOfDays) + 1`, or day 1 when no day
/// has ever run. Total, and always lands in `[1, numberOfDays]`.
pub fn next_day(program: &Program, day: Option<u32>) -> u32 {
    let len = program.days.len().max(1) as u32;
    day.map(|d| d % len).unwrap_or(0) + 1
}

/// The state dictionary a finish-day run sees: author state with `nextDay`
/// merged in. An author key named `nextDay` wins over the counter, which
/// matches how the merge has always behaved.
pub fn merged_state(program: &Program, rotated_next_day: u32) -> ProgramState {
    let mut merged = program.state.clone();
    merged
        .entry("nextDay".to_string())
        .or_insert(StateValue::Number(rotated_next_day as f64));
    merged
}

/// Project the next workout. Read-only: evaluates each set's expressions
/// in planning mode with empty completion bindings.
pub fn plan_next_record(
    program: &Program,
    settings: &Settings,
    day_override: Option<u32>,
    catalog: &dyn WarmupCatalog,
) -> Result<PlannedRecord, ScriptError> {
    if program.days.is_empty() {
        return Err(ScriptError::EmptyProgram);
    }
    let day = day_override
        .unwrap_or(program.internal_state.next_day)
        .clamp(1, program.days.len() as u32);
    let program_day = &program.days[(day - 1) as usize];
    let functions = ScriptFunctions::new(settings);

    let mut entries = Vec::with_capacity(program_day.exercises.len());
    for entry in &program_day.exercises {
        let mut sets = Vec::with_capacity(entry.sets.len());
        for set in &entry.sets {
            let reps = ScriptRunner::new(
                &set.reps_expr,
                program.state.clone(),
                ScriptBindings::empty(day),
                functions.clone(),
                settings.units,
            )
            .plan(ScriptTarget::Reps)?;
            let weight = ScriptRunner::new(
                &set.weight_expr,
                program.state.clone(),
                ScriptBindings::empty(day),
                functions.clone(),
                settings.units,
            )
            .plan(ScriptTarget::Weight)?;

            sets.push(PlannedSet {
                reps: as_reps(reps)?,
                weight: as_weight(weight, settings)?,
                is_amrap: set.is_amrap,
            });
        }

        let warmup_sets = sets
            .first()
            .map(|first| catalog.warmups(&entry.exercise, first.weight, settings))
            .unwrap_or_default();

        entries.push(PlannedEntry {
            exercise: entry.exercise.clone(),
            sets,
            warmup_sets,
        });
    }

    Ok(PlannedRecord {
        program_id: program.id.clone(),
        program_name: program.name.clone(),
        day,
        day_name: program_day.name.clone(),
        entries,
    })
}

/// Syntax-only validation for a finish-day script the author is editing;
/// defaults to the program's own script.
pub fn parse_finish_day_script(
    program: &Program,
    script: Option<&str>,
) -> Result<(), ScriptError> {
    crate::engine::parse(script.unwrap_or(&program.finish_day_expr)).map(|_| ())
}

/// Run the finish-day script for a completed workout.
///
/// The working copy is seeded with the author state merged with the
/// already-rotated `nextDay`, so a script that assigns `state.nextDay`
/// overrides the rotation. On failure nothing is persisted — the caller's
/// program is untouched.
pub fn run_finish_day_script(
    program: &Program,
    record: &HistoryRecord,
    settings: &Settings,
) -> Result<(ProgramState, ProgramInternalState), ScriptError> {
    let rotated = next_day(program, Some(program.internal_state.next_day));
    let seed = merged_state(program, rotated);
    let runner = ScriptRunner::new(
        &program.finish_day_expr,
        seed,
        ScriptBindings::from_record(record),
        ScriptFunctions::new(settings),
        settings.units,
    );
    let mut new_state = runner.execute()?;

    let next = match new_state.remove("nextDay") {
        Some(StateValue::Number(n)) if n.is_finite() => (n.floor().max(1.0)) as u32,
        Some(StateValue::Weight(_)) => {
            return Err(
                EvalError::Arithmetic("nextDay must be a plain number, not a weight".into())
                    .into(),
            );
        }
        _ => 1,
    };

    Ok((new_state, ProgramInternalState { next_day: next }))
}

fn as_reps(value: Value) -> Result<u32, ScriptError> {
    match value {
        Value::Number(n) if n >= 0.0 => Ok(n.round() as u32),
        other => Err(EvalError::Arithmetic(format!(
            "reps expression must produce a non-negative number, got {other:?}"
        ))
        .into()),
    }
}

/// Weight expressions may yield a bare number; it is read in the settings
/// unit, then everything is reported in that unit.
fn as_weight(value: Value, settings: &Settings) -> Result<Weight, ScriptError> {
    match value {
        Value::Weight(w) => Ok(w.convert_to(settings.units)),
        Value::Number(n) => Ok(Weight::new(n, settings.units)),
        Value::Bool(_) => Err(EvalError::Arithmetic(
            "weight expression must produce a weight, got a boolean".into(),
        )
        .into()),
    }
}
