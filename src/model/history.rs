//! Workout records: what planning produces and what a finished day reports
//! back into the finish-day script's bindings.

use serde::{Deserialize, Serialize};

use super::settings::Settings;
use super::weight::Weight;

/// One set as it was actually performed (or is being performed right now).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformedSet {
    pub reps: u32,
    pub weight: Weight,
    pub completed: bool,
    pub is_amrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub exercise: String,
    pub sets: Vec<PerformedSet>,
    #[serde(default)]
    pub warmup_sets: Vec<WarmupSet>,
}

/// A whole workout, completed or in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub program_id: String,
    pub program_name: String,
    /// 1-based day index within the program.
    pub day: u32,
    pub entries: Vec<HistoryEntry>,
}

/// One warm-up set handed back by the exercise catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmupSet {
    pub reps: u32,
    pub weight: Weight,
}

/// A set target produced by planning-mode evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSet {
    pub reps: u32,
    pub weight: Weight,
    pub is_amrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedEntry {
    pub exercise: String,
    pub sets: Vec<PlannedSet>,
    pub warmup_sets: Vec<WarmupSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedRecord {
    pub program_id: String,
    pub program_name: String,
    pub day: u32,
    pub day_name: String,
    pub entries: Vec<PlannedEntry>,
}

impl PlannedRecord {
    /// Seed an in-progress record from the plan: every set starts at its
    /// target with `completed = false`.
    pub fn start(&self) -> HistoryRecord {
        HistoryRecord {
            program_id: self.program_id.clone(),
            program_name: self.program_name.clone(),
            day: self.day,
            entries: self
                .entries
                .iter()
                .map(|entry| HistoryEntry {
                    exercise: entry.exercise.clone(),
                    sets: entry
                        .sets
                        .iter()
                        .map(|set| PerformedSet {
                            reps: set.reps,
                            weight: set.weight,
                            completed: false,
                            is_amrap: set.is_amrap,
                        })
                        .collect(),
                    warmup_sets: entry.warmup_sets.clone(),
                })
                .collect(),
        }
    }
}

/// The static exercise catalog is an external collaborator; planning only
/// needs this one question answered.
pub trait WarmupCatalog {
    fn warmups(&self, exercise: &str, working_weight: Weight, settings: &Settings)
    -> Vec<WarmupSet>;
}

/// Catalog stub for hosts that don't show warm-ups (and for tests).
pub struct NoWarmups;

impl WarmupCatalog for NoWarmups {
    fn warmups(&self, _: &str, _: Weight, _: &Settings) -> Vec<WarmupSet> {
        Vec::new()
    }
}
