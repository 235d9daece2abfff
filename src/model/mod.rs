//! Data entities: weights, settings, workout records, and programs.

pub mod history;
pub mod program;
pub mod settings;
pub mod weight;

pub use history::{HistoryRecord, NoWarmups, PlannedRecord, WarmupCatalog};
pub use program::{Program, ProgramInternalState, ProgramState};
pub use settings::Settings;
pub use weight::{StateValue, Unit, Weight};
