//! Single-writer state-update queue.
//!
//! The host feeds actions in one at a time; each one produces a new
//! canonical state plus commands (persist, show an error) for the host to
//! carry out. Scripts never touch the canonical state directly: a
//! finish-day run works on its own copy and is committed here, atomically,
//! only on success.
//!
//! Dispatching an action that makes no sense for the current state (finish
//! with no workout in progress, an unknown program id) is a programming
//! error in the host, not a script fault, and panics.

use crate::model::history::{HistoryRecord, WarmupCatalog};
use crate::model::program::{self, Program};
use crate::model::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Plan the program's next day (or an explicit one) and make it the
    /// workout in progress.
    StartDay {
        program_id: String,
        day: Option<u32>,
    },
    /// Run the finish-day script over the workout in progress and commit.
    FinishDay,
}

/// Side effects the host must perform after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Canonical state changed; write it to storage.
    Persist,
    /// A script failed; show the message to the program author.
    ReportScriptError(String),
}

pub struct StateQueue<C> {
    programs: Vec<Program>,
    settings: Settings,
    catalog: C,
    current: Option<HistoryRecord>,
    history: Vec<HistoryRecord>,
}

impl<C: WarmupCatalog> StateQueue<C> {
    pub fn new(programs: Vec<Program>, settings: Settings, catalog: C) -> Self {
        Self {
            programs,
            settings,
            catalog,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&HistoryRecord> {
        self.current.as_ref()
    }

    /// The in-progress workout, for the host to record reps/weights into.
    pub fn current_mut(&mut self) -> Option<&mut HistoryRecord> {
        self.current.as_mut()
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::StartDay { program_id, day } => self.start_day(&program_id, day),
            Action::FinishDay => self.finish_day(),
        }
    }

    fn start_day(&mut self, program_id: &str, day: Option<u32>) -> Vec<Command> {
        let program = self
            .program(program_id)
            .unwrap_or_else(|| panic!("StartDay dispatched for unknown program `{program_id}`"));

        match program::plan_next_record(program, &self.settings, day, &self.catalog) {
            Ok(planned) => {
                self.current = Some(planned.start());
                vec![Command::Persist]
            }
            Err(e) => vec![Command::ReportScriptError(e.to_string())],
        }
    }

    fn finish_day(&mut self) -> Vec<Command> {
        let record = self
            .current
            .take()
            .expect("FinishDay dispatched with no workout in progress");

        let idx = self
            .programs
            .iter()
            .position(|p| p.id == record.program_id)
            .unwrap_or_else(|| {
                panic!(
                    "workout in progress references unknown program `{}`",
                    record.program_id
                )
            });

        match program::run_finish_day_script(&self.programs[idx], &record, &self.settings) {
            Ok((state, internal)) => {
                self.programs[idx].state = state;
                self.programs[idx].internal_state = internal;
                self.history.push(record);
                vec![Command::Persist]
            }
            Err(e) => {
                // nothing committed; the workout stays in progress so the
                // author can fix the script and finish again
                self.current = Some(record);
                vec![Command::ReportScriptError(e.to_string())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::history::NoWarmups;
    use crate::model::program::{ProgramDay, ProgramDayEntry, ProgramInternalState, ProgramSet};
    use crate::model::weight::{StateValue, Weight};
    use std::collections::BTreeMap;

    fn queue() -> StateQueue<NoWarmups> {
        let program = Program {
            id: "lp".into(),
            name: "Linear".into(),
            description: String::new(),
            url: String::new(),
            author: String::new(),
            days: (1..=2)
                .map(|i| ProgramDay {
                    name: format!("Day {i}"),
                    exercises: vec![ProgramDayEntry {
                        exercise: "squat".into(),
                        sets: vec![ProgramSet {
                            reps_expr: "5".into(),
                            weight_expr: "state.weight".into(),
                            is_amrap: false,
                        }],
                    }],
                })
                .collect(),
            state: BTreeMap::from([(
                "weight".to_string(),
                StateValue::Weight(Weight::lb(95.0)),
            )]),
            internal_state: ProgramInternalState { next_day: 1 },
            finish_day_expr:
                "if completed[squat, 1] { state.weight = state.weight + 5lb }".into(),
            tags: vec![],
        };
        StateQueue::new(vec![program], Settings::default(), NoWarmups)
    }

    #[test]
    fn test_start_then_finish_commits_once() {
        let mut q = queue();
        let cmds = q.dispatch(Action::StartDay {
            program_id: "lp".into(),
            day: None,
        });
        assert_eq!(cmds, vec![Command::Persist]);
        assert_eq!(q.current().unwrap().day, 1);

        q.current_mut().unwrap().entries[0].sets[0].completed = true;
        let cmds = q.dispatch(Action::FinishDay);
        assert_eq!(cmds, vec![Command::Persist]);

        let p = q.program("lp").unwrap();
        assert_eq!(p.internal_state.next_day, 2);
        assert_eq!(
            p.state.get("weight"),
            Some(&StateValue::Weight(Weight::lb(100.0)))
        );
        assert!(q.current().is_none());
        assert_eq!(q.history().len(), 1);
    }

    #[test]
    fn test_failed_finish_keeps_everything() {
        let mut q = queue();
        q.programs[0].finish_day_expr = "state.x = nope".into();
        q.dispatch(Action::StartDay {
            program_id: "lp".into(),
            day: None,
        });

        let cmds = q.dispatch(Action::FinishDay);
        assert!(matches!(cmds[0], Command::ReportScriptError(_)));

        let p = q.program("lp").unwrap();
        assert_eq!(p.internal_state.next_day, 1);
        assert_eq!(
            p.state.get("weight"),
            Some(&StateValue::Weight(Weight::lb(95.0)))
        );
        // the workout is still in progress, nothing archived
        assert!(q.current().is_some());
        assert!(q.history().is_empty());
    }

    #[test]
    fn test_start_day_with_no_days_reports_instead_of_panicking() {
        let mut q = queue();
        q.programs[0].days.clear();
        let cmds = q.dispatch(Action::StartDay {
            program_id: "lp".into(),
            day: None,
        });
        assert!(matches!(cmds[0], Command::ReportScriptError(_)));
        assert!(q.current().is_none());
    }

    #[test]
    #[should_panic(expected = "no workout in progress")]
    fn test_finish_without_start_is_a_host_bug() {
        let mut q = queue();
        q.dispatch(Action::FinishDay);
    }
}
