//! End-to-end: load a program from JSON, plan a day, perform it, finish it.

use std::fs;

use liftscript::model::program::{self, Program};
use liftscript::model::{NoWarmups, Settings, StateValue, Unit, Weight};
use liftscript::queue::{Action, Command, StateQueue};

fn load() -> Program {
    let json = fs::read_to_string("tests/program.json").unwrap();
    serde_json::from_str(&json).expect("valid program json")
}

#[test]
fn parses_program_file() {
    let p = load();
    assert_eq!(p.id, "basic-beginner");
    assert_eq!(p.days.len(), 2);
    assert_eq!(p.internal_state.next_day, 1);
    assert_eq!(
        p.state.get("benchWeight"),
        Some(&StateValue::Weight(Weight::lb(45.0)))
    );
    assert!(program::parse_finish_day_script(&p, None).is_ok());
}

#[test]
fn plans_the_first_day() {
    let p = load();
    let planned =
        program::plan_next_record(&p, &Settings::default(), None, &NoWarmups).unwrap();

    assert_eq!(planned.day, 1);
    assert_eq!(planned.day_name, "Workout A");

    let bench = &planned.entries[0];
    assert_eq!(bench.exercise, "benchPress");
    assert_eq!(bench.sets.len(), 3);
    assert!(bench.sets[2].is_amrap);
    for set in &bench.sets {
        assert_eq!(set.reps, 5);
        assert_eq!(set.weight, Weight::lb(45.0));
    }

    // roundWeight(95 * 0.9) = roundWeight(85.5) = 85 with 5lb plates
    let squat = &planned.entries[1];
    assert_eq!(squat.sets[0].weight, Weight::lb(85.0));
}

#[test]
fn plans_in_metric_settings() {
    let p = load();
    let planned =
        program::plan_next_record(&p, &Settings::metric(), None, &NoWarmups).unwrap();
    let bench = &planned.entries[0].sets[0];
    assert_eq!(bench.weight.unit, Unit::Kg);
    assert!((bench.weight.value - 45.0 * 0.45359237).abs() < 1e-9);
}

#[test]
fn full_day_cycle_through_the_queue() {
    let mut queue = StateQueue::new(vec![load()], Settings::default(), NoWarmups);

    queue.dispatch(Action::StartDay {
        program_id: "basic-beginner".into(),
        day: None,
    });

    // lifter completes every set, AMRAP set at 7 reps
    {
        let record = queue.current_mut().unwrap();
        for entry in &mut record.entries {
            for set in &mut entry.sets {
                set.completed = true;
            }
        }
        record.entries[0].sets[2].reps = 7;
    }

    let cmds = queue.dispatch(Action::FinishDay);
    assert_eq!(cmds, vec![Command::Persist]);

    let p = queue.program("basic-beginner").unwrap();
    assert_eq!(p.internal_state.next_day, 2);
    assert_eq!(
        p.state.get("benchWeight"),
        Some(&StateValue::Weight(Weight::lb(50.0)))
    );
    assert_eq!(p.state.get("benchFails"), Some(&StateValue::Number(0.0)));

    // next start picks up workout B with the untouched squat weight
    queue.dispatch(Action::StartDay {
        program_id: "basic-beginner".into(),
        day: None,
    });
    let record = queue.current().unwrap();
    assert_eq!(record.day, 2);
    assert_eq!(record.entries[0].exercise, "deadlift");
    assert_eq!(record.entries[0].sets[0].weight, Weight::lb(145.0));
}

#[test]
fn missed_amrap_counts_a_failure_instead() {
    let mut queue = StateQueue::new(vec![load()], Settings::default(), NoWarmups);
    queue.dispatch(Action::StartDay {
        program_id: "basic-beginner".into(),
        day: None,
    });

    // everything done except the AMRAP set only reached 4 reps
    {
        let record = queue.current_mut().unwrap();
        for entry in &mut record.entries {
            for set in &mut entry.sets {
                set.completed = true;
            }
        }
        record.entries[0].sets[2].reps = 4;
    }

    queue.dispatch(Action::FinishDay);
    let p = queue.program("basic-beginner").unwrap();
    assert_eq!(
        p.state.get("benchWeight"),
        Some(&StateValue::Weight(Weight::lb(45.0)))
    );
    assert_eq!(p.state.get("benchFails"), Some(&StateValue::Number(1.0)));
    // the day still advances; repeating is the script's call, not the host's
    assert_eq!(p.internal_state.next_day, 2);
}

#[test]
fn finishing_day_two_skips_day_one_rules() {
    let mut p = load();
    p.internal_state.next_day = 2;
    let mut queue = StateQueue::new(vec![p], Settings::default(), NoWarmups);

    queue.dispatch(Action::StartDay {
        program_id: "basic-beginner".into(),
        day: None,
    });
    queue
        .current_mut()
        .unwrap()
        .entries
        .iter_mut()
        .for_each(|e| e.sets.iter_mut().for_each(|s| s.completed = true));
    queue.dispatch(Action::FinishDay);

    let p = queue.program("basic-beginner").unwrap();
    // guarded by `if day == 1`, so bench state is untouched on day 2
    assert_eq!(
        p.state.get("benchWeight"),
        Some(&StateValue::Weight(Weight::lb(45.0)))
    );
    assert_eq!(p.state.get("benchFails"), Some(&StateValue::Number(0.0)));
    // 2-day program wraps back to day 1
    assert_eq!(p.internal_state.next_day, 1);
}
