pub mod cli;
pub mod engine;
pub mod model;
pub mod queue;

use anyhow::Context;
use clap::Parser;

use model::{NoWarmups, Program, Settings};

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Check { input } => {
            let program = load_program(&input)?;
            check(&program)
        }
        cli::Command::Plan { input, day, units } => {
            let program = load_program(&input)?;
            plan(&program, day, Settings::for_units(units))
        }
    }
}

fn load_program(path: &std::path::Path) -> anyhow::Result<Program> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;
    let program: Program =
        serde_json::from_str(&json).with_context(|| "Parsing program JSON")?;
    println!(
        "Loaded program `{}`: {} day(s), next day {}",
        program.name,
        program.days.len(),
        program.internal_state.next_day
    );
    Ok(program)
}

/// Validate every script the program embeds: each set's reps/weight
/// expressions and the finish-day script. Reports every failure, then
/// errors out if there were any.
fn check(program: &Program) -> anyhow::Result<()> {
    let mut failures = 0usize;

    let mut report = |label: String, result: Result<_, engine::ScriptError>| {
        if let Err(e) = result {
            println!("  {label}: {e}");
            failures += 1;
        }
    };

    for (d, day) in program.days.iter().enumerate() {
        for entry in &day.exercises {
            for (s, set) in entry.sets.iter().enumerate() {
                report(
                    format!("day {} {} set {} reps", d + 1, entry.exercise, s + 1),
                    engine::parse(&set.reps_expr),
                );
                report(
                    format!("day {} {} set {} weight", d + 1, entry.exercise, s + 1),
                    engine::parse(&set.weight_expr),
                );
            }
        }
    }
    report("finish-day script".to_string(), engine::parse(&program.finish_day_expr));
    drop(report);

    if failures > 0 {
        anyhow::bail!("{failures} script(s) failed to parse");
    }
    println!("All scripts parse");
    Ok(())
}

fn plan(program: &Program, day: Option<u32>, settings: Settings) -> anyhow::Result<()> {
    let planned = model::program::plan_next_record(program, &settings, day, &NoWarmups)
        .map_err(|e| anyhow::anyhow!("planning failed: {e}"))?;

    println!("Day {} — {}", planned.day, planned.day_name);
    for entry in &planned.entries {
        println!("  {}", entry.exercise);
        for set in &entry.sets {
            let amrap = if set.is_amrap { "+" } else { "" };
            println!("    {}{} x {}", set.reps, amrap, set.weight);
        }
    }
    Ok(())
}
