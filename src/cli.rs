use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Unit;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate every script embedded in a program .json file
    Check {
        /// Input program .json file
        input: PathBuf,
    },
    /// Print the planned next workout for a program .json file
    Plan {
        /// Input program .json file
        input: PathBuf,
        /// Plan this day instead of the program's next day
        #[arg(long)]
        day: Option<u32>,
        /// Report planned weights in this unit (kg or lb)
        #[arg(long, default_value = "lb")]
        units: Unit,
    },
}
