// src/cli.rs
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A terminal client for the Workout Logger server", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the workout server (overrides the config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Keep data commands disabled until a database file is bound
    #[arg(long, global = true)]
    pub database_binding: bool,

    /// Print workout tables as CSV instead of a formatted table
    #[arg(long, global = true)]
    pub export_csv: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitCli {
    #[value(alias = "km")]
    Kilometers,
    #[value(alias = "mi")]
    Miles,
}

/// Form fields. Left as text so the client-side validation reports bad input.
#[derive(Args, Debug, Clone, Default)]
pub struct WorkoutFields {
    /// Name of the workout (e.g., "Morning Run")
    #[arg(short, long)]
    pub name: Option<String>,
    /// Start time as YYYY-MM-DDTHH:MM
    #[arg(short, long)]
    pub start: Option<String>,
    /// Duration in minutes
    #[arg(short, long)]
    pub duration: Option<String>,
    /// Distance covered, in `unit`
    #[arg(long)]
    pub distance: Option<String>,
    #[arg(short, long, value_enum)]
    pub unit: Option<UnitCli>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every workout
    List,
    /// Search workouts by name (empty query lists all)
    Search {
        #[arg(default_value = "")]
        name: String,
    },
    /// Log a new workout
    Add {
        #[command(flatten)]
        fields: WorkoutFields,
    },
    /// Update a workout; omitted fields keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: WorkoutFields,
    },
    /// Delete a workout
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Convert every workout's distance to the given unit
    Convert {
        #[arg(value_enum)]
        unit: UnitCli,
        #[arg(short, long)]
        yes: bool,
    },
    /// Import workouts from a CSV file
    Import { file: Option<PathBuf> },
    /// Download all workouts as workouts.csv
    Export {
        /// Directory to save into (defaults to config's download_dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Bind the server to a database file (prompts when omitted)
    Connect { path: Option<String> },
    /// Show which database the server is bound to
    DbName,
    /// Interactive session with row selection and an edit form
    Shell,
    /// Show the path to the config file
    ConfigPath,
    /// Generate shell completion script
    GenerateCompletion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
