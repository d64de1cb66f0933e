// src/shell.rs
use anyhow::{Context, Result};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use crate::TerminalView;
use workout_logger_lib::{ActionOutcome, FormField, UnitType};

const HELP: &str = "\
Commands:
  list                     reload all workouts
  search [text]            filter by name (empty = all)
  select <row>             toggle selection of a table row (1-based)
  pick <id>                select the workout with this ID
  set <field> <value>      edit the form (name, start, duration, distance, unit, notes)
  form                     show the form
  clear                    clear the form
  add                      create a workout from the form
  update                   save the form over the selected workout
  delete                   delete the selected workout
  convert <km|miles>       convert all distances
  import <file>            upload a CSV file
  export                   download workouts.csv
  connect [path]           bind a database file
  help                     this text
  quit                     leave";

#[derive(Debug, PartialEq)]
enum ShellCommand {
    List,
    Search(String),
    Select(usize),
    Pick(i64),
    Set(FormField, String),
    Form,
    Clear,
    Add,
    Update,
    Delete,
    Convert(UnitType),
    Import(Option<PathBuf>),
    Export,
    Connect(Option<String>),
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let arg = || (!rest.is_empty()).then(|| rest.to_string());

    let command = match word.to_ascii_lowercase().as_str() {
        "list" | "refresh" => ShellCommand::List,
        "search" => ShellCommand::Search(rest.to_string()),
        "select" => {
            let row: usize = rest
                .parse()
                .map_err(|_| format!("'{rest}' is not a row number"))?;
            if row == 0 {
                return Err("Rows are numbered from 1".to_string());
            }
            ShellCommand::Select(row - 1)
        }
        "pick" => ShellCommand::Pick(rest.parse().map_err(|_| format!("'{rest}' is not an ID"))?),
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field: FormField = field
                .parse()
                .map_err(|_| format!("Unknown field '{field}'"))?;
            ShellCommand::Set(field, value.trim().to_string())
        }
        "form" => ShellCommand::Form,
        "clear" => ShellCommand::Clear,
        "add" | "create" => ShellCommand::Add,
        "update" => ShellCommand::Update,
        "delete" => ShellCommand::Delete,
        "convert" => ShellCommand::Convert(
            rest.parse()
                .map_err(|_| format!("Unknown unit '{rest}' (use km or miles)"))?,
        ),
        "import" => ShellCommand::Import(arg().map(PathBuf::from)),
        "export" => ShellCommand::Export,
        "connect" => ShellCommand::Connect(arg()),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
    };
    Ok(Some(command))
}

/// Runs the interactive session. Returns the outcome of the last action.
pub async fn run(view: &mut TerminalView) -> Result<ActionOutcome> {
    println!("Workout Logger shell. Type 'help' for commands.");
    let mut last = view.load().await;

    loop {
        match &view.state.search_query {
            Some(query) => print!("workouts [{query}]> "),
            None => print!("workouts> "),
        }
        stdout().flush().context("Failed to flush prompt")?;
        let mut input = String::new();
        if stdin().read_line(&mut input).context("Failed to read command")? == 0 {
            break; // EOF
        }

        let command = match parse_line(&input) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        last = match command {
            ShellCommand::List => view.refresh().await,
            ShellCommand::Search(query) => view.search(&query).await,
            ShellCommand::Select(row) => view.select_row(row),
            ShellCommand::Pick(id) => view.select_by_id(id),
            ShellCommand::Set(field, value) => {
                view.set_form_field(field, value);
                ActionOutcome::Completed
            }
            ShellCommand::Form => {
                view.surface().print_form();
                ActionOutcome::Completed
            }
            ShellCommand::Clear => {
                view.clear_form();
                ActionOutcome::Completed
            }
            ShellCommand::Add => view.create().await,
            ShellCommand::Update => view.update().await,
            ShellCommand::Delete => view.delete().await,
            ShellCommand::Convert(unit) => view.convert_units(unit).await,
            ShellCommand::Import(file) => view.import(file.as_deref()).await,
            ShellCommand::Export => view.export().await,
            ShellCommand::Connect(path) => view.connect_database(path).await,
            ShellCommand::Help => {
                println!("{HELP}");
                ActionOutcome::Completed
            }
            ShellCommand::Quit => break,
        };
    }
    Ok(last)
}
