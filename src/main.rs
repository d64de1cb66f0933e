//src/main.rs
mod cli;
mod shell;
mod terminal;

use anyhow::{Context, Result};
use std::io::stdout;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use terminal::TerminalSurface;
use workout_logger_lib::{
    get_config_path_util, load_config_util, ActionOutcome, FormField, HttpBackend, UnitType,
    WorkoutView,
};

pub type TerminalView = WorkoutView<HttpBackend, TerminalSurface>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli_args = cli::parse_args();
    init_tracing(cli_args.verbose);

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {}...", shell); // Print to stderr
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config_path =
        get_config_path_util().context("Failed to determine configuration file path")?;
    if let cli::Commands::ConfigPath = cli_args.command {
        println!("Config file is located at: {:?}", config_path);
        return Ok(ExitCode::SUCCESS);
    }
    let mut config = load_config_util(&config_path)
        .with_context(|| format!("Failed to load config from {config_path:?}"))?;
    if let Some(server) = cli_args.server.clone() {
        config.server_url = server;
    }
    if cli_args.database_binding {
        config.database_binding = true;
    }

    let timeout = config.request_timeout()?;
    let backend = HttpBackend::new(&config.server_url, timeout)
        .context("Failed to build HTTP client")?;
    let interactive = matches!(cli_args.command, cli::Commands::Shell);
    let surface = TerminalSurface::new(&config, cli_args.export_csv, interactive);
    let mut view = WorkoutView::new(backend, surface, config.database_binding);

    // --- Execute Commands through the view controller ---
    let outcome = match cli_args.command {
        cli::Commands::GenerateCompletion { .. } | cli::Commands::ConfigPath => {
            unreachable!("handled before the view is built");
        }
        cli::Commands::List => view.load().await,
        cli::Commands::Search { name } => {
            prepare(&mut view, false).await;
            view.surface_mut().show_table = true;
            view.search(&name).await
        }
        cli::Commands::Add { fields } => {
            prepare(&mut view, false).await;
            apply_fields(&mut view, fields);
            view.create().await
        }
        cli::Commands::Update { id, fields } => {
            prepare(&mut view, true).await;
            match view.select_by_id(id) {
                ActionOutcome::Completed => {
                    apply_fields(&mut view, fields);
                    view.update().await
                }
                other => other,
            }
        }
        cli::Commands::Delete { id, yes } => {
            view.surface_mut().assume_yes = yes;
            prepare(&mut view, true).await;
            match view.select_by_id(id) {
                ActionOutcome::Completed => view.delete().await,
                other => other,
            }
        }
        cli::Commands::Convert { unit, yes } => {
            view.surface_mut().assume_yes = yes;
            prepare(&mut view, false).await;
            view.convert_units(cli_unit_to_unit(unit)).await
        }
        cli::Commands::Import { file } => {
            prepare(&mut view, false).await;
            view.import(file.as_deref()).await
        }
        cli::Commands::Export { output_dir } => {
            if let Some(dir) = output_dir {
                view.surface_mut().download_dir = dir;
            }
            prepare(&mut view, false).await;
            view.export().await
        }
        cli::Commands::Connect { path } => {
            view.surface_mut().show_table = false;
            view.connect_database(path).await
        }
        cli::Commands::DbName => {
            view.surface_mut().show_table = false;
            view.check_connection().await
        }
        cli::Commands::Shell => shell::run(&mut view).await?,
    };

    Ok(exit_code(&outcome))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // keep stdout for tables and CSV
        .with_target(false)
        .init();
}

/// Loads whatever a one-shot command depends on without printing the table.
/// Selection by id needs the current rows; a bound database needs its status.
async fn prepare(view: &mut TerminalView, needs_rows: bool) {
    view.surface_mut().show_table = false;
    if view.state.controls_enabled {
        if needs_rows {
            view.refresh().await;
        }
    } else {
        view.check_connection().await;
    }
}

fn apply_fields(view: &mut TerminalView, fields: cli::WorkoutFields) {
    if let Some(name) = fields.name {
        view.set_form_field(FormField::Name, name);
    }
    if let Some(start) = fields.start {
        view.set_form_field(FormField::Start, start);
    }
    if let Some(duration) = fields.duration {
        view.set_form_field(FormField::Duration, duration);
    }
    if let Some(distance) = fields.distance {
        view.set_form_field(FormField::Distance, distance);
    }
    if let Some(unit) = fields.unit {
        view.set_form_field(FormField::Unit, cli_unit_to_unit(unit).to_string());
    }
    if let Some(notes) = fields.notes {
        view.set_form_field(FormField::Notes, notes);
    }
}

pub fn cli_unit_to_unit(unit: cli::UnitCli) -> UnitType {
    match unit {
        cli::UnitCli::Kilometers => UnitType::Kilometers,
        cli::UnitCli::Miles => UnitType::Miles,
    }
}

fn exit_code(outcome: &ActionOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
