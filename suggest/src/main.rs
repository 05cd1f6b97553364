mod cli;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};
use suggest_core::{Config, Controller, HostEvent, config};
use suggest_tui::{PickerOutcome, TerminalPresenter, Theme, filter::overrides_from_config};

#[derive(Parser)]
#[command(version, about = "Debounced, cached autocomplete over a JSON catalog")]
struct Cli {
    /// Override path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = logging::DEFAULT_LOG_LEVEL)]
    log_level: log::LevelFilter,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the candidates a given input settles on
    Query {
        text: String,
        /// Cap the number of candidates
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_errors = matches!(cli.command, Some(Commands::Query { json: true, .. }));

    if let Err(error) = logging::setup_logging(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("warning: logging disabled: {error}");
    }

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            let error = crate::cli::CliError::system(error.to_string());
            crate::cli::print_error(&error, json_errors);
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Some(Commands::Query { text, limit, json }) => {
            crate::cli::cmd_query(&config, &crate::cli::QueryArgs { text, limit, json })
        }
        None => run_tui(&config).map_err(crate::cli::CliError::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            crate::cli::print_error(&error, json_errors);
            ExitCode::from(error.code())
        }
    }
}

fn run_tui(config: &Config) -> Result<()> {
    let catalog = crate::cli::load_catalog(config)?;
    let mut controller = Controller::new(
        config.flavor().build(),
        catalog.clone(),
        TerminalPresenter::default(),
    )
    .with_details(catalog);
    let session = controller.bind(&overrides_from_config(&config.options).initialize(true))?;
    let theme = Theme::from_config(&config.theme);

    let mut terminal = ratatui::init();
    let result = suggest_tui::run(&mut terminal, &mut controller, session, &theme);
    ratatui::restore();

    match result? {
        PickerOutcome::Event(
            HostEvent::Selected { item } | HostEvent::SubmitWithoutList { item },
        ) => println!("{}", item.label),
        PickerOutcome::Event(HostEvent::NewItemRequested { text })
        | PickerOutcome::Submitted(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        PickerOutcome::Event(HostEvent::NoSelection) | PickerOutcome::Cancelled => {}
    }
    Ok(())
}
