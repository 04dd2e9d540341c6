//! Depsheet - headless front end for dependency-tracked spreadsheets

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use depsheet_core::Spreadsheet;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, warnings) = config::load_config(cli.config.as_deref());
    init_logging(&config.log_level);
    debug!(?config, "loaded config");
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut sheet = match &cli.file {
        Some(path) => Spreadsheet::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?,
        None => Spreadsheet::new(),
    };

    for assignment in &cli.set {
        debug!(cell = %assignment.name, content = %assignment.content, "applying --set");
        sheet
            .set_content(&assignment.name, &assignment.content)
            .with_context(|| format!("cannot set {}", assignment.name))?;
    }

    let names = if cli.get.is_empty() {
        sheet.non_empty_names().into_iter().collect()
    } else {
        cli.get.clone()
    };
    for name in names {
        let value = sheet.value(name.as_str())?;
        println!("{}: {}", name, value);
    }

    if let Some(path) = &cli.output {
        let saved = if cli.pretty || config.pretty {
            sheet.save_pretty(path)
        } else {
            sheet.save(path)
        };
        saved.with_context(|| format!("failed to save {}", path.display()))?;
        info!(path = %path.display(), "wrote output");
    }

    Ok(())
}
