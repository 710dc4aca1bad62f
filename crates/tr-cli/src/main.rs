use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tr_cli::commands::report::{self, EntrySource};
use tr_cli::{Cli, Settings, load_report_config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout carries only the report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => {
            return Err(err).context("failed to load .env file");
        }
        _ => {}
    }

    let config = load_report_config(&cli.config)?;
    tracing::debug!(?config, "loaded report configuration");

    let source = if let Some(path) = cli.input {
        EntrySource::File(path)
    } else {
        let (start, end) = report::resolve_period(cli.start, cli.end, Local::now().date_naive())?;
        let settings =
            Settings::load_from(cli.settings.as_deref()).context("failed to load settings")?;
        tracing::debug!(?settings, "loaded settings");
        EntrySource::Service {
            settings,
            start,
            end,
        }
    };

    let mut stdout = std::io::stdout().lock();
    report::run(&mut stdout, &source, &config, cli.json)
}
