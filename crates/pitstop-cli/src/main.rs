//! Pitstop CLI - Vehicle expense and maintenance tracker
//!
//! Usage:
//!   pitstop --data export.json analytics --range year
//!   pitstop --data export.json calendar --month 2024-05
//!   pitstop --data export.json agenda --status overdue
//!   pitstop --data export.json reminders --event 12

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use pitstop_core::EngineConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let config = EngineConfig::load(cli.config.as_deref())?;
    let today = commands::resolve_today(cli.today.as_deref())?;
    let store = commands::open_store(cli.data.as_deref(), &cli.csv)?;
    let output = commands::Output::new(cli.json);

    match cli.command {
        Commands::Analytics { car, range } => {
            commands::cmd_analytics(&store, &config, today, car, &range, output)
        }
        Commands::Calendar { month, car } => {
            commands::cmd_calendar(&store, &config, &month, car, output)
        }
        Commands::Dashboard => commands::cmd_dashboard(&store, today, output),
        Commands::Occurrences { event, from, to } => commands::cmd_occurrences(
            &store,
            event,
            from.as_deref(),
            to.as_deref(),
            today,
            output,
        ),
        Commands::Agenda {
            car,
            event_type,
            status,
            from,
            to,
        } => commands::cmd_agenda(
            &store,
            &config,
            today,
            commands::AgendaArgs {
                car,
                event_type: event_type.as_deref(),
                status: status.as_deref(),
                from: from.as_deref(),
                to: to.as_deref(),
            },
            output,
        ),
        Commands::Reminders { event, from, to } => commands::cmd_reminders(
            &store,
            &config,
            event,
            from.as_deref(),
            to.as_deref(),
            today,
            output,
        ),
    }
}
