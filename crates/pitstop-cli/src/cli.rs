//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pitstop - Vehicle expense and maintenance tracker
#[derive(Parser)]
#[command(name = "pitstop")]
#[command(about = "Expense analytics and maintenance schedules for your cars", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON export with expenses and maintenance events
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Extra expense CSV file (id,car_id,category,amount,date,description)
    #[arg(long, global = true)]
    pub csv: Vec<PathBuf>,

    /// Engine config file (defaults to the data dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Evaluate as of this date instead of the local date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Category totals, monthly trend and calendar heatmap
    Analytics {
        /// Only this car
        #[arg(short, long)]
        car: Option<i64>,

        /// Time range: month, year
        #[arg(short, long, default_value = "month")]
        range: String,
    },

    /// Heatmap of daily spending for one month
    Calendar {
        /// Month to show (YYYY-MM)
        #[arg(short, long)]
        month: String,

        /// Only this car
        #[arg(short, long)]
        car: Option<i64>,
    },

    /// All-time totals per category and car
    Dashboard,

    /// List the occurrences of one maintenance event
    Occurrences {
        /// Event series ID
        #[arg(short, long)]
        event: i64,

        /// Start date (YYYY-MM-DD), defaults to the event start
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to one year after --from
        #[arg(long)]
        to: Option<String>,
    },

    /// Upcoming and overdue maintenance, grouped by month
    Agenda {
        /// Only this car
        #[arg(short, long)]
        car: Option<i64>,

        /// Event type: maintenance, inspection, insurance, tax, other
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,

        /// Status: overdue, upcoming, completed
        #[arg(short, long)]
        status: Option<String>,

        /// Start date (YYYY-MM-DD), defaults to the configured lookback
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to the configured lookahead
        #[arg(long)]
        to: Option<String>,
    },

    /// Reminder dates for one maintenance event
    Reminders {
        /// Event series ID
        #[arg(short, long)]
        event: i64,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to the configured lookahead
        #[arg(long)]
        to: Option<String>,
    },
}
