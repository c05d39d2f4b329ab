//! Command-line interface definitions.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Triage and label inbound records-request mail.
#[derive(Debug, Parser)]
#[command(name = "mailroom", version, about)]
pub struct Args {
    /// Path to the settings file (defaults to the platform config dir).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify and label messages received on or after a date.
    Run {
        /// Start date (YYYY-MM-DD); defaults to yesterday.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create the agency and status labels (safe to re-run).
    CreateLabels,
    /// Delete labels by id, or every user label after confirmation.
    DeleteLabels {
        /// Label ids to delete; none means full wipe with a prompt.
        ids: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_date() {
        let args = Args::parse_from(["mailroom", "run", "--date", "2024-04-13"]);
        match args.command {
            Command::Run { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 4, 13));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parse_run_without_date() {
        let args = Args::parse_from(["mailroom", "run"]);
        assert!(matches!(args.command, Command::Run { date: None }));
    }

    #[test]
    fn parse_delete_labels_ids() {
        let args = Args::parse_from(["mailroom", "delete-labels", "Label_1", "Label_2"]);
        match args.command {
            Command::DeleteLabels { ids } => assert_eq!(ids, vec!["Label_1", "Label_2"]),
            _ => panic!("expected delete-labels command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let args = Args::parse_from(["mailroom", "-v", "--config", "alt.json", "create-labels"]);
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("alt.json")));
        assert!(matches!(args.command, Command::CreateLabels));
    }
}
