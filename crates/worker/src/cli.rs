//! Command-line interface definitions using clap.

use clap::{Parser, Subcommand};
use orta_events::reminders::DEFAULT_HOURS_AHEAD;

/// Orta Novias worker: appointment reminders and notification retries.
#[derive(Debug, Parser)]
#[command(name = "orta-worker")]
#[command(version)]
#[command(about = "Appointment reminders and notification retries", long_about = None)]
pub struct Cli {
    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Send reminders that are due now, then exit
    SendReminders {
        /// How far ahead to look for due reminders, in hours
        #[arg(
            long,
            default_value_t = DEFAULT_HOURS_AHEAD,
            value_parser = clap::value_parser!(i64).range(1..=168)
        )]
        hours_ahead: i64,

        /// List the due reminders without sending anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Retry failed notifications that have attempts left, then exit
    RetryNotifications,

    /// Run the reminder and retry schedulers until interrupted
    Run,
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["orta-worker"]).unwrap();
        assert_eq!(cli.command(), &Commands::Run);
    }

    #[test]
    fn send_reminders_defaults() {
        let cli = Cli::try_parse_from(["orta-worker", "send-reminders"]).unwrap();
        assert_eq!(
            cli.command(),
            &Commands::SendReminders {
                hours_ahead: DEFAULT_HOURS_AHEAD,
                dry_run: false,
            }
        );
    }

    #[test]
    fn send_reminders_flags() {
        let cli = Cli::try_parse_from([
            "orta-worker",
            "send-reminders",
            "--hours-ahead",
            "24",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(
            cli.command(),
            &Commands::SendReminders {
                hours_ahead: 24,
                dry_run: true,
            }
        );
    }

    #[test]
    fn hours_ahead_must_be_positive() {
        assert!(Cli::try_parse_from(["orta-worker", "send-reminders", "--hours-ahead", "0"]).is_err());
    }
}
