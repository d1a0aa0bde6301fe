//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live-stream listener monitor
///
/// Scrape an Icecast-style status page, log listener counts, email
/// heartbeats and variation alerts, and plot the session when it ends.
#[derive(Parser, Debug)]
#[command(name = "listenwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LISTENWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a monitoring session
    Run(RunArgs),

    /// Render the plot of a saved session log
    Plot(PlotArgs),

    /// Show latest counts and performance of a saved session log
    Stats(StatsArgs),

    /// Merge several session logs into one
    Merge(MergeArgs),

    /// Fetch the status page once and save it for inspection
    Snapshot(SnapshotArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Status page URL
    #[arg(long)]
    pub url: Option<String>,

    /// Directory for session logs and plots
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Seconds between samples (1-60)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Minutes of consecutive downtime that end the session
    #[arg(long)]
    pub max_downtime: Option<u64>,

    /// Minutes between heartbeat emails (0 disables)
    #[arg(long)]
    pub heartbeat_every: Option<u64>,

    /// Minutes per performance evaluation window (0 disables)
    #[arg(long)]
    pub eval_window: Option<u64>,

    /// Minimum percent change that triggers an alert
    #[arg(long)]
    pub min_variation: Option<f64>,

    /// Heartbeat recipient (repeatable)
    #[arg(long = "heartbeat-to", value_name = "ADDRESS")]
    pub heartbeat_to: Vec<String>,

    /// Alert recipient (repeatable)
    #[arg(long = "alert-to", value_name = "ADDRESS")]
    pub alert_to: Vec<String>,

    /// Single-line credentials file (<address><SEP><password>)
    #[arg(long, env = "LISTENWATCH_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Skip the end-of-session plot
    #[arg(long)]
    pub no_plot: bool,
}

/// Arguments for the plot command
#[derive(Parser, Debug)]
pub struct PlotArgs {
    /// Session log to plot
    pub log: PathBuf,

    /// Rolling-median window in minutes (0 draws the raw series)
    #[arg(short, long)]
    pub smooth_minutes: Option<u64>,

    /// Output image path (default: audience-<session>.png next to the log)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Session log to summarize
    pub log: PathBuf,

    /// Evaluation window in minutes (default: from config)
    #[arg(short, long)]
    pub window: Option<u64>,
}

/// Arguments for the merge command
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Session logs to merge
    #[arg(required = true, num_args = 2..)]
    pub logs: Vec<PathBuf>,

    /// Merged log path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also render the merged plot
    #[arg(long)]
    pub plot: bool,
}

/// Arguments for the snapshot command
#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Status page URL (default: from config)
    #[arg(long)]
    pub url: Option<String>,

    /// Where to save the raw page
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run_defaults() {
        let args = Cli::try_parse_from(["listenwatch", "run"]).unwrap();
        match args.command {
            Commands::Run(run) => {
                assert!(run.url.is_none());
                assert!(run.interval.is_none());
                assert!(!run.no_plot);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let args = Cli::try_parse_from([
            "listenwatch",
            "run",
            "--interval",
            "15",
            "--max-downtime",
            "4",
            "--alert-to",
            "a@example.com",
            "--alert-to",
            "b@example.com",
            "--no-plot",
        ])
        .unwrap();
        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.interval, Some(15));
        assert_eq!(run.max_downtime, Some(4));
        assert_eq!(run.alert_to.len(), 2);
        assert!(run.no_plot);
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["listenwatch", "-v", "stats", "s.csv"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_parse_plot() {
        let args = Cli::try_parse_from(["listenwatch", "plot", "s.csv", "-s", "5"]).unwrap();
        let Commands::Plot(plot) = args.command else {
            panic!("expected plot");
        };
        assert_eq!(plot.smooth_minutes, Some(5));
        assert!(plot.output.is_none());
    }

    #[test]
    fn test_cli_merge_needs_two_logs() {
        assert!(Cli::try_parse_from(["listenwatch", "merge", "a.csv", "-o", "m.csv"]).is_err());
        let args =
            Cli::try_parse_from(["listenwatch", "merge", "a.csv", "b.csv", "-o", "m.csv"]).unwrap();
        assert!(matches!(args.command, Commands::Merge(_)));
    }

    #[test]
    fn test_cli_parse_format() {
        let args =
            Cli::try_parse_from(["listenwatch", "--format", "json", "stats", "s.csv"]).unwrap();
        assert!(matches!(args.format, OutputFormat::Json));
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }
}
