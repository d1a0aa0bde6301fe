//! listenwatch - live-stream listener monitor
//!
//! A command-line tool that polls a stream status page, logs listener
//! counts and emails heartbeats and audience-change alerts.

use clap::Parser;
use listenwatch::cli::args::{generate_completions, Cli, Commands};
use listenwatch::commands::{run_merge, run_monitor, run_plot, run_snapshot, run_stats};
use listenwatch::error::{AppError, ConfigError, FetchError, PlotError, StoreError};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging, raised to debug by the verbose flag
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_monitor(args, config, cli.format),

        Commands::Plot(args) => run_plot(args, config, cli.format),

        Commands::Stats(args) => run_stats(args, config, cli.format),

        Commands::Merge(args) => run_merge(args, config, cli.format),

        Commands::Snapshot(args) => run_snapshot(args, config, cli.format),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Check the --config path or the LISTENWATCH_CONFIG variable.");
        }
        AppError::Fetch(FetchError::Request(_) | FetchError::Status(_)) => {
            eprintln!();
            eprintln!("Hint: Make sure the status page URL is reachable.");
            eprintln!("      Use --url or [source] url in the config file.");
        }
        AppError::Store(StoreError::NotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Session logs live in [general] log_directory.");
        }
        AppError::Plot(PlotError::NoData) => {
            eprintln!();
            eprintln!("Hint: The log has no listener counts; the stream was never on air.");
        }
        _ => {}
    }
}
