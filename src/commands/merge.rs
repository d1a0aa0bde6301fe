//! Merge command implementation
//!
//! Joins several session logs into one, optionally plotting the result.

use crate::cli::args::{MergeArgs, OutputFormat};
use crate::cli::output::{print_output, Written};
use crate::commands::plot::plot_log;
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::store::SessionLog;

/// Execute the merge command
pub fn run_merge(args: &MergeArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let inputs = args
        .logs
        .iter()
        .map(SessionLog::open)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let merged = SessionLog::merge(&inputs, args.output.clone())?;
    let rows = merged.read_all()?.len();
    log::info!("Merged {} logs into {}", inputs.len(), merged.path().display());

    print_output(
        &Written {
            action: "Merged".to_string(),
            path: merged.path().to_path_buf(),
            rows,
        },
        format,
    )?;

    if args.plot {
        let config = ConfigBuilder::new().with_file(config_path)?.build()?;
        let written = plot_log(&merged, &config.plot.options(), None)?;
        print_output(&written, format)?;
    }

    Ok(())
}
