//! Plot command implementation
//!
//! Re-renders the audience plot of a saved session log.

use crate::cli::args::{OutputFormat, PlotArgs};
use crate::cli::output::{print_output, Written};
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::plot::{render_plot, PlotOptions};
use crate::store::SessionLog;

use std::path::{Path, PathBuf};

/// Execute the plot command
pub fn run_plot(args: &PlotArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path)?.build()?;
    let mut options = config.plot.options();
    if let Some(minutes) = args.smooth_minutes {
        options.smooth_minutes = Some(minutes).filter(|m| *m > 0);
    }

    let log = SessionLog::open(&args.log)?;
    let written = plot_log(&log, &options, args.output.as_deref())?;
    print_output(&written, format)?;

    Ok(())
}

/// Render `log`, by default next to it as `audience-<id>.png`
pub fn plot_log(log: &SessionLog, options: &PlotOptions, output: Option<&Path>) -> Result<Written> {
    let observations = log.read_all()?;
    let out: PathBuf = output.map_or_else(|| log.plot_path(), Path::to_path_buf);

    render_plot(&observations, options, &out)?;

    Ok(Written {
        action: "Plotted".to_string(),
        path: out,
        rows: observations.len(),
    })
}
