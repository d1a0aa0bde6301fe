//! Snapshot command implementation
//!
//! Fetches the status page once and shows what the sampler would see.

use crate::cli::args::{OutputFormat, SnapshotArgs};
use crate::cli::output::{print_output, SnapshotReport};
use crate::config::{ConfigBuilder, SourceConfig};
use crate::domain::Observation;
use crate::error::{Result, StoreError};
use crate::source::{classify, extract_markers, HttpFetcher, PageFetcher};

use std::path::Path;
use std::time::Duration;

/// Execute the snapshot command
pub fn run_snapshot(args: &SnapshotArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_url(args.url.clone())
        .build()?;

    let fetcher = HttpFetcher::new(Duration::from_secs(config.source.timeout_seconds))?;
    let report = take_snapshot(&fetcher, &config.source, args.output.as_deref())?;
    print_output(&report, format)?;

    Ok(())
}

/// Fetch the page, optionally save it, and classify its markers
///
/// Unlike the monitoring loop a failed fetch is reported as an error.
pub fn take_snapshot<F: PageFetcher>(
    fetcher: &F,
    source: &SourceConfig,
    output: Option<&Path>,
) -> Result<SnapshotReport> {
    let document = fetcher.fetch(&source.url)?;

    if let Some(path) = output {
        std::fs::write(path, &document).map_err(|e| StoreError::io(path, e))?;
        log::info!("Saved page to {}", path.display());
    }

    let markers = extract_markers(&document, &source.marker_class);
    let obs = classify(Observation::now(), Ok(markers.clone()), &source.layout());

    Ok(SnapshotReport {
        url: source.url.clone(),
        saved_to: output.map(Path::to_path_buf),
        bytes: document.len(),
        markers,
        current: obs.current(),
        peak: obs.peak(),
        on_air: obs.is_on_air(),
    })
}
