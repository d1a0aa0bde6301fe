//! One-shot listener sampling
//!
//! Turns a single fetch attempt into an `Observation`. Fetch and parse
//! failures never propagate past this point.

use crate::domain::Observation;
use crate::error::FetchError;
use crate::source::{extract_markers, PageFetcher};

use chrono::NaiveDateTime;

/// Where the listener counts live on the status page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerLayout {
    /// CSS class carried by every statistic element
    pub class: String,
    /// Position of the current-listeners value among the markers
    pub current_index: usize,
    /// Position of the peak-listeners value among the markers
    pub peak_index: usize,
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            class: "streamstats".to_string(),
            current_index: 2,
            peak_index: 3,
        }
    }
}

/// Samples the status page once per call
pub struct Sampler<F> {
    fetcher: F,
    url: String,
    layout: MarkerLayout,
}

impl<F: PageFetcher> Sampler<F> {
    pub fn new(fetcher: F, url: impl Into<String>, layout: MarkerLayout) -> Self {
        Self {
            fetcher,
            url: url.into(),
            layout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Take one reading
    pub fn sample(&self) -> Observation {
        let result = self
            .fetcher
            .fetch(&self.url)
            .map(|doc| extract_markers(&doc, &self.layout.class));

        let obs = classify(Observation::now(), result, &self.layout);
        log::debug!("Sampled {}: {}", self.url, obs);
        obs
    }
}

/// Map a fetch outcome to an observation
///
/// | outcome                               | observation       |
/// |---------------------------------------|-------------------|
/// | fetch failed                          | connection error  |
/// | no markers                            | off air           |
/// | markers present, counts parse         | on air            |
/// | markers present, counts missing/bad   | connection error  |
pub fn classify(
    timestamp: NaiveDateTime,
    result: Result<Vec<String>, FetchError>,
    layout: &MarkerLayout,
) -> Observation {
    let markers = match result {
        Ok(markers) => markers,
        Err(e) => {
            log::warn!("Fetch failed: {}", e);
            return Observation::connection_error(timestamp);
        }
    };

    if markers.is_empty() {
        return Observation::off_air(timestamp);
    }

    match read_counts(&markers, layout) {
        Ok((current, peak)) => Observation::on_air(timestamp, current, peak),
        Err(e) => {
            log::warn!("{}", FetchError::Markers(e));
            Observation::connection_error(timestamp)
        }
    }
}

fn read_counts(markers: &[String], layout: &MarkerLayout) -> Result<(u32, u32), String> {
    let field = |idx: usize, name: &str| -> Result<u32, String> {
        let raw = markers
            .get(idx)
            .ok_or_else(|| format!("{} marker #{} missing ({} found)", name, idx, markers.len()))?;
        raw.parse::<u32>()
            .map_err(|_| format!("{} marker #{} is not a count: '{}'", name, idx, raw))
    };

    Ok((
        field(layout.current_index, "current")?,
        field(layout.peak_index, "peak")?,
    ))
}
