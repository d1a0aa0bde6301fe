//! CSV-backed session log
//!
//! Every append re-reads the whole file and rewrites it through a sibling
//! temp file that is renamed over the target.

use crate::domain::{LatestAudience, Observation};
use crate::error::StoreError;

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// Column header of the backing file
pub const HEADER: [&str; 5] = ["datetime", "current", "peak", "onAir", "connectionError"];

/// Timestamp format for the `datetime` column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// File-name format for new session identifiers
pub const ID_FORMAT: &str = "%Y-%m-%d__%Hh%Mm%Ss";

const EXTENSION: &str = "csv";

/// Handle to one session's backing file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Create an empty log named after the current local time
    pub fn create_new(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let stem = Local::now().format(ID_FORMAT).to_string();
        let mut path = dir.join(format!("{}.{}", stem, EXTENSION));
        let mut suffix = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.{}", stem, suffix, EXTENSION));
            suffix += 1;
        }

        let log = Self { path };
        log.write_all(&[])?;
        log::info!("Created session log {}", log.path.display());
        Ok(log)
    }

    /// Open an existing log
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.is_file() {
            return Err(StoreError::NotFound(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session identifier (file stem)
    pub fn id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path of the plot image that belongs to this session
    pub fn plot_path(&self) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("audience-{}.png", self.id()))
    }

    /// Read every observation in file order
    pub fn read_all(&self) -> Result<Vec<Observation>, StoreError> {
        if !self.path.is_file() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let mut observations = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            observations.push(decode_row(&record, line)?);
        }
        Ok(observations)
    }

    /// Append one observation (read-modify-write)
    ///
    /// Rows stay in non-decreasing time order: a timestamp earlier than the
    /// last row (DST fall-back, clock step) is clamped to that row's time.
    pub fn append(&self, obs: &Observation) -> Result<(), StoreError> {
        let mut observations = self.read_all()?;
        let obs = match observations.last() {
            Some(last) if obs.timestamp() < last.timestamp() => {
                log::warn!(
                    "Clock went back from {} to {}; stamping row at {}",
                    last.timestamp().format(TIMESTAMP_FORMAT),
                    obs.timestamp().format(TIMESTAMP_FORMAT),
                    last.timestamp().format(TIMESTAMP_FORMAT)
                );
                obs.at(last.timestamp())
            }
            _ => *obs,
        };
        observations.push(obs);
        self.write_all(&observations)
    }

    /// Replace the whole file with `observations`
    pub fn write_all(&self, observations: &[Observation]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension(format!("{}.tmp", EXTENSION));

        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(HEADER)?;
            for obs in observations {
                writer.write_record(encode_row(obs))?;
            }
            writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        }

        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    /// Current/peak of the last row
    pub fn latest(&self) -> Result<LatestAudience, StoreError> {
        let observations = self.read_all()?;
        let last = observations
            .last()
            .ok_or_else(|| StoreError::EmptyLog(self.path.clone()))?;
        Ok(LatestAudience {
            current: last.current(),
            peak: last.peak(),
        })
    }

    /// Concatenate several logs into a new file at `output`
    ///
    /// Rows are stably sorted by timestamp so the merged log keeps
    /// non-decreasing time order.
    pub fn merge(inputs: &[SessionLog], output: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut merged = Vec::new();
        for input in inputs {
            merged.extend(input.read_all()?);
        }
        merged.sort_by_key(|o| o.timestamp());

        let output = output.into();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let log = Self { path: output };
        log.write_all(&merged)?;
        Ok(log)
    }
}

fn encode_row(obs: &Observation) -> [String; 5] {
    [
        obs.timestamp().format(TIMESTAMP_FORMAT).to_string(),
        obs.current().map(|v| v.to_string()).unwrap_or_default(),
        obs.peak().map(|v| v.to_string()).unwrap_or_default(),
        obs.is_on_air().to_string(),
        obs.is_connection_error().to_string(),
    ]
}

fn decode_row(record: &csv::StringRecord, line: u64) -> Result<Observation, StoreError> {
    let invalid = |message: String| StoreError::InvalidRow { line, message };

    if record.len() < 4 {
        return Err(invalid(format!("expected at least 4 fields, found {}", record.len())));
    }

    let timestamp = NaiveDateTime::parse_from_str(&record[0], TIMESTAMP_FORMAT)
        .map_err(|e| invalid(format!("bad datetime '{}': {}", &record[0], e)))?;
    let current = parse_count(&record[1]).map_err(|e| invalid(format!("current: {}", e)))?;
    let peak = parse_count(&record[2]).map_err(|e| invalid(format!("peak: {}", e)))?;
    let on_air = parse_flag(&record[3]).map_err(|e| invalid(format!("onAir: {}", e)))?;
    // Legacy four-column logs carry no connection flag.
    let connection_error = match record.get(4) {
        Some(raw) => parse_flag(raw).map_err(|e| invalid(format!("connectionError: {}", e)))?,
        None => false,
    };

    Observation::from_parts(timestamp, current, peak, on_air, connection_error)
        .ok_or_else(|| invalid("inconsistent on-air/count fields".to_string()))
}

fn parse_count(raw: &str) -> Result<Option<u32>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    // Spreadsheet exports sometimes write integral counts as floats.
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| format!("not a count: '{}'", raw))
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(format!("not a boolean: '{}'", other)),
    }
}
