//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::PerformanceReport;
use crate::notify::message::percent;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn stat(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.1}", value)
    }
}

/// Summary of a saved session log
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub id: String,
    pub path: PathBuf,
    pub rows: usize,
    pub first: Option<String>,
    pub last: Option<String>,
    pub on_air_rows: usize,
    pub connection_errors: usize,
    pub current: Option<u32>,
    pub peak: Option<u32>,
    pub window_minutes: u64,
    /// `None` until the log holds two full windows
    pub performance: Option<PerformanceReport>,
}

impl TableDisplay for SessionStats {
    fn to_table(&self) -> String {
        let mut output = format!("Session {}\n", self.id);
        output.push_str(&format!("  Log: {}\n", self.path.display()));
        output.push_str(&format!("  Rows: {}\n", self.rows));
        if let (Some(first), Some(last)) = (&self.first, &self.last) {
            output.push_str(&format!("  Span: {} .. {}\n", first, last));
        }
        output.push_str(&format!(
            "  On air: {}  Connection errors: {}\n",
            self.on_air_rows, self.connection_errors
        ));
        output.push_str(&format!(
            "  Current listeners: {}\n  Peak listeners: {}\n",
            count(self.current),
            count(self.peak)
        ));

        match &self.performance {
            Some(report) => {
                output.push_str(&format!(
                    "  Last {w} min: mean {}, median {}\n  Previous {w} min: median {}\n  Change: {}%",
                    stat(report.mean_recent),
                    stat(report.median_recent),
                    stat(report.median_prior),
                    percent(report.pct_change),
                    w = self.window_minutes
                ));
            }
            None => output.push_str("  Not enough history for a performance evaluation"),
        }

        output
    }

    fn to_compact(&self) -> String {
        let change = self
            .performance
            .as_ref()
            .map_or_else(|| "n/a".to_string(), |r| format!("{}%", percent(r.pct_change)));
        format!(
            "{} rows={} current={} peak={} change={}",
            self.id,
            self.rows,
            count(self.current),
            count(self.peak),
            change
        )
    }
}

/// Result of a single page fetch
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub url: String,
    pub saved_to: Option<PathBuf>,
    pub bytes: usize,
    pub markers: Vec<String>,
    pub current: Option<u32>,
    pub peak: Option<u32>,
    pub on_air: bool,
}

impl TableDisplay for SnapshotReport {
    fn to_table(&self) -> String {
        let mut output = format!("{} ({} bytes)\n", self.url, self.bytes);
        if let Some(path) = &self.saved_to {
            output.push_str(&format!("  Saved to: {}\n", path.display()));
        }
        output.push_str(&format!("  Markers found: {}\n", self.markers.len()));
        for (i, marker) in self.markers.iter().enumerate() {
            output.push_str(&format!("    [{}] {}\n", i, marker));
        }
        output.push_str(&format!(
            "  On air: {}\n  Current: {}\n  Peak: {}",
            if self.on_air { "yes" } else { "no" },
            count(self.current),
            count(self.peak)
        ));
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "markers={} on_air={} current={} peak={}",
            self.markers.len(),
            self.on_air,
            count(self.current),
            count(self.peak)
        )
    }
}

/// Generic file-produced message
#[derive(Debug, Clone, Serialize)]
pub struct Written {
    pub action: String,
    pub path: PathBuf,
    pub rows: usize,
}

impl TableDisplay for Written {
    fn to_table(&self) -> String {
        format!("{} {} ({} rows)", self.action, self.path.display(), self.rows)
    }

    fn to_compact(&self) -> String {
        self.path.display().to_string()
    }
}

/// Session summary after `run`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub log: PathBuf,
    pub ticks: u64,
    pub heartbeats_sent: u64,
    pub alerts_sent: u64,
    pub plot: Option<PathBuf>,
}

impl TableDisplay for RunReport {
    fn to_table(&self) -> String {
        let mut output = format!("Session ended after {} samples\n", self.ticks);
        output.push_str(&format!("  Log: {}\n", self.log.display()));
        output.push_str(&format!(
            "  Heartbeats sent: {}\n  Alerts sent: {}",
            self.heartbeats_sent, self.alerts_sent
        ));
        if let Some(plot) = &self.plot {
            output.push_str(&format!("\n  Plot: {}", plot.display()));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(performance: Option<PerformanceReport>) -> SessionStats {
        SessionStats {
            id: "2026-10-17__20h00m00s".to_string(),
            path: PathBuf::from("/tmp/s.csv"),
            rows: 40,
            first: Some("2026-10-17T20:00:00".to_string()),
            last: Some("2026-10-17T20:19:30".to_string()),
            on_air_rows: 38,
            connection_errors: 1,
            current: Some(120),
            peak: None,
            window_minutes: 5,
            performance,
        }
    }

    #[test]
    fn test_stats_table_without_history() {
        let table = stats(None).to_table();
        assert!(table.contains("Current listeners: 120"));
        assert!(table.contains("Peak listeners: n/a"));
        assert!(table.contains("Not enough history"));
    }

    #[test]
    fn test_stats_compact_with_report() {
        let report = PerformanceReport {
            mean_recent: 150.0,
            median_recent: 150.0,
            median_prior: 100.0,
            pct_change: 50.0,
        };
        let compact = stats(Some(report)).to_compact();
        assert_eq!(
            compact,
            "2026-10-17__20h00m00s rows=40 current=120 peak=n/a change=50%"
        );
    }

    #[test]
    fn test_stats_json_serializes() {
        let json = serde_json::to_string(&stats(None)).unwrap();
        assert!(json.contains("\"rows\":40"));
        assert!(json.contains("\"performance\":null"));
    }

    #[test]
    fn test_snapshot_table_lists_markers() {
        let report = SnapshotReport {
            url: "http://example.org/".to_string(),
            saved_to: None,
            bytes: 10,
            markers: vec!["a".into(), "b".into()],
            current: None,
            peak: None,
            on_air: false,
        };
        let table = report.to_table();
        assert!(table.contains("Markers found: 2"));
        assert!(table.contains("[1] b"));
        assert!(table.contains("On air: no"));
    }

    #[test]
    fn test_default_compact_joins_lines() {
        let report = RunReport {
            log: PathBuf::from("s.csv"),
            ticks: 3,
            heartbeats_sent: 0,
            alerts_sent: 0,
            plot: None,
        };
        assert!(!report.to_compact().contains('\n'));
    }
}
