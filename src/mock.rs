//! Mock implementations for testing
//!
//! Provides a scripted page fetcher, a recording mail transport and a
//! sleeper that returns immediately, so the monitoring loop can be driven
//! without network, SMTP or wall-clock delays.

use crate::error::{FetchError, TransportError};
use crate::notify::{Credentials, MailTransport};
use crate::services::monitor::Sleeper;
use crate::source::PageFetcher;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Status page served while the stream is down
pub const OFFLINE_PAGE: &str =
    "<html><body><h3>Icecast2 Status</h3><p>No mounts are currently active</p></body></html>";

/// Icecast-style status page with live listener counts
pub fn live_page(current: u32, peak: u32) -> String {
    format!(
        r#"<html><body><table>
<tr><td>Stream Title:</td><td class="streamstats">Mock Radio</td></tr>
<tr><td>Content Type:</td><td class="streamstats">audio/mpeg</td></tr>
<tr><td>Listeners (current):</td><td class="streamstats">{}</td></tr>
<tr><td>Listeners (peak):</td><td class="streamstats">{}</td></tr>
</table></body></html>"#,
        current, peak
    )
}

/// Fetcher that replays a fixed script of responses
///
/// Once the script runs out every fetch fails with a request error.
#[derive(Debug)]
pub struct MockFetcher {
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new(script: Vec<Result<String, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageFetcher for MockFetcher {
    fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Request("mock script exhausted".to_string())))
    }
}

/// A message captured by `RecordingTransport`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport that records messages instead of sending them
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMail>>,
    failing: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that rejects every message to the given addresses
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl MailTransport for RecordingTransport {
    fn send(
        &self,
        credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        if self.failing.iter().any(|a| a == to) {
            return Err(TransportError::Smtp(format!("mock relay rejected {}", to)));
        }
        self.sent.lock().unwrap().push(SentMail {
            from: credentials.address().to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Sleeper that only counts how often it was asked to sleep
#[derive(Debug, Default)]
pub struct NoopSleeper {
    slept: Vec<Duration>,
}

impl NoopSleeper {
    pub fn count(&self) -> usize {
        self.slept.len()
    }

    pub fn total(&self) -> Duration {
        self.slept.iter().sum()
    }
}

impl Sleeper for NoopSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.slept.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::extract_markers;

    #[test]
    fn test_live_page_markers() {
        let markers = extract_markers(&live_page(3, 8), "streamstats");
        assert_eq!(markers[2], "3");
        assert_eq!(markers[3], "8");
        assert!(extract_markers(OFFLINE_PAGE, "streamstats").is_empty());
    }

    #[test]
    fn test_mock_fetcher_exhausts_to_error() {
        let fetcher = MockFetcher::new(vec![Ok("x".to_string())]);
        assert!(fetcher.fetch("u").is_ok());
        assert!(fetcher.fetch("u").is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_noop_sleeper_records() {
        let mut sleeper = NoopSleeper::default();
        sleeper.sleep(Duration::from_secs(30));
        sleeper.sleep(Duration::from_secs(30));
        assert_eq!(sleeper.count(), 2);
        assert_eq!(sleeper.total(), Duration::from_secs(60));
    }
}
