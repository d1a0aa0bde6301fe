//! Monitoring loop
//!
//! Single-threaded, tick-driven runner: sample, account downtime, append
//! to the session log, send heartbeats and threshold alerts, sleep. Each
//! tick completes before the next one starts.

use crate::domain::{DowntimeTracker, Observation, PerformanceEvaluator, PerformanceReport};
use crate::error::{AppError, StoreError};
use crate::notify::{message, Notifier, NotifyStatus, Recipients};
use crate::plot::{render_plot, PlotOptions};
use crate::source::{PageFetcher, Sampler};
use crate::store::SessionLog;

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Directory that receives session logs and plots
    pub log_directory: PathBuf,
    /// Interval between ticks, in whole seconds
    pub tick_interval_seconds: u64,
    /// Consecutive downtime tolerated before the session ends
    pub max_downtime_minutes: u64,
    /// Heartbeat cadence; 0 disables heartbeats
    pub heartbeat_interval_minutes: u64,
    /// Evaluation window; 0 disables performance evaluation
    pub eval_window_minutes: u64,
    /// Minimum absolute percent change that triggers an alert
    pub min_percent_variation: f64,
    pub heartbeat_recipients: Recipients,
    pub alert_recipients: Recipients,
    /// Prefix for notification subjects
    pub subject_prefix: String,
    /// End-of-session plot; `None` skips it
    pub plot: Option<PlotOptions>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("sessions"),
            tick_interval_seconds: 30,
            max_downtime_minutes: 10,
            heartbeat_interval_minutes: 10,
            eval_window_minutes: 5,
            min_percent_variation: 10.0,
            heartbeat_recipients: Recipients::default(),
            alert_recipients: Recipients::default(),
            subject_prefix: "Listener monitor".to_string(),
            plot: Some(PlotOptions::default()),
        }
    }
}

impl MonitorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_seconds)
    }

    /// Ticks per minute (at least one)
    pub fn samples_per_minute(&self) -> u64 {
        (60 / self.tick_interval_seconds.max(1)).max(1)
    }

    pub fn downtime_ceiling(&self) -> u32 {
        DowntimeTracker::ceiling_for(self.max_downtime_minutes, self.tick_interval_seconds)
    }

    pub fn heartbeat_every_ticks(&self) -> u64 {
        self.heartbeat_interval_minutes * self.samples_per_minute()
    }

    pub fn eval_window_ticks(&self) -> u64 {
        self.eval_window_minutes * self.samples_per_minute()
    }

    pub fn evaluator(&self) -> PerformanceEvaluator {
        PerformanceEvaluator::new(self.eval_window_minutes, self.samples_per_minute())
    }
}

/// Pause between ticks
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Where the runner is within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Sampling,
    Logging,
    PeriodicNotify,
    ThresholdNotify,
    Sleeping,
    Finished,
}

/// Per-session loop state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerState {
    pub downtime_count: u32,
    pub tick_count: u64,
    pub next_perf_eval_tick: u64,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// What a finished session produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Log that was active when the session ended
    pub log_path: PathBuf,
    pub ticks: u64,
    pub heartbeats_sent: u64,
    pub alerts_sent: u64,
    pub plot_path: Option<PathBuf>,
}

/// The monitoring loop
pub struct Runner<F, N, S> {
    config: MonitorConfig,
    sampler: Sampler<F>,
    notifier: N,
    sleeper: S,
    log: SessionLog,
    state: RunnerState,
    phase: Phase,
    heartbeats_sent: u64,
    alerts_sent: u64,
}

impl<F: PageFetcher, N: Notifier, S: Sleeper> Runner<F, N, S> {
    /// Create a runner and a fresh session log
    pub fn start(
        config: MonitorConfig,
        sampler: Sampler<F>,
        notifier: N,
        sleeper: S,
    ) -> Result<Self, StoreError> {
        let log = SessionLog::create_new(&config.log_directory)?;
        Ok(Self {
            config,
            sampler,
            notifier,
            sleeper,
            log,
            state: RunnerState::default(),
            phase: Phase::Sampling,
            heartbeats_sent: 0,
            alerts_sent: 0,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Tick until downtime exceeds the ceiling, then plot
    ///
    /// Only an unrecoverable log write ends the session with an error.
    pub fn run(&mut self) -> Result<SessionSummary, AppError> {
        log::info!(
            "Monitoring {} every {}s (downtime ceiling: {} ticks)",
            self.sampler.url(),
            self.config.tick_interval_seconds,
            self.config.downtime_ceiling()
        );

        while self.tick()? == TickOutcome::Continue {}

        let plot_path = self.plot();
        log::info!("Listener monitoring finished after {} ticks", self.state.tick_count + 1);

        Ok(SessionSummary {
            log_path: self.log.path().to_path_buf(),
            ticks: self.state.tick_count + 1,
            heartbeats_sent: self.heartbeats_sent,
            alerts_sent: self.alerts_sent,
            plot_path,
        })
    }

    /// Execute one tick
    pub fn tick(&mut self) -> Result<TickOutcome, AppError> {
        if self.phase == Phase::Finished {
            return Ok(TickOutcome::Finished);
        }

        self.phase = Phase::Sampling;
        let obs = self.sampler.sample();
        self.state.downtime_count = DowntimeTracker::update(&obs, self.state.downtime_count);

        let ceiling = self.config.downtime_ceiling();
        log::info!(
            "{} |--> downtime = {} [max: {}]",
            obs.timestamp().format("%H:%M:%S"),
            self.state.downtime_count,
            ceiling
        );

        self.phase = Phase::Logging;
        self.append(&obs)?;

        if self.state.downtime_count > ceiling {
            log::info!("Downtime ceiling exceeded, stopping");
            self.phase = Phase::Finished;
            return Ok(TickOutcome::Finished);
        }

        self.phase = Phase::PeriodicNotify;
        if self.heartbeat_due() {
            self.send_heartbeat();
        }

        self.phase = Phase::ThresholdNotify;
        if self.threshold_check_due() {
            self.state.next_perf_eval_tick = self.state.tick_count + self.config.eval_window_ticks();
            self.check_threshold();
        }

        self.phase = Phase::Sleeping;
        self.sleeper.sleep(self.config.tick_interval());
        self.state.tick_count += 1;

        Ok(TickOutcome::Continue)
    }

    /// Append with a single retry against a brand-new log
    fn append(&mut self, obs: &Observation) -> Result<(), AppError> {
        let err = match self.log.append(obs) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        log::warn!(
            "Could not append to {}: {}; starting a new session log",
            self.log.path().display(),
            err
        );

        let fresh = SessionLog::create_new(&self.config.log_directory)?;
        fresh.append(obs).map_err(|e| {
            log::error!("Append to fresh log {} failed: {}", fresh.path().display(), e);
            AppError::Store(e)
        })?;
        self.log = fresh;
        Ok(())
    }

    fn has_history(&self) -> bool {
        let window = self.config.eval_window_ticks();
        window > 0 && self.state.tick_count >= 2 * window
    }

    fn heartbeat_due(&self) -> bool {
        let every = self.config.heartbeat_every_ticks();
        every > 0 && self.state.tick_count % every == 0
    }

    fn threshold_check_due(&self) -> bool {
        let window = self.config.eval_window_ticks();
        window > 0
            && self.state.tick_count > 2 * window
            && self.state.tick_count > self.state.next_perf_eval_tick
    }

    fn evaluate(&self) -> Result<PerformanceReport, StoreError> {
        let observations = self.log.read_all()?;
        Ok(self.config.evaluator().evaluate(&observations))
    }

    fn send_heartbeat(&mut self) {
        let latest = match self.log.latest() {
            Ok(latest) => latest,
            Err(e) => {
                log::warn!("Skipping heartbeat: {}", e);
                return;
            }
        };

        let report = if self.has_history() {
            match self.evaluate() {
                Ok(report) => Some(report),
                Err(e) => {
                    log::warn!("Skipping heartbeat: {}", e);
                    return;
                }
            }
        } else {
            None
        };

        let body = message::heartbeat_body(
            &latest,
            report.as_ref().map(|r| (r, self.config.eval_window_minutes)),
        );
        let subject = message::heartbeat_subject(&self.config.subject_prefix);
        let status = self
            .notifier
            .notify(&self.config.heartbeat_recipients, &body, Some(&subject));
        self.record_status("heartbeat", status, false);
    }

    fn check_threshold(&mut self) {
        let report = match self.evaluate() {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Skipping performance check: {}", e);
                return;
            }
        };

        log::debug!(
            "Performance: median {} (prior {}), change {}%",
            report.median_recent,
            report.median_prior,
            report.pct_change
        );

        if !report.exceeds(self.config.min_percent_variation) {
            return;
        }

        let latest = match self.log.latest() {
            Ok(latest) => latest,
            Err(e) => {
                log::warn!("Skipping alert: {}", e);
                return;
            }
        };

        let body = message::alert_body(&latest, &report, self.config.eval_window_minutes);
        let subject = message::alert_subject(&self.config.subject_prefix, &report);
        let status = self
            .notifier
            .notify(&self.config.alert_recipients, &body, Some(&subject));
        self.record_status("alert", status, true);
    }

    fn record_status(&mut self, kind: &str, status: NotifyStatus, alert: bool) {
        log::info!("{} via {}: {}", kind, self.notifier.name(), status);
        if status.is_sent() {
            if alert {
                self.alerts_sent += 1;
            } else {
                self.heartbeats_sent += 1;
            }
        }
    }

    fn plot(&self) -> Option<PathBuf> {
        let options = self.config.plot?;
        let out = self.log.plot_path();

        let result = self
            .log
            .read_all()
            .map_err(AppError::from)
            .and_then(|obs| render_plot(&obs, &options, &out).map_err(AppError::from));

        match result {
            Ok(()) => Some(out),
            Err(e) => {
                log::warn!("No plot produced: {}", e);
                None
            }
        }
    }
}
