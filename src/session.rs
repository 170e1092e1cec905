//! One monitoring session: feeds frames through the analyzer at the
//! session clock's time and runs the alert path.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

use crate::alert::{should_trigger, Alert, AlertSink, AlertThrottle};
use crate::config::{Config, ConfigError};
use crate::landmarks::{KeypointSet, Landmark};
use crate::posture::{AnalysisResult, PostureAnalyzer, PostureStatus};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Output of one processed frame. The result's episode fields reflect the
/// analyzer after any alert-triggered timer reset.
#[derive(Debug, Clone)]
pub struct Frame {
    pub result: AnalysisResult,
    /// Alert handed to the sink this frame, if any.
    pub alert: Option<Alert>,
    /// Whether this sample is due for persistence under the log cadence.
    pub log_due: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    pub good_posture_seconds: f64,
    pub bad_posture_seconds: f64,
    pub elapsed_seconds: f64,
}

pub struct MonitoringSession<C: Clock, S: AlertSink> {
    config: Config,
    analyzer: PostureAnalyzer,
    throttle: AlertThrottle,
    clock: C,
    sink: S,
    started_at: Instant,
    last_logged: Option<Instant>,
}

impl<C: Clock, S: AlertSink> MonitoringSession<C, S> {
    pub fn new(config: Config, clock: C, sink: S) -> Self {
        let now = clock.now();
        Self {
            analyzer: PostureAnalyzer::with_buffer_size(
                config.thresholds,
                config.smoothing.buffer_size,
                now,
            ),
            throttle: AlertThrottle::new(config.alerts),
            config,
            clock,
            sink,
            started_at: now,
            last_logged: None,
        }
    }

    pub fn start(&mut self) {
        let now = self.clock.now();
        self.analyzer.reset_stats(now);
        self.throttle.reset();
        self.started_at = now;
        self.last_logged = None;
        info!("monitoring session started");
    }

    /// Analyze index-ordered detector output, dropping landmarks under the
    /// configured visibility floor. `None` means no subject was found.
    pub fn process_landmarks(&mut self, landmarks: Option<&[Landmark]>) -> Frame {
        let keypoints = landmarks
            .map(|lms| KeypointSet::from_landmarks(lms, self.config.smoothing.min_visibility));
        self.process(keypoints.as_ref())
    }

    pub fn process(&mut self, keypoints: Option<&KeypointSet>) -> Frame {
        let now = self.clock.now();
        let result = self.analyzer.analyze(keypoints, now);

        if result.status != PostureStatus::Active {
            return Frame {
                result,
                alert: None,
                log_due: false,
            };
        }

        let mut alert = None;
        if should_trigger(
            result.bad_posture_duration,
            self.config.alerts.bad_posture_threshold(),
        ) {
            alert = self.throttle.request(&result.feedback_messages, now);
            if let Some(alert) = &alert {
                self.sink.deliver(alert);
            }
            self.analyzer.reset_bad_posture_timer();
        }
        let result = AnalysisResult {
            bad_posture_duration: self.analyzer.state().bad_posture_duration(),
            episode_active: self.analyzer.state().episode_active(),
            ..result
        };

        let log_due = match self.last_logged {
            Some(last) => {
                now.saturating_duration_since(last)
                    >= Duration::from_secs(self.config.logging.log_interval_secs)
            }
            None => true,
        };
        if log_due {
            self.last_logged = Some(now);
        }

        Frame { result, alert, log_due }
    }

    /// Swap in new settings; they apply from the next frame.
    pub fn update_config(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        self.analyzer.set_thresholds(config.thresholds);
        self.analyzer.set_buffer_size(config.smoothing.buffer_size);
        self.throttle.set_config(config.alerts);
        self.config = config;
        Ok(())
    }

    pub fn stop(&mut self) -> SessionSummary {
        let stats = self.analyzer.stats();
        let summary = SessionSummary {
            good_posture_seconds: stats.good_posture_seconds,
            bad_posture_seconds: stats.bad_posture_seconds,
            elapsed_seconds: self
                .clock
                .now()
                .saturating_duration_since(self.started_at)
                .as_secs_f64(),
        };
        info!(
            good_secs = summary.good_posture_seconds,
            bad_secs = summary.bad_posture_seconds,
            elapsed_secs = summary.elapsed_seconds,
            "monitoring session stopped"
        );
        summary
    }

    pub fn analyzer(&self) -> &PostureAnalyzer {
        &self.analyzer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
