//! Deciding when to notify about sustained bad posture, and rate limiting
//! the notifications that go out.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::AlertConfig;

/// Message used when an alert carries no specific defect.
pub const FALLBACK_ALERT_MESSAGE: &str = "Please correct your posture";

/// True once the current episode has lasted at least `threshold`.
pub fn should_trigger(bad_posture_duration: Duration, threshold: Duration) -> bool {
    bad_posture_duration >= threshold
}

/// A notification the delivery layer should show and/or sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub visual: bool,
    pub audio: bool,
}

impl Alert {
    pub fn from_messages(messages: &[String], visual: bool, audio: bool) -> Self {
        let message = if messages.is_empty() {
            FALLBACK_ALERT_MESSAGE.to_string()
        } else {
            messages.join(" & ")
        };
        Self { message, visual, audio }
    }
}

/// Delivery side of alerting: desktop popups, sounds, and the like.
pub trait AlertSink {
    fn deliver(&mut self, alert: &Alert);
}

/// Sink that only records alerts in the log.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn deliver(&mut self, alert: &Alert) {
        warn!(
            message = %alert.message,
            visual = alert.visual,
            audio = alert.audio,
            "posture alert"
        );
    }
}

/// Enforces a minimum spacing between delivered alerts.
#[derive(Debug, Clone)]
pub struct AlertThrottle {
    config: AlertConfig,
    last_alert: Option<Instant>,
}

impl AlertThrottle {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_alert: None,
        }
    }

    pub fn set_config(&mut self, config: AlertConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Build the alert for `messages` if one may go out at `now`.
    ///
    /// Returns `None` when both channels are disabled or the previous alert
    /// is still within the repeat interval.
    pub fn request(&mut self, messages: &[String], now: Instant) -> Option<Alert> {
        if !self.config.visual_alerts && !self.config.audio_alerts {
            debug!("alert dropped, all channels disabled");
            return None;
        }

        if let Some(last) = self.last_alert {
            let since = now.saturating_duration_since(last);
            if since < self.config.repeat_interval() {
                debug!(since_secs = since.as_secs_f64(), "alert suppressed by repeat interval");
                return None;
            }
        }

        self.last_alert = Some(now);
        Some(Alert::from_messages(
            messages,
            self.config.visual_alerts,
            self.config.audio_alerts,
        ))
    }

    pub fn reset(&mut self) {
        self.last_alert = None;
    }
}
