//! Posture Monitor - posture analysis core
//!
//! Turns per-frame body landmarks into a good/bad posture decision:
//! joint angles, rolling smoothing, per-region checks, bad-posture
//! timing, and the alert decision. No camera, detector or UI code lives
//! here; those feed `KeypointSet`s in and consume `AnalysisResult`s.

pub mod alert;
pub mod config;
pub mod evaluator;
pub mod geometry;
pub mod landmarks;
pub mod posture;
pub mod session;
pub mod smoothing;

pub use alert::{should_trigger, Alert, AlertSink, AlertThrottle, TracingAlertSink};
pub use config::{AlertConfig, Config, ConfigError, LoggingConfig, SmoothingConfig, ThresholdConfig};
pub use evaluator::{ComponentEvaluator, ComponentKind, ComponentVerdict, Verdicts};
pub use geometry::angle_at;
pub use landmarks::{Joint, KeypointSet, Landmark};
pub use posture::{AnalysisResult, PostureAnalyzer, PostureState, PostureStats, PostureStatus};
pub use session::{Clock, Frame, MonitoringSession, SessionSummary, SystemClock};
pub use smoothing::SmoothingBuffer;
