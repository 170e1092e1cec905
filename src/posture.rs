use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ThresholdConfig;
use crate::evaluator::{ComponentEvaluator, ComponentKind, Verdicts};
use crate::geometry::angle_at;
use crate::landmarks::{Joint, KeypointSet};
use crate::smoothing::{SmoothingBuffer, DEFAULT_BUFFER_SIZE};

/// Feedback attached to an `Undetected` result.
pub const UNDETECTED_MESSAGE: &str = "User not detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureStatus {
    /// No keypoints at all this frame.
    NoSubject,
    /// Keypoints present, but no region could be evaluated.
    Undetected,
    /// At least one region produced a verdict.
    Active,
}

impl PostureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSubject => "no_subject",
            Self::Undetected => "undetected",
            Self::Active => "active",
        }
    }
}

/// Session timers and accumulators. Only counted (`Active`) samples add
/// time to either bucket.
#[derive(Debug, Clone)]
pub struct PostureState {
    bad_posture_start_time: Option<Instant>,
    bad_posture_duration: Duration,
    is_bad_posture: bool,
    good_posture_time: Duration,
    bad_posture_time: Duration,
    last_update_time: Instant,
}

impl PostureState {
    pub fn new(now: Instant) -> Self {
        Self {
            bad_posture_start_time: None,
            bad_posture_duration: Duration::ZERO,
            is_bad_posture: false,
            good_posture_time: Duration::ZERO,
            bad_posture_time: Duration::ZERO,
            last_update_time: now,
        }
    }

    /// A sample that counts toward neither bucket.
    pub fn skip(&mut self, now: Instant) {
        self.last_update_time = now;
    }

    /// Attribute the time since the previous sample and move the episode
    /// timer along.
    pub fn advance(&mut self, is_good: bool, now: Instant) {
        let time_delta = now.saturating_duration_since(self.last_update_time);
        self.last_update_time = now;

        if is_good {
            self.good_posture_time += time_delta;
            if let Some(start) = self.bad_posture_start_time.take() {
                self.bad_posture_duration = now.saturating_duration_since(start);
                self.is_bad_posture = false;
                info!(
                    duration_secs = self.bad_posture_duration.as_secs_f64(),
                    "bad posture episode ended"
                );
            }
        } else {
            self.bad_posture_time += time_delta;
            match self.bad_posture_start_time {
                Some(start) => {
                    self.bad_posture_duration = now.saturating_duration_since(start);
                }
                None => {
                    self.bad_posture_start_time = Some(now);
                    self.bad_posture_duration = Duration::ZERO;
                    self.is_bad_posture = true;
                    info!("bad posture episode started");
                }
            }
        }
    }

    /// Close the open episode and zero its duration. Accumulators stay.
    pub fn reset_bad_posture_timer(&mut self) {
        self.bad_posture_start_time = None;
        self.bad_posture_duration = Duration::ZERO;
        self.is_bad_posture = false;
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    pub fn bad_posture_duration(&self) -> Duration {
        self.bad_posture_duration
    }

    pub fn is_bad_posture(&self) -> bool {
        self.is_bad_posture
    }

    pub fn episode_active(&self) -> bool {
        self.bad_posture_start_time.is_some()
    }

    pub fn good_posture_time(&self) -> Duration {
        self.good_posture_time
    }

    pub fn bad_posture_time(&self) -> Duration {
        self.bad_posture_time
    }

    pub fn last_update_time(&self) -> Instant {
        self.last_update_time
    }
}

/// Session totals, as reported when monitoring stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PostureStats {
    pub good_posture_seconds: f64,
    pub bad_posture_seconds: f64,
    pub bad_posture_duration: f64,
    pub is_bad_posture: bool,
}

/// Snapshot of one analyzed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub neck_angle: Option<f32>,
    pub shoulder_alignment: Option<f32>,
    pub spine_curvature: Option<f32>,
    pub is_good_posture: bool,
    pub status: PostureStatus,
    #[serde(serialize_with = "as_secs")]
    pub bad_posture_duration: Duration,
    /// Distinguishes a running episode from a frozen duration left by the
    /// previous one.
    pub episode_active: bool,
    pub feedback_messages: Vec<String>,
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl AnalysisResult {
    /// Short status text for a live display.
    pub fn status_line(&self) -> String {
        match self.status {
            PostureStatus::NoSubject => "No Person Detected".to_string(),
            PostureStatus::Undetected => "No User Detected".to_string(),
            PostureStatus::Active if self.is_good_posture => "Good Posture".to_string(),
            PostureStatus::Active if self.feedback_messages.is_empty() => {
                "Poor Posture".to_string()
            }
            PostureStatus::Active => format!("Fix: {}", self.feedback_messages.join(", ")),
        }
    }
}

/// Turns keypoint frames into posture verdicts and keeps the session timers.
///
/// One analyzer per monitoring session; calls must be serialized by the
/// owner.
pub struct PostureAnalyzer {
    thresholds: ThresholdConfig,
    evaluators: [ComponentEvaluator; 3],
    buffers: [SmoothingBuffer; 3],
    state: PostureState,
    last_status: Option<PostureStatus>,
}

impl PostureAnalyzer {
    pub fn new(thresholds: ThresholdConfig, now: Instant) -> Self {
        Self::with_buffer_size(thresholds, DEFAULT_BUFFER_SIZE, now)
    }

    pub fn with_buffer_size(thresholds: ThresholdConfig, buffer_size: usize, now: Instant) -> Self {
        info!(?thresholds, buffer_size, "posture analyzer created");
        Self {
            thresholds,
            evaluators: Self::build_evaluators(&thresholds),
            buffers: std::array::from_fn(|_| SmoothingBuffer::new(buffer_size)),
            state: PostureState::new(now),
            last_status: None,
        }
    }

    fn build_evaluators(thresholds: &ThresholdConfig) -> [ComponentEvaluator; 3] {
        ComponentKind::ALL.map(|kind| ComponentEvaluator::from_thresholds(kind, thresholds))
    }

    /// Applies from the next analyzed frame on.
    pub fn set_thresholds(&mut self, thresholds: ThresholdConfig) {
        info!(?thresholds, "posture thresholds updated");
        self.thresholds = thresholds;
        self.evaluators = Self::build_evaluators(&thresholds);
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        for buffer in &mut self.buffers {
            buffer.resize(buffer_size);
        }
    }

    /// Raw neck, shoulder and spine angles for one frame.
    fn raw_angles(keypoints: &KeypointSet) -> [Option<f32>; 3] {
        let at = |a, b, c| angle_at(keypoints.get(a), keypoints.get(b), keypoints.get(c));
        [
            at(Joint::Nose, Joint::LeftShoulder, Joint::LeftHip),
            at(Joint::LeftShoulder, Joint::RightShoulder, Joint::Nose),
            at(Joint::LeftShoulder, Joint::LeftHip, Joint::LeftKnee),
        ]
    }

    pub fn analyze(&mut self, keypoints: Option<&KeypointSet>, now: Instant) -> AnalysisResult {
        let Some(keypoints) = keypoints else {
            self.state.skip(now);
            self.note_status(PostureStatus::NoSubject);
            return self.idle_result(PostureStatus::NoSubject, [None; 3], Vec::new());
        };

        let raw = Self::raw_angles(keypoints);
        let mut smoothed = [None; 3];
        for ((slot, buffer), value) in smoothed.iter_mut().zip(&mut self.buffers).zip(raw) {
            *slot = buffer.push(value);
        }

        let verdicts = Verdicts::collect(&self.evaluators, smoothed);
        let Some(is_good_posture) = verdicts.all_passing() else {
            self.state.skip(now);
            self.note_status(PostureStatus::Undetected);
            return self.idle_result(
                PostureStatus::Undetected,
                smoothed,
                vec![UNDETECTED_MESSAGE.to_string()],
            );
        };

        self.state.advance(is_good_posture, now);
        self.note_status(PostureStatus::Active);

        let [neck_angle, shoulder_alignment, spine_curvature] = smoothed;
        AnalysisResult {
            neck_angle,
            shoulder_alignment,
            spine_curvature,
            is_good_posture,
            status: PostureStatus::Active,
            bad_posture_duration: self.state.bad_posture_duration(),
            episode_active: self.state.episode_active(),
            feedback_messages: verdicts.defect_messages(),
        }
    }

    fn idle_result(
        &self,
        status: PostureStatus,
        angles: [Option<f32>; 3],
        feedback_messages: Vec<String>,
    ) -> AnalysisResult {
        let [neck_angle, shoulder_alignment, spine_curvature] = angles;
        AnalysisResult {
            neck_angle,
            shoulder_alignment,
            spine_curvature,
            is_good_posture: false,
            status,
            bad_posture_duration: self.state.bad_posture_duration(),
            episode_active: self.state.episode_active(),
            feedback_messages,
        }
    }

    fn note_status(&mut self, status: PostureStatus) {
        if self.last_status != Some(status) {
            debug!(status = status.as_str(), "posture status changed");
            self.last_status = Some(status);
        }
    }

    pub fn reset_bad_posture_timer(&mut self) {
        self.state.reset_bad_posture_timer();
    }

    /// Start of a session: zero the accumulators and forget all smoothing
    /// history.
    pub fn reset_stats(&mut self, now: Instant) {
        self.state.reset(now);
        for buffer in &mut self.buffers {
            buffer.clear();
        }
        self.last_status = None;
        info!("posture stats reset");
    }

    pub fn stats(&self) -> PostureStats {
        PostureStats {
            good_posture_seconds: self.state.good_posture_time().as_secs_f64(),
            bad_posture_seconds: self.state.bad_posture_time().as_secs_f64(),
            bad_posture_duration: self.state.bad_posture_duration().as_secs_f64(),
            is_bad_posture: self.state.is_bad_posture(),
        }
    }

    pub fn state(&self) -> &PostureState {
        &self.state
    }
}
