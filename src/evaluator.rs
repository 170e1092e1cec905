//! Per-region pass/fail checks over smoothed angles.

use serde::Serialize;

use crate::config::ThresholdConfig;

/// Body region being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Neck,
    Shoulders,
    Spine,
}

impl ComponentKind {
    /// Evaluation and message order.
    pub const ALL: [ComponentKind; 3] = [Self::Neck, Self::Shoulders, Self::Spine];

    pub fn defect_message(self) -> &'static str {
        match self {
            Self::Neck => "Keep head straight",
            Self::Shoulders => "Level your shoulders",
            Self::Spine => "Straighten your back",
        }
    }
}

/// Outcome for one region in one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentVerdict {
    pub kind: ComponentKind,
    pub is_passing: bool,
    pub defect_message: Option<&'static str>,
}

/// One region's check: the kind plus the tolerance it is judged against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentEvaluator {
    pub kind: ComponentKind,
    pub threshold: f32,
}

impl ComponentEvaluator {
    pub fn new(kind: ComponentKind, threshold: f32) -> Self {
        Self { kind, threshold }
    }

    /// Pick the matching tolerance out of a profile's thresholds.
    pub fn from_thresholds(kind: ComponentKind, thresholds: &ThresholdConfig) -> Self {
        let threshold = match kind {
            ComponentKind::Neck => thresholds.neck_angle_threshold,
            ComponentKind::Shoulders => thresholds.shoulder_alignment_threshold,
            ComponentKind::Spine => thresholds.spine_curvature_threshold,
        };
        Self::new(kind, threshold)
    }

    pub fn passes(&self, angle: f32) -> bool {
        match self.kind {
            ComponentKind::Neck => angle > 90.0 - self.threshold,
            ComponentKind::Shoulders => (180.0 - angle).abs() < self.threshold,
            ComponentKind::Spine => angle > 180.0 - self.threshold,
        }
    }

    /// `None` when the angle is unknown: the region abstains rather than fails.
    pub fn evaluate(&self, angle: Option<f32>) -> Option<ComponentVerdict> {
        let is_passing = self.passes(angle?);
        Some(ComponentVerdict {
            kind: self.kind,
            is_passing,
            defect_message: (!is_passing).then(|| self.kind.defect_message()),
        })
    }
}

/// The verdicts of every region that produced one this frame, in
/// Neck, Shoulders, Spine order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdicts(Vec<ComponentVerdict>);

impl Verdicts {
    pub fn collect(
        evaluators: &[ComponentEvaluator; 3],
        angles: [Option<f32>; 3],
    ) -> Self {
        Self(
            evaluators
                .iter()
                .zip(angles)
                .filter_map(|(evaluator, angle)| evaluator.evaluate(angle))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `None` with no verdicts; otherwise every present region must pass.
    pub fn all_passing(&self) -> Option<bool> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.iter().all(|v| v.is_passing))
    }

    pub fn defect_messages(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|v| v.defect_message)
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neck_threshold() {
        let neck = ComponentEvaluator::new(ComponentKind::Neck, 30.0);

        let pass = neck.evaluate(Some(65.0)).unwrap();
        assert!(pass.is_passing);
        assert_eq!(pass.defect_message, None);

        let fail = neck.evaluate(Some(55.0)).unwrap();
        assert!(!fail.is_passing);
        assert_eq!(fail.defect_message, Some("Keep head straight"));

        // Boundary is strict
        assert!(!neck.passes(60.0));
    }

    #[test]
    fn test_shoulder_alignment_is_symmetric() {
        let shoulders = ComponentEvaluator::new(ComponentKind::Shoulders, 10.0);
        assert!(shoulders.passes(175.0));
        assert!(shoulders.passes(185.0));
        assert!(!shoulders.passes(170.0));

        let fail = shoulders.evaluate(Some(160.0)).unwrap();
        assert_eq!(fail.defect_message, Some("Level your shoulders"));
    }

    #[test]
    fn test_spine_threshold() {
        let spine = ComponentEvaluator::new(ComponentKind::Spine, 15.0);
        assert!(spine.passes(170.0));
        assert!(!spine.passes(165.0));
        assert_eq!(
            spine.evaluate(Some(150.0)).unwrap().defect_message,
            Some("Straighten your back")
        );
    }

    #[test]
    fn test_missing_angle_abstains() {
        for kind in ComponentKind::ALL {
            let evaluator = ComponentEvaluator::new(kind, 10.0);
            assert_eq!(evaluator.evaluate(None), None);
        }
    }

    #[test]
    fn test_from_thresholds() {
        let thresholds = ThresholdConfig {
            neck_angle_threshold: 20.0,
            shoulder_alignment_threshold: 5.0,
            spine_curvature_threshold: 12.0,
        };
        assert_eq!(ComponentEvaluator::from_thresholds(ComponentKind::Neck, &thresholds).threshold, 20.0);
        assert_eq!(ComponentEvaluator::from_thresholds(ComponentKind::Shoulders, &thresholds).threshold, 5.0);
        assert_eq!(ComponentEvaluator::from_thresholds(ComponentKind::Spine, &thresholds).threshold, 12.0);
    }

    #[test]
    fn test_verdicts_aggregate() {
        let thresholds = ThresholdConfig::default();
        let evaluators = ComponentKind::ALL.map(|k| ComponentEvaluator::from_thresholds(k, &thresholds));

        let none = Verdicts::collect(&evaluators, [None, None, None]);
        assert!(none.is_empty());
        assert_eq!(none.all_passing(), None);

        // Shoulders abstain, neck passes, spine fails
        let mixed = Verdicts::collect(&evaluators, [Some(80.0), None, Some(140.0)]);
        assert_eq!(mixed.len(), 2);
        assert_eq!(mixed.all_passing(), Some(false));
        assert_eq!(mixed.defect_messages(), vec!["Straighten your back".to_string()]);

        let all_bad = Verdicts::collect(&evaluators, [Some(40.0), Some(150.0), Some(140.0)]);
        assert_eq!(
            all_bad.defect_messages(),
            vec!["Keep head straight", "Level your shoulders", "Straighten your back"]
        );
    }
}
