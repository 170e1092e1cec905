use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One detected body joint in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The 33 pose landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const COUNT: usize = 33;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|joint| joint.name() == name)
    }
}

/// Named joints detected in one frame. A joint that is not in the set is
/// missing, never at the origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointSet {
    points: HashMap<Joint, Landmark>,
}

impl KeypointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from index-ordered detector output. Landmarks below
    /// `min_visibility` or with non-finite coordinates are left out.
    pub fn from_landmarks(landmarks: &[Landmark], min_visibility: f32) -> Self {
        let points = landmarks
            .iter()
            .enumerate()
            .filter_map(|(i, lm)| Joint::from_index(i).map(|joint| (joint, *lm)))
            .filter(|(_, lm)| lm.is_finite() && lm.visibility >= min_visibility)
            .collect();

        Self { points }
    }

    pub fn with(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.insert(joint, landmark);
        self
    }

    /// A landmark with non-finite coordinates is not stored, so the joint
    /// reads as missing.
    pub fn insert(&mut self, joint: Joint, landmark: Landmark) {
        if landmark.is_finite() {
            self.points.insert(joint, landmark);
        } else {
            self.points.remove(&joint);
        }
    }

    pub fn get(&self, joint: Joint) -> Option<&Landmark> {
        self.points.get(&joint)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Serialize for KeypointSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let named: std::collections::BTreeMap<&str, &Landmark> = self
            .points
            .iter()
            .map(|(joint, lm)| (joint.name(), lm))
            .collect();
        named.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeypointSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Landmark>::deserialize(deserializer)?;
        let points = raw
            .into_iter()
            .filter(|(_, lm)| lm.is_finite())
            .filter_map(|(name, lm)| Joint::from_name(&name).map(|joint| (joint, lm)))
            .collect();
        Ok(Self { points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index_roundtrip() {
        assert_eq!(Joint::from_index(0), Some(Joint::Nose));
        assert_eq!(Joint::from_index(11), Some(Joint::LeftShoulder));
        assert_eq!(Joint::from_index(12), Some(Joint::RightShoulder));
        assert_eq!(Joint::from_index(23), Some(Joint::LeftHip));
        assert_eq!(Joint::from_index(25), Some(Joint::LeftKnee));
        assert_eq!(Joint::from_index(33), None);
        assert_eq!(Joint::RightFootIndex.index(), 32);
    }

    #[test]
    fn test_joint_names() {
        assert_eq!(Joint::from_name("left_shoulder"), Some(Joint::LeftShoulder));
        assert_eq!(Joint::LeftFootIndex.name(), "left_foot_index");
        assert_eq!(Joint::from_name("tail"), None);
    }

    #[test]
    fn test_from_landmarks_drops_low_visibility() {
        let mut raw = vec![Landmark::new(0.5, 0.5); 13];
        raw[11].visibility = 0.2;
        raw[12].y = f32::NAN;

        let set = KeypointSet::from_landmarks(&raw, 0.5);

        assert_eq!(set.len(), 11);
        assert!(set.get(Joint::Nose).is_some());
        assert!(set.get(Joint::LeftShoulder).is_none());
        assert!(set.get(Joint::RightShoulder).is_none());
        assert!(set.get(Joint::LeftHip).is_none());
    }

    #[test]
    fn test_deserialize_drops_overflowing_coordinates() {
        // 1e39 is out of f32 range and parses as infinity
        let json = r#"{
            "left_hip": {"x": 0.5, "y": 0.7},
            "left_knee": {"x": 1e39, "y": 0.9}
        }"#;

        let set: KeypointSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.len(), 1);
        assert!(set.get(Joint::LeftKnee).is_none());
    }

    #[test]
    fn test_insert_non_finite_clears_joint() {
        let set = KeypointSet::new()
            .with(Joint::Nose, Landmark::new(0.5, 0.1))
            .with(Joint::Nose, Landmark::new(f32::NAN, 0.1));
        assert!(set.get(Joint::Nose).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn test_serialize_uses_joint_names() {
        let set = KeypointSet::new()
            .with(Joint::Nose, Landmark::new(0.5, 0.1))
            .with(Joint::LeftKnee, Landmark::new(0.4, 0.9));

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["nose"]["x"], 0.5);
        assert_eq!(json["left_knee"]["visibility"], 1.0);

        let back: KeypointSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_deserialize_ignores_unknown_keys() {
        let json = r#"{
            "nose": {"x": 0.5, "y": 0.2},
            "left_shoulder": {"x": 0.4, "y": 0.5, "z": -0.1, "visibility": 0.9},
            "halo": {"x": 0.0, "y": 0.0}
        }"#;

        let set: KeypointSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(Joint::Nose).unwrap().visibility, 1.0);
        assert_eq!(set.get(Joint::LeftShoulder).unwrap().visibility, 0.9);
    }
}
