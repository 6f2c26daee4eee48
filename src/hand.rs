// src/hand.rs - Hand landmark data model (MediaPipe hand landmark convention)
use serde::{Deserialize, Serialize};

// MediaPipe hand landmark indices
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const NUM_LANDMARKS: usize = 21;

/// One detected landmark. `x`/`y` are image-normalized to [0,1] with the
/// origin at the top-left; `z` is a depth estimate relative to the wrist and
/// defaults to 0 for detectors that only produce 2D points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    #[serde(default)]
    pub index: usize,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Keypoint {
    pub fn new(index: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            index,
            x,
            y,
            z,
            name: None,
            score: None,
        }
    }

    pub fn named(name: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            index: 0,
            x,
            y,
            z,
            name: Some(name.to_string()),
            score: None,
        }
    }
}

/// Handedness as reported by the detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandednessLabel {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "left" => Handedness::Left,
            "right" => Handedness::Right,
            _ => Handedness::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

/// Target finger for ring placement. Each finger maps to a fixed chain of
/// four landmarks: base joint, proximal joint, distal joint, tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Landmark indices as [base, mid, distal, tip].
    pub fn chain(self) -> [usize; 4] {
        match self {
            Finger::Thumb => [THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP],
            Finger::Index => [INDEX_MCP, INDEX_PIP, INDEX_DIP, INDEX_TIP],
            Finger::Middle => [MIDDLE_MCP, MIDDLE_PIP, MIDDLE_DIP, MIDDLE_TIP],
            Finger::Ring => [RING_MCP, RING_PIP, RING_DIP, RING_TIP],
            Finger::Pinky => [PINKY_MCP, PINKY_PIP, PINKY_DIP, PINKY_TIP],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }

    /// Selector index as used by the UI picker (0 = thumb .. 4 = pinky).
    pub fn from_selector(index: usize) -> Option<Self> {
        match index {
            0 => Some(Finger::Thumb),
            1 => Some(Finger::Index),
            2 => Some(Finger::Middle),
            3 => Some(Finger::Ring),
            4 => Some(Finger::Pinky),
            _ => None,
        }
    }
}

/// One detected hand instance. Keypoints are looked up by their `index`
/// field; the vector order carries no meaning and partial detections are
/// allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<HandednessLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Hand {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            handedness: None,
            score: None,
        }
    }

    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.index == index)
    }

    /// Mean x/y over all keypoints, or None for an empty detection.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.keypoints.is_empty() {
            return None;
        }
        let n = self.keypoints.len() as f64;
        let sum_x: f64 = self.keypoints.iter().map(|kp| kp.x).sum();
        let sum_y: f64 = self.keypoints.iter().map(|kp| kp.y).sum();
        Some((sum_x / n, sum_y / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finger_chains_match_landmark_table() {
        assert_eq!(Finger::Thumb.chain(), [1, 2, 3, 4]);
        assert_eq!(Finger::Index.chain(), [5, 6, 7, 8]);
        assert_eq!(Finger::Middle.chain(), [9, 10, 11, 12]);
        assert_eq!(Finger::Ring.chain(), [13, 14, 15, 16]);
        assert_eq!(Finger::Pinky.chain(), [17, 18, 19, 20]);
    }

    #[test]
    fn keypoint_lookup_ignores_vector_order() {
        let hand = Hand::new(vec![
            Keypoint::new(RING_PIP, 0.4, 0.4, 0.0),
            Keypoint::new(WRIST, 0.5, 0.6, 0.0),
        ]);
        assert_eq!(hand.keypoint(WRIST).unwrap().y, 0.6);
        assert_eq!(hand.keypoint(RING_PIP).unwrap().x, 0.4);
        assert!(hand.keypoint(THUMB_TIP).is_none());
    }

    #[test]
    fn center_is_keypoint_mean() {
        let hand = Hand::new(vec![
            Keypoint::new(0, 0.25, 0.5, 0.0),
            Keypoint::new(1, 0.75, 0.25, 0.0),
        ]);
        assert_eq!(hand.center(), Some((0.5, 0.375)));
        assert_eq!(Hand::default().center(), None);
    }

    #[test]
    fn handedness_label_parsing_is_case_insensitive() {
        assert_eq!(Handedness::from_label("Left"), Handedness::Left);
        assert_eq!(Handedness::from_label("RIGHT"), Handedness::Right);
        assert_eq!(Handedness::from_label("both"), Handedness::Unknown);
    }

    #[test]
    fn selector_indices_cover_all_fingers() {
        assert_eq!(Finger::from_selector(0), Some(Finger::Thumb));
        assert_eq!(Finger::from_selector(3), Some(Finger::Ring));
        assert_eq!(Finger::from_selector(5), None);
    }
}
