// src/detector.rs - Pluggable hand landmark sources
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::hand::{Hand, HandednessLabel, Keypoint, NUM_LANDMARKS};

/// A detection backend. Each tick yields zero or more hands in the shared
/// `Hand` shape; the estimator does not care whether they came from a live
/// ML detector, a recording, or a synthetic generator.
pub trait HandSource {
    fn next_frame(&mut self) -> Result<Vec<Hand>>;
    fn describe(&self) -> &str;
}

/// Palm-relative landmark template [x offset, y offset, z] for an upright
/// right hand, thumb on the image-left side. Indices follow the MediaPipe
/// landmark order (wrist first, then four points per finger).
const HAND_TEMPLATE: [(f64, f64, f64); NUM_LANDMARKS] = [
    (0.0, 0.18, 0.0),      // wrist
    (-0.08, 0.10, 0.0),    // thumb cmc
    (-0.12, 0.04, -0.005), // thumb mcp
    (-0.15, -0.02, -0.01), // thumb ip
    (-0.17, -0.07, -0.02), // thumb tip
    (-0.06, -0.02, 0.0),   // index mcp
    (-0.07, -0.09, -0.005),
    (-0.08, -0.14, -0.01),
    (-0.08, -0.18, -0.02), // index tip
    (-0.01, -0.03, 0.0),   // middle mcp
    (-0.01, -0.11, -0.005),
    (-0.01, -0.16, -0.01),
    (-0.01, -0.21, -0.02), // middle tip
    (0.04, -0.02, 0.0),    // ring mcp
    (0.05, -0.09, -0.005),
    (0.05, -0.14, -0.01),
    (0.05, -0.18, -0.02),  // ring tip
    (0.09, 0.00, 0.0),     // pinky mcp
    (0.11, -0.05, -0.005),
    (0.12, -0.09, -0.01),
    (0.13, -0.13, -0.02),  // pinky tip
];

/// Deterministic stand-in for a real detector: one full 21-point hand whose
/// palm drifts sinusoidally across the frame. Useful for demos and for
/// driving the session loop in tests without any camera.
pub struct SyntheticHandSource {
    sim_time: f64,
    handedness: Option<HandednessLabel>,
}

impl SyntheticHandSource {
    pub fn new() -> Self {
        Self {
            sim_time: 0.0,
            handedness: None,
        }
    }

    pub fn with_handedness(mut self, label: &str, score: f64) -> Self {
        self.handedness = Some(HandednessLabel {
            label: label.to_string(),
            score,
        });
        self
    }
}

impl Default for SyntheticHandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HandSource for SyntheticHandSource {
    fn next_frame(&mut self) -> Result<Vec<Hand>> {
        let t = self.sim_time;
        self.sim_time += 0.033;

        let center_x = 0.5 + 0.08 * (t * 0.5).cos();
        let center_y = 0.5 + 0.05 * t.sin();

        let keypoints = HAND_TEMPLATE
            .iter()
            .enumerate()
            .map(|(index, &(dx, dy, z))| {
                Keypoint::new(index, center_x + dx, center_y + dy, z)
            })
            .collect();

        let mut hand = Hand::new(keypoints);
        hand.handedness = self.handedness.clone();
        hand.score = Some(0.95);
        Ok(vec![hand])
    }

    fn describe(&self) -> &str {
        "synthetic"
    }
}

/// Replays per-frame hand lists recorded to JSON, in place of a live
/// detector. After the last frame it keeps reporting zero hands, the same as
/// a detector that lost track.
pub struct ReplaySource {
    frames: Vec<Vec<Hand>>,
    cursor: usize,
    label: String,
}

impl ReplaySource {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark recording {}", path.display()))?;
        let frames: Vec<Vec<Hand>> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse landmark recording {}", path.display()))?;
        debug!(frames = frames.len(), path = %path.display(), "loaded landmark recording");
        Ok(Self {
            frames,
            cursor: 0,
            label: path.display().to_string(),
        })
    }

    pub fn from_frames(frames: Vec<Vec<Hand>>) -> Self {
        Self {
            frames,
            cursor: 0,
            label: "in-memory".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl HandSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Vec<Hand>> {
        let frame = self.frames.get(self.cursor).cloned().unwrap_or_default();
        if self.cursor < self.frames.len() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn describe(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{compute_placement, determine_handedness};
    use crate::hand::{Finger, Handedness};

    #[test]
    fn synthetic_emits_full_hand_in_frame() {
        let mut source = SyntheticHandSource::new();
        for _ in 0..100 {
            let hands = source.next_frame().unwrap();
            assert_eq!(hands.len(), 1);
            let hand = &hands[0];
            assert_eq!(hand.keypoints.len(), NUM_LANDMARKS);
            for kp in &hand.keypoints {
                assert!((0.0..=1.0).contains(&kp.x), "x out of frame: {}", kp.x);
                assert!((0.0..=1.0).contains(&kp.y), "y out of frame: {}", kp.y);
            }
        }
    }

    #[test]
    fn synthetic_hand_is_estimable() {
        let mut source = SyntheticHandSource::new();
        let hands = source.next_frame().unwrap();
        let placement = compute_placement(&hands[0], Finger::Ring, 1.333, 0.23).unwrap();
        assert!(placement.scale > 0.0);
        // Thumb-left template reads as a right hand.
        assert_eq!(determine_handedness(&hands[0]), Handedness::Right);
    }

    #[test]
    fn synthetic_is_deterministic() {
        let mut a = SyntheticHandSource::new();
        let mut b = SyntheticHandSource::new();
        for _ in 0..10 {
            assert_eq!(a.next_frame().unwrap(), b.next_frame().unwrap());
        }
    }

    #[test]
    fn replay_round_trips_recorded_frames() {
        let json = r#"[
            [{"keypoints":[{"index":0,"x":0.5,"y":0.6}],
              "handedness":{"label":"Right","score":0.9}}],
            []
        ]"#;
        let frames: Vec<Vec<Hand>> = serde_json::from_str(json).unwrap();
        let mut source = ReplaySource::from_frames(frames);
        assert_eq!(source.len(), 2);

        let first = source.next_frame().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].keypoints[0].z, 0.0);
        assert_eq!(first[0].handedness.as_ref().unwrap().label, "Right");

        assert!(source.next_frame().unwrap().is_empty());
        // Exhausted recordings keep reporting zero hands.
        assert!(source.next_frame().unwrap().is_empty());
    }
}
