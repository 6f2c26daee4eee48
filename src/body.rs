// src/body.rs - Named body-pose keypoints and neck-anchored placement
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::estimator::to_render_space;
use crate::hand::Keypoint;

pub const NOSE: &str = "nose";
pub const LEFT_SHOULDER: &str = "left_shoulder";
pub const RIGHT_SHOULDER: &str = "right_shoulder";

/// The neck point sits 30% of the way from the shoulder midpoint toward the
/// nose.
const NECK_RATIO: f64 = 0.3;
/// Asset calibration: necklace size relative to apparent shoulder width.
const SHOULDER_SCALE: f64 = 1.2;

/// A body-pose detection. Unlike hand landmarks, pose keypoints are looked
/// up by their detector-assigned name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub keypoints: Vec<Keypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl BodyPose {
    pub fn keypoint_named(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name.as_deref() == Some(name))
    }
}

/// Placement for a neck-worn object. Scale is non-uniform to match the
/// renderer's per-axis transform, even though all three axes currently track
/// shoulder width.
#[derive(Debug, Clone, PartialEq)]
pub struct NecklacePlacement {
    pub position: Vector3<f64>,
    pub scale: Vector3<f64>,
}

pub fn compute_necklace_placement(
    pose: &BodyPose,
    aspect_ratio: f64,
) -> Result<NecklacePlacement, Error> {
    let nose = pose
        .keypoint_named(NOSE)
        .ok_or(Error::MissingBodyKeypoint(NOSE))?;
    let left_shoulder = pose
        .keypoint_named(LEFT_SHOULDER)
        .ok_or(Error::MissingBodyKeypoint(LEFT_SHOULDER))?;
    let right_shoulder = pose
        .keypoint_named(RIGHT_SHOULDER)
        .ok_or(Error::MissingBodyKeypoint(RIGHT_SHOULDER))?;

    let mid_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    let mid_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let mid_z = (left_shoulder.z + right_shoulder.z) / 2.0;

    let neck_x = mid_x + (nose.x - mid_x) * NECK_RATIO;
    let neck_y = mid_y + (nose.y - mid_y) * NECK_RATIO;
    let neck_z = mid_z + (nose.z - mid_z) * NECK_RATIO;

    let position = to_render_space(neck_x, neck_y, neck_z, aspect_ratio)?;

    let width = (right_shoulder.x - left_shoulder.x).abs() * SHOULDER_SCALE;
    Ok(NecklacePlacement {
        position,
        scale: Vector3::new(width, width, width),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn upright_pose() -> BodyPose {
        BodyPose {
            keypoints: vec![
                Keypoint::named(NOSE, 0.5, 0.2, 0.0),
                Keypoint::named(LEFT_SHOULDER, 0.4, 0.5, 0.0),
                Keypoint::named(RIGHT_SHOULDER, 0.6, 0.5, 0.0),
            ],
            score: Some(0.9),
        }
    }

    #[test]
    fn neck_point_interpolates_toward_nose() {
        let placement = compute_necklace_placement(&upright_pose(), 1.0).unwrap();
        // Shoulder midpoint (0.5, 0.5) pulled 30% toward the nose (0.5, 0.2)
        // gives (0.5, 0.41) in image space.
        let expected = to_render_space(0.5, 0.41, 0.0, 1.0).unwrap();
        assert_approx_eq!(placement.position.x, expected.x, 1e-12);
        assert_approx_eq!(placement.position.y, expected.y, 1e-12);
    }

    #[test]
    fn scale_follows_shoulder_width() {
        let placement = compute_necklace_placement(&upright_pose(), 1.0).unwrap();
        assert_approx_eq!(placement.scale.x, 0.2 * 1.2, 1e-12);
        assert_eq!(placement.scale.x, placement.scale.y);
        assert_eq!(placement.scale.x, placement.scale.z);
    }

    #[test]
    fn missing_shoulder_is_recoverable() {
        let mut pose = upright_pose();
        pose.keypoints
            .retain(|kp| kp.name.as_deref() != Some(LEFT_SHOULDER));
        let err = compute_necklace_placement(&pose, 1.0).unwrap_err();
        assert!(err.is_missing_landmarks());
    }
}
