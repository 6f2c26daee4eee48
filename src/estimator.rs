// src/estimator.rs - Landmark-to-pose conversion for finger-anchored objects
use nalgebra::Vector3;
use std::f64::consts::FRAC_PI_2;

use crate::error::Error;
use crate::hand::{self, Finger, Hand, Handedness, Keypoint};

/// Dominant-axis cutoff for palm orientation classification.
const AXIS_THRESHOLD: f64 = 0.7;

/// Estimation options. `scale_factor` is a rendering calibration tied to the
/// target asset; sensible values fall in 0.2..=1.2. The default matches the
/// torus ring asset this was tuned against.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub finger: Finger,
    pub video_width: f64,
    pub video_height: f64,
    pub scale_factor: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            finger: Finger::Ring,
            video_width: 640.0,
            video_height: 480.0,
            scale_factor: 0.23,
        }
    }
}

impl EstimatorConfig {
    pub fn aspect_ratio(&self) -> f64 {
        self.video_width / self.video_height
    }
}

/// Convert an image-normalized point (origin top-left, Y down) into render
/// space: origin at the frame center, Y up, X spanning
/// [-aspect_ratio, aspect_ratio].
pub fn to_render_space(x: f64, y: f64, z: f64, aspect_ratio: f64) -> Result<Vector3<f64>, Error> {
    if !(aspect_ratio > 0.0) {
        return Err(Error::InvalidAspectRatio(aspect_ratio));
    }
    Ok(Vector3::new(
        (x * 2.0 - 1.0) * aspect_ratio,
        -(y * 2.0 - 1.0),
        z,
    ))
}

/// The four landmarks of one finger, resolved from a detection.
#[derive(Debug, Clone, Copy)]
pub struct FingerChain<'a> {
    pub base: &'a Keypoint,
    pub mid: &'a Keypoint,
    pub distal: &'a Keypoint,
    pub tip: &'a Keypoint,
}

/// Look up the finger's landmark chain by keypoint index. Partial detections
/// (occluded or dropped points) surface as a recoverable error.
pub fn resolve_finger_chain(hand: &Hand, finger: Finger) -> Result<FingerChain<'_>, Error> {
    let [base, mid, distal, tip] = finger.chain();
    let lookup = |index: usize| {
        hand.keypoint(index)
            .ok_or(Error::MissingLandmark { index, finger })
    };
    Ok(FingerChain {
        base: lookup(base)?,
        mid: lookup(mid)?,
        distal: lookup(distal)?,
        tip: lookup(tip)?,
    })
}

/// Placement transform for a finger-anchored object, in render space.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: Vector3<f64>,
    /// Euler angles in radians.
    pub rotation: Vector3<f64>,
    pub scale: f64,
    pub finger: Finger,
}

/// Derive position, rotation and scale for an object worn on `finger`.
///
/// The object is anchored at the midpoint of the proximal segment (between
/// base and first knuckle) so a ring sits on the knuckle segment rather than
/// floating at the fingertip. Scale follows the apparent segment length, so
/// the object grows and shrinks as the hand moves toward or away from the
/// camera.
pub fn compute_placement(
    hand: &Hand,
    finger: Finger,
    aspect_ratio: f64,
    scale_factor: f64,
) -> Result<Placement, Error> {
    let chain = resolve_finger_chain(hand, finger)?;

    let base = to_render_space(chain.base.x, chain.base.y, chain.base.z, aspect_ratio)?;
    let mid = to_render_space(chain.mid.x, chain.mid.y, chain.mid.z, aspect_ratio)?;
    let tip = to_render_space(chain.tip.x, chain.tip.y, chain.tip.z, aspect_ratio)?;

    let position = (mid + base) * 0.5;

    let direction = tip - base;
    let rot_z = direction.y.atan2(direction.x);
    let rot_y = direction
        .z
        .atan2((direction.x * direction.x + direction.y * direction.y).sqrt());
    // Ring plane stays perpendicular to the finger axis.
    let rot_x = FRAC_PI_2;

    let scale = (mid - base).norm() * scale_factor;

    Ok(Placement {
        position,
        rotation: Vector3::new(rot_x, rot_y, rot_z),
        scale,
        finger,
    })
}

/// Classify which hand was detected.
///
/// A handedness label from the detection backend always wins. Without one,
/// the 2D cross product of wrist->pinky-base and wrist->thumb-tip decides:
/// positive means the thumb sits to the right of the pinky (a left hand).
/// The geometric fallback is approximate and assumes an upright hand with
/// the palm facing the camera.
pub fn determine_handedness(hand: &Hand) -> Handedness {
    if let Some(label) = &hand.handedness {
        return Handedness::from_label(&label.label);
    }

    let (Some(wrist), Some(thumb_tip), Some(pinky_base)) = (
        hand.keypoint(hand::WRIST),
        hand.keypoint(hand::THUMB_TIP),
        hand.keypoint(hand::PINKY_MCP),
    ) else {
        return Handedness::Unknown;
    };

    let wrist_to_pinky = (pinky_base.x - wrist.x, pinky_base.y - wrist.y);
    let wrist_to_thumb = (thumb_tip.x - wrist.x, thumb_tip.y - wrist.y);

    let cross = wrist_to_pinky.0 * wrist_to_thumb.1 - wrist_to_pinky.1 * wrist_to_thumb.0;
    if cross > 0.0 {
        Handedness::Left
    } else {
        Handedness::Right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalmOrientation {
    PalmUp,
    PalmDown,
    PalmForward,
    PalmBackward,
    PalmLeft,
    PalmRight,
    PalmAngled,
}

impl PalmOrientation {
    pub fn as_str(self) -> &'static str {
        match self {
            PalmOrientation::PalmUp => "palm_up",
            PalmOrientation::PalmDown => "palm_down",
            PalmOrientation::PalmForward => "palm_forward",
            PalmOrientation::PalmBackward => "palm_backward",
            PalmOrientation::PalmLeft => "palm_left",
            PalmOrientation::PalmRight => "palm_right",
            PalmOrientation::PalmAngled => "palm_angled",
        }
    }
}

/// Classify palm orientation from the palm-plane normal.
///
/// The normal is the cross product of wrist->middle-base and
/// wrist->pinky-base. Returns None when any of the three landmarks is
/// missing or the points are collinear. The z sign convention (+z normal =
/// palm down) is calibrated for a right hand; see the reference-pose test.
pub fn hand_orientation(hand: &Hand) -> Option<PalmOrientation> {
    let wrist = hand.keypoint(hand::WRIST)?;
    let middle_base = hand.keypoint(hand::MIDDLE_MCP)?;
    let pinky_base = hand.keypoint(hand::PINKY_MCP)?;

    let wrist_to_middle = Vector3::new(
        middle_base.x - wrist.x,
        middle_base.y - wrist.y,
        middle_base.z - wrist.z,
    );
    let wrist_to_pinky = Vector3::new(
        pinky_base.x - wrist.x,
        pinky_base.y - wrist.y,
        pinky_base.z - wrist.z,
    );

    let normal = wrist_to_middle.cross(&wrist_to_pinky);
    let length = normal.norm();
    if length == 0.0 {
        return None;
    }
    let normal = normal / length;

    Some(if normal.z.abs() > AXIS_THRESHOLD {
        if normal.z > 0.0 {
            PalmOrientation::PalmDown
        } else {
            PalmOrientation::PalmUp
        }
    } else if normal.y.abs() > AXIS_THRESHOLD {
        if normal.y > 0.0 {
            PalmOrientation::PalmForward
        } else {
            PalmOrientation::PalmBackward
        }
    } else if normal.x.abs() > AXIS_THRESHOLD {
        if normal.x > 0.0 {
            PalmOrientation::PalmRight
        } else {
            PalmOrientation::PalmLeft
        }
    } else {
        PalmOrientation::PalmAngled
    })
}
