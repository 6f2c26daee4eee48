//! Hand landmark to placement estimation for virtual try-on.
//!
//! Per video frame, a detection backend hands over raw, image-normalized
//! hand keypoints; the estimator turns them into a render-space transform
//! (position, rotation, scale) for an object anchored to a finger segment,
//! plus handedness and palm-orientation classifications. Detection backends
//! are pluggable; everything here is pure geometry with no per-frame state.

pub mod body;
pub mod detector;
pub mod error;
pub mod estimator;
pub mod hand;
pub mod session;

pub use error::Error;
