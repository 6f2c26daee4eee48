// src/error.rs
use crate::hand::Finger;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("aspect ratio must be positive, got {0}")]
    InvalidAspectRatio(f64),

    #[error("required hand landmark {index} not detected for {finger:?}")]
    MissingLandmark { index: usize, finger: Finger },

    #[error("required body keypoint '{0}' not detected")]
    MissingBodyKeypoint(&'static str),
}

impl Error {
    /// Recoverable detection gaps: skip the frame and retry on the next tick.
    pub fn is_missing_landmarks(&self) -> bool {
        matches!(
            self,
            Error::MissingLandmark { .. } | Error::MissingBodyKeypoint(_)
        )
    }
}
