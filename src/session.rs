// src/session.rs - Per-frame try-on loop and session recording
use anyhow::Result;
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

use crate::detector::HandSource;
use crate::estimator::{self, EstimatorConfig, PalmOrientation, Placement};
use crate::hand::{Hand, Handedness};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub estimator: EstimatorConfig,
    pub preferred_hand: Handedness,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            preferred_hand: Handedness::Left,
        }
    }
}

/// Everything the renderer needs from one detection tick. `placement` is
/// None whenever this frame produced no usable finger chain; the caller
/// keeps the previous transform (or draws nothing) and retries next tick.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    pub frame: u32,
    pub timestamp: f64,
    pub hands_detected: usize,
    /// Mean x/y of the selected hand's keypoints, image-normalized.
    pub center: Option<(f64, f64)>,
    pub placement: Option<Placement>,
    pub handedness: Handedness,
    pub orientation: Option<PalmOrientation>,
}

#[derive(Clone)]
pub struct PerformanceMetrics {
    pub avg_fps: f32,
    pub avg_processing_time: f32,
    frame_times: VecDeque<f32>,
}

impl PerformanceMetrics {
    fn new() -> Self {
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            frame_times: VecDeque::with_capacity(30),
        }
    }

    fn record(&mut self, elapsed: f32) {
        self.frame_times.push_front(elapsed);
        if self.frame_times.len() > 30 {
            self.frame_times.pop_back();
        }
        self.avg_processing_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if self.avg_processing_time > 0.0 {
            self.avg_fps = 1.0 / self.avg_processing_time;
        }
    }
}

/// Pick the hand to dress from a frame's detections: the first hand whose
/// classified handedness matches the preference, falling back to the first
/// detection.
pub fn select_hand<'a>(hands: &'a [Hand], preferred: Handedness) -> Option<&'a Hand> {
    if preferred != Handedness::Unknown {
        if let Some(hand) = hands
            .iter()
            .find(|h| estimator::determine_handedness(h) == preferred)
        {
            return Some(hand);
        }
    }
    hands.first()
}

/// Drives one detection backend at the caller's frame cadence. Holds no
/// geometry state between ticks; every `step` re-estimates from that frame's
/// detections alone.
pub struct TryOnSession {
    source: Box<dyn HandSource>,
    config: SessionConfig,
    frame_counter: u32,
    timestamp: f64,
    metrics: PerformanceMetrics,
}

impl TryOnSession {
    pub fn new(source: Box<dyn HandSource>, config: SessionConfig) -> Self {
        Self {
            source,
            config,
            frame_counter: 0,
            timestamp: 0.0,
            metrics: PerformanceMetrics::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source_name(&self) -> &str {
        self.source.describe()
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// One detection tick: pull a frame of hands from the source and derive
    /// the placement and classifications. Frame-local estimation failures
    /// (missing landmarks, bad config) are logged and reported as "no
    /// placement"; only source failures abort.
    pub fn step(&mut self) -> Result<FrameUpdate> {
        let start = Instant::now();

        let hands = self.source.next_frame()?;
        let frame = self.frame_counter;
        self.frame_counter += 1;
        let timestamp = self.timestamp;
        self.timestamp += 0.033;

        let mut update = FrameUpdate {
            frame,
            timestamp,
            hands_detected: hands.len(),
            center: None,
            placement: None,
            handedness: Handedness::Unknown,
            orientation: None,
        };

        if let Some(hand) = select_hand(&hands, self.config.preferred_hand) {
            update.center = hand.center();
            update.handedness = estimator::determine_handedness(hand);
            update.orientation = estimator::hand_orientation(hand);
            update.placement = match estimator::compute_placement(
                hand,
                self.config.estimator.finger,
                self.config.estimator.aspect_ratio(),
                self.config.estimator.scale_factor,
            ) {
                Ok(placement) => Some(placement),
                Err(e) if e.is_missing_landmarks() => {
                    debug!(frame, "no placement this frame: {e}");
                    None
                }
                Err(e) => {
                    warn!(frame, "estimation failed: {e}");
                    None
                }
            };
        } else {
            debug!(frame, "no hand detected");
        }

        self.metrics.record(start.elapsed().as_secs_f32());
        Ok(update)
    }
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: u32,
    timestamp: f64,
    hands_detected: usize,
    center_x: Option<f64>,
    center_y: Option<f64>,
    handedness: String,
    orientation: Option<String>,
    finger: Option<String>,
    position_x: Option<f64>,
    position_y: Option<f64>,
    position_z: Option<f64>,
    rotation_x: Option<f64>,
    rotation_y: Option<f64>,
    rotation_z: Option<f64>,
    scale: Option<f64>,
}

impl FrameRecord {
    fn from_update(update: &FrameUpdate) -> Self {
        let mut record = Self {
            frame: update.frame,
            timestamp: update.timestamp,
            hands_detected: update.hands_detected,
            center_x: update.center.map(|c| c.0),
            center_y: update.center.map(|c| c.1),
            handedness: update.handedness.as_str().to_string(),
            orientation: update.orientation.map(|o| o.as_str().to_string()),
            finger: None,
            position_x: None,
            position_y: None,
            position_z: None,
            rotation_x: None,
            rotation_y: None,
            rotation_z: None,
            scale: None,
        };

        if let Some(placement) = &update.placement {
            record.finger = Some(placement.finger.label().to_string());
            record.position_x = Some(placement.position.x);
            record.position_y = Some(placement.position.y);
            record.position_z = Some(placement.position.z);
            record.rotation_x = Some(placement.rotation.x);
            record.rotation_y = Some(placement.rotation.y);
            record.rotation_z = Some(placement.rotation.z);
            record.scale = Some(placement.scale);
        }

        record
    }
}

/// Accumulates per-frame updates and writes them out at the end of a
/// session.
pub struct SessionRecorder {
    output_dir: PathBuf,
    session_name: String,
    records: Vec<FrameRecord>,
}

impl SessionRecorder {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let session_name = session_name
            .unwrap_or_else(|| format!("session_{}", Local::now().format("%Y%m%d_%H%M%S")));

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            records: Vec::new(),
        }
    }

    pub fn add_frame(&mut self, update: &FrameUpdate) {
        self.records.push(FrameRecord::from_update(update));
    }

    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self
            .output_dir
            .join(&self.session_name)
            .join("placements.csv");

        if let Some(parent) = csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(&csv_path)?;
        let mut writer = Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(csv_path)
    }

    pub fn generate_report(&self) -> Result<PathBuf> {
        let report_path = self
            .output_dir
            .join(&self.session_name)
            .join("report.html");

        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&report_path, self.create_html_report())?;
        Ok(report_path)
    }

    fn create_html_report(&self) -> String {
        let total_frames = self.records.len();
        let placed_frames = self.records.iter().filter(|r| r.scale.is_some()).count();
        let detected_frames = self
            .records
            .iter()
            .filter(|r| r.hands_detected > 0)
            .count();
        let placement_rate = if total_frames == 0 {
            0.0
        } else {
            placed_frames as f64 / total_frames as f64 * 100.0
        };

        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <title>Try-On Session Report - {}</title>
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 40px; background: #f5f5f5; }}
        h1 {{ color: #333; }}
        .stats {{ background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .stat-item {{ margin: 10px 0; }}
        .stat-label {{ font-weight: bold; color: #666; }}
        .stat-value {{ color: #4682EA; font-size: 1.2em; }}
    </style>
</head>
<body>
    <h1>Virtual Try-On Session Report</h1>
    <div class="stats">
        <h2>Session: {}</h2>
        <div class="stat-item">
            <span class="stat-label">Total Frames:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Frames With A Hand:</span>
            <span class="stat-value">{}</span>
        </div>
        <div class="stat-item">
            <span class="stat-label">Placement Rate:</span>
            <span class="stat-value">{:.1}%</span>
        </div>
    </div>
</body>
</html>
        "#,
            self.session_name, self.session_name, total_frames, detected_frames, placement_rate
        )
    }
}
