// src/main.rs
use anyhow::Result;
use tracing::info;

use ring_tryon::detector::{HandSource, ReplaySource, SyntheticHandSource};
use ring_tryon::hand::{Finger, Handedness};
use ring_tryon::session::{SessionConfig, SessionRecorder, TryOnSession};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Optional args: a recorded landmark file to replay instead of the
    // synthetic detector, and a finger selector index (0 = thumb .. 4 = pinky).
    let mut args = std::env::args().skip(1);
    let replay_path = args.next();
    let finger = args
        .next()
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(Finger::from_selector)
        .unwrap_or(Finger::Ring);

    let mut config = SessionConfig {
        preferred_hand: Handedness::Right,
        ..Default::default()
    };
    config.estimator.finger = finger;

    let (source, total_frames): (Box<dyn HandSource>, usize) = match &replay_path {
        Some(path) => {
            let replay = ReplaySource::from_file(path)?;
            let frames = replay.len();
            (Box::new(replay), frames)
        }
        None => (
            Box::new(SyntheticHandSource::new().with_handedness("Right", 0.95)),
            300,
        ),
    };

    let mut session = TryOnSession::new(source, config);
    let mut recorder = SessionRecorder::new("./output", None);

    info!(
        source = session.source_name(),
        finger = finger.label(),
        frames = total_frames,
        "starting try-on session"
    );

    for _ in 0..total_frames {
        let update = session.step()?;

        if update.frame % 60 == 0 {
            match &update.placement {
                Some(placement) => info!(
                    frame = update.frame,
                    x = placement.position.x,
                    y = placement.position.y,
                    scale = placement.scale,
                    handedness = update.handedness.as_str(),
                    orientation = update
                        .orientation
                        .map(|o| o.as_str())
                        .unwrap_or("unknown"),
                    "placement"
                ),
                None => info!(frame = update.frame, "no placement this frame"),
            }
        }

        recorder.add_frame(&update);
    }

    let csv_path = recorder.export_csv()?;
    let report_path = recorder.generate_report()?;

    info!(
        frames = recorder.frame_count(),
        avg_fps = session.metrics().avg_fps,
        "session complete"
    );
    println!("Placement log: {}", csv_path.display());
    println!("Session report: {}", report_path.display());

    Ok(())
}
