//! Offline replay of recorded detections through the tracker.
//!
//! Input is a JSON array of frames:
//!
//! ```json
//! [{ "width": 1280, "height": 720, "detections": [{ "bbox": [0.1, 0.2, 0.3, 0.5], "number": "7" }] }]
//! ```

use std::{fs, path::Path};

use jersey_track_core::Detection;
use jersey_track_tracker::{TrackedPlayer, TrackerParams, TrackerState};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One recorded frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Tracker output for one replayed frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub frame: usize,
    pub players: Vec<TrackedPlayer>,
}

pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<ReplayFrame>, ReplayError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_steps(steps: &[ReplayStep], path: impl AsRef<Path>) -> Result<(), ReplayError> {
    let json = serde_json::to_string_pretty(steps)?;
    fs::write(path, json)?;
    Ok(())
}

/// Feed `frames` through a fresh tracker in order.
///
/// Detections whose box is degenerate after clamping are skipped.
pub fn replay(frames: Vec<ReplayFrame>, params: &TrackerParams) -> Vec<ReplayStep> {
    let mut tracker = TrackerState::new(params.clone());
    let mut skipped = 0usize;

    let steps = frames
        .into_iter()
        .enumerate()
        .map(|(frame, recorded)| {
            let detections: Vec<Detection> = recorded
                .detections
                .into_iter()
                .filter_map(|det| match det.bbox.validated() {
                    Some(bbox) => Some(Detection { bbox, ..det }),
                    None => {
                        skipped += 1;
                        None
                    }
                })
                .collect();
            let players = tracker.update(detections, recorded.width, recorded.height);
            ReplayStep { frame, players }
        })
        .collect();

    if skipped > 0 {
        log::warn!("replay skipped {skipped} degenerate detections");
    }
    steps
}
