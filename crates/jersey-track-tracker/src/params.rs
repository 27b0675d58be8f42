use serde::{Deserialize, Serialize};

/// Tracker tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// A detection continues an entry only when their IoU is strictly above this.
    pub match_iou: f32,
    /// Entries are dropped once they go unmatched this many frames in a row.
    pub grace_frames: u32,
    /// Readings kept per entry for the majority vote.
    pub history_capacity: usize,
    /// Minimum count the winning number needs; below it the latest reading is shown.
    pub min_votes: usize,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            match_iou: 0.12,
            grace_frames: 20,
            history_capacity: 10,
            min_votes: 1,
        }
    }
}
