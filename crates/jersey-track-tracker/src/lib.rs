//! Frame-to-frame tracking of jersey-number detections.
//!
//! [`TrackerState`] keeps one entry per player. Each frame's detections are
//! matched to existing entries greedily by IoU; unmatched entries survive a
//! grace period and the displayed number is smoothed by a majority vote over
//! the entry's recent readings.

mod history;
mod params;
mod tracker;

pub use history::{majority_vote, NumberHistory};
pub use params::TrackerParams;
pub use tracker::{TrackedPlayer, TrackerState};

pub use jersey_track_core::{Detection, NormalizedBox};
