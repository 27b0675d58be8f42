use jersey_track_core::{iou, Detection, NormalizedBox};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{NumberHistory, TrackerParams};

/// Snapshot of one tracked player, as handed to consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    /// Stable for the lifetime of the entry.
    pub id: Uuid,
    /// Pixel box `[l, t, r, b]` in the frame where the player was first seen.
    pub initial_box: [f32; 4],
    pub current_box: NormalizedBox,
    /// Majority-voted number over the recent readings.
    pub jersey_number: String,
    /// Consecutive frames without a matching detection.
    pub disappeared_frames: u32,
}

#[derive(Clone, Debug)]
struct Entry {
    player: TrackedPlayer,
    history: NumberHistory,
}

/// Owned tracker state. Entries keep insertion order, which fixes the order
/// in which they claim detections.
#[derive(Clone, Debug, Default)]
pub struct TrackerState {
    params: TrackerParams,
    entries: Vec<Entry>,
}

impl TrackerState {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            params,
            entries: Vec::new(),
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &TrackedPlayer> {
        self.entries.iter().map(|e| &e.player)
    }

    /// Forget every tracked player.
    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("tracker reset, dropping {} players", self.entries.len());
        }
        self.entries.clear();
    }

    /// Fold one frame's detections into the state and return every retained
    /// player.
    ///
    /// `frame_width`/`frame_height` only scale the initial box of newly
    /// created players.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, detections), fields(detections = detections.len()))
    )]
    pub fn update(
        &mut self,
        detections: Vec<Detection>,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<TrackedPlayer> {
        let mut pending: Vec<Option<Detection>> = detections.into_iter().map(Some).collect();
        let match_iou = self.params.match_iou;
        let min_votes = self.params.min_votes;

        for entry in &mut self.entries {
            let current = entry.player.current_box;
            let mut best: Option<(usize, f32)> = None;
            for (idx, det) in pending.iter().enumerate() {
                let Some(det) = det else { continue };
                let overlap = iou(&current, &det.bbox);
                if overlap > best.map_or(0.0, |(_, v)| v) {
                    best = Some((idx, overlap));
                }
            }

            let claimed = best
                .filter(|&(_, overlap)| overlap > match_iou)
                .and_then(|(idx, _)| pending[idx].take());

            match claimed {
                Some(det) => {
                    entry.history.push(det.number.as_str());
                    let number = match entry.history.vote() {
                        Some((winner, count)) if count >= min_votes => winner.to_string(),
                        _ => det.number,
                    };
                    let player = &mut entry.player;
                    player.current_box = det.bbox;
                    player.disappeared_frames = 0;
                    player.jersey_number = number;
                }
                None => entry.player.disappeared_frames += 1,
            }
        }

        let grace = self.params.grace_frames;
        let before = self.entries.len();
        // Matched entries were just reset to zero and never expire here.
        self.entries.retain(|e| {
            let missed = e.player.disappeared_frames;
            missed == 0 || missed < grace
        });
        let lost = before - self.entries.len();

        let mut spawned = 0usize;
        for det in pending.into_iter().flatten() {
            let player = TrackedPlayer {
                id: Uuid::new_v4(),
                initial_box: det.bbox.scaled(frame_width, frame_height),
                current_box: det.bbox,
                jersey_number: det.number.clone(),
                disappeared_frames: 0,
            };
            self.entries.push(Entry {
                player,
                history: NumberHistory::with_first(self.params.history_capacity, det.number),
            });
            spawned += 1;
        }

        if lost > 0 || spawned > 0 {
            log::debug!(
                "tracker: {} new, {} lost, {} tracked",
                spawned,
                lost,
                self.entries.len()
            );
        }

        self.players().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn det(l: f32, t: f32, r: f32, b: f32, number: &str) -> Detection {
        Detection::new(NormalizedBox::new(l, t, r, b), number)
    }

    #[test]
    fn single_detection_creates_player() {
        let mut tracker = TrackerState::default();
        let out = tracker.update(vec![det(0.1, 0.1, 0.3, 0.5, "12")], 200, 100);

        assert_eq!(out.len(), 1);
        let player = &out[0];
        assert_eq!(player.jersey_number, "12");
        assert_eq!(player.disappeared_frames, 0);
        assert_eq!(player.id.get_version_num(), 4);
        assert_relative_eq!(player.initial_box[0], 20.0, epsilon = 1e-4);
        assert_relative_eq!(player.initial_box[1], 10.0, epsilon = 1e-4);
        assert_relative_eq!(player.initial_box[2], 60.0, epsilon = 1e-4);
        assert_relative_eq!(player.initial_box[3], 50.0, epsilon = 1e-4);
    }

    #[test]
    fn overlapping_detection_continues_identity() {
        let mut tracker = TrackerState::default();
        let first = tracker.update(vec![det(0.1, 0.1, 0.3, 0.5, "12")], 100, 100);
        let second = tracker.update(vec![det(0.12, 0.1, 0.32, 0.5, "12")], 100, 100);

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].current_box, NormalizedBox::new(0.12, 0.1, 0.32, 0.5));
        // initial box sticks to the first sighting
        assert_eq!(second[0].initial_box, first[0].initial_box);
    }

    #[test]
    fn weak_overlap_spawns_new_player() {
        let mut tracker = TrackerState::default();
        tracker.update(vec![det(0.0, 0.0, 0.2, 0.2, "5")], 100, 100);
        // IoU ~0.03, under the 0.12 match threshold
        let out = tracker.update(vec![det(0.15, 0.15, 0.35, 0.35, "5")], 100, 100);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].disappeared_frames, 1);
        assert_eq!(out[1].disappeared_frames, 0);
    }

    #[test]
    fn grace_period_boundary() {
        let mut tracker = TrackerState::default();
        let first = tracker.update(vec![det(0.1, 0.1, 0.3, 0.5, "9")], 100, 100);

        for _ in 0..19 {
            tracker.update(Vec::new(), 100, 100);
        }
        let players: Vec<_> = tracker.players().collect();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].disappeared_frames, 19);
        assert_eq!(players[0].id, first[0].id);
        assert_eq!(players[0].current_box, NormalizedBox::new(0.1, 0.1, 0.3, 0.5));
        assert_eq!(players[0].jersey_number, "9");
        assert_eq!(players[0].initial_box, first[0].initial_box);

        let out = tracker.update(Vec::new(), 100, 100);
        assert!(out.is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn zero_grace_keeps_matched_players() {
        let mut tracker = TrackerState::new(TrackerParams {
            grace_frames: 0,
            ..TrackerParams::default()
        });
        let first = tracker.update(
            vec![det(0.1, 0.1, 0.3, 0.5, "9"), det(0.6, 0.1, 0.8, 0.5, "4")],
            100,
            100,
        );
        assert_eq!(first.len(), 2);

        let out = tracker.update(vec![det(0.11, 0.1, 0.31, 0.5, "9")], 100, 100);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, first[0].id);
        assert_eq!(out[0].disappeared_frames, 0);

        assert!(tracker.update(Vec::new(), 100, 100).is_empty());
    }

    #[test]
    fn majority_vote_smooths_misreads() {
        let mut tracker = TrackerState::default();
        let runs: Vec<Vec<TrackedPlayer>> = ["23", "23", "45", "23"]
            .into_iter()
            .map(|number| tracker.update(vec![det(0.2, 0.2, 0.4, 0.6, number)], 100, 100))
            .collect();
        assert_eq!(runs[2][0].jersey_number, "23");
        let last = &runs[3];
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].jersey_number, "23");
    }

    #[test]
    fn latest_reading_shown_below_min_votes() {
        let mut tracker = TrackerState::new(TrackerParams {
            min_votes: 3,
            ..TrackerParams::default()
        });
        tracker.update(vec![det(0.2, 0.2, 0.4, 0.6, "23")], 100, 100);
        let out = tracker.update(vec![det(0.2, 0.2, 0.4, 0.6, "28")], 100, 100);
        assert_eq!(out[0].jersey_number, "28");
    }

    #[test]
    fn entries_claim_detections_in_insertion_order() {
        let mut tracker = TrackerState::default();
        let seeded = tracker.update(
            vec![det(0.0, 0.0, 0.4, 0.4, "1"), det(0.1, 0.0, 0.5, 0.4, "2")],
            100,
            100,
        );
        assert_eq!(seeded.len(), 2);

        // one detection overlapping both: the older entry takes it
        let out = tracker.update(vec![det(0.05, 0.0, 0.45, 0.4, "3")], 100, 100);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, seeded[0].id);
        assert_eq!(out[0].disappeared_frames, 0);
        assert_eq!(out[1].disappeared_frames, 1);
    }

    #[test]
    fn best_overlap_wins() {
        let mut tracker = TrackerState::default();
        tracker.update(vec![det(0.2, 0.2, 0.4, 0.4, "7")], 100, 100);
        let out = tracker.update(
            vec![det(0.25, 0.2, 0.45, 0.4, "8"), det(0.2, 0.2, 0.4, 0.41, "7")],
            100,
            100,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].current_box, NormalizedBox::new(0.2, 0.2, 0.4, 0.41));
        assert_eq!(out[1].jersey_number, "8");
    }

    #[test]
    fn reset_clears_players() {
        let mut tracker = TrackerState::default();
        tracker.update(vec![det(0.1, 0.1, 0.3, 0.5, "4")], 100, 100);
        tracker.reset();
        assert!(tracker.is_empty());
        let out = tracker.update(vec![det(0.1, 0.1, 0.3, 0.5, "4")], 100, 100);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn players_serialize_with_string_ids() {
        let mut tracker = TrackerState::default();
        let out = tracker.update(vec![det(0.5, 0.5, 0.75, 1.0, "10")], 4, 4);
        let json = serde_json::to_value(&out[0]).expect("serialize");
        assert_eq!(json["id"], out[0].id.to_string());
        assert_eq!(json["jersey_number"], "10");
        assert_eq!(json["initial_box"], serde_json::json!([2.0, 2.0, 3.0, 4.0]));
    }
}
