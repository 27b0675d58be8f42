use jersey_track_core::iou;

use crate::ScoredBox;

/// Greedy non-max suppression.
///
/// Candidates are ordered by prominence (box area, largest first; the sort is
/// stable so equal areas keep their arrival order). The first remaining box
/// is kept and every later box whose IoU with it exceeds `iou_threshold` is
/// suppressed, until no candidates remain.
pub fn non_max_suppression(mut boxes: Vec<ScoredBox>, iou_threshold: f32) -> Vec<ScoredBox> {
    boxes.sort_by(|a, b| b.bbox.area().total_cmp(&a.bbox.area()));

    let mut suppressed = vec![false; boxes.len()];
    for i in 0..boxes.len() {
        if suppressed[i] {
            // already merged into a more prominent box
            continue;
        }
        for j in (i + 1)..boxes.len() {
            if suppressed[j] {
                continue;
            }
            if iou(&boxes[i].bbox, &boxes[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    boxes
        .into_iter()
        .zip(suppressed)
        .filter_map(|(b, s)| (!s).then_some(b))
        .collect()
}
