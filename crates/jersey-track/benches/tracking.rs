use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jersey_track::detect::{non_max_suppression, ScoredBox};
use jersey_track::tracker::{TrackerParams, TrackerState};
use jersey_track::{Detection, NormalizedBox};

fn jittered_boxes(count: usize, frame: usize) -> Vec<NormalizedBox> {
    (0..count)
        .map(|i| {
            let col = (i % 8) as f32 * 0.12;
            let row = (i / 8) as f32 * 0.2;
            let dx = ((frame + i) % 5) as f32 * 0.002;
            NormalizedBox::new(col + dx, row, col + dx + 0.08, row + 0.15)
        })
        .collect()
}

fn bench_nms(c: &mut Criterion) {
    // 10 passes x 30 raw boxes, heavy overlap between passes
    let raw: Vec<ScoredBox> = (0..10)
        .flat_map(|pass| jittered_boxes(30, pass))
        .enumerate()
        .map(|(i, bbox)| ScoredBox::new(bbox, 0.2 + (i % 7) as f32 * 0.1))
        .collect();

    c.bench_function("nms_300_boxes", |b| {
        b.iter(|| non_max_suppression(black_box(raw.clone()), 0.3))
    });
}

fn bench_tracker(c: &mut Criterion) {
    let frames: Vec<Vec<Detection>> = (0..64)
        .map(|f| {
            jittered_boxes(20, f)
                .into_iter()
                .enumerate()
                .map(|(i, bbox)| Detection::new(bbox, (i + 1).to_string()))
                .collect()
        })
        .collect();

    c.bench_function("tracker_64_frames_20_players", |b| {
        b.iter(|| {
            let mut tracker = TrackerState::new(TrackerParams::default());
            for dets in &frames {
                black_box(tracker.update(dets.clone(), 1920, 1080));
            }
        })
    });
}

criterion_group!(benches, bench_nms, bench_tracker);
criterion_main!(benches);
