#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;

use jersey_track::detect::{ModelError, NumberLocator, ScoredBox, TextRecognizer};
use jersey_track::{NormalizedBox, PipelineConfig, RgbImage};

pub fn scored(l: f32, t: f32, r: f32, b: f32, score: f32) -> ScoredBox {
    ScoredBox::new(NormalizedBox::new(l, t, r, b), score)
}

/// Config with the tile grid disabled, so every locator call is the wide pass.
pub fn wide_pass_only() -> PipelineConfig {
    let mut cfg = PipelineConfig::default();
    cfg.tiling.grid_size = 0;
    cfg.throttle_every = 1;
    cfg
}

/// Returns `boxes` on every `every`-th call (starting with the first) and
/// nothing otherwise.
pub struct FixedLocator {
    boxes: Vec<ScoredBox>,
    every: usize,
    pub calls: usize,
}

impl FixedLocator {
    pub fn new(boxes: Vec<ScoredBox>, every: usize) -> Self {
        Self {
            boxes,
            every: every.max(1),
            calls: 0,
        }
    }
}

impl NumberLocator for FixedLocator {
    fn locate(&mut self, _image: &RgbImage, _min: f32) -> Result<Vec<ScoredBox>, ModelError> {
        let hit = self.calls % self.every == 0;
        self.calls += 1;
        Ok(if hit { self.boxes.clone() } else { Vec::new() })
    }
}

/// Blocks every call until the test sends on the gate.
pub struct GatedLocator {
    pub gate: Receiver<()>,
    pub boxes: Vec<ScoredBox>,
}

impl NumberLocator for GatedLocator {
    fn locate(&mut self, _image: &RgbImage, _min: f32) -> Result<Vec<ScoredBox>, ModelError> {
        self.gate
            .recv()
            .map_err(|err| ModelError::Inference(err.to_string()))?;
        Ok(self.boxes.clone())
    }
}

pub struct FailingLocator;

impl NumberLocator for FailingLocator {
    fn locate(&mut self, _image: &RgbImage, _min: f32) -> Result<Vec<ScoredBox>, ModelError> {
        Err(ModelError::Inference("model unavailable".to_string()))
    }
}

/// Panics on its first call, then behaves like [`FixedLocator`] with `every = 1`.
pub struct PanicOnceLocator {
    boxes: Vec<ScoredBox>,
    pub calls: usize,
}

impl PanicOnceLocator {
    pub fn new(boxes: Vec<ScoredBox>) -> Self {
        Self { boxes, calls: 0 }
    }
}

impl NumberLocator for PanicOnceLocator {
    fn locate(&mut self, _image: &RgbImage, _min: f32) -> Result<Vec<ScoredBox>, ModelError> {
        self.calls += 1;
        if self.calls == 1 {
            panic!("locator blew up");
        }
        Ok(self.boxes.clone())
    }
}

/// Answers every crop with the same lines and counts calls.
pub struct LinesOcr {
    lines: Vec<String>,
    pub calls: AtomicUsize,
}

impl LinesOcr {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for LinesOcr {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<String>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lines.clone())
    }
}
