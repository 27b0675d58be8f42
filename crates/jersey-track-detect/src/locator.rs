use jersey_track_core::{NormalizedBox, RgbImage};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A candidate region returned by a [`NumberLocator`].
///
/// `bbox` is normalized to the image passed to the locator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredBox {
    pub bbox: NormalizedBox,
    pub score: f32,
}

impl ScoredBox {
    pub fn new(bbox: NormalizedBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// Learned detector that finds number-like regions in an image.
///
/// Calls take `&mut self`: interpreter-style backends are usually not safe to
/// invoke concurrently, and the tiling engine calls the locator sequentially.
pub trait NumberLocator {
    /// Return regions scoring at least `min_confidence`.
    fn locate(
        &mut self,
        image: &RgbImage,
        min_confidence: f32,
    ) -> Result<Vec<ScoredBox>, ModelError>;
}

impl<L: NumberLocator + ?Sized> NumberLocator for &mut L {
    fn locate(
        &mut self,
        image: &RgbImage,
        min_confidence: f32,
    ) -> Result<Vec<ScoredBox>, ModelError> {
        (**self).locate(image, min_confidence)
    }
}

impl<L: NumberLocator + ?Sized> NumberLocator for Box<L> {
    fn locate(
        &mut self,
        image: &RgbImage,
        min_confidence: f32,
    ) -> Result<Vec<ScoredBox>, ModelError> {
        (**self).locate(image, min_confidence)
    }
}
