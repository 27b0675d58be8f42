//! Crop planning and concurrent OCR over located candidates.

use image::imageops::{self, FilterType};
use jersey_track_core::{expand_to_min, Detection, NormalizedBox, PixelRect, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{parse_jersey_number, RosterFilter, TextRecognizer};

/// Crop-size settings for OCR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartCropParams {
    /// Crops are grown to at least this many pixels per side; smaller ones
    /// that cannot grow inside the image are rejected.
    pub min_crop_px: u32,
    /// Crops are upscaled so both sides reach at least this many pixels.
    pub min_ocr_px: u32,
}

impl Default for SmartCropParams {
    fn default() -> Self {
        Self {
            min_crop_px: 32,
            min_ocr_px: 32,
        }
    }
}

/// Per-frame bookkeeping of what happened to each candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropStats {
    pub candidates: usize,
    /// Rejected before OCR: too small even after expansion.
    pub undersized: usize,
    pub ocr_failed: usize,
    /// OCR returned no usable 1-3 digit string.
    pub unreadable: usize,
    pub off_roster: usize,
    pub accepted: usize,
}

/// Numbers read from one frame's candidates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CropReadout {
    pub detections: Vec<Detection>,
    pub stats: CropStats,
}

/// Pixel crop for `bbox` in a `width x height` image, grown to `min_crop_px`.
///
/// Returns `None` when the crop cannot reach the minimum size inside the
/// image bounds.
pub fn plan_crop(
    bbox: &NormalizedBox,
    width: u32,
    height: u32,
    min_crop_px: u32,
) -> Option<PixelRect> {
    let rect = bbox.to_pixels(width, height)?;
    let rect = expand_to_min(rect, min_crop_px, width, height);
    rect.fits(min_crop_px).then_some(rect)
}

enum Outcome {
    Accepted(Detection),
    OcrFailed,
    Unreadable,
    OffRoster,
}

/// Read jersey numbers from `candidates` (frame-normalized boxes in `image`).
///
/// All accepted crops go through `recognizer` concurrently; the call returns
/// once every OCR request has completed or failed. Detections keep the
/// candidate order, though callers should not rely on it.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(recognizer, image, candidates, roster, params),
        fields(candidates = candidates.len())
    )
)]
pub fn read_numbers<R: TextRecognizer + ?Sized>(
    recognizer: &R,
    image: &RgbImage,
    candidates: &[NormalizedBox],
    roster: &RosterFilter,
    params: &SmartCropParams,
) -> CropReadout {
    let (width, height) = image.dimensions();
    let mut stats = CropStats {
        candidates: candidates.len(),
        ..CropStats::default()
    };

    let crops: Vec<(NormalizedBox, RgbImage)> = candidates
        .iter()
        .filter_map(|bbox| match plan_crop(bbox, width, height, params.min_crop_px) {
            Some(rect) => Some((*bbox, extract_crop(image, rect, params.min_ocr_px))),
            None => {
                stats.undersized += 1;
                None
            }
        })
        .collect();

    let outcomes: Vec<Outcome> = crops
        .par_iter()
        .map(|(bbox, crop)| {
            let lines = match recognizer.recognize(crop) {
                Ok(lines) => lines,
                Err(err) => {
                    log::debug!("ocr failed for {bbox:?}: {err}");
                    return Outcome::OcrFailed;
                }
            };
            let Some(number) = parse_jersey_number(&lines) else {
                return Outcome::Unreadable;
            };
            match roster.resolve(&number) {
                Some(number) => Outcome::Accepted(Detection::new(*bbox, number)),
                None => Outcome::OffRoster,
            }
        })
        .collect();

    let mut detections = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Outcome::Accepted(det) => {
                stats.accepted += 1;
                detections.push(det);
            }
            Outcome::OcrFailed => stats.ocr_failed += 1,
            Outcome::Unreadable => stats.unreadable += 1,
            Outcome::OffRoster => stats.off_roster += 1,
        }
    }

    log::debug!("ocr readout: {stats:?}");
    CropReadout { detections, stats }
}

fn extract_crop(image: &RgbImage, rect: PixelRect, min_side: u32) -> RgbImage {
    let crop = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
    if rect.fits(min_side) {
        return crop;
    }
    let scale = (min_side as f32 / rect.width as f32).max(min_side as f32 / rect.height as f32);
    let w = ((rect.width as f32 * scale).ceil() as u32).max(min_side);
    let h = ((rect.height as f32 * scale).ceil() as u32).max(min_side);
    imageops::resize(&crop, w, h, FilterType::Triangle)
}
