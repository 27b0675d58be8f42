use image::imageops::{self, FilterType};
use jersey_track_core::{NormalizedBox, RgbImage};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{non_max_suppression, NumberLocator, ScoredBox};

/// Configuration for tiled number localization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingParams {
    /// Side of the square image the locator model consumes, in pixels.
    pub input_size: u32,
    /// Tiles per axis (3 gives a 3x3 grid; 0 disables tiling).
    pub grid_size: usize,
    /// Fraction of the frame shared by neighbouring tiles.
    pub overlap: f32,
    /// Confidence floor passed to every locator call.
    pub min_confidence: f32,
    /// Run one extra locator pass on the whole frame.
    pub wide_pass: bool,
    /// IoU above which a less prominent candidate is suppressed.
    pub nms_iou: f32,
    /// Keep at most this many candidates after suppression.
    pub max_candidates: usize,
}

impl Default for TilingParams {
    fn default() -> Self {
        Self {
            input_size: 320,
            grid_size: 3,
            overlap: 0.15,
            min_confidence: 0.15,
            wide_pass: true,
            nms_iou: 0.3,
            max_candidates: 3,
        }
    }
}

/// Overlapping square-grid tiling of the normalized frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    tiles: Vec<NormalizedBox>,
}

impl TileGrid {
    /// Build a `grid_size x grid_size` grid whose neighbours share `overlap`.
    ///
    /// Tiles start every `(1 - overlap) / (grid_size - 1)` and span that step
    /// plus `overlap`; edges past the frame are clamped to 1 and tiles that
    /// collapse at the frame edge are skipped.
    pub fn new(grid_size: usize, overlap: f32) -> Self {
        let overlap = overlap.clamp(0.0, 0.95);
        let tiles = match grid_size {
            0 => Vec::new(),
            1 => vec![NormalizedBox::FULL],
            n => {
                let step = (1.0 - overlap) / (n - 1) as f32;
                let size = step + overlap;
                let mut tiles = Vec::with_capacity(n * n);
                for row in 0..n {
                    for col in 0..n {
                        let left = col as f32 * step;
                        let top = row as f32 * step;
                        let tile = NormalizedBox::new(
                            left,
                            top,
                            (left + size).min(1.0),
                            (top + size).min(1.0),
                        );
                        if tile.is_valid() {
                            tiles.push(tile);
                        }
                    }
                }
                tiles
            }
        };
        Self { tiles }
    }

    pub fn from_params(params: &TilingParams) -> Self {
        Self::new(params.grid_size, params.overlap)
    }

    pub fn tiles(&self) -> &[NormalizedBox] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Locate jersey-number candidates in `image`.
///
/// Runs the optional wide pass on the whole (downscaled) frame and one pass
/// per tile, maps every box into frame-normalized coordinates, then applies
/// non-max suppression and keeps the `max_candidates` most prominent boxes.
///
/// A failing locator call is logged and contributes nothing.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(locator, image, grid, params),
        fields(width = image.width(), height = image.height(), tiles = grid.len())
    )
)]
pub fn locate_candidates<L: NumberLocator + ?Sized>(
    locator: &mut L,
    image: &RgbImage,
    grid: &TileGrid,
    params: &TilingParams,
) -> Vec<ScoredBox> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut raw = Vec::new();
    let mut failed = 0usize;

    if params.wide_pass {
        let scaled = resize_square(image, params.input_size);
        match run_pass(locator, &scaled, params.min_confidence) {
            Ok(found) => raw.extend(found),
            Err(err) => {
                failed += 1;
                log::warn!("number locator failed on wide pass: {err}");
            }
        }
    }

    for (idx, tile) in grid.tiles().iter().enumerate() {
        let Some(rect) = tile.to_pixels(width, height) else {
            continue;
        };
        let crop = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();
        let scaled = resize_square(&crop, params.input_size);
        match run_pass(locator, &scaled, params.min_confidence) {
            Ok(found) => raw.extend(found.into_iter().map(|b| ScoredBox {
                bbox: b.bbox.remap_from(tile),
                score: b.score,
            })),
            Err(err) => {
                failed += 1;
                log::warn!("number locator failed on tile {idx}: {err}");
            }
        }
    }

    let raw_count = raw.len();
    let valid: Vec<ScoredBox> = raw
        .into_iter()
        .filter_map(|b| {
            b.bbox.validated().map(|bbox| ScoredBox {
                bbox,
                score: b.score,
            })
        })
        .collect();

    let mut kept = non_max_suppression(valid, params.nms_iou);
    kept.truncate(params.max_candidates);

    log::debug!(
        "located {} raw boxes ({} failed passes), kept {} candidates",
        raw_count,
        failed,
        kept.len()
    );
    kept
}

fn run_pass<L: NumberLocator + ?Sized>(
    locator: &mut L,
    image: &RgbImage,
    min_confidence: f32,
) -> Result<Vec<ScoredBox>, crate::ModelError> {
    let found = locator.locate(image, min_confidence)?;
    Ok(found
        .into_iter()
        .filter(|b| b.score >= min_confidence)
        .collect())
}

fn resize_square(image: &RgbImage, side: u32) -> RgbImage {
    if image.dimensions() == (side, side) {
        return image.clone();
    }
    imageops::resize(image, side, side, FilterType::Triangle)
}
