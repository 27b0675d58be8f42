//! Detection stages of the jersey-number pipeline.
//!
//! Current focus:
//! - tiled number localization (3x3 overlapping tiles plus one wide pass),
//! - greedy non-max suppression over the merged candidates,
//! - crop planning, concurrent OCR and jersey-number parsing,
//! - roster filtering.
//!
//! The learned locator and the OCR engine are opaque capabilities behind the
//! [`NumberLocator`] and [`TextRecognizer`] traits.

mod crop;
mod error;
mod locator;
mod nms;
mod ocr;
mod roster;
mod tiling;

pub use crop::{plan_crop, read_numbers, CropReadout, CropStats, SmartCropParams};
pub use error::ModelError;
pub use locator::{NumberLocator, ScoredBox};
pub use nms::non_max_suppression;
pub use ocr::{parse_jersey_number, TextRecognizer, MAX_JERSEY_DIGITS};
pub use roster::RosterFilter;
pub use tiling::{locate_candidates, TileGrid, TilingParams};

pub use jersey_track_core::{Detection, NormalizedBox};
