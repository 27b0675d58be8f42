//! High-level facade for the `jersey-track-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates (`core`, `detect`, `tracker`),
//! - [`FrameAnalyzer`], which runs conversion, tiled localization, OCR and
//!   tracking for one frame,
//! - [`AnalyzerRuntime`], a background worker with frame throttling and
//!   tracked-player callbacks,
//! - [`PipelineConfig`] JSON configuration and an offline [`replay()`] of
//!   recorded detections.
//!
//! ## Quickstart
//!
//! ```no_run
//! use jersey_track::detect::{ModelError, NumberLocator, ScoredBox, TextRecognizer};
//! use jersey_track::{FrameAnalyzer, PipelineConfig, PlanarYuvFrame, RgbImage};
//!
//! struct MyLocator;
//! impl NumberLocator for MyLocator {
//!     fn locate(&mut self, _: &RgbImage, _: f32) -> Result<Vec<ScoredBox>, ModelError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! struct MyOcr;
//! impl TextRecognizer for MyOcr {
//!     fn recognize(&self, _: &RgbImage) -> Result<Vec<String>, ModelError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut analyzer = FrameAnalyzer::new(MyLocator, MyOcr, PipelineConfig::default());
//! let frame = PlanarYuvFrame::filled(640, 480, 16, 128, 128);
//! let report = analyzer.analyze(&frame)?;
//! for player in &report.players {
//!     println!("{} wears #{}", player.id, player.jersey_number);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `jersey_track::core`: boxes, IoU, crop rules, frames, YUV conversion, logger.
//! - `jersey_track::detect`: locator/recognizer traits, tiling, NMS, OCR orchestration.
//! - `jersey_track::tracker`: IoU tracker with majority-voted numbers.

pub use jersey_track_core as core;
pub use jersey_track_detect as detect;
pub use jersey_track_tracker as tracker;

pub use jersey_track_core::{Detection, NormalizedBox, PlanarYuvFrame, RgbImage, Rotation};
pub use jersey_track_detect::RosterFilter;
pub use jersey_track_tracker::TrackedPlayer;

mod analyzer;
mod config;
pub mod replay;
mod runtime;

pub use analyzer::{AnalyzeError, FrameAnalyzer, FrameReport};
pub use config::{ConfigError, PipelineConfig};
pub use replay::replay;
pub use runtime::{AnalyzerRuntime, RuntimeCallbacks, RuntimeError, SubmitOutcome};
