//! Core types and utilities for jersey-number detection and tracking.
//!
//! This crate is intentionally small: box geometry in frame-normalized
//! coordinates, pixel-space crop rules, camera frame types and the planar
//! YUV to RGB converter. It does *not* depend on any concrete detector or OCR
//! model.

mod frame;
mod geometry;
mod logger;
mod yuv;

pub use frame::{PlanarYuvFrame, Rotation};
pub use geometry::{expand_to_min, iou, Detection, NormalizedBox, PixelRect};
pub use yuv::{ConvertError, YuvToRgbConverter};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level};

/// Packed 8-bit RGB raster used throughout the pipeline.
pub type RgbImage = image::RgbImage;
