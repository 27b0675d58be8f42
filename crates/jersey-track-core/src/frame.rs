use image::imageops;
use serde::{Deserialize, Serialize};

use crate::RgbImage;

/// Clockwise rotation that brings a sensor frame upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Rotate90Clockwise,
    Rotate180,
    Rotate90CounterClockwise,
}

impl Rotation {
    /// Parse camera rotation metadata given in degrees clockwise.
    ///
    /// Any multiple of 90 is accepted (negative values rotate the other way).
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Rotate90Clockwise,
            180 => Rotation::Rotate180,
            _ => Rotation::Rotate90CounterClockwise,
        })
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Rotate90Clockwise => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate90CounterClockwise => 270,
        }
    }

    /// Whether the rotation swaps width and height.
    pub fn is_transposing(self) -> bool {
        matches!(
            self,
            Rotation::Rotate90Clockwise | Rotation::Rotate90CounterClockwise
        )
    }

    /// Rotated copy of `image`, or `None` when no rotation is needed.
    pub fn apply(self, image: &RgbImage) -> Option<RgbImage> {
        match self {
            Rotation::None => None,
            Rotation::Rotate90Clockwise => Some(imageops::rotate90(image)),
            Rotation::Rotate180 => Some(imageops::rotate180(image)),
            Rotation::Rotate90CounterClockwise => Some(imageops::rotate270(image)),
        }
    }
}

/// One camera sample in planar YUV 4:2:0 layout.
///
/// The luma plane is full resolution. Both chroma planes are subsampled by two
/// on each axis and addressed with their own row stride and pixel stride, so
/// fully planar (I420, pixel stride 1) and interleaved (NV12/NV21 views,
/// pixel stride 2) camera buffers are both representable.
#[derive(Clone, Debug)]
pub struct PlanarYuvFrame {
    pub width: u32,
    pub height: u32,
    pub y: Vec<u8>,
    pub y_row_stride: usize,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
    pub uv_row_stride: usize,
    pub uv_pixel_stride: usize,
    /// Rotation to apply after conversion.
    pub rotation: Rotation,
}

impl PlanarYuvFrame {
    /// Tightly packed I420 frame.
    pub fn i420(width: u32, height: u32, y: Vec<u8>, u: Vec<u8>, v: Vec<u8>) -> Self {
        Self {
            width,
            height,
            y,
            y_row_stride: width as usize,
            u,
            v,
            uv_row_stride: width.div_ceil(2) as usize,
            uv_pixel_stride: 1,
            rotation: Rotation::None,
        }
    }

    /// Frame filled with a single YUV color.
    pub fn filled(width: u32, height: u32, y: u8, u: u8, v: u8) -> Self {
        let luma = width as usize * height as usize;
        let chroma = width.div_ceil(2) as usize * height.div_ceil(2) as usize;
        Self::i420(width, height, vec![y; luma], vec![u; chroma], vec![v; chroma])
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Chroma plane dimensions `(width, height)`.
    #[inline]
    pub fn chroma_dims(&self) -> (usize, usize) {
        (
            self.width.div_ceil(2) as usize,
            self.height.div_ceil(2) as usize,
        )
    }

    /// Frame dimensions after `rotation` has been applied.
    pub fn upright_dims(&self) -> (u32, u32) {
        if self.rotation.is_transposing() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}
