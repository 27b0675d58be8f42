//! Planar YUV 4:2:0 to packed RGB conversion.
//!
//! Camera buffers carry full-range BT.601 (JFIF) samples. The pixel math is
//! done by the `yuv` crate; this module owns validation of the plane layout
//! and the scratch buffers needed to hand it packed planes.

use yuv::{YuvPlanarImage, YuvRange, YuvStandardMatrix};

use crate::{PlanarYuvFrame, RgbImage};

/// Errors returned by [`YuvToRgbConverter::convert`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("{plane} plane stride {stride} is smaller than the minimum {min}")]
    InvalidStride {
        plane: &'static str,
        stride: usize,
        min: usize,
    },
    #[error("{plane} plane too short (expected at least {expected} bytes, got {got})")]
    PlaneTooShort {
        plane: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("yuv conversion failed: {0}")]
    Backend(String),
}

/// Reusable YUV to RGB converter.
///
/// Chroma samples are gathered into tightly packed scratch planes, which
/// also covers interleaved (pixel stride 2) layouts. The scratch planes are
/// reallocated only when the frame dimensions change between calls.
/// Conversion takes `&mut self`, so a single converter never runs two
/// conversions at once.
#[derive(Debug, Default)]
pub struct YuvToRgbConverter {
    dims: Option<(u32, u32)>,
    y_plane: Vec<u8>,
    u_plane: Vec<u8>,
    v_plane: Vec<u8>,
}

impl YuvToRgbConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions the scratch buffers are currently sized for.
    pub fn buffer_dims(&self) -> Option<(u32, u32)> {
        self.dims
    }

    /// Convert `frame` into `out`, reallocating `out` if its size differs.
    ///
    /// Rotation metadata is ignored here; the caller applies it to the RGB
    /// result.
    pub fn convert(
        &mut self,
        frame: &PlanarYuvFrame,
        out: &mut RgbImage,
    ) -> Result<(), ConvertError> {
        validate(frame)?;

        if self.dims != Some((frame.width, frame.height)) {
            let (cw, ch) = frame.chroma_dims();
            log::debug!(
                "yuv converter: resizing buffers to {}x{}",
                frame.width,
                frame.height
            );
            self.u_plane = vec![0; cw * ch];
            self.v_plane = vec![0; cw * ch];
            self.y_plane.clear();
            self.dims = Some((frame.width, frame.height));
        }
        if out.dimensions() != (frame.width, frame.height) {
            *out = RgbImage::new(frame.width, frame.height);
        }

        self.gather_chroma(frame);

        let width = frame.width as usize;
        let height = frame.height as usize;
        let (cw, _) = frame.chroma_dims();

        // The last luma row may end right after its pixels; the backend wants
        // every row padded out to the stride.
        let (y_plane, y_stride) = if frame.y.len() >= frame.y_row_stride * height {
            (frame.y.as_slice(), frame.y_row_stride)
        } else {
            self.pack_luma(frame);
            (self.y_plane.as_slice(), width)
        };

        let planar = YuvPlanarImage {
            y_plane,
            y_stride: y_stride as u32,
            u_plane: &self.u_plane,
            u_stride: cw as u32,
            v_plane: &self.v_plane,
            v_stride: cw as u32,
            width: frame.width,
            height: frame.height,
        };
        let out_buf: &mut [u8] = out;
        yuv::yuv420_to_rgb(
            &planar,
            out_buf,
            frame.width * 3,
            YuvRange::Full,
            YuvStandardMatrix::Bt601,
        )
        .map_err(|err| ConvertError::Backend(err.to_string()))
    }

    fn gather_chroma(&mut self, frame: &PlanarYuvFrame) {
        let (cw, ch) = frame.chroma_dims();
        for row in 0..ch {
            let src = row * frame.uv_row_stride;
            let dst = row * cw;
            for col in 0..cw {
                let idx = src + col * frame.uv_pixel_stride;
                self.u_plane[dst + col] = frame.u[idx];
                self.v_plane[dst + col] = frame.v[idx];
            }
        }
    }

    fn pack_luma(&mut self, frame: &PlanarYuvFrame) {
        let width = frame.width as usize;
        self.y_plane.clear();
        self.y_plane.reserve(width * frame.height as usize);
        for row in frame.y.chunks(frame.y_row_stride).take(frame.height as usize) {
            self.y_plane.extend_from_slice(&row[..width]);
        }
    }
}

fn validate(frame: &PlanarYuvFrame) -> Result<(), ConvertError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(ConvertError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
        });
    }
    let width = frame.width as usize;
    let height = frame.height as usize;
    if frame.y_row_stride < width {
        return Err(ConvertError::InvalidStride {
            plane: "y",
            stride: frame.y_row_stride,
            min: width,
        });
    }
    check_len("y", frame.y.len(), (height - 1) * frame.y_row_stride + width)?;

    let (cw, ch) = frame.chroma_dims();
    if frame.uv_pixel_stride == 0 {
        return Err(ConvertError::InvalidStride {
            plane: "uv pixel",
            stride: 0,
            min: 1,
        });
    }
    let row_span = (cw - 1) * frame.uv_pixel_stride + 1;
    if frame.uv_row_stride < row_span {
        return Err(ConvertError::InvalidStride {
            plane: "uv",
            stride: frame.uv_row_stride,
            min: row_span,
        });
    }
    let chroma_len = (ch - 1) * frame.uv_row_stride + row_span;
    check_len("u", frame.u.len(), chroma_len)?;
    check_len("v", frame.v.len(), chroma_len)?;
    Ok(())
}

fn check_len(plane: &'static str, got: usize, expected: usize) -> Result<(), ConvertError> {
    if got < expected {
        return Err(ConvertError::PlaneTooShort {
            plane,
            expected,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn converts_reference_colors() {
        let mut conv = YuvToRgbConverter::new();
        let mut out = RgbImage::new(1, 1);

        conv.convert(&PlanarYuvFrame::filled(4, 4, 128, 128, 128), &mut out)
            .expect("gray converts");
        assert_eq!(out.get_pixel(3, 3), &Rgb([128, 128, 128]));

        conv.convert(&PlanarYuvFrame::filled(4, 4, 255, 128, 128), &mut out)
            .expect("white converts");
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));

        conv.convert(&PlanarYuvFrame::filled(4, 4, 76, 85, 255), &mut out)
            .expect("red converts");
        let [r, g, b] = out.get_pixel(1, 2).0;
        assert!(r >= 250 && g <= 5 && b <= 5, "got ({r}, {g}, {b})");
    }

    #[test]
    fn chroma_is_shared_by_2x2_blocks() {
        // 4x2 frame, two chroma samples: left block neutral, right block blue-ish.
        let frame = PlanarYuvFrame::i420(4, 2, vec![100; 8], vec![128, 200], vec![128, 128]);
        let mut out = RgbImage::new(4, 2);
        YuvToRgbConverter::new()
            .convert(&frame, &mut out)
            .expect("valid frame");

        assert_eq!(out.get_pixel(1, 1), &Rgb([100, 100, 100]));
        let right = out.get_pixel(2, 0).0;
        assert_eq!(right, out.get_pixel(3, 1).0);
        assert!(right[2] > right[0]);
    }

    #[test]
    fn interleaved_chroma_with_pixel_stride() {
        // NV12-style view: U and V read from the same interleaved buffer with pixel stride 2.
        let interleaved = vec![128u8, 128, 200, 128];
        let frame = PlanarYuvFrame {
            width: 4,
            height: 2,
            y: vec![100; 8],
            y_row_stride: 4,
            u: interleaved.clone(),
            v: interleaved[1..].to_vec(),
            uv_row_stride: 4,
            uv_pixel_stride: 2,
            rotation: Default::default(),
        };
        let mut out = RgbImage::new(4, 2);
        YuvToRgbConverter::new()
            .convert(&frame, &mut out)
            .expect("valid frame");
        assert_eq!(out.get_pixel(0, 0), &Rgb([100, 100, 100]));
        assert!(out.get_pixel(3, 0).0[2] > 100);
    }

    #[test]
    fn unpadded_last_luma_row() {
        // Row stride 6 for a 4-wide frame, last row trimmed to its pixels.
        let mut y = vec![0u8; 6 + 4];
        y[..4].copy_from_slice(&[10, 20, 30, 40]);
        y[6..].copy_from_slice(&[50, 60, 70, 80]);
        let frame = PlanarYuvFrame {
            width: 4,
            height: 2,
            y,
            y_row_stride: 6,
            u: vec![128, 128],
            v: vec![128, 128],
            uv_row_stride: 2,
            uv_pixel_stride: 1,
            rotation: Default::default(),
        };
        let mut out = RgbImage::new(4, 2);
        YuvToRgbConverter::new()
            .convert(&frame, &mut out)
            .expect("valid frame");
        assert_eq!(out.get_pixel(1, 0), &Rgb([20, 20, 20]));
        assert_eq!(out.get_pixel(3, 1), &Rgb([80, 80, 80]));
    }

    #[test]
    fn buffers_follow_dimension_changes() {
        let mut conv = YuvToRgbConverter::new();
        let mut out = RgbImage::new(1, 1);
        assert_eq!(conv.buffer_dims(), None);

        conv.convert(&PlanarYuvFrame::filled(8, 6, 0, 128, 128), &mut out)
            .expect("first frame");
        assert_eq!(conv.buffer_dims(), Some((8, 6)));
        assert_eq!(out.dimensions(), (8, 6));

        conv.convert(&PlanarYuvFrame::filled(5, 3, 0, 128, 128), &mut out)
            .expect("odd-sized frame");
        assert_eq!(conv.buffer_dims(), Some((5, 3)));
        assert_eq!(out.dimensions(), (5, 3));
    }

    #[test]
    fn rejects_short_planes() {
        let mut frame = PlanarYuvFrame::filled(4, 4, 0, 128, 128);
        frame.v.truncate(3);
        let err = YuvToRgbConverter::new()
            .convert(&frame, &mut RgbImage::new(4, 4))
            .expect_err("short v plane");
        assert_eq!(
            err,
            ConvertError::PlaneTooShort {
                plane: "v",
                expected: 4,
                got: 3
            }
        );

        let empty = PlanarYuvFrame::filled(0, 4, 0, 128, 128);
        assert!(matches!(
            YuvToRgbConverter::new().convert(&empty, &mut RgbImage::new(1, 1)),
            Err(ConvertError::InvalidDimensions { .. })
        ));
    }
}
