use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame-normalized coordinates (`[0, 1]` on both axes).
///
/// Serialized as `[left, top, right, bottom]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct NormalizedBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl NormalizedBox {
    /// The whole frame.
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Area of the box; degenerate boxes have zero area.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// `left < right` and `top < bottom`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.left < self.right && self.top < self.bottom
    }

    /// Clamp every edge into `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self::new(
            self.left.clamp(0.0, 1.0),
            self.top.clamp(0.0, 1.0),
            self.right.clamp(0.0, 1.0),
            self.bottom.clamp(0.0, 1.0),
        )
    }

    /// Clamp into `[0, 1]` and drop the box if it collapses (or contains NaN).
    pub fn validated(self) -> Option<Self> {
        let b = self.clamped();
        b.is_valid().then_some(b)
    }

    /// Map a box expressed relative to `region` back into the coordinate
    /// system `region` itself lives in (linear interpolation on both axes).
    pub fn remap_from(self, region: &NormalizedBox) -> Self {
        let w = region.width();
        let h = region.height();
        Self::new(
            region.left + self.left * w,
            region.top + self.top * h,
            region.left + self.right * w,
            region.top + self.bottom * h,
        )
    }

    /// Pixel rectangle covered by this box in a `width x height` image.
    ///
    /// Left/top edges round down and right/bottom edges round up, then the
    /// result is clamped so it is at least one pixel wide and tall and lies
    /// inside the image. Returns `None` for an empty image.
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<PixelRect> {
        if width == 0 || height == 0 {
            return None;
        }
        let (x0, x1) = pixel_span(self.left, self.right, width);
        let (y0, y1) = pixel_span(self.top, self.bottom, height);
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    /// Box scaled to pixel units of a `width x height` frame, as `[l, t, r, b]`.
    pub fn scaled(&self, width: u32, height: u32) -> [f32; 4] {
        let (w, h) = (width as f32, height as f32);
        [self.left * w, self.top * h, self.right * w, self.bottom * h]
    }
}

impl From<[f32; 4]> for NormalizedBox {
    fn from([left, top, right, bottom]: [f32; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<NormalizedBox> for [f32; 4] {
    fn from(b: NormalizedBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

fn pixel_span(lo: f32, hi: f32, dim: u32) -> (u32, u32) {
    let d = dim as f32;
    let start = ((lo * d).floor().max(0.0) as u32).min(dim - 1);
    let end = ((hi * d).ceil().max(0.0) as u32).clamp(start + 1, dim);
    (start, end)
}

/// Intersection-over-Union of two axis-aligned boxes.
///
/// Zero or negative overlap on either axis, or a non-positive union, yields 0.
pub fn iou(a: &NormalizedBox, b: &NormalizedBox) -> f32 {
    let overlap_w = a.right.min(b.right) - a.left.max(b.left);
    let overlap_h = a.bottom.min(b.bottom) - a.top.max(b.top);
    if overlap_w <= 0.0 || overlap_h <= 0.0 {
        return 0.0;
    }
    let intersection = overlap_w * overlap_h;
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Integer pixel rectangle (`x`, `y` is the top-left corner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Both sides are at least `min` pixels.
    #[inline]
    pub fn fits(&self, min: u32) -> bool {
        self.width >= min && self.height >= min
    }
}

/// Grow `rect` so each side reaches `min` pixels, keeping it centered where
/// the `image_width x image_height` bounds allow.
///
/// Sides already at least `min` are left untouched. When the grown side would
/// leave the image it is shifted inward; when the image itself is narrower
/// than `min` the side is capped at the image extent, so callers must check
/// [`PixelRect::fits`] on the result.
pub fn expand_to_min(rect: PixelRect, min: u32, image_width: u32, image_height: u32) -> PixelRect {
    let (x, width) = expand_axis(rect.x, rect.width, min, image_width);
    let (y, height) = expand_axis(rect.y, rect.height, min, image_height);
    PixelRect {
        x,
        y,
        width,
        height,
    }
}

fn expand_axis(start: u32, len: u32, min: u32, limit: u32) -> (u32, u32) {
    if len >= min {
        return (start, len);
    }
    let target = min.min(limit);
    // twice the center keeps the arithmetic integral
    let center2 = 2 * i64::from(start) + i64::from(len);
    let new_start = (center2 - i64::from(target)).div_euclid(2);
    let new_start = new_start.clamp(0, i64::from(limit - target));
    (new_start as u32, target)
}

/// A located region paired with the jersey number read from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: NormalizedBox,
    pub number: String,
}

impl Detection {
    pub fn new(bbox: NormalizedBox, number: impl Into<String>) -> Self {
        Self {
            bbox,
            number: number.into(),
        }
    }
}
