use jersey_track_core::RgbImage;

use crate::ModelError;

/// Longest digit string accepted as a jersey number.
pub const MAX_JERSEY_DIGITS: usize = 3;

/// OCR engine that returns the raw text lines found in an image.
///
/// Recognizers are shared across the OCR fan-out, hence the `Sync` bound.
pub trait TextRecognizer: Sync {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, ModelError>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for &R {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, ModelError> {
        (**self).recognize(image)
    }
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for Box<R> {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, ModelError> {
        (**self).recognize(image)
    }
}

impl<R: TextRecognizer + ?Sized + Send> TextRecognizer for std::sync::Arc<R> {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<String>, ModelError> {
        (**self).recognize(image)
    }
}

/// Pick a jersey number out of raw OCR lines.
///
/// Non-digit characters are stripped from every line; the longest remaining
/// digit string of 1 to [`MAX_JERSEY_DIGITS`] characters wins, the first one
/// seen on ties.
pub fn parse_jersey_number<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let mut best: Option<String> = None;
    for line in lines {
        let digits: String = line
            .as_ref()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() || digits.len() > MAX_JERSEY_DIGITS {
            continue;
        }
        if best.as_ref().is_none_or(|b| digits.len() > b.len()) {
            best = Some(digits);
        }
    }
    best
}
