//! Content-bounds cropping of rendered frames.
//!
//! A pixel counts as content when any of its four channels is nonzero; the
//! bounding rectangle uses exclusive upper bounds. A frame with no content
//! pixel yields a degenerate rectangle, which the orchestrator resolves as
//! "no image" without invoking the rewriter.

use image::RgbaImage;

/// Bounding rectangle of content pixels; `right`/`bottom` are one past the
/// last content pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Leftmost content column.
    pub left: u32,
    /// One past the rightmost content column.
    pub right: u32,
    /// Topmost content row.
    pub top: u32,
    /// One past the bottommost content row.
    pub bottom: u32,
}

impl CropRect {
    /// Whether the rectangle contains no pixels.
    pub fn is_empty(self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Scan `frame` for the bounding rectangle of all non-empty pixels.
pub fn content_bounds(frame: &RgbaImage) -> CropRect {
    let (w, h) = frame.dimensions();
    let mut rect = CropRect {
        left: w,
        right: 0,
        top: h,
        bottom: 0,
    };
    let mut found = false;
    for (x, y, pixel) in frame.enumerate_pixels() {
        if pixel.0.iter().any(|&c| c > 0) {
            rect.left = rect.left.min(x);
            rect.right = rect.right.max(x);
            rect.top = rect.top.min(y);
            rect.bottom = rect.bottom.max(y);
            found = true;
        }
    }
    if found {
        rect.right += 1;
        rect.bottom += 1;
    }
    rect
}

/// Extract `rect` from `frame` as a new buffer.
pub fn crop(frame: &RgbaImage, rect: CropRect) -> RgbaImage {
    image::imageops::crop_imm(frame, rect.left, rect.top, rect.width(), rect.height()).to_image()
}
