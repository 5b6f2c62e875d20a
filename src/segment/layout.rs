//! Relative bounding boxes for the seven standings rows.
//!
//! The layout is data, not code: a different UI only needs a different table
//! in `config.json`.

use serde::{Deserialize, Serialize};

/// Number of rows in the standings table.
pub const SLOT_COUNT: usize = 7;

/// Fraction values this close to an integer pixel are snapped to it, so that
/// `k / 7 * H` lands on the exact row boundary despite float rounding.
const SNAP_EPSILON: f64 = 1e-6;

/// A rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One slot's box as fractions of the screenshot (0.0 to 1.0).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl SlotBox {
    /// Converts to pixels for a `width` x `height` image, clamped to bounds.
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let x0 = fraction_to_pixel(self.left, width);
        let x1 = fraction_to_pixel(self.right, width).max(x0);
        let y0 = fraction_to_pixel(self.top, height);
        let y1 = fraction_to_pixel(self.bottom, height).max(y0);

        PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

fn fraction_to_pixel(fraction: f64, dimension: u32) -> u32 {
    let exact = fraction.clamp(0.0, 1.0) * dimension as f64;
    let rounded = exact.round();
    let pixel = if (exact - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        exact.floor()
    };
    (pixel as u32).min(dimension)
}

/// The seven slot boxes, slot 1 first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub slots: [SlotBox; SLOT_COUNT],
}

impl SlotLayout {
    /// Equal-height rows covering `[left, right)` of the screenshot width.
    pub fn uniform_rows(left: f64, right: f64) -> Self {
        let rows = SLOT_COUNT as f64;
        let slots = std::array::from_fn(|i| SlotBox {
            top: i as f64 / rows,
            bottom: (i + 1) as f64 / rows,
            left,
            right,
        });
        Self { slots }
    }

    /// Pixel boxes for every slot, in slot order.
    pub fn pixel_boxes(&self, width: u32, height: u32) -> [PixelRect; SLOT_COUNT] {
        std::array::from_fn(|i| self.slots[i].to_pixels(width, height))
    }
}

impl Default for SlotLayout {
    /// The standings render in the left half of the screenshot.
    fn default() -> Self {
        Self::uniform_rows(0.0, 0.5)
    }
}
