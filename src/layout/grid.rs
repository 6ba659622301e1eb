//! # Photo Grid
//!
//! Slot geometry for photo pages. The usable page height is divided into
//! equal vertical slots; each slot holds a caption band and one image box
//! centred horizontally. Images are stretched to the box, so every photo on
//! every page has the same footprint whatever its aspect ratio.

use crate::model::PageGeometry;

/// Height of the caption band at the top of each slot.
pub const CAPTION_BAND: f64 = 6.0;
/// Gap left below the image inside a slot.
pub const SLOT_PADDING: f64 = 4.0;
/// Image width as a fraction of the page width.
pub const IMAGE_WIDTH_RATIO: f64 = 0.72;

/// An axis-aligned box, top-left origin, millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SlotRect {
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhotoGrid {
    geometry: PageGeometry,
    slots: usize,
}

impl PhotoGrid {
    pub fn new(geometry: PageGeometry, slots: usize) -> Self {
        Self {
            geometry,
            slots: slots.max(1),
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn slot_height(&self) -> f64 {
        self.geometry.usable_height() / self.slots as f64
    }

    pub fn slot_top(&self, index: usize) -> f64 {
        self.geometry.margin_y + index as f64 * self.slot_height()
    }

    /// Bottom edge of the last occupied slot when `used` slots are filled.
    pub fn occupied_bottom(&self, used: usize) -> f64 {
        self.slot_top(used)
    }

    pub fn image_width(&self) -> f64 {
        (IMAGE_WIDTH_RATIO * self.geometry.width).min(self.geometry.usable_width())
    }

    /// Baseline for the caption of slot `index`, centred at `caption_x()`.
    pub fn caption_baseline(&self, index: usize) -> f64 {
        self.slot_top(index) + CAPTION_BAND - 1.5
    }

    pub fn caption_x(&self) -> f64 {
        self.geometry.width / 2.0
    }

    /// The stretched image box of slot `index`.
    pub fn image_rect(&self, index: usize) -> SlotRect {
        let w = self.image_width();
        SlotRect {
            x: (self.geometry.width - w) / 2.0,
            y: self.slot_top(index) + CAPTION_BAND,
            w,
            h: (self.slot_height() - CAPTION_BAND - SLOT_PADDING).max(0.0),
        }
    }
}
