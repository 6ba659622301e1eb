//! # Report Layout Engine
//!
//! Turns a [`ReportInput`] into pages of drawing instructions. This is the
//! only part of the renderer with real decisions in it; the PDF writer just
//! executes what comes out of here.
//!
//! The page is the unit of layout. A cursor walks down the current page and,
//! before each block is placed, asks "does this fit?" through the rules in
//! [`page_break`]. The order is fixed:
//!
//! 1. Header: title centred, date right-aligned on the same baseline, optional logo
//! 2. Metadata: site, technician and responsible, one `label: value` line each
//! 3. Description: bold label, wrapped text at 6mm line height
//! 4. Observations: bold label, wrapped text inside a rounded box
//! 5. Photos: always on a fresh page, a fixed number of slots per page
//! 6. Signatures: side by side, on the last photo page or after the text
//!
//! Layout is pure. Identical input and options give identical pages, and
//! image instructions borrow the caller's bytes rather than copying them.

pub mod grid;
pub mod page_break;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::font::StandardFont;
use crate::model::{LayoutOptions, PageGeometry, ReportInput, Signature};
use crate::text::{format_date, or_placeholder, wrap_text};
use grid::PhotoGrid;
use page_break::{
    decide_break, decide_photo, decide_signatures_after_photos, decide_signatures_after_text,
    BreakDecision,
};

/// Header baseline, below the top margin.
const HEADER_OFFSET: f64 = 5.0;
const LOGO_WIDTH: f64 = 40.0;
const LOGO_HEIGHT: f64 = 20.0;
/// First metadata baseline, below the header baseline.
const METADATA_OFFSET: f64 = 15.0;
const METADATA_LINE: f64 = 7.0;
/// Distance from a bold block label to the first line of its block.
const LABEL_LINE: f64 = 7.0;
const BODY_LINE: f64 = 6.0;
const BLOCK_GAP: f64 = 6.0;
/// Part of a 6mm line band that sits above the baseline.
const LINE_ASCENT: f64 = 4.5;

const OBSERVATION_MIN_HEIGHT: f64 = 24.0;
/// Inset of the observation text from the box edges.
const OBSERVATION_INSET: f64 = 3.0;
const OBSERVATION_RADIUS: f64 = 2.0;
const BOX_LINE_WIDTH: f64 = 0.3;
const PHOTO_FRAME_LINE_WIDTH: f64 = 0.2;
/// From the observation label baseline to the top of its box.
const OBSERVATION_LABEL_GAP: f64 = 3.0;
/// From the bottom of the observation box to the next baseline.
const AFTER_BOX_GAP: f64 = 10.0;

pub const SIGNATURE_WIDTH: f64 = 60.0;
pub const SIGNATURE_HEIGHT: f64 = 25.0;
/// Signature label baseline, measured up from the bottom edge, on photo pages.
pub const SIGNATURE_BOTTOM_OFFSET: f64 = 70.0;
/// Space from cursor to bottom edge needed to keep signatures on a text page.
pub const SIGNATURE_MIN_SPACE: f64 = 90.0;
const SIGNATURE_IMAGE_GAP: f64 = 3.0;

const MIN_ORPHAN_LINES: usize = 2;
const MIN_WIDOW_LINES: usize = 2;

/// Horizontal anchoring of a text instruction relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing step. Coordinates are millimetres from the top-left corner of
/// the page. `Text::y` is the baseline; `Image` and `Rect` use their top edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum LayoutInstruction<'a> {
    Text {
        content: String,
        x: f64,
        y: f64,
        font_size: f64,
        bold: bool,
        align: TextAlign,
    },
    Image {
        #[serde(serialize_with = "byte_len")]
        bytes: &'a [u8],
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    /// A stroked rectangle, with rounded corners when `radius > 0`.
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        line_width: f64,
        radius: f64,
    },
    PageBreak,
}

fn byte_len<S: Serializer>(bytes: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(bytes.len() as u64)
}

/// A laid-out page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page<'a> {
    pub instructions: Vec<LayoutInstruction<'a>>,
}

impl<'a> Page<'a> {
    /// Text contents in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                LayoutInstruction::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Image instructions in drawing order.
    pub fn images(&self) -> Vec<&LayoutInstruction<'a>> {
        self.instructions
            .iter()
            .filter(|i| matches!(i, LayoutInstruction::Image { .. }))
            .collect()
    }

    pub fn rects(&self) -> Vec<&LayoutInstruction<'a>> {
        self.instructions
            .iter()
            .filter(|i| matches!(i, LayoutInstruction::Rect { .. }))
            .collect()
    }
}

/// The complete output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout<'a> {
    pub geometry: PageGeometry,
    pub pages: Vec<Page<'a>>,
}

impl<'a> Layout<'a> {
    /// Flatten into a single instruction stream with a `PageBreak` between
    /// consecutive pages.
    pub fn into_instructions(self) -> Vec<LayoutInstruction<'a>> {
        let mut out = Vec::new();
        for (i, page) in self.pages.into_iter().enumerate() {
            if i > 0 {
                out.push(LayoutInstruction::PageBreak);
            }
            out.extend(page.instructions);
        }
        out
    }
}

/// Lay out a report with the given options.
pub fn layout<'a>(input: &'a ReportInput, options: &'a LayoutOptions) -> Layout<'a> {
    LayoutEngine::new(options).layout(input)
}

/// Tracks where we are on the current page during layout.
#[derive(Debug)]
struct PageCursor<'a> {
    geometry: PageGeometry,
    /// Next baseline position.
    y: f64,
    instructions: Vec<LayoutInstruction<'a>>,
}

impl<'a> PageCursor<'a> {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.margin_y + LINE_ASCENT,
            instructions: Vec::new(),
        }
    }

    fn is_fresh(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Space between the top of the current line band and the bottom margin.
    fn remaining_height(&self) -> f64 {
        (self.geometry.height - self.geometry.margin_y - (self.y - LINE_ASCENT)).max(0.0)
    }

    fn finalize(&mut self) -> Page<'a> {
        Page {
            instructions: std::mem::take(&mut self.instructions),
        }
    }

    /// Close the current page into `pages` and start a new one.
    fn break_page(&mut self, pages: &mut Vec<Page<'a>>) {
        pages.push(self.finalize());
        *self = PageCursor::new(self.geometry);
        debug!(page = pages.len() + 1, "page break");
    }

    fn push(&mut self, instruction: LayoutInstruction<'a>) {
        self.instructions.push(instruction);
    }

    fn text(&mut self, content: impl Into<String>, x: f64, y: f64, font_size: f64, bold: bool, align: TextAlign) {
        self.push(LayoutInstruction::Text {
            content: content.into(),
            x,
            y,
            font_size,
            bold,
            align,
        });
    }
}

/// The main layout engine.
pub struct LayoutEngine<'o> {
    options: &'o LayoutOptions,
    geometry: PageGeometry,
}

impl<'o> LayoutEngine<'o> {
    pub fn new(options: &'o LayoutOptions) -> Self {
        Self {
            options,
            geometry: options.geometry(),
        }
    }

    /// Main entry point: lay out a report into pages.
    pub fn layout<'a>(&self, input: &'a ReportInput) -> Layout<'a>
    where
        'o: 'a,
    {
        let mut pages: Vec<Page<'a>> = Vec::new();
        let mut cursor = PageCursor::new(self.geometry);

        self.layout_header(input, &mut cursor);
        self.layout_metadata(input, &mut cursor);
        self.layout_description(input, &mut cursor, &mut pages);
        self.layout_observations(input, &mut cursor, &mut pages);

        let photo_slots_used = self.layout_photos(input, &mut cursor, &mut pages);
        self.layout_signatures(input, photo_slots_used, &mut cursor, &mut pages);

        pages.push(cursor.finalize());

        debug!(pages = pages.len(), photos = input.photos.len(), "layout complete");
        Layout {
            geometry: self.geometry,
            pages,
        }
    }

    fn header_baseline(&self) -> f64 {
        self.geometry.margin_y + HEADER_OFFSET
    }

    fn layout_header<'a>(&self, input: &'a ReportInput, cursor: &mut PageCursor<'a>)
    where
        'o: 'a,
    {
        let g = &self.geometry;
        let sizes = &self.options.font_sizes;
        let labels = &self.options.labels;
        let baseline = self.header_baseline();

        if let Some(logo) = self.options.logo.as_deref() {
            cursor.push(LayoutInstruction::Image {
                bytes: logo,
                x: g.margin_x,
                y: (baseline - LOGO_HEIGHT / 2.0).max(0.0),
                w: LOGO_WIDTH,
                h: LOGO_HEIGHT,
            });
        }

        cursor.text(&labels.title, g.width / 2.0, baseline, sizes.title, true, TextAlign::Center);
        cursor.text(
            format!("{}: {}", labels.date, format_date(input.date)),
            g.width - g.margin_x,
            baseline,
            sizes.date,
            false,
            TextAlign::Right,
        );

        cursor.y = baseline + METADATA_OFFSET;
    }

    fn layout_metadata(&self, input: &ReportInput, cursor: &mut PageCursor<'_>) {
        let labels = &self.options.labels;
        let placeholder = labels.placeholder.as_str();
        let rows = [
            (&labels.site, &input.site),
            (&labels.technician, &input.technician),
            (&labels.responsible, &input.responsible),
        ];
        let body = self.options.font_sizes.body;
        for (label, value) in rows {
            let line = format!("{}: {}", label, or_placeholder(value, placeholder));
            // Long values wrap within the margins, pushing later rows down.
            for part in wrap_text(&line, self.geometry.usable_width(), StandardFont::Helvetica, body) {
                let y = cursor.y;
                cursor.text(part, self.geometry.margin_x, y, body, false, TextAlign::Left);
                cursor.y += METADATA_LINE;
            }
        }
    }

    /// Description lines flow onto following pages when they reach the bottom
    /// margin. On a page with room the cursor ends `lines × 6 + 6` below the
    /// first line.
    fn layout_description<'a>(
        &self,
        input: &ReportInput,
        cursor: &mut PageCursor<'a>,
        pages: &mut Vec<Page<'a>>,
    ) {
        let g = self.geometry;
        let body = self.options.font_sizes.body;
        let labels = &self.options.labels;

        let label_y = cursor.y;
        cursor.text(&labels.description, g.margin_x, label_y, body, true, TextAlign::Left);
        cursor.y += LABEL_LINE;

        let text = or_placeholder(&input.description, &labels.placeholder);
        let lines = wrap_text(text, g.usable_width(), StandardFont::Helvetica, body);
        debug!(lines = lines.len(), "description wrapped");

        let mut rest: &[String] = &lines;
        while !rest.is_empty() {
            let heights = vec![BODY_LINE; rest.len()];
            let decision = decide_break(
                cursor.remaining_height(),
                &heights,
                true,
                MIN_ORPHAN_LINES,
                MIN_WIDOW_LINES,
            );
            let take = match decision {
                BreakDecision::Place => rest.len(),
                BreakDecision::Split {
                    items_on_current_page,
                } => items_on_current_page,
                // Nothing gained by moving to a page that is already empty.
                BreakDecision::MoveToNextPage if cursor.is_fresh() => rest.len(),
                BreakDecision::MoveToNextPage => 0,
            };

            for line in &rest[..take] {
                let y = cursor.y;
                cursor.text(line.as_str(), g.margin_x, y, body, false, TextAlign::Left);
                cursor.y += BODY_LINE;
            }
            rest = &rest[take..];

            if !rest.is_empty() {
                cursor.break_page(pages);
            }
        }

        cursor.y += BLOCK_GAP;
    }

    /// Height of the observation box for `lines` wrapped lines.
    pub fn observation_box_height(lines: usize) -> f64 {
        (lines as f64 * BODY_LINE + BLOCK_GAP).max(OBSERVATION_MIN_HEIGHT)
    }

    fn layout_observations<'a>(
        &self,
        input: &ReportInput,
        cursor: &mut PageCursor<'a>,
        pages: &mut Vec<Page<'a>>,
    ) {
        let g = self.geometry;
        let body = self.options.font_sizes.body;
        let labels = &self.options.labels;

        let text = or_placeholder(&input.observations, &labels.placeholder);
        let lines = wrap_text(
            text,
            g.usable_width() - 2.0 * OBSERVATION_INSET,
            StandardFont::Helvetica,
            body,
        );
        let box_height = Self::observation_box_height(lines.len());

        // Label and box move together; the box is never split.
        let block_height = LINE_ASCENT + OBSERVATION_LABEL_GAP + box_height;
        if decide_break(cursor.remaining_height(), &[block_height], false, 0, 0)
            == BreakDecision::MoveToNextPage
            && !cursor.is_fresh()
        {
            debug!(block_height, "observations moved to next page");
            cursor.break_page(pages);
        }

        let label_y = cursor.y;
        cursor.text(&labels.observations, g.margin_x, label_y, body, true, TextAlign::Left);

        let box_top = label_y + OBSERVATION_LABEL_GAP;
        cursor.push(LayoutInstruction::Rect {
            x: g.margin_x,
            y: box_top,
            w: g.usable_width(),
            h: box_height,
            line_width: BOX_LINE_WIDTH,
            radius: OBSERVATION_RADIUS,
        });

        let first_baseline = box_top + OBSERVATION_INSET + LINE_ASCENT;
        for (i, line) in lines.into_iter().enumerate() {
            cursor.text(
                line,
                g.margin_x + OBSERVATION_INSET,
                first_baseline + i as f64 * BODY_LINE,
                body,
                false,
                TextAlign::Left,
            );
        }

        cursor.y = box_top + box_height + AFTER_BOX_GAP;
    }

    /// Place photos in the grid. Returns how many slots are used on the last
    /// photo page, or `None` when there are no photos.
    fn layout_photos<'a>(
        &self,
        input: &'a ReportInput,
        cursor: &mut PageCursor<'a>,
        pages: &mut Vec<Page<'a>>,
    ) -> Option<usize> {
        if input.photos.is_empty() {
            return None;
        }

        let grid = PhotoGrid::new(self.geometry, self.options.slots());
        let caption_size = self.options.font_sizes.caption;

        // Photos always start on their own page.
        cursor.break_page(pages);
        let mut slot = 0;

        for (n, photo) in input.photos.iter().enumerate() {
            if decide_photo(slot, grid.slots()) == BreakDecision::MoveToNextPage {
                cursor.break_page(pages);
                slot = 0;
            }

            let caption = if photo.caption.trim().is_empty() {
                format!("{} {}", self.options.labels.photo, n + 1)
            } else {
                photo.caption.trim().to_string()
            };
            cursor.text(
                caption,
                grid.caption_x(),
                grid.caption_baseline(slot),
                caption_size,
                false,
                TextAlign::Center,
            );

            let rect = grid.image_rect(slot);
            cursor.push(LayoutInstruction::Image {
                bytes: photo.image.as_slice(),
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
            });
            cursor.push(LayoutInstruction::Rect {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                line_width: PHOTO_FRAME_LINE_WIDTH,
                radius: 0.0,
            });
            debug!(photo = n + 1, slot, page = pages.len() + 1, "photo placed");

            slot += 1;
            cursor.y = grid.occupied_bottom(slot);
        }

        Some(slot)
    }

    fn layout_signatures<'a>(
        &self,
        input: &'a ReportInput,
        photo_slots_used: Option<usize>,
        cursor: &mut PageCursor<'a>,
        pages: &mut Vec<Page<'a>>,
    ) {
        let g = self.geometry;

        let label_y = match photo_slots_used {
            Some(used) => {
                let grid = PhotoGrid::new(g, self.options.slots());
                let label_y = g.height - SIGNATURE_BOTTOM_OFFSET;
                let decision =
                    decide_signatures_after_photos(grid.occupied_bottom(used), label_y - LINE_ASCENT);
                if decision == BreakDecision::MoveToNextPage {
                    debug!("last photo page is full, signatures on a new page");
                    cursor.break_page(pages);
                }
                label_y
            }
            None => {
                if decide_signatures_after_text(cursor.y, g.height, SIGNATURE_MIN_SPACE)
                    == BreakDecision::MoveToNextPage
                {
                    debug!(cursor_y = cursor.y, "not enough room, signatures on a new page");
                    cursor.break_page(pages);
                    self.header_baseline()
                } else {
                    cursor.y
                }
            }
        };

        let labels = &self.options.labels;
        let left_x = g.margin_x;
        let right_x = g.width - g.margin_x - SIGNATURE_WIDTH;
        self.place_signature(cursor, &labels.technician_signature, &input.technician_signature, left_x, label_y);
        self.place_signature(cursor, &labels.responsible_signature, &input.responsible_signature, right_x, label_y);

        cursor.y = label_y + SIGNATURE_IMAGE_GAP + SIGNATURE_HEIGHT;
    }

    fn place_signature<'a>(
        &self,
        cursor: &mut PageCursor<'a>,
        label: &str,
        signature: &'a Signature,
        x: f64,
        label_y: f64,
    ) {
        cursor.text(label, x, label_y, self.options.font_sizes.signature, false, TextAlign::Left);
        match signature.image_bytes() {
            Some(bytes) => cursor.push(LayoutInstruction::Image {
                bytes,
                x,
                y: label_y + SIGNATURE_IMAGE_GAP,
                w: SIGNATURE_WIDTH,
                h: SIGNATURE_HEIGHT,
            }),
            None => warn!(label, "signature pad left blank, image omitted"),
        }
    }
}
