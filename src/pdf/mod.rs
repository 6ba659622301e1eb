//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. The report only needs two standard
//! fonts, stroked rectangles and raster images, so the subset of the format
//! we write is small.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, images, pages, content streams)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates are millimetres from the top-left corner. PDF user
//! space is points from the bottom-left, so every coordinate is scaled by
//! [`PT_PER_MM`] and flipped against the page height on the way out.

use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;
use tracing::debug;

use crate::error::MinutaError;
use crate::font::{StandardFont, PT_PER_MM};
use crate::image_loader::{decode_image_bytes, ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{Layout, LayoutInstruction, Page, TextAlign};

/// Bezier control point factor for approximating a quarter circle.
const KAPPA: f64 = 0.5522847498;

/// Entries for the PDF Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Object ids of /F0 (regular) and /F1 (bold).
    font_objects: [usize; 2],
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write a laid-out report to a PDF byte vector.
    ///
    /// Fails only when an image instruction carries bytes that cannot be
    /// decoded; no partial document is returned in that case.
    pub fn write(&self, layout: &Layout<'_>, info: &DocumentInfo) -> Result<Vec<u8>, MinutaError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: [0, 0],
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then images, page objects and content streams
        builder.push(Vec::new());
        builder.push(Vec::new());
        builder.push(Vec::new());

        self.register_fonts(&mut builder);

        let page_width = layout.geometry.width * PT_PER_MM;
        let page_height = layout.geometry.height * PT_PER_MM;
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in layout.pages.iter().enumerate() {
            let image_ids = self.register_images(&mut builder, page, page_idx)?;
            let content = self.build_content_stream(page, page_height);
            let compressed = compress_to_vec_zlib(&content, 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let xobject_resources = if image_ids.is_empty() {
                String::new()
            } else {
                let entries = image_ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("/Im{} {} 0 R", i, id))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(" /XObject << {} >>", entries)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >>{} >> >>",
                page_width,
                page_height,
                content_obj_id,
                self.build_font_resource_dict(&builder.font_objects),
                xobject_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
            debug!(page = page_idx + 1, images = image_ids.len(), "page written");
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(Self::build_info_dict(info));

        Ok(self.serialize(&builder, info_obj_id))
    }

    fn register_fonts(&self, builder: &mut PdfBuilder) {
        for font in [StandardFont::Helvetica, StandardFont::HelveticaBold] {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.push(font_dict.into_bytes());
            builder.font_objects[Self::font_slot(font)] = id;
        }
    }

    fn font_slot(font: StandardFont) -> usize {
        match font {
            StandardFont::Helvetica => 0,
            StandardFont::HelveticaBold => 1,
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[usize; 2]) -> String {
        [StandardFont::Helvetica, StandardFont::HelveticaBold]
            .iter()
            .map(|font| {
                format!(
                    "/{} {} 0 R",
                    font.resource_name(),
                    font_objects[Self::font_slot(*font)]
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decode every image on the page and write it as an XObject. Returns
    /// the object ids in drawing order, which is also the /ImN numbering.
    fn register_images(
        &self,
        builder: &mut PdfBuilder,
        page: &Page<'_>,
        page_idx: usize,
    ) -> Result<Vec<usize>, MinutaError> {
        let mut ids = Vec::new();
        for instruction in &page.instructions {
            if let LayoutInstruction::Image { bytes, .. } = instruction {
                let image = decode_image_bytes(bytes).map_err(|message| {
                    MinutaError::image(
                        format!("image {} on page {}", ids.len() + 1, page_idx + 1),
                        message,
                    )
                })?;
                ids.push(Self::write_image_xobject(builder, &image));
            }
        }
        Ok(ids)
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask goes first so the image can reference it
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.push(smask_data)
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }
        }
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &Page<'_>, page_height: f64) -> Vec<u8> {
        let mut stream: Vec<u8> = Vec::new();
        let mut image_idx = 0;

        for instruction in &page.instructions {
            match instruction {
                LayoutInstruction::Text {
                    content,
                    x,
                    y,
                    font_size,
                    bold,
                    align,
                } => {
                    let font = StandardFont::for_weight(*bold);
                    let width = font.measure_mm(content, *font_size);
                    let left = match align {
                        TextAlign::Left => *x,
                        TextAlign::Center => *x - width / 2.0,
                        TextAlign::Right => *x - width,
                    };
                    let _ = write!(
                        stream,
                        "BT\n0 0 0 rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                        font.resource_name(),
                        font_size,
                        left * PT_PER_MM,
                        page_height - y * PT_PER_MM
                    );
                    stream.extend_from_slice(&Self::encode_pdf_string(content));
                    stream.extend_from_slice(b") Tj\nET\n");
                }

                LayoutInstruction::Image { x, y, w, h, .. } => {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        w * PT_PER_MM,
                        h * PT_PER_MM,
                        x * PT_PER_MM,
                        page_height - (y + h) * PT_PER_MM,
                        image_idx
                    );
                    image_idx += 1;
                }

                LayoutInstruction::Rect {
                    x,
                    y,
                    w,
                    h,
                    line_width,
                    radius,
                } => {
                    let px = x * PT_PER_MM;
                    let py = page_height - (y + h) * PT_PER_MM;
                    let pw = w * PT_PER_MM;
                    let ph = h * PT_PER_MM;
                    let _ = write!(stream, "q\n0 0 0 RG\n{:.2} w\n", line_width * PT_PER_MM);
                    if *radius > 0.0 {
                        Self::write_rounded_rect(&mut stream, px, py, pw, ph, radius * PT_PER_MM);
                    } else {
                        let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n", px, py, pw, ph);
                    }
                    let _ = write!(stream, "S\nQ\n");
                }

                // Pages are already split; a stray break is meaningless here.
                LayoutInstruction::PageBreak => {}
            }
        }

        stream
    }

    /// Path for a rectangle with four equal rounded corners, in PDF space.
    fn write_rounded_rect(stream: &mut Vec<u8>, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let r = radius.min(w / 2.0).min(h / 2.0);
        let k = KAPPA * r;

        let _ = write!(stream, "{:.2} {:.2} m\n", x + r, y);

        let _ = write!(stream, "{:.2} {:.2} l\n", x + w - r, y);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + w - r + k, y,
            x + w, y + r - k,
            x + w, y + r
        );

        let _ = write!(stream, "{:.2} {:.2} l\n", x + w, y + h - r);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + w, y + h - r + k,
            x + w - r + k, y + h,
            x + w - r, y + h
        );

        let _ = write!(stream, "{:.2} {:.2} l\n", x + r, y + h);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x + r - k, y + h,
            x, y + h - r + k,
            x, y + h - r
        );

        let _ = write!(stream, "{:.2} {:.2} l\n", x, y + r);
        let _ = write!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
            x, y + r - k,
            x + r - k, y,
            x + r, y
        );

        let _ = write!(stream, "h\n");
    }

    fn build_info_dict(info: &DocumentInfo) -> Vec<u8> {
        let mut dict: Vec<u8> = b"<< ".to_vec();
        for (key, value) in [
            ("Title", &info.title),
            ("Author", &info.author),
            ("Subject", &info.subject),
        ] {
            if let Some(value) = value {
                let _ = write!(dict, "/{} (", key);
                dict.extend_from_slice(&Self::encode_pdf_string(value));
                dict.extend_from_slice(b") ");
            }
        }
        dict.extend_from_slice(b"/Producer (minuta) /Creator (minuta) >>");
        dict
    }

    /// Encode a string as WinAnsi bytes for a literal PDF string, escaping
    /// the delimiters. Characters outside WinAnsi become `?`.
    fn encode_pdf_string(s: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '\\' => out.extend_from_slice(b"\\\\"),
                '(' => out.extend_from_slice(b"\\("),
                ')' => out.extend_from_slice(b"\\)"),
                _ => out.push(Self::unicode_to_winansi(ch).unwrap_or(b'?')),
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// contains special mappings for smart quotes, bullets, dashes, etc.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82), // Single low-9 quotation mark
            0x0192 => Some(0x83), // Latin small letter f with hook
            0x201E => Some(0x84), // Double low-9 quotation mark
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86), // Dagger
            0x2021 => Some(0x87), // Double dagger
            0x02C6 => Some(0x88), // Modifier letter circumflex accent
            0x2030 => Some(0x89), // Per mille sign
            0x0160 => Some(0x8A), // Latin capital letter S with caron
            0x2039 => Some(0x8B), // Single left-pointing angle quotation
            0x0152 => Some(0x8C), // Latin capital ligature OE
            0x017D => Some(0x8E), // Latin capital letter Z with caron
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98), // Small tilde
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A), // Latin small letter s with caron
            0x203A => Some(0x9B), // Single right-pointing angle quotation
            0x0153 => Some(0x9C), // Latin small ligature oe
            0x017E => Some(0x9E), // Latin small letter z with caron
            0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::tests::{jpeg_bytes, png_bytes};
    use crate::model::{PageConfig, PageGeometry};

    fn geometry() -> PageGeometry {
        PageConfig::default().geometry()
    }

    fn one_page(instructions: Vec<LayoutInstruction<'_>>) -> Layout<'_> {
        Layout {
            geometry: geometry(),
            pages: vec![Page { instructions }],
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn text(content: &str, x: f64, y: f64, align: TextAlign) -> LayoutInstruction<'static> {
        LayoutInstruction::Text {
            content: content.to_string(),
            x,
            y,
            font_size: 11.0,
            bold: false,
            align,
        }
    }

    #[test]
    fn test_encode_pdf_string() {
        assert_eq!(
            PdfWriter::encode_pdf_string("Hello (World)"),
            b"Hello \\(World\\)".to_vec()
        );
        assert_eq!(PdfWriter::encode_pdf_string("Técnico"), b"T\xe9cnico".to_vec());
        assert_eq!(PdfWriter::encode_pdf_string("a\u{4e2d}b"), b"a?b".to_vec());
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let layout = Layout {
            geometry: geometry(),
            pages: vec![Page::default()],
        };
        let bytes = PdfWriter::new().write(&layout, &DocumentInfo::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/Count 1"));
    }

    #[test]
    fn test_a4_media_box_in_points() {
        let layout = one_page(vec![]);
        let bytes = PdfWriter::new().write(&layout, &DocumentInfo::default()).unwrap();
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let info = DocumentInfo {
            title: Some("Minuta - Sede Central".to_string()),
            author: Some("Ana".to_string()),
            subject: None,
        };
        let bytes = PdfWriter::new().write(&one_page(vec![]), &info).unwrap();
        assert!(contains(&bytes, b"/Title (Minuta - Sede Central)"));
        assert!(contains(&bytes, b"/Author (Ana)"));
        assert!(!contains(&bytes, b"/Subject"));
        assert!(contains(&bytes, b"/Info "));
    }

    #[test]
    fn test_both_fonts_registered() {
        let bytes = PdfWriter::new()
            .write(&one_page(vec![]), &DocumentInfo::default())
            .unwrap();
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
        assert!(contains(&bytes, b"/F0 3 0 R /F1 4 0 R"));
    }

    #[test]
    fn test_text_is_flipped_and_scaled() {
        let page = Page {
            instructions: vec![text("Hola", 15.0, 20.0, TextAlign::Left)],
        };
        let stream = PdfWriter::new().build_content_stream(&page, 841.89);
        let stream = String::from_utf8(stream).unwrap();
        // 15mm = 42.52pt, 841.89 - 20mm = 785.20pt
        assert!(stream.contains("/F0 11.0 Tf\n42.52 785.20 Td\n(Hola) Tj"), "{stream}");
    }

    #[test]
    fn test_alignment_shifts_origin() {
        let width = StandardFont::Helvetica.measure_mm("Fecha", 11.0);
        let page = Page {
            instructions: vec![
                text("Fecha", 100.0, 20.0, TextAlign::Right),
                text("Fecha", 100.0, 30.0, TextAlign::Center),
            ],
        };
        let stream = String::from_utf8(PdfWriter::new().build_content_stream(&page, 841.89)).unwrap();
        let right = format!("{:.2} ", (100.0 - width) * PT_PER_MM);
        let center = format!("{:.2} ", (100.0 - width / 2.0) * PT_PER_MM);
        assert!(stream.contains(&right));
        assert!(stream.contains(&center));
    }

    #[test]
    fn test_rounded_rect_uses_curves() {
        let page = Page {
            instructions: vec![LayoutInstruction::Rect {
                x: 15.0,
                y: 80.0,
                w: 180.0,
                h: 30.0,
                line_width: 0.3,
                radius: 2.0,
            }],
        };
        let stream = String::from_utf8(PdfWriter::new().build_content_stream(&page, 841.89)).unwrap();
        assert_eq!(stream.matches(" c\n").count(), 4);
        assert!(stream.contains("S\nQ\n"));

        let square = Page {
            instructions: vec![LayoutInstruction::Rect {
                x: 15.0,
                y: 80.0,
                w: 180.0,
                h: 30.0,
                line_width: 0.2,
                radius: 0.0,
            }],
        };
        let stream = String::from_utf8(PdfWriter::new().build_content_stream(&square, 841.89)).unwrap();
        assert!(stream.contains(" re\n"));
        assert!(!stream.contains(" c\n"));
    }

    #[test]
    fn test_jpeg_embedded_with_dct() {
        let jpeg = jpeg_bytes(4, 4);
        let layout = one_page(vec![LayoutInstruction::Image {
            bytes: &jpeg,
            x: 29.4,
            y: 21.0,
            w: 151.2,
            h: 79.0,
        }]);
        let bytes = PdfWriter::new().write(&layout, &DocumentInfo::default()).unwrap();
        assert!(contains(&bytes, b"/Filter /DCTDecode"));
        assert!(contains(&bytes, b"/XObject << /Im0 "));
        assert!(!contains(&bytes, b"/SMask"));
    }

    #[test]
    fn test_transparent_png_gets_smask() {
        let png = png_bytes(4, 2, [0, 0, 0, 128]);
        let layout = one_page(vec![LayoutInstruction::Image {
            bytes: &png,
            x: 15.0,
            y: 230.0,
            w: 60.0,
            h: 25.0,
        }]);
        let bytes = PdfWriter::new().write(&layout, &DocumentInfo::default()).unwrap();
        assert!(contains(&bytes, b"/SMask"));
        assert_eq!(count(&bytes, b"/Subtype /Image"), 2);
    }

    fn image(bytes: &[u8]) -> LayoutInstruction<'_> {
        LayoutInstruction::Image {
            bytes,
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        }
    }

    #[test]
    fn test_image_numbering_per_page() {
        let a = jpeg_bytes(2, 2);
        let b = jpeg_bytes(3, 3);
        let layout = Layout {
            geometry: geometry(),
            pages: vec![
                Page {
                    instructions: vec![image(&a), image(&b)],
                },
                Page {
                    instructions: vec![image(&b)],
                },
            ],
        };
        let bytes = PdfWriter::new().write(&layout, &DocumentInfo::default()).unwrap();
        assert!(contains(&bytes, b"/Count 2"));
        assert_eq!(count(&bytes, b"/Subtype /Image"), 3);
        assert_eq!(count(&bytes, b"/Im1 "), 1);
    }

    #[test]
    fn test_undecodable_image_fails_the_render() {
        let garbage = [0xFF, 0xD8, 0x00, 0x01, 0x02];
        let layout = one_page(vec![image(&garbage)]);
        let err = PdfWriter::new()
            .write(&layout, &DocumentInfo::default())
            .unwrap_err();
        assert!(matches!(err, MinutaError::Image { ref label, .. } if label == "image 1 on page 1"));
    }
}
