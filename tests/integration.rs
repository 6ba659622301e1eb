//! Integration tests for the minuta rendering pipeline.
//!
//! These tests exercise the full path from report input to PDF output.
//! They verify:
//! - JSON deserialization works correctly
//! - Layout engine produces the right number of pages
//! - Photos are grouped per page in input order
//! - Signatures land where they should
//! - PDF output is structurally valid
//! - Image failures abort the render

use minuta::layout::{self, LayoutInstruction, Page};
use minuta::model::*;
use minuta::{prepare_input, render, render_json, MinutaError};

use image::{ColorType, ImageEncoder};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ─── Helpers ────────────────────────────────────────────────────

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ColorType::Rgb8)
        .unwrap();
    buf
}

fn signature_png(alpha: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(120, 50, |x, _| {
        if x % 7 == 0 {
            image::Rgba([0, 0, 0, alpha])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), 120, 50, ColorType::Rgba8)
        .unwrap();
    buf
}

fn base_input() -> ReportInput {
    ReportInput {
        site: "Mall Plaza".to_string(),
        technician: "Camila Rojas".to_string(),
        responsible: "Pedro Soto".to_string(),
        description: "Cambio de luminarias en pasillo de servicio.".to_string(),
        observations: String::new(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        ..Default::default()
    }
}

fn with_photos(mut input: ReportInput, count: usize) -> ReportInput {
    input.photos = (0..count)
        .map(|i| Photo::new(jpeg(64, 48), format!("Foto {}", i + 1)))
        .collect();
    input
}

fn with_signatures(mut input: ReportInput) -> ReportInput {
    input.technician_signature = Signature::captured(signature_png(255));
    input.responsible_signature = Signature::captured(signature_png(255));
    input
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn text_y(page: &Page<'_>, wanted: &str) -> Option<f64> {
    page.instructions.iter().find_map(|i| match i {
        LayoutInstruction::Text { content, y, .. } if content == wanted => Some(*y),
        _ => None,
    })
}

fn text_x(page: &Page<'_>, wanted: &str) -> Option<f64> {
    page.instructions.iter().find_map(|i| match i {
        LayoutInstruction::Text { content, x, .. } if content == wanted => Some(*x),
        _ => None,
    })
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-1.7"), "missing header");
    assert!(bytes.ends_with(b"%%EOF\n"), "missing EOF marker");
    assert_eq!(count(bytes, b"\nxref\n"), 1);
    assert_eq!(count(bytes, b"trailer\n"), 1);
    assert_eq!(count(bytes, b"startxref"), 1);
}

// ─── End-to-end ─────────────────────────────────────────────────

#[test]
fn test_full_report_three_pages() {
    let mut input = with_signatures(with_photos(base_input(), 5));
    input.description = "a".repeat(300);
    let options = LayoutOptions::default();

    let prepared = prepare_input(&input, &options).unwrap();
    let out = layout::layout(&prepared, &options);
    assert_eq!(out.pages.len(), 3);

    // Page 1: header, metadata, description, observations, nothing else
    let first = &out.pages[0];
    let texts = first.texts();
    assert_eq!(texts[0], "MINUTA DE TRABAJO");
    assert_eq!(texts[1], "Fecha: 05-03-2024");
    assert!(texts.contains(&"Sede: Mall Plaza"));
    assert!(texts.contains(&"Técnico: Camila Rojas"));
    assert!(texts.contains(&"Responsable: Pedro Soto"));
    assert!(texts.contains(&"Descripción:"));
    assert!(texts.contains(&"Observaciones:"));
    assert_eq!(first.rects().len(), 1);
    assert!(first.images().is_empty());
    let description_text: String = texts
        .iter()
        .filter(|t| t.starts_with('a'))
        .map(|t| t.trim_end_matches('-'))
        .collect();
    assert_eq!(description_text, "a".repeat(300));

    // Page 2: photos 1-3
    assert_eq!(out.pages[1].images().len(), 3);
    assert_eq!(out.pages[1].texts(), vec!["Foto 1", "Foto 2", "Foto 3"]);

    // Page 3: photos 4-5 plus both signatures at the bottom offset
    let last = &out.pages[2];
    assert_eq!(last.images().len(), 4);
    assert_eq!(text_y(last, "Foto 4"), Some(15.0 + 4.5));
    assert_eq!(text_y(last, "Firma Técnico:"), Some(227.0));
    assert_eq!(text_y(last, "Firma Responsable:"), Some(227.0));
    assert_eq!(text_x(last, "Firma Técnico:"), Some(15.0));
    assert_eq!(text_x(last, "Firma Responsable:"), Some(135.0));

    let pdf = render(&input, &options).unwrap();
    assert_valid_pdf(&pdf);
    assert_eq!(count(&pdf, b"/Type /Page /Parent"), 3);
    assert!(count(&pdf, b"/Title (Minuta - Mall Plaza)") == 1);
}

#[test]
fn test_text_only_report_is_one_page() {
    let input = with_signatures(base_input());
    let pdf = render(&input, &LayoutOptions::default()).unwrap();
    assert_valid_pdf(&pdf);
    assert_eq!(count(&pdf, b"/Type /Page /Parent"), 1);
    // Two signature images, each with a soft mask
    assert_eq!(count(&pdf, b"/SMask"), 2);
}

#[test]
fn test_signatures_below_observations_box() {
    let mut input = with_signatures(base_input());
    input.observations = "Sin novedades.".to_string();
    let options = LayoutOptions::default();
    let out = layout::layout(&input, &options);
    assert_eq!(out.pages.len(), 1);

    let page = &out.pages[0];
    let box_bottom = page
        .rects()
        .iter()
        .find_map(|r| match r {
            LayoutInstruction::Rect { y, h, .. } => Some(y + h),
            _ => None,
        })
        .unwrap();
    let signature_y = text_y(page, "Firma Técnico:").unwrap();
    assert!(signature_y > box_bottom);
    assert_eq!(page.images().len(), 2);
}

#[test]
fn test_blank_signature_keeps_label() {
    let mut input = base_input();
    input.technician_signature = Signature::captured(signature_png(0));
    input.responsible_signature = Signature::captured(signature_png(255));
    let options = LayoutOptions::default();

    let prepared = prepare_input(&input, &options).unwrap();
    let out = layout::layout(&prepared, &options);
    let page = &out.pages[0];
    assert!(text_y(page, "Firma Técnico:").is_some());
    assert!(text_y(page, "Firma Responsable:").is_some());
    assert_eq!(page.images().len(), 1);
}

#[test]
fn test_empty_fields_use_placeholder() {
    let input = ReportInput {
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        ..Default::default()
    };
    let opts = LayoutOptions::default();
    let out = layout::layout(&input, &opts);
    let texts = out.pages[0].texts();
    assert!(texts.contains(&"Sede: -"));
    assert!(texts.contains(&"Técnico: -"));
    assert!(texts.contains(&"Responsable: -"));
}

// ─── JSON ───────────────────────────────────────────────────────

#[test]
fn test_render_from_json() {
    use base64::Engine;
    let photo = base64::engine::general_purpose::STANDARD.encode(jpeg(32, 32));
    let json = format!(
        r#"{{
            "site": "Costanera",
            "technician": "Ana",
            "date": "2024-03-05",
            "photos": [
                {{ "image": "data:image/jpeg;base64,{photo}", "caption": "Tablero" }},
                {{ "image": "{photo}" }}
            ],
            "technicianSignature": "",
            "responsibleSignature": null
        }}"#
    );
    let pdf = render_json(&json, Some(r#"{ "slotsPerPage": 1 }"#)).unwrap();
    assert_valid_pdf(&pdf);
    // Text page, two single-photo pages, and a signature page
    assert_eq!(count(&pdf, b"/Type /Page /Parent"), 4);
}

#[test]
fn test_custom_page_size_from_options() {
    let options: LayoutOptions =
        serde_json::from_str(r#"{ "page": { "size": "Letter" } }"#).unwrap();
    let pdf = render(&base_input(), &options).unwrap();
    assert!(count(&pdf, b"/MediaBox [0 0 612.00 792.00]") == 1);
}

#[test]
fn test_malformed_json_reports_parse_error() {
    let err = render_json("{ not json", None).unwrap_err();
    assert!(matches!(err, MinutaError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse input"));
}

// ─── Failures ───────────────────────────────────────────────────

#[test]
fn test_corrupt_photo_aborts_render() {
    let mut input = with_photos(base_input(), 2);
    input.photos[1].image.truncate(40);
    let err = render(&input, &LayoutOptions::default()).unwrap_err();
    match err {
        MinutaError::Image { label, .. } => assert_eq!(label, "photo 2"),
        other => panic!("expected image error, got {other:?}"),
    }
}

#[test]
fn test_truncated_jpeg_photo_aborts_render() {
    let mut input = with_photos(base_input(), 1);
    let full = input.photos[0].image.len();
    input.photos[0].image.truncate(full - full / 3);
    let err = render(&input, &LayoutOptions::default()).unwrap_err();
    match err {
        MinutaError::Image { label, .. } => assert_eq!(label, "photo 1"),
        other => panic!("expected image error, got {other:?}"),
    }
}

#[test]
fn test_truncated_jpeg_signature_and_logo_abort_render() {
    let mut cut = jpeg(64, 48);
    cut.truncate(cut.len() - cut.len() / 3);

    let mut input = base_input();
    input.technician_signature = Signature::captured(cut.clone());
    let err = render(&input, &LayoutOptions::default()).unwrap_err();
    assert!(
        matches!(err, MinutaError::Image { ref label, .. } if label == "technician signature")
    );

    let options = LayoutOptions { logo: Some(cut), ..Default::default() };
    let err = render(&base_input(), &options).unwrap_err();
    assert!(matches!(err, MinutaError::Image { ref label, .. } if label == "logo"));
}

#[test]
fn test_json_image_fields_never_read_files() {
    let json = r#"{ "site": "Costanera", "photos": [ { "image": "./visit/photo1.jpg" } ] }"#;
    let err = render_json(json, None).unwrap_err();
    assert!(matches!(err, MinutaError::Parse { .. }));
}

#[test]
fn test_corrupt_signature_aborts_render() {
    let mut input = base_input();
    input.responsible_signature = Signature::captured(b"\x89PNG\r\n\x1a\nbroken".to_vec());
    let err = render(&input, &LayoutOptions::default()).unwrap_err();
    assert!(
        matches!(err, MinutaError::Image { ref label, .. } if label == "responsible signature")
    );
}

// ─── Properties ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn photos_are_grouped_in_order(count in 1usize..14, slots in 1usize..5) {
        let mut input = base_input();
        input.photos = (0..count)
            .map(|i| Photo::new(vec![i as u8], format!("P{i}")))
            .collect();
        let options = LayoutOptions { slots_per_page: slots, ..Default::default() };
        let out = layout::layout(&input, &options);

        let photo_pages = (count + slots - 1) / slots;
        let full_last_page = count % slots == 0;
        prop_assert_eq!(out.pages.len(), 1 + photo_pages + usize::from(full_last_page));

        let mut captions = Vec::new();
        for (p, page) in out.pages[1..=photo_pages].iter().enumerate() {
            let expected = if p + 1 < photo_pages { slots } else { count - slots * (photo_pages - 1) };
            let photo_images = page
                .images()
                .iter()
                .filter(|i| matches!(i, LayoutInstruction::Image { bytes, .. } if bytes.len() == 1))
                .count();
            prop_assert_eq!(photo_images, expected);
            captions.extend(page.texts().into_iter().filter(|t| t.starts_with('P')).map(str::to_string));
        }
        let wanted: Vec<String> = (0..count).map(|i| format!("P{i}")).collect();
        prop_assert_eq!(captions, wanted);
    }
}
