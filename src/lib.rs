//! # Minuta
//!
//! A PDF renderer for service-visit reports ("minutas de trabajo").
//!
//! A field technician fills in the site, the people involved, a description
//! of the work, observations, a handful of photos and two signatures. This
//! crate turns that into a printable document with a fixed, predictable
//! structure: a header and the text fields on the first page, photos three
//! to a page, and both signatures at the end.
//!
//! Layout is page-native. The engine walks a cursor down each page and every
//! block is placed with the page boundary as a hard constraint, so content
//! flows *into* pages rather than being sliced after the fact.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]        — ReportInput + LayoutOptions
//!       ↓
//!   [image_loader] — Downscale photos, detect blank signatures
//!       ↓
//!   [layout]       — Page-aware layout into drawing instructions
//!       ↓
//!   [pdf]          — Serialize to PDF bytes
//! ```

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod mail;
pub mod model;
pub mod pdf;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use tracing::{debug, info};

pub use error::MinutaError;
pub use layout::{Layout, LayoutInstruction, TextAlign};
pub use model::{LayoutOptions, PageSize, Photo, ReportInput, Signature};

use image_loader::{decode_image_bytes, prepare_photo};
use pdf::{DocumentInfo, PdfWriter};

/// Render a report to PDF bytes.
///
/// This is the primary entry point. Photos are downscaled, blank signatures
/// are dropped and the logo is validated before layout; any image that fails
/// to decode aborts the whole render.
pub fn render(input: &ReportInput, options: &LayoutOptions) -> Result<Vec<u8>, MinutaError> {
    let prepared = prepare_input(input, options)?;
    let layout = layout::layout(&prepared, options);
    let page_count = layout.pages.len();

    let bytes = PdfWriter::new().write(&layout, &document_info(&prepared, options))?;
    info!(
        site = %prepared.site,
        pages = page_count,
        photos = prepared.photos.len(),
        bytes = bytes.len(),
        "rendered report"
    );
    Ok(bytes)
}

/// Render a report described as JSON to PDF bytes. `options_json` of `None`
/// uses the default options.
pub fn render_json(input_json: &str, options_json: Option<&str>) -> Result<Vec<u8>, MinutaError> {
    let input: ReportInput = serde_json::from_str(input_json)?;
    let options = parse_options(options_json)?;
    render(&input, &options)
}

/// Parse an options document, or return the defaults.
pub fn parse_options(options_json: Option<&str>) -> Result<LayoutOptions, MinutaError> {
    match options_json {
        Some(json) => Ok(serde_json::from_str(json)?),
        None => Ok(LayoutOptions::default()),
    }
}

/// Lay out a report and return the instruction stream as pretty JSON,
/// with image bytes summarised as their lengths.
pub fn dump_layout(input: &ReportInput, options: &LayoutOptions) -> Result<String, MinutaError> {
    let prepared = prepare_input(input, options)?;
    let layout = layout::layout(&prepared, options);
    serde_json::to_string_pretty(&layout).map_err(|e| MinutaError::Render(e.to_string()))
}

/// Prepare images for layout: downscale and re-encode photos in input order,
/// clear signatures that are fully transparent, and make sure the logo
/// decodes.
pub fn prepare_input(input: &ReportInput, options: &LayoutOptions) -> Result<ReportInput, MinutaError> {
    let mut prepared = input.clone();

    for (i, photo) in prepared.photos.iter_mut().enumerate() {
        let original_len = photo.image.len();
        photo.image = prepare_photo(&photo.image, options.photo_max_width_px, options.jpeg_quality)
            .map_err(|message| MinutaError::image(format!("photo {}", i + 1), message))?;
        debug!(photo = i + 1, original_len, prepared_len = photo.image.len(), "photo prepared");
    }

    for (label, signature) in [
        ("technician signature", &mut prepared.technician_signature),
        ("responsible signature", &mut prepared.responsible_signature),
    ] {
        let blank = match signature.image_bytes() {
            Some(bytes) => decode_image_bytes(bytes)
                .map_err(|message| MinutaError::image(label, message))?
                .is_blank(),
            None => false,
        };
        if blank {
            debug!(label, "signature has no visible pixels");
            signature.clear();
        }
    }

    if let Some(logo) = &options.logo {
        decode_image_bytes(logo).map_err(|message| MinutaError::image("logo", message))?;
    }

    Ok(prepared)
}

/// The download name for a report: `Minuta_<site>.pdf`.
///
/// The site is trimmed and falls back to `sede` when empty. Path separators
/// and characters reserved by common filesystems become `_`.
pub fn output_file_name(site: &str) -> String {
    let site = site.trim();
    let site = if site.is_empty() { "sede" } else { site };
    let safe: String = site
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("Minuta_{}.pdf", safe)
}

fn document_info(input: &ReportInput, options: &LayoutOptions) -> DocumentInfo {
    let placeholder = options.labels.placeholder.as_str();
    DocumentInfo {
        title: Some(format!(
            "Minuta - {}",
            text::or_placeholder(input.site.trim(), placeholder)
        )),
        author: Some(input.technician.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        subject: Some(options.labels.title.clone()),
    }
}
