//! # Report Model
//!
//! The input representation for the renderer: the visit data captured by the
//! form ([`ReportInput`]) and the knobs that select a layout variant
//! ([`LayoutOptions`]). Both deserialize from camelCase JSON with defaults for
//! everything optional, so a minimal document is just the text fields.
//!
//! All lengths here are millimetres. Font sizes are points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Everything captured for one service visit. Built fresh per render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub technician: String,
    #[serde(default)]
    pub responsible: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub observations: String,

    /// Photos in caption-display order. The order is preserved in the output.
    #[serde(default)]
    pub photos: Vec<Photo>,

    #[serde(default)]
    pub technician_signature: Signature,
    #[serde(default)]
    pub responsible_signature: Signature,

    /// Visit date. Defaults to today when omitted from JSON.
    #[serde(default = "today")]
    pub date: NaiveDate,
}

/// An attached photograph with an optional caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Encoded image bytes (JPEG or PNG).
    #[serde(with = "image_source")]
    pub image: Vec<u8>,
    #[serde(default)]
    pub caption: String,
}

impl Photo {
    pub fn new(image: Vec<u8>, caption: impl Into<String>) -> Self {
        Self {
            image,
            caption: caption.into(),
        }
    }
}

/// The captured state of a signature pad: blank, or an encoded image.
///
/// Clearing the pad replaces the value with the blank state; nothing else
/// holds a reference to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature {
    #[serde(with = "image_source::option")]
    image: Option<Vec<u8>>,
}

impl Signature {
    pub fn blank() -> Self {
        Self { image: None }
    }

    pub fn captured(image: Vec<u8>) -> Self {
        Self { image: Some(image) }
    }

    pub fn is_blank(&self) -> bool {
        self.image.is_none()
    }

    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn clear(&mut self) {
        self.image = None;
    }
}

fn today() -> NaiveDate {
    #[cfg(all(target_arch = "wasm32", feature = "wasm"))]
    {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(
            now.get_full_year() as i32,
            now.get_month() + 1,
            now.get_date(),
        )
        .unwrap_or_default()
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
    {
        chrono::Local::now().date_naive()
    }
}

// ── Options ─────────────────────────────────────────────────────

/// Configuration selecting a layout variant. Every field has a default, so
/// `{}` is a valid options document (A4, 3 photos per page, Spanish labels).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub page: PageConfig,

    /// Photos per page in the photo grid.
    pub slots_per_page: usize,

    pub labels: Labels,

    pub font_sizes: FontSizes,

    /// Optional header logo drawn top-left on page 1.
    #[serde(with = "image_source::option", skip_serializing_if = "Option::is_none")]
    pub logo: Option<Vec<u8>>,

    /// Photos wider than this (in pixels) are downscaled before embedding.
    pub photo_max_width_px: u32,

    /// JPEG quality (1-100) used when photos are re-encoded.
    pub jpeg_quality: u8,

    pub mail: MailOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            slots_per_page: 3,
            labels: Labels::default(),
            font_sizes: FontSizes::default(),
            logo: None,
            photo_max_width_px: 600,
            jpeg_quality: 70,
            mail: MailOptions::default(),
        }
    }
}

impl LayoutOptions {
    /// Page geometry derived from the page config.
    pub fn geometry(&self) -> PageGeometry {
        self.page.geometry()
    }

    /// Slots per page, never zero.
    pub fn slots(&self) -> usize {
        self.slots_per_page.max(1)
    }
}

/// Page size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub size: PageSize,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin_x: 15.0,
            margin_y: 15.0,
        }
    }
}

impl PageConfig {
    pub fn geometry(&self) -> PageGeometry {
        let (width, height) = self.size.dimensions();
        PageGeometry {
            width,
            height,
            margin_x: self.margin_x,
            margin_y: self.margin_y,
        }
    }
}

/// Standard page sizes in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Fixed page geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl PageGeometry {
    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin_x
    }

    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin_y
    }
}

/// Every user-visible string the layout emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    pub title: String,
    pub date: String,
    pub site: String,
    pub technician: String,
    pub responsible: String,
    pub description: String,
    pub observations: String,
    /// Caption prefix for photos without a caption ("Fotografía 3").
    pub photo: String,
    pub technician_signature: String,
    pub responsible_signature: String,
    /// Substituted for empty text fields.
    pub placeholder: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "MINUTA DE TRABAJO".to_string(),
            date: "Fecha".to_string(),
            site: "Sede".to_string(),
            technician: "Técnico".to_string(),
            responsible: "Responsable".to_string(),
            description: "Descripción:".to_string(),
            observations: "Observaciones:".to_string(),
            photo: "Fotografía".to_string(),
            technician_signature: "Firma Técnico:".to_string(),
            responsible_signature: "Firma Responsable:".to_string(),
            placeholder: "-".to_string(),
        }
    }
}

/// Font sizes in points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontSizes {
    pub title: f64,
    pub date: f64,
    pub body: f64,
    pub caption: f64,
    pub signature: f64,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 16.0,
            date: 10.0,
            body: 11.0,
            caption: 10.0,
            signature: 10.0,
        }
    }
}

/// Recipients and subject for the mail compose link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailOptions {
    /// Always-included recipient (e.g. the dispatch inbox). Empty to omit.
    pub default_recipient: String,
    /// Optional additional recipient, typically the store manager.
    pub extra_recipient: Option<String>,
    pub subject_prefix: String,
}

impl Default for MailOptions {
    fn default() -> Self {
        Self {
            default_recipient: String::new(),
            extra_recipient: None,
            subject_prefix: "Minuta de trabajo".to_string(),
        }
    }
}

/// Serde adapter for image fields: accepts a data URI or raw
/// base64 on input and writes a base64 string on output.
pub(crate) mod image_source {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        use base64::Engine;
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let src = String::deserialize(deserializer)?;
        crate::image_loader::read_source_bytes(&src).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(b) => super::serialize(b, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                // An empty string is what a cleared pad serializes to in most forms.
                Some(src) if src.trim().is_empty() => Ok(None),
                Some(src) => crate::image_loader::read_source_bytes(&src)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_report_json() {
        let input: ReportInput =
            serde_json::from_str(r#"{ "site": "Mall Plaza", "date": "2024-03-05" }"#).unwrap();
        assert_eq!(input.site, "Mall Plaza");
        assert_eq!(input.technician, "");
        assert!(input.photos.is_empty());
        assert!(input.technician_signature.is_blank());
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn signature_accepts_null_and_empty() {
        let input: ReportInput = serde_json::from_str(
            r#"{ "technicianSignature": null, "responsibleSignature": "" }"#,
        )
        .unwrap();
        assert!(input.technician_signature.is_blank());
        assert!(input.responsible_signature.is_blank());
    }

    #[test]
    fn photo_from_base64() {
        let input: ReportInput = serde_json::from_str(
            r#"{ "photos": [{ "image": "data:image/png;base64,AQID", "caption": "Tablero" }] }"#,
        )
        .unwrap();
        assert_eq!(input.photos.len(), 1);
        assert_eq!(input.photos[0].image, vec![1, 2, 3]);
        assert_eq!(input.photos[0].caption, "Tablero");
    }

    #[test]
    fn bad_base64_is_an_error() {
        let result: Result<ReportInput, _> =
            serde_json::from_str(r#"{ "photos": [{ "image": "not base64!!" }] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn signature_clear_returns_to_blank() {
        let mut sig = Signature::captured(vec![0x89, 0x50, 0x4E, 0x47]);
        assert!(!sig.is_blank());
        assert_eq!(sig.image_bytes(), Some(&[0x89, 0x50, 0x4E, 0x47][..]));
        sig.clear();
        assert_eq!(sig, Signature::blank());
    }

    #[test]
    fn default_options_are_a4() {
        let opts: LayoutOptions = serde_json::from_str("{}").unwrap();
        let geom = opts.geometry();
        assert_eq!(geom.width, 210.0);
        assert_eq!(geom.height, 297.0);
        assert_eq!(geom.usable_width(), 180.0);
        assert_eq!(geom.usable_height(), 267.0);
        assert_eq!(opts.slots(), 3);
        assert_eq!(opts.labels.placeholder, "-");
    }

    #[test]
    fn custom_page_and_slots() {
        let opts: LayoutOptions = serde_json::from_str(
            r#"{ "page": { "size": { "Custom": { "width": 100, "height": 200 } }, "marginX": 10 }, "slotsPerPage": 0 }"#,
        )
        .unwrap();
        let geom = opts.geometry();
        assert_eq!(geom.width, 100.0);
        assert_eq!(geom.margin_x, 10.0);
        assert_eq!(geom.margin_y, 15.0);
        assert_eq!(opts.slots(), 1);
    }
}
