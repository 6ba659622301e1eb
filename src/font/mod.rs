//! # Font Management
//!
//! The report uses the standard PDF Helvetica faces only, so nothing is
//! embedded. This module maps a (bold) flag to a face and measures text with
//! real AFM metrics, which both the wrapper and the PDF writer's alignment
//! math rely on.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// The standard PDF faces the report draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            Self::HelveticaBold
        } else {
            Self::Helvetica
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "F0",
            Self::HelveticaBold => "F1",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica => metrics::HELVETICA_METRICS,
            Self::HelveticaBold => metrics::HELVETICA_BOLD_METRICS,
        }
    }

    /// Width of `text` at `font_size` points, in millimetres.
    pub fn measure_mm(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size, 0.0) / PT_PER_MM
    }
}
