//! Structured error types for the minuta renderer.
//!
//! The layout engine itself cannot fail. Errors come from the edges: parsing
//! JSON input, decoding image data, writing the PDF, and file I/O in the CLI.

use thiserror::Error;

/// The unified error type returned by all public minuta API functions.
#[derive(Debug, Error)]
pub enum MinutaError {
    /// JSON input failed to parse as a valid report or options document.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// An image (photo, signature or logo) could not be read or decoded.
    /// Fatal for the whole render: no partial document is produced.
    #[error("Image error in {label}: {message}")]
    Image { label: String, message: String },
    /// PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl MinutaError {
    pub(crate) fn image(label: impl Into<String>, message: impl Into<String>) -> Self {
        MinutaError::Image {
            label: label.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MinutaError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report schema. Check field names (camelCase) and the date format (YYYY-MM-DD).".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        MinutaError::Parse { source: e, hint }
    }
}
