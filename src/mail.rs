//! Webmail compose link for sending a finished report.
//!
//! The PDF itself is not attached; the link only pre-fills recipients, the
//! subject and a short body so the technician can attach the downloaded file.

use crate::model::{LayoutOptions, ReportInput};

const COMPOSE_BASE: &str = "https://mail.google.com/mail/?view=cm&fs=1";

/// Comma-separated recipient list: the default recipient, then the extra one.
/// Blank entries are skipped.
pub fn recipients(options: &LayoutOptions) -> String {
    let mail = &options.mail;
    std::iter::once(mail.default_recipient.as_str())
        .chain(mail.extra_recipient.as_deref())
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn subject(input: &ReportInput, options: &LayoutOptions) -> String {
    format!("{} - {}", options.mail.subject_prefix, input.site)
}

pub fn body(input: &ReportInput, options: &LayoutOptions) -> String {
    format!(
        "{}: {}\n{}: {}",
        options.labels.site, input.site, options.labels.technician, input.technician
    )
}

/// Build the compose URL with every component percent-encoded.
pub fn compose_url(input: &ReportInput, options: &LayoutOptions) -> String {
    format!(
        "{}&to={}&su={}&body={}",
        COMPOSE_BASE,
        urlencoding::encode(&recipients(options)),
        urlencoding::encode(&subject(input, options)),
        urlencoding::encode(&body(input, options))
    )
}
