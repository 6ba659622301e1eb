//! # Text Helpers
//!
//! Word wrapping against real Helvetica metrics, date formatting, and the
//! placeholder rule for empty fields.
//!
//! Wrapping is greedy over the UAX #14 break opportunities reported by
//! `unicode-linebreak`: segments are packed onto a line while it still fits
//! the available width. Mandatory breaks end a paragraph, and an empty
//! paragraph yields an empty line so blank lines in the input survive.
//! Non-breaking spaces never open a break and are kept in the output.
//!
//! A word wider than a whole line is hyphenated at its Spanish syllables
//! (`hypher`). A run with no usable syllable break is split between
//! characters.

use chrono::{Datelike, NaiveDate};
use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::StandardFont;

/// Wrap `text` to lines no wider than `max_width` millimetres.
pub fn wrap_text(text: &str, max_width: f64, font: StandardFont, font_size: f64) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut wrapper = LineWrapper::new(max_width, font, font_size);
    let mut start = 0;
    for (end, opportunity) in linebreaks(text) {
        let segment = &text[start..end];
        start = end;

        let word = segment.trim_matches(is_break_space);
        if !word.is_empty() {
            wrapper.push_word(word);
        }
        if segment.ends_with(is_break_space) {
            wrapper.pending_space = true;
        }
        if matches!(opportunity, BreakOpportunity::Mandatory) {
            wrapper.end_paragraph();
        }
    }
    wrapper.finish()
}

/// Whitespace a line may break at. No-break spaces bind their neighbours.
fn is_break_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{A0}' | '\u{2007}' | '\u{202F}')
}

struct LineWrapper {
    lines: Vec<String>,
    current: String,
    current_width: f64,
    pending_space: bool,
    max_width: f64,
    font: StandardFont,
    font_size: f64,
    space_width: f64,
    hyphen_width: f64,
}

impl LineWrapper {
    fn new(max_width: f64, font: StandardFont, font_size: f64) -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            current_width: 0.0,
            pending_space: false,
            max_width,
            font,
            font_size,
            space_width: font.measure_mm(" ", font_size),
            hyphen_width: font.measure_mm("-", font_size),
        }
    }

    fn measure(&self, text: &str) -> f64 {
        self.font.measure_mm(text, self.font_size)
    }

    fn push_word(&mut self, word: &str) {
        let word_width = self.measure(word);
        let gap = if self.pending_space && !self.current.is_empty() {
            self.space_width
        } else {
            0.0
        };
        self.pending_space = false;

        if self.current_width + gap + word_width <= self.max_width {
            if gap > 0.0 {
                self.current.push(' ');
            }
            self.current.push_str(word);
            self.current_width += gap + word_width;
            return;
        }

        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        if word_width <= self.max_width {
            self.current = word.to_string();
            self.current_width = word_width;
            return;
        }

        let mut pieces = self.split_long_word(word);
        // The tail of a split word can still share its line with what follows.
        let tail = pieces.pop().unwrap_or_default();
        self.lines.extend(pieces);
        self.current_width = self.measure(&tail);
        self.current = tail;
    }

    fn end_paragraph(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.current_width = 0.0;
        self.pending_space = false;
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        self.lines
    }

    /// Break a word into pieces that each fit the line. Breaks fall between
    /// syllables and carry a hyphen when there is room for one.
    fn split_long_word(&self, word: &str) -> Vec<String> {
        let syllables: Vec<&str> =
            if word.chars().count() >= 4 && word.chars().all(char::is_alphabetic) {
                hypher::hyphenate(word, hypher::Lang::Spanish).collect()
            } else {
                vec![word]
            };

        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut piece_width = 0.0;
        let last = syllables.len().saturating_sub(1);

        for (i, syllable) in syllables.iter().enumerate() {
            let syllable_width = self.measure(syllable);
            let reserve = if i == last { 0.0 } else { self.hyphen_width };

            if piece_width + syllable_width + reserve <= self.max_width {
                piece.push_str(syllable);
                piece_width += syllable_width;
                continue;
            }

            if !piece.is_empty() {
                if piece_width + self.hyphen_width <= self.max_width {
                    piece.push('-');
                }
                pieces.push(std::mem::take(&mut piece));
                piece_width = 0.0;
            }

            if syllable_width + reserve <= self.max_width {
                piece.push_str(syllable);
                piece_width = syllable_width;
                continue;
            }

            let mut chunks = self.split_chars(syllable);
            piece = chunks.pop().unwrap_or_default();
            piece_width = self.measure(&piece);
            pieces.extend(chunks);
        }
        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }

    /// Split between characters. Every chunk holds at least one character,
    /// so a pathological width still terminates.
    fn split_chars(&self, run: &str) -> Vec<String> {
        let metrics = self.font.metrics();
        let mut chunks = Vec::new();
        let mut chunk = String::new();
        let mut chunk_width = 0.0;

        for ch in run.chars() {
            let w = metrics.char_width(ch, self.font_size) / crate::font::PT_PER_MM;
            if !chunk.is_empty() && chunk_width + w > self.max_width {
                chunks.push(std::mem::take(&mut chunk));
                chunk_width = 0.0;
            }
            chunk.push(ch);
            chunk_width += w;
        }
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        chunks
    }
}

/// Format a date as `DD-MM-YYYY` with zero-padded day and month.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}

/// Return `text`, or `placeholder` when it is empty or only whitespace.
pub fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
