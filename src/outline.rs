//! Outline result and JSON rendering

use crate::levels::HeadingLevel;
use crate::PdfError;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Title used when no page-1 block qualifies
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One heading of the outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Document title plus headings in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            outline,
        }
    }

    pub fn has_title(&self) -> bool {
        self.title != UNKNOWN_TITLE
    }

    pub fn to_json(&self, format: JsonFormat) -> Result<String, PdfError> {
        to_json(self, format)
    }
}

impl Default for Outline {
    fn default() -> Self {
        Self::new(UNKNOWN_TITLE, Vec::new())
    }
}

/// JSON output format
///
/// Both formats escape non-ASCII characters as `\uXXXX`, so the output is
/// plain ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented with four spaces
    #[default]
    Pretty,
    /// No extra whitespace
    Compact,
}

/// Render an outline as JSON
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String, PdfError> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(outline)?,
        JsonFormat::Pretty => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            outline.serialize(&mut serializer)?;
            // serde_json only emits valid UTF-8
            String::from_utf8_lossy(&buf).into_owned()
        }
    };
    Ok(escape_non_ascii(&json))
}

/// Replace every non-ASCII character with its UTF-16 `\uXXXX` escape(s)
///
/// serde_json only emits non-ASCII inside string literals, so this keeps the
/// document valid.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                // Writing to a String cannot fail
                let _ = write!(out, "\\u{:04x}", unit);
            }
        }
    }
    out
}
