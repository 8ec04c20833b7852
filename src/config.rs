//! Thresholds for title and heading detection
//!
//! The defaults reproduce the fixed heuristic: titles above 20pt, headings at
//! 8pt or more, at most 10 words each, three heading levels.

use crate::PdfError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generic or structural terms that are never a title or a heading
pub const IGNORE_WORDS: &[&str] = &[
    "title",
    "title of the article",
    "abstract",
    "contents",
    "index",
    "references",
    "appendix",
    "acknowledgments",
    "introduction",
    "chapter",
    "section",
    "figure",
    "table",
    "page",
    "footer",
    "header",
];

/// Configuration for outline extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// A title must be strictly larger than this (default: 20.0)
    pub title_min_font_size: f32,
    /// Maximum words in a title (default: 10)
    pub title_max_words: usize,
    /// Headings smaller than this are discarded (default: 8.0)
    pub heading_min_font_size: f32,
    /// Maximum words in a heading (default: 10)
    pub heading_max_words: usize,
    /// Number of distinct font sizes turned into levels (default: 3)
    pub max_levels: usize,
    /// Lowercase terms excluded from title and heading detection
    pub ignore_words: Vec<String>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            title_min_font_size: 20.0,
            title_max_words: 10,
            heading_min_font_size: 8.0,
            heading_max_words: 10,
            max_levels: 3,
            ignore_words: IGNORE_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl OutlineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title_min_font_size(mut self, size: f32) -> Self {
        self.title_min_font_size = size;
        self
    }

    pub fn with_title_max_words(mut self, words: usize) -> Self {
        self.title_max_words = words;
        self
    }

    pub fn with_heading_min_font_size(mut self, size: f32) -> Self {
        self.heading_min_font_size = size;
        self
    }

    pub fn with_heading_max_words(mut self, words: usize) -> Self {
        self.heading_max_words = words;
        self
    }

    /// Set the number of heading levels; 0 is rejected by [`validate`](Self::validate)
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = levels;
        self
    }

    /// Replace the ignore list; entries are lowercased
    pub fn with_ignore_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_words = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Parse a (possibly partial) JSON configuration; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, PdfError> {
        let config: OutlineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values the heuristics cannot work with
    pub fn validate(&self) -> Result<(), PdfError> {
        if !self.title_min_font_size.is_finite() {
            return Err(PdfError::Config(format!(
                "title_min_font_size must be finite, got {}",
                self.title_min_font_size
            )));
        }
        if !self.heading_min_font_size.is_finite() {
            return Err(PdfError::Config(format!(
                "heading_min_font_size must be finite, got {}",
                self.heading_min_font_size
            )));
        }
        if self.max_levels == 0 {
            return Err(PdfError::Config("max_levels must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OutlineConfig::default();
        assert_eq!(config.title_min_font_size, 20.0);
        assert_eq!(config.title_max_words, 10);
        assert_eq!(config.heading_min_font_size, 8.0);
        assert_eq!(config.heading_max_words, 10);
        assert_eq!(config.max_levels, 3);
        assert_eq!(config.ignore_words.len(), IGNORE_WORDS.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = OutlineConfig::new()
            .with_title_min_font_size(18.0)
            .with_title_max_words(12)
            .with_heading_min_font_size(9.5)
            .with_heading_max_words(8)
            .with_max_levels(5)
            .with_ignore_words(["Glossary", "NOTES"]);

        assert_eq!(config.title_min_font_size, 18.0);
        assert_eq!(config.title_max_words, 12);
        assert_eq!(config.heading_min_font_size, 9.5);
        assert_eq!(config.heading_max_words, 8);
        assert_eq!(config.max_levels, 5);
        assert_eq!(config.ignore_words, vec!["glossary", "notes"]);
    }

    #[test]
    fn test_partial_json_config() {
        let config = OutlineConfig::from_json_str(r#"{"max_levels": 4, "title_max_words": 6}"#)
            .unwrap();
        assert_eq!(config.max_levels, 4);
        assert_eq!(config.title_max_words, 6);
        assert_eq!(config.heading_min_font_size, 8.0);
        assert_eq!(config.ignore_words.len(), IGNORE_WORDS.len());
    }

    #[test]
    fn test_invalid_json_config() {
        assert!(matches!(
            OutlineConfig::from_json_str(r#"{"max_levels": 0}"#),
            Err(PdfError::Config(_))
        ));
        assert!(matches!(
            OutlineConfig::from_json_str("{not json"),
            Err(PdfError::Json(_))
        ));
    }

    #[test]
    fn test_zero_levels_rejected_from_builder_and_file() {
        let built = OutlineConfig::new().with_max_levels(0);
        assert_eq!(built.max_levels, 0);
        assert!(matches!(built.validate(), Err(PdfError::Config(_))));
        assert!(matches!(
            OutlineConfig::from_json_str(r#"{"max_levels": 0}"#),
            Err(PdfError::Config(_))
        ));
    }
}
