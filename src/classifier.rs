//! Block classification: title, heading candidate or noise
//!
//! Every block is decided exactly once by an ordered sequence of checks:
//!
//! 1. While no title has been found, a page-1 block that passes the title
//!    rules becomes the title and is not looked at again.
//! 2. Any other block is filtered by the heading rules; the first failing
//!    rule is recorded as the [`DiscardReason`].
//!
//! Title search is a one-way state machine: once a title is found it is never
//! replaced, and every later block goes straight to heading filtering.

use crate::config::OutlineConfig;
use crate::extractor::BBox;
use crate::harvester::NormalizedBlock;
use crate::outline::UNKNOWN_TITLE;
use crate::text::{clean_text, has_trailing_punctuation, is_ignored, is_page_number, word_count};
use std::fmt;

/// A block that survived heading filtering; its level is assigned later
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    /// Cleaned text
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub page: u32,
}

/// Why a block was rejected as a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Font size below the heading minimum
    TooSmall,
    /// More words than a heading may have
    TooManyWords,
    /// Text is on the ignore list
    Ignored,
    /// Only digits, dots and whitespace
    PageNumber,
    /// Ends in `.`, `:` or `;`
    TrailingPunctuation,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DiscardReason::TooSmall => "font too small",
            DiscardReason::TooManyWords => "too many words",
            DiscardReason::Ignored => "ignored term",
            DiscardReason::PageNumber => "page number",
            DiscardReason::TrailingPunctuation => "trailing punctuation",
        };
        f.write_str(reason)
    }
}

/// Outcome of classifying one block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockClass {
    Title(String),
    Heading(HeadingCandidate),
    Discarded(DiscardReason),
}

/// Stateful classifier over a document's block stream
#[derive(Debug)]
pub struct Classifier<'a> {
    config: &'a OutlineConfig,
    title: Option<String>,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self {
            config,
            title: None,
        }
    }

    pub fn title_found(&self) -> bool {
        self.title.is_some()
    }

    /// The detected title, or [`UNKNOWN_TITLE`] when none was found or it cleaned to nothing
    pub fn title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => UNKNOWN_TITLE,
        }
    }

    /// Classify the next block of the document
    ///
    /// Blocks must be fed in document order: the first qualifying page-1
    /// block wins the title.
    pub fn classify(&mut self, block: &NormalizedBlock) -> BlockClass {
        if block.page == 1 && !self.title_found() && self.is_title(block) {
            let title = clean_text(&block.text).to_string();
            log::debug!("Title found: {:?} ({}pt)", title, block.font_size);
            self.title = Some(title.clone());
            return BlockClass::Title(title);
        }

        match self.discard_reason(block) {
            Some(reason) => {
                log::debug!(
                    "Discarded on page {} ({}): {:?}",
                    block.page,
                    reason,
                    block.text
                );
                BlockClass::Discarded(reason)
            }
            None => BlockClass::Heading(HeadingCandidate {
                text: clean_text(&block.text).to_string(),
                font_size: block.font_size,
                bold: block.bold,
                italic: block.italic,
                page: block.page,
            }),
        }
    }

    fn is_title(&self, block: &NormalizedBlock) -> bool {
        block.font_size > self.config.title_min_font_size
            && is_centered(&block.bbox, block.page_width)
            && word_count(&block.text) <= self.config.title_max_words
            && !is_ignored(&block.text, &self.config.ignore_words)
    }

    fn discard_reason(&self, block: &NormalizedBlock) -> Option<DiscardReason> {
        let text = block.text.as_str();
        if block.font_size < self.config.heading_min_font_size {
            Some(DiscardReason::TooSmall)
        } else if word_count(text) > self.config.heading_max_words {
            Some(DiscardReason::TooManyWords)
        } else if is_ignored(text, &self.config.ignore_words) {
            Some(DiscardReason::Ignored)
        } else if is_page_number(text) {
            Some(DiscardReason::PageNumber)
        } else if has_trailing_punctuation(text) {
            Some(DiscardReason::TrailingPunctuation)
        } else {
            None
        }
    }
}

/// Horizontally spread across the page: starts in the left quarter and ends
/// in the right quarter
pub fn is_centered(bbox: &BBox, page_width: f32) -> bool {
    bbox.x0 < page_width / 4.0 && bbox.x1 > 3.0 * page_width / 4.0
}

/// Classify a whole document, returning its title and heading candidates in order
pub fn classify_blocks(
    blocks: &[NormalizedBlock],
    config: &OutlineConfig,
) -> (String, Vec<HeadingCandidate>) {
    let mut classifier = Classifier::new(config);
    let mut candidates = Vec::new();

    for block in blocks {
        if let BlockClass::Heading(candidate) = classifier.classify(block) {
            candidates.push(candidate);
        }
    }

    (classifier.title().to_string(), candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, font_size: f32, page: u32) -> NormalizedBlock {
        NormalizedBlock {
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            page,
            bbox: BBox::new(72.0, 100.0, 300.0, 120.0),
            page_width: 612.0,
        }
    }

    fn wide_block(text: &str, font_size: f32, page: u32) -> NormalizedBlock {
        NormalizedBlock {
            bbox: BBox::new(0.0, 50.0, 612.0, 80.0),
            ..block(text, font_size, page)
        }
    }

    #[test]
    fn test_title_detection() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        assert_eq!(
            classifier.classify(&wide_block("My Report", 24.0, 1)),
            BlockClass::Title("My Report".into())
        );
        assert_eq!(classifier.title(), "My Report");
    }

    #[test]
    fn test_title_is_cleaned() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        classifier.classify(&wide_block("Annual Review :- ", 24.0, 1));
        assert_eq!(classifier.title(), "Annual Review");
    }

    #[test]
    fn test_first_title_wins() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        classifier.classify(&wide_block("First Title", 30.0, 1));
        let second = classifier.classify(&wide_block("Second Title", 30.0, 1));
        assert!(matches!(second, BlockClass::Heading(_)));
        assert_eq!(classifier.title(), "First Title");
    }

    #[test]
    fn test_title_rules() {
        let config = OutlineConfig::default();
        let rejected = [
            wide_block("Exactly Twenty", 20.0, 1),
            block("Not Centered", 24.0, 1),
            wide_block("one two three four five six seven eight nine ten eleven", 24.0, 1),
            wide_block("Abstract", 24.0, 1),
            wide_block("Second Page Title", 24.0, 2),
        ];
        for b in &rejected {
            let mut classifier = Classifier::new(&config);
            assert!(!matches!(classifier.classify(b), BlockClass::Title(_)), "{:?}", b.text);
            assert_eq!(classifier.title(), UNKNOWN_TITLE);
        }
    }

    #[test]
    fn test_title_that_cleans_to_nothing_stops_search() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        classifier.classify(&wide_block("-- ::", 24.0, 1));
        assert!(classifier.title_found());
        assert_eq!(classifier.title(), UNKNOWN_TITLE);
        assert!(matches!(
            classifier.classify(&wide_block("Real Title", 24.0, 1)),
            BlockClass::Heading(_)
        ));
    }

    #[test]
    fn test_discard_reasons() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        let cases = [
            (block("Tiny", 7.9, 2), DiscardReason::TooSmall),
            (
                block("one two three four five six seven eight nine ten eleven", 12.0, 2),
                DiscardReason::TooManyWords,
            ),
            (block("References", 14.0, 2), DiscardReason::Ignored),
            (block("1.2.3", 14.0, 2), DiscardReason::PageNumber),
            (block("  12  ", 14.0, 2), DiscardReason::PageNumber),
            (
                block("See the appendix for details.", 18.0, 2),
                DiscardReason::TrailingPunctuation,
            ),
            (block("Summary:", 14.0, 2), DiscardReason::TrailingPunctuation),
        ];
        for (b, reason) in cases {
            assert_eq!(classifier.classify(&b), BlockClass::Discarded(reason), "{:?}", b.text);
        }
    }

    #[test]
    fn test_heading_candidate() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        let mut b = block("Background --", 8.0, 2);
        b.bold = true;
        match classifier.classify(&b) {
            BlockClass::Heading(c) => {
                assert_eq!(c.text, "Background");
                assert_eq!(c.font_size, 8.0);
                assert!(c.bold);
                assert_eq!(c.page, 2);
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_ten_words_is_still_a_heading() {
        let config = OutlineConfig::default();
        let mut classifier = Classifier::new(&config);
        let b = block("one two three four five six seven eight nine ten", 12.0, 1);
        assert!(matches!(classifier.classify(&b), BlockClass::Heading(_)));
    }

    #[test]
    fn test_classify_blocks() {
        let blocks = vec![
            wide_block("My Report", 24.0, 1),
            block("Introduction to Systems", 16.0, 1),
            block("3", 16.0, 1),
            block("Results", 14.0, 2),
        ];
        let (title, candidates) = classify_blocks(&blocks, &OutlineConfig::default());
        assert_eq!(title, "My Report");
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Introduction to Systems", "Results"]);
    }

    #[test]
    fn test_is_centered() {
        assert!(is_centered(&BBox::new(100.0, 0.0, 500.0, 10.0), 600.0));
        assert!(!is_centered(&BBox::new(150.0, 0.0, 500.0, 10.0), 600.0));
        assert!(!is_centered(&BBox::new(100.0, 0.0, 450.0, 10.0), 600.0));
    }
}
