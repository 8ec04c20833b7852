//! Block harvesting: flatten laid-out blocks into one text string each
//!
//! A block's typographic identity is its first line's first span: size,
//! bold and italic are read from there even if later spans differ.

use crate::extractor::{BBox, PageLayout, TextBlock};

/// A text block reduced to what the classifier looks at
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBlock {
    /// Concatenated span text, trimmed
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    /// Page number (1-indexed)
    pub page: u32,
    pub bbox: BBox,
    pub page_width: f32,
}

impl NormalizedBlock {
    /// Flatten a block, or `None` for blocks without text (images, empty runs)
    pub fn from_block(block: &TextBlock, page: &PageLayout) -> Option<Self> {
        let first_span = block.lines.first()?.spans.first()?;

        let text = block
            .lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|s| s.text.trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        if text.is_empty() {
            return None;
        }

        Some(Self {
            text,
            font_size: first_span.font_size,
            bold: is_bold_font(&first_span.font),
            italic: is_italic_font(&first_span.font),
            page: page.number,
            bbox: block.bbox,
            page_width: page.width,
        })
    }
}

/// Harvest all pages in order, skipping blocks without text
pub fn harvest_blocks(pages: &[PageLayout]) -> Vec<NormalizedBlock> {
    pages
        .iter()
        .flat_map(|page| {
            page.blocks
                .iter()
                .filter_map(move |block| NormalizedBlock::from_block(block, page))
        })
        .collect()
}

pub fn is_bold_font(font_name: &str) -> bool {
    font_name.to_lowercase().contains("bold")
}

pub fn is_italic_font(font_name: &str) -> bool {
    font_name.to_lowercase().contains("italic")
}
