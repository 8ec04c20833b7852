//! Title and heading outline extraction from PDFs using lopdf
//!
//! This crate provides:
//! - Layout extraction: pages → blocks → lines → spans with font attributes
//! - Block classification into title, heading candidates and noise
//! - Heading level assignment by font-size rank (H1–H3 by default)
//! - JSON rendering of the resulting outline

pub mod classifier;
pub mod config;
pub mod extractor;
pub mod harvester;
pub mod levels;
pub mod outline;
pub mod text;

pub use classifier::{classify_blocks, BlockClass, Classifier, DiscardReason, HeadingCandidate};
pub use config::{OutlineConfig, IGNORE_WORDS};
pub use extractor::{extract_layout, extract_layout_mem, BBox, PageLayout, TextBlock, TextLine, TextSpan};
pub use harvester::{harvest_blocks, NormalizedBlock};
pub use levels::{assign_levels, HeadingLevel};
pub use outline::{to_json, JsonFormat, Outline, OutlineEntry, UNKNOWN_TITLE};

use std::path::Path;

/// Extract the outline of a PDF file with the default thresholds
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline, PdfError> {
    extract_outline_with_config(path, &OutlineConfig::default())
}

/// Extract the outline of a PDF file with custom thresholds
///
/// The configuration is validated first. This function will:
/// 1. Load the document and lay out each page into text blocks
/// 2. Classify every block as title, heading candidate or noise
/// 3. Rank candidate font sizes and keep the top `max_levels` as H1, H2, ...
pub fn extract_outline_with_config<P: AsRef<Path>>(
    path: P,
    config: &OutlineConfig,
) -> Result<Outline, PdfError> {
    config.validate()?;
    let start = std::time::Instant::now();

    let pages = extract_layout(&path)?;
    let outline = outline_from_pages(&pages, config);

    log::info!(
        "{}: {} pages, {} outline entries in {}ms",
        path.as_ref().display(),
        pages.len(),
        outline.outline.len(),
        start.elapsed().as_millis()
    );

    Ok(outline)
}

/// Extract the outline of a PDF held in memory
pub fn extract_outline_mem(buffer: &[u8]) -> Result<Outline, PdfError> {
    extract_outline_mem_with_config(buffer, &OutlineConfig::default())
}

/// Extract the outline of a PDF held in memory with custom thresholds
pub fn extract_outline_mem_with_config(
    buffer: &[u8],
    config: &OutlineConfig,
) -> Result<Outline, PdfError> {
    config.validate()?;
    let pages = extract_layout_mem(buffer)?;
    Ok(outline_from_pages(&pages, config))
}

/// Run the classification pipeline over already laid-out pages
///
/// Pages are expected in ascending page order and the configuration is used
/// as given, so `max_levels: 0` yields no headings. This never fails: blocks
/// without usable text are skipped and a document without a qualifying
/// title gets [`UNKNOWN_TITLE`].
pub fn outline_from_pages(pages: &[PageLayout], config: &OutlineConfig) -> Outline {
    let blocks = harvest_blocks(pages);
    let (title, candidates) = classify_blocks(&blocks, config);
    let entries = assign_levels(&candidates, config.max_levels);

    log::info!(
        "{} blocks harvested, {} heading candidates, {} kept",
        blocks.len(),
        candidates.len(),
        entries.len()
    );

    Outline::new(title, entries)
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Invalid PDF structure")]
    InvalidStructure,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        match e {
            lopdf::Error::IO(io) => PdfError::Io(io),
            lopdf::Error::Decryption(_) => PdfError::Encrypted,
            other => PdfError::Parse(other.to_string()),
        }
    }
}
