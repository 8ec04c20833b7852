//! Text layout extraction from PDF using lopdf
//!
//! This module walks each page's content stream and produces the page-level
//! block stream the outline heuristics consume: pages → blocks → lines → spans,
//! each span carrying its text, font size and font name.
//!
//! Coordinates are reported for the page as displayed: the origin is the
//! top-left corner of the CropBox after `/Rotate` is applied, with Y growing
//! downwards. Text drawn inside Form XObjects is included.

use crate::PdfError;
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::Path;

/// US Letter, used when a page tree carries no MediaBox at all
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Baselines closer than this (in points) belong to the same line
const LINE_Y_TOLERANCE: f32 = 3.0;

/// Largest downward gap between baselines, in multiples of the font size,
/// that still continues a block
const BLOCK_GAP_FACTOR: f32 = 1.5;

/// Font size difference (in points) that starts a new block
const BLOCK_FONT_TOLERANCE: f32 = 0.5;

/// Glyph advance in em for fonts without a Widths array
const FALLBACK_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments below this (thousandths of an em) are rendered as a space
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Same-font spans closer than this (in em) are one word
const SPAN_JOIN_GAP: f32 = 0.15;

/// Limit on `/Parent` hops when looking up inherited page attributes
const MAX_TREE_DEPTH: usize = 32;

/// Limit on nested Form XObjects
const MAX_FORM_DEPTH: usize = 8;

/// Axis-aligned bounding box in page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A run of text drawn by one show-text operator in one font
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Left edge of the span
    pub x: f32,
    /// Baseline, measured from the top of the page
    pub y: f32,
    /// Estimated advance width
    pub width: f32,
    /// Font name (BaseFont when available, e.g. "Helvetica-Bold")
    pub font: String,
    /// Rendered font size
    pub font_size: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextSpan {
    /// Approximate glyph box: ascender at 0.8 em, descender at 0.2 em
    pub fn bbox(&self) -> BBox {
        BBox::new(
            self.x,
            self.y - self.font_size * 0.8,
            self.x + self.width,
            self.y + self.font_size * 0.2,
        )
    }
}

/// A line of text (spans sharing a baseline)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    pub page: u32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Font size of the first span
    pub fn font_size(&self) -> f32 {
        self.spans.first().map(|s| s.font_size).unwrap_or(0.0)
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.spans
            .iter()
            .map(TextSpan::bbox)
            .reduce(|acc, b| acc.union(&b))
    }
}

/// A contiguous group of lines, the unit the outline heuristics classify
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub bbox: BBox,
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    fn from_line(line: TextLine) -> Self {
        let bbox = line.bbox().unwrap_or(BBox::new(0.0, line.y, 0.0, line.y));
        Self {
            bbox,
            lines: vec![line],
        }
    }

    fn push_line(&mut self, line: TextLine) {
        if let Some(b) = line.bbox() {
            self.bbox = self.bbox.union(&b);
        }
        self.lines.push(line);
    }
}

/// One page of laid-out text
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub number: u32,
    pub width: f32,
    pub height: f32,
    /// Blocks in content-stream order
    pub blocks: Vec<TextBlock>,
}

/// Lay out every page of a PDF file
pub fn extract_layout<P: AsRef<Path>>(path: P) -> Result<Vec<PageLayout>, PdfError> {
    let doc = Document::load(path)?;
    extract_layout_from_doc(&doc)
}

/// Lay out every page of a PDF held in memory
pub fn extract_layout_mem(buffer: &[u8]) -> Result<Vec<PageLayout>, PdfError> {
    let doc = Document::load_mem(buffer)?;
    extract_layout_from_doc(&doc)
}

fn extract_layout_from_doc(doc: &Document) -> Result<Vec<PageLayout>, PdfError> {
    doc.catalog().map_err(|_| PdfError::InvalidStructure)?;

    let pages = doc.get_pages();
    let mut layouts = Vec::with_capacity(pages.len());

    for (&page_num, &page_id) in pages.iter() {
        let frame = PageFrame::load(doc, page_id);
        let spans = match extract_page_spans(doc, page_id, page_num, frame) {
            Ok(spans) => spans,
            Err(e) => {
                log::warn!("Skipping content of page {}: {}", page_num, e);
                Vec::new()
            }
        };

        let blocks = group_into_blocks(group_into_lines(spans));
        log::debug!("Page {}: {} blocks", page_num, blocks.len());

        layouts.push(PageLayout {
            number: page_num,
            width: frame.width(),
            height: frame.height(),
            blocks,
        });
    }

    Ok(layouts)
}

/// Visible area of a page: the CropBox clipped to the MediaBox, turned by `/Rotate`
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageFrame {
    rect: [f32; 4],
    rotation: i64,
}

impl PageFrame {
    fn load(doc: &Document, page_id: ObjectId) -> Self {
        let media = inherited_attribute(doc, page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| read_rect(doc, arr))
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let rect = inherited_attribute(doc, page_id, b"CropBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| read_rect(doc, arr))
            .and_then(|crop| intersect_rects(&crop, &media))
            .unwrap_or(media);
        let rotation = inherited_attribute(doc, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|r| r.rem_euclid(360))
            .unwrap_or(0);

        Self { rect, rotation }
    }

    fn is_sideways(&self) -> bool {
        matches!(self.rotation, 90 | 270)
    }

    fn width(&self) -> f32 {
        if self.is_sideways() {
            self.rect[3] - self.rect[1]
        } else {
            self.rect[2] - self.rect[0]
        }
    }

    fn height(&self) -> f32 {
        if self.is_sideways() {
            self.rect[2] - self.rect[0]
        } else {
            self.rect[3] - self.rect[1]
        }
    }

    /// Map a user-space point to top-left coordinates of the page as displayed
    fn project(&self, x: f32, y: f32) -> (f32, f32) {
        let u = x - self.rect[0];
        let v = y - self.rect[1];
        let w = self.rect[2] - self.rect[0];
        let h = self.rect[3] - self.rect[1];
        match self.rotation {
            90 => (v, u),
            180 => (w - u, v),
            270 => (h - v, w - u),
            _ => (u, h - v),
        }
    }
}

/// Look up an inheritable page attribute, following `/Parent`
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let dict = current?;
        if let Ok(obj) = dict.get(key) {
            return Some(resolve(doc, obj));
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    None
}

fn read_rect(doc: &Document, arr: &[Object]) -> Option<[f32; 4]> {
    let nums: Vec<f32> = arr
        .iter()
        .filter_map(|o| get_number(resolve(doc, o)))
        .collect();
    if nums.len() != 4 {
        return None;
    }
    Some([
        nums[0].min(nums[2]),
        nums[1].min(nums[3]),
        nums[0].max(nums[2]),
        nums[1].max(nums[3]),
    ])
}

/// Overlap of two rectangles, `None` when they do not overlap
fn intersect_rects(a: &[f32; 4], b: &[f32; 4]) -> Option<[f32; 4]> {
    let rect = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (rect[0] < rect[2] && rect[1] < rect[3]).then_some(rect)
}

/// Follow an indirect reference, leaving direct objects untouched
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Font resource: display name and glyph metrics
#[derive(Clone)]
struct PageFont<'a> {
    dict: &'a Dictionary,
    name: String,
    composite: bool,
    first_char: i64,
    widths: Vec<f32>,
}

type FontMap<'a> = BTreeMap<Vec<u8>, PageFont<'a>>;

impl<'a> PageFont<'a> {
    fn load(doc: &'a Document, resource_name: &[u8], dict: &'a Dictionary) -> Self {
        let name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| resolve(doc, o).as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| String::from_utf8_lossy(resource_name).to_string());
        let composite = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Type0");
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o).as_i64().ok())
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| get_number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            dict,
            name,
            composite,
            first_char,
            widths,
        }
    }

    /// Advance of an encoded string in em
    fn advance(&self, bytes: &[u8], decoded: &str) -> f32 {
        if self.composite || self.widths.is_empty() {
            return decoded.chars().count() as f32 * FALLBACK_GLYPH_WIDTH;
        }
        bytes
            .iter()
            .map(|&b| {
                usize::try_from(i64::from(b) - self.first_char)
                    .ok()
                    .and_then(|i| self.widths.get(i))
                    .map(|w| w / 1000.0)
                    .unwrap_or(FALLBACK_GLYPH_WIDTH)
            })
            .sum()
    }
}

/// Fonts declared in a resource dictionary's `/Font` entry
fn load_fonts<'a>(doc: &'a Document, resources: &'a Dictionary) -> FontMap<'a> {
    let Some(fonts) = resources
        .get(b"Font")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        return FontMap::new();
    };

    fonts
        .iter()
        .filter_map(|(name, obj)| {
            let dict = resolve(doc, obj).as_dict().ok()?;
            Some((name.clone(), PageFont::load(doc, name, dict)))
        })
        .collect()
}

/// Text state tracked across operators inside a content stream
struct TextState {
    font: Vec<u8>,
    font_size: f32,
    /// `None` until a TL or TD sets it
    leading: Option<f32>,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            font_size: 12.0,
            leading: None,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Streams that never set a leading still expect T* to move down a line
        let leading = self.leading.unwrap_or(self.font_size * 1.2);
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = multiply_matrices(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.text_matrix);
    }
}

/// Extract text spans from a single page, including text drawn by Form XObjects
fn extract_page_spans(
    doc: &Document,
    page_id: ObjectId,
    page_num: u32,
    frame: PageFrame,
) -> Result<Vec<TextSpan>, PdfError> {
    let fonts: FontMap = doc
        .get_page_fonts(page_id)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, dict)| {
            let font = PageFont::load(doc, &name, dict);
            (name, font)
        })
        .collect();
    let resources = inherited_attribute(doc, page_id, b"Resources").and_then(|o| o.as_dict().ok());

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut walker = ContentWalker {
        doc,
        frame,
        page_num,
        spans: Vec::new(),
    };
    walker.walk(&content, resources, &fonts, IDENTITY, 0);

    Ok(walker.spans)
}

/// Walks one page's content stream and the forms it draws, collecting spans
struct ContentWalker<'a> {
    doc: &'a Document,
    frame: PageFrame,
    page_num: u32,
    spans: Vec<TextSpan>,
}

impl<'a> ContentWalker<'a> {
    fn walk(
        &mut self,
        content: &Content,
        resources: Option<&'a Dictionary>,
        fonts: &FontMap<'a>,
        mut ctm: [f32; 6],
        depth: usize,
    ) {
        let mut ctm_stack: Vec<[f32; 6]> = Vec::new();
        let mut state = TextState::default();
        let mut in_text_block = false;

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => {
                    if let Some(saved) = ctm_stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = read_matrix(operands) {
                        ctm = multiply_matrices(&m, &ctm);
                    }
                }
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_form(name, resources, fonts, &ctm, depth);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.text_matrix = IDENTITY;
                    state.line_matrix = IDENTITY;
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Ok(name) = operands[0].as_name() {
                            state.font = name.to_vec();
                        }
                        if let Some(size) = get_number(&operands[1]) {
                            state.font_size = size;
                        }
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = Some(leading);
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = get_number(&operands[0]).unwrap_or(0.0);
                        let ty = get_number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = Some(-ty);
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = read_matrix(operands) {
                        state.line_matrix = m;
                        state.text_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "TJ" | "'" | "\"" if in_text_block => {
                    let operand = match op.operator.as_str() {
                        "'" => {
                            state.next_line();
                            operands.first()
                        }
                        "\"" => {
                            state.next_line();
                            operands.get(2)
                        }
                        _ => operands.first(),
                    };
                    if let Some(operand) = operand {
                        let font = fonts.get(&state.font);
                        let (text, advance_em) = decode_operand(operand, self.doc, font);
                        self.push_span(text, advance_em, &state, &ctm, font);
                        state.advance(advance_em * state.font_size);
                    }
                }
                _ => {}
            }
        }
    }

    /// Walk a Form XObject named in the current resources
    ///
    /// Images and other XObject types are skipped. The form's `/Matrix` is
    /// applied on top of the current CTM and its own fonts shadow the caller's.
    fn draw_form(
        &mut self,
        name: &[u8],
        resources: Option<&'a Dictionary>,
        fonts: &FontMap<'a>,
        ctm: &[f32; 6],
        depth: usize,
    ) {
        if depth >= MAX_FORM_DEPTH {
            log::debug!(
                "Page {}: form nesting deeper than {}, skipping {}",
                self.page_num,
                MAX_FORM_DEPTH,
                String::from_utf8_lossy(name)
            );
            return;
        }

        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| resolve(doc, o).as_stream().ok())
        else {
            return;
        };

        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Form");
        if !is_form {
            return;
        }

        let data = match stream.decompressed_content() {
            Ok(data) => data,
            Err(_) => stream.content.clone(),
        };
        let content = match Content::decode(&data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!(
                    "Page {}: skipping form {}: {}",
                    self.page_num,
                    String::from_utf8_lossy(name),
                    e
                );
                return;
            }
        };

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| read_matrix(arr))
            .unwrap_or(IDENTITY);
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok());

        let mut form_fonts = fonts.clone();
        if let Some(own) = form_resources {
            form_fonts.extend(load_fonts(doc, own));
        }

        self.walk(
            &content,
            form_resources.or(resources),
            &form_fonts,
            multiply_matrices(&matrix, ctm),
            depth + 1,
        );
    }

    /// Record a span at the current text position, in top-left page coordinates
    fn push_span(
        &mut self,
        text: String,
        advance_em: f32,
        state: &TextState,
        ctm: &[f32; 6],
        font: Option<&PageFont>,
    ) {
        if text.trim().is_empty() {
            return;
        }

        let combined = multiply_matrices(&state.text_matrix, ctm);
        let font_size = round_size(state.font_size * matrix_scale(&combined));
        let horizontal = (combined[0].powi(2) + combined[1].powi(2)).sqrt();
        let (x, y) = self.frame.project(combined[4], combined[5]);

        self.spans.push(TextSpan {
            text,
            x,
            y,
            width: advance_em * state.font_size * horizontal,
            font: font
                .map(|f| f.name.clone())
                .unwrap_or_else(|| String::from_utf8_lossy(&state.font).to_string()),
            font_size,
            page: self.page_num,
        });
    }
}

/// Decode a Tj string or TJ array, returning the text and its advance in em
fn decode_operand(obj: &Object, doc: &Document, font: Option<&PageFont>) -> (String, f32) {
    match obj {
        Object::String(bytes, _) => {
            let text = decode_bytes(bytes, doc, font);
            let advance = match font {
                Some(f) => f.advance(bytes, &text),
                None => text.chars().count() as f32 * FALLBACK_GLYPH_WIDTH,
            };
            (text, advance)
        }
        Object::Array(items) => {
            let mut text = String::new();
            let mut advance = 0.0;
            for item in items {
                if let Some(adjust) = get_number(item) {
                    // Adjustments are in thousandths of an em, subtracted from the advance
                    advance -= adjust / 1000.0;
                    if adjust < TJ_SPACE_THRESHOLD && !text.is_empty() && !text.ends_with(' ') {
                        text.push(' ');
                    }
                } else {
                    let (part, part_advance) = decode_operand(item, doc, font);
                    text.push_str(&part);
                    advance += part_advance;
                }
            }
            (text, advance)
        }
        _ => (String::new(), 0.0),
    }
}

/// Decode string bytes using the font encoding, falling back to UTF-16BE / Latin-1
fn decode_bytes(bytes: &[u8], doc: &Document, font: Option<&PageFont>) -> String {
    if let Some(font) = font {
        if let Ok(encoding) = font.dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return text;
            }
        }
    }

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn read_matrix(operands: &[Object]) -> Option<[f32; 6]> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (i, operand) in operands.iter().take(6).enumerate() {
        m[i] = get_number(operand).unwrap_or(IDENTITY[i]);
    }
    Some(m)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Scale factor a matrix applies to glyphs (larger of the two axes)
fn matrix_scale(m: &[f32; 6]) -> f32 {
    let scale_x = (m[0].powi(2) + m[1].powi(2)).sqrt();
    let scale_y = (m[2].powi(2) + m[3].powi(2)).sqrt();
    scale_x.max(scale_y)
}

/// Round to 0.01pt so matrix arithmetic noise does not split one size in two
fn round_size(size: f32) -> f32 {
    (size * 100.0).round() / 100.0
}

/// Group spans into lines, preserving content-stream order
///
/// Only consecutive spans on the same page and baseline form a line. The
/// spans of each line are then sorted left to right and runs of the same
/// font and size are joined.
pub fn group_into_lines(spans: Vec<TextSpan>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();

    for span in spans {
        match lines.last_mut() {
            Some(last) if last.page == span.page && (last.y - span.y).abs() < LINE_Y_TOLERANCE => {
                last.spans.push(span);
            }
            _ => {
                let (y, page) = (span.y, span.page);
                lines.push(TextLine {
                    spans: vec![span],
                    y,
                    page,
                });
            }
        }
    }

    for line in &mut lines {
        line.spans
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        line.spans = merge_adjacent_spans(std::mem::take(&mut line.spans));
    }

    lines
}

/// Join neighbouring spans of one font and size into a single run
///
/// Producers split words across show-text operators or draw one glyph at a
/// time. Pieces closer than [`SPAN_JOIN_GAP`] em are glued together; a wider
/// gap becomes one space.
fn merge_adjacent_spans(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        match merged.last_mut() {
            Some(prev) if prev.font == span.font && prev.font_size == span.font_size => {
                let gap = span.x - (prev.x + prev.width);
                if gap >= SPAN_JOIN_GAP * span.font_size
                    && !prev.text.ends_with(' ')
                    && !span.text.starts_with(' ')
                {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = (span.x + span.width).max(prev.x + prev.width) - prev.x;
            }
            _ => merged.push(span),
        }
    }

    merged
}

/// Group consecutive lines into blocks
///
/// A new block starts on a page change, when the baseline moves up, when the
/// gap down to the next baseline exceeds [`BLOCK_GAP_FACTOR`] font sizes, or
/// when the font size changes.
pub fn group_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();

    for line in lines {
        let continues = blocks
            .last()
            .and_then(|b| b.lines.last())
            .is_some_and(|prev| continues_block(prev, &line));

        match blocks.last_mut() {
            Some(block) if continues => block.push_line(line),
            _ => blocks.push(TextBlock::from_line(line)),
        }
    }

    blocks
}

fn continues_block(prev: &TextLine, line: &TextLine) -> bool {
    if prev.page != line.page {
        return false;
    }
    let gap = line.y - prev.y;
    let size = prev.font_size().max(line.font_size());
    gap > 0.0
        && gap <= size * BLOCK_GAP_FACTOR
        && (prev.font_size() - line.font_size()).abs() <= BLOCK_FONT_TOLERANCE
}
