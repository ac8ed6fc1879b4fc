//! PDF document layout and writer

use crate::error::{Result, SyllaboError};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use serde::{Deserialize, Serialize};

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

/// Geometry and type sizes for document pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page: PageSize,
    /// Margin on every side, in points
    pub margin: f32,
    pub font_size: f32,
    pub title_font_size: f32,
    /// Baseline distance as a multiple of the font size
    pub line_height: f32,
}

impl PageLayout {
    pub fn new(page: PageSize) -> Self {
        Self {
            page,
            margin: 56.0,
            font_size: 11.0,
            title_font_size: 18.0,
            line_height: 1.35,
        }
    }

    pub fn printable_width(&self) -> f32 {
        self.page.dimensions().0 - 2.0 * self.margin
    }

    fn top(&self) -> f32 {
        self.page.dimensions().1 - self.margin
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new(PageSize::A4)
    }
}

/// One laid-out line, positioned by its baseline
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLine {
    pub text: String,
    pub font_size: f32,
    /// Baseline height from the bottom of the page, in points
    pub y: f32,
}

// Helvetica advance widths for 0x20..=0x7E, in 1/1000 em
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70
];

/// Map a char to its WinAnsiEncoding byte, `?` when it has none
pub(crate) fn win_ansi(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

pub(crate) fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        0x85 | 0x89 | 0x8C | 0x97 | 0x99 | 0xC6 => 1000,
        0x82 | 0x91 | 0x92 => 222,
        0x84 | 0x88 | 0x8B | 0x93 | 0x94 | 0x98 | 0x9B => 333,
        0x95 => 350,
        0x8A | 0x9F | 0xC0..=0xC5 | 0xC8..=0xCB | 0xDD | 0xDE => 667,
        0x8E => 611,
        0x9A | 0x9E | 0xE7 | 0xFD | 0xFF => 500,
        0x9C => 944,
        0xA0 | 0xB7 => 278,
        0xA1 | 0xA8 | 0xAD | 0xAF | 0xB2..=0xB4 | 0xB8 | 0xB9 => 333,
        0xA6 => 260,
        0xA9 | 0xAE => 737,
        0xAA => 370,
        0xAC | 0xB1 | 0xD7 | 0xF7 => 584,
        0xB0 => 400,
        0xB6 => 537,
        0xBA => 365,
        0xBC..=0xBE => 834,
        0xBF | 0xDF | 0xF8 => 611,
        0xC7 | 0xD0 | 0xD1 | 0xD9..=0xDC => 722,
        0xCC..=0xCF | 0xEC..=0xEF => 278,
        0xD2..=0xD6 | 0xD8 => 778,
        0xE6 => 889,
        _ => 556,
    }
}

/// Rendered width of `text` in points at `font_size`
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(glyph_width(win_ansi(c))))
        .sum();
    units as f32 * font_size / 1000.0
}

/// Greedy word wrap; a word wider than the line is split at char boundaries
fn wrap(paragraph: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font_size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font_size) <= max_width {
            current = word.to_string();
            continue;
        }

        for c in word.chars() {
            let mut next = current.clone();
            next.push(c);
            if !current.is_empty() && text_width(&next, font_size) > max_width {
                lines.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current = next;
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

struct Cursor<'a> {
    layout: &'a PageLayout,
    pages: Vec<Vec<DocumentLine>>,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(layout: &'a PageLayout) -> Self {
        Self {
            layout,
            pages: vec![Vec::new()],
            y: layout.top(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.pages.last().map(|p| p.is_empty()).unwrap_or(true)
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = self.layout.top();
    }

    fn place(&mut self, text: String, font_size: f32) {
        let advance = font_size * self.layout.line_height;
        if self.y - advance < self.layout.margin && !self.at_page_top() {
            self.new_page();
        }
        self.y -= advance;
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.push(DocumentLine { text, font_size, y });
        }
    }

    /// Vertical gap of one body line, dropped at the top of a page
    fn gap(&mut self) {
        if self.at_page_top() {
            return;
        }
        // Clamped at the margin so the next placed line opens the new page
        let advance = self.layout.font_size * self.layout.line_height;
        self.y = (self.y - advance).max(self.layout.margin);
    }
}

/// Lay out a title and body text into pages of positioned lines.
///
/// Always returns at least one page. Blank lines in `text` become vertical
/// gaps; every other line is wrapped to the printable width and each
/// wrapped line is placed whole on a single page.
pub fn layout_document(title: &str, text: &str, layout: &PageLayout) -> Vec<Vec<DocumentLine>> {
    let width = layout.printable_width();
    let mut cursor = Cursor::new(layout);

    let title_lines = wrap(title.trim(), layout.title_font_size, width);
    let has_title = !title_lines.is_empty();
    for line in title_lines {
        cursor.place(line, layout.title_font_size);
    }
    if has_title {
        cursor.gap();
    }

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            cursor.gap();
            continue;
        }
        for line in wrap(paragraph, layout.font_size, width) {
            cursor.place(line, layout.font_size);
        }
    }

    let pages = cursor.pages;
    tracing::debug!(
        pages = pages.len(),
        lines = pages.iter().map(Vec::len).sum::<usize>(),
        "Document laid out"
    );
    pages
}

/// Render a title and body text as a PDF
pub fn encode_document(title: &str, text: &str, layout: &PageLayout) -> Result<Vec<u8>> {
    let pages = layout_document(title, text, layout);
    let (width, height) = layout.page.dimensions();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), line.font_size.into()],
            ));
            operations.push(Operation::new(
                "Td",
                vec![layout.margin.into(), line.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    win_ansi_bytes(&line.text),
                    StringFormat::Literal,
                )],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi_bytes(title.trim())),
        "Producer" => Object::string_literal("syllabo"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| SyllaboError::write_failed("PDF document", e))?;

    tracing::debug!(pages = count, bytes = bytes.len(), "Encoded document");
    Ok(bytes)
}
