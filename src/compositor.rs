//! Places header, page fraction and row text for one page at calibrated
//! coordinates.

use crate::config::LayoutConfig;
use crate::rows::LogicalRow;
use handreceipt_layout::{FontMetrics, StandardFont, wrap};
use handreceipt_pdf_composer::{ComposerError, Overlay};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use serde::Serialize;

/// Lines of one wrapped field that are drawn; the rest are counted as dropped.
pub const MAX_FIELD_LINES: usize = 2;

/// Font resource name used inside every overlay.
const FONT_RESOURCE: &str = "F1";

/// Names printed in the header of the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderMeta {
    pub issued_from: String,
    pub issued_to: String,
    pub to_contact: String,
}

impl HeaderMeta {
    pub fn new(issued_from: &str, issued_to: &str, to_contact: &str) -> Self {
        Self {
            issued_from: issued_from.to_string(),
            issued_to: issued_to.to_string(),
            to_contact: to_contact.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextRole {
    IssuedFrom,
    IssuedTo,
    Contact,
    PageFraction,
    Description,
    Quantity,
}

/// A single string placed at an absolute baseline position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub text: String,
    /// Left edge of the text, after any right alignment.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub role: TextRole,
}

/// Everything drawn on one overlay page.
#[derive(Debug, Clone, Serialize)]
pub struct PageSurface {
    pub page_no: usize,
    pub of_pages: usize,
    #[serde(skip)]
    pub font: StandardFont,
    pub runs: Vec<TextRun>,
    /// Physical lines cut off by the two-line cap.
    pub truncated_lines: usize,
}

impl PageSurface {
    fn new(page_no: usize, of_pages: usize, font: StandardFont) -> Self {
        Self { page_no, of_pages, font, runs: Vec::new(), truncated_lines: 0 }
    }

    /// Runs drawn for `role`, in drawing order.
    pub fn runs_for(&self, role: TextRole) -> impl Iterator<Item = &TextRun> {
        self.runs.iter().filter(move |run| run.role == role)
    }

    fn text(&mut self, role: TextRole, text: &str, x: f32, y: f32, size: f32) {
        self.runs.push(TextRun { text: text.to_string(), x, y, size, role });
    }

    fn text_right(&mut self, role: TextRole, text: &str, right: f32, y: f32, size: f32) {
        let x = right - self.font.text_width(text, size);
        self.text(role, text, x, y, size);
    }

    /// Draws at most two wrapped lines of `text`, the first at `y` and the
    /// second one point smaller just below it.
    fn wrapped(&mut self, role: TextRole, text: &str, x: f32, y: f32, size: f32, max_width: f32) {
        let font = self.font;
        let mut lines = wrap(text, &font, size, max_width);
        if let Some(first) = lines.next() {
            self.text(role, &first, x, y, size);
        }
        if let Some(second) = lines.next() {
            let smaller = size - 1.0;
            self.text(role, &second, x, y - smaller - 1.0, smaller);
        }
        self.count_overflow(text, lines);
    }

    fn count_overflow(&mut self, text: &str, rest: impl Iterator<Item = String>) {
        let dropped = rest.count();
        if dropped > 0 {
            log::warn!(
                "Page {}: {} wrapped line(s) of '{}' do not fit and were dropped",
                self.page_no,
                dropped,
                text
            );
            self.truncated_lines += dropped;
        }
    }

    /// Encodes the runs as a PDF content stream that uses one font resource.
    pub fn to_overlay(&self) -> Result<Overlay, ComposerError> {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        ];
        let mut current_size = None;
        for run in &self.runs {
            if current_size != Some(run.size) {
                let font = Object::Name(FONT_RESOURCE.into());
                operations.push(Operation::new("Tf", vec![font, run.size.into()]));
                current_size = Some(run.size);
            }
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), run.x.into(), run.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(to_win_ansi(&run.text), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }.encode()?;
        Ok(Overlay {
            content,
            fonts: vec![(FONT_RESOURCE.to_string(), self.font.postscript_name().to_string())],
        })
    }
}

/// Lays out one page of the hand receipt.
///
/// Header fields appear only when `is_first`; the page fraction appears on
/// every page. At most the page's row capacity is drawn from `rows`.
pub fn render_page(
    meta: &HeaderMeta,
    rows: &[LogicalRow],
    page_no: usize,
    of_pages: usize,
    is_first: bool,
    cfg: &LayoutConfig,
) -> PageSurface {
    let font = cfg.font().unwrap_or_else(|err| {
        log::warn!("{}; drawing with {}", err, StandardFont::default());
        StandardFont::default()
    });
    let mut page = PageSurface::new(page_no, of_pages, font);
    let hdr = cfg.font_size_hdr;

    if is_first {
        let from = meta.issued_from.trim();
        if !from.is_empty() {
            page.text(TextRole::IssuedFrom, from, cfg.x_from, cfg.y_from, hdr);
        }
        let to = meta.issued_to.trim();
        if !to.is_empty() {
            page.text(TextRole::IssuedTo, to, cfg.x_to, cfg.y_to, hdr);
        }
        let contact = meta.to_contact.trim();
        if !contact.is_empty() {
            let block = format!("Contact: {contact}");
            let mut lines = wrap(&block, &font, hdr, cfg.contact_max_width);
            let mut y = cfg.y_to - cfg.to_contact_offset;
            for line in lines.by_ref().take(MAX_FIELD_LINES) {
                page.text(TextRole::Contact, &line, cfg.x_to, y, hdr);
                y -= hdr + 2.0;
            }
            page.count_overflow(&block, lines);
        }
    }

    page.text_right(
        TextRole::PageFraction,
        &format!("{page_no}/{of_pages}"),
        cfg.x_page_right,
        cfg.y_identifier,
        hdr,
    );

    let (start_y, capacity) = if is_first {
        (cfg.item_start_y_first, cfg.rows_first)
    } else {
        (cfg.item_start_y_next, cfg.rows_next)
    };
    if rows.len() > capacity {
        log::debug!(
            "Page {} received {} rows but holds {}; drawing the first {}",
            page_no,
            rows.len(),
            capacity,
            capacity
        );
    }

    let size = cfg.font_size;
    let mut y = start_y;
    for row in rows.iter().take(capacity) {
        page.wrapped(
            TextRole::Description,
            &row.line1,
            cfg.item_desc_x,
            y,
            size,
            cfg.item_desc_max_width,
        );
        page.text_right(TextRole::Quantity, &row.quantity.to_string(), cfg.qty_auth_x, y, size);
        if let Some(line2) = &row.line2 {
            page.wrapped(
                TextRole::Description,
                line2,
                cfg.item_desc_x,
                y - cfg.second_line_offset,
                size,
                cfg.item_desc_max_width,
            );
        }
        y -= cfg.line_spacing;
    }

    page
}

/// Encodes `text` for a font using WinAnsiEncoding. Characters outside the
/// encoding become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}
