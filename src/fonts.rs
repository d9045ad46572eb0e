use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::model::{Block, TextStyle, Weight};

/// One wrapped line of text and its advance width in points.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
}

/// Sizes styled text for the layout engine.
///
/// Implementors only provide `text_width` and `line_height`; wrapping and
/// block/row heights are derived from those two. Overriding `measure` or
/// `measure_row` is allowed, but heights must stay deterministic, and for a
/// paragraph a wider `available_width` must never give a taller result.
pub trait Measure: Sync {
    fn text_width(&self, text: &str, style: &TextStyle) -> Result<f32>;

    fn line_height(&self, style: &TextStyle) -> Result<f32>;

    /// Greedy word wrap. `\n` forces a break; a word wider than `width` sits
    /// alone on its own line.
    fn wrap(&self, text: &str, style: &TextStyle, width: f32) -> Result<Vec<TextLine>> {
        check_width(width)?;
        let space_w = self.text_width(" ", style)?;
        let mut lines = Vec::new();

        for hard_line in text.split('\n') {
            let mut current = String::new();
            let mut current_w = 0.0f32;
            for word in hard_line.split_whitespace() {
                let ww = self.text_width(word, style)?;
                if current.is_empty() {
                    current.push_str(word);
                    current_w = ww;
                } else if current_w + space_w + ww > width {
                    lines.push(TextLine {
                        text: std::mem::take(&mut current),
                        width: current_w,
                    });
                    current.push_str(word);
                    current_w = ww;
                } else {
                    current.push(' ');
                    current.push_str(word);
                    current_w += space_w + ww;
                }
            }
            // Blank hard lines keep their vertical space.
            lines.push(TextLine {
                text: current,
                width: current_w,
            });
        }
        Ok(lines)
    }

    fn measure(&self, block: &Block, available_width: f32) -> Result<f32> {
        check_width(available_width)?;
        match block {
            Block::Heading(h) => {
                let style = h.style();
                let lines = self.wrap(&h.text, &style, available_width)?;
                Ok(lines.len() as f32 * self.line_height(&style)?)
            }
            Block::Paragraph(p) => {
                let lines = self.wrap(&p.text, &p.style, available_width)?;
                Ok(lines.len() as f32 * self.line_height(&p.style)?)
            }
            Block::Spacer(h) => Ok(*h),
            Block::Table(table) => {
                let col_widths = crate::pdf::table::column_widths(table, self, available_width)?;
                let padding = table.style.cell_padding;
                let mut total = 0.0;
                if let Some(header) = &table.header {
                    let styles = vec![table.style.header; header.len()];
                    total += self.measure_row(header, &col_widths, &styles, padding)?;
                }
                for (ri, row) in table.rows.iter().enumerate() {
                    let styles: Vec<TextStyle> = (0..row.len())
                        .map(|ci| *table.body_style(ri, ci))
                        .collect();
                    total += self.measure_row(row, &col_widths, &styles, padding)?;
                }
                Ok(total)
            }
        }
    }

    /// Height of one table row: the tallest wrapped cell plus top and bottom
    /// padding. `styles` holds one style per cell.
    fn measure_row(
        &self,
        cells: &[String],
        col_widths: &[f32],
        styles: &[TextStyle],
        padding: f32,
    ) -> Result<f32> {
        if cells.len() != col_widths.len() || cells.len() != styles.len() {
            return Err(Error::Measurement(format!(
                "row has {} cells, {} column widths and {} styles",
                cells.len(),
                col_widths.len(),
                styles.len()
            )));
        }
        let mut tallest = 0.0f32;
        for ((cell, &col_w), style) in cells.iter().zip(col_widths).zip(styles) {
            let lines = self.wrap(cell, style, cell_text_width(col_w, padding))?;
            tallest = tallest.max(lines.len() as f32 * self.line_height(style)?);
        }
        Ok(tallest + 2.0 * padding)
    }
}

pub(crate) fn cell_text_width(col_width: f32, padding: f32) -> f32 {
    (col_width - 2.0 * padding).max(1.0)
}

fn check_width(width: f32) -> Result<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(Error::Measurement(format!(
            "available width {width} is not a positive length"
        )));
    }
    Ok(())
}

const LINE_HEIGHT_RATIO: f32 = 1.2;
pub(crate) const ASCENDER_RATIO: f32 = 0.75;

/// Advance widths as fractions of the em for WinAnsi bytes 32..=255.
struct WidthTables {
    regular: Vec<f32>,
    bold: Vec<f32>,
}

static WIDTH_TABLES: OnceLock<WidthTables> = OnceLock::new();

fn em_fractions(units: &[u16; 224]) -> Vec<f32> {
    units.iter().map(|&w| w as f32 / 1000.0).collect()
}

fn width_tables() -> &'static WidthTables {
    WIDTH_TABLES.get_or_init(|| {
        log::debug!("building standard font width tables");
        WidthTables {
            regular: em_fractions(&HELVETICA_WIDTHS),
            bold: em_fractions(&HELVETICA_BOLD_WIDTHS),
        }
    })
}

/// Default measurement provider using the metrics of the standard
/// Helvetica / Helvetica-Bold faces the PDF writer references.
///
/// The width tables are process-wide and built once; the provider is a
/// cheap read-only handle that can be shared across threads.
#[derive(Clone, Copy)]
pub struct StandardMetrics {
    tables: &'static WidthTables,
}

impl StandardMetrics {
    pub fn new() -> Self {
        Self {
            tables: width_tables(),
        }
    }

    fn widths(&self, weight: Weight) -> &[f32] {
        match weight {
            Weight::Regular => &self.tables.regular,
            Weight::Bold => &self.tables.bold,
        }
    }
}

impl Default for StandardMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Measure for StandardMetrics {
    fn text_width(&self, text: &str, style: &TextStyle) -> Result<f32> {
        let widths = self.widths(style.weight);
        let size = style.size.points();
        Ok(to_winansi_bytes(text)
            .iter()
            .map(|&b| widths[(b - 32) as usize] * size)
            .sum())
    }

    fn line_height(&self, style: &TextStyle) -> Result<f32> {
        Ok(style.size.points() * LINE_HEIGHT_RATIO)
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Control characters become spaces and unmappable characters become `?`, so
/// every output byte is >= 32 and has a width entry.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| {
            if c.is_control() {
                b' '
            } else {
                match char_to_winansi(c) {
                    0 => b'?',
                    b => b,
                }
            }
        })
        .collect()
}

// Advance widths from the Adobe core AFM files (Helvetica, Helvetica-Bold),
// 1000 units/em, indexed by WinAnsi code - 32. Unassigned codes are 0.
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0, // 0x70
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xa0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xb0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xc0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xd0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xe0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xf0
];

const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0x30
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 0x40
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 0x50
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 0x60
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 0, // 0x70
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xa0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xb0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xc0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xd0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xe0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xf0
];
