#![allow(dead_code)]

use pagewright_pdf::{
    Block, Content, Error, GridRow, GridStyle, Measure, PageGeometry, PagePlan, PdfWriter,
    Result, TextStyle,
};

/// 600x850 page with a 50pt margin: 500pt wide, 750pt tall content area.
pub const GEOMETRY: PageGeometry = PageGeometry {
    width_pt: 600.0,
    height_pt: 850.0,
    margin_pt: 50.0,
};

pub const HEADING_HEIGHT: f32 = 20.0;

/// Measurer with heights spelled out in the text: a paragraph or cell reading
/// `h=700` is 700pt tall. Headings are always 20pt; unmarked text is one 10pt line.
pub struct FixedHeights;

fn declared_height(text: &str) -> Option<f32> {
    text.strip_prefix("h=")?.split_whitespace().next()?.parse().ok()
}

impl Measure for FixedHeights {
    fn text_width(&self, text: &str, _style: &TextStyle) -> Result<f32> {
        Ok(text.chars().count() as f32 * 5.0)
    }

    fn line_height(&self, _style: &TextStyle) -> Result<f32> {
        Ok(10.0)
    }

    fn measure(&self, block: &Block, _available_width: f32) -> Result<f32> {
        Ok(match block {
            Block::Heading(_) => HEADING_HEIGHT,
            Block::Paragraph(p) => declared_height(&p.text).unwrap_or(10.0),
            Block::Spacer(h) => *h,
            Block::Table(t) => {
                let header = t.header.as_deref().map_or(0.0, row_height);
                header + t.rows.iter().map(|r| row_height(r)).sum::<f32>()
            }
        })
    }

    fn measure_row(
        &self,
        cells: &[String],
        _col_widths: &[f32],
        _styles: &[TextStyle],
        _padding: f32,
    ) -> Result<f32> {
        Ok(row_height(cells))
    }
}

fn row_height(cells: &[String]) -> f32 {
    cells
        .iter()
        .filter_map(|c| declared_height(c))
        .fold(10.0, f32::max)
}

pub fn para(content: &mut Content, height: u32) {
    content
        .add_paragraph(format!("h={height}"), TextStyle::default())
        .unwrap();
}

pub fn table(content: &mut Content, header: u32, rows: &[u32]) {
    content
        .add_table(
            vec![format!("h={header}"), "Name".to_string()],
            rows.iter()
                .enumerate()
                .map(|(i, h)| vec![format!("h={h}"), format!("row {i}")])
                .collect(),
        )
        .unwrap();
}

/// Body row indices of every table fragment on `page`.
pub fn table_rows(page: &PagePlan<'_>) -> Vec<usize> {
    page.fragments
        .iter()
        .filter_map(|f| match &f.content {
            pagewright_pdf::FragmentContent::Table(slice) => Some(slice),
            _ => None,
        })
        .flat_map(|slice| slice.body_rows())
        .collect()
}

/// Writer that records the call sequence instead of producing a PDF.
/// `finish` returns the log, one call per line.
#[derive(Default)]
pub struct RecordingWriter {
    pub calls: Vec<String>,
    pub fail_on_text: bool,
}

impl PdfWriter for RecordingWriter {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()> {
        self.calls.push(format!("begin {width}x{height}"));
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, _style: &TextStyle) -> Result<()> {
        if self.fail_on_text {
            return Err(Error::Render("writer out of memory".into()));
        }
        self.calls.push(format!("text {x:.1},{y:.1} {text}"));
        Ok(())
    }

    fn draw_table_grid(
        &mut self,
        _x: f32,
        y: f32,
        rows: &[GridRow],
        col_widths: &[f32],
        _style: &GridStyle,
    ) -> Result<()> {
        self.calls.push(format!(
            "grid y={y:.1} rows={} cols={}",
            rows.len(),
            col_widths.len()
        ));
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        self.calls.push("end".to_string());
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.calls.join("\n").into_bytes())
    }
}
