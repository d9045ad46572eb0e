pub mod layout;
pub mod table;
pub mod writer;

use crate::error::Result;
use crate::fonts::{ASCENDER_RATIO, Measure, TextLine};
use crate::model::{Alignment, Color, FontSize, PageGeometry, TextStyle, Weight};

use layout::{Fragment, FragmentContent, PagePlan, TableSlice};
use table::RowLayout;
use writer::{DocumentInfo, GridRow, GridStyle, PdfWriter};

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Draw "Page N of M" centred in the bottom margin.
    pub page_numbers: bool,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl RenderOptions {
    pub fn document_info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }
}

const FOOTER_STYLE: TextStyle = TextStyle::new(FontSize::Small, Weight::Regular, Alignment::Center)
    .with_color(Color(128, 128, 128));

fn line_x(alignment: Alignment, left: f32, width: f32, line_width: f32) -> f32 {
    match alignment {
        Alignment::Left => left,
        Alignment::Center => left + (width - line_width) / 2.0,
        Alignment::Right => left + width - line_width,
    }
}

fn draw_lines<W: PdfWriter>(
    writer: &mut W,
    lines: &[TextLine],
    style: &TextStyle,
    left: f32,
    width: f32,
    top: f32,
    line_height: f32,
) -> Result<()> {
    let first_baseline = top - style.size.points() * ASCENDER_RATIO;
    for (i, line) in lines.iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        let x = line_x(style.alignment, left, width, line.width);
        let y = first_baseline - i as f32 * line_height;
        writer.draw_text(x, y, &line.text, style)?;
    }
    Ok(())
}

fn render_row<W: PdfWriter>(
    writer: &mut W,
    row: &RowLayout,
    col_widths: &[f32],
    padding: f32,
    left: f32,
    row_top: f32,
) -> Result<()> {
    let mut cell_x = left;
    for (cell, &col_w) in row.cells.iter().zip(col_widths) {
        let text_w = (col_w - 2.0 * padding).max(0.0);
        draw_lines(
            writer,
            &cell.lines,
            &cell.style,
            cell_x + padding,
            text_w,
            row_top - padding,
            cell.line_height,
        )?;
        cell_x += col_w;
    }
    Ok(())
}

fn render_table_slice<W: PdfWriter>(
    writer: &mut W,
    slice: &TableSlice<'_>,
    left: f32,
    top: f32,
) -> Result<()> {
    let style = &slice.table.style;
    let grid_rows: Vec<GridRow> = slice
        .all_rows()
        .map(|r| GridRow {
            height: r.height,
            fills: r.cells.iter().map(|c| c.fill).collect(),
        })
        .collect();
    writer.draw_table_grid(
        left,
        top,
        &grid_rows,
        &slice.col_widths,
        &GridStyle {
            color: style.grid_color,
            line_width: style.grid_width,
        },
    )?;

    let mut row_top = top;
    for row in slice.all_rows() {
        render_row(writer, row, &slice.col_widths, style.cell_padding, left, row_top)?;
        row_top -= row.height;
    }
    Ok(())
}

fn render_fragment<W: PdfWriter>(
    writer: &mut W,
    geometry: &PageGeometry,
    fragment: &Fragment<'_>,
) -> Result<()> {
    let left = geometry.margin_pt;
    let top = geometry.height_pt - geometry.margin_pt - fragment.offset;
    match &fragment.content {
        FragmentContent::Text {
            style,
            lines,
            line_height,
        } => draw_lines(
            writer,
            lines,
            style,
            left,
            geometry.content_width(),
            top,
            *line_height,
        ),
        FragmentContent::Spacer => Ok(()),
        FragmentContent::Table(slice) => render_table_slice(writer, slice, left, top),
    }
}

/// Emit every page plan, in order, through `writer` and return the finished bytes.
pub fn render<W: PdfWriter, M: Measure + ?Sized>(
    pages: &[PagePlan<'_>],
    geometry: &PageGeometry,
    measurer: &M,
    options: &RenderOptions,
    mut writer: W,
) -> Result<Vec<u8>> {
    let total = pages.len();
    for page in pages {
        writer.begin_page(geometry.width_pt, geometry.height_pt)?;
        for fragment in &page.fragments {
            render_fragment(&mut writer, geometry, fragment)?;
        }
        if options.page_numbers {
            let label = format!("Page {} of {}", page.index + 1, total);
            let width = measurer.text_width(&label, &FOOTER_STYLE)?;
            let x = line_x(
                FOOTER_STYLE.alignment,
                geometry.margin_pt,
                geometry.content_width(),
                width,
            );
            writer.draw_text(x, geometry.margin_pt / 2.0, &label, &FOOTER_STYLE)?;
        }
        writer.end_page()?;
    }
    writer.finish()
}
