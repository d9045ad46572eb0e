use crate::error::Result;
use crate::fonts::{Measure, TextLine, cell_text_width};
use crate::model::{Color, Table, TextStyle};

/// Resolve column widths for `table` across `content_width`.
///
/// Starts from the caller's relative weights (even split when absent), then
/// auto-fits: columns whose longest unbreakable word (plus padding) does not
/// fit grow, the others shrink proportionally. The result always sums to
/// `content_width`; words wider than their final column sit on their own line.
pub(crate) fn column_widths<M: Measure + ?Sized>(
    table: &Table,
    measurer: &M,
    content_width: f32,
) -> Result<Vec<f32>> {
    let ncols = table.column_count();
    if ncols == 0 {
        return Ok(Vec::new());
    }

    let mut widths: Vec<f32> = match &table.style.column_weights {
        Some(weights) => {
            let sum: f32 = weights.iter().sum();
            weights.iter().map(|w| content_width * w / sum).collect()
        }
        None => vec![content_width / ncols as f32; ncols],
    };

    let padding = 2.0 * table.style.cell_padding;
    let mut min_widths = vec![0.0f32; ncols];
    let mut widen = |col: usize, cell: &str, style: &TextStyle| -> Result<()> {
        for word in cell.split_whitespace() {
            let ww = measurer.text_width(word, style)? + padding;
            min_widths[col] = min_widths[col].max(ww);
        }
        Ok(())
    };
    if let Some(header) = &table.header {
        for (col, cell) in header.iter().enumerate() {
            widen(col, cell, &table.style.header)?;
        }
    }
    for (ri, row) in table.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            widen(col, cell, table.body_style(ri, col))?;
        }
    }

    let mut extra_needed: f32 = 0.0;
    let mut shrinkable: f32 = 0.0;
    for i in 0..ncols {
        if min_widths[i] > widths[i] {
            extra_needed += min_widths[i] - widths[i];
            widths[i] = min_widths[i];
        } else {
            shrinkable += widths[i] - min_widths[i];
        }
    }

    if extra_needed > 0.0 && shrinkable > 0.0 {
        let factor = extra_needed.min(shrinkable) / shrinkable;
        for i in 0..ncols {
            if widths[i] > min_widths[i] {
                let available = widths[i] - min_widths[i];
                widths[i] -= available * factor;
            }
        }
    }

    // Growth that could not be paid for by shrinking is scaled back out.
    let new_total: f32 = widths.iter().sum();
    if new_total > 0.0 && (new_total - content_width).abs() > 0.01 {
        let scale = content_width / new_total;
        for w in &mut widths {
            *w *= scale;
        }
    }

    log::debug!("TABLE cols={ncols} widths={widths:?}");
    Ok(widths)
}

/// One wrapped cell with the style it is drawn in.
#[derive(Clone, Debug)]
pub struct CellLayout {
    pub lines: Vec<TextLine>,
    pub style: TextStyle,
    pub line_height: f32,
    pub fill: Option<Color>,
}

/// A table row after wrapping, ready to place.
#[derive(Clone, Debug)]
pub struct RowLayout {
    /// Body row index; `None` for the header row.
    pub index: Option<usize>,
    pub height: f32,
    pub cells: Vec<CellLayout>,
}

impl RowLayout {
    pub fn text(&self, col: usize) -> String {
        self.cells.get(col).map_or_else(String::new, |c| {
            c.lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

pub(crate) fn layout_row<M: Measure + ?Sized>(
    measurer: &M,
    index: Option<usize>,
    cells: &[String],
    col_widths: &[f32],
    styles: &[TextStyle],
    fills: &[Option<Color>],
    padding: f32,
) -> Result<RowLayout> {
    let height = measurer.measure_row(cells, col_widths, styles, padding)?;
    let cells = cells
        .iter()
        .zip(col_widths)
        .zip(styles.iter().zip(fills))
        .map(|((cell, &w), (style, &fill))| {
            Ok(CellLayout {
                lines: measurer.wrap(cell, style, cell_text_width(w, padding))?,
                style: *style,
                line_height: measurer.line_height(style)?,
                fill,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RowLayout {
        index,
        height,
        cells,
    })
}

/// Header plus all body rows of a table, measured once per layout pass.
pub(crate) struct TableRows {
    pub(crate) col_widths: Vec<f32>,
    pub(crate) header: Option<RowLayout>,
    pub(crate) body: Vec<RowLayout>,
}

impl TableRows {
    pub(crate) fn build<M: Measure + ?Sized>(
        table: &Table,
        measurer: &M,
        content_width: f32,
    ) -> Result<Self> {
        let col_widths = column_widths(table, measurer, content_width)?;
        let ncols = col_widths.len();
        let padding = table.style.cell_padding;
        let header = table
            .header
            .as_ref()
            .map(|cells| {
                layout_row(
                    measurer,
                    None,
                    cells,
                    &col_widths,
                    &vec![table.style.header; ncols],
                    &vec![table.style.header_fill; ncols],
                    padding,
                )
            })
            .transpose()?;
        let body = table
            .rows
            .iter()
            .enumerate()
            .map(|(ri, row)| {
                let styles: Vec<TextStyle> =
                    (0..ncols).map(|ci| *table.body_style(ri, ci)).collect();
                let fills: Vec<Option<Color>> =
                    (0..ncols).map(|ci| table.body_fill(ri, ci)).collect();
                layout_row(measurer, Some(ri), row, &col_widths, &styles, &fills, padding)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            col_widths,
            header,
            body,
        })
    }

    pub(crate) fn header_height(&self) -> f32 {
        self.header.as_ref().map_or(0.0, |h| h.height)
    }

    /// Height of the smallest unit that may start a page: header plus first row.
    pub(crate) fn lead_height(&self) -> f32 {
        self.header_height() + self.body.first().map_or(0.0, |r| r.height)
    }
}
