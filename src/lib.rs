mod error;
mod fonts;
mod model;
mod pdf;
pub mod report;

pub use error::{Error, Result, Warning};
pub use fonts::{Measure, StandardMetrics, TextLine};
pub use model::{
    Alignment, Block, CellStyle, Color, Content, Document, FontSize, Heading, PageGeometry,
    Paragraph, Table, TableStyle, TextStyle, Weight,
};
pub use pdf::layout::{
    Fragment, FragmentContent, Layout, LayoutOptions, PagePlan, TableSlice, paginate,
};
pub use pdf::table::{CellLayout, RowLayout};
pub use pdf::writer::{DocumentInfo, GridRow, GridStyle, PdfDocumentWriter, PdfWriter};
pub use pdf::{RenderOptions, render};

use std::path::Path;
use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub layout: LayoutOptions,
    pub render: RenderOptions,
}

/// A finished document and the diagnostics collected while laying it out.
#[derive(Debug)]
pub struct Generated {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<Warning>,
}

/// Lay out and render `content` with the standard metrics and default options.
pub fn generate(content: Content, geometry: PageGeometry) -> Result<Generated> {
    generate_with(content, geometry, &StandardMetrics::new(), &Options::default())
}

pub fn generate_with<M: Measure + ?Sized>(
    content: Content,
    geometry: PageGeometry,
    measurer: &M,
    options: &Options,
) -> Result<Generated> {
    let t0 = Instant::now();

    let document = Document::new(content, geometry)?;
    let layout = paginate(&document, measurer, &options.layout)?;
    let t_layout = t0.elapsed();

    let writer = PdfDocumentWriter::new(options.render.document_info());
    let bytes = render(
        &layout.pages,
        &document.geometry,
        measurer,
        &options.render,
        writer,
    )?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, render={:.1}ms, total={:.1}ms (blocks {}, pages {}, output {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        document.blocks.len(),
        layout.pages.len(),
        bytes.len(),
    );

    Ok(Generated {
        bytes,
        page_count: layout.pages.len(),
        warnings: layout.warnings,
    })
}

/// Generate with defaults and write the result to `output`.
pub fn generate_to_file(
    content: Content,
    geometry: PageGeometry,
    output: &Path,
) -> Result<Vec<Warning>> {
    let generated = generate(content, geometry)?;
    std::fs::write(output, &generated.bytes)?;
    Ok(generated.warnings)
}
