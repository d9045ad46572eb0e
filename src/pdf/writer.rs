use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::{Error, Result};
use crate::fonts::to_winansi_bytes;
use crate::model::{Color, TextStyle, Weight};

/// One row band of a table grid, with a background per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct GridRow {
    pub height: f32,
    pub fills: Vec<Option<Color>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStyle {
    pub color: Color,
    pub line_width: f32,
}

/// The drawing contract the renderer needs from a PDF library.
///
/// Coordinates are PDF user space (points, origin bottom-left). `draw_text`
/// takes the baseline origin; `draw_table_grid` takes the top-left corner.
pub trait PdfWriter {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()>;

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) -> Result<()>;

    fn draw_table_grid(
        &mut self,
        x: f32,
        y: f32,
        rows: &[GridRow],
        col_widths: &[f32],
        style: &GridStyle,
    ) -> Result<()>;

    fn end_page(&mut self) -> Result<()>;

    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Document information dictionary entries.
#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
}

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";

struct OpenPage {
    width: f32,
    height: f32,
    content: Content,
}

/// `PdfWriter` over the `pdf-writer` crate.
///
/// Text uses the standard Type1 Helvetica faces with WinAnsi encoding, so no
/// font data is embedded. Page content streams are Flate-compressed. Nothing
/// time-dependent is written, so equal call sequences give equal bytes.
pub struct PdfDocumentWriter {
    info: DocumentInfo,
    pages: Vec<(f32, f32, Vec<u8>)>,
    open: Option<OpenPage>,
}

impl PdfDocumentWriter {
    pub fn new(info: DocumentInfo) -> Self {
        Self {
            info,
            pages: Vec::new(),
            open: None,
        }
    }

    fn page(&mut self, op: &str) -> Result<&mut OpenPage> {
        self.open
            .as_mut()
            .ok_or_else(|| Error::Render(format!("{op} called outside begin_page/end_page")))
    }
}

impl Default for PdfDocumentWriter {
    fn default() -> Self {
        Self::new(DocumentInfo::default())
    }
}

fn check_finite(op: &str, values: &[f32]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::Render(format!("{op}: non-finite coordinate in {values:?}")))
    }
}

fn set_fill(content: &mut Content, color: Option<Color>) {
    match color {
        Some(c) => {
            let (r, g, b) = c.to_rgb();
            content.set_fill_rgb(r, g, b);
        }
        None => {
            content.set_fill_gray(0.0);
        }
    }
}

impl PdfWriter for PdfDocumentWriter {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()> {
        if self.open.is_some() {
            return Err(Error::Render("begin_page while a page is open".into()));
        }
        check_finite("begin_page", &[width, height])?;
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::Render(format!("begin_page: empty page {width}x{height}")));
        }
        self.open = Some(OpenPage {
            width,
            height,
            content: Content::new(),
        });
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) -> Result<()> {
        check_finite("draw_text", &[x, y])?;
        let page = self.page("draw_text")?;
        if text.is_empty() {
            return Ok(());
        }
        let font = match style.weight {
            Weight::Regular => REGULAR_FONT,
            Weight::Bold => BOLD_FONT,
        };
        let content = &mut page.content;
        content.begin_text();
        set_fill(content, style.color);
        content.set_font(Name(font), style.size.points());
        content.next_line(x, y);
        content.show(Str(&to_winansi_bytes(text)));
        content.end_text();
        Ok(())
    }

    fn draw_table_grid(
        &mut self,
        x: f32,
        y: f32,
        rows: &[GridRow],
        col_widths: &[f32],
        style: &GridStyle,
    ) -> Result<()> {
        check_finite("draw_table_grid", &[x, y, style.line_width])?;
        check_finite("draw_table_grid", col_widths)?;
        let page = self.page("draw_table_grid")?;
        let content = &mut page.content;
        let table_w: f32 = col_widths.iter().sum();
        let table_h: f32 = rows.iter().map(|r| r.height).sum();

        content.save_state();
        let mut row_top = y;
        for row in rows {
            let mut cell_x = x;
            for (fill, w) in row.fills.iter().zip(col_widths) {
                if let Some(fill) = fill {
                    let (r, g, b) = fill.to_rgb();
                    content.set_fill_rgb(r, g, b);
                    content.rect(cell_x, row_top - row.height, *w, row.height);
                    content.fill_nonzero();
                }
                cell_x += w;
            }
            row_top -= row.height;
        }

        if style.line_width > 0.0 {
            let (r, g, b) = style.color.to_rgb();
            content.set_stroke_rgb(r, g, b);
            content.set_line_width(style.line_width);
            content.move_to(x, y);
            content.line_to(x + table_w, y);
            let mut row_top = y;
            for row in rows {
                row_top -= row.height;
                content.move_to(x, row_top);
                content.line_to(x + table_w, row_top);
            }
            let mut col_x = x;
            content.move_to(col_x, y);
            content.line_to(col_x, y - table_h);
            for w in col_widths {
                col_x += w;
                content.move_to(col_x, y);
                content.line_to(col_x, y - table_h);
            }
            content.stroke();
        }
        content.restore_state();
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let page = self
            .open
            .take()
            .ok_or_else(|| Error::Render("end_page without begin_page".into()))?;
        let raw = page.content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        self.pages.push((page.width, page.height, compressed));
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        if self.open.is_some() {
            return Err(Error::Render("finish called with a page still open".into()));
        }
        if self.pages.is_empty() {
            return Err(Error::Render("document has no pages".into()));
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let regular_ref = alloc();
        let bold_ref = alloc();
        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        pdf.type1_font(regular_ref)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_ref)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for (i, (width, height, data)) in self.pages.iter().enumerate() {
            pdf.stream(content_ids[i], data).filter(Filter::FlateDecode);
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, *width, *height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(REGULAR_FONT), regular_ref);
            fonts.pair(Name(BOLD_FONT), bold_ref);
        }

        if self.info.title.is_some() || self.info.author.is_some() {
            let info_id = alloc();
            let mut info = pdf.document_info(info_id);
            if let Some(title) = &self.info.title {
                info.title(TextStr(title));
            }
            if let Some(author) = &self.info.author {
                info.author(TextStr(author));
            }
            info.producer(TextStr(concat!("pagewright-pdf ", env!("CARGO_PKG_VERSION"))));
        }

        log::debug!("PDF assembled: pages={n}");
        Ok(pdf.finish())
    }
}
