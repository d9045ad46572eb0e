use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result, Warning};
use crate::fonts::{Measure, TextLine};
use crate::model::{Block, Document, Table, TextStyle};

use super::table::{RowLayout, TableRows};

/// Slack for float accumulation when testing whether a height fits.
const FIT_EPSILON: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct LayoutOptions {
    /// Vertical gap between consecutive fragments on a page.
    pub block_spacing: f32,
    /// Move a heading to the next page when its following content would not fit.
    pub keep_with_next: bool,
    /// Checked at every page commit; set it to abort layout.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            block_spacing: 6.0,
            keep_with_next: true,
            cancel: None,
        }
    }
}

/// Rows of one table placed on one page.
#[derive(Debug)]
pub struct TableSlice<'a> {
    pub table: &'a Table,
    pub col_widths: Vec<f32>,
    /// `None` for tables without a header row.
    pub header: Option<RowLayout>,
    pub rows: Vec<RowLayout>,
    /// True on continuation pages of a table whose header is repeated.
    pub repeated_header: bool,
}

impl TableSlice<'_> {
    pub fn height(&self) -> f32 {
        self.header.as_ref().map_or(0.0, |h| h.height)
            + self.rows.iter().map(|r| r.height).sum::<f32>()
    }

    /// Header (if any) followed by the body rows, top to bottom.
    pub fn all_rows(&self) -> impl Iterator<Item = &RowLayout> {
        self.header.iter().chain(&self.rows)
    }

    pub fn body_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().filter_map(|r| r.index)
    }
}

#[derive(Debug)]
pub enum FragmentContent<'a> {
    Text {
        style: TextStyle,
        lines: Vec<TextLine>,
        line_height: f32,
    },
    Spacer,
    Table(TableSlice<'a>),
}

/// A block, or a slice of a table's rows, placed on a page.
#[derive(Debug)]
pub struct Fragment<'a> {
    pub block_index: usize,
    /// Distance from the top of the page content area to the fragment top.
    pub offset: f32,
    pub height: f32,
    pub content: FragmentContent<'a>,
}

#[derive(Debug)]
pub struct PagePlan<'a> {
    pub index: usize,
    pub fragments: Vec<Fragment<'a>>,
    pub usable_height: f32,
    pub free_height: f32,
}

impl PagePlan<'_> {
    fn new(index: usize, usable_height: f32) -> Self {
        Self {
            index,
            fragments: Vec::new(),
            usable_height,
            free_height: usable_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Bottom edge of the last fragment, measured from the content top.
    pub fn used_height(&self) -> f32 {
        self.fragments
            .last()
            .map_or(0.0, |f| f.offset + f.height)
    }
}

#[derive(Debug)]
pub struct Layout<'a> {
    pub pages: Vec<PagePlan<'a>>,
    pub warnings: Vec<Warning>,
}

/// Lay `document` out into page plans with a single greedy pass.
pub fn paginate<'a, M: Measure + ?Sized>(
    document: &'a Document,
    measurer: &M,
    options: &LayoutOptions,
) -> Result<Layout<'a>> {
    document.geometry.validate()?;
    let mut paginator = Paginator::new(document, measurer, options);
    for (i, block) in document.blocks.iter().enumerate() {
        paginator.place_block(i, block)?;
    }
    Ok(paginator.finish())
}

struct Paginator<'a, 'm, M: Measure + ?Sized> {
    blocks: &'a [Block],
    measurer: &'m M,
    options: &'m LayoutOptions,
    content_width: f32,
    usable_height: f32,
    pages: Vec<PagePlan<'a>>,
    current: PagePlan<'a>,
    /// Set once an oversized fragment lands on `current`; nothing else may join it.
    sealed: bool,
    warnings: Vec<Warning>,
}

impl<'a, 'm, M: Measure + ?Sized> Paginator<'a, 'm, M> {
    fn new(document: &'a Document, measurer: &'m M, options: &'m LayoutOptions) -> Self {
        let usable_height = document.geometry.usable_height();
        Self {
            blocks: &document.blocks,
            measurer,
            options,
            content_width: document.geometry.content_width(),
            usable_height,
            pages: Vec::new(),
            current: PagePlan::new(0, usable_height),
            sealed: false,
            warnings: Vec::new(),
        }
    }

    fn gap(&self) -> f32 {
        if self.current.is_empty() {
            0.0
        } else {
            self.options.block_spacing
        }
    }

    fn fits(&self, height: f32) -> bool {
        !self.sealed && self.gap() + height <= self.current.free_height + FIT_EPSILON
    }

    fn fits_empty_page(&self, height: f32) -> bool {
        height <= self.usable_height + FIT_EPSILON
    }

    fn close_page(&mut self) -> Result<()> {
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Err(Error::Cancelled);
        }
        let next = PagePlan::new(self.current.index + 1, self.usable_height);
        let done = std::mem::replace(&mut self.current, next);
        log::debug!(
            "PAGE {} closed: fragments={} free={:.2}",
            done.index,
            done.fragments.len(),
            done.free_height
        );
        self.pages.push(done);
        self.sealed = false;
        Ok(())
    }

    fn push_fragment(&mut self, block_index: usize, height: f32, content: FragmentContent<'a>) {
        let gap = self.gap();
        let offset = self.current.used_height() + gap;
        self.current.free_height = (self.current.free_height - gap - height).max(0.0);
        self.current.fragments.push(Fragment {
            block_index,
            offset,
            height,
            content,
        });
    }

    fn record_overflow(&mut self, block_index: usize, height: f32) {
        let warning = Warning::ContentOverflow {
            block_index,
            page_index: self.current.index,
            height,
            available: self.usable_height,
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
        self.sealed = true;
    }

    fn place_block(&mut self, index: usize, block: &'a Block) -> Result<()> {
        match block {
            Block::Table(table) => self.place_table(index, table),
            Block::Heading(heading) => {
                let style = heading.style();
                let height = self.measurer.measure(block, self.content_width)?;
                if self.options.keep_with_next {
                    self.keep_with_next(index, height)?;
                }
                let content = self.text_content(&heading.text, style)?;
                self.place_flow(index, height, content)
            }
            Block::Paragraph(para) => {
                let height = self.measurer.measure(block, self.content_width)?;
                let content = self.text_content(&para.text, para.style)?;
                self.place_flow(index, height, content)
            }
            Block::Spacer(_) => {
                let height = self.measurer.measure(block, self.content_width)?;
                self.place_flow(index, height, FragmentContent::Spacer)
            }
        }
    }

    fn text_content(&self, text: &str, style: TextStyle) -> Result<FragmentContent<'a>> {
        Ok(FragmentContent::Text {
            lines: self.measurer.wrap(text, &style, self.content_width)?,
            line_height: self.measurer.line_height(&style)?,
            style,
        })
    }

    /// Place a heading, paragraph or spacer; these never split.
    fn place_flow(
        &mut self,
        index: usize,
        height: f32,
        content: FragmentContent<'a>,
    ) -> Result<()> {
        if !self.fits(height) && !self.current.is_empty() {
            self.close_page()?;
        }
        let oversized = !self.fits(height);
        log::debug!(
            "PLACE block={index} kind={} h={height:.2} page={} free={:.2}",
            self.blocks[index].kind(),
            self.current.index,
            self.current.free_height
        );
        self.push_fragment(index, height, content);
        if oversized {
            self.record_overflow(index, height);
        }
        Ok(())
    }

    /// Break the page before a heading if the heading would otherwise end it.
    ///
    /// Looks through any directly following headings to the first content block
    /// and requires its leading unit (a paragraph, or a table header with one
    /// row) to fit on the same page.
    fn keep_with_next(&mut self, index: usize, heading_height: f32) -> Result<()> {
        if self.current.is_empty() || !self.fits(heading_height) {
            return Ok(());
        }
        let spacing = self.options.block_spacing;
        let mut group = heading_height;
        let mut j = index + 1;
        let lead = loop {
            match self.blocks.get(j) {
                Some(next @ Block::Heading(_)) => {
                    group += spacing + self.measurer.measure(next, self.content_width)?;
                    j += 1;
                }
                Some(next @ Block::Paragraph(_)) => {
                    break self.measurer.measure(next, self.content_width)?;
                }
                Some(Block::Table(table)) => {
                    break TableRows::build(table, self.measurer, self.content_width)?
                        .lead_height();
                }
                Some(Block::Spacer(_)) | None => return Ok(()),
            }
        };
        let needed = group + spacing + lead;
        if !self.fits(needed) && self.fits_empty_page(needed) {
            log::debug!(
                "KEEP heading={index} needs {needed:.2}, page {} has {:.2}; breaking early",
                self.current.index,
                self.current.free_height
            );
            self.close_page()?;
        }
        Ok(())
    }

    fn place_table(&mut self, index: usize, table: &'a Table) -> Result<()> {
        let rows = TableRows::build(table, self.measurer, self.content_width)?;
        let lead = rows.lead_height();
        let header_height = rows.header_height();
        let TableRows {
            col_widths,
            header,
            body,
        } = rows;

        // Minimum orphan: the header never starts a page section without a body row.
        if !self.fits(lead) && !self.current.is_empty() {
            self.close_page()?;
        }

        let mut slice = TableSlice {
            table,
            col_widths: col_widths.clone(),
            header: header.clone(),
            rows: Vec::new(),
            repeated_header: false,
        };
        if !self.fits(lead) {
            self.record_overflow(index, lead);
        }

        for row in body {
            if slice.rows.is_empty() {
                slice.rows.push(row);
                continue;
            }
            if self.fits(slice.height() + row.height) {
                slice.rows.push(row);
                continue;
            }

            log::debug!(
                "TABLE block={index} break before row {:?} on page {}",
                row.index,
                self.current.index
            );
            let full = std::mem::replace(
                &mut slice,
                TableSlice {
                    table,
                    col_widths: col_widths.clone(),
                    header: header.clone(),
                    rows: Vec::new(),
                    repeated_header: header.is_some(),
                },
            );
            self.push_fragment(index, full.height(), FragmentContent::Table(full));
            self.close_page()?;

            let continuation = header_height + row.height;
            slice.rows.push(row);
            if !self.fits(continuation) {
                self.record_overflow(index, continuation);
            }
        }

        self.push_fragment(index, slice.height(), FragmentContent::Table(slice));
        Ok(())
    }

    fn finish(self) -> Layout<'a> {
        let Paginator {
            mut pages,
            current,
            warnings,
            ..
        } = self;
        pages.push(current);
        log::debug!("LAYOUT pages={} warnings={}", pages.len(), warnings.len());
        Layout { pages, warnings }
    }
}
