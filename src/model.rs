use std::collections::BTreeMap;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Weight {
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontSize {
    Small,
    Body,
    Medium,
    Large,
    Title,
}

impl FontSize {
    pub fn points(self) -> f32 {
        match self {
            FontSize::Small => 10.0,
            FontSize::Body => 12.0,
            FontSize::Medium => 14.0,
            FontSize::Large => 16.0,
            FontSize::Title => 24.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);

    pub(crate) fn to_rgb(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

/// Closed style descriptor: every combination is measurable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: FontSize,
    pub weight: Weight,
    pub alignment: Alignment,
    pub color: Option<Color>, // None = black
}

impl TextStyle {
    pub const fn new(size: FontSize, weight: Weight, alignment: Alignment) -> Self {
        Self {
            size,
            weight,
            alignment,
            color: None,
        }
    }

    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(FontSize::Body, Weight::Regular, Alignment::Left)
    }
}

#[derive(Debug)]
pub struct Heading {
    pub text: String,
    pub level: u8,
    pub alignment: Alignment,
    pub color: Option<Color>,
}

impl Heading {
    pub fn style(&self) -> TextStyle {
        let size = match self.level {
            1 => FontSize::Title,
            2 => FontSize::Large,
            _ => FontSize::Medium,
        };
        TextStyle {
            size,
            weight: Weight::Bold,
            alignment: self.alignment,
            color: self.color,
        }
    }
}

#[derive(Debug)]
pub struct Paragraph {
    pub text: String,
    pub style: TextStyle,
}

#[derive(Clone, Debug)]
pub struct TableStyle {
    pub header: TextStyle,
    pub body: TextStyle,
    pub cell_padding: f32,
    pub header_fill: Option<Color>,
    pub stripe_fill: Option<Color>, // fill for odd body rows
    pub grid_color: Color,
    pub grid_width: f32,
    /// Relative column widths; `None` splits the content width evenly.
    pub column_weights: Option<Vec<f32>>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header: TextStyle::new(FontSize::Body, Weight::Bold, Alignment::Left),
            body: TextStyle::default(),
            cell_padding: 4.0,
            header_fill: None,
            stripe_fill: None,
            grid_color: Color(128, 128, 128),
            grid_width: 0.5,
            column_weights: None,
        }
    }
}

/// Text style and background for one body cell, replacing the table defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    pub text: TextStyle,
    pub fill: Option<Color>,
}

#[derive(Debug)]
pub struct Table {
    /// `None` for a table without a header row; nothing is repeated on continuation pages.
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    pub style: TableStyle,
    /// Overrides keyed by (body row, column).
    pub cell_styles: BTreeMap<(usize, usize), CellStyle>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header: Some(header),
            rows,
            style: TableStyle::default(),
            cell_styles: BTreeMap::new(),
        }
    }

    pub fn without_header(rows: Vec<Vec<String>>) -> Self {
        Self {
            header: None,
            ..Self::new(Vec::new(), rows)
        }
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_cell_style(mut self, row: usize, col: usize, style: CellStyle) -> Self {
        self.cell_styles.insert((row, col), style);
        self
    }

    pub fn column_count(&self) -> usize {
        match &self.header {
            Some(header) => header.len(),
            None => self.rows.first().map_or(0, Vec::len),
        }
    }

    pub fn body_style(&self, row: usize, col: usize) -> &TextStyle {
        self.cell_styles
            .get(&(row, col))
            .map_or(&self.style.body, |c| &c.text)
    }

    /// Cell override first, then the stripe colour on odd rows.
    pub fn body_fill(&self, row: usize, col: usize) -> Option<Color> {
        match self.cell_styles.get(&(row, col)) {
            Some(CellStyle {
                fill: Some(fill), ..
            }) => Some(*fill),
            _ if row % 2 == 1 => self.style.stripe_fill,
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        let ncols = self.column_count();
        if ncols == 0 {
            return Err(Error::InvalidContent(match self.header {
                Some(_) => "table header has no cells".into(),
                None => "table without a header has no cells".into(),
            }));
        }
        if let Some((ri, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(Error::InvalidContent(format!(
                "table row {ri} has {} cells, table has {ncols} columns",
                row.len()
            )));
        }
        if let Some(weights) = &self.style.column_weights {
            if weights.len() != ncols {
                return Err(Error::InvalidContent(format!(
                    "{} column weights for {ncols} columns",
                    weights.len()
                )));
            }
            if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
                return Err(Error::InvalidContent(
                    "column weights must be positive".into(),
                ));
            }
        }
        if !self.style.cell_padding.is_finite() || self.style.cell_padding < 0.0 {
            return Err(Error::InvalidContent(format!(
                "cell padding {} is not a valid length",
                self.style.cell_padding
            )));
        }
        if let Some((row, col)) = self
            .cell_styles
            .keys()
            .find(|(r, c)| *r >= self.rows.len() || *c >= ncols)
        {
            return Err(Error::InvalidContent(format!(
                "cell style for ({row}, {col}) is outside the table"
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    Table(Table),
    Spacer(f32),
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading(_) => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::Table(_) => "table",
            Block::Spacer(_) => "spacer",
        }
    }
}

/// Ordered block sequence built by the caller. Knows nothing about page size.
#[derive(Debug, Default)]
pub struct Content {
    blocks: Vec<Block>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) -> Result<&mut Self> {
        self.add_heading_with(text, level, Alignment::Left, None)
    }

    pub fn add_heading_with(
        &mut self,
        text: impl Into<String>,
        level: u8,
        alignment: Alignment,
        color: Option<Color>,
    ) -> Result<&mut Self> {
        if !(1..=3).contains(&level) {
            return Err(Error::InvalidContent(format!(
                "heading level {level} outside 1..=3"
            )));
        }
        self.blocks.push(Block::Heading(Heading {
            text: text.into(),
            level,
            alignment,
            color,
        }));
        Ok(self)
    }

    pub fn add_paragraph(&mut self, text: impl Into<String>, style: TextStyle) -> Result<&mut Self> {
        self.blocks.push(Block::Paragraph(Paragraph {
            text: text.into(),
            style,
        }));
        Ok(self)
    }

    pub fn add_table(
        &mut self,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<&mut Self> {
        self.add_table_with(header, rows, TableStyle::default())
    }

    pub fn add_table_with(
        &mut self,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        style: TableStyle,
    ) -> Result<&mut Self> {
        self.push_table(Table::new(header, rows).with_style(style))
    }

    /// Append a fully built table (header-less or with cell overrides).
    pub fn push_table(&mut self, table: Table) -> Result<&mut Self> {
        table.validate()?;
        self.blocks.push(Block::Table(table));
        Ok(self)
    }

    pub fn add_spacer(&mut self, height: f32) -> Result<&mut Self> {
        if !height.is_finite() || height < 0.0 {
            return Err(Error::InvalidContent(format!(
                "spacer height {height} is not a valid length"
            )));
        }
        self.blocks.push(Block::Spacer(height));
        Ok(self)
    }
}

/// Page size and uniform margin, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_pt: 595.0,
        height_pt: 842.0,
        margin_pt: 36.0,
    };

    pub const LETTER: PageGeometry = PageGeometry {
        width_pt: 612.0,
        height_pt: 792.0,
        margin_pt: 36.0,
    };

    pub fn with_margin(mut self, margin_pt: f32) -> Self {
        self.margin_pt = margin_pt;
        self
    }

    pub fn content_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn usable_height(&self) -> f32 {
        self.height_pt - 2.0 * self.margin_pt
    }

    pub fn validate(&self) -> Result<()> {
        let all_finite =
            self.width_pt.is_finite() && self.height_pt.is_finite() && self.margin_pt.is_finite();
        if !all_finite || self.width_pt <= 0.0 || self.height_pt <= 0.0 || self.margin_pt < 0.0 {
            return Err(Error::InvalidGeometry(format!("{self:?}")));
        }
        if self.content_width() <= 0.0 || self.usable_height() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "margin {} leaves no content area on a {}x{} page",
                self.margin_pt, self.width_pt, self.height_pt
            )));
        }
        Ok(())
    }
}

/// Content bound to a page geometry; immutable once layout begins.
#[derive(Debug)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub geometry: PageGeometry,
}

impl Document {
    pub fn new(content: Content, geometry: PageGeometry) -> Result<Self> {
        geometry.validate()?;
        Ok(Self {
            blocks: content.blocks,
            geometry,
        })
    }
}
