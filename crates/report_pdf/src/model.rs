//! Data structures describing the logical content of a report document.
//!
//! The types in this module mirror the building blocks used by both backends: the genpdf
//! renderer in [`crate::builder`] and the print HTML renderer in [`crate::html`].  They avoid
//! referencing either backend so report definitions can be written once and projected onto a
//! paginated PDF or a browser print layout.

use crate::richtext::Span;

/// Horizontal alignment of paragraphs and images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<HorizontalAlignment> for genpdf::Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => genpdf::Alignment::Left,
            HorizontalAlignment::Center => genpdf::Alignment::Center,
            HorizontalAlignment::Right => genpdf::Alignment::Right,
        }
    }
}

/// Rich text paragraph carrying inline styling information and alignment metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans using left alignment.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Creates a paragraph holding a single unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::new(text)])
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the configured alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Returns true when the paragraph has no visible text.
    pub fn is_blank(&self) -> bool {
        self.spans.iter().all(|span| span.text().trim().is_empty())
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl From<&str> for RichParagraph {
    fn from(text: &str) -> Self {
        RichParagraph::plain(text)
    }
}

impl From<String> for RichParagraph {
    fn from(text: String) -> Self {
        RichParagraph::plain(text)
    }
}

impl From<Span> for RichParagraph {
    fn from(span: Span) -> Self {
        RichParagraph::new(vec![span])
    }
}

/// Representation of image sources supported by the content model.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// Image referenced by a file path.
    Path(String),
}

impl ImageSource {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Loads the encoded image bytes, reading the file for path sources.
    pub fn load(&self) -> std::io::Result<Vec<u8>> {
        match self {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::Path(path) => std::fs::read(path),
        }
    }
}

/// An image with an optional caption.
///
/// Widths and heights are stored in millimetres.  When both a width and a maximum height are set
/// the renderer picks whichever scale keeps the image inside both bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    source: ImageSource,
    caption: Option<RichParagraph>,
    alignment: HorizontalAlignment,
    width_mm: Option<f64>,
    max_height_mm: Option<f64>,
}

impl ImageBlock {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            caption: None,
            alignment: HorizontalAlignment::Left,
            width_mm: None,
            max_height_mm: None,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn caption(&self) -> Option<&RichParagraph> {
        self.caption.as_ref()
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    pub fn max_height_mm(&self) -> Option<f64> {
        self.max_height_mm
    }

    pub fn with_caption(mut self, caption: impl Into<Option<RichParagraph>>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }

    pub fn with_max_height_mm(mut self, max_height_mm: impl Into<Option<f64>>) -> Self {
        self.max_height_mm = max_height_mm.into();
        self
    }
}

/// A single labelled value, e.g. `Client: Harbor Point LLC`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: RichParagraph,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<RichParagraph>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Label/value pairs laid out in a grid with `columns` pairs per row.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldGrid {
    columns: usize,
    fields: Vec<Field>,
}

impl FieldGrid {
    /// Creates an empty grid with the given number of label/value pairs per row.
    ///
    /// A column count of zero is treated as one.
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            fields: Vec::new(),
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn with_field(mut self, label: impl Into<String>, value: impl Into<RichParagraph>) -> Self {
        self.fields.push(Field::new(label, value));
        self
    }

    /// Adds the field only when a value is present.
    pub fn with_optional_field(
        self,
        label: impl Into<String>,
        value: Option<impl Into<RichParagraph>>,
    ) -> Self {
        match value {
            Some(value) => self.with_field(label, value),
            None => self,
        }
    }

    /// Splits the fields into rows of at most [`columns`](Self::columns) pairs.
    pub fn rows(&self) -> impl Iterator<Item = &[Field]> {
        self.fields.chunks(self.columns)
    }
}

/// A bordered table with relative column widths.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    column_weights: Vec<usize>,
    header: Option<Vec<String>>,
    rows: Vec<Vec<RichParagraph>>,
}

impl Table {
    pub fn new(column_weights: impl Into<Vec<usize>>) -> Self {
        Self {
            column_weights: column_weights.into(),
            header: None,
            rows: Vec::new(),
        }
    }

    pub fn column_weights(&self) -> &[usize] {
        &self.column_weights
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[Vec<RichParagraph>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_row(mut self, row: Vec<RichParagraph>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: Vec<RichParagraph>) {
        self.rows.push(row);
    }

    /// Returns the index and length of the first row (header included as index `None`) whose cell
    /// count differs from the number of columns.
    pub fn first_misshapen_row(&self) -> Option<(Option<usize>, usize)> {
        let columns = self.column_weights.len();
        if let Some(header) = &self.header {
            if header.len() != columns {
                return Some((None, header.len()));
            }
        }
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns)
            .map(|(index, row)| (Some(index), row.len()))
    }
}

/// Individual content blocks that make up sections.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// Captioned image content.
    Image(ImageBlock),
    /// Label/value grid.
    Fields(FieldGrid),
    /// Bordered table.
    Table(Table),
    /// Vertical whitespace, in lines.
    Spacer(f64),
    /// Explicit page break request.
    PageBreak,
}

impl Block {
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Paragraph(RichParagraph::plain(text))
    }

    pub fn image(source: ImageSource) -> Self {
        Self::Image(ImageBlock::new(source))
    }
}

/// Logical representation of a document section.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    identifier: Option<String>,
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Returns the section identifier used for bookmarks and HTML anchors.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks
            .iter()
            .all(|block| matches!(block, Block::PageBreak | Block::Spacer(_)))
    }

    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Creates a builder that can inject an initial page break.
    pub fn builder(title: impl Into<String>) -> SectionBuilder {
        SectionBuilder::new(title)
    }
}

/// Builder for [`Section`] values.
///
/// Callers can opt-in to inserting a page break at the beginning of the section via
/// [`SectionBuilder::start_on_new_page`].
#[derive(Clone, Debug, Default)]
pub struct SectionBuilder {
    identifier: Option<String>,
    title: String,
    blocks: Vec<Block>,
    start_on_new_page: bool,
}

impl SectionBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the section to start on a new page.
    pub fn start_on_new_page(mut self, start_on_new_page: bool) -> Self {
        self.start_on_new_page = start_on_new_page;
        self
    }

    pub fn identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn push_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Builds the final section, injecting a leading page break when requested.
    pub fn build(mut self) -> Section {
        if self.start_on_new_page {
            match self.blocks.first() {
                Some(Block::PageBreak) => {}
                _ => self.blocks.insert(0, Block::PageBreak),
            }
        }

        let mut section = Section::new(self.title);
        section.identifier = self.identifier;
        section.blocks = self.blocks;
        section
    }
}

/// A complete report document: title banner metadata plus ordered sections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    title: String,
    subtitle: Option<String>,
    reference: Option<String>,
    sections: Vec<Section>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Title shown in the banner and the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Secondary banner line, typically the project name.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Reference line, typically the report id and inspection date.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<Option<String>>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn with_sections<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = Section>,
    {
        self.sections.extend(sections);
        self
    }

    pub fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }
}
