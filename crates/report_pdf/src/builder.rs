//! Paginated PDF rendering of a [`Document`] with genpdf.
//!
//! [`PdfBuilder`] lays a document out twice: the first pass only counts pages, the second one
//! prints the final footer counters (`Page N of M`).  Each section heading is wrapped in a
//! [`PageMarker`](crate::elements::PageMarker); the recorded start pages are returned alongside
//! the bytes so callers can add bookmarks.

use std::fmt;
use std::rc::Rc;

use genpdf::elements::{Break, FrameCellDecorator, PageBreak, Paragraph, TableLayout};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{self, Color, Style, StyledString};
use genpdf::{Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};
use log::{debug, warn};

use crate::elements::{mm_from_f64, CaptionedImage, PageTracker};
use crate::fonts;
use crate::letterhead::{self, Letterhead, PageInfo, PreparedLetterhead, FOOTER_HEIGHT_MM};
use crate::model::{Block, Document, FieldGrid, ImageBlock, ImageSource, RichParagraph, Table};

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError};

const DEFAULT_FONT_SIZE: u8 = 10;
const DEFAULT_LINE_SPACING: f64 = 1.15;
const CELL_PADDING_MM: f64 = 1.0;

type PageFactory = dyn Fn(PageInfo) -> Box<dyn Element>;

/// Errors produced while turning a [`Document`] into PDF bytes.
#[derive(Debug)]
pub enum PdfBuildError {
    /// No usable font family could be loaded.
    FontLoad(Error),
    /// An image block could not be decoded.
    Image {
        /// Title of the section holding the image.
        section: String,
        /// Index of the block within the section.
        block: usize,
        /// Underlying decode error.
        source: Error,
    },
    /// A table row does not have one cell per column.
    TableShape {
        section: String,
        block: usize,
        /// Offending row, `None` for the header row.
        row: Option<usize>,
        cells: usize,
        columns: usize,
    },
    /// genpdf failed while laying out or writing the document.
    Render(Error),
    /// Section bookmarks could not be embedded.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl fmt::Display for PdfBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(err) => write!(f, "Failed to load fonts: {err}"),
            Self::Image {
                section, block, ..
            } => write!(
                f,
                "Image in section '{}' (block {}) could not be decoded",
                section, block
            ),
            Self::TableShape {
                section,
                block,
                row,
                cells,
                columns,
            } => {
                let row = match row {
                    Some(index) => format!("row {}", index),
                    None => "header row".to_string(),
                };
                write!(
                    f,
                    "Table in section '{}' (block {}) has {} cells in {} but {} columns",
                    section, block, cells, row, columns
                )
            }
            Self::Render(err) => write!(f, "Failed to render PDF: {err}"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => write!(f, "Failed to add bookmarks: {err}"),
        }
    }
}

impl std::error::Error for PdfBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Image { source, .. } => Some(source),
            Self::TableShape { .. } => None,
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for PdfBuildError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// The PDF file contents.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
    /// 1-based start page of each section, in document order.
    pub section_pages: Vec<Option<usize>>,
}

/// Definition of a footer rendered through the page decorator.
#[derive(Clone)]
pub struct FooterSpec {
    height: Mm,
    factory: Rc<PageFactory>,
}

impl FooterSpec {
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(PageInfo) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Rc::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

/// Renders a [`Document`] into PDF bytes.
pub struct PdfBuilder {
    document: Document,
    paper_size: Size,
    margins: Margins,
    font_size: u8,
    letterhead: Option<Letterhead>,
    header: Option<Rc<PageFactory>>,
    footer: Option<FooterSpec>,
}

impl PdfBuilder {
    /// Creates a builder for `document` with A4 paper, 12/15 mm margins and no letterhead.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            paper_size: PaperSize::A4.into(),
            margins: Margins::trbl(12, 15, 12, 15),
            font_size: DEFAULT_FONT_SIZE,
            letterhead: None,
            header: None,
            footer: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = margins.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = font_size;
        self
    }

    /// Uses the letterhead for the page header, title banner and footer.
    ///
    /// Explicit [`with_header`](Self::with_header) / [`with_footer`](Self::with_footer) callbacks
    /// take precedence over the letterhead's header and footer.
    pub fn with_letterhead(mut self, letterhead: Letterhead) -> Self {
        self.letterhead = Some(letterhead);
        self
    }

    /// Configures a header callback that is invoked for every page.
    pub fn with_header<F, E>(mut self, header: F) -> Self
    where
        F: Fn(PageInfo) -> E + 'static,
        E: Element + 'static,
    {
        self.header = Some(Rc::new(move |page| {
            Box::new(header(page)) as Box<dyn Element>
        }));
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(PageInfo) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Lays the document out and returns the PDF bytes with page information.
    pub fn render(&self) -> Result<RenderedPdf, PdfBuildError> {
        let font_family = fonts::default_font_family().map_err(PdfBuildError::FontLoad)?;
        let prepared = self.letterhead.as_ref().map(Letterhead::prepare);
        let (header, footer) = self.page_furniture(prepared.as_ref());

        let first = self.render_pass(font_family.clone(), prepared.as_ref(), &header, &footer, None)?;
        debug!(
            "First layout pass of '{}' produced {} pages",
            self.document.title(),
            first.page_count
        );

        let total = first.page_count;
        let second = self.render_pass(font_family, prepared.as_ref(), &header, &footer, Some(total))?;
        if second.page_count != total {
            warn!(
                "Page count changed between layout passes of '{}' ({} -> {})",
                self.document.title(),
                total,
                second.page_count
            );
        }
        Ok(second)
    }

    /// Renders the document and embeds one outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedPdf, PdfBuildError> {
        let rendered = self.render()?;
        let bytes = bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            self.document.sections(),
            &rendered.section_pages,
        )?;
        Ok(RenderedPdf { bytes, ..rendered })
    }

    fn page_furniture(
        &self,
        prepared: Option<&PreparedLetterhead>,
    ) -> (Option<Rc<PageFactory>>, Option<FooterSpec>) {
        let header = self.header.clone().or_else(|| {
            prepared.map(|letterhead| {
                let letterhead = letterhead.clone();
                Rc::new(move |page: PageInfo| letterhead.header(page)) as Rc<PageFactory>
            })
        });

        let footer = self.footer.clone().or_else(|| {
            prepared.map(|letterhead| {
                let letterhead = letterhead.clone();
                FooterSpec {
                    height: mm_from_f64(FOOTER_HEIGHT_MM),
                    factory: Rc::new(move |page: PageInfo| letterhead.footer(page)),
                }
            })
        });

        (header, footer)
    }

    fn render_pass(
        &self,
        font_family: FontFamily<FontData>,
        prepared: Option<&PreparedLetterhead>,
        header: &Option<Rc<PageFactory>>,
        footer: &Option<FooterSpec>,
        total_pages: Option<usize>,
    ) -> Result<RenderedPdf, PdfBuildError> {
        let sections = self.document.sections();
        let tracker = PageTracker::new(sections.len());

        let mut document = genpdf::Document::new(font_family);
        document.set_title(self.document.title());
        document.set_minimal_conformance();
        document.set_paper_size(self.paper_size);
        document.set_font_size(self.font_size);
        document.set_line_spacing(DEFAULT_LINE_SPACING);
        document.set_page_decorator(ConfiguredPageDecorator {
            margins: self.margins,
            header: header.clone(),
            footer: footer.clone(),
            total_pages,
            tracker: tracker.clone(),
        });

        let accent = prepared
            .map(PreparedLetterhead::accent)
            .unwrap_or(Color::Greyscale(0));
        if prepared.is_some() {
            document.push(letterhead::title_banner(&self.document, accent));
        }

        for (index, section) in sections.iter().enumerate() {
            let blocks = section.blocks();
            let leading_breaks = blocks
                .iter()
                .take_while(|block| matches!(block, Block::PageBreak))
                .count();
            for _ in 0..leading_breaks {
                document.push(PageBreak::new());
            }

            let heading = Paragraph::new(StyledString::new(
                section.title().to_uppercase(),
                Style::new().bold().with_font_size(11).with_color(accent),
            ));
            document.push(
                tracker
                    .marker(index, heading)
                    .padded(Margins::trbl(2, 0, 1, 0)),
            );

            for (block_index, block) in blocks.iter().enumerate().skip(leading_breaks) {
                push_block(&mut document, section.title(), block_index, block)?;
            }
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;

        Ok(RenderedPdf {
            bytes,
            page_count: tracker.pages(),
            section_pages: tracker.marks(),
        })
    }
}

fn paragraph(rich: &RichParagraph) -> Paragraph {
    styled_paragraph(rich, Style::new())
}

/// Builds a paragraph whose spans inherit `base` unless they override it.
fn styled_paragraph(rich: &RichParagraph, base: Style) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in rich.spans() {
        let mut string = span.to_styled_string();
        string.style = base.and(string.style);
        paragraph.push(string);
    }
    paragraph.set_alignment(rich.alignment().into());
    paragraph
}

fn cell(element: impl Element + 'static) -> Box<dyn Element> {
    Box::new(element.padded(Margins::all(mm_from_f64(CELL_PADDING_MM))))
}

fn push_block(
    document: &mut genpdf::Document,
    section: &str,
    block_index: usize,
    block: &Block,
) -> Result<(), PdfBuildError> {
    match block {
        Block::Paragraph(rich) => {
            document.push(paragraph(rich));
            document.push(Break::new(0.5));
        }
        Block::Image(image) => {
            let element = captioned_image(image).map_err(|source| PdfBuildError::Image {
                section: section.to_string(),
                block: block_index,
                source,
            })?;
            document.push(element);
            document.push(Break::new(1.0));
        }
        Block::Fields(grid) => {
            if let Some(table) = field_table(grid).map_err(PdfBuildError::Render)? {
                document.push(table);
                document.push(Break::new(0.5));
            }
        }
        Block::Table(table) => {
            if let Some((row, cells)) = table.first_misshapen_row() {
                return Err(PdfBuildError::TableShape {
                    section: section.to_string(),
                    block: block_index,
                    row,
                    cells,
                    columns: table.column_weights().len(),
                });
            }
            document.push(bordered_table(table).map_err(PdfBuildError::Render)?);
            document.push(Break::new(0.5));
        }
        Block::Spacer(lines) => document.push(Break::new(*lines)),
        Block::PageBreak => document.push(PageBreak::new()),
    }
    Ok(())
}

fn captioned_image(block: &ImageBlock) -> Result<CaptionedImage, Error> {
    let caption_style = Style::new().italic().with_font_size(9);
    let caption = block
        .caption()
        .map(|rich| styled_paragraph(rich, caption_style))
        .unwrap_or_default();

    let image = match block.source() {
        ImageSource::Bytes(bytes) => CaptionedImage::from_bytes(bytes, caption)?,
        ImageSource::Path(path) => CaptionedImage::from_path(path, caption)?,
    };

    Ok(image
        .with_alignment(block.alignment().into())
        .with_width(block.width_mm().map(mm_from_f64))
        .with_max_height(block.max_height_mm().map(mm_from_f64)))
}

fn field_table(grid: &FieldGrid) -> Result<Option<TableLayout>, Error> {
    if grid.fields().is_empty() {
        return Ok(None);
    }

    let weights: Vec<usize> = (0..grid.columns()).flat_map(|_| [2, 3]).collect();
    let mut table = TableLayout::new(weights);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    for fields in grid.rows() {
        let mut row: Vec<Box<dyn Element>> = Vec::with_capacity(grid.columns() * 2);
        for field in fields {
            row.push(cell(Paragraph::new(StyledString::new(
                field.label.clone(),
                Style::new().bold(),
            ))));
            row.push(cell(paragraph(&field.value)));
        }
        while row.len() < grid.columns() * 2 {
            row.push(cell(Paragraph::default()));
        }
        table.push_row(row)?;
    }
    Ok(Some(table))
}

fn bordered_table(table: &Table) -> Result<TableLayout, Error> {
    let mut layout = TableLayout::new(table.column_weights().to_vec());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    if let Some(header) = table.header() {
        let row = header
            .iter()
            .map(|title| {
                cell(Paragraph::new(StyledString::new(
                    title.clone(),
                    Style::new().bold(),
                )))
            })
            .collect();
        layout.push_row(row)?;
    }

    for cells in table.rows() {
        let row = cells.iter().map(|rich| cell(paragraph(rich))).collect();
        layout.push_row(row)?;
    }
    Ok(layout)
}

struct ConfiguredPageDecorator {
    margins: Margins,
    header: Option<Rc<PageFactory>>,
    footer: Option<FooterSpec>,
    total_pages: Option<usize>,
    tracker: PageTracker,
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = PageInfo {
            number: self.tracker.next_page(),
            total: self.total_pages,
        };

        area.add_margins(self.margins);

        if let Some(header_cb) = &self.header {
            let mut element = header_cb(page);
            let result = element.render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height));
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}
