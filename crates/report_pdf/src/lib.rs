//! Letterhead report rendering: a renderer-neutral document model projected onto paginated PDF
//! (genpdf) or a standalone print HTML page.

pub mod builder;
pub mod elements;
pub mod fonts;
pub mod html;
pub mod letterhead;
pub mod model;
pub mod richtext;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{PdfBuildError, PdfBuilder, RenderedPdf};
pub use letterhead::{Letterhead, PageInfo};
pub use model::{Block, Document, FieldGrid, ImageBlock, ImageSource, RichParagraph, Section, Table};
pub use genpdf::style::Color;
pub use richtext::Span;
