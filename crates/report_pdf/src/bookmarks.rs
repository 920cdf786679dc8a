//! Section outline (bookmarks) for rendered reports, built with `lopdf`.
//!
//! genpdf does not write outlines, so the rendered bytes are reopened and a flat `/Outlines`
//! tree is added with one entry per section that landed on a page.  The catalog is switched to
//! `/PageMode /UseOutlines` so viewers show the panel on open.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::model::Section;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    Pdf(lopdf::Error),
    /// The trailer has no usable `/Root` catalog.
    MissingCatalog,
    /// A section refers to a page number that does not exist.
    MissingPage { section: String, page_number: usize },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Pdf(err.into())
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "PDF could not be processed: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog is missing or not a dictionary"),
            Self::MissingPage {
                section,
                page_number,
            } => write!(
                f,
                "Section '{}' starts on page {}, which is not in the document",
                section, page_number
            ),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::MissingCatalog | Self::MissingPage { .. } => None,
        }
    }
}

struct OutlineEntry {
    id: ObjectId,
    page: ObjectId,
    title: String,
}

/// Adds one outline entry per section, pointing at the section's first page.
///
/// `section_pages[i]` is the 1-based start page of `sections[i]`; sections without a page are
/// skipped.  When no section has a page the input is returned unchanged.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    sections: &[Section],
    section_pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    let entries = outline_entries(&mut document, &pages, sections, section_pages)?;
    if entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let root_id = document.new_object_id();
    for (index, entry) in entries.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set("Title", Object::string_literal(entry.title.as_str()));
        item.set("Parent", Object::Reference(root_id));
        item.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ]),
        );
        if let Some(previous) = index.checked_sub(1).and_then(|i| entries.get(i)) {
            item.set("Prev", Object::Reference(previous.id));
        }
        if let Some(next) = entries.get(index + 1) {
            item.set("Next", Object::Reference(next.id));
        }
        document.objects.insert(entry.id, Object::Dictionary(item));
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Outlines".to_vec()));
    root.set("Count", Object::Integer(entries.len() as i64));
    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        root.set("First", Object::Reference(first.id));
        root.set("Last", Object::Reference(last.id));
    }
    document.objects.insert(root_id, Object::Dictionary(root));

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .and_then(|object| object.as_dict_mut().ok())
        .ok_or(BookmarkError::MissingCatalog)?;
    catalog.set("Outlines", Object::Reference(root_id));
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

fn outline_entries(
    document: &mut Document,
    pages: &BTreeMap<u32, ObjectId>,
    sections: &[Section],
    section_pages: &[Option<usize>],
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    let mut entries = Vec::new();
    for (section, page_number) in sections.iter().zip(section_pages) {
        let Some(page_number) = *page_number else {
            continue;
        };
        let page = pages
            .get(&(page_number as u32))
            .copied()
            .ok_or_else(|| BookmarkError::MissingPage {
                section: section.title().to_string(),
                page_number,
            })?;
        entries.push(OutlineEntry {
            id: document.new_object_id(),
            page,
            title: section.title().to_string(),
        });
    }
    Ok(entries)
}
