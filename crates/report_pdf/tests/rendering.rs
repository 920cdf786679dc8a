use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::ErrorKind;
use genpdf::{Margins, PaperSize};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba};
use report_pdf::builder::{PdfBuildError, PdfBuilder, RenderedPdf};
use report_pdf::letterhead::{Letterhead, PageInfo};
use report_pdf::model::{Block, Document, FieldGrid, ImageBlock, ImageSource, RichParagraph, Section, Table};
use report_pdf::richtext::Span;
use sha2::{Digest, Sha256};

fn sample_photo() -> Vec<u8> {
    let image = ImageBuffer::from_fn(64, 48, |x, y| {
        Rgba([(x * 4) as u8, (y * 5) as u8, 120, if x < 8 { 0 } else { 255 }])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode sample photo");
    bytes
}

fn sample_document() -> Document {
    let project = Section::new("Project Information").with_block(Block::Fields(
        FieldGrid::new(2)
            .with_field("Client", "Harbor Point LLC")
            .with_field("Project", "Harbor Point Tower")
            .with_field("Inspector", "J. Rivera"),
    ));
    let checklist = Section::new("Checklist").with_block(Block::Table(
        Table::new(vec![4, 1, 4])
            .with_header(["Item", "Answer", "Details"])
            .with_row(vec![
                RichParagraph::plain("Coping secure"),
                RichParagraph::new(vec![Span::new("YES").bold()]),
                RichParagraph::default(),
            ]),
    ));
    let photos = Section::builder("Photographs")
        .start_on_new_page(true)
        .push_block(Block::Image(
            ImageBlock::new(ImageSource::from_bytes(sample_photo()))
                .with_caption(Some(RichParagraph::plain("Photo 1: North parapet")))
                .with_width_mm(80.0),
        ))
        .build();

    Document::new("Parapet Inspection Report")
        .with_subtitle(Some("Harbor Point Tower".to_string()))
        .with_reference(Some("Report 42".to_string()))
        .with_sections([project, checklist, photos])
}

fn letterhead() -> Letterhead {
    Letterhead::new("Acme Building Inspections")
        .with_address_line("100 Main Street, Springfield")
        .with_phone(Some("555-0100".to_string()))
        .with_email(Some("office@acme.test".to_string()))
}

/// Renders `builder`, returning `None` when no fonts are installed on this machine.
fn render(builder: PdfBuilder) -> Option<RenderedPdf> {
    match builder.render() {
        Ok(rendered) => Some(rendered),
        Err(PdfBuildError::FontLoad(err)) => {
            eprintln!("Skipping rendering assertions: {}", err);
            None
        }
        Err(other) => panic!("render sample pdf: {other}"),
    }
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_between(data: &mut [u8], start: &[u8], end: u8) {
        let mut index = 0;
        while index + start.len() < data.len() {
            if !data[index..].starts_with(start) {
                index += 1;
                continue;
            }
            let mut cursor = index + start.len();
            while cursor < data.len() && data[cursor] != end {
                if !matches!(data[cursor], b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                    data[cursor] = b'0';
                }
                cursor += 1;
            }
            index = cursor;
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_between(&mut normalized, b"/CreationDate(", b')');
    scrub_between(&mut normalized, b"/ModDate(", b')');
    scrub_between(&mut normalized, b"/ID[", b']');
    scrub_between(&mut normalized, b"/Producer(", b')');
    for tag in [
        &b"<xmp:CreateDate>"[..],
        b"<xmp:ModifyDate>",
        b"<xmp:MetadataDate>",
        b"<xmpMM:DocumentID>",
        b"<xmpMM:InstanceID>",
        b"<xmpMM:VersionID>",
    ] {
        scrub_between(&mut normalized, tag, b'<');
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn renders_letterhead_report_with_section_pages() {
    let Some(rendered) = render(PdfBuilder::new(sample_document()).with_letterhead(letterhead()))
    else {
        return;
    };

    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert!(rendered.page_count >= 2, "photos start on a new page");
    assert_eq!(rendered.section_pages.len(), 3);
    assert_eq!(rendered.section_pages[0], Some(1));
    assert_eq!(rendered.section_pages[1], Some(1));
    assert_eq!(rendered.section_pages[2], Some(2));
}

#[test]
fn rendering_is_deterministic() {
    let Some(first) = render(PdfBuilder::new(sample_document()).with_letterhead(letterhead()))
    else {
        return;
    };
    let Some(second) = render(PdfBuilder::new(sample_document()).with_letterhead(letterhead()))
    else {
        return;
    };

    assert_eq!(first.bytes.len(), second.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&first.bytes),
        normalized_hash(&second.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn heading_pushed_to_the_next_page_is_marked_there() {
    let document = Document::new("Overflow")
        .with_section(Section::new("Observations").with_block(Block::Spacer(500.0)))
        .with_section(Section::new("Closing"));
    let Some(rendered) = render(PdfBuilder::new(document)) else {
        return;
    };

    assert_eq!(rendered.page_count, 2);
    assert_eq!(rendered.section_pages, vec![Some(1), Some(2)]);
}

#[test]
fn custom_header_and_footer_replace_the_letterhead() {
    let footers: Rc<RefCell<Vec<PageInfo>>> = Rc::default();
    let seen = footers.clone();
    let builder = PdfBuilder::new(sample_document())
        .with_letterhead(letterhead())
        .with_paper_size(PaperSize::Letter)
        .with_margins(Margins::all(20))
        .with_font_size(9)
        .with_header(|page: PageInfo| Paragraph::new(format!("Field copy, page {}", page.number)))
        .with_footer(8, move |page: PageInfo| {
            seen.borrow_mut().push(page);
            Paragraph::new(page.label())
        });
    let Some(rendered) = render(builder) else {
        return;
    };

    let total = rendered.page_count;
    let footers = footers.borrow();
    assert_eq!(footers.len(), total * 2, "one footer per page in each layout pass");
    assert!(footers[..total].iter().all(|page| page.total.is_none()));
    assert!(footers[total..].iter().all(|page| page.total == Some(total)));
    assert_eq!(footers[total].number, 1);

    let pdf = lopdf::Document::load_mem(&rendered.bytes).expect("reload pdf");
    let first_page = *pdf.get_pages().values().next().expect("first page");
    let media_box = pdf
        .get_object(first_page)
        .and_then(|page| page.as_dict())
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(|media_box| media_box.as_array())
        .expect("media box");
    let width = media_box[2].as_float().expect("page width");
    let height = media_box[3].as_float().expect("page height");
    assert!((width - 612.3).abs() < 1.0, "letter width, got {}", width);
    assert!((height - 790.9).abs() < 1.0, "letter height, got {}", height);
}

#[test]
fn footer_taller_than_the_page_is_rejected() {
    let builder = PdfBuilder::new(sample_document())
        .with_paper_size(PaperSize::Letter)
        .with_footer(400, |_page: PageInfo| Paragraph::new("too tall"));

    match builder.render() {
        Err(PdfBuildError::Render(err)) => assert!(matches!(err.kind(), ErrorKind::InvalidData)),
        Err(PdfBuildError::FontLoad(err)) => eprintln!("Skipping footer assertions: {}", err),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("a footer taller than the page must fail the render"),
    }
}

#[test]
fn undecodable_image_names_section_and_block() {
    let document = Document::new("Broken").with_section(
        Section::new("Photographs")
            .with_block(Block::text("Photos follow"))
            .with_block(Block::image(ImageSource::from_bytes(b"not an image".to_vec()))),
    );

    match PdfBuilder::new(document).render() {
        Err(PdfBuildError::Image { section, block, .. }) => {
            assert_eq!(section, "Photographs");
            assert_eq!(block, 1);
        }
        Err(PdfBuildError::FontLoad(err)) => eprintln!("Skipping image assertions: {}", err),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("undecodable image must fail the render"),
    }
}

#[test]
fn misshapen_table_is_rejected() {
    let table = Table::new(vec![1, 1, 1])
        .with_header(["Item", "Answer", "Details"])
        .with_row(vec![RichParagraph::plain("Clear cover")]);
    let document =
        Document::new("Broken").with_section(Section::new("Checklist").with_block(Block::Table(table)));

    match PdfBuilder::new(document).render() {
        Err(PdfBuildError::TableShape {
            row, cells, columns, ..
        }) => {
            assert_eq!(row, Some(0));
            assert_eq!(cells, 1);
            assert_eq!(columns, 3);
        }
        Err(PdfBuildError::FontLoad(err)) => eprintln!("Skipping table assertions: {}", err),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("misshapen table must fail the render"),
    }
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_add_outline_to_catalog() {
    let builder = PdfBuilder::new(sample_document()).with_letterhead(letterhead());
    let rendered = match builder.render_with_bookmarks() {
        Ok(rendered) => rendered,
        Err(PdfBuildError::FontLoad(err)) => {
            eprintln!("Skipping bookmark assertions: {}", err);
            return;
        }
        Err(other) => panic!("render with bookmarks: {other}"),
    };

    let document = lopdf::Document::load_mem(&rendered.bytes).expect("reload pdf");
    let catalog = document.catalog().expect("catalog");
    assert!(catalog.get(b"Outlines").is_ok());
    assert_eq!(
        catalog.get(b"PageMode").and_then(|mode| mode.as_name_str()).ok(),
        Some("UseOutlines")
    );
}
