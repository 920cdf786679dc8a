//! Standalone HTML rendering of a [`Document`] for the view page and the browser print path.
//!
//! The output is a single self-contained page: CSS is inlined and every image is embedded as a
//! `data:` URL, so the page can be handed to a headless browser with `setContent` and printed
//! without any network access.  [`print_header_template`] and [`print_footer_template`] produce
//! the header/footer snippets the browser stamps onto every printed page.

use std::fmt;
use std::io::{self, Cursor};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use genpdf::style::Color;
use image::{ImageFormat, ImageOutputFormat};
use log::warn;

use crate::letterhead::Letterhead;
use crate::model::{Block, Document, FieldGrid, HorizontalAlignment, ImageBlock, RichParagraph, Table};
use crate::richtext::Span;

const STYLESHEET: &str = r#"
@page { size: A4; }
* { box-sizing: border-box; }
body { font-family: Roboto, "Liberation Sans", Arial, sans-serif; font-size: 10pt; color: #000; margin: 0; }
.letterhead { display: flex; align-items: center; justify-content: space-between; border-bottom: 1.5pt solid var(--accent); padding-bottom: 4mm; margin-bottom: 4mm; }
.letterhead img { display: block; }
.company { text-align: right; }
.company .name { font-size: 14pt; font-weight: bold; color: var(--accent); }
.company .detail { font-size: 8pt; color: #5a5a5a; }
.company .tagline { font-style: italic; }
.banner { text-align: center; margin-bottom: 6mm; }
.banner h1 { font-size: 16pt; margin: 0; color: var(--accent); text-transform: uppercase; }
.banner .subtitle { font-size: 11pt; }
.banner .reference { font-size: 8pt; color: #5a5a5a; }
h2 { font-size: 11pt; text-transform: uppercase; color: var(--accent); margin: 4mm 0 2mm; }
p { margin: 0 0 2mm; white-space: pre-wrap; }
table { width: 100%; border-collapse: collapse; margin-bottom: 3mm; page-break-inside: auto; }
tr { page-break-inside: avoid; }
th, td { border: 0.5pt solid #000; padding: 1mm; vertical-align: top; text-align: left; }
td.label { font-weight: bold; }
figure { margin: 0 0 4mm; page-break-inside: avoid; }
figure img { max-width: 100%; }
figcaption { font-size: 9pt; font-style: italic; }
.page-break { break-before: page; page-break-before: always; }
.align-center { text-align: center; }
.align-right { text-align: right; }
"#;

/// Errors produced while rendering a [`Document`] to HTML.
#[derive(Debug)]
pub enum HtmlRenderError {
    /// An image block could not be read from its source.
    ImageLoad {
        section: String,
        block: usize,
        source: io::Error,
    },
    /// An image block does not hold a recognizable image.
    ImageFormat {
        section: String,
        block: usize,
        source: image::ImageError,
    },
    /// A table row does not have one cell per column.
    TableShape {
        section: String,
        block: usize,
        row: Option<usize>,
        cells: usize,
        columns: usize,
    },
}

impl fmt::Display for HtmlRenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { section, block, .. } => write!(
                f,
                "Image in section '{}' (block {}) could not be read",
                section, block
            ),
            Self::ImageFormat { section, block, .. } => write!(
                f,
                "Image in section '{}' (block {}) is not a supported image",
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
        }
    }
}

impl std::error::Error for HtmlRenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } => Some(source),
            Self::ImageFormat { source, .. } => Some(source),
            Self::TableShape { .. } => None,
        }
    }
}

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// CSS `rgb()` notation for a genpdf color.
pub fn css_color(color: Color) -> String {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Greyscale(level) => (level, level, level),
        Color::Cmyk(c, m, y, k) => {
            let channel = |value: u8| {
                let remaining = (255 - value as u16) * (255 - k as u16) / 255;
                remaining as u8
            };
            (channel(c), channel(m), channel(y))
        }
    };
    format!("rgb({}, {}, {})", r, g, b)
}

fn mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Ico => Some("image/x-icon"),
        _ => None,
    }
}

/// Encodes image bytes as a `data:` URL.
///
/// Formats browsers do not display natively are re-encoded as PNG.
pub fn image_data_url(bytes: &[u8]) -> Result<String, image::ImageError> {
    let format = image::guess_format(bytes)?;
    if let Some(mime) = mime_type(format) {
        return Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)));
    }

    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let mut png = Vec::new();
    decoded.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

fn alignment_class(alignment: HorizontalAlignment) -> &'static str {
    match alignment {
        HorizontalAlignment::Left => "",
        HorizontalAlignment::Center => " class=\"align-center\"",
        HorizontalAlignment::Right => " class=\"align-right\"",
    }
}

fn span_markup(span: &Span) -> String {
    let mut markup = escape(span.text());
    if span.is_underlined() {
        markup = format!("<u>{}</u>", markup);
    }
    if span.is_italic() {
        markup = format!("<em>{}</em>", markup);
    }
    if span.is_bold() {
        markup = format!("<strong>{}</strong>", markup);
    }
    if let Some(color) = span.color() {
        markup = format!("<span style=\"color: {}\">{}</span>", css_color(color), markup);
    }
    markup
}

fn inline_markup(rich: &RichParagraph) -> String {
    rich.spans().iter().map(span_markup).collect()
}

fn paragraph_markup(rich: &RichParagraph) -> String {
    format!(
        "<p{}>{}</p>\n",
        alignment_class(rich.alignment()),
        inline_markup(rich)
    )
}

/// Renders documents into standalone HTML pages carrying the company letterhead.
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer {
    letterhead: Option<Letterhead>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_letterhead(mut self, letterhead: impl Into<Option<Letterhead>>) -> Self {
        self.letterhead = letterhead.into();
        self
    }

    /// Renders the whole page, `<!DOCTYPE html>` included.
    pub fn render(&self, document: &Document) -> Result<String, HtmlRenderError> {
        let accent = self
            .letterhead
            .as_ref()
            .map(|letterhead| css_color(letterhead.accent()))
            .unwrap_or_else(|| "rgb(0, 0, 0)".to_string());

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape(document.title())));
        html.push_str("<style>");
        html.push_str(STYLESHEET);
        html.push_str(&format!(":root {{ --accent: {}; }}\n", accent));
        html.push_str("</style>\n</head>\n<body>\n");

        if let Some(letterhead) = &self.letterhead {
            html.push_str(&letterhead_markup(letterhead));
        }
        html.push_str(&banner_markup(document));

        for section in document.sections() {
            let blocks = section.blocks();
            let leading_breaks = blocks
                .iter()
                .take_while(|block| matches!(block, Block::PageBreak))
                .count();

            let class = if leading_breaks > 0 {
                " class=\"page-break\""
            } else {
                ""
            };
            match section.identifier() {
                Some(id) => html.push_str(&format!(
                    "<section id=\"{}\"{}>\n",
                    escape(id),
                    class
                )),
                None => html.push_str(&format!("<section{}>\n", class)),
            }
            html.push_str(&format!("<h2>{}</h2>\n", escape(section.title())));

            for (index, block) in blocks.iter().enumerate().skip(leading_breaks) {
                push_block(&mut html, section.title(), index, block)?;
            }
            html.push_str("</section>\n");
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }
}

fn letterhead_markup(letterhead: &Letterhead) -> String {
    let mut markup = String::from("<header class=\"letterhead\">\n");

    let logo = letterhead.logo().and_then(|source| {
        let url = source
            .load()
            .map_err(|err| err.to_string())
            .and_then(|bytes| image_data_url(&bytes).map_err(|err| err.to_string()));
        match url {
            Ok(url) => Some(url),
            Err(err) => {
                warn!("Letterhead logo could not be loaded, printing text only: {}", err);
                None
            }
        }
    });
    match logo {
        Some(url) => markup.push_str(&format!(
            "<img src=\"{}\" alt=\"\" style=\"width: {}mm\">\n",
            url,
            letterhead.logo_width_mm()
        )),
        None => markup.push_str("<div></div>\n"),
    }

    markup.push_str("<div class=\"company\">\n");
    markup.push_str(&format!(
        "<div class=\"name\">{}</div>\n",
        escape(letterhead.company_name())
    ));
    if let Some(tagline) = letterhead.tagline() {
        markup.push_str(&format!(
            "<div class=\"detail tagline\">{}</div>\n",
            escape(tagline)
        ));
    }
    for line in letterhead.address_lines() {
        markup.push_str(&format!("<div class=\"detail\">{}</div>\n", escape(line)));
    }
    if let Some(contact) = letterhead.contact_line() {
        markup.push_str(&format!("<div class=\"detail\">{}</div>\n", escape(&contact)));
    }
    if let Some(website) = letterhead.website() {
        markup.push_str(&format!(
            "<div class=\"detail\"><u>{}</u></div>\n",
            escape(website)
        ));
    }
    markup.push_str("</div>\n</header>\n");
    markup
}

fn banner_markup(document: &Document) -> String {
    let mut markup = String::from("<div class=\"banner\">\n");
    markup.push_str(&format!("<h1>{}</h1>\n", escape(document.title())));
    if let Some(subtitle) = document.subtitle() {
        markup.push_str(&format!(
            "<div class=\"subtitle\">{}</div>\n",
            escape(subtitle)
        ));
    }
    if let Some(reference) = document.reference() {
        markup.push_str(&format!(
            "<div class=\"reference\">{}</div>\n",
            escape(reference)
        ));
    }
    markup.push_str("</div>\n");
    markup
}

fn push_block(
    html: &mut String,
    section: &str,
    index: usize,
    block: &Block,
) -> Result<(), HtmlRenderError> {
    match block {
        Block::Paragraph(rich) => html.push_str(&paragraph_markup(rich)),
        Block::Image(image) => html.push_str(&figure_markup(image, section, index)?),
        Block::Fields(grid) => html.push_str(&fields_markup(grid)),
        Block::Table(table) => {
            if let Some((row, cells)) = table.first_misshapen_row() {
                return Err(HtmlRenderError::TableShape {
                    section: section.to_string(),
                    block: index,
                    row,
                    cells,
                    columns: table.column_weights().len(),
                });
            }
            html.push_str(&table_markup(table));
        }
        Block::Spacer(lines) => html.push_str(&format!(
            "<div style=\"height: {:.1}em\"></div>\n",
            lines
        )),
        Block::PageBreak => html.push_str("<div class=\"page-break\"></div>\n"),
    }
    Ok(())
}

fn figure_markup(block: &ImageBlock, section: &str, index: usize) -> Result<String, HtmlRenderError> {
    let bytes = block
        .source()
        .load()
        .map_err(|source| HtmlRenderError::ImageLoad {
            section: section.to_string(),
            block: index,
            source,
        })?;
    let url = image_data_url(&bytes).map_err(|source| HtmlRenderError::ImageFormat {
        section: section.to_string(),
        block: index,
        source,
    })?;

    let mut style = Vec::new();
    if let Some(width) = block.width_mm() {
        style.push(format!("width: {}mm", width));
    }
    if let Some(height) = block.max_height_mm() {
        style.push(format!("max-height: {}mm", height));
    }
    let style = if style.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", style.join("; "))
    };

    let mut markup = format!(
        "<figure{}>\n<img src=\"{}\" alt=\"\"{}>\n",
        alignment_class(block.alignment()),
        url,
        style
    );
    if let Some(caption) = block.caption() {
        markup.push_str(&format!("<figcaption>{}</figcaption>\n", inline_markup(caption)));
    }
    markup.push_str("</figure>\n");
    Ok(markup)
}

fn fields_markup(grid: &FieldGrid) -> String {
    if grid.fields().is_empty() {
        return String::new();
    }

    let mut markup = String::from("<table class=\"fields\">\n");
    for fields in grid.rows() {
        markup.push_str("<tr>");
        for field in fields {
            markup.push_str(&format!(
                "<td class=\"label\">{}</td><td>{}</td>",
                escape(&field.label),
                inline_markup(&field.value)
            ));
        }
        for _ in fields.len()..grid.columns() {
            markup.push_str("<td class=\"label\"></td><td></td>");
        }
        markup.push_str("</tr>\n");
    }
    markup.push_str("</table>\n");
    markup
}

fn table_markup(table: &Table) -> String {
    let total: usize = table.column_weights().iter().sum::<usize>().max(1);

    let mut markup = String::from("<table>\n<colgroup>");
    for weight in table.column_weights() {
        markup.push_str(&format!(
            "<col style=\"width: {:.2}%\">",
            *weight as f64 * 100.0 / total as f64
        ));
    }
    markup.push_str("</colgroup>\n");

    if let Some(header) = table.header() {
        markup.push_str("<thead><tr>");
        for title in header {
            markup.push_str(&format!("<th>{}</th>", escape(title)));
        }
        markup.push_str("</tr></thead>\n");
    }

    markup.push_str("<tbody>\n");
    for row in table.rows() {
        markup.push_str("<tr>");
        for cell in row {
            markup.push_str(&format!("<td>{}</td>", inline_markup(cell)));
        }
        markup.push_str("</tr>\n");
    }
    markup.push_str("</tbody>\n</table>\n");
    markup
}

/// Header template for browser printing: company name and document title.
///
/// Header and footer templates are rendered in isolation by the browser, so every style has to
/// be inline and the font size must be set explicitly.
pub fn print_header_template(letterhead: &Letterhead, title: &str) -> String {
    format!(
        "<div style=\"width: 100%; font-size: 8px; padding: 0 15mm; display: flex; \
         justify-content: space-between; color: {};\"><span>{}</span><span>{}</span></div>",
        css_color(letterhead.accent()),
        escape(letterhead.company_name()),
        escape(title)
    )
}

/// Footer template for browser printing: contact details and `Page N of M`.
pub fn print_footer_template(letterhead: &Letterhead) -> String {
    let mut details = escape(letterhead.company_name());
    if let Some(contact) = letterhead.contact_line() {
        details.push_str("  |  ");
        details.push_str(&escape(&contact));
    }
    format!(
        "<div style=\"width: 100%; font-size: 8px; padding: 0 15mm; display: flex; \
         justify-content: space-between; color: #5a5a5a;\"><span>{}</span>\
         <span>Page <span class=\"pageNumber\"></span> of <span class=\"totalPages\"></span></span></div>",
        details
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageSource, Section};

    fn png_bytes() -> Vec<u8> {
        let image = image::DynamicImage::new_rgb8(4, 3);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn escape_replaces_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn span_markup_nests_styles() {
        let span = Span::new("Fail").bold().colored(Color::Rgb(200, 0, 0));
        assert_eq!(
            span_markup(&span),
            "<span style=\"color: rgb(200, 0, 0)\"><strong>Fail</strong></span>"
        );
    }

    #[test]
    fn png_bytes_become_png_data_url() {
        let url = image_data_url(&png_bytes()).expect("data url");
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(image_data_url(b"definitely not an image").is_err());
    }

    #[test]
    fn document_renders_sections_and_escaped_text() {
        let document = Document::new("Parapet Inspection").with_section(
            Section::new("Remarks").with_block(Block::text("Coping < 2\" & loose")),
        );
        let html = HtmlRenderer::new()
            .with_letterhead(Letterhead::new("Acme & Sons"))
            .render(&document)
            .expect("render html");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Parapet Inspection</h1>"));
        assert!(html.contains("<h2>Remarks</h2>"));
        assert!(html.contains("Coping &lt; 2&quot; &amp; loose"));
        assert!(html.contains("Acme &amp; Sons"));
    }

    #[test]
    fn sections_starting_on_new_page_get_page_break_class() {
        let section = Section::builder("Photos")
            .start_on_new_page(true)
            .push_block(Block::text("none"))
            .build();
        let html = HtmlRenderer::new()
            .render(&Document::new("Report").with_section(section))
            .expect("render html");
        assert!(html.contains("<section class=\"page-break\">"));
    }

    #[test]
    fn images_are_embedded_inline() {
        let section = Section::new("Photos").with_block(Block::Image(
            ImageBlock::new(ImageSource::from_bytes(png_bytes()))
                .with_caption(Some(RichParagraph::plain("Photo 1: North wall"))),
        ));
        let html = HtmlRenderer::new()
            .render(&Document::new("Report").with_section(section))
            .expect("render html");
        assert!(html.contains("src=\"data:image/png;base64,"));
        assert!(html.contains("<figcaption>Photo 1: North wall</figcaption>"));
    }

    #[test]
    fn bad_image_names_its_section_and_block() {
        let section = Section::new("Photos")
            .with_block(Block::text("intro"))
            .with_block(Block::image(ImageSource::from_bytes(b"nope".to_vec())));
        let err = HtmlRenderer::new()
            .render(&Document::new("Report").with_section(section))
            .expect_err("image must fail");
        match err {
            HtmlRenderError::ImageFormat { section, block, .. } => {
                assert_eq!(section, "Photos");
                assert_eq!(block, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn misshapen_table_is_rejected() {
        let table = Table::new(vec![1, 1])
            .with_header(["Item", "Answer"])
            .with_row(vec![RichParagraph::plain("only one")]);
        let section = Section::new("Checklist").with_block(Block::Table(table));
        let err = HtmlRenderer::new()
            .render(&Document::new("Report").with_section(section))
            .expect_err("shape must fail");
        assert!(matches!(
            err,
            HtmlRenderError::TableShape {
                row: Some(0),
                cells: 1,
                columns: 2,
                ..
            }
        ));
    }

    #[test]
    fn footer_template_uses_browser_page_counters() {
        let footer = print_footer_template(
            &Letterhead::new("Acme").with_phone(Some("555-0100".to_string())),
        );
        assert!(footer.contains("<span class=\"pageNumber\"></span>"));
        assert!(footer.contains("<span class=\"totalPages\"></span>"));
        assert!(footer.contains("Acme  |  Tel. 555-0100"));
    }
}
