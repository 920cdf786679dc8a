//! The fixed company letterhead shared by every report.
//!
//! A [`Letterhead`] describes the company block (logo, name, address, contact details).  From it
//! the PDF backend builds the page header, the title banner at the top of the first page and the
//! page footer with the `Page N of M` counter; the HTML backend builds the equivalent print
//! header/footer templates.

use genpdf::elements::{Break, Image, LinearLayout, Paragraph, TableLayout};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Alignment, Element};
use image::DynamicImage;
use log::warn;

use crate::elements::{self, mm_from_f64, Rule, UnderlinedText};
use crate::model::{Document, ImageSource};
use crate::richtext::{spans_to_styled_strings, Span};

const DEFAULT_ACCENT: Color = Color::Rgb(22, 64, 112);
const DEFAULT_LOGO_WIDTH_MM: f64 = 32.0;
const MUTED: Color = Color::Greyscale(90);

/// Height reserved at the bottom of every page for the footer.
pub const FOOTER_HEIGHT_MM: f64 = 12.0;

/// Position of a page within the rendered document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based page number.
    pub number: usize,
    /// Total number of pages, known once the document has been laid out once.
    pub total: Option<usize>,
}

impl PageInfo {
    /// Formats the page counter, e.g. `Page 2 of 5`.
    pub fn label(&self) -> String {
        match self.total {
            Some(total) => format!("Page {} of {}", self.number, total),
            None => format!("Page {}", self.number),
        }
    }
}

/// Company details printed on every report.
#[derive(Clone, Debug, PartialEq)]
pub struct Letterhead {
    company_name: String,
    tagline: Option<String>,
    address_lines: Vec<String>,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    logo: Option<ImageSource>,
    logo_width_mm: f64,
    accent: Color,
}

impl Letterhead {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            tagline: None,
            address_lines: Vec::new(),
            phone: None,
            email: None,
            website: None,
            logo: None,
            logo_width_mm: DEFAULT_LOGO_WIDTH_MM,
            accent: DEFAULT_ACCENT,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref()
    }

    pub fn address_lines(&self) -> &[String] {
        &self.address_lines
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn logo(&self) -> Option<&ImageSource> {
        self.logo.as_ref()
    }

    pub fn logo_width_mm(&self) -> f64 {
        self.logo_width_mm
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    pub fn with_tagline(mut self, tagline: impl Into<Option<String>>) -> Self {
        self.tagline = tagline.into();
        self
    }

    pub fn with_address_line(mut self, line: impl Into<String>) -> Self {
        self.address_lines.push(line.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<Option<String>>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<Option<String>>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_website(mut self, website: impl Into<Option<String>>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_logo(mut self, logo: impl Into<Option<ImageSource>>) -> Self {
        self.logo = logo.into();
        self
    }

    pub fn with_logo_width_mm(mut self, width_mm: f64) -> Self {
        self.logo_width_mm = width_mm;
        self
    }

    pub fn with_accent(mut self, accent: Color) -> Self {
        self.accent = accent;
        self
    }

    /// Phone and email joined into a single line, if either is set.
    pub fn contact_line(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.phone.as_ref().map(|phone| format!("Tel. {}", phone)),
            self.email.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("  |  "))
        }
    }

    /// Decodes the logo once so it can be reused on every page.
    ///
    /// A logo that cannot be loaded is logged and skipped; the text block is still printed.
    pub(crate) fn prepare(&self) -> PreparedLetterhead {
        let logo = self.logo.as_ref().and_then(|source| {
            let decoded = match source {
                ImageSource::Bytes(bytes) => elements::decode_image_from_bytes(bytes),
                ImageSource::Path(path) => elements::decode_image_from_path(path),
            };
            match decoded {
                Ok(image) => Some(elements::prepare_for_embedding(image)),
                Err(err) => {
                    warn!("Letterhead logo could not be loaded, printing text only: {}", err);
                    None
                }
            }
        });

        PreparedLetterhead {
            letterhead: self.clone(),
            logo,
        }
    }
}

impl Default for Letterhead {
    fn default() -> Self {
        Letterhead::new("Building Inspection Services")
    }
}

/// A letterhead whose logo has already been decoded.
#[derive(Clone)]
pub(crate) struct PreparedLetterhead {
    letterhead: Letterhead,
    logo: Option<DynamicImage>,
}

fn small(color: Color) -> Style {
    Style::new().with_font_size(8).with_color(color)
}

impl PreparedLetterhead {
    pub(crate) fn accent(&self) -> Color {
        self.letterhead.accent
    }

    fn company_block(&self) -> LinearLayout {
        let letterhead = &self.letterhead;
        let mut block = LinearLayout::vertical();

        block.push(
            Paragraph::new(StyledString::new(
                letterhead.company_name.clone(),
                Style::new()
                    .bold()
                    .with_font_size(14)
                    .with_color(letterhead.accent),
            ))
            .aligned(Alignment::Right),
        );
        if let Some(tagline) = &letterhead.tagline {
            block.push(
                Paragraph::new(StyledString::new(tagline.clone(), small(MUTED).italic()))
                    .aligned(Alignment::Right),
            );
        }
        for line in &letterhead.address_lines {
            block.push(
                Paragraph::new(StyledString::new(line.clone(), small(MUTED)))
                    .aligned(Alignment::Right),
            );
        }
        if let Some(contact) = letterhead.contact_line() {
            block.push(
                Paragraph::new(StyledString::new(contact, small(MUTED))).aligned(Alignment::Right),
            );
        }
        if let Some(website) = &letterhead.website {
            let spans = [Span::new(website.clone())
                .colored(letterhead.accent)
                .underline()];
            block.push(
                UnderlinedText::new(spans_to_styled_strings(spans.iter()))
                    .with_alignment(Alignment::Right)
                    .styled(Style::new().with_font_size(8)),
            );
        }
        block
    }

    fn logo_element(&self) -> Option<Image> {
        let logo = self.logo.clone()?;
        match elements::image_with_width(logo, mm_from_f64(self.letterhead.logo_width_mm)) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("Letterhead logo could not be embedded: {}", err);
                None
            }
        }
    }

    /// Page header: logo on the left, company block on the right, accent rule underneath.
    pub(crate) fn header(&self, _page: PageInfo) -> Box<dyn Element> {
        let mut layout = LinearLayout::vertical();

        match self.logo_element() {
            Some(logo) => {
                let mut table = TableLayout::new(vec![1, 2]);
                let row: Vec<Box<dyn Element>> = vec![Box::new(logo), Box::new(self.company_block())];
                if let Err(err) = table.push_row(row) {
                    warn!("Letterhead header row rejected: {}", err);
                    layout.push(self.company_block());
                } else {
                    layout.push(table);
                }
            }
            None => layout.push(self.company_block()),
        }

        layout.push(Rule::new().with_color(self.letterhead.accent));
        layout.push(Break::new(0.5));
        Box::new(layout)
    }

    /// Page footer: company and contact details on the left, page counter on the right.
    pub(crate) fn footer(&self, page: PageInfo) -> Box<dyn Element> {
        let letterhead = &self.letterhead;
        let mut layout = LinearLayout::vertical();
        layout.push(Rule::new().with_color(letterhead.accent));

        let mut details = letterhead.company_name.clone();
        if let Some(contact) = letterhead.contact_line() {
            details.push_str("  |  ");
            details.push_str(&contact);
        }

        let mut table = TableLayout::new(vec![3, 1]);
        let row: Vec<Box<dyn Element>> = vec![
            Box::new(Paragraph::new(StyledString::new(details, small(MUTED)))),
            Box::new(
                Paragraph::new(StyledString::new(page.label(), small(MUTED)))
                    .aligned(Alignment::Right),
            ),
        ];
        if let Err(err) = table.push_row(row) {
            warn!("Letterhead footer row rejected: {}", err);
        }
        layout.push(table);
        Box::new(layout)
    }
}

/// Title banner printed once, at the top of the first page.
pub(crate) fn title_banner(document: &Document, accent: Color) -> LinearLayout {
    let mut banner = LinearLayout::vertical();
    banner.push(
        Paragraph::new(StyledString::new(
            document.title().to_uppercase(),
            Style::new().bold().with_font_size(16).with_color(accent),
        ))
        .aligned(Alignment::Center),
    );
    if let Some(subtitle) = document.subtitle() {
        banner.push(
            Paragraph::new(StyledString::new(
                subtitle.to_string(),
                Style::new().with_font_size(11),
            ))
            .aligned(Alignment::Center),
        );
    }
    if let Some(reference) = document.reference() {
        banner.push(
            Paragraph::new(StyledString::new(reference.to_string(), small(MUTED)))
                .aligned(Alignment::Center),
        );
    }
    banner.push(Break::new(1.0));
    banner
}
