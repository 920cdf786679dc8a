//! Extended element implementations built on top of genpdf primitives.
//!
//! This module adds captioned photos, underlined text, horizontal rules, page markers used to
//! locate sections, and helpers that prepare image data for embedding.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use log::debug;

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::richtext::StyledSpan;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const DEFAULT_CAPTION_SPACING_MM: f64 = 2.0;
const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.4;

/// Longest edge, in pixels, of images embedded into documents.
///
/// Site photos straight from a phone camera are far larger than anything a printed page can
/// show; they are downscaled before embedding.
pub const MAX_EMBEDDED_IMAGE_EDGE_PX: u32 = 1600;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Opens an image file, guessing the format from its contents rather than the extension.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Composites an image with an alpha channel onto a white background.
///
/// genpdf cannot embed images that carry transparency.
pub fn flatten_alpha(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let flattened = ImageBuffer::from_fn(width, height, |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = pixel[3] as u16;
        let blend = |channel: u8| ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
    });
    DynamicImage::ImageRgb8(flattened)
}

/// Downscales images whose longest edge exceeds `max_edge` pixels, keeping the aspect ratio.
pub fn limit_image_size(image: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_edge && height <= max_edge {
        return image;
    }
    debug!(
        "Downscaling {}x{} image to fit within {}px",
        width, height, max_edge
    );
    image.thumbnail(max_edge, max_edge)
}

/// Flattens transparency and bounds the pixel size so the image can be embedded.
pub fn prepare_for_embedding(image: DynamicImage) -> DynamicImage {
    flatten_alpha(limit_image_size(image, MAX_EMBEDDED_IMAGE_EDGE_PX))
}

fn image_from_dynamic(image: DynamicImage) -> Result<(Image, Size), Error> {
    let image = prepare_for_embedding(image);
    let size = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let image = Image::from_dynamic_image(image)?;
    Ok((image, size))
}

pub fn image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<(Image, Size), Error> {
    let dynamic = decode_image_from_bytes(bytes)?;
    image_from_dynamic(dynamic)
}

pub fn image_from_path(path: impl AsRef<Path>) -> Result<(Image, Size), Error> {
    let dynamic = decode_image_from_path(path)?;
    image_from_dynamic(dynamic)
}

/// Builds a genpdf image scaled to `width` while preserving the aspect ratio.
pub fn image_with_width(image: DynamicImage, width: Mm) -> Result<Image, Error> {
    let (mut element, size) = image_from_dynamic(image)?;
    let natural = mm_to_f64(size.width);
    if natural > f64::EPSILON {
        let scale = mm_to_f64(width) / natural;
        element.set_scale(Scale::new(scale, scale));
    }
    Ok(element)
}

fn default_caption_spacing() -> Mm {
    mm_from_f64(DEFAULT_CAPTION_SPACING_MM)
}

fn default_underline_offset() -> Mm {
    mm_from_f64(DEFAULT_UNDERLINE_OFFSET_MM)
}

/// An image with a caption stacked underneath.
///
/// The image and the caption share the same alignment.  The image can be rescaled to a
/// requested width, capped to a maximum height, and is always shrunk to the available width.
pub struct CaptionedImage {
    image: Image,
    caption: Paragraph,
    alignment: Alignment,
    natural_size: Size,
    requested_width: Option<Mm>,
    max_height: Option<Mm>,
    spacing: Mm,
}

impl CaptionedImage {
    fn new(image: Image, caption: Paragraph, natural_size: Size) -> Self {
        let mut element = Self {
            image,
            caption,
            alignment: Alignment::Left,
            natural_size,
            requested_width: None,
            max_height: None,
            spacing: default_caption_spacing(),
        };
        element.apply_alignment();
        element
    }

    /// Decodes `bytes` and prepares them for embedding.
    pub fn from_bytes(bytes: impl AsRef<[u8]>, caption: Paragraph) -> Result<Self, Error> {
        let (image, size) = image_from_bytes(bytes)?;
        Ok(Self::new(image, caption, size))
    }

    pub fn from_path(path: impl AsRef<Path>, caption: Paragraph) -> Result<Self, Error> {
        let (image, size) = image_from_path(path)?;
        Ok(Self::new(image, caption, size))
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.apply_alignment();
        self
    }

    /// Constrains the rendered width of the image while preserving the aspect ratio.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.requested_width = width.into();
        self
    }

    /// Caps the rendered height of the image while preserving the aspect ratio.
    pub fn with_max_height(mut self, height: impl Into<Option<Mm>>) -> Self {
        self.max_height = height.into();
        self
    }

    fn apply_alignment(&mut self) {
        self.image.set_alignment(self.alignment);
        self.caption.set_alignment(self.alignment);
    }

    /// Returns the scale factor honouring the requested width, the height cap and the width of
    /// the area the image is rendered into.
    fn effective_scale(&self, available_width: Mm) -> f64 {
        let natural_width = mm_to_f64(self.natural_size.width);
        let natural_height = mm_to_f64(self.natural_size.height);
        if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
            return 1.0;
        }

        let mut scale = match self.requested_width {
            Some(width) => mm_to_f64(width) / natural_width,
            None => 1.0,
        };
        if let Some(max_height) = self.max_height {
            scale = scale.min(mm_to_f64(max_height) / natural_height);
        }
        let available = mm_to_f64(available_width);
        if available > 0.0 {
            scale = scale.min(available / natural_width);
        }
        scale
    }
}

impl Element for CaptionedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.apply_alignment();
        let scale = self.effective_scale(area.size().width);
        self.image.set_scale(Scale::new(scale, scale));

        let mut result = RenderResult::default();
        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;

        let spacing = self.spacing;
        area.add_offset(Position::new(0, image_result.size.height + spacing));
        if mm_to_f64(spacing) > 0.0 {
            result.size = result.size.stack_vertical(Size::new(0, spacing));
        }

        let caption_result = self.caption.render(context, area, style)?;
        result.size = result.size.stack_vertical(caption_result.size);
        result.has_more |= caption_result.has_more;

        Ok(result)
    }
}

/// A single line of styled text that supports underlines by drawing thin strokes underneath.
pub struct UnderlinedText {
    spans: Vec<StyledSpan>,
    alignment: Alignment,
    underline_offset: Mm,
}

impl UnderlinedText {
    pub fn new(spans: Vec<StyledSpan>) -> Self {
        Self {
            spans,
            alignment: Alignment::Left,
            underline_offset: default_underline_offset(),
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl Element for UnderlinedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut prepared: Vec<(StyledString, bool, Mm)> = Vec::with_capacity(self.spans.len());
        let mut total_width = Mm::default();
        let mut max_line_height = style.line_height(&context.font_cache);
        let mut max_glyph_height = Mm::default();

        for span in &self.spans {
            let mut string = span.string.clone();
            string.style = style.and(string.style);
            let width = string.width(&context.font_cache);
            total_width += width;
            max_line_height = max_line_height.max(string.style.line_height(&context.font_cache));
            let glyph_height = string
                .style
                .font(&context.font_cache)
                .glyph_height(string.style.font_size());
            max_glyph_height = max_glyph_height.max(glyph_height);
            prepared.push((string, span.underline, width));
        }

        let available_width = area.size().width;
        let x_offset = match self.alignment {
            Alignment::Left => Mm::default(),
            Alignment::Center => (available_width - total_width) / 2.0,
            Alignment::Right => available_width - total_width,
        };

        let mut result = RenderResult::default();
        if max_line_height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        if let Some(mut section) =
            area.text_section(&context.font_cache, Position::new(x_offset, 0), style)
        {
            for (string, _, _) in &prepared {
                section.print_str(&string.s, string.style)?;
            }
        } else {
            result.has_more = true;
            return Ok(result);
        }

        let baseline = max_glyph_height + self.underline_offset;
        let mut cursor = x_offset;
        for (string, underline, width) in &prepared {
            if *underline {
                let mut line_style = Style::new();
                if let Some(color) = string.style.color().or(style.color()) {
                    line_style = line_style.with_color(color);
                }
                area.draw_line(
                    vec![
                        Position::new(cursor, baseline),
                        Position::new(cursor + *width, baseline),
                    ],
                    line_style,
                );
            }
            cursor += *width;
        }

        result.size = Size::new(total_width, max_line_height);
        area.add_offset(Position::new(0, max_line_height));

        Ok(result)
    }
}

/// A horizontal line spanning the full width of the area, followed by a small gap.
pub struct Rule {
    color: Option<Color>,
    gap: Mm,
}

impl Rule {
    pub fn new() -> Self {
        Self {
            color: None,
            gap: mm_from_f64(1.5),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for Rule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        if area.size().height < self.gap {
            result.has_more = true;
            return Ok(result);
        }

        let mut line_style = Style::new();
        if let Some(color) = self.color.or(style.color()) {
            line_style = line_style.with_color(color);
        }
        let y = self.gap / 2.0;
        area.draw_line(
            vec![Position::new(0, y), Position::new(area.size().width, y)],
            line_style,
        );
        result.size = Size::new(area.size().width, self.gap);
        Ok(result)
    }
}

/// Page numbers shared between the page decorator and [`PageMarker`] elements.
#[derive(Clone, Default)]
pub struct PageTracker {
    current: Rc<Cell<usize>>,
    marks: Rc<RefCell<Vec<Option<usize>>>>,
}

impl PageTracker {
    /// Creates a tracker with `slots` unset marks.
    pub fn new(slots: usize) -> Self {
        Self {
            current: Rc::new(Cell::new(0)),
            marks: Rc::new(RefCell::new(vec![None; slots])),
        }
    }

    /// Records that a new page started and returns its 1-based number.
    pub fn next_page(&self) -> usize {
        let page = self.current.get() + 1;
        self.current.set(page);
        page
    }

    /// Number of pages started so far.
    pub fn pages(&self) -> usize {
        self.current.get()
    }

    /// Wraps `element` so the page it starts on is recorded into `slot`.
    pub fn marker<E: Element>(&self, slot: usize, element: E) -> PageMarker<E> {
        PageMarker {
            slot,
            tracker: self.clone(),
            element,
        }
    }

    fn record(&self, slot: usize) {
        let page = self.current.get();
        if let Some(mark) = self.marks.borrow_mut().get_mut(slot) {
            if mark.is_none() {
                *mark = Some(page);
            }
        }
    }

    /// Returns the recorded page for every slot.
    pub fn marks(&self) -> Vec<Option<usize>> {
        self.marks.borrow().clone()
    }
}

/// Element recording the page on which its wrapped element starts.
///
/// Nothing is recorded while the wrapped element is pushed to the next page without drawing, so
/// a heading that does not fit at the bottom of a page is marked on the page it lands on.
pub struct PageMarker<E> {
    slot: usize,
    tracker: PageTracker,
    element: E,
}

impl<E: Element> Element for PageMarker<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.element.render(context, area, style)?;
        if result.size.height > Mm::default() || !result.has_more {
            self.tracker.record(self.slot);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let flattened = flatten_alpha(DynamicImage::ImageRgba8(rgba));

        assert!(!flattened.color().has_alpha());
        let rgb = flattened.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn oversized_images_are_downscaled() {
        let large = DynamicImage::ImageRgb8(ImageBuffer::new(3200, 1600));
        let limited = limit_image_size(large, 1600);
        assert_eq!(limited.dimensions(), (1600, 800));

        let small = DynamicImage::ImageRgb8(ImageBuffer::new(40, 30));
        assert_eq!(limit_image_size(small, 1600).dimensions(), (40, 30));
    }

    #[test]
    fn tracker_counts_pages() {
        let tracker = PageTracker::new(2);
        assert_eq!(tracker.next_page(), 1);
        assert_eq!(tracker.next_page(), 2);
        assert_eq!(tracker.pages(), 2);
        assert_eq!(tracker.marks(), vec![None, None]);
    }

    #[test]
    fn invalid_bytes_fail_to_decode() {
        assert!(decode_image_from_bytes(b"not an image").is_err());
    }
}
