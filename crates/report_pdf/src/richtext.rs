//! Styled text fragments shared by the PDF and HTML backends.
//!
//! A [`Span`] carries the subset of inline styling a report needs (bold, italic, underline and a
//! color).  The PDF backend turns spans into [`genpdf`][genpdf] styled strings, the HTML backend
//! into inline markup, so report layouts never depend on either renderer.
//!
//! [genpdf]: https://docs.rs/genpdf/

use genpdf::style::{Color, Style, StyledString};

/// Text with inline styling.  Underlines are drawn by
/// [`UnderlinedText`](crate::elements::UnderlinedText).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    color: Option<Color>,
    underline: bool,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// genpdf form of the span.  Underlining is dropped here, see [`StyledSpan`].
    pub fn to_styled_string(&self) -> StyledString {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        StyledString::new(self.text.clone(), style)
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Span::new(text)
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Span::new(text)
    }
}

/// A genpdf string plus the underline flag it cannot carry itself.
#[derive(Clone, Debug)]
pub struct StyledSpan {
    pub string: StyledString,
    pub underline: bool,
}

impl From<&Span> for StyledSpan {
    fn from(span: &Span) -> Self {
        StyledSpan {
            string: span.to_styled_string(),
            underline: span.underline,
        }
    }
}

pub fn spans_to_styled_strings<'a, I>(spans: I) -> Vec<StyledSpan>
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(StyledSpan::from).collect()
}

/// Text of all spans, styling removed.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styled_string_carries_bold_italic_and_color() {
        let span = Span::new("NO").bold().italic().colored(Color::Rgb(170, 30, 30));
        let styled = span.to_styled_string();
        assert_eq!(styled.s, "NO");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), Some(Color::Rgb(170, 30, 30)));
    }

    #[test]
    fn styled_span_captures_underline_flag() {
        let span = Span::new("inspections.example.com").underline();
        let styled = StyledSpan::from(&span);
        assert_eq!(styled.string.s, "inspections.example.com");
        assert!(styled.underline);
    }

    #[test]
    fn plain_text_joins_spans() {
        let spans = vec![Span::new("Client: ").bold(), Span::new("Harbor Point LLC")];
        assert_eq!(plain_text(&spans), "Client: Harbor Point LLC");
    }
}
