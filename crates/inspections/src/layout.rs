//! Projection of inspection records onto the letterhead document model.
//!
//! Every report type implements [`ReportLayout`] and only describes its own sections.  The
//! shared frame is assembled by [`document`]: the project information grid first, then the
//! type-specific sections, the remarks and finally the photographs, which always start on a new
//! page with one captioned image per photo.

use report_pdf::model::{
    Block, Document, FieldGrid, HorizontalAlignment, ImageBlock, ImageSource, RichParagraph,
    Section, Table,
};
use report_pdf::{Color, Span};

use crate::common::{Answer, ChecklistItem, Photo, ProjectInfo};
use crate::error::{InspectionError, Result};
use crate::kind::ReportKind;

const FAIL_COLOR: Color = Color::Rgb(176, 0, 32);
const MUTED_COLOR: Color = Color::Greyscale(110);
const PHOTO_WIDTH_MM: f64 = 120.0;
const PHOTO_MAX_HEIGHT_MM: f64 = 105.0;

/// A record that knows how to lay itself out as a letterhead report.
pub trait ReportLayout {
    fn kind(&self) -> ReportKind;

    fn project(&self) -> &ProjectInfo;

    fn remarks(&self) -> &str;

    fn photos(&self) -> &[Photo];

    /// Sections specific to this report type, printed between the project block and remarks.
    fn sections(&self) -> Vec<Section>;

    /// Type-specific validation problems on top of the shared project checks.
    fn problems(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Checks required fields, returning every problem found at once.
pub fn validate(report: &dyn ReportLayout) -> Result<()> {
    let mut problems = report.project().problems();
    problems.extend(report.problems());
    if problems.is_empty() {
        Ok(())
    } else {
        Err(InspectionError::Validation(problems))
    }
}

/// Builds the complete document for `report`.
///
/// `reference` is printed under the title banner, typically the stored record id.  Photos are
/// decoded here so a broken payload fails the whole document with the photo's number.
pub fn document(report: &dyn ReportLayout, reference: Option<&str>) -> Result<Document> {
    let project = report.project();
    let mut document = Document::new(report.kind().title())
        .with_subtitle(Some(project.project_name.clone()))
        .with_reference(reference.map(|reference| format!("Report {}", reference)));

    document.push_section(project_section(project));
    for section in report.sections() {
        document.push_section(section);
    }
    if let Some(section) = remarks_section(report.remarks()) {
        document.push_section(section);
    }
    if let Some(section) = photos_section(report.photos())? {
        document.push_section(section);
    }
    Ok(document)
}

fn project_section(project: &ProjectInfo) -> Section {
    let grid = FieldGrid::new(2)
        .with_field("Client", project.client.as_str())
        .with_field("Project", project.project_name.as_str())
        .with_field("Address", or_dash(&project.project_address))
        .with_optional_field("Project No.", project.project_number.as_deref())
        .with_optional_field("Permit No.", project.permit_number.as_deref())
        .with_field("Inspector", or_dash(&project.inspector))
        .with_field(
            "Date",
            project.inspection_date.format("%B %-d, %Y").to_string(),
        )
        .with_optional_field("Weather", project.weather.as_deref())
        .with_optional_field("Temperature", project.temperature.as_deref());

    Section::new("Project Information")
        .with_identifier(Some("project".to_string()))
        .with_block(Block::Fields(grid))
}

fn remarks_section(remarks: &str) -> Option<Section> {
    let remarks = remarks.trim();
    if remarks.is_empty() {
        return None;
    }
    let section = Section::new("Remarks").with_identifier(Some("remarks".to_string()));
    Some(
        remarks
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .fold(section, |section, paragraph| {
                section.with_block(Block::text(paragraph))
            }),
    )
}

fn photos_section(photos: &[Photo]) -> Result<Option<Section>> {
    if photos.is_empty() {
        return Ok(None);
    }

    let mut builder = Section::builder("Photographs")
        .identifier(Some("photos".to_string()))
        .start_on_new_page(true);
    for (offset, photo) in photos.iter().enumerate() {
        let index = offset + 1;
        let bytes = photo.decode(index)?;
        builder = builder.push_block(Block::Image(
            ImageBlock::new(ImageSource::from_bytes(bytes))
                .with_caption(Some(RichParagraph::plain(photo_caption(index, photo))))
                .with_alignment(HorizontalAlignment::Center)
                .with_width_mm(PHOTO_WIDTH_MM)
                .with_max_height_mm(PHOTO_MAX_HEIGHT_MM),
        ));
    }
    Ok(Some(builder.build()))
}

/// `Photo N: caption`, or just `Photo N` without a caption.
pub fn photo_caption(index: usize, photo: &Photo) -> String {
    match photo.caption.trim() {
        "" => format!("Photo {}", index),
        caption => format!("Photo {}: {}", index, caption),
    }
}

/// Checklist table with `Item | Answer | Details` columns.
///
/// Unanswered items print an empty answer cell; `NO` answers are highlighted.
pub fn checklist_table(items: &[(&str, &ChecklistItem)]) -> Table {
    let mut table = Table::new(vec![5, 1, 5]).with_header(["Item", "Answer", "Details"]);
    for (label, item) in items {
        table.push_row(vec![
            RichParagraph::plain(*label),
            answer_cell(item.answer),
            RichParagraph::plain(item.detail.clone().unwrap_or_default()),
        ]);
    }
    table
}

/// A titled section holding a single checklist table.
pub fn checklist_section(title: &str, items: &[(&str, &ChecklistItem)]) -> Section {
    Section::new(title)
        .with_identifier(Some("checklist".to_string()))
        .with_block(Block::Table(checklist_table(items)))
}

/// Rich cell for an optional answer.
pub fn answer_cell(answer: Option<Answer>) -> RichParagraph {
    match answer {
        None => RichParagraph::default(),
        Some(Answer::No) => RichParagraph::new(vec![Span::new("NO").bold().colored(FAIL_COLOR)]),
        Some(Answer::NotApplicable) => {
            RichParagraph::new(vec![Span::new("N/A").colored(MUTED_COLOR)])
        }
        Some(Answer::Yes) => RichParagraph::plain("YES"),
    }
}

/// `Yes`/`No` cell for boolean flags, highlighting the flagged state when `alarming`.
pub fn flag_cell(value: bool, alarming: bool) -> RichParagraph {
    let label = if value { "Yes" } else { "No" };
    if value && alarming {
        RichParagraph::new(vec![Span::new(label).bold().colored(FAIL_COLOR)])
    } else {
        RichParagraph::plain(label)
    }
}

/// Highlighted text, used for failing conditions in tables.
pub fn alert(text: impl Into<String>) -> RichParagraph {
    RichParagraph::new(vec![Span::new(text).bold().colored(FAIL_COLOR)])
}

/// Table with a header row where every cell is plain text.
pub fn text_table<const N: usize>(weights: [usize; N], header: [&str; N], rows: Vec<[String; N]>) -> Table {
    let mut table = Table::new(weights.to_vec()).with_header(header);
    for row in rows {
        table.push_row(row.into_iter().map(RichParagraph::plain).collect());
    }
    table
}

/// Bold closing row for totals.
pub fn totals_row<const N: usize>(cells: [String; N]) -> Vec<RichParagraph> {
    cells
        .into_iter()
        .map(|cell| RichParagraph::new(vec![Span::new(cell).bold()]))
        .collect()
}

/// Empty text becomes `-` so grids never show blank values.
pub fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Formats a measurement with at most `places` decimals, trimming trailing zeros.
pub fn decimal(value: f64, places: usize) -> String {
    let formatted = format!("{:.*}", places, value);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Optional measurement with a unit suffix, `-` when missing.
pub fn measurement(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) if unit.is_empty() => decimal(value, 2),
        Some(value) => format!("{} {}", decimal(value, 2), unit),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_trim_trailing_zeros() {
        assert_eq!(decimal(12.5, 2), "12.5");
        assert_eq!(decimal(12.0, 2), "12");
        assert_eq!(decimal(0.126, 2), "0.13");
        assert_eq!(measurement(Some(4.0), "in"), "4 in");
        assert_eq!(measurement(None, "in"), "-");
    }

    #[test]
    fn unanswered_items_render_blank() {
        assert!(answer_cell(None).is_blank());
        assert_eq!(
            report_pdf::richtext::plain_text(answer_cell(Some(Answer::NotApplicable)).spans()),
            "N/A"
        );
    }

    #[test]
    fn checklist_rows_match_columns() {
        let item = ChecklistItem::answered(Answer::No).with_detail("Loose coping stone");
        let table = checklist_table(&[("Coping secure", &item), ("Sealant", &ChecklistItem::default())]);
        assert_eq!(table.rows().len(), 2);
        assert!(table.first_misshapen_row().is_none());
    }

    #[test]
    fn captions_are_numbered() {
        assert_eq!(photo_caption(2, &Photo::new("", "East wall")), "Photo 2: East wall");
        assert_eq!(photo_caption(3, &Photo::new("", "  ")), "Photo 3");
    }
}
