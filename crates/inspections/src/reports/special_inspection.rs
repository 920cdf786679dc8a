use report_pdf::model::{Block, FieldGrid, RichParagraph, Section, Table};
use serde::{Deserialize, Serialize};

use crate::common::{Answer, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialInspectionItem {
    pub description: String,
    pub drawing_reference: String,
    pub result: Option<Answer>,
}

/// Code-required special inspection covering one or more scopes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialInspectionReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub code_reference: String,
    #[serde(default)]
    pub soils: bool,
    #[serde(default)]
    pub concrete: bool,
    #[serde(default)]
    pub masonry: bool,
    #[serde(default)]
    pub structural_steel: bool,
    #[serde(default)]
    pub wood: bool,
    #[serde(default)]
    pub fireproofing: bool,
    #[serde(default)]
    pub items: Vec<SpecialInspectionItem>,
    #[serde(default)]
    pub nonconformance: bool,
    #[serde(default)]
    pub nonconformance_description: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl SpecialInspectionReport {
    /// Names of the scopes marked for this inspection.
    pub fn scopes(&self) -> Vec<&'static str> {
        [
            (self.soils, "Soils"),
            (self.concrete, "Concrete"),
            (self.masonry, "Masonry"),
            (self.structural_steel, "Structural Steel"),
            (self.wood, "Wood"),
            (self.fireproofing, "Fireproofing"),
        ]
        .into_iter()
        .filter_map(|(selected, name)| selected.then_some(name))
        .collect()
    }
}

impl ReportLayout for SpecialInspectionReport {
    fn kind(&self) -> ReportKind {
        ReportKind::SpecialInspection
    }

    fn project(&self) -> &ProjectInfo {
        &self.project
    }

    fn remarks(&self) -> &str {
        &self.remarks
    }

    fn photos(&self) -> &[Photo] {
        &self.photos
    }

    fn sections(&self) -> Vec<Section> {
        let scopes = self.scopes();
        let scope = FieldGrid::new(1)
            .with_field("Code Reference", layout::or_dash(&self.code_reference))
            .with_field(
                "Scope",
                if scopes.is_empty() {
                    "-".to_string()
                } else {
                    scopes.join(", ")
                },
            );

        let mut items = Section::new("Inspection Items").with_identifier(Some("items".to_string()));
        if self.items.is_empty() {
            items = items.with_block(Block::text("No items recorded."));
        } else {
            let mut table =
                Table::new(vec![6, 3, 2]).with_header(["Description", "Drawing Ref.", "Result"]);
            for item in &self.items {
                table.push_row(vec![
                    RichParagraph::plain(item.description.as_str()),
                    RichParagraph::plain(item.drawing_reference.as_str()),
                    layout::answer_cell(item.result),
                ]);
            }
            items = items.with_block(Block::Table(table));
        }

        let mut nonconformance = Section::new("Nonconformance").with_block(Block::Fields(
            FieldGrid::new(1).with_field(
                "Nonconforming Work",
                layout::flag_cell(self.nonconformance, true),
            ),
        ));
        if self.nonconformance {
            nonconformance =
                nonconformance.with_block(Block::text(self.nonconformance_description.trim()));
        }

        vec![
            Section::new("Scope").with_block(Block::Fields(scope)),
            items,
            nonconformance,
        ]
    }

    fn problems(&self) -> Vec<String> {
        if self.nonconformance && self.nonconformance_description.trim().is_empty() {
            vec!["nonconformanceDescription is required when nonconformance is reported".to_string()]
        } else {
            Vec::new()
        }
    }
}
