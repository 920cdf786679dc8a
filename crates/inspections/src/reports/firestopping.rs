use report_pdf::model::{Block, FieldGrid, RichParagraph, Section, Table};
use serde::{Deserialize, Serialize};

use crate::common::{Answer, ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

/// A through-penetration or joint inspected against its listed system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Penetration {
    pub location: String,
    pub penetration_type: String,
    pub ul_system: String,
    pub rating_hours: Option<f64>,
    pub result: Option<Answer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoppingReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub penetrations: Vec<Penetration>,
    #[serde(default)]
    pub listed_system_used: ChecklistItem,
    #[serde(default)]
    pub annular_space: ChecklistItem,
    #[serde(default)]
    pub sealant_depth: ChecklistItem,
    #[serde(default)]
    pub labeling: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl FirestoppingReport {
    /// Number of penetrations that failed inspection (`NO`).
    pub fn failed_count(&self) -> usize {
        self.penetrations
            .iter()
            .filter(|penetration| penetration.result == Some(Answer::No))
            .count()
    }
}

impl ReportLayout for FirestoppingReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Firestopping
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
        let failed = self.failed_count();
        let failed_cell = if failed > 0 {
            layout::alert(failed.to_string())
        } else {
            RichParagraph::plain("0")
        };
        let summary = FieldGrid::new(2)
            .with_field("Penetrations Inspected", self.penetrations.len().to_string())
            .with_field("Failed", failed_cell);

        let mut penetrations =
            Section::new("Penetrations").with_identifier(Some("penetrations".to_string()));
        if self.penetrations.is_empty() {
            penetrations = penetrations.with_block(Block::text("No penetrations recorded."));
        } else {
            let mut table = Table::new(vec![4, 3, 3, 2, 2])
                .with_header(["Location", "Type", "UL System", "Rating", "Result"]);
            for penetration in &self.penetrations {
                table.push_row(vec![
                    RichParagraph::plain(penetration.location.as_str()),
                    RichParagraph::plain(penetration.penetration_type.as_str()),
                    RichParagraph::plain(penetration.ul_system.as_str()),
                    RichParagraph::plain(layout::measurement(penetration.rating_hours, "hr")),
                    layout::answer_cell(penetration.result),
                ]);
            }
            penetrations = penetrations.with_block(Block::Table(table));
        }

        vec![
            Section::new("Summary").with_block(Block::Fields(summary)),
            penetrations,
            layout::checklist_section(
                "Installation Checklist",
                &[
                    ("Listed system used", &self.listed_system_used),
                    ("Annular space within listing", &self.annular_space),
                    ("Sealant depth", &self.sealant_depth),
                    ("Labeling", &self.labeling),
                ],
            ),
        ]
    }
}
