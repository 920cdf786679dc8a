use report_pdf::model::{Block, RichParagraph, Section, Table};
use serde::{Deserialize, Serialize};

use crate::common::{Answer, ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralElement {
    pub grid_line: String,
    pub member: String,
    pub observation: String,
    pub compliant: Option<Answer>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub elements: Vec<StructuralElement>,
    #[serde(default)]
    pub bolted_connections: ChecklistItem,
    #[serde(default)]
    pub welded_connections: ChecklistItem,
    #[serde(default)]
    pub bracing: ChecklistItem,
    #[serde(default)]
    pub shoring: ChecklistItem,
    #[serde(default)]
    pub deck_attachment: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl ReportLayout for StructuralReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Structural
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
        let mut elements = Section::new("Members Observed").with_identifier(Some("members".to_string()));
        if self.elements.is_empty() {
            elements = elements.with_block(Block::text("No members recorded."));
        } else {
            let mut table = Table::new(vec![2, 3, 6, 2])
                .with_header(["Grid Line", "Member", "Observation", "Compliant"]);
            for element in &self.elements {
                table.push_row(vec![
                    RichParagraph::plain(element.grid_line.as_str()),
                    RichParagraph::plain(element.member.as_str()),
                    RichParagraph::plain(element.observation.as_str()),
                    layout::answer_cell(element.compliant),
                ]);
            }
            elements = elements.with_block(Block::Table(table));
        }

        vec![
            elements,
            layout::checklist_section(
                "Connections and Framing",
                &[
                    ("Bolted connections", &self.bolted_connections),
                    ("Welded connections", &self.welded_connections),
                    ("Bracing", &self.bracing),
                    ("Shoring", &self.shoring),
                    ("Deck attachment", &self.deck_attachment),
                ],
            ),
        ]
    }
}
