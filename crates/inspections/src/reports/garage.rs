use report_pdf::model::{Block, FieldGrid, RichParagraph, Section, Table};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarageCondition {
    #[default]
    Good,
    Fair,
    Poor,
}

impl GarageCondition {
    pub fn label(self) -> &'static str {
        match self {
            GarageCondition::Good => "Good",
            GarageCondition::Fair => "Fair",
            GarageCondition::Poor => "Poor",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GarageObservation {
    pub location: String,
    pub element: String,
    pub condition: GarageCondition,
    pub notes: String,
}

/// Parking structure condition survey for one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub observations: Vec<GarageObservation>,
    #[serde(default)]
    pub cracking: ChecklistItem,
    #[serde(default)]
    pub spalling: ChecklistItem,
    #[serde(default)]
    pub exposed_reinforcement: ChecklistItem,
    #[serde(default)]
    pub ponding: ChecklistItem,
    #[serde(default)]
    pub expansion_joints: ChecklistItem,
    #[serde(default)]
    pub traffic_membrane: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl GarageReport {
    pub fn count(&self, condition: GarageCondition) -> usize {
        self.observations
            .iter()
            .filter(|observation| observation.condition == condition)
            .count()
    }
}

impl ReportLayout for GarageReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Garage
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
        let summary = FieldGrid::new(2)
            .with_field("Level", layout::or_dash(&self.level))
            .with_field("Observations", self.observations.len().to_string())
            .with_field("Good", self.count(GarageCondition::Good).to_string())
            .with_field("Fair", self.count(GarageCondition::Fair).to_string())
            .with_field("Poor", self.count(GarageCondition::Poor).to_string());

        let mut observations = Section::new("Observations").with_identifier(Some("observations".to_string()));
        if self.observations.is_empty() {
            observations =
                observations.with_block(Block::Paragraph(RichParagraph::plain("No observations recorded.")));
        } else {
            let mut table = Table::new(vec![3, 3, 2, 5]).with_header(["Location", "Element", "Condition", "Notes"]);
            for observation in &self.observations {
                let condition = match observation.condition {
                    GarageCondition::Poor => layout::alert(observation.condition.label()),
                    other => RichParagraph::plain(other.label()),
                };
                table.push_row(vec![
                    RichParagraph::plain(observation.location.as_str()),
                    RichParagraph::plain(observation.element.as_str()),
                    condition,
                    RichParagraph::plain(observation.notes.as_str()),
                ]);
            }
            observations = observations.with_block(Block::Table(table));
        }

        vec![
            Section::new("Summary").with_block(Block::Fields(summary)),
            observations,
            layout::checklist_section(
                "Condition Checklist",
                &[
                    ("Cracking", &self.cracking),
                    ("Spalling", &self.spalling),
                    ("Exposed reinforcement", &self.exposed_reinforcement),
                    ("Ponding", &self.ponding),
                    ("Expansion joints", &self.expansion_joints),
                    ("Traffic membrane", &self.traffic_membrane),
                ],
            ),
        ]
    }
}
