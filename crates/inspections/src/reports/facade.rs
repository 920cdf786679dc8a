use report_pdf::model::{Block, FieldGrid, RichParagraph, Section, Table};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

/// Facade condition classification, ordered from best to worst.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacadeCondition {
    #[default]
    Safe,
    SafeWithRepair,
    Unsafe,
}

impl FacadeCondition {
    pub fn label(self) -> &'static str {
        match self {
            FacadeCondition::Safe => "Safe",
            FacadeCondition::SafeWithRepair => "Safe With Repair",
            FacadeCondition::Unsafe => "Unsafe",
        }
    }

    fn cell(self) -> RichParagraph {
        match self {
            FacadeCondition::Unsafe => layout::alert(self.label()),
            other => RichParagraph::plain(other.label()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacadeElevation {
    pub name: String,
    pub material: String,
    pub condition: FacadeCondition,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacadeReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub elevations: Vec<FacadeElevation>,
    #[serde(default)]
    pub windows: ChecklistItem,
    #[serde(default)]
    pub lintels: ChecklistItem,
    #[serde(default)]
    pub balconies: ChecklistItem,
    #[serde(default)]
    pub fire_escapes: ChecklistItem,
    #[serde(default)]
    pub sealant_joints: ChecklistItem,
    #[serde(default)]
    pub appurtenances: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl FacadeReport {
    /// Worst condition across all elevations, `None` when no elevation was surveyed.
    pub fn overall_condition(&self) -> Option<FacadeCondition> {
        self.elevations
            .iter()
            .map(|elevation| elevation.condition)
            .max()
    }
}

impl ReportLayout for FacadeReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Facade
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
        let overall = self
            .overall_condition()
            .map(FacadeCondition::cell)
            .unwrap_or_else(|| RichParagraph::plain("Not assessed"));
        let summary = FieldGrid::new(2)
            .with_field("Overall Condition", overall)
            .with_field("Elevations Surveyed", self.elevations.len().to_string());

        let mut elevations = Section::new("Elevations").with_identifier(Some("elevations".to_string()));
        if self.elevations.is_empty() {
            elevations = elevations.with_block(Block::text("No elevations recorded."));
        } else {
            let mut table =
                Table::new(vec![3, 3, 3, 5]).with_header(["Elevation", "Material", "Condition", "Notes"]);
            for elevation in &self.elevations {
                table.push_row(vec![
                    RichParagraph::plain(elevation.name.as_str()),
                    RichParagraph::plain(elevation.material.as_str()),
                    elevation.condition.cell(),
                    RichParagraph::plain(elevation.notes.as_str()),
                ]);
            }
            elevations = elevations.with_block(Block::Table(table));
        }

        vec![
            Section::new("Summary").with_block(Block::Fields(summary)),
            elevations,
            layout::checklist_section(
                "Facade Checklist",
                &[
                    ("Windows", &self.windows),
                    ("Lintels", &self.lintels),
                    ("Balconies", &self.balconies),
                    ("Fire escapes", &self.fire_escapes),
                    ("Sealant joints", &self.sealant_joints),
                    ("Appurtenances", &self.appurtenances),
                ],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elevation(condition: FacadeCondition) -> FacadeElevation {
        FacadeElevation {
            condition,
            ..FacadeElevation::default()
        }
    }

    #[test]
    fn overall_condition_is_the_worst_elevation() {
        let mut report: FacadeReport = serde_json::from_value(serde_json::json!({
            "project": {
                "client": "c",
                "projectName": "p",
                "inspectionDate": "2024-04-02"
            }
        }))
        .unwrap();
        assert_eq!(report.overall_condition(), None);

        report.elevations = vec![
            elevation(FacadeCondition::Safe),
            elevation(FacadeCondition::SafeWithRepair),
        ];
        assert_eq!(report.overall_condition(), Some(FacadeCondition::SafeWithRepair));

        report.elevations.push(elevation(FacadeCondition::Unsafe));
        assert_eq!(report.overall_condition(), Some(FacadeCondition::Unsafe));
    }

    #[test]
    fn conditions_use_screaming_snake_case() {
        let parsed: FacadeCondition = serde_json::from_str("\"SAFE_WITH_REPAIR\"").unwrap();
        assert_eq!(parsed, FacadeCondition::SafeWithRepair);
    }
}
