use report_pdf::model::{Block, FieldGrid, Section};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulationReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub insulation_type: String,
    #[serde(default)]
    pub specified_r_value: Option<f64>,
    #[serde(default)]
    pub measured_thickness_inches: Option<f64>,
    #[serde(default)]
    pub vapor_retarder: ChecklistItem,
    #[serde(default)]
    pub continuity: ChecklistItem,
    #[serde(default)]
    pub fastening: ChecklistItem,
    #[serde(default)]
    pub gaps_sealed: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl ReportLayout for InsulationReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Insulation
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
        let installation = FieldGrid::new(2)
            .with_field("Area", layout::or_dash(&self.area))
            .with_field("Insulation Type", layout::or_dash(&self.insulation_type))
            .with_field(
                "Specified R-Value",
                self.specified_r_value
                    .map(|value| format!("R-{}", layout::decimal(value, 1)))
                    .unwrap_or_else(|| "-".to_string()),
            )
            .with_field(
                "Measured Thickness",
                layout::measurement(self.measured_thickness_inches, "in"),
            );

        vec![
            Section::new("Installation").with_block(Block::Fields(installation)),
            layout::checklist_section(
                "Installation Checklist",
                &[
                    ("Vapor retarder installed", &self.vapor_retarder),
                    ("Continuity maintained", &self.continuity),
                    ("Fastening per manufacturer", &self.fastening),
                    ("Gaps and seams sealed", &self.gaps_sealed),
                ],
            ),
        ]
    }
}
