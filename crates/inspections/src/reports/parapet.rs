use report_pdf::model::{Block, FieldGrid, Section};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParapetReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub elevation: String,
    #[serde(default)]
    pub height_inches: Option<f64>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub coping_secure: ChecklistItem,
    #[serde(default)]
    pub flashing_intact: ChecklistItem,
    #[serde(default)]
    pub mortar_joints: ChecklistItem,
    #[serde(default)]
    pub cracking_absent: ChecklistItem,
    #[serde(default)]
    pub anchorage: ChecklistItem,
    #[serde(default)]
    pub sealant: ChecklistItem,
    #[serde(default)]
    pub repairs_required: bool,
    #[serde(default)]
    pub safety_hazard: bool,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl ReportLayout for ParapetReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Parapet
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
        let parapet = FieldGrid::new(2)
            .with_field("Elevation", layout::or_dash(&self.elevation))
            .with_field("Height", layout::measurement(self.height_inches, "in"))
            .with_field("Material", layout::or_dash(&self.material))
            .with_field("Repairs Required", layout::flag_cell(self.repairs_required, true))
            .with_field("Safety Hazard", layout::flag_cell(self.safety_hazard, true));

        vec![
            Section::new("Parapet").with_block(Block::Fields(parapet)),
            layout::checklist_section(
                "Condition Checklist",
                &[
                    ("Coping secure", &self.coping_secure),
                    ("Flashing intact", &self.flashing_intact),
                    ("Mortar joints sound", &self.mortar_joints),
                    ("Free of cracking", &self.cracking_absent),
                    ("Anchorage adequate", &self.anchorage),
                    ("Sealant intact", &self.sealant),
                ],
            ),
        ]
    }
}
