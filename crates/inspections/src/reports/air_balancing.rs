use report_pdf::model::{Block, FieldGrid, RichParagraph, Section};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

/// Measured airflow at a single outlet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirReading {
    pub location: String,
    pub outlet_type: String,
    pub size: String,
    pub design_cfm: f64,
    pub actual_cfm: f64,
}

impl AirReading {
    /// Actual airflow as a percentage of design, `None` when no design value is set.
    pub fn percent_of_design(&self) -> Option<f64> {
        percent(self.actual_cfm, self.design_cfm)
    }
}

fn percent(actual: f64, design: f64) -> Option<f64> {
    if design > 0.0 {
        Some(actual / design * 100.0)
    } else {
        None
    }
}

fn percent_label(value: Option<f64>) -> String {
    value
        .map(|value| format!("{}%", layout::decimal(value, 1)))
        .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirBalancingReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub unit_tag: String,
    #[serde(default)]
    pub readings: Vec<AirReading>,
    #[serde(default)]
    pub dampers_adjusted: ChecklistItem,
    #[serde(default)]
    pub filters_clean: ChecklistItem,
    #[serde(default)]
    pub belts_tensioned: ChecklistItem,
    #[serde(default)]
    pub fan_rotation_correct: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl AirBalancingReport {
    pub fn total_design_cfm(&self) -> f64 {
        self.readings.iter().map(|reading| reading.design_cfm).sum()
    }

    pub fn total_actual_cfm(&self) -> f64 {
        self.readings.iter().map(|reading| reading.actual_cfm).sum()
    }

    fn readings_section(&self) -> Section {
        let rows = self
            .readings
            .iter()
            .map(|reading| {
                [
                    reading.location.clone(),
                    reading.outlet_type.clone(),
                    reading.size.clone(),
                    layout::decimal(reading.design_cfm, 0),
                    layout::decimal(reading.actual_cfm, 0),
                    percent_label(reading.percent_of_design()),
                ]
            })
            .collect();
        let mut table = layout::text_table(
            [4, 3, 2, 2, 2, 2],
            ["Location", "Outlet", "Size", "Design CFM", "Actual CFM", "% of Design"],
            rows,
        );
        if !self.readings.is_empty() {
            table.push_row(layout::totals_row([
                "Total".to_string(),
                String::new(),
                String::new(),
                layout::decimal(self.total_design_cfm(), 0),
                layout::decimal(self.total_actual_cfm(), 0),
                percent_label(percent(self.total_actual_cfm(), self.total_design_cfm())),
            ]));
        }

        let section = Section::new("Air Distribution Readings")
            .with_identifier(Some("readings".to_string()));
        if self.readings.is_empty() {
            section.with_block(Block::Paragraph(RichParagraph::plain("No readings recorded.")))
        } else {
            section.with_block(Block::Table(table))
        }
    }
}

impl ReportLayout for AirBalancingReport {
    fn kind(&self) -> ReportKind {
        ReportKind::AirBalancing
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
        let system = Section::new("System").with_block(Block::Fields(
            FieldGrid::new(2)
                .with_field("System", layout::or_dash(&self.system_name))
                .with_field("Unit Tag", layout::or_dash(&self.unit_tag)),
        ));

        vec![
            system,
            self.readings_section(),
            layout::checklist_section(
                "System Checklist",
                &[
                    ("Dampers adjusted and locked", &self.dampers_adjusted),
                    ("Filters clean", &self.filters_clean),
                    ("Belts tensioned", &self.belts_tensioned),
                    ("Fan rotation correct", &self.fan_rotation_correct),
                ],
            ),
        ]
    }

    fn problems(&self) -> Vec<String> {
        self.readings
            .iter()
            .enumerate()
            .filter(|(_, reading)| reading.design_cfm < 0.0 || reading.actual_cfm < 0.0)
            .map(|(index, _)| format!("readings[{}] has a negative airflow", index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(design: f64, actual: f64) -> AirReading {
        AirReading {
            design_cfm: design,
            actual_cfm: actual,
            ..AirReading::default()
        }
    }

    #[test]
    fn percent_of_design_is_blank_without_design() {
        assert_eq!(reading(200.0, 180.0).percent_of_design(), Some(90.0));
        assert_eq!(reading(0.0, 180.0).percent_of_design(), None);
        assert_eq!(percent_label(None), "");
        assert_eq!(percent_label(Some(104.26)), "104.3%");
    }
}
