use report_pdf::model::{Block, FieldGrid, Section};
use serde::{Deserialize, Serialize};

use crate::common::{Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

/// Crew on site for one trade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manpower {
    pub trade: String,
    pub company: String,
    pub headcount: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyFieldReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub contractor: String,
    #[serde(default)]
    pub work_performed: String,
    #[serde(default)]
    pub manpower: Vec<Manpower>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub delays: String,
    #[serde(default)]
    pub visitors: String,
    #[serde(default)]
    pub safety_observations: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl DailyFieldReport {
    /// Summed as `u64` so any number of crews fits.
    pub fn total_headcount(&self) -> u64 {
        self.manpower.iter().map(|crew| u64::from(crew.headcount)).sum()
    }
}

fn text_section(title: &str, text: &str, empty: &str) -> Section {
    let text = text.trim();
    Section::new(title).with_block(Block::text(if text.is_empty() { empty } else { text }))
}

impl ReportLayout for DailyFieldReport {
    fn kind(&self) -> ReportKind {
        ReportKind::DailyField
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
        let site = FieldGrid::new(2)
            .with_field("Contractor", layout::or_dash(&self.contractor))
            .with_field("Total Headcount", self.total_headcount().to_string());

        let mut manpower = Section::new("Manpower").with_identifier(Some("manpower".to_string()));
        if self.manpower.is_empty() {
            manpower = manpower.with_block(Block::text("No crews recorded."));
        } else {
            let rows = self
                .manpower
                .iter()
                .map(|crew| [crew.trade.clone(), crew.company.clone(), crew.headcount.to_string()])
                .collect();
            let mut table = layout::text_table([3, 4, 2], ["Trade", "Company", "Headcount"], rows);
            table.push_row(layout::totals_row([
                "Total".to_string(),
                String::new(),
                self.total_headcount().to_string(),
            ]));
            manpower = manpower.with_block(Block::Table(table));
        }

        let equipment = if self.equipment.is_empty() {
            "None on site.".to_string()
        } else {
            self.equipment.join(", ")
        };

        vec![
            Section::new("Site").with_block(Block::Fields(site)),
            text_section("Work Performed", &self.work_performed, "No work recorded."),
            manpower,
            Section::new("Equipment").with_block(Block::text(equipment)),
            text_section("Delays", &self.delays, "None."),
            text_section("Visitors", &self.visitors, "None."),
            text_section("Safety Observations", &self.safety_observations, "None noted."),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headcount_is_summed_across_crews() {
        let report: DailyFieldReport = serde_json::from_value(serde_json::json!({
            "project": {"client": "c", "projectName": "p", "inspectionDate": "2024-06-11"},
            "manpower": [
                {"trade": "Ironworkers", "company": "Steelco", "headcount": 6},
                {"trade": "Laborers", "company": "GC", "headcount": 4}
            ]
        }))
        .unwrap();
        assert_eq!(report.total_headcount(), 10);
    }

    #[test]
    fn headcount_total_does_not_overflow_u32() {
        let report: DailyFieldReport = serde_json::from_value(serde_json::json!({
            "project": {"client": "c", "projectName": "p", "inspectionDate": "2024-06-11"},
            "manpower": [
                {"trade": "Laborers", "company": "GC", "headcount": 4_000_000_000u32},
                {"trade": "Laborers", "company": "Sub", "headcount": 4_000_000_000u32}
            ]
        }))
        .unwrap();
        assert_eq!(report.total_headcount(), 8_000_000_000);

        let sections = report.sections();
        assert_eq!(sections.len(), 7);
    }
}
