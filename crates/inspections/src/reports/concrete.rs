use report_pdf::model::{Block, FieldGrid, RichParagraph, Section};
use serde::{Deserialize, Serialize};

use crate::common::{ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};

/// Batch ticket of one delivery truck.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TruckTicket {
    pub ticket_number: String,
    pub truck: String,
    pub batch_time: String,
    pub arrival_time: String,
    pub cubic_yards: f64,
}

/// Concrete placement and rebar inspection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteReport {
    pub project: ProjectInfo,
    #[serde(default)]
    pub pour_location: String,
    #[serde(default)]
    pub mix_design: String,
    #[serde(default)]
    pub specified_strength_psi: Option<u32>,
    #[serde(default)]
    pub slump_inches: Option<f64>,
    #[serde(default)]
    pub air_content_percent: Option<f64>,
    #[serde(default)]
    pub concrete_temperature_f: Option<f64>,
    #[serde(default)]
    pub cylinders_cast: Option<u32>,
    #[serde(default)]
    pub truck_tickets: Vec<TruckTicket>,
    #[serde(default)]
    pub bar_size_and_spacing: ChecklistItem,
    #[serde(default)]
    pub clear_cover: ChecklistItem,
    #[serde(default)]
    pub lap_splices: ChecklistItem,
    #[serde(default)]
    pub supports_and_chairs: ChecklistItem,
    #[serde(default)]
    pub embeds_and_sleeves: ChecklistItem,
    #[serde(default)]
    pub forms_clean: ChecklistItem,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

impl ConcreteReport {
    pub fn total_yards(&self) -> f64 {
        self.truck_tickets.iter().map(|ticket| ticket.cubic_yards).sum()
    }
}

impl ReportLayout for ConcreteReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Concrete
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
        let placement = FieldGrid::new(2)
            .with_field("Pour Location", layout::or_dash(&self.pour_location))
            .with_field("Mix Design", layout::or_dash(&self.mix_design))
            .with_field(
                "Specified Strength",
                self.specified_strength_psi
                    .map(|psi| format!("{} psi", psi))
                    .unwrap_or_else(|| "-".to_string()),
            )
            .with_field("Slump", layout::measurement(self.slump_inches, "in"))
            .with_field("Air Content", layout::measurement(self.air_content_percent, "%"))
            .with_field(
                "Concrete Temperature",
                layout::measurement(self.concrete_temperature_f, "°F"),
            )
            .with_field(
                "Cylinders Cast",
                self.cylinders_cast
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );

        let mut tickets = Section::new("Delivery Tickets").with_identifier(Some("tickets".to_string()));
        if self.truck_tickets.is_empty() {
            tickets = tickets.with_block(Block::Paragraph(RichParagraph::plain(
                "No delivery tickets recorded.",
            )));
        } else {
            let rows = self
                .truck_tickets
                .iter()
                .map(|ticket| {
                    [
                        ticket.ticket_number.clone(),
                        ticket.truck.clone(),
                        ticket.batch_time.clone(),
                        ticket.arrival_time.clone(),
                        layout::decimal(ticket.cubic_yards, 2),
                    ]
                })
                .collect();
            let mut table = layout::text_table(
                [3, 2, 2, 2, 2],
                ["Ticket", "Truck", "Batched", "Arrived", "Cubic Yards"],
                rows,
            );
            table.push_row(layout::totals_row([
                "Total".to_string(),
                String::new(),
                String::new(),
                String::new(),
                layout::decimal(self.total_yards(), 2),
            ]));
            tickets = tickets.with_block(Block::Table(table));
        }

        vec![
            Section::new("Placement")
                .with_identifier(Some("placement".to_string()))
                .with_block(Block::Fields(placement)),
            tickets,
            layout::checklist_section(
                "Reinforcing Steel",
                &[
                    ("Bar size and spacing per drawings", &self.bar_size_and_spacing),
                    ("Clear cover", &self.clear_cover),
                    ("Lap splices", &self.lap_splices),
                    ("Supports and chairs", &self.supports_and_chairs),
                    ("Embeds and sleeves", &self.embeds_and_sleeves),
                    ("Forms clean and free of debris", &self.forms_clean),
                ],
            ),
        ]
    }

    fn problems(&self) -> Vec<String> {
        self.truck_tickets
            .iter()
            .enumerate()
            .filter(|(_, ticket)| ticket.cubic_yards < 0.0)
            .map(|(index, _)| format!("truckTickets[{}] has negative cubic yards", index))
            .collect()
    }
}
