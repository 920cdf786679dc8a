use report_pdf::model::Document;
use serde_json::Value;

use crate::common::{Photo, ProjectInfo};
use crate::error::{InspectionError, Result};
use crate::kind::ReportKind;
use crate::layout::{self, ReportLayout};
use crate::reports::{
    AirBalancingReport, ConcreteReport, DailyFieldReport, FacadeReport, FirestoppingReport,
    GarageReport, InsulationReport, ParapetReport, SpecialInspectionReport, StructuralReport,
};

/// A report of any kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    AirBalancing(AirBalancingReport),
    Concrete(ConcreteReport),
    Garage(GarageReport),
    Parapet(ParapetReport),
    Facade(FacadeReport),
    Firestopping(FirestoppingReport),
    Insulation(InsulationReport),
    Structural(StructuralReport),
    DailyField(DailyFieldReport),
    SpecialInspection(SpecialInspectionReport),
}

macro_rules! each_report {
    ($report:expr, $inner:ident => $body:expr) => {
        match $report {
            Report::AirBalancing($inner) => $body,
            Report::Concrete($inner) => $body,
            Report::Garage($inner) => $body,
            Report::Parapet($inner) => $body,
            Report::Facade($inner) => $body,
            Report::Firestopping($inner) => $body,
            Report::Insulation($inner) => $body,
            Report::Structural($inner) => $body,
            Report::DailyField($inner) => $body,
            Report::SpecialInspection($inner) => $body,
        }
    };
}

fn parse<T: serde::de::DeserializeOwned>(kind: ReportKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| InspectionError::InvalidBody {
        kind: kind.slug(),
        source,
    })
}

impl Report {
    /// Parses a JSON body as a record of the given kind.
    pub fn from_json(kind: ReportKind, value: Value) -> Result<Self> {
        Ok(match kind {
            ReportKind::AirBalancing => Report::AirBalancing(parse(kind, value)?),
            ReportKind::Concrete => Report::Concrete(parse(kind, value)?),
            ReportKind::Garage => Report::Garage(parse(kind, value)?),
            ReportKind::Parapet => Report::Parapet(parse(kind, value)?),
            ReportKind::Facade => Report::Facade(parse(kind, value)?),
            ReportKind::Firestopping => Report::Firestopping(parse(kind, value)?),
            ReportKind::Insulation => Report::Insulation(parse(kind, value)?),
            ReportKind::Structural => Report::Structural(parse(kind, value)?),
            ReportKind::DailyField => Report::DailyField(parse(kind, value)?),
            ReportKind::SpecialInspection => Report::SpecialInspection(parse(kind, value)?),
        })
    }

    /// Parses a JSON string, see [`Report::from_json`].
    pub fn from_json_str(kind: ReportKind, body: &str) -> Result<Self> {
        let value = serde_json::from_str(body).map_err(|source| InspectionError::InvalidBody {
            kind: kind.slug(),
            source,
        })?;
        Self::from_json(kind, value)
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        each_report!(self, report => serde_json::to_value(report))
    }

    pub fn layout(&self) -> &dyn ReportLayout {
        each_report!(self, report => report as &dyn ReportLayout)
    }

    pub fn kind(&self) -> ReportKind {
        self.layout().kind()
    }

    pub fn project(&self) -> &ProjectInfo {
        self.layout().project()
    }

    pub fn photos(&self) -> &[Photo] {
        self.layout().photos()
    }

    pub fn validate(&self) -> Result<()> {
        layout::validate(self.layout())
    }

    /// Builds the letterhead document, see [`layout::document`].
    pub fn document(&self, reference: Option<&str>) -> Result<Document> {
        layout::document(self.layout(), reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bodies_are_parsed_per_kind() {
        let body = json!({
            "project": {"client": "Acme", "projectName": "Tower", "inspectionDate": "2024-03-05"},
            "elevation": "North",
            "repairsRequired": true
        });
        let report = Report::from_json(ReportKind::Parapet, body).unwrap();
        assert_eq!(report.kind(), ReportKind::Parapet);
        assert_eq!(report.project().client, "Acme");
        match &report {
            Report::Parapet(parapet) => assert!(parapet.repairs_required),
            other => panic!("unexpected variant {:?}", other.kind()),
        }
    }

    #[test]
    fn missing_inspection_date_is_an_invalid_body() {
        let body = json!({"project": {"client": "Acme", "projectName": "Tower"}});
        let err = Report::from_json(ReportKind::Garage, body).unwrap_err();
        assert!(matches!(err, InspectionError::InvalidBody { kind: "garage", .. }));
    }

    #[test]
    fn blank_client_fails_validation() {
        let body = json!({
            "project": {"client": " ", "projectName": "Tower", "inspectionDate": "2024-03-05"}
        });
        let report = Report::from_json(ReportKind::Insulation, body).unwrap();
        let err = report.validate().unwrap_err();
        assert_eq!(err.problems(), ["project.client is required".to_string()]);
    }
}
