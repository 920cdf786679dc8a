//! One record type per report kind, each with its [`ReportLayout`](crate::layout::ReportLayout).

mod air_balancing;
mod concrete;
mod daily_field;
mod facade;
mod firestopping;
mod garage;
mod insulation;
mod parapet;
mod special_inspection;
mod structural;

pub use air_balancing::{AirBalancingReport, AirReading};
pub use concrete::{ConcreteReport, TruckTicket};
pub use daily_field::{DailyFieldReport, Manpower};
pub use facade::{FacadeCondition, FacadeElevation, FacadeReport};
pub use firestopping::{FirestoppingReport, Penetration};
pub use garage::{GarageCondition, GarageObservation, GarageReport};
pub use insulation::InsulationReport;
pub use parapet::ParapetReport;
pub use special_inspection::{SpecialInspectionItem, SpecialInspectionReport};
pub use structural::{StructuralElement, StructuralReport};
