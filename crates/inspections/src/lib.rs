//! Building-inspection report types and their letterhead document layouts.
//!
//! Each of the ten report kinds is a plain serde record ([`reports`]) implementing
//! [`ReportLayout`], which projects it onto the renderer-neutral [`report_pdf::model::Document`].
//! [`Report`] wraps any of them behind a single type keyed by [`ReportKind`].

pub mod common;
pub mod error;
pub mod kind;
pub mod layout;
pub mod report;
pub mod reports;
pub mod samples;

pub use common::{Answer, ChecklistItem, Photo, ProjectInfo};
pub use error::{InspectionError, Result};
pub use kind::ReportKind;
pub use layout::ReportLayout;
pub use report::Report;
