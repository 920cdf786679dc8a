//! Request handlers, grouped by resource.

pub mod export;
pub mod health;
pub mod reports;

use std::str::FromStr;

use inspections::ReportKind;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub(crate) fn parse_kind(kind: &str) -> ApiResult<ReportKind> {
    Ok(ReportKind::from_str(kind)?)
}

/// Malformed ids cannot name a stored report, so they are reported as missing.
pub(crate) fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}
