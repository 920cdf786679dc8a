//! Error types for the inspection service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inspections::InspectionError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::print::PrintError;
use crate::store::StoreError;

/// Errors returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Inspection(#[from] InspectionError),

    #[error("Report not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Image could not be used: {0}")]
    Image(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Print(#[from] PrintError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    status: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    problems: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Inspection(InspectionError::UnknownKind(_)) | Self::NotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Inspection(InspectionError::InvalidBody { .. })
            | Self::Inspection(InspectionError::Validation(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Inspection(InspectionError::PhotoDecode { .. }) | Self::Image(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Print(PrintError::Launch(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Print(PrintError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Store(_) | Self::Render(_) | Self::Print(PrintError::Browser(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Inspection(InspectionError::UnknownKind(_)) => "UNKNOWN_KIND",
            Self::Inspection(InspectionError::InvalidBody { .. }) => "INVALID_BODY",
            Self::Inspection(InspectionError::Validation(_)) => "VALIDATION_FAILED",
            Self::Inspection(InspectionError::PhotoDecode { .. }) => "PHOTO_DECODE",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest(_) => "INVALID_REQUEST",
            Self::Image(_) => "INVALID_IMAGE",
            Self::Store(_) => "STORAGE_ERROR",
            Self::Render(_) => "RENDER_ERROR",
            Self::Print(PrintError::Launch(_)) => "PRINT_UNAVAILABLE",
            Self::Print(PrintError::Timeout(_)) => "PRINT_TIMEOUT",
            Self::Print(PrintError::Browser(_)) => "PRINT_FAILED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} ({})", self, self.code());
        }

        let problems = match &self {
            Self::Inspection(err) => err.problems().to_vec(),
            _ => Vec::new(),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            status: status.as_u16(),
            problems,
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn statuses_follow_the_error_kind() {
        let cases = [
            (ApiError::from(InspectionError::UnknownKind("x".into())), 404),
            (ApiError::NotFound, 404),
            (ApiError::from(InspectionError::Validation(vec!["a".into()])), 400),
            (
                ApiError::from(InspectionError::PhotoDecode {
                    index: 1,
                    reason: "bad".into(),
                }),
                422,
            ),
            (ApiError::Render("boom".into()), 500),
            (ApiError::from(PrintError::Launch("no chrome".into())), 503),
            (ApiError::from(PrintError::Timeout(Duration::from_secs(1))), 504),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{err}");
        }
    }
}
