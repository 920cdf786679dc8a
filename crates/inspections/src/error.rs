use thiserror::Error;

/// Errors raised while parsing, validating or laying out inspection reports.
#[derive(Debug, Error)]
pub enum InspectionError {
    #[error("Unknown report kind '{0}'")]
    UnknownKind(String),
    #[error("Invalid {kind} report body: {source}")]
    InvalidBody {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Photo {index} could not be decoded: {reason}")]
    PhotoDecode { index: usize, reason: String },
}

impl InspectionError {
    /// Problems reported by [`InspectionError::Validation`], empty for other variants.
    pub fn problems(&self) -> &[String] {
        match self {
            Self::Validation(problems) => problems,
            _ => &[],
        }
    }
}

pub type Result<T, E = InspectionError> = std::result::Result<T, E>;
