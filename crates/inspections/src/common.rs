//! Fields shared by every report type.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InspectionError;

/// Project metadata printed at the top of every report.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub client: String,
    pub project_name: String,
    #[serde(default)]
    pub project_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit_number: Option<String>,
    #[serde(default)]
    pub inspector: String,
    pub inspection_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
}

impl ProjectInfo {
    /// Required-field problems, empty when the project block is complete.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.client.trim().is_empty() {
            problems.push("project.client is required".to_string());
        }
        if self.project_name.trim().is_empty() {
            problems.push("project.projectName is required".to_string());
        }
        problems
    }
}

/// Tri-state checklist answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Answer {
    pub fn label(self) -> &'static str {
        match self {
            Answer::Yes => "YES",
            Answer::No => "NO",
            Answer::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A checklist answer with an optional note.  `answer` is `None` until the inspector picks one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default)]
    pub answer: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ChecklistItem {
    pub fn answered(answer: Answer) -> Self {
        Self {
            answer: Some(answer),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A site photo: base64 image payload plus caption.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Bare base64 or a `data:<mime>;base64,<payload>` URL.
    pub image: String,
    #[serde(default)]
    pub caption: String,
}

impl Photo {
    pub fn new(image: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            caption: caption.into(),
        }
    }

    /// Decodes the image payload.  `index` is the 1-based photo number used in errors.
    pub fn decode(&self, index: usize) -> Result<Vec<u8>, InspectionError> {
        let payload = match self.image.strip_prefix("data:") {
            Some(url) => {
                let (header, data) = url.split_once(',').ok_or_else(|| InspectionError::PhotoDecode {
                    index,
                    reason: "data URL has no payload".to_string(),
                })?;
                if !header.ends_with(";base64") {
                    return Err(InspectionError::PhotoDecode {
                        index,
                        reason: format!("data URL '{}' is not base64 encoded", header),
                    });
                }
                data
            }
            None => self.image.as_str(),
        };

        let compact: String = payload.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();
        if compact.is_empty() {
            return Err(InspectionError::PhotoDecode {
                index,
                reason: "image payload is empty".to_string(),
            });
        }

        STANDARD
            .decode(&compact)
            .or_else(|_| STANDARD_NO_PAD.decode(compact.trim_end_matches('=')))
            .map_err(|err| InspectionError::PhotoDecode {
                index,
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_use_wire_labels() {
        assert_eq!(serde_json::to_string(&Answer::NotApplicable).unwrap(), "\"N/A\"");
        let parsed: Answer = serde_json::from_str("\"YES\"").unwrap();
        assert_eq!(parsed, Answer::Yes);
        assert!(serde_json::from_str::<Answer>("\"yes\"").is_err());
    }

    #[test]
    fn unanswered_item_deserializes_from_null() {
        let item: ChecklistItem = serde_json::from_str(r#"{"answer": null}"#).unwrap();
        assert_eq!(item, ChecklistItem::default());
    }

    #[test]
    fn photo_accepts_data_urls_and_bare_base64() {
        let bare = Photo::new(STANDARD.encode(b"abc"), "");
        assert_eq!(bare.decode(1).unwrap(), b"abc");

        let url = Photo::new(format!("data:image/png;base64,{}", STANDARD.encode(b"xyz")), "");
        assert_eq!(url.decode(1).unwrap(), b"xyz");
    }

    #[test]
    fn photo_decode_errors_carry_the_index() {
        let broken = Photo::new("data:image/png;base64,@@@", "");
        match broken.decode(3) {
            Err(InspectionError::PhotoDecode { index, .. }) => assert_eq!(index, 3),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(Photo::new("", "").decode(1).is_err());
    }

    #[test]
    fn project_requires_client_and_name() {
        let project = ProjectInfo {
            client: "  ".to_string(),
            inspection_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ..ProjectInfo::default()
        };
        assert_eq!(project.problems().len(), 2);
    }
}
