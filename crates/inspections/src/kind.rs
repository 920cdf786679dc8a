use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InspectionError;

/// The ten report types, identified on the wire by their URL slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    AirBalancing,
    Concrete,
    Garage,
    Parapet,
    Facade,
    Firestopping,
    Insulation,
    Structural,
    DailyField,
    SpecialInspection,
}

impl ReportKind {
    pub const ALL: [ReportKind; 10] = [
        ReportKind::AirBalancing,
        ReportKind::Concrete,
        ReportKind::Garage,
        ReportKind::Parapet,
        ReportKind::Facade,
        ReportKind::Firestopping,
        ReportKind::Insulation,
        ReportKind::Structural,
        ReportKind::DailyField,
        ReportKind::SpecialInspection,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::AirBalancing => "air-balancing",
            ReportKind::Concrete => "concrete",
            ReportKind::Garage => "garage",
            ReportKind::Parapet => "parapet",
            ReportKind::Facade => "facade",
            ReportKind::Firestopping => "firestopping",
            ReportKind::Insulation => "insulation",
            ReportKind::Structural => "structural",
            ReportKind::DailyField => "daily-field",
            ReportKind::SpecialInspection => "special-inspection",
        }
    }

    /// Title printed in the report banner.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::AirBalancing => "Air Balancing Report",
            ReportKind::Concrete => "Concrete & Rebar Inspection Report",
            ReportKind::Garage => "Garage Condition Inspection Report",
            ReportKind::Parapet => "Parapet Inspection Report",
            ReportKind::Facade => "Facade Inspection Report",
            ReportKind::Firestopping => "Firestopping Inspection Report",
            ReportKind::Insulation => "Insulation Inspection Report",
            ReportKind::Structural => "Structural Inspection Report",
            ReportKind::DailyField => "Daily Field Report",
            ReportKind::SpecialInspection => "Special Inspection Report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = InspectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == value)
            .ok_or_else(|| InspectionError::UnknownKind(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slugs_are_unique_and_parse_back() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.slug().parse::<ReportKind>().unwrap(), kind);
        }
        let mut slugs: Vec<_> = ReportKind::ALL.iter().map(|kind| kind.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), ReportKind::ALL.len());
    }

    #[test]
    fn serde_uses_the_slug() {
        let json = serde_json::to_string(&ReportKind::SpecialInspection).unwrap();
        assert_eq!(json, "\"special-inspection\"");
    }

    #[test]
    fn unknown_slug_is_rejected() {
        let err = "roofing".parse::<ReportKind>().unwrap_err();
        assert!(matches!(err, InspectionError::UnknownKind(slug) if slug == "roofing"));
    }

    proptest! {
        #[test]
        fn parsing_never_panics_and_only_accepts_known_slugs(value in "[a-z-]{0,24}") {
            match value.parse::<ReportKind>() {
                Ok(kind) => prop_assert_eq!(kind.slug(), value.as_str()),
                Err(InspectionError::UnknownKind(slug)) => prop_assert_eq!(slug, value),
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
