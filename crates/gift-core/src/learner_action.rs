//! Actions a learner takes through the tutor's action panel.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::validate::{self, Validate};

/// Fields every submitted report carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportHeader {
    reporting_unit: String,
    location: String,
    /// Military date-time group, e.g. `151200ZMAR26`.
    #[serde(default)]
    date_time_group: Option<String>,
}

impl ReportHeader {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if the unit or location is blank.
    pub fn new(
        reporting_unit: impl Into<String>,
        location: impl Into<String>,
        date_time_group: Option<String>,
    ) -> Result<Self, CoreError> {
        let header = Self {
            reporting_unit: reporting_unit.into(),
            location: location.into(),
            date_time_group,
        };
        header.validate()?;
        Ok(header)
    }

    #[must_use]
    pub fn reporting_unit(&self) -> &str {
        &self.reporting_unit
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn date_time_group(&self) -> Option<&str> {
        self.date_time_group.as_deref()
    }
}

impl Validate for ReportHeader {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("reporting_unit", &self.reporting_unit)?;
        validate::non_blank("location", &self.location)?;
        validate::optional_non_blank("date_time_group", self.date_time_group())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExplosiveHazardSpotReport {
    header: ReportHeader,
    hazard_type: String,
    #[serde(default)]
    contact_method: Option<String>,
    #[serde(default)]
    nbc_contamination: bool,
}

impl ExplosiveHazardSpotReport {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `hazard_type` is blank.
    pub fn new(header: ReportHeader, hazard_type: impl Into<String>) -> Result<Self, CoreError> {
        let hazard_type = hazard_type.into();
        validate::non_blank("hazard_type", &hazard_type)?;
        Ok(Self {
            header,
            hazard_type,
            contact_method: None,
            nbc_contamination: false,
        })
    }

    #[must_use]
    pub fn with_contact_method(mut self, contact_method: impl Into<String>) -> Self {
        self.contact_method = Some(contact_method.into());
        self
    }

    #[must_use]
    pub const fn with_nbc_contamination(mut self, nbc_contamination: bool) -> Self {
        self.nbc_contamination = nbc_contamination;
        self
    }

    #[must_use]
    pub const fn header(&self) -> &ReportHeader {
        &self.header
    }

    #[must_use]
    pub fn hazard_type(&self) -> &str {
        &self.hazard_type
    }

    #[must_use]
    pub fn contact_method(&self) -> Option<&str> {
        self.contact_method.as_deref()
    }

    #[must_use]
    pub const fn nbc_contamination(&self) -> bool {
        self.nbc_contamination
    }
}

impl Validate for ExplosiveHazardSpotReport {
    fn validate(&self) -> Result<(), CoreError> {
        self.header.validate()?;
        validate::non_blank("hazard_type", &self.hazard_type)?;
        validate::optional_non_blank("contact_method", self.contact_method())
    }
}

/// SALUTE-style report of enemy activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SpotReport {
    header: ReportHeader,
    size: u32,
    activity: String,
}

impl SpotReport {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `size` is zero or `activity`
    /// is blank.
    pub fn new(header: ReportHeader, size: u32, activity: impl Into<String>) -> Result<Self, CoreError> {
        let report = Self {
            header,
            size,
            activity: activity.into(),
        };
        report.validate()?;
        Ok(report)
    }

    #[must_use]
    pub const fn header(&self) -> &ReportHeader {
        &self.header
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn activity(&self) -> &str {
        &self.activity
    }
}

impl Validate for SpotReport {
    fn validate(&self) -> Result<(), CoreError> {
        self.header.validate()?;
        validate::at_least_one("size", self.size)?;
        validate::non_blank("activity", &self.activity)
    }
}

/// An action the learner picked from the tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LearnerTutorAction {
    ExplosiveHazardSpotReport(ExplosiveHazardSpotReport),
    SpotReport(SpotReport),
    AssessMyLocation,
    /// Ask for help with the current situation.
    TutorMe {
        #[serde(default)]
        context: Option<String>,
    },
    /// Request that instructional strategies be applied.
    ApplyStrategy { strategy_names: Vec<String> },
}

impl LearnerTutorAction {
    /// Label shown on the tutor's action button.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::ExplosiveHazardSpotReport(_) => "Explosive Hazard Spot Report",
            Self::SpotReport(_) => "Spot Report",
            Self::AssessMyLocation => "Assess My Location",
            Self::TutorMe { .. } => "Tutor Me",
            Self::ApplyStrategy { .. } => "Apply Strategy",
        }
    }

    #[must_use]
    pub const fn is_report(&self) -> bool {
        matches!(
            self,
            Self::ExplosiveHazardSpotReport(_) | Self::SpotReport(_)
        )
    }

    #[must_use]
    pub const fn report_header(&self) -> Option<&ReportHeader> {
        match self {
            Self::ExplosiveHazardSpotReport(report) => Some(&report.header),
            Self::SpotReport(report) => Some(&report.header),
            _ => None,
        }
    }
}

impl Validate for LearnerTutorAction {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::ExplosiveHazardSpotReport(report) => report.validate(),
            Self::SpotReport(report) => report.validate(),
            Self::AssessMyLocation => Ok(()),
            Self::TutorMe { context } => validate::optional_non_blank("context", context.as_deref()),
            Self::ApplyStrategy { strategy_names } => {
                if strategy_names.is_empty() {
                    return Err(CoreError::invalid(
                        "strategy_names",
                        "at least one strategy is required",
                    ));
                }
                for name in strategy_names {
                    validate::non_blank("strategy_names", name)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for LearnerTutorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[LearnerTutorAction: {}", self.display_name())?;
        match self {
            Self::ExplosiveHazardSpotReport(report) => write!(
                f,
                ", unit = {}, location = {}, hazard = {}",
                report.header.reporting_unit, report.header.location, report.hazard_type
            )?,
            Self::SpotReport(report) => write!(
                f,
                ", unit = {}, location = {}, size = {}, activity = {}",
                report.header.reporting_unit, report.header.location, report.size, report.activity
            )?,
            Self::ApplyStrategy { strategy_names } => {
                write!(f, ", strategies = {}", strategy_names.join(", "))?;
            }
            Self::AssessMyLocation | Self::TutorMe { .. } => {}
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn header() -> ReportHeader {
        ReportHeader::new("2nd Platoon", "38SMB4484", Some("151200ZMAR26".into())).unwrap()
    }

    #[test]
    fn reports_are_reports() {
        let hazard = LearnerTutorAction::ExplosiveHazardSpotReport(
            ExplosiveHazardSpotReport::new(header(), "IED")
                .unwrap()
                .with_nbc_contamination(true),
        );
        assert!(hazard.is_report());
        assert_eq!(hazard.report_header().unwrap().reporting_unit(), "2nd Platoon");
        assert!(!LearnerTutorAction::AssessMyLocation.is_report());
        assert!(LearnerTutorAction::AssessMyLocation.report_header().is_none());
    }

    #[test]
    fn header_requires_unit_and_location() {
        assert!(ReportHeader::new("", "grid", None).is_err());
        assert!(ReportHeader::new("unit", " ", None).is_err());
    }

    #[test]
    fn spot_report_size_must_be_positive() {
        assert!(SpotReport::new(header(), 0, "digging in").is_err());
        assert!(SpotReport::new(header(), 4, "digging in").is_ok());
    }

    #[test]
    fn apply_strategy_needs_names() {
        let empty = LearnerTutorAction::ApplyStrategy {
            strategy_names: Vec::new(),
        };
        assert!(empty.validate().is_err());
        let ok = LearnerTutorAction::ApplyStrategy {
            strategy_names: vec!["Scaffold".into()],
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn serde_uses_action_tag() {
        let action = LearnerTutorAction::TutorMe {
            context: Some("lost".into()),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], "tutor_me");
        assert_eq!(json["context"], "lost");
        let recovered: LearnerTutorAction = serde_json::from_value(json).unwrap();
        assert_eq!(recovered, action);

        let json = serde_json::to_value(LearnerTutorAction::AssessMyLocation).unwrap();
        assert_eq!(json, serde_json::json!({"action": "assess_my_location"}));
    }

    #[test]
    fn display_names_the_action() {
        let report = LearnerTutorAction::SpotReport(SpotReport::new(header(), 3, "moving north").unwrap());
        let rendered = report.to_string();
        assert!(rendered.starts_with("[LearnerTutorAction: Spot Report"));
        assert!(rendered.contains("size = 3"));
    }
}
