//! Enumerations shared across GIFT messages.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `as_str()` returns the serialized name; `from_name()` is the inverse and
//! reports unknown names as `CoreError::EnumerationNotFound`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Implements `Display` via `as_str()` and `FromStr` via `from_name()`.
macro_rules! name_conversions {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AssessmentLevel
// ---------------------------------------------------------------------------

/// How a learner performed against a task or concept.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentLevel {
    #[default]
    Unknown,
    BelowExpectation,
    AtExpectation,
    AboveExpectation,
}

impl AssessmentLevel {
    pub const ALL: [Self; 4] = [
        Self::Unknown,
        Self::BelowExpectation,
        Self::AtExpectation,
        Self::AboveExpectation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::BelowExpectation => "below_expectation",
            Self::AtExpectation => "at_expectation",
            Self::AboveExpectation => "above_expectation",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::BelowExpectation => "Below Expectation",
            Self::AtExpectation => "At Expectation",
            Self::AboveExpectation => "Above Expectation",
        }
    }

    /// Ordering used when rolling child grades up into a parent.
    /// `Unknown` has no rank.
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::BelowExpectation => Some(0),
            Self::AtExpectation => Some(1),
            Self::AboveExpectation => Some(2),
        }
    }

    /// Look up a level by its serialized name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::unknown_variant("AssessmentLevel", name))
    }
}

name_conversions!(AssessmentLevel);

// ---------------------------------------------------------------------------
// PerformanceNodeState
// ---------------------------------------------------------------------------

/// Lifecycle of a node in a performance assessment tree.
///
/// ```text
/// unactivated → active → deactivated → active
///                      → finished
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceNodeState {
    #[default]
    Unactivated,
    Active,
    Deactivated,
    Finished,
}

impl PerformanceNodeState {
    pub const ALL: [Self; 4] = [
        Self::Unactivated,
        Self::Active,
        Self::Deactivated,
        Self::Finished,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unactivated => "unactivated",
            Self::Active => "active",
            Self::Deactivated => "deactivated",
            Self::Finished => "finished",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Unactivated => "UNACTIVATED",
            Self::Active => "ACTIVE",
            Self::Deactivated => "DEACTIVATED",
            Self::Finished => "FINISHED",
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::unknown_variant("PerformanceNodeState", name))
    }
}

name_conversions!(PerformanceNodeState);

// ---------------------------------------------------------------------------
// DeploymentMode
// ---------------------------------------------------------------------------

/// How a GIFT instance is deployed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    #[default]
    Desktop,
    Server,
    Simple,
    Experiment,
}

impl DeploymentMode {
    pub const ALL: [Self; 4] = [Self::Desktop, Self::Server, Self::Simple, Self::Experiment];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Server => "server",
            Self::Simple => "simple",
            Self::Experiment => "experiment",
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::unknown_variant("DeploymentMode", name))
    }
}

name_conversions!(DeploymentMode);

// ---------------------------------------------------------------------------
// ModuleType
// ---------------------------------------------------------------------------

/// A GIFT runtime module that sends or receives messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    Domain,
    Tutor,
    Learner,
    Pedagogical,
    Lms,
    Ums,
    Gateway,
    Monitor,
}

impl ModuleType {
    pub const ALL: [Self; 8] = [
        Self::Domain,
        Self::Tutor,
        Self::Learner,
        Self::Pedagogical,
        Self::Lms,
        Self::Ums,
        Self::Gateway,
        Self::Monitor,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Tutor => "tutor",
            Self::Learner => "learner",
            Self::Pedagogical => "pedagogical",
            Self::Lms => "lms",
            Self::Ums => "ums",
            Self::Gateway => "gateway",
            Self::Monitor => "monitor",
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|module| module.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::unknown_variant("ModuleType", name))
    }
}

name_conversions!(ModuleType);

// ---------------------------------------------------------------------------
// UserSessionType
// ---------------------------------------------------------------------------

/// How the learner entered GIFT.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum UserSessionType {
    #[default]
    GiftUser,
    ExperimentUser,
    LtiUser,
}

impl UserSessionType {
    pub const ALL: [Self; 3] = [Self::GiftUser, Self::ExperimentUser, Self::LtiUser];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GiftUser => "gift_user",
            Self::ExperimentUser => "experiment_user",
            Self::LtiUser => "lti_user",
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::unknown_variant("UserSessionType", name))
    }
}

name_conversions!(UserSessionType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_level_serde_matches_as_str() {
        for level in AssessmentLevel::ALL {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }

    #[test]
    fn assessment_level_from_name_is_case_insensitive() {
        assert_eq!(
            AssessmentLevel::from_name("AT_EXPECTATION").unwrap(),
            AssessmentLevel::AtExpectation
        );
        assert_eq!(
            "below_expectation".parse::<AssessmentLevel>().unwrap(),
            AssessmentLevel::BelowExpectation
        );
    }

    #[test]
    fn unknown_names_are_enumeration_errors() {
        let err = AssessmentLevel::from_name("excellent").unwrap_err();
        assert!(matches!(err, CoreError::EnumerationNotFound { .. }));
        assert!(DeploymentMode::from_name("cloud").is_err());
        assert!(ModuleType::from_name("sensor").is_err());
    }

    #[test]
    fn assessment_level_rank_orders_known_levels() {
        assert!(AssessmentLevel::Unknown.rank().is_none());
        assert!(
            AssessmentLevel::BelowExpectation.rank() < AssessmentLevel::AtExpectation.rank()
        );
        assert!(
            AssessmentLevel::AtExpectation.rank() < AssessmentLevel::AboveExpectation.rank()
        );
    }

    #[test]
    fn node_state_display_names_are_upper_case() {
        for state in PerformanceNodeState::ALL {
            assert_eq!(state.display_name(), state.as_str().to_uppercase());
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(AssessmentLevel::default(), AssessmentLevel::Unknown);
        assert_eq!(
            PerformanceNodeState::default(),
            PerformanceNodeState::Unactivated
        );
        assert_eq!(DeploymentMode::default(), DeploymentMode::Desktop);
    }
}
