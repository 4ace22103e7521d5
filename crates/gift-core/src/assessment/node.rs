use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AssessmentLevel, PerformanceNodeState};
use crate::errors::CoreError;
use crate::validate::{self, Validate};

const fn default_confidence() -> f32 {
    AssessmentCore::DEFAULT_CONFIDENCE
}

const fn default_competence() -> f32 {
    AssessmentCore::DEFAULT_COMPETENCE
}

const fn default_trend() -> f32 {
    AssessmentCore::DEFAULT_TREND
}

/// Flags that freeze a value against automatic updates.
///
/// Set by an observer who has overridden the engine's judgement. Each
/// `update_*` method on [`AssessmentCore`] becomes a no-op while its flag is
/// set, unless the `_ignoring_hold` variant is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HoldFlags {
    #[serde(default)]
    pub assessment: bool,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub confidence: bool,
    #[serde(default)]
    pub competence: bool,
    #[serde(default)]
    pub trend: bool,
}

/// The judgement carried by every node of an assessment tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentCore {
    name: String,
    assessment: AssessmentLevel,
    #[serde(default)]
    explanations: BTreeSet<String>,
    #[serde(default)]
    node_state: PerformanceNodeState,
    /// Epoch milliseconds of the last assessment change.
    time: i64,
    /// Unique within one DKF.
    node_id: u32,
    /// Unique across the whole course run.
    course_node_id: Uuid,
    #[serde(default)]
    priority: Option<u32>,
    #[serde(default)]
    evaluator: Option<String>,
    #[serde(default)]
    observer_comment: Option<String>,
    #[serde(default)]
    observer_media: Option<String>,
    #[serde(default)]
    authoritative_resource: Option<String>,
    #[serde(default)]
    contains_observed_assessment_condition: bool,
    #[serde(default)]
    scenario_support_node: bool,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default = "default_competence")]
    competence: f32,
    #[serde(default = "default_trend")]
    trend: f32,
    #[serde(default)]
    assessed_team_org_entities: BTreeMap<String, AssessmentLevel>,
    #[serde(default)]
    holds: HoldFlags,
}

impl AssessmentCore {
    pub const DEFAULT_CONFIDENCE: f32 = 1.0;
    pub const MIN_CONFIDENCE: f32 = 0.0;
    pub const MAX_CONFIDENCE: f32 = 1.0;

    pub const DEFAULT_COMPETENCE: f32 = 1.0;
    pub const MIN_COMPETENCE: f32 = 0.0;
    pub const MAX_COMPETENCE: f32 = 1.0;

    pub const DEFAULT_TREND: f32 = 1.0;
    pub const MIN_TREND: f32 = -1.0;
    pub const MAX_TREND: f32 = 1.0;

    /// Create a node judgement.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `name` is blank, `time` is not
    /// positive, or `node_id` is zero.
    pub fn new(
        name: impl Into<String>,
        assessment: AssessmentLevel,
        time: i64,
        node_id: u32,
        course_node_id: Uuid,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        validate::non_blank("name", &name)?;
        validate::at_least_one("time", time)?;
        validate::at_least_one("node_id", node_id)?;

        Ok(Self {
            name,
            assessment,
            explanations: BTreeSet::new(),
            node_state: PerformanceNodeState::default(),
            time,
            node_id,
            course_node_id,
            priority: None,
            evaluator: None,
            observer_comment: None,
            observer_media: None,
            authoritative_resource: None,
            contains_observed_assessment_condition: false,
            scenario_support_node: false,
            confidence: Self::DEFAULT_CONFIDENCE,
            competence: Self::DEFAULT_COMPETENCE,
            trend: Self::DEFAULT_TREND,
            assessed_team_org_entities: BTreeMap::new(),
            holds: HoldFlags::default(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn assessment_level(&self) -> AssessmentLevel {
        self.assessment
    }

    #[must_use]
    pub const fn node_state(&self) -> PerformanceNodeState {
        self.node_state
    }

    pub const fn set_node_state(&mut self, node_state: PerformanceNodeState) {
        self.node_state = node_state;
    }

    #[must_use]
    pub const fn time(&self) -> i64 {
        self.time
    }

    #[must_use]
    pub const fn node_id(&self) -> u32 {
        self.node_id
    }

    #[must_use]
    pub const fn course_node_id(&self) -> Uuid {
        self.course_node_id
    }

    #[must_use]
    pub const fn priority(&self) -> Option<u32> {
        self.priority
    }

    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    #[must_use]
    pub const fn competence(&self) -> f32 {
        self.competence
    }

    #[must_use]
    pub const fn trend(&self) -> f32 {
        self.trend
    }

    #[must_use]
    pub const fn holds(&self) -> HoldFlags {
        self.holds
    }

    pub const fn holds_mut(&mut self) -> &mut HoldFlags {
        &mut self.holds
    }

    // -- assessment level ---------------------------------------------------

    /// Replace the assessment level unless it is on hold. Stamps the time.
    pub fn update_assessment(&mut self, assessment: AssessmentLevel) {
        if self.holds.assessment {
            tracing::trace!(node_id = self.node_id, "assessment update held");
            return;
        }
        self.apply_assessment(assessment);
    }

    pub fn update_assessment_ignoring_hold(&mut self, assessment: AssessmentLevel) {
        self.apply_assessment(assessment);
    }

    fn apply_assessment(&mut self, assessment: AssessmentLevel) {
        self.assessment = assessment;
        self.time = Utc::now().timestamp_millis().max(1);
    }

    /// Move the time stamp to when observation of this node began.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `time` is not positive.
    pub fn set_observation_started_time(&mut self, time: i64) -> Result<(), CoreError> {
        validate::at_least_one("time", time)?;
        self.time = time;
        Ok(())
    }

    // -- priority -----------------------------------------------------------

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `priority` is `Some(0)`.
    pub fn update_priority(&mut self, priority: Option<u32>) -> Result<(), CoreError> {
        if self.holds.priority {
            tracing::trace!(node_id = self.node_id, "priority update held");
            return Ok(());
        }
        self.update_priority_ignoring_hold(priority)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `priority` is `Some(0)`.
    pub fn update_priority_ignoring_hold(&mut self, priority: Option<u32>) -> Result<(), CoreError> {
        if let Some(value) = priority {
            validate::at_least_one("priority", value)?;
        }
        self.priority = priority;
        Ok(())
    }

    // -- confidence / competence / trend -------------------------------------

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `confidence` is outside
    /// [`Self::MIN_CONFIDENCE`, `Self::MAX_CONFIDENCE`].
    pub fn update_confidence(&mut self, confidence: f32) -> Result<(), CoreError> {
        if self.holds.confidence {
            tracing::trace!(node_id = self.node_id, "confidence update held");
            return Ok(());
        }
        self.update_confidence_ignoring_hold(confidence)
    }

    /// # Errors
    ///
    /// See [`Self::update_confidence`].
    pub fn update_confidence_ignoring_hold(&mut self, confidence: f32) -> Result<(), CoreError> {
        validate::within(
            "confidence",
            confidence,
            Self::MIN_CONFIDENCE,
            Self::MAX_CONFIDENCE,
        )?;
        self.confidence = confidence;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `competence` is outside
    /// [`Self::MIN_COMPETENCE`, `Self::MAX_COMPETENCE`].
    pub fn update_competence(&mut self, competence: f32) -> Result<(), CoreError> {
        if self.holds.competence {
            tracing::trace!(node_id = self.node_id, "competence update held");
            return Ok(());
        }
        self.update_competence_ignoring_hold(competence)
    }

    /// # Errors
    ///
    /// See [`Self::update_competence`].
    pub fn update_competence_ignoring_hold(&mut self, competence: f32) -> Result<(), CoreError> {
        validate::within(
            "competence",
            competence,
            Self::MIN_COMPETENCE,
            Self::MAX_COMPETENCE,
        )?;
        self.competence = competence;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `trend` is outside
    /// [`Self::MIN_TREND`, `Self::MAX_TREND`].
    pub fn update_trend(&mut self, trend: f32) -> Result<(), CoreError> {
        if self.holds.trend {
            tracing::trace!(node_id = self.node_id, "trend update held");
            return Ok(());
        }
        self.update_trend_ignoring_hold(trend)
    }

    /// # Errors
    ///
    /// See [`Self::update_trend`].
    pub fn update_trend_ignoring_hold(&mut self, trend: f32) -> Result<(), CoreError> {
        validate::within("trend", trend, Self::MIN_TREND, Self::MAX_TREND)?;
        self.trend = trend;
        Ok(())
    }

    // -- explanations -------------------------------------------------------

    #[must_use]
    pub const fn explanations(&self) -> &BTreeSet<String> {
        &self.explanations
    }

    /// Replace all explanations. Ignored while the assessment is on hold.
    pub fn set_explanations(&mut self, explanations: BTreeSet<String>) {
        if !self.holds.assessment {
            self.explanations = explanations;
        }
    }

    /// Add one explanation. Blank text, or an assessment on hold, is ignored.
    pub fn add_explanation(&mut self, explanation: impl Into<String>) {
        let explanation = explanation.into();
        if self.holds.assessment || explanation.trim().is_empty() {
            return;
        }
        self.explanations.insert(explanation);
    }

    // -- team organization entities -----------------------------------------

    #[must_use]
    pub const fn assessed_team_org_entities(&self) -> &BTreeMap<String, AssessmentLevel> {
        &self.assessed_team_org_entities
    }

    /// Record the level one team member or role achieved on this node.
    /// Blank names are ignored.
    pub fn add_assessed_team_org_entry(
        &mut self,
        team_org_name: impl Into<String>,
        assessment: AssessmentLevel,
    ) {
        let team_org_name = team_org_name.into();
        if !team_org_name.trim().is_empty() {
            self.assessed_team_org_entities
                .insert(team_org_name, assessment);
        }
    }

    pub fn add_assessed_team_org_entries<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, AssessmentLevel)>,
        S: Into<String>,
    {
        for (name, level) in entries {
            self.add_assessed_team_org_entry(name, level);
        }
    }

    // -- observer metadata --------------------------------------------------

    #[must_use]
    pub fn evaluator(&self) -> Option<&str> {
        self.evaluator.as_deref()
    }

    pub fn set_evaluator(&mut self, evaluator: Option<String>) {
        self.evaluator = evaluator;
    }

    #[must_use]
    pub fn observer_comment(&self) -> Option<&str> {
        self.observer_comment.as_deref()
    }

    pub fn set_observer_comment(&mut self, comment: Option<String>) {
        self.observer_comment = comment;
    }

    #[must_use]
    pub fn observer_media(&self) -> Option<&str> {
        self.observer_media.as_deref()
    }

    pub fn set_observer_media(&mut self, media: Option<String>) {
        self.observer_media = media;
    }

    #[must_use]
    pub fn authoritative_resource(&self) -> Option<&str> {
        self.authoritative_resource.as_deref()
    }

    pub fn set_authoritative_resource(&mut self, resource_id: Option<String>) {
        self.authoritative_resource = resource_id;
    }

    #[must_use]
    pub const fn contains_observed_assessment_condition(&self) -> bool {
        self.contains_observed_assessment_condition
    }

    pub const fn set_contains_observed_assessment_condition(&mut self, value: bool) {
        self.contains_observed_assessment_condition = value;
    }

    #[must_use]
    pub const fn is_scenario_support_node(&self) -> bool {
        self.scenario_support_node
    }

    pub const fn set_scenario_support_node(&mut self, value: bool) {
        self.scenario_support_node = value;
    }
}

impl Validate for AssessmentCore {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("name", &self.name)?;
        validate::at_least_one("time", self.time)?;
        validate::at_least_one("node_id", self.node_id)?;
        if let Some(priority) = self.priority {
            validate::at_least_one("priority", priority)?;
        }
        validate::within(
            "confidence",
            self.confidence,
            Self::MIN_CONFIDENCE,
            Self::MAX_CONFIDENCE,
        )?;
        validate::within(
            "competence",
            self.competence,
            Self::MIN_COMPETENCE,
            Self::MAX_COMPETENCE,
        )?;
        validate::within("trend", self.trend, Self::MIN_TREND, Self::MAX_TREND)
    }
}

fn eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Two judgements are equal when they say the same thing about the same
/// course node. Node id, time, priority, holds, media, resource, and node
/// state do not participate.
impl PartialEq for AssessmentCore {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.assessment == other.assessment
            && self.course_node_id == other.course_node_id
            && self.name == other.name
            && self.confidence == other.confidence
            && self.competence == other.competence
            && self.trend == other.trend
            && eq_ignore_case(self.evaluator(), other.evaluator())
            && eq_ignore_case(self.observer_comment(), other.observer_comment())
            && self.contains_observed_assessment_condition
                == other.contains_observed_assessment_condition
            && self.explanations == other.explanations
            && self.assessed_team_org_entities == other.assessed_team_org_entities
    }
}

struct OrNone<'a, T: ?Sized>(Option<&'a T>);

impl<T: fmt::Display + ?Sized> fmt::Display for OrNone<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("none"),
        }
    }
}

impl fmt::Display for AssessmentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name = {}, id = {}, course id = {}, scenarioSupport = {}, priority = {}, assessment = {}",
            self.name,
            self.node_id,
            self.course_node_id,
            self.scenario_support_node,
            OrNone(self.priority.as_ref()),
            self.assessment,
        )?;
        if !self.explanations.is_empty() {
            write!(f, ", assessmentExplanation = {:?}", self.explanations)?;
        }
        if !self.assessed_team_org_entities.is_empty() {
            write!(
                f,
                ", assessedTeamOrgEntities = {:?}",
                self.assessed_team_org_entities
            )?;
        }
        write!(
            f,
            ", nodeState = {}, confidence = {}, competence = {}, trend = {}, time = {}, evaluator = {}, holds = {:?}, observerComment = {}, observerMedia = {}, authoritativeResource = {}, contains observed assessment condition = {}",
            self.node_state.display_name(),
            self.confidence,
            self.competence,
            self.trend,
            self.time,
            OrNone(self.evaluator()),
            self.holds,
            OrNone(self.observer_comment()),
            OrNone(self.observer_media()),
            OrNone(self.authoritative_resource()),
            self.contains_observed_assessment_condition,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn sample() -> AssessmentCore {
        AssessmentCore::new(
            "Identify threats",
            AssessmentLevel::AtExpectation,
            1_700_000_000_000,
            7,
            Uuid::nil(),
        )
        .unwrap()
    }

    #[test]
    fn new_applies_defaults() {
        let core = sample();
        assert_eq!(core.confidence(), AssessmentCore::DEFAULT_CONFIDENCE);
        assert_eq!(core.competence(), AssessmentCore::DEFAULT_COMPETENCE);
        assert_eq!(core.trend(), AssessmentCore::DEFAULT_TREND);
        assert_eq!(core.priority(), None);
        assert_eq!(core.node_state(), PerformanceNodeState::Unactivated);
        assert_eq!(core.holds(), HoldFlags::default());
    }

    #[rstest]
    #[case("", 1, 1)]
    #[case("   ", 1, 1)]
    #[case("name", 0, 1)]
    #[case("name", -3, 1)]
    #[case("name", 1, 0)]
    fn new_rejects_invalid_arguments(#[case] name: &str, #[case] time: i64, #[case] node_id: u32) {
        let result = AssessmentCore::new(
            name,
            AssessmentLevel::Unknown,
            time,
            node_id,
            Uuid::nil(),
        );
        assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(1.0, true)]
    #[case(0.5, true)]
    #[case(-0.01, false)]
    #[case(1.01, false)]
    #[case(f32::NAN, false)]
    fn confidence_bounds_are_inclusive(#[case] value: f32, #[case] accepted: bool) {
        let mut core = sample();
        assert_eq!(core.update_confidence(value).is_ok(), accepted);
        assert_eq!(core.update_competence(value).is_ok(), accepted);
    }

    #[rstest]
    #[case(-1.0, true)]
    #[case(1.0, true)]
    #[case(0.0, true)]
    #[case(-1.5, false)]
    #[case(1.5, false)]
    fn trend_bounds_are_inclusive(#[case] value: f32, #[case] accepted: bool) {
        let mut core = sample();
        assert_eq!(core.update_trend(value).is_ok(), accepted);
    }

    #[test]
    fn rejected_update_keeps_previous_value() {
        let mut core = sample();
        core.update_confidence(0.25).unwrap();
        assert!(core.update_confidence(2.0).is_err());
        assert_eq!(core.confidence(), 0.25);
    }

    #[test]
    fn priority_must_be_positive_when_present() {
        let mut core = sample();
        assert!(core.update_priority(Some(0)).is_err());
        core.update_priority(Some(1)).unwrap();
        assert_eq!(core.priority(), Some(1));
        core.update_priority(None).unwrap();
        assert_eq!(core.priority(), None);
    }

    #[test]
    fn holds_suppress_automatic_updates() {
        let mut core = sample();
        *core.holds_mut() = HoldFlags {
            assessment: true,
            priority: true,
            confidence: true,
            competence: true,
            trend: true,
        };

        core.update_assessment(AssessmentLevel::BelowExpectation);
        core.update_priority(Some(3)).unwrap();
        core.update_confidence(0.1).unwrap();
        core.update_competence(0.2).unwrap();
        core.update_trend(-0.3).unwrap();
        core.add_explanation("ignored");

        assert_eq!(core.assessment_level(), AssessmentLevel::AtExpectation);
        assert_eq!(core.priority(), None);
        assert_eq!(core.confidence(), 1.0);
        assert_eq!(core.competence(), 1.0);
        assert_eq!(core.trend(), 1.0);
        assert!(core.explanations().is_empty());
    }

    #[test]
    fn held_update_skips_validation() {
        let mut core = sample();
        core.holds_mut().confidence = true;
        assert!(core.update_confidence(5.0).is_ok());
        assert_eq!(core.confidence(), 1.0);
    }

    #[test]
    fn ignoring_hold_applies_update() {
        let mut core = sample();
        core.holds_mut().assessment = true;
        core.holds_mut().trend = true;
        core.update_assessment_ignoring_hold(AssessmentLevel::AboveExpectation);
        core.update_trend_ignoring_hold(-1.0).unwrap();
        assert_eq!(core.assessment_level(), AssessmentLevel::AboveExpectation);
        assert_eq!(core.trend(), -1.0);
    }

    #[test]
    fn update_assessment_stamps_time() {
        let mut core = sample();
        let before = core.time();
        core.update_assessment(AssessmentLevel::BelowExpectation);
        assert!(core.time() > before);
    }

    #[test]
    fn blank_explanations_and_team_names_are_ignored() {
        let mut core = sample();
        core.add_explanation("  ");
        core.add_explanation("Entered room without clearing corners");
        core.add_assessed_team_org_entry("", AssessmentLevel::AtExpectation);
        core.add_assessed_team_org_entries([
            ("Alpha 1", AssessmentLevel::AtExpectation),
            ("Alpha 2", AssessmentLevel::BelowExpectation),
        ]);
        assert_eq!(core.explanations().len(), 1);
        assert_eq!(core.assessed_team_org_entities().len(), 2);
    }

    #[test]
    fn equality_ignores_bookkeeping_fields() {
        let a = sample();
        let mut b = sample();
        b.set_observation_started_time(42).unwrap();
        b.update_priority(Some(2)).unwrap();
        b.set_observer_media(Some("clip.mp4".into()));
        b.set_node_state(PerformanceNodeState::Active);
        assert_eq!(a, b);

        b.set_evaluator(Some("OC Smith".into()));
        assert_ne!(a, b);
    }

    #[test]
    fn equality_compares_evaluator_case_insensitively() {
        let mut a = sample();
        let mut b = sample();
        a.set_evaluator(Some("oc smith".into()));
        b.set_evaluator(Some("OC SMITH".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn validate_catches_out_of_range_values_from_json() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["confidence"] = serde_json::json!(1.5);
        let decoded: AssessmentCore = serde_json::from_value(json).unwrap();
        assert!(decoded.validate().is_err());
    }

    #[test]
    fn display_includes_name_and_id() {
        let rendered = sample().to_string();
        assert!(rendered.starts_with("name = Identify threats, id = 7"));
        assert!(rendered.contains("priority = none"));
        assert!(rendered.contains("nodeState = UNACTIVATED"));
    }

    #[test]
    fn display_renders_text_fields_or_none() {
        let mut core = sample();
        core.set_evaluator(Some("OC Smith".into()));
        let rendered = core.to_string();
        assert!(rendered.contains("evaluator = OC Smith"));
        assert!(rendered.contains("observerComment = none"));
    }
}
