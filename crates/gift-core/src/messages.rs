//! The message envelope exchanged between GIFT modules.
//!
//! A message on the wire is a flat JSON object: envelope fields plus a `type`
//! naming the payload and a `payload` holding it.
//!
//! ```json
//! {"v": 1, "sequence": 7, "time_stamp": 1700000000000,
//!  "source": "domain", "destination": "tutor",
//!  "type": "DisplayFeedbackTutorRequest", "payload": {"text": "Good"}}
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assessment::PerformanceAssessment;
use crate::branch::BranchPathHistory;
use crate::enums::ModuleType;
use crate::errors::CoreError;
use crate::learner_action::LearnerTutorAction;
use crate::lifecycle::{
    CloseDomainSessionRequest, InitializeDomainSessionRequest, InitializeLessonRequest,
    StartDomainSession,
};
use crate::lms::{LmsCourseRecords, LmsDataRequest};
use crate::session::{DomainSession, UserSession};
use crate::tutor::{
    DisplayAarTutorRequest, DisplayChatWindowRequest, DisplayChatWindowUpdateRequest,
    DisplayFeedbackTutorRequest, DisplayGuidanceTutorRequest, DisplaySurveyTutorRequest,
};
use crate::validate::Validate;

/// Envelope format version written by this crate.
pub const MESSAGE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// Names of the message types this crate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    PerformanceAssessment,
    LmsDataRequest,
    LmsDataReply,
    BranchPathHistoryUpdate,
    BranchPathHistoryRequest,
    BranchPathHistoryReply,
    DisplayChatWindowRequest,
    DisplayChatWindowUpdateRequest,
    DisplayFeedbackTutorRequest,
    DisplayGuidanceTutorRequest,
    DisplayAarTutorRequest,
    DisplaySurveyTutorRequest,
    InitializeDomainSessionRequest,
    InitializeLessonRequest,
    CloseDomainSessionRequest,
    StartDomainSession,
    LearnerTutorAction,
}

impl MessageType {
    pub const ALL: [Self; 17] = [
        Self::PerformanceAssessment,
        Self::LmsDataRequest,
        Self::LmsDataReply,
        Self::BranchPathHistoryUpdate,
        Self::BranchPathHistoryRequest,
        Self::BranchPathHistoryReply,
        Self::DisplayChatWindowRequest,
        Self::DisplayChatWindowUpdateRequest,
        Self::DisplayFeedbackTutorRequest,
        Self::DisplayGuidanceTutorRequest,
        Self::DisplayAarTutorRequest,
        Self::DisplaySurveyTutorRequest,
        Self::InitializeDomainSessionRequest,
        Self::InitializeLessonRequest,
        Self::CloseDomainSessionRequest,
        Self::StartDomainSession,
        Self::LearnerTutorAction,
    ];

    /// The name used in the `type` field of a message.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerformanceAssessment => "PerformanceAssessment",
            Self::LmsDataRequest => "LMSDataRequest",
            Self::LmsDataReply => "LMSDataReply",
            Self::BranchPathHistoryUpdate => "BranchPathHistoryUpdate",
            Self::BranchPathHistoryRequest => "BranchPathHistoryRequest",
            Self::BranchPathHistoryReply => "BranchPathHistoryReply",
            Self::DisplayChatWindowRequest => "DisplayChatWindowRequest",
            Self::DisplayChatWindowUpdateRequest => "DisplayChatWindowUpdateRequest",
            Self::DisplayFeedbackTutorRequest => "DisplayFeedbackTutorRequest",
            Self::DisplayGuidanceTutorRequest => "DisplayGuidanceTutorRequest",
            Self::DisplayAarTutorRequest => "DisplayAARTutorRequest",
            Self::DisplaySurveyTutorRequest => "DisplaySurveyTutorRequest",
            Self::InitializeDomainSessionRequest => "InitializeDomainSessionRequest",
            Self::InitializeLessonRequest => "InitializeLessonRequest",
            Self::CloseDomainSessionRequest => "CloseDomainSessionRequest",
            Self::StartDomainSession => "StartDomainSession",
            Self::LearnerTutorAction => "LearnerTutorAction",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PerformanceAssessment => "Performance assessment of the learner's tasks",
            Self::LmsDataRequest => "Request for a learner's LMS history",
            Self::LmsDataReply => "A learner's LMS course records",
            Self::BranchPathHistoryUpdate => "Update branch path counters",
            Self::BranchPathHistoryRequest => "Request branch path counters",
            Self::BranchPathHistoryReply => "Branch path counters",
            Self::DisplayChatWindowRequest => "Open a chat window in the tutor",
            Self::DisplayChatWindowUpdateRequest => "Add an entry to a tutor chat window",
            Self::DisplayFeedbackTutorRequest => "Display feedback in the tutor",
            Self::DisplayGuidanceTutorRequest => "Display guidance in the tutor",
            Self::DisplayAarTutorRequest => "Display the after action review",
            Self::DisplaySurveyTutorRequest => "Display a survey in the tutor",
            Self::InitializeDomainSessionRequest => "Initialize a domain session",
            Self::InitializeLessonRequest => "Initialize a lesson",
            Self::CloseDomainSessionRequest => "Close a domain session",
            Self::StartDomainSession => "A domain session has started",
            Self::LearnerTutorAction => "An action the learner took in the tutor",
        }
    }

    /// Look up a type by its message name. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EnumerationNotFound` for unknown names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| CoreError::unknown_variant("MessageType", name))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// ---------------------------------------------------------------------------
// MessagePayload
// ---------------------------------------------------------------------------

/// Every payload a message can carry, tagged by its message type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "payload")]
pub enum MessagePayload {
    PerformanceAssessment(PerformanceAssessment),
    #[serde(rename = "LMSDataRequest")]
    LmsDataRequest(LmsDataRequest),
    #[serde(rename = "LMSDataReply")]
    LmsDataReply(LmsCourseRecords),
    BranchPathHistoryUpdate(BranchPathHistory),
    BranchPathHistoryRequest(Vec<BranchPathHistory>),
    BranchPathHistoryReply(Vec<BranchPathHistory>),
    DisplayChatWindowRequest(DisplayChatWindowRequest),
    DisplayChatWindowUpdateRequest(DisplayChatWindowUpdateRequest),
    DisplayFeedbackTutorRequest(DisplayFeedbackTutorRequest),
    DisplayGuidanceTutorRequest(DisplayGuidanceTutorRequest),
    #[serde(rename = "DisplayAARTutorRequest")]
    DisplayAarTutorRequest(DisplayAarTutorRequest),
    DisplaySurveyTutorRequest(DisplaySurveyTutorRequest),
    InitializeDomainSessionRequest(InitializeDomainSessionRequest),
    InitializeLessonRequest(InitializeLessonRequest),
    CloseDomainSessionRequest(CloseDomainSessionRequest),
    StartDomainSession(StartDomainSession),
    LearnerTutorAction(LearnerTutorAction),
}

impl MessagePayload {
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::PerformanceAssessment(_) => MessageType::PerformanceAssessment,
            Self::LmsDataRequest(_) => MessageType::LmsDataRequest,
            Self::LmsDataReply(_) => MessageType::LmsDataReply,
            Self::BranchPathHistoryUpdate(_) => MessageType::BranchPathHistoryUpdate,
            Self::BranchPathHistoryRequest(_) => MessageType::BranchPathHistoryRequest,
            Self::BranchPathHistoryReply(_) => MessageType::BranchPathHistoryReply,
            Self::DisplayChatWindowRequest(_) => MessageType::DisplayChatWindowRequest,
            Self::DisplayChatWindowUpdateRequest(_) => MessageType::DisplayChatWindowUpdateRequest,
            Self::DisplayFeedbackTutorRequest(_) => MessageType::DisplayFeedbackTutorRequest,
            Self::DisplayGuidanceTutorRequest(_) => MessageType::DisplayGuidanceTutorRequest,
            Self::DisplayAarTutorRequest(_) => MessageType::DisplayAarTutorRequest,
            Self::DisplaySurveyTutorRequest(_) => MessageType::DisplaySurveyTutorRequest,
            Self::InitializeDomainSessionRequest(_) => MessageType::InitializeDomainSessionRequest,
            Self::InitializeLessonRequest(_) => MessageType::InitializeLessonRequest,
            Self::CloseDomainSessionRequest(_) => MessageType::CloseDomainSessionRequest,
            Self::StartDomainSession(_) => MessageType::StartDomainSession,
            Self::LearnerTutorAction(_) => MessageType::LearnerTutorAction,
        }
    }
}

impl Validate for MessagePayload {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::PerformanceAssessment(p) => p.validate(),
            Self::LmsDataRequest(p) => p.validate(),
            Self::LmsDataReply(p) => p.validate(),
            Self::BranchPathHistoryUpdate(p) => p.validate(),
            Self::BranchPathHistoryRequest(p) | Self::BranchPathHistoryReply(p) => p.validate(),
            Self::DisplayChatWindowRequest(p) => p.validate(),
            Self::DisplayChatWindowUpdateRequest(p) => p.validate(),
            Self::DisplayFeedbackTutorRequest(p) => p.validate(),
            Self::DisplayGuidanceTutorRequest(p) => p.validate(),
            Self::DisplayAarTutorRequest(p) => p.validate(),
            Self::DisplaySurveyTutorRequest(p) => p.validate(),
            Self::InitializeDomainSessionRequest(p) => p.validate(),
            Self::InitializeLessonRequest(p) => p.validate(),
            Self::CloseDomainSessionRequest(p) => p.validate(),
            Self::StartDomainSession(p) => p.validate(),
            Self::LearnerTutorAction(p) => p.validate(),
        }
    }
}

/// `From` for every payload whose type maps to exactly one variant.
macro_rules! payload_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for MessagePayload {
                fn from(payload: $ty) -> Self {
                    Self::$variant(payload)
                }
            }
        )*
    };
}

payload_from!(
    PerformanceAssessment(PerformanceAssessment),
    LmsDataRequest(LmsDataRequest),
    LmsDataReply(LmsCourseRecords),
    BranchPathHistoryUpdate(BranchPathHistory),
    DisplayChatWindowRequest(DisplayChatWindowRequest),
    DisplayChatWindowUpdateRequest(DisplayChatWindowUpdateRequest),
    DisplayFeedbackTutorRequest(DisplayFeedbackTutorRequest),
    DisplayGuidanceTutorRequest(DisplayGuidanceTutorRequest),
    DisplayAarTutorRequest(DisplayAarTutorRequest),
    DisplaySurveyTutorRequest(DisplaySurveyTutorRequest),
    InitializeDomainSessionRequest(InitializeDomainSessionRequest),
    InitializeLessonRequest(InitializeLessonRequest),
    CloseDomainSessionRequest(CloseDomainSessionRequest),
    StartDomainSession(StartDomainSession),
    LearnerTutorAction(LearnerTutorAction),
);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

const fn default_version() -> u32 {
    MESSAGE_VERSION
}

/// A payload plus its routing and session metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Message {
    #[serde(default = "default_version")]
    v: u32,
    sequence: u64,
    /// Epoch milliseconds at creation.
    time_stamp: i64,
    source: ModuleType,
    destination: ModuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_session: Option<UserSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain_session: Option<DomainSession>,
    #[serde(flatten)]
    payload: MessagePayload,
}

impl Message {
    /// Build a message stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns the payload's validation error.
    pub fn new(
        sequence: u64,
        source: ModuleType,
        destination: ModuleType,
        payload: impl Into<MessagePayload>,
    ) -> Result<Self, CoreError> {
        let payload = payload.into();
        payload.validate()?;
        Ok(Self {
            v: MESSAGE_VERSION,
            sequence,
            time_stamp: Utc::now().timestamp_millis(),
            source,
            destination,
            user_session: None,
            domain_session: None,
            payload,
        })
    }

    /// # Errors
    ///
    /// Returns the session's validation error.
    pub fn with_user_session(mut self, user_session: UserSession) -> Result<Self, CoreError> {
        self.user_session = Some(user_session);
        self.validate_sessions()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns the session's validation error.
    pub fn with_domain_session(mut self, domain_session: DomainSession) -> Result<Self, CoreError> {
        self.domain_session = Some(domain_session);
        self.validate_sessions()?;
        Ok(self)
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.v
    }

    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub const fn time_stamp(&self) -> i64 {
        self.time_stamp
    }

    #[must_use]
    pub const fn source(&self) -> ModuleType {
        self.source
    }

    #[must_use]
    pub const fn destination(&self) -> ModuleType {
        self.destination
    }

    #[must_use]
    pub const fn user_session(&self) -> Option<&UserSession> {
        self.user_session.as_ref()
    }

    #[must_use]
    pub const fn domain_session(&self) -> Option<&DomainSession> {
        self.domain_session.as_ref()
    }

    #[must_use]
    pub const fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> MessagePayload {
        self.payload
    }

    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    fn validate_sessions(&self) -> Result<(), CoreError> {
        self.user_session.validate()?;
        self.domain_session.validate()?;
        match (&self.user_session, &self.domain_session) {
            (Some(user), Some(domain)) if user.user_id() != domain.user_id() => {
                Err(CoreError::invalid(
                    "domain_session",
                    format!(
                        "belongs to user {} but the message is for user {}",
                        domain.user_id(),
                        user.user_id()
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns `CoreError::Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate a message.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Serialization` for malformed JSON or an unknown
    /// `type`, and a validation error for bad contents.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let message: Self = serde_json::from_str(json)?;
        message.validate()?;
        tracing::debug!(
            message_type = %message.message_type(),
            sequence = message.sequence,
            source = %message.source,
            destination = %message.destination,
            "decoded message"
        );
        Ok(message)
    }
}

impl Validate for Message {
    fn validate(&self) -> Result<(), CoreError> {
        if self.v != MESSAGE_VERSION {
            return Err(CoreError::invalid(
                "v",
                format!("unsupported message version {}", self.v),
            ));
        }
        self.validate_sessions()?;
        self.payload.validate()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Message: type = {}, seq = {}, time = {}, {} -> {}",
            self.message_type(),
            self.sequence,
            self.time_stamp,
            self.source,
            self.destination
        )?;
        if let Some(session) = &self.domain_session {
            write!(f, ", {session}")?;
        } else if let Some(session) = &self.user_session {
            write!(f, ", {session}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::assessment::fixtures::task_tree;

    fn feedback_message() -> Message {
        Message::new(
            7,
            ModuleType::Pedagogical,
            ModuleType::Tutor,
            DisplayFeedbackTutorRequest::new("Good").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn message_type_names_round_trip() {
        for kind in MessageType::ALL {
            assert_eq!(MessageType::from_name(kind.as_str()).unwrap(), kind);
            assert!(!kind.description().is_empty());
        }
        assert!(matches!(
            MessageType::from_name("lmsdatarequest"),
            Err(CoreError::EnumerationNotFound { .. })
        ));
    }

    #[test]
    fn payload_tag_matches_message_type_name() {
        let payloads: Vec<MessagePayload> = vec![
            LmsDataRequest::new("learner").unwrap().into(),
            LmsCourseRecords::new().into(),
            MessagePayload::BranchPathHistoryRequest(Vec::new()),
            DisplayAarTutorRequest::default().into(),
            CloseDomainSessionRequest::default().into(),
            LearnerTutorAction::AssessMyLocation.into(),
        ];
        for payload in payloads {
            let json = serde_json::to_value(&payload).unwrap();
            assert_eq!(json["type"], payload.message_type().as_str());
        }
    }

    #[test]
    fn envelope_is_flat() {
        let json: serde_json::Value =
            serde_json::from_str(&feedback_message().to_json().unwrap()).unwrap();
        assert_eq!(json["v"], 1);
        assert_eq!(json["sequence"], 7);
        assert_eq!(json["source"], "pedagogical");
        assert_eq!(json["type"], "DisplayFeedbackTutorRequest");
        assert_eq!(json["payload"]["text"], "Good");
        assert!(json.get("user_session").is_none());
    }

    #[test]
    fn json_roundtrip() {
        let user = UserSession::new(3).unwrap();
        let domain = DomainSession::new(user.clone(), 9, "runtime", "source").unwrap();
        let assessment = PerformanceAssessment::new(vec![task_tree()]).unwrap();
        let message = Message::new(1, ModuleType::Domain, ModuleType::Learner, assessment)
            .unwrap()
            .with_user_session(user)
            .unwrap()
            .with_domain_session(domain)
            .unwrap();

        let recovered = Message::from_json(&message.to_json().unwrap()).unwrap();
        assert_eq!(recovered, message);
        assert_eq!(recovered.message_type(), MessageType::PerformanceAssessment);
    }

    #[test]
    fn version_defaults_to_one() {
        let json = serde_json::json!({
            "sequence": 1,
            "time_stamp": 0,
            "source": "domain",
            "destination": "tutor",
            "type": "InitializeLessonRequest",
            "payload": {"content_reference": "scenario.xml"},
        });
        let message = Message::from_json(&json.to_string()).unwrap();
        assert_eq!(message.version(), MESSAGE_VERSION);
    }

    #[test]
    fn decode_validates_payload() {
        let json = serde_json::json!({
            "sequence": 1,
            "time_stamp": 0,
            "source": "domain",
            "destination": "tutor",
            "type": "InitializeLessonRequest",
            "payload": {"content_reference": "  "},
        });
        assert!(matches!(
            Message::from_json(&json.to_string()),
            Err(CoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn unknown_type_is_a_serialization_error() {
        let json = serde_json::json!({
            "sequence": 1,
            "time_stamp": 0,
            "source": "domain",
            "destination": "tutor",
            "type": "Teleport",
            "payload": {},
        });
        assert!(matches!(
            Message::from_json(&json.to_string()),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut json: serde_json::Value =
            serde_json::from_str(&feedback_message().to_json().unwrap()).unwrap();
        json["v"] = serde_json::json!(2);
        assert!(Message::from_json(&json.to_string()).is_err());
    }

    #[test]
    fn mismatched_sessions_are_rejected() {
        let domain =
            DomainSession::new(UserSession::new(4).unwrap(), 1, "runtime", "source").unwrap();
        let result = feedback_message()
            .with_user_session(UserSession::new(5).unwrap())
            .unwrap()
            .with_domain_session(domain);
        assert!(result.is_err());
    }

    #[test]
    fn display_names_type_and_route() {
        let rendered = feedback_message().to_string();
        assert!(rendered.starts_with("[Message: type = DisplayFeedbackTutorRequest, seq = 7"));
        assert!(rendered.contains("pedagogical -> tutor"));
    }
}
