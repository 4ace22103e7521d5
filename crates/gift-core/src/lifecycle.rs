//! Domain session lifecycle requests.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::session::DomainSession;
use crate::validate::{self, Validate};

/// Ask the domain module to load a course for a new domain session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InitializeDomainSessionRequest {
    domain_course_file_name: String,
    runtime_course_folder: String,
}

impl InitializeDomainSessionRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if either path is blank.
    pub fn new(
        domain_course_file_name: impl Into<String>,
        runtime_course_folder: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let request = Self {
            domain_course_file_name: domain_course_file_name.into(),
            runtime_course_folder: runtime_course_folder.into(),
        };
        request.validate()?;
        Ok(request)
    }

    #[must_use]
    pub fn domain_course_file_name(&self) -> &str {
        &self.domain_course_file_name
    }

    #[must_use]
    pub fn runtime_course_folder(&self) -> &str {
        &self.runtime_course_folder
    }
}

impl Validate for InitializeDomainSessionRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("domain_course_file_name", &self.domain_course_file_name)?;
        validate::non_blank("runtime_course_folder", &self.runtime_course_folder)
    }
}

/// Start a lesson (training application scenario) in the domain module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InitializeLessonRequest {
    content_reference: String,
}

impl InitializeLessonRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `content_reference` is blank.
    pub fn new(content_reference: impl Into<String>) -> Result<Self, CoreError> {
        let content_reference = content_reference.into();
        validate::non_blank("content_reference", &content_reference)?;
        Ok(Self { content_reference })
    }

    #[must_use]
    pub fn content_reference(&self) -> &str {
        &self.content_reference
    }
}

impl Validate for InitializeLessonRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("content_reference", &self.content_reference)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CloseDomainSessionRequest {
    #[serde(default)]
    reason: Option<String>,
}

impl CloseDomainSessionRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `reason` is present but blank.
    pub fn new(reason: Option<String>) -> Result<Self, CoreError> {
        let request = Self { reason };
        request.validate()?;
        Ok(request)
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl Validate for CloseDomainSessionRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::optional_non_blank("reason", self.reason())
    }
}

/// Announces that a domain session has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StartDomainSession {
    domain_session: DomainSession,
}

impl StartDomainSession {
    #[must_use]
    pub const fn new(domain_session: DomainSession) -> Self {
        Self { domain_session }
    }

    #[must_use]
    pub const fn domain_session(&self) -> &DomainSession {
        &self.domain_session
    }
}

impl Validate for StartDomainSession {
    fn validate(&self) -> Result<(), CoreError> {
        self.domain_session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserSession;

    #[test]
    fn initialize_domain_session_requires_paths() {
        assert!(InitializeDomainSessionRequest::new("", "runtime").is_err());
        assert!(InitializeDomainSessionRequest::new("course.xml", " ").is_err());
        let request = InitializeDomainSessionRequest::new("nav/course.xml", "runtime/1").unwrap();
        assert_eq!(request.runtime_course_folder(), "runtime/1");
    }

    #[test]
    fn initialize_lesson_requires_reference() {
        assert!(InitializeLessonRequest::new("\t").is_err());
        assert!(InitializeLessonRequest::new("scenario.dkf.xml").is_ok());
    }

    #[test]
    fn close_reason_is_optional_but_not_blank() {
        assert!(CloseDomainSessionRequest::default().validate().is_ok());
        assert!(CloseDomainSessionRequest::new(None).is_ok());
        assert!(CloseDomainSessionRequest::new(Some(" ".into())).is_err());
        let closed = CloseDomainSessionRequest::new(Some("Course complete".into())).unwrap();
        assert_eq!(closed.reason(), Some("Course complete"));

        let decoded: CloseDomainSessionRequest =
            serde_json::from_value(serde_json::json!({ "reason": "  " })).unwrap();
        assert!(decoded.validate().is_err());
    }

    #[test]
    fn start_domain_session_validates_inner_session() {
        let session =
            DomainSession::new(UserSession::new(1).unwrap(), 2, "runtime", "source").unwrap();
        let start = StartDomainSession::new(session);
        assert_eq!(start.domain_session().domain_session_id(), 2);

        let mut json = serde_json::to_value(&start).unwrap();
        json["domain_session"]["domain_session_id"] = serde_json::json!(0);
        let decoded: StartDomainSession = serde_json::from_value(json).unwrap();
        assert!(decoded.validate().is_err());
    }
}
