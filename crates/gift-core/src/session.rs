//! User and domain session identity carried on most GIFT messages.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::UserSessionType;
use crate::errors::CoreError;
use crate::validate::{self, Validate};

/// A learner logged into GIFT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct UserSession {
    user_id: u32,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    session_type: UserSessionType,
    /// Set only for [`UserSessionType::ExperimentUser`].
    #[serde(default)]
    experiment_id: Option<String>,
    /// Identifies the learner across team sessions, when known.
    #[serde(default)]
    global_user_id: Option<u32>,
}

impl UserSession {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `user_id` is zero.
    pub fn new(user_id: u32) -> Result<Self, CoreError> {
        validate::at_least_one("user_id", user_id)?;
        Ok(Self {
            user_id,
            username: None,
            session_type: UserSessionType::GiftUser,
            experiment_id: None,
            global_user_id: None,
        })
    }

    /// A session for an anonymous participant in an experiment.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `user_id` is zero or
    /// `experiment_id` is blank.
    pub fn for_experiment(user_id: u32, experiment_id: impl Into<String>) -> Result<Self, CoreError> {
        let experiment_id = experiment_id.into();
        validate::non_blank("experiment_id", &experiment_id)?;
        let mut session = Self::new(user_id)?;
        session.session_type = UserSessionType::ExperimentUser;
        session.experiment_id = Some(experiment_id);
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `username` is blank.
    pub fn with_username(mut self, username: impl Into<String>) -> Result<Self, CoreError> {
        let username = username.into();
        validate::non_blank("username", &username)?;
        self.username = Some(username);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if switching to
    /// [`UserSessionType::ExperimentUser`] without an experiment id; use
    /// [`Self::for_experiment`] for those sessions.
    pub fn with_session_type(mut self, session_type: UserSessionType) -> Result<Self, CoreError> {
        self.session_type = session_type;
        self.validate()?;
        Ok(self)
    }

    #[must_use]
    pub const fn user_id(&self) -> u32 {
        self.user_id
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub const fn session_type(&self) -> UserSessionType {
        self.session_type
    }

    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    #[must_use]
    pub const fn global_user_id(&self) -> Option<u32> {
        self.global_user_id
    }

    pub const fn set_global_user_id(&mut self, global_user_id: Option<u32>) {
        self.global_user_id = global_user_id;
    }
}

impl Validate for UserSession {
    fn validate(&self) -> Result<(), CoreError> {
        validate::at_least_one("user_id", self.user_id)?;
        validate::optional_non_blank("username", self.username())?;
        if self.session_type == UserSessionType::ExperimentUser {
            match self.experiment_id() {
                Some(id) => validate::non_blank("experiment_id", id)?,
                None => {
                    return Err(CoreError::invalid(
                        "experiment_id",
                        "required for an experiment user session",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[UserSession: userId = {}, username = {}, type = {}, experimentId = {}]",
            self.user_id,
            self.username().unwrap_or("none"),
            self.session_type,
            self.experiment_id().unwrap_or("none"),
        )
    }
}

/// A learner's run through one course.
///
/// Wraps the learner's [`UserSession`] rather than extending it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct DomainSession {
    user_session: UserSession,
    domain_session_id: u32,
    /// Where the course runs from (a per-session copy of the course folder).
    domain_runtime_id: String,
    /// Where the course was authored.
    domain_source_id: String,
}

impl DomainSession {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `domain_session_id` is zero or
    /// either domain id is blank.
    pub fn new(
        user_session: UserSession,
        domain_session_id: u32,
        domain_runtime_id: impl Into<String>,
        domain_source_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let session = Self {
            user_session,
            domain_session_id,
            domain_runtime_id: domain_runtime_id.into(),
            domain_source_id: domain_source_id.into(),
        };
        session.validate()?;
        Ok(session)
    }

    #[must_use]
    pub const fn user_session(&self) -> &UserSession {
        &self.user_session
    }

    #[must_use]
    pub const fn user_id(&self) -> u32 {
        self.user_session.user_id()
    }

    #[must_use]
    pub const fn domain_session_id(&self) -> u32 {
        self.domain_session_id
    }

    #[must_use]
    pub fn domain_runtime_id(&self) -> &str {
        &self.domain_runtime_id
    }

    #[must_use]
    pub fn domain_source_id(&self) -> &str {
        &self.domain_source_id
    }
}

impl Validate for DomainSession {
    fn validate(&self) -> Result<(), CoreError> {
        self.user_session.validate()?;
        validate::at_least_one("domain_session_id", self.domain_session_id)?;
        validate::non_blank("domain_runtime_id", &self.domain_runtime_id)?;
        validate::non_blank("domain_source_id", &self.domain_source_id)
    }
}

impl fmt::Display for DomainSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DomainSession: domainSessionId = {}, runtimeId = {}, sourceId = {}, {}]",
            self.domain_session_id, self.domain_runtime_id, self.domain_source_id, self.user_session
        )
    }
}
