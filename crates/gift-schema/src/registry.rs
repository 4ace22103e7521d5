//! Central schema registry for GIFT messages.
//!
//! Schemas are generated from `gift-core` types at construction time with
//! [`schemars::schema_for!`]. Payload schemas are keyed by message type name
//! (`"PerformanceAssessment"`, `"LMSDataRequest"`, ...).

use std::collections::HashMap;

use gift_core::branch::BranchPathHistory;
use gift_core::messages::{Message, MessageType};
use schemars::schema_for;

use crate::error::SchemaError;

/// Registry name of the envelope schema.
pub const MESSAGE_SCHEMA: &str = "Message";

/// Central store of every message schema.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert the schema for `$ty` under a message type's name.
macro_rules! register {
    ($map:expr, $kind:expr, $ty:ty) => {
        $map.insert($kind.as_str(), schema_for!($ty).to_value());
    };
}

impl SchemaRegistry {
    /// Build a registry with one schema per [`MessageType`] and the envelope.
    #[must_use]
    pub fn new() -> Self {
        use gift_core::assessment::PerformanceAssessment;
        use gift_core::learner_action::LearnerTutorAction;
        use gift_core::lifecycle::{
            CloseDomainSessionRequest, InitializeDomainSessionRequest, InitializeLessonRequest,
            StartDomainSession,
        };
        use gift_core::lms::{LmsCourseRecords, LmsDataRequest};
        use gift_core::tutor::{
            DisplayAarTutorRequest, DisplayChatWindowRequest, DisplayChatWindowUpdateRequest,
            DisplayFeedbackTutorRequest, DisplayGuidanceTutorRequest, DisplaySurveyTutorRequest,
        };

        let mut schemas = HashMap::new();

        // --- Assessment and LMS (3) ---
        register!(schemas, MessageType::PerformanceAssessment, PerformanceAssessment);
        register!(schemas, MessageType::LmsDataRequest, LmsDataRequest);
        register!(schemas, MessageType::LmsDataReply, LmsCourseRecords);

        // --- Branch path history (3) ---
        register!(schemas, MessageType::BranchPathHistoryUpdate, BranchPathHistory);
        register!(
            schemas,
            MessageType::BranchPathHistoryRequest,
            Vec<BranchPathHistory>
        );
        register!(
            schemas,
            MessageType::BranchPathHistoryReply,
            Vec<BranchPathHistory>
        );

        // --- Tutor display (6) ---
        register!(
            schemas,
            MessageType::DisplayChatWindowRequest,
            DisplayChatWindowRequest
        );
        register!(
            schemas,
            MessageType::DisplayChatWindowUpdateRequest,
            DisplayChatWindowUpdateRequest
        );
        register!(
            schemas,
            MessageType::DisplayFeedbackTutorRequest,
            DisplayFeedbackTutorRequest
        );
        register!(
            schemas,
            MessageType::DisplayGuidanceTutorRequest,
            DisplayGuidanceTutorRequest
        );
        register!(schemas, MessageType::DisplayAarTutorRequest, DisplayAarTutorRequest);
        register!(
            schemas,
            MessageType::DisplaySurveyTutorRequest,
            DisplaySurveyTutorRequest
        );

        // --- Domain session lifecycle (4) ---
        register!(
            schemas,
            MessageType::InitializeDomainSessionRequest,
            InitializeDomainSessionRequest
        );
        register!(
            schemas,
            MessageType::InitializeLessonRequest,
            InitializeLessonRequest
        );
        register!(
            schemas,
            MessageType::CloseDomainSessionRequest,
            CloseDomainSessionRequest
        );
        register!(schemas, MessageType::StartDomainSession, StartDomainSession);

        // --- Learner actions (1) ---
        register!(schemas, MessageType::LearnerTutorAction, LearnerTutorAction);

        // --- Envelope (1) ---
        schemas.insert(MESSAGE_SCHEMA, schema_for!(Message).to_value());

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(schema = name, count = errors.len(), "schema validation failed");
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// Validate a whole message: the envelope first, then its payload against
    /// the schema named by its `type`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::MissingField` if `type` is absent,
    /// `SchemaError::NotFound` for an unknown type, and
    /// `SchemaError::ValidationFailed` if either schema rejects the value.
    pub fn validate_message(&self, instance: &serde_json::Value) -> Result<MessageType, SchemaError> {
        let type_name = instance
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(SchemaError::MissingField("type"))?;
        let kind = MessageType::from_name(type_name)
            .map_err(|_| SchemaError::NotFound(type_name.to_string()))?;

        self.validate(MESSAGE_SCHEMA, instance)?;

        let payload = instance
            .get("payload")
            .ok_or(SchemaError::MissingField("payload"))?;
        self.validate(kind.as_str(), payload)?;
        Ok(kind)
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
