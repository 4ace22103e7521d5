//! Messages built with gift-core pass the registry, and decoded messages
//! that pass the registry also pass semantic validation.

use chrono::{TimeZone, Utc};
use gift_core::branch::BranchPathHistory;
use gift_core::enums::{AssessmentLevel, ModuleType};
use gift_core::learner_action::LearnerTutorAction;
use gift_core::lms::{GradedScoreNode, LmsCourseRecord, LmsCourseRecords};
use gift_core::messages::{Message, MessagePayload, MessageType};
use gift_core::session::{DomainSession, UserSession};
use gift_core::tutor::{DisplayGuidanceTutorRequest, DisplaySurveyTutorRequest};
use gift_schema::SchemaRegistry;
use pretty_assertions::assert_eq;

fn domain_session() -> DomainSession {
    DomainSession::new(
        UserSession::new(12).unwrap().with_username("learner").unwrap(),
        30,
        "runtime/land-nav",
        "courses/land-nav",
    )
    .unwrap()
}

fn messages() -> Vec<Message> {
    let records: LmsCourseRecords = [LmsCourseRecord::new(
        "Land Navigation",
        30,
        Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap(),
        GradedScoreNode::new("Land Navigation", AssessmentLevel::AboveExpectation).unwrap(),
    )
    .unwrap()]
    .into_iter()
    .collect();

    let payloads: Vec<MessagePayload> = vec![
        records.into(),
        MessagePayload::BranchPathHistoryReply(vec![
            BranchPathHistory::new("Land Navigation", None, 1, 2, "Remediation")
                .unwrap()
                .with_counts(3, 3),
        ]),
        DisplayGuidanceTutorRequest::text("Orient your map north").unwrap().into(),
        DisplaySurveyTutorRequest::new(4, "post-test").unwrap().into(),
        LearnerTutorAction::AssessMyLocation.into(),
    ];

    (1_u64..)
        .zip(payloads)
        .map(|(sequence, payload)| {
            Message::new(sequence, ModuleType::Lms, ModuleType::Learner, payload)
                .unwrap()
                .with_domain_session(domain_session())
                .unwrap()
        })
        .collect()
}

#[test]
fn built_messages_pass_the_registry() {
    let registry = SchemaRegistry::new();
    for message in messages() {
        let json = serde_json::to_value(&message).unwrap();
        let kind = registry
            .validate_message(&json)
            .unwrap_or_else(|e| panic!("{} failed: {e}", message.message_type()));
        assert_eq!(kind, message.message_type());
    }
}

#[test]
fn registry_and_decoder_agree() {
    let registry = SchemaRegistry::new();
    for message in messages() {
        let text = message.to_json().unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(registry.validate_message(&json).is_ok());
        assert_eq!(Message::from_json(&text).unwrap(), message);
    }
}

#[test]
fn schemas_cover_every_message_type() {
    let registry = SchemaRegistry::new();
    let names = registry.list();
    for kind in MessageType::ALL {
        assert!(names.contains(&kind.as_str()));
    }
}
