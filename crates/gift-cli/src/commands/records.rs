use anyhow::bail;
use gift_config::GiftConfig;
use gift_core::enums::DeploymentMode;
use gift_core::lms::{LmsCourseRecords, LmsDataRequest};
use gift_core::messages::{Message, MessagePayload};
use gift_schema::SchemaRegistry;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RecordsArgs;
use crate::commands::{load_message, row_limit};
use crate::output::output;

/// Simple deployments run the tutor alone and keep no learner history.
const RECORD_MODES: [DeploymentMode; 3] = [
    DeploymentMode::Desktop,
    DeploymentMode::Server,
    DeploymentMode::Experiment,
];

#[derive(Debug, Serialize)]
struct DomainSummary {
    domain: String,
    records: usize,
    latest: String,
    latest_grade: &'static str,
}

#[derive(Debug, Serialize)]
struct RecordRow {
    domain_session_id: u32,
    date: String,
    grade: &'static str,
    lms: String,
}

fn summarize(records: &LmsCourseRecords) -> Vec<DomainSummary> {
    records
        .records_by_domain()
        .into_iter()
        .filter_map(|(domain, in_domain)| {
            let latest = in_domain.iter().max_by_key(|record| record.date())?;
            Some(DomainSummary {
                domain: domain.to_string(),
                records: in_domain.len(),
                latest: latest.date().to_rfc3339(),
                latest_grade: latest.root().grade().as_str(),
            })
        })
        .collect()
}

/// Whose records these are, for the data request.
fn learner_name(message: &Message) -> String {
    message
        .user_session()
        .or_else(|| message.domain_session().map(|d| d.user_session()))
        .map_or_else(
            || String::from("learner"),
            |user| {
                user.username()
                    .map_or_else(|| user.user_id().to_string(), str::to_string)
            },
        )
}

fn domain_rows(
    records: &LmsCourseRecords,
    request: &LmsDataRequest,
) -> Vec<RecordRow> {
    records
        .query(request)
        .records()
        .iter()
        .map(|record| RecordRow {
            domain_session_id: record.domain_session_id(),
            date: record.date().to_rfc3339(),
            grade: record.root().grade().as_str(),
            lms: record.lms_connection_name().unwrap_or("-").to_string(),
        })
        .collect()
}

/// Handle `gift records`.
pub fn handle(args: &RecordsArgs, flags: &GlobalFlags, config: &GiftConfig) -> anyhow::Result<()> {
    config.general.require_mode(&RECORD_MODES)?;

    let registry = SchemaRegistry::new();
    let message = load_message(&args.file, &registry)?;

    let MessagePayload::LmsDataReply(records) = message.payload() else {
        bail!(
            "{} holds a {} message; records needs an LMSDataReply",
            args.file.display(),
            message.message_type()
        );
    };

    let Some(domain) = &args.domain else {
        let mut summaries = summarize(records);
        summaries.truncate(row_limit(flags, config));
        return output(&summaries, flags.format);
    };

    let page_size = flags
        .limit
        .unwrap_or(config.lms.default_page_size)
        .try_into()
        .unwrap_or(usize::MAX);
    let request = LmsDataRequest::new(learner_name(&message))?
        .with_domain_ids(vec![domain.clone()])
        .sorted_descending(!args.ascending)
        .with_page(0, page_size);

    let rows = domain_rows(records, &request);
    if rows.is_empty() {
        tracing::warn!(domain = %domain, "no course records for domain");
    }
    output(&rows, flags.format)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use gift_core::enums::{AssessmentLevel, ModuleType};
    use gift_core::lms::{GradedScoreNode, LmsCourseRecord};
    use gift_core::session::UserSession;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::test_support::{flags, write_message};

    fn record(domain: &str, session: u32, day: u32, grade: AssessmentLevel) -> LmsCourseRecord {
        LmsCourseRecord::new(
            domain,
            session,
            Utc.with_ymd_and_hms(2026, 2, day, 10, 0, 0).unwrap(),
            GradedScoreNode::new(domain, grade).unwrap(),
        )
        .unwrap()
    }

    fn records() -> LmsCourseRecords {
        [
            record("Land Navigation", 1, 1, AssessmentLevel::BelowExpectation),
            record("First Aid", 2, 2, AssessmentLevel::AtExpectation),
            record("Land Navigation", 3, 3, AssessmentLevel::AboveExpectation),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn summary_reports_latest_grade_per_domain() {
        let summaries = summarize(&records());
        assert_eq!(summaries.len(), 2);
        let nav = summaries
            .iter()
            .find(|s| s.domain == "Land Navigation")
            .unwrap();
        assert_eq!(nav.records, 2);
        assert_eq!(nav.latest_grade, "above_expectation");
    }

    #[test]
    fn domain_rows_are_newest_first_and_paged() {
        let request = LmsDataRequest::new("learner")
            .unwrap()
            .with_domain_ids(vec!["Land Navigation".into()])
            .sorted_descending(true)
            .with_page(0, 1);
        let rows = domain_rows(&records(), &request);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain_session_id, 3);
    }

    #[test]
    fn learner_name_prefers_username() {
        let user = UserSession::new(5).unwrap().with_username("pvt.snuffy").unwrap();
        let message = Message::new(1, ModuleType::Lms, ModuleType::Learner, records())
            .unwrap()
            .with_user_session(user)
            .unwrap();
        assert_eq!(learner_name(&message), "pvt.snuffy");

        let anonymous = Message::new(1, ModuleType::Lms, ModuleType::Learner, records())
            .unwrap()
            .with_user_session(UserSession::new(5).unwrap())
            .unwrap();
        assert_eq!(learner_name(&anonymous), "5");
    }

    #[test]
    fn handle_lists_one_domain() {
        let message = Message::new(1, ModuleType::Lms, ModuleType::Learner, records()).unwrap();
        let (_dir, path) = write_message(&message);
        let args = RecordsArgs {
            file: path,
            domain: Some("First Aid".into()),
            ascending: false,
        };
        assert!(handle(&args, &flags(), &GiftConfig::default()).is_ok());
    }

    #[test]
    fn handle_refuses_simple_deployments() {
        let message = Message::new(1, ModuleType::Lms, ModuleType::Learner, records()).unwrap();
        let (_dir, path) = write_message(&message);
        let args = RecordsArgs {
            file: path,
            domain: None,
            ascending: false,
        };
        let mut config = GiftConfig::default();
        config.general.deployment_mode = DeploymentMode::Simple;

        let err = handle(&args, &flags(), &config).unwrap_err();
        assert!(err.to_string().contains("simple"));

        config.general.deployment_mode = DeploymentMode::Server;
        assert!(handle(&args, &flags(), &config).is_ok());
    }
}
