use gift_schema::SchemaRegistry;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FileArgs;
use crate::commands::load_message;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ValidateResponse {
    file: String,
    valid: bool,
    message_type: &'static str,
    sequence: u64,
    source: &'static str,
    destination: &'static str,
}

/// Handle `gift validate`. Any failure is returned as an error so the process
/// exits non-zero.
pub fn handle(args: &FileArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    let message = load_message(&args.file, &registry)?;

    output(
        &ValidateResponse {
            file: args.file.display().to_string(),
            valid: true,
            message_type: message.message_type().as_str(),
            sequence: message.sequence(),
            source: message.source().as_str(),
            destination: message.destination().as_str(),
        },
        flags.format,
    )
}

#[cfg(test)]
mod tests {
    use gift_core::enums::ModuleType;
    use gift_core::lifecycle::InitializeLessonRequest;
    use gift_core::messages::Message;

    use super::*;
    use crate::commands::test_support::{flags, write_message};

    #[test]
    fn valid_message_passes() {
        let message = Message::new(
            1,
            ModuleType::Domain,
            ModuleType::Tutor,
            InitializeLessonRequest::new("scenario.xml").unwrap(),
        )
        .unwrap();
        let (_dir, path) = write_message(&message);
        assert!(handle(&FileArgs { file: path }, &flags()).is_ok());
    }

    #[test]
    fn blank_field_fails_semantic_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.json");
        let json = serde_json::json!({
            "sequence": 1,
            "time_stamp": 0,
            "source": "domain",
            "destination": "tutor",
            "type": "InitializeLessonRequest",
            "payload": {"content_reference": "   "},
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let err = handle(&FileArgs { file: path }, &flags()).unwrap_err();
        assert!(format!("{err:#}").contains("content_reference"));
    }

    #[test]
    fn schema_violation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.json");
        let json = serde_json::json!({
            "sequence": "first",
            "time_stamp": 0,
            "source": "domain",
            "destination": "tutor",
            "type": "InitializeLessonRequest",
            "payload": {"content_reference": "scenario.xml"},
        });
        std::fs::write(&path, json.to_string()).unwrap();

        let err = handle(&FileArgs { file: path }, &flags()).unwrap_err();
        assert!(format!("{err:#}").contains("does not match the message schema"));
    }
}
