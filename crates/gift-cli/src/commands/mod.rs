use std::path::Path;

use anyhow::Context;
use gift_config::GiftConfig;
use gift_core::messages::Message;
use gift_schema::SchemaRegistry;

use crate::cli::{Commands, GlobalFlags};

pub mod config;
pub mod inspect;
pub mod records;
pub mod schema;
pub mod validate;

/// Route a parsed command to its handler.
pub fn dispatch(command: &Commands, flags: &GlobalFlags, config: &GiftConfig) -> anyhow::Result<()> {
    match command {
        Commands::Schema { action } => schema::handle(action, flags),
        Commands::Validate(args) => validate::handle(args, flags),
        Commands::Inspect(args) => inspect::handle(args, flags, config),
        Commands::Records(args) => records::handle(args, flags, config),
        Commands::Config => config::handle(flags, config),
    }
}

/// Read a message file, check it against the schema registry, then decode it.
pub fn load_message(path: &Path, registry: &SchemaRegistry) -> anyhow::Result<Message> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let kind = registry
        .validate_message(&value)
        .with_context(|| format!("{} does not match the message schema", path.display()))?;
    tracing::debug!(path = %path.display(), message_type = %kind, "schema check passed");

    let message = Message::from_json(&text)
        .with_context(|| format!("{} holds an invalid {kind} message", path.display()))?;
    Ok(message)
}

/// Row limit: the `--limit` flag, else the configured default.
pub fn row_limit(flags: &GlobalFlags, config: &GiftConfig) -> usize {
    flags
        .limit
        .unwrap_or(config.general.default_limit)
        .try_into()
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use gift_core::messages::Message;
    use tempfile::TempDir;

    use crate::cli::{GlobalFlags, OutputFormat};

    pub fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: true,
            verbose: false,
        }
    }

    /// Write `message` into a fresh temp dir; keep the dir alive while using the path.
    pub fn write_message(message: &Message) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.json");
        std::fs::write(&path, message.to_json_pretty().unwrap()).unwrap();
        (dir, path)
    }
}
