use anyhow::Context;
use gift_core::messages::MessageType;
use gift_schema::{MESSAGE_SCHEMA, SchemaRegistry};
use serde::Serialize;

use crate::cli::{GlobalFlags, SchemaCommands};
use crate::output::output;

#[derive(Debug, Serialize)]
struct SchemaEntry {
    name: &'static str,
    description: &'static str,
}

fn entries(registry: &SchemaRegistry) -> Vec<SchemaEntry> {
    registry
        .list()
        .into_iter()
        .map(|name| SchemaEntry {
            name,
            description: MessageType::from_name(name)
                .map_or("Message envelope", MessageType::description),
        })
        .collect()
}

/// Handle `gift schema`.
pub fn handle(action: &SchemaCommands, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match action {
        SchemaCommands::List => output(&entries(&registry), flags.format),
        SchemaCommands::Show { name } => {
            let schema = registry.get(name).with_context(|| {
                format!("no schema named '{name}' (try `gift schema list`)")
            })?;
            output(schema, flags.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_describes_every_schema() {
        let registry = SchemaRegistry::new();
        let entries = entries(&registry);
        assert_eq!(entries.len(), registry.schema_count());

        let envelope = entries.iter().find(|e| e.name == MESSAGE_SCHEMA).unwrap();
        assert_eq!(envelope.description, "Message envelope");

        let lms = entries.iter().find(|e| e.name == "LMSDataRequest").unwrap();
        assert_eq!(lms.description, MessageType::LmsDataRequest.description());
    }

    #[test]
    fn show_unknown_schema_fails() {
        let flags = crate::commands::test_support::flags();
        let action = SchemaCommands::Show {
            name: "Teleport".into(),
        };
        assert!(handle(&action, &flags).is_err());
    }
}
