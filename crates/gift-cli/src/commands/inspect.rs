use anyhow::bail;
use gift_config::GiftConfig;
use gift_core::assessment::{Assessment, PerformanceAssessment};
use gift_core::messages::MessagePayload;
use gift_schema::SchemaRegistry;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::FileArgs;
use crate::commands::{load_message, row_limit};
use crate::output::output;

#[derive(Debug, Serialize)]
struct NodeRow {
    task: u32,
    depth: usize,
    node_id: u32,
    name: String,
    level: &'static str,
    confidence: f32,
    state: &'static str,
}

/// One row per node, tasks in message order, each tree pre-order.
fn node_rows(assessment: &PerformanceAssessment) -> Vec<NodeRow> {
    let mut rows = Vec::new();
    for task in assessment.tasks() {
        let task_id = task.core().node_id();
        task.walk(&mut |depth, node| {
            rows.push(NodeRow {
                task: task_id,
                depth,
                node_id: node.node_id(),
                name: format!("{}{}", "  ".repeat(depth), node.name()),
                level: node.assessment_level().as_str(),
                confidence: node.confidence(),
                state: node.node_state().display_name(),
            });
        });
    }
    rows
}

/// Handle `gift inspect`.
pub fn handle(args: &FileArgs, flags: &GlobalFlags, config: &GiftConfig) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    let message = load_message(&args.file, &registry)?;

    let MessagePayload::PerformanceAssessment(assessment) = message.payload() else {
        bail!(
            "{} holds a {} message; inspect needs a PerformanceAssessment",
            args.file.display(),
            message.message_type()
        );
    };

    let mut rows = node_rows(assessment);
    let limit = row_limit(flags, config);
    if rows.len() > limit {
        tracing::info!(total = rows.len(), limit, "truncating node listing");
        rows.truncate(limit);
    }
    output(&rows, flags.format)
}
