use std::collections::{BTreeMap, HashSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Assessment, AssessmentCore, TaskAssessment};
use crate::errors::CoreError;
use crate::validate::Validate;

/// Who is observing the learners and what they last noted.
///
/// Only meaningful inside the module that owns the observer's session, so it
/// is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverMetadata {
    pub observer_controller: Option<String>,
    pub observer_comment: Option<String>,
}

/// A snapshot of every task assessment in a running domain session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceAssessment {
    #[serde(default)]
    tasks: Vec<TaskAssessment>,
    #[serde(default)]
    evaluator: Option<String>,
    #[serde(skip)]
    observer: Option<ObserverMetadata>,
}

impl PerformanceAssessment {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if two tasks share a node id.
    pub fn new(tasks: Vec<TaskAssessment>) -> Result<Self, CoreError> {
        let assessment = Self {
            tasks,
            evaluator: None,
            observer: None,
        };
        assessment.ensure_unique_task_ids()?;
        Ok(assessment)
    }

    fn ensure_unique_task_ids(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for task in &self.tasks {
            let node_id = task.core().node_id();
            if !seen.insert(node_id) {
                return Err(CoreError::invalid(
                    "tasks",
                    format!("more than one task has node id {node_id}"),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn tasks(&self) -> &[TaskAssessment] {
        &self.tasks
    }

    #[must_use]
    pub fn task(&self, node_id: u32) -> Option<&TaskAssessment> {
        self.tasks
            .iter()
            .find(|task| task.core().node_id() == node_id)
    }

    pub fn task_mut(&mut self, node_id: u32) -> Option<&mut TaskAssessment> {
        self.tasks
            .iter_mut()
            .find(|task| task.core().node_id() == node_id)
    }

    #[must_use]
    pub fn tasks_by_node_id(&self) -> BTreeMap<u32, &TaskAssessment> {
        self.tasks
            .iter()
            .map(|task| (task.core().node_id(), task))
            .collect()
    }

    /// Insert a task, replacing (and returning) any task with the same node id.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `task` is not internally consistent.
    pub fn upsert_task(&mut self, task: TaskAssessment) -> Result<Option<TaskAssessment>, CoreError> {
        task.validate()?;
        let node_id = task.core().node_id();
        if let Some(existing) = self.task_mut(node_id) {
            return Ok(Some(std::mem::replace(existing, task)));
        }
        self.tasks.push(task);
        Ok(None)
    }

    /// Search every task tree for a node.
    #[must_use]
    pub fn find_node(&self, node_id: u32) -> Option<&AssessmentCore> {
        self.tasks.iter().find_map(|task| task.find_node(node_id))
    }

    #[must_use]
    pub fn evaluator(&self) -> Option<&str> {
        self.evaluator.as_deref()
    }

    pub fn set_evaluator(&mut self, evaluator: Option<String>) {
        self.evaluator = evaluator;
    }

    #[must_use]
    pub const fn observer(&self) -> Option<&ObserverMetadata> {
        self.observer.as_ref()
    }

    pub fn set_observer(&mut self, observer: Option<ObserverMetadata>) {
        self.observer = observer;
    }

    /// Whether any node of any task was scored by an observed condition.
    #[must_use]
    pub fn has_observed_assessment(&self) -> bool {
        self.tasks
            .iter()
            .any(Assessment::contains_observed_assessment)
    }

    /// Drop the observer metadata and every observer comment in every tree.
    pub fn clear_observer_metadata(&mut self) {
        self.observer = None;
        for task in &mut self.tasks {
            task.clear_observer_metadata();
        }
    }
}

/// Observer metadata is transient and does not participate.
impl PartialEq for PerformanceAssessment {
    fn eq(&self, other: &Self) -> bool {
        self.tasks == other.tasks && self.evaluator == other.evaluator
    }
}

impl Validate for PerformanceAssessment {
    fn validate(&self) -> Result<(), CoreError> {
        self.tasks.validate()?;
        self.ensure_unique_task_ids()
    }
}

impl fmt::Display for PerformanceAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[PerformanceAssessment: tasks = {")?;
        for task in &self.tasks {
            write!(f, "{}: {task}, ", task.core().node_id())?;
        }
        write!(
            f,
            "}}, evaluator = {}]",
            self.evaluator.as_deref().unwrap_or("none")
        )
    }
}
