//! Branch path history: how many learners took each adaptive course path.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::validate::{self, Validate};

/// Experiment key used when a course runs outside an experiment.
pub const NO_EXPERIMENT: &str = "N/A";

/// One branch path's counters, as sent to or returned from the UMS.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BranchPathHistory {
    course_id: String,
    #[serde(default)]
    experiment_id: Option<String>,
    branch_id: u32,
    path_id: u32,
    path_name: String,
    /// Marks the learner leaving the path. Such updates carry no counts.
    #[serde(default)]
    path_end: bool,
    #[serde(default)]
    actual_cnt: u32,
    #[serde(default)]
    cnt: u32,
    /// Ask the UMS to add one to both counters instead of overwriting them.
    #[serde(default)]
    increment: bool,
}

impl BranchPathHistory {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `course_id` or `path_name` is blank.
    pub fn new(
        course_id: impl Into<String>,
        experiment_id: Option<String>,
        branch_id: u32,
        path_id: u32,
        path_name: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let history = Self {
            course_id: course_id.into(),
            experiment_id,
            branch_id,
            path_id,
            path_name: path_name.into(),
            path_end: false,
            actual_cnt: 0,
            cnt: 0,
            increment: false,
        };
        history.validate()?;
        Ok(history)
    }

    #[must_use]
    pub const fn with_counts(mut self, actual_cnt: u32, cnt: u32) -> Self {
        self.actual_cnt = actual_cnt;
        self.cnt = cnt;
        self
    }

    #[must_use]
    pub const fn with_increment(mut self, increment: bool) -> Self {
        self.increment = increment;
        self
    }

    #[must_use]
    pub const fn with_path_end(mut self, path_end: bool) -> Self {
        self.path_end = path_end;
        self
    }

    #[must_use]
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    #[must_use]
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    #[must_use]
    pub const fn branch_id(&self) -> u32 {
        self.branch_id
    }

    #[must_use]
    pub const fn path_id(&self) -> u32 {
        self.path_id
    }

    #[must_use]
    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    #[must_use]
    pub const fn is_path_end(&self) -> bool {
        self.path_end
    }

    /// Learners that actually took the path.
    #[must_use]
    pub const fn actual_cnt(&self) -> u32 {
        self.actual_cnt
    }

    /// Learners counted toward the path's share of the branch.
    #[must_use]
    pub const fn cnt(&self) -> u32 {
        self.cnt
    }

    #[must_use]
    pub const fn is_increment(&self) -> bool {
        self.increment
    }

    fn key(&self) -> PathKey {
        PathKey {
            course_id: self.course_id.clone(),
            experiment_id: self
                .experiment_id
                .clone()
                .unwrap_or_else(|| NO_EXPERIMENT.to_string()),
            branch_id: self.branch_id,
            path_id: self.path_id,
        }
    }
}

impl PartialEq for BranchPathHistory {
    fn eq(&self, other: &Self) -> bool {
        self.course_id == other.course_id
            && self.experiment_id == other.experiment_id
            && self.branch_id == other.branch_id
            && self.path_id == other.path_id
            && self.actual_cnt == other.actual_cnt
            && self.cnt == other.cnt
    }
}

impl Eq for BranchPathHistory {}

impl Hash for BranchPathHistory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.course_id.hash(state);
        self.experiment_id.hash(state);
        self.branch_id.hash(state);
        self.path_id.hash(state);
        self.actual_cnt.hash(state);
        self.cnt.hash(state);
    }
}

impl Validate for BranchPathHistory {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("course_id", &self.course_id)?;
        validate::optional_non_blank("experiment_id", self.experiment_id())?;
        validate::non_blank("path_name", &self.path_name)
    }
}

impl fmt::Display for BranchPathHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[BranchPathHistory: courseId = {}, experimentId = {}, branchId = {}, pathId = {}, \
             pathName = {}, pathEnding = {}, actualCnt = {}, cnt = {}, increment = {}]",
            self.course_id,
            self.experiment_id().unwrap_or("none"),
            self.branch_id,
            self.path_id,
            self.path_name,
            self.path_end,
            self.actual_cnt,
            self.cnt,
            self.increment,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PathKey {
    course_id: String,
    experiment_id: String,
    branch_id: u32,
    path_id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PathCounts {
    actual_cnt: u32,
    cnt: u32,
}

/// In-memory store of branch path counters, keyed by
/// course, experiment (or [`NO_EXPERIMENT`]), branch and path.
#[derive(Debug, Clone, Default)]
pub struct BranchPathLedger {
    entries: HashMap<PathKey, PathCounts>,
}

impl BranchPathLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply one update and return the stored counters as a history.
    ///
    /// Path-end updates are ignored and return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `history` is malformed.
    pub fn record_update(
        &mut self,
        history: &BranchPathHistory,
    ) -> Result<Option<BranchPathHistory>, CoreError> {
        history.validate()?;
        if history.path_end {
            tracing::trace!(path_id = history.path_id, "ignoring path end update");
            return Ok(None);
        }

        let requested = PathCounts {
            actual_cnt: history.actual_cnt,
            cnt: history.cnt,
        };
        let counts = self
            .entries
            .entry(history.key())
            .and_modify(|stored| {
                *stored = if history.increment {
                    PathCounts {
                        actual_cnt: stored.actual_cnt.saturating_add(1),
                        cnt: stored.cnt.saturating_add(1),
                    }
                } else {
                    requested
                };
            })
            .or_insert_with(|| {
                if history.increment {
                    PathCounts {
                        actual_cnt: requested.actual_cnt.saturating_add(1),
                        cnt: requested.cnt.saturating_add(1),
                    }
                } else {
                    requested
                }
            });

        tracing::debug!(
            course_id = %history.course_id,
            branch_id = history.branch_id,
            path_id = history.path_id,
            actual_cnt = counts.actual_cnt,
            cnt = counts.cnt,
            "branch path counters updated"
        );

        let mut stored = history.clone();
        stored.actual_cnt = counts.actual_cnt;
        stored.cnt = counts.cnt;
        stored.increment = false;
        Ok(Some(stored))
    }

    /// Fill each request's counters from the ledger.
    /// Paths the ledger has never seen are created with the request's counters.
    ///
    /// # Errors
    ///
    /// Returns the first validation error among `histories`.
    pub fn resolve(
        &mut self,
        histories: &[BranchPathHistory],
    ) -> Result<Vec<BranchPathHistory>, CoreError> {
        histories.validate()?;
        Ok(histories
            .iter()
            .map(|history| {
                let counts = *self.entries.entry(history.key()).or_insert(PathCounts {
                    actual_cnt: history.actual_cnt,
                    cnt: history.cnt,
                });
                let mut resolved = history.clone();
                resolved.actual_cnt = counts.actual_cnt;
                resolved.cnt = counts.cnt;
                resolved
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn path(path_id: u32, name: &str) -> BranchPathHistory {
        BranchPathHistory::new("Land Navigation", None, 7, path_id, name).unwrap()
    }

    #[test]
    fn equality_ignores_path_name_and_end() {
        let a = path(1, "Remediation").with_counts(3, 4);
        let b = path(1, "Advanced").with_counts(3, 4).with_path_end(true);

        assert_eq!(a, b);
        assert_ne!(a.to_string(), b.to_string());

        let set: HashSet<BranchPathHistory> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn equality_includes_counts_and_experiment() {
        assert_ne!(path(1, "p").with_counts(1, 1), path(1, "p").with_counts(1, 2));
        let in_experiment =
            BranchPathHistory::new("Land Navigation", Some("exp".into()), 7, 1, "p").unwrap();
        assert_ne!(in_experiment, path(1, "p"));
    }

    #[test]
    fn blank_course_or_path_name_rejected() {
        assert!(BranchPathHistory::new(" ", None, 1, 1, "p").is_err());
        assert!(BranchPathHistory::new("c", None, 1, 1, "").is_err());
    }

    #[test]
    fn path_end_updates_are_ignored() {
        let mut ledger = BranchPathLedger::new();
        let stored = ledger
            .record_update(&path(1, "p").with_counts(5, 5).with_path_end(true))
            .unwrap();
        assert!(stored.is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn increment_creates_then_grows_counters() {
        let mut ledger = BranchPathLedger::new();
        let update = path(1, "p").with_increment(true);

        let first = ledger.record_update(&update).unwrap().unwrap();
        assert_eq!((first.actual_cnt(), first.cnt()), (1, 1));

        let second = ledger.record_update(&update).unwrap().unwrap();
        assert_eq!((second.actual_cnt(), second.cnt()), (2, 2));
        assert!(!second.is_increment());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn non_increment_update_overwrites_counters() {
        let mut ledger = BranchPathLedger::new();
        ledger
            .record_update(&path(1, "p").with_increment(true))
            .unwrap();
        let stored = ledger
            .record_update(&path(1, "p").with_counts(10, 12))
            .unwrap()
            .unwrap();
        assert_eq!((stored.actual_cnt(), stored.cnt()), (10, 12));
    }

    #[test]
    fn resolve_fills_known_counts_and_creates_missing() {
        let mut ledger = BranchPathLedger::new();
        ledger
            .record_update(&path(1, "p").with_counts(4, 6))
            .unwrap();

        let resolved = ledger
            .resolve(&[path(1, "p"), path(2, "q").with_counts(1, 1)])
            .unwrap();
        assert_eq!((resolved[0].actual_cnt(), resolved[0].cnt()), (4, 6));
        assert_eq!((resolved[1].actual_cnt(), resolved[1].cnt()), (1, 1));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn experiments_are_tracked_separately() {
        let mut ledger = BranchPathLedger::new();
        let plain = path(1, "p").with_increment(true);
        let experiment = BranchPathHistory::new("Land Navigation", Some("exp".into()), 7, 1, "p")
            .unwrap()
            .with_increment(true);
        ledger.record_update(&plain).unwrap();
        ledger.record_update(&experiment).unwrap();
        assert_eq!(ledger.len(), 2);
    }
}
