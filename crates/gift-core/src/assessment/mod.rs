//! Performance assessment hierarchy.
//!
//! ```text
//! PerformanceAssessment
//! └── TaskAssessment            (root, keyed by node id)
//!     └── ConceptAssessment
//!         ├── Concept           (leaf)
//!         └── Intermediate      (≥ 1 child ConceptAssessment, arbitrarily deep)
//! ```
//!
//! Every node wraps an [`AssessmentCore`] holding the judgement itself
//! (level, confidence, competence, trend, priority) and the hold flags that
//! keep automatic updates from overwriting an observer's decision.
//!
//! The node kinds form a closed set, so traversal in [`Assessment`] matches
//! exhaustively instead of probing concrete types.

mod concept;
mod node;
mod performance;
mod task;

pub use concept::{ConceptAssessment, IntermediateConceptAssessment};
pub use node::{AssessmentCore, HoldFlags};
pub use performance::{ObserverMetadata, PerformanceAssessment};
pub use task::TaskAssessment;

use std::collections::HashSet;

use crate::errors::CoreError;

/// Shared behavior of every node in an assessment tree.
pub trait Assessment {
    fn core(&self) -> &AssessmentCore;

    fn core_mut(&mut self) -> &mut AssessmentCore;

    /// Direct children. Leaves return an empty slice.
    fn concepts(&self) -> &[ConceptAssessment];

    fn concepts_mut(&mut self) -> &mut [ConceptAssessment];

    /// Clear the observer comment on this node and every descendant.
    fn clear_observer_metadata(&mut self) {
        self.core_mut().set_observer_comment(None);
        for concept in self.concepts_mut() {
            concept.clear_observer_metadata();
        }
    }

    /// Depth-first search for the node with `node_id`, including this one.
    fn find_node(&self, node_id: u32) -> Option<&AssessmentCore> {
        if self.core().node_id() == node_id {
            return Some(self.core());
        }
        self.concepts()
            .iter()
            .find_map(|concept| concept.find_node(node_id))
    }

    /// Visit this node and its descendants depth-first, pre-order.
    /// The callback receives the depth (0 for this node) and the node.
    fn walk(&self, visit: &mut dyn FnMut(usize, &AssessmentCore)) {
        walk_from(self, 0, visit);
    }

    /// Whether any node in this subtree was scored by an observed condition.
    fn contains_observed_assessment(&self) -> bool {
        self.core().contains_observed_assessment_condition()
            || self
                .concepts()
                .iter()
                .any(Assessment::contains_observed_assessment)
    }
}

fn walk_from<A: Assessment + ?Sized>(
    node: &A,
    depth: usize,
    visit: &mut dyn FnMut(usize, &AssessmentCore),
) {
    visit(depth, node.core());
    for concept in node.concepts() {
        walk_from(concept, depth + 1, visit);
    }
}

/// Node ids are scoped to one DKF, so a subtree must not repeat one.
pub(crate) fn ensure_unique_node_ids<A: Assessment + ?Sized>(root: &A) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    let mut duplicate = None;
    root.walk(&mut |_, core| {
        if !seen.insert(core.node_id()) && duplicate.is_none() {
            duplicate = Some(core.node_id());
        }
    });
    match duplicate {
        Some(node_id) => Err(CoreError::invalid(
            "node_id",
            format!("node id {node_id} appears more than once in the same tree"),
        )),
        None => Ok(()),
    }
}
