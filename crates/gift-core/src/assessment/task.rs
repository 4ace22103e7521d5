use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Assessment, AssessmentCore, ConceptAssessment, ensure_unique_node_ids};
use crate::errors::CoreError;
use crate::validate::Validate;

/// Root of an assessment tree: one task from the DKF and its concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskAssessment {
    #[serde(flatten)]
    core: AssessmentCore,
    #[serde(default)]
    concepts: Vec<ConceptAssessment>,
    #[serde(default)]
    difficulty: Option<f64>,
    #[serde(default)]
    difficulty_reason: Option<String>,
    #[serde(default)]
    stress: Option<f64>,
    #[serde(default)]
    stress_reason: Option<String>,
}

impl TaskAssessment {
    pub const MIN_DIFFICULTY: f64 = 1.0;
    pub const MAX_DIFFICULTY: f64 = 3.0;
    pub const MIN_STRESS: f64 = 0.0;
    pub const MAX_STRESS: f64 = 1.0;

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if a node id repeats anywhere in
    /// the task or its concepts.
    pub fn new(core: AssessmentCore, concepts: Vec<ConceptAssessment>) -> Result<Self, CoreError> {
        let task = Self {
            core,
            concepts,
            difficulty: None,
            difficulty_reason: None,
            stress: None,
            stress_reason: None,
        };
        ensure_unique_node_ids(&task)?;
        Ok(task)
    }

    #[must_use]
    pub const fn difficulty(&self) -> Option<f64> {
        self.difficulty
    }

    /// Set the difficulty, clamping to
    /// [`Self::MIN_DIFFICULTY`, `Self::MAX_DIFFICULTY`]. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` for NaN.
    pub fn set_difficulty(&mut self, difficulty: Option<f64>) -> Result<(), CoreError> {
        self.difficulty = clamp("difficulty", difficulty, Self::MIN_DIFFICULTY, Self::MAX_DIFFICULTY)?;
        Ok(())
    }

    #[must_use]
    pub fn difficulty_reason(&self) -> Option<&str> {
        self.difficulty_reason.as_deref()
    }

    pub fn set_difficulty_reason(&mut self, reason: Option<String>) {
        self.difficulty_reason = reason;
    }

    #[must_use]
    pub const fn stress(&self) -> Option<f64> {
        self.stress
    }

    /// Set the stress, clamping to [`Self::MIN_STRESS`, `Self::MAX_STRESS`].
    /// `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` for NaN.
    pub fn set_stress(&mut self, stress: Option<f64>) -> Result<(), CoreError> {
        self.stress = clamp("stress", stress, Self::MIN_STRESS, Self::MAX_STRESS)?;
        Ok(())
    }

    #[must_use]
    pub fn stress_reason(&self) -> Option<&str> {
        self.stress_reason.as_deref()
    }

    pub fn set_stress_reason(&mut self, reason: Option<String>) {
        self.stress_reason = reason;
    }
}

fn clamp(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<Option<f64>, CoreError> {
    match value {
        Some(v) if v.is_nan() => Err(CoreError::invalid(field, "can't be NaN")),
        Some(v) => Ok(Some(v.clamp(min, max))),
        None => Ok(None),
    }
}

fn in_range(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<(), CoreError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(CoreError::invalid(
            field,
            format!("value of {v} is not between {min} and {max} (inclusive)"),
        )),
        _ => Ok(()),
    }
}

impl Assessment for TaskAssessment {
    fn core(&self) -> &AssessmentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AssessmentCore {
        &mut self.core
    }

    fn concepts(&self) -> &[ConceptAssessment] {
        &self.concepts
    }

    fn concepts_mut(&mut self) -> &mut [ConceptAssessment] {
        &mut self.concepts
    }
}

impl Validate for TaskAssessment {
    fn validate(&self) -> Result<(), CoreError> {
        self.core.validate()?;
        self.concepts.validate()?;
        in_range(
            "difficulty",
            self.difficulty,
            Self::MIN_DIFFICULTY,
            Self::MAX_DIFFICULTY,
        )?;
        in_range("stress", self.stress, Self::MIN_STRESS, Self::MAX_STRESS)?;
        ensure_unique_node_ids(self)
    }
}

impl fmt::Display for TaskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[TaskAssessment: {}", self.core)?;
        if let Some(difficulty) = self.difficulty {
            write!(f, ", difficulty = {difficulty}")?;
        }
        if let Some(stress) = self.stress {
            write!(f, ", stress = {stress}")?;
        }
        f.write_str(", concepts = {")?;
        for concept in &self.concepts {
            write!(f, "{concept}, ")?;
        }
        f.write_str("}]")
    }
}
