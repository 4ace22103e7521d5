use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Assessment, AssessmentCore};
use crate::errors::CoreError;
use crate::validate::Validate;

/// A concept node: either a leaf or an intermediate node with children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConceptAssessment {
    Concept(AssessmentCore),
    Intermediate(IntermediateConceptAssessment),
}

impl ConceptAssessment {
    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        matches!(self, Self::Intermediate(_))
    }
}

impl From<AssessmentCore> for ConceptAssessment {
    fn from(core: AssessmentCore) -> Self {
        Self::Concept(core)
    }
}

impl From<IntermediateConceptAssessment> for ConceptAssessment {
    fn from(intermediate: IntermediateConceptAssessment) -> Self {
        Self::Intermediate(intermediate)
    }
}

impl Assessment for ConceptAssessment {
    fn core(&self) -> &AssessmentCore {
        match self {
            Self::Concept(core) => core,
            Self::Intermediate(intermediate) => intermediate.core(),
        }
    }

    fn core_mut(&mut self) -> &mut AssessmentCore {
        match self {
            Self::Concept(core) => core,
            Self::Intermediate(intermediate) => intermediate.core_mut(),
        }
    }

    fn concepts(&self) -> &[ConceptAssessment] {
        match self {
            Self::Concept(_) => &[],
            Self::Intermediate(intermediate) => intermediate.concepts(),
        }
    }

    fn concepts_mut(&mut self) -> &mut [ConceptAssessment] {
        match self {
            Self::Concept(_) => &mut [],
            Self::Intermediate(intermediate) => intermediate.concepts_mut(),
        }
    }
}

impl Validate for ConceptAssessment {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Concept(core) => core.validate(),
            Self::Intermediate(intermediate) => intermediate.validate(),
        }
    }
}

impl fmt::Display for ConceptAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concept(core) => write!(f, "[ConceptAssessment: {core}]"),
            Self::Intermediate(intermediate) => fmt::Display::fmt(intermediate, f),
        }
    }
}

/// A concept that is itself broken down into one or more sub-concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntermediateConceptAssessment {
    #[serde(flatten)]
    core: AssessmentCore,
    concepts: Vec<ConceptAssessment>,
}

impl IntermediateConceptAssessment {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `concepts` is empty.
    pub fn new(core: AssessmentCore, concepts: Vec<ConceptAssessment>) -> Result<Self, CoreError> {
        if concepts.is_empty() {
            return Err(CoreError::invalid(
                "concepts",
                "an intermediate concept needs at least one child concept",
            ));
        }
        Ok(Self { core, concepts })
    }
}

impl Assessment for IntermediateConceptAssessment {
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

impl Validate for IntermediateConceptAssessment {
    fn validate(&self) -> Result<(), CoreError> {
        self.core.validate()?;
        if self.concepts.is_empty() {
            return Err(CoreError::invalid(
                "concepts",
                format!("intermediate concept {} has no child concepts", self.core.node_id()),
            ));
        }
        self.concepts.validate()
    }
}

impl fmt::Display for IntermediateConceptAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[IntermediateConceptAssessment: {}, concepts = {{", self.core)?;
        for concept in &self.concepts {
            write!(f, "{concept}, ")?;
        }
        f.write_str("}]")
    }
}
