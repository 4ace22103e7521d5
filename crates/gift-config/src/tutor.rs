//! Tutor display configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TutorConfig {
    /// Whether chat windows may offer the learner a way to skip them.
    #[serde(default)]
    pub chat_bypass_allowed: bool,

    /// How long feedback stays up, in milliseconds. Unset leaves it to the tutor.
    #[serde(default)]
    pub feedback_display_duration_ms: Option<u64>,
}
