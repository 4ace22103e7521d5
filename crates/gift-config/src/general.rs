//! General application configuration.

use gift_core::CoreError;
use gift_core::enums::DeploymentMode;
use serde::{Deserialize, Serialize};

/// Default row limit for listing commands.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// How this GIFT instance is deployed.
    #[serde(default)]
    pub deployment_mode: DeploymentMode,

    /// Default row limit for listing commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            deployment_mode: DeploymentMode::default(),
            default_limit: default_limit(),
        }
    }
}

impl GeneralConfig {
    /// Fail unless the configured deployment mode is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DeploymentMode` naming the configured mode.
    pub fn require_mode(&self, allowed: &[DeploymentMode]) -> Result<(), CoreError> {
        if allowed.contains(&self.deployment_mode) {
            return Ok(());
        }
        let allowed: Vec<&str> = allowed.iter().map(|mode| mode.as_str()).collect();
        Err(CoreError::DeploymentMode {
            mode: self.deployment_mode.to_string(),
            reason: format!("only allowed in: {}", allowed.join(", ")),
        })
    }
}
