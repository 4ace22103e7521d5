//! # gift-config
//!
//! Layered configuration loading for GIFT tools using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GIFT_*` prefix, `__` as separator)
//! 2. Project-level `.gift/config.toml`
//! 3. User-level `~/.config/gift/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GIFT_GENERAL__DEPLOYMENT_MODE` -> `general.deployment_mode`,
//! `GIFT_LMS__DEFAULT_PAGE_SIZE` -> `lms.default_page_size`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use gift_config::GiftConfig;
//!
//! let config = GiftConfig::load_with_dotenv().expect("config");
//! if config.lms.is_configured() {
//!     println!("LMS connections: {:?}", config.lms.connection_names);
//! }
//! ```

mod error;
mod general;
mod lms;
mod tutor;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use lms::LmsConfig;
pub use tutor::TutorConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".gift/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GiftConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub lms: LmsConfig,
    #[serde(default)]
    pub tutor: TutorConfig,
}

impl GiftConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source can't be read or a value has
    /// the wrong type, and `ConfigError::InvalidValue` for out-of-range values.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(PROJECT_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("GIFT_").split("__"))
    }

    /// Reject values that parse but can't be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        if let Some(name) = self
            .lms
            .connection_names
            .iter()
            .find(|name| name.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "lms.connection_names".into(),
                reason: format!("blank connection name {name:?}"),
            });
        }
        Ok(())
    }

    /// The LMS section, if any connection is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when no connection names are set.
    pub fn require_lms(&self) -> Result<&LmsConfig, ConfigError> {
        if self.lms.is_configured() {
            Ok(&self.lms)
        } else {
            Err(ConfigError::NotConfigured {
                section: "lms".into(),
            })
        }
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gift").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory. Does nothing if none exists.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
