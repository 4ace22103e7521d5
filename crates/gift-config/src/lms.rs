//! LMS connection configuration.

use serde::{Deserialize, Serialize};

/// Default number of course records per page.
const fn default_page_size() -> u32 {
    25
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LmsConfig {
    /// Names of the LMS connections to query, in priority order.
    #[serde(default)]
    pub connection_names: Vec<String>,

    /// Page size used when a data request does not set one. Zero means no limit.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            connection_names: Vec::new(),
            default_page_size: default_page_size(),
        }
    }
}

impl LmsConfig {
    /// At least one non-blank connection name is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.connection_names
            .iter()
            .any(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = LmsConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.default_page_size, 25);
    }

    #[test]
    fn blank_names_do_not_count() {
        let config = LmsConfig {
            connection_names: vec!["  ".into()],
            ..LmsConfig::default()
        };
        assert!(!config.is_configured());
    }
}
