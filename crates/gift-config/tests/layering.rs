//! Integration tests for layered configuration loading.
//!
//! Uses `figment::Jail` for sandboxed working directory and env var changes.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use gift_config::{ConfigError, GiftConfig, PROJECT_CONFIG_PATH};
use gift_core::enums::DeploymentMode;
use pretty_assertions::assert_eq;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[general]
deployment_mode = "server"
default_limit = 50

[lms]
connection_names = ["Local LMS", "Remote LMS"]
default_page_size = 10

[tutor]
chat_bypass_allowed = true
feedback_display_duration_ms = 4000
"#,
        )?;

        let config: GiftConfig = Figment::from(Serialized::defaults(GiftConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.general.deployment_mode, DeploymentMode::Server);
        assert_eq!(config.general.default_limit, 50);
        assert_eq!(config.lms.connection_names, vec!["Local LMS", "Remote LMS"]);
        assert_eq!(config.lms.default_page_size, 10);
        assert!(config.lms.is_configured());
        assert!(config.tutor.chat_bypass_allowed);
        assert_eq!(config.tutor.feedback_display_duration_ms, Some(4000));
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gift")?;
        jail.create_file(
            PROJECT_CONFIG_PATH,
            r#"
[general]
deployment_mode = "simple"
"#,
        )?;

        let config = GiftConfig::load().expect("config loads");
        assert_eq!(config.general.deployment_mode, DeploymentMode::Simple);
        assert_eq!(config.general.default_limit, 20);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gift")?;
        jail.create_file(
            PROJECT_CONFIG_PATH,
            r#"
[general]
deployment_mode = "simple"
default_limit = 5
"#,
        )?;
        jail.set_env("GIFT_GENERAL__DEPLOYMENT_MODE", "experiment");

        let config = GiftConfig::load().expect("config loads");
        assert_eq!(config.general.deployment_mode, DeploymentMode::Experiment);
        assert_eq!(config.general.default_limit, 5);
        Ok(())
    });
}

#[test]
fn env_sets_nested_values() {
    Jail::expect_with(|jail| {
        jail.set_env("GIFT_LMS__DEFAULT_PAGE_SIZE", "0");
        jail.set_env("GIFT_TUTOR__CHAT_BYPASS_ALLOWED", "true");

        let config = GiftConfig::load().expect("config loads");
        assert_eq!(config.lms.default_page_size, 0);
        assert!(config.tutor.chat_bypass_allowed);
        Ok(())
    });
}

#[test]
fn unknown_deployment_mode_fails_to_load() {
    Jail::expect_with(|jail| {
        jail.set_env("GIFT_GENERAL__DEPLOYMENT_MODE", "cloud");
        assert!(matches!(GiftConfig::load(), Err(ConfigError::Figment(_))));
        Ok(())
    });
}

#[test]
fn zero_default_limit_is_rejected_on_load() {
    Jail::expect_with(|jail| {
        jail.set_env("GIFT_GENERAL__DEFAULT_LIMIT", "0");
        assert!(matches!(
            GiftConfig::load(),
            Err(ConfigError::InvalidValue { .. })
        ));
        Ok(())
    });
}
