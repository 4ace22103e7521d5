use gift_config::GiftConfig;

/// Log a warning for every config section that looks unset while env vars
/// aimed at it are missing the `__` separator figment splits on.
pub fn warn_unconfigured(config: &GiftConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &GiftConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if config.require_lms().is_err() && has_misnamed_env(&env_keys, "GIFT_LMS") {
        warnings.push(
            "LMS config appears default while GIFT_LMS* env vars exist. Use double underscores (example: GIFT_LMS__CONNECTION_NAMES)."
                .to_string(),
        );
    }

    let tutor = &config.tutor;
    if !tutor.chat_bypass_allowed
        && tutor.feedback_display_duration_ms.is_none()
        && has_misnamed_env(&env_keys, "GIFT_TUTOR")
    {
        warnings.push(
            "Tutor config appears default while GIFT_TUTOR* env vars exist. Use double underscores (example: GIFT_TUTOR__CHAT_BYPASS_ALLOWED)."
                .to_string(),
        );
    }

    warnings
}

/// Keys under `prefix` that figment won't map onto the section.
///
/// A well-formed `GIFT_TUTOR__CHAT_BYPASS_ALLOWED=false` already reached the
/// config, even though it leaves the section at its defaults.
fn has_misnamed_env(keys: &[String], prefix: &str) -> bool {
    let section = format!("{prefix}__");
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&section))
}

#[cfg(test)]
mod tests {
    use gift_config::GiftConfig;

    use super::collect_unconfigured_warnings;

    #[test]
    fn warns_for_unconfigured_sections_with_env_prefixes() {
        let warnings = collect_unconfigured_warnings(
            &GiftConfig::default(),
            vec![
                ("GIFT_LMS_CONNECTION_NAMES".to_string(), "Local".to_string()),
                ("GIFT_TUTOR_CHAT_BYPASS_ALLOWED".to_string(), "true".to_string()),
            ],
        );

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("GIFT_LMS__"));
    }

    #[test]
    fn does_not_warn_when_sections_are_configured() {
        let mut config = GiftConfig::default();
        config.lms.connection_names = vec!["Local LMS".to_string()];
        config.tutor.feedback_display_duration_ms = Some(3000);

        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("GIFT_LMS__CONNECTION_NAMES".to_string(), "Local LMS".to_string()),
                ("GIFT_TUTOR__FEEDBACK_DISPLAY_DURATION_MS".to_string(), "3000".to_string()),
            ],
        );

        assert!(warnings.is_empty());
    }

    #[test]
    fn well_formed_env_at_default_value_does_not_warn() {
        let warnings = collect_unconfigured_warnings(
            &GiftConfig::default(),
            vec![
                ("GIFT_TUTOR__CHAT_BYPASS_ALLOWED".to_string(), "false".to_string()),
                ("GIFT_LMS__DEFAULT_PAGE_SIZE".to_string(), "25".to_string()),
            ],
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn misnamed_key_warns_even_next_to_a_well_formed_one() {
        let warnings = collect_unconfigured_warnings(
            &GiftConfig::default(),
            vec![
                ("GIFT_TUTOR__CHAT_BYPASS_ALLOWED".to_string(), "false".to_string()),
                ("GIFT_TUTOR_FEEDBACK_DISPLAY_DURATION_MS".to_string(), "3000".to_string()),
            ],
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("GIFT_TUTOR__"));
    }

    #[test]
    fn ignores_unrelated_env() {
        let warnings = collect_unconfigured_warnings(
            &GiftConfig::default(),
            vec![("GIFT_LOG".to_string(), "debug".to_string())],
        );
        assert!(warnings.is_empty());
    }
}
