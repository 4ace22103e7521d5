use gift_config::GiftConfig;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `gift config`. Raw output is TOML, ready to paste into
/// `.gift/config.toml`.
pub fn handle(flags: &GlobalFlags, config: &GiftConfig) -> anyhow::Result<()> {
    if flags.format == OutputFormat::Raw {
        print!("{}", render_toml(config)?);
        return Ok(());
    }
    output(config, flags.format)
}

fn render_toml(config: &GiftConfig) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_output_parses_back() {
        let mut config = GiftConfig::default();
        config.lms.connection_names = vec!["Local LMS".into()];
        let rendered = render_toml(&config).unwrap();
        assert!(rendered.contains("[general]"));
        assert!(rendered.contains("deployment_mode = \"desktop\""));

        let parsed: GiftConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.lms.connection_names, vec!["Local LMS"]);
    }
}
