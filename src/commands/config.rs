use crate::config::{Config, ConfigOverrides, Settings, mask};
use crate::context::Context;
use anyhow::Result;
use std::path::Path;

/// Handles the 'config' command - shows the resolved settings, secrets masked
pub struct ConfigCommand;

impl ConfigCommand {
    pub fn execute(
        ctx: &Context,
        env_file: &Path,
        overrides: &ConfigOverrides,
        settings: &Settings,
    ) -> Result<()> {
        ctx.output.section("Configuration");
        let source = if env_file.exists() {
            env_file.display().to_string()
        } else {
            format!("{} (not found)", env_file.display())
        };
        ctx.output.key_value("Env file", &source);

        match Config::resolve(overrides, settings) {
            Ok(config) => {
                ctx.output.key_value_highlight("URL", config.base_url.as_str());
                ctx.output.key_value("User", &config.user);
                ctx.output
                    .key_value("Password", &mask("password", &config.password));
                ctx.output
                    .key_value("Timeout", &format!("{}s", config.timeout.as_secs()));
            }
            Err(e) => ctx.output.warning(&e.to_string()),
        }

        ctx.output.subsection("Mailer");
        let mailer = settings.mailer();
        if mailer.is_empty() {
            ctx.output.dimmed("No MAUTIC_MAILER_* settings found");
        }
        for (key, value) in &mailer {
            ctx.output.key_value(key, value);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockOutput, MockUserInput, OutputMessage};
    use std::sync::Arc;

    fn settings(items: &[(&str, &str)]) -> Settings {
        Settings::from_sources(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
            Vec::new(),
        )
    }

    fn run(overrides: &ConfigOverrides, settings: &Settings) -> Arc<MockOutput> {
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(Arc::new(MockUserInput::new()), output.clone());
        ConfigCommand::execute(&ctx, Path::new("/nonexistent/.mautic_env"), overrides, settings)
            .unwrap();
        output
    }

    #[test]
    fn test_shows_resolved_settings_with_masked_secrets() {
        let settings = settings(&[
            ("MAUTIC_URL", "http://localhost:8001"),
            ("MAUTIC_USER", "admin"),
            ("MAUTIC_PASSWORD", "secret"),
            ("MAUTIC_MAILER_HOST", "smtp.sendgrid.net"),
            ("MAUTIC_MAILER_PASSWORD", "SG.key"),
        ]);
        let output = run(&ConfigOverrides::default(), &settings);

        assert!(output.contains_message(&OutputMessage::KeyValue(
            "Password".to_string(),
            "******".to_string()
        )));
        assert!(output.contains_message(&OutputMessage::KeyValue(
            "MAUTIC_MAILER_PASSWORD".to_string(),
            "******".to_string()
        )));
        assert!(output.contains_message(&OutputMessage::KeyValue(
            "MAUTIC_MAILER_HOST".to_string(),
            "smtp.sendgrid.net".to_string()
        )));
        assert!(!output.to_text().contains("secret"));
        assert!(!output.to_text().contains("SG.key"));
    }

    #[test]
    fn test_missing_settings_are_warned_not_fatal() {
        let output = run(&ConfigOverrides::default(), &Settings::default());
        let text = output.to_text();
        assert!(text.contains("MAUTIC_URL"));
        assert!(text.contains("(not found)"));
        assert!(text.contains("No MAUTIC_MAILER_* settings found"));
    }
}
