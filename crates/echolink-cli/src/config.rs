use echolink_agent::{LlmProvider, ModelConfig};
use echolink_core::{EchoLinkError, EchoLinkResult};
use echolink_outreach::{OperatorContact, PersonaTemplate, TimingPolicy};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level `echolink.toml`.
#[derive(Debug, Deserialize)]
pub struct EchoLinkConfig {
    /// Model for stage classification and reply generation.
    pub model: ModelConfig,
    /// Model for the demo-interest check and operator summary; defaults to `model`.
    #[serde(default)]
    pub summary_model: Option<ModelConfig>,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub calendly: Option<CalendlyConfig>,
    #[serde(default)]
    pub persona: PersonaTemplate,
    #[serde(default)]
    pub timing: TimingPolicy,
    pub operator: OperatorContact,
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Extra `:shortcode:` replacements on top of the built-in table.
    #[serde(default)]
    pub shortcodes: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendlyConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub event_type_uuid: String,
    #[serde(default)]
    pub api_base: Option<String>,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("./dataset.json")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl EchoLinkConfig {
    /// Read, fill secrets from the process environment and validate.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
        })?;
        let mut config = Self::parse(&raw)?;
        config.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        config.validate()?;
        Ok(config)
    }

    pub fn parse(raw: &str) -> EchoLinkResult<Self> {
        toml::from_str(raw).map_err(|e| EchoLinkError::Config(e.to_string()))
    }

    /// Fill secrets left empty in the file. Values already set win.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fill(&mut self.slack.bot_token, lookup("SLACK_TOKEN"));

        fill_model_key(&mut self.model, &lookup);
        if let Some(summary) = self.summary_model.as_mut() {
            fill_model_key(summary, &lookup);
        }

        let calendly_key = lookup("CALENDLY_API_KEY");
        let calendly_event = lookup("CALENDLY_EVENT_UUID");
        if self.calendly.is_none() && calendly_key.is_some() && calendly_event.is_some() {
            self.calendly = Some(CalendlyConfig::default());
        }
        if let Some(calendly) = self.calendly.as_mut() {
            fill(&mut calendly.api_key, calendly_key);
            fill(&mut calendly.event_type_uuid, calendly_event);
        }
    }

    pub fn validate(&self) -> EchoLinkResult<()> {
        self.model.validate()?;
        if let Some(summary) = &self.summary_model {
            summary.validate()?;
        }
        if self.slack.bot_token.is_empty() {
            return Err(EchoLinkError::Config(
                "slack.bot_token is empty and SLACK_TOKEN is not set".into(),
            ));
        }
        if let Some(calendly) = &self.calendly {
            if calendly.api_key.is_empty() || calendly.event_type_uuid.is_empty() {
                return Err(EchoLinkError::Config(
                    "calendly needs both api_key and event_type_uuid".into(),
                ));
            }
        }
        if self.operator.channel_id.is_empty() {
            return Err(EchoLinkError::Config("operator.channel_id is required".into()));
        }
        self.persona.validate()?;
        self.timing.validate()
    }
}

fn fill(slot: &mut String, value: Option<String>) {
    if slot.is_empty() {
        if let Some(v) = value {
            *slot = v;
        }
    }
}

fn fill_model_key(model: &mut ModelConfig, lookup: &impl Fn(&str) -> Option<String>) {
    let var = match model.provider {
        LlmProvider::Azure => "AZURE_OPENAI_API_KEY",
        _ => "OPENAI_API_KEY",
    };
    fill(&mut model.api_key, lookup(var));
    for fallback in &mut model.fallback_models {
        fill_model_key(fallback, lookup);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [model]
        provider = "azure"
        model_id = "gpt-4o"
        api_base_url = "https://example.openai.azure.com"

        [operator]
        name = "Morgan"
        channel_id = "C-OPS"
    "#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_sections() {
        let config = EchoLinkConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.timing, TimingPolicy::default());
        assert_eq!(config.persona.name, "Sophia");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.calendly.is_none());
        assert!(config.summary_model.is_none());
    }

    #[test]
    fn secrets_come_from_env() {
        let mut config = EchoLinkConfig::parse(MINIMAL).unwrap();
        config.apply_env(env(&[
            ("SLACK_TOKEN", "xoxb-1"),
            ("AZURE_OPENAI_API_KEY", "az-key"),
            ("OPENAI_API_KEY", "oa-key"),
            ("CALENDLY_API_KEY", "cal-key"),
            ("CALENDLY_EVENT_UUID", "evt-1"),
        ]));

        assert_eq!(config.slack.bot_token, "xoxb-1");
        assert_eq!(config.model.api_key, "az-key");
        let calendly = config.calendly.as_ref().unwrap();
        assert_eq!(calendly.api_key, "cal-key");
        assert_eq!(calendly.event_type_uuid, "evt-1");
        config.validate().unwrap();
    }

    #[test]
    fn file_values_win_over_env() {
        let raw = format!("{MINIMAL}\n[slack]\nbot_token = \"xoxb-file\"\n");
        let mut config = EchoLinkConfig::parse(&raw).unwrap();
        config.apply_env(env(&[("SLACK_TOKEN", "xoxb-env")]));
        assert_eq!(config.slack.bot_token, "xoxb-file");
    }

    #[test]
    fn missing_slack_token_is_rejected() {
        let mut config = EchoLinkConfig::parse(MINIMAL).unwrap();
        config.apply_env(env(&[("AZURE_OPENAI_API_KEY", "az-key")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SLACK_TOKEN"));
    }

    #[test]
    fn unordered_timing_is_rejected() {
        let raw = format!(
            "{MINIMAL}\n[timing]\nunresponsive_after_secs = 2000\nhard_deadline_secs = 1500\n"
        );
        let mut config = EchoLinkConfig::parse(&raw).unwrap();
        config.apply_env(env(&[("SLACK_TOKEN", "x"), ("AZURE_OPENAI_API_KEY", "k")]));
        assert!(matches!(config.validate(), Err(EchoLinkError::Config(_))));
    }

    #[test]
    fn half_configured_calendly_is_rejected() {
        let raw = format!("{MINIMAL}\n[calendly]\napi_key = \"cal\"\n");
        let mut config = EchoLinkConfig::parse(&raw).unwrap();
        config.apply_env(env(&[("SLACK_TOKEN", "x"), ("AZURE_OPENAI_API_KEY", "k")]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_stage_note_key_is_rejected() {
        let raw = format!("{MINIMAL}\n[persona.stage_notes]\nend = \"bye\"\n");
        let mut config = EchoLinkConfig::parse(&raw).unwrap();
        config.apply_env(env(&[("SLACK_TOKEN", "x"), ("AZURE_OPENAI_API_KEY", "k")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stage_notes"));
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = EchoLinkConfig::load(&tmp.path().join("nope.toml")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
