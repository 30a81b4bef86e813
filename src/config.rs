use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkillConfig {
    pub application_id: String,
    pub feed_url: String,
    pub source_name: String,
    pub help_text: String,
    pub help_reprompt: String,
    pub goodbye_text: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub max_feed_bytes: usize,
}

impl Default for SkillConfig {
    fn default() -> Self {
        SkillConfig {
            application_id: "amzn1.echo-sdk-ams.app.d0dd1b18-30b9-4a4b-8f20-256ba64abcae".into(),
            feed_url: "http://feeds.feedburner.com/avc".into(),
            source_name: "AVC".into(),
            help_text: "You can ask AVC to read a post from Fred Wilson's blog or, you can say exit... What can I help you with?".into(),
            help_reprompt: "What can I help you with?".into(),
            goodbye_text: "Goodbye".into(),
            user_agent: "avc-skill/0.1".into(),
            connect_timeout_secs: 5,
            timeout_secs: 20,
            // 5 MB cap
            max_feed_bytes: 5 * 1024 * 1024,
        }
    }
}

impl SkillConfig {
    /// The single user-facing message for every fetch failure.
    pub fn apology(&self) -> String {
        format!(
            "Sorry. I had some issue accessing {}! Please try again later.",
            self.source_name
        )
    }
}

pub fn load(config_override: Option<String>) -> Result<SkillConfig> {
    let Some(path_str) = config_override else {
        // Built-in defaults
        return Ok(SkillConfig::default());
    };

    let p = PathBuf::from(&path_str);
    if !p.is_file() {
        bail!("config file not found: {}", path_str);
    }
    let txt = fs::read_to_string(&p)
        .with_context(|| format!("failed to read config: {}", path_str))?;
    parse(&txt).with_context(|| format!("failed to parse toml: {}", path_str))
}

fn parse(txt: &str) -> Result<SkillConfig> {
    let parsed: SkillConfig = toml::from_str(txt)?;
    Ok(parsed)
}
