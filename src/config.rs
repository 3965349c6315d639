//! TOML configuration.
//!
//! Every section is optional. When the config file does not exist the
//! built-in defaults from [`Config::minimal`] are used, so `smx rank` works
//! without any setup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::scoring::WeightConfig;
use crate::skills::Vocabulary;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkillsConfig {
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    /// Turn a résumé that fails extraction into an error row instead of
    /// aborting the batch.
    #[serde(default = "default_isolate_failures")]
    pub isolate_failures: bool,
    #[serde(default = "default_max_resume_bytes")]
    pub max_resume_bytes: usize,
}

fn default_isolate_failures() -> bool {
    true
}
fn default_max_resume_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            isolate_failures: default_isolate_failures(),
            max_resume_bytes: default_max_resume_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Built-in defaults: weights 20/50/30 and the default skill vocabulary.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((name, value)) = self.weights.invalid_weight() {
            anyhow::bail!("weights.{} must be a non-negative number, got {}", name, value);
        }

        if self.skills.vocabulary.is_empty() {
            anyhow::bail!("skills.vocabulary must contain at least one term");
        }

        if self.ranking.max_resume_bytes == 0 {
            anyhow::bail!("ranking.max_resume_bytes must be > 0");
        }

        Ok(())
    }
}

/// Parses and validates configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Loads the config at `path`, falling back to defaults when it is absent.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Commented example written by `smx init`.
pub const EXAMPLE_CONFIG: &str = r#"# SelectMatrix configuration.

# Percentage weights for the three sub-scores. `smx rank` refuses to run
# unless they add up to 100; CLI flags override these values.
[weights]
similarity = 20
skill = 50
experience = 30

# Terms are matched case-insensitively as whole tokens made of
# letters, digits, '+', '#' and '.'. Multi-word terms never match.
[skills]
vocabulary = ["python", "java", "c++", "tensorflow", "aws", "docker", "react", "nlp", "sql"]

[ranking]
# Record unreadable résumés as error rows and keep going.
isolate_failures = true
max_resume_bytes = 20971520

[server]
bind = "127.0.0.1:7340"
"#;
