//! Configuration for code-explainer runs.
//!
//! Load order: `.code-explainer/config.toml` → environment variables → defaults.
//! Command-line flags override whatever this produces.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".code-explainer";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    /// Default input document (falls back to the loader's built-in path).
    pub input: Option<PathBuf>,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

/// LLM service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "anthropic".
    pub provider: String,
    /// Model name; unset means the provider's own default.
    pub model: Option<String>,
    /// Override for OpenAI-compatible endpoints (proxies, local servers).
    pub base_url: Option<String>,
    pub max_tokens: u32,
    /// Global timeout for a single request, in seconds.
    pub timeout_secs: u64,
}

/// Where and how results are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
}

/// File format written to the output path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: '{}'", other)),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            base_url: None,
            max_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("outputs/analysis.md"),
            format: OutputFormat::Markdown,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

/// Path of the config file under `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

impl ExplainerConfig {
    /// Load config from `.code-explainer/config.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let path = config_path(root);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        env_override("EXPLAINER_PROVIDER", &mut self.llm.provider);
        env_override("EXPLAINER_MAX_TOKENS", &mut self.llm.max_tokens);
        env_override("EXPLAINER_TIMEOUT_SECS", &mut self.llm.timeout_secs);
        env_override("EXPLAINER_OUTPUT", &mut self.output.path);
        env_override_opt("EXPLAINER_MODEL", &mut self.llm.model);
        env_override_opt("EXPLAINER_BASE_URL", &mut self.llm.base_url);
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be greater than 0");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// Environment variable holding the API key for the configured provider.
    pub fn api_key_var(&self) -> &'static str {
        api_key_var(&self.llm.provider)
    }
}

/// Environment variable holding the API key for `provider`.
pub fn api_key_var(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "ANTHROPIC_API_KEY",
        _ => "OPENAI_API_KEY",
    }
}

/// Like [`env_override`] for optional string fields; empty values are ignored.
fn env_override_opt(var: &str, target: &mut Option<String>) {
    if let Ok(v) = std::env::var(var)
        && !v.is_empty()
    {
        *target = Some(v);
    }
}
