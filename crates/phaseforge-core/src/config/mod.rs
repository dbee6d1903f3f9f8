//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Phaseforge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub research: ResearchConfig,
    pub github: GithubConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// MediaWiki API endpoint used for search and extracts
    pub endpoint: String,
    /// Research summaries are truncated to this many characters
    pub summary_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// GitHub REST API base URL (anonymous access, public repos only)
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path of the session state document. Relative paths resolve against
    /// the working directory of the server process.
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                model: "llama-3.3-70b-versatile".to_string(),
                temperature: 0.7,
                max_tokens: 2048,
                timeout_secs: 120,
            },
            research: ResearchConfig {
                endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
                summary_limit: 500,
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
            },
            state: StateConfig {
                path: PathBuf::from("state.json"),
            },
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Config::default().llm
    }
}

impl LlmConfig {
    /// Resolve the API key from the environment.
    ///
    /// Keys are never read from or written to the config file.
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("PHASEFORGE_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .ok())
    }

    /// Resolve the API key and redact it for logging
    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key()
            .map(|opt| opt.map(|key| redact(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "LLM API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("PHASEFORGE_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("phaseforge")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.llm.enforce_env_only()?;

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be greater than 0"));
        }
        if self.research.summary_limit == 0 {
            return Err(anyhow!("research.summary_limit must be greater than 0"));
        }

        Ok(())
    }
}

/// Keep only the last four characters of a key for log output
fn redact(key: &str) -> String {
    if key.len() <= 4 {
        "***".to_string()
    } else {
        let suffix = &key[key.len() - 4..];
        format!("***{}", suffix)
    }
}
