use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use insights_engine::BatchLimits;

/// File name of the optional config inside the output directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// External command that turns a prompt into a response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Executable name (looked up on `PATH`) or path
    pub command: String,
    /// Passed to the command as `-m <model>`
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            command: "gemini".to_string(),
            model: "gemini-2.5-pro".to_string(),
            timeout_secs: 300,
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per batch, including the first
    pub max_attempts: u32,
    /// Delay before attempt N+1 is `backoff_secs[N-1]`; the last entry repeats
    pub backoff_secs: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: vec![30, 60, 120],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub batch: BatchLimits,
    /// Directory whose `facet_prompt.txt` / `report_prompt.txt` replace the bundled prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
}

impl Config {
    /// `<output_dir>/config.toml`
    pub fn path_in(output_dir: &Path) -> PathBuf {
        output_dir.join(CONFIG_FILE_NAME)
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.inference.command.trim().is_empty() {
            return Err(Error::Config("inference.command must not be empty".to_string()));
        }
        if self.inference.timeout_secs == 0 {
            return Err(Error::Config("inference.timeout_secs must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.max_attempts must be at least 1".to_string()));
        }
        if self.batch.max_sessions == 0 {
            return Err(Error::Config("batch.max_sessions must be at least 1".to_string()));
        }
        if self.batch.oversize_chars > self.batch.max_chars {
            return Err(Error::Config(
                "batch.oversize_chars must not exceed batch.max_chars".to_string(),
            ));
        }
        Ok(())
    }
}
