use anyhow::Result;
use insights_core::{resolve_output_dir, resolve_sessions_dir};
use insights_index::FacetStore;
use insights_runtime::{Config, Prompts};
use is_terminal::IsTerminal;
use std::path::{Path, PathBuf};

/// Resolved directories and output settings shared by every command
pub struct ExecutionContext {
    sessions_dir: PathBuf,
    output_dir: PathBuf,
    pub color: bool,
}

impl ExecutionContext {
    pub fn new(sessions_dir: Option<&str>, output_dir: Option<&str>) -> Result<Self> {
        Ok(Self {
            sessions_dir: resolve_sessions_dir(sessions_dir)?,
            output_dir: resolve_output_dir(output_dir)?,
            color: std::io::stdout().is_terminal(),
        })
    }

    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn store(&self) -> FacetStore {
        FacetStore::for_output_dir(&self.output_dir)
    }

    /// `<output_dir>/config.toml`, or the defaults when absent
    pub fn config(&self) -> Result<Config> {
        Ok(Config::load_from(&Config::path_in(&self.output_dir))?)
    }

    pub fn prompts(&self, config: &Config) -> Result<Prompts> {
        Ok(Prompts::load(config.prompts_dir.as_deref())?)
    }
}
