pub mod open;
pub mod projects;
pub mod report;
pub mod run;

use anyhow::Result;
use insights_runtime::{CommandBackend, Config, Error, resolve_program};
use std::path::Path;

/// Resolve the configured inference executable or fail with an install hint
pub(crate) fn inference_backend(config: &Config, output_dir: &Path) -> Result<CommandBackend> {
    let command = &config.inference.command;
    let program = resolve_program(command).ok_or_else(|| {
        Error::MissingDependency(format!(
            "'{}' not found.\n\n\
             Install the Gemini CLI with:\n  npm install -g @google/gemini-cli\n\n\
             Then authenticate:\n  gemini\n\n\
             Or point [inference] command at another executable in {}",
            command,
            Config::path_in(output_dir).display()
        ))
    })?;
    tracing::debug!(program = %program.display(), "inference command resolved");

    Ok(CommandBackend::new(
        program,
        &config.inference.model,
        config.inference.timeout(),
    ))
}
