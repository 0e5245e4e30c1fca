//! TestWorld pattern for declarative integration test setup.
//!
//! Provides:
//! - An isolated corpus directory (`<tmp>/projects`) and output directory (`<tmp>/out`)
//! - A fake inference command wired in through `<out>/config.toml`
//! - CLI execution with the directories passed explicitly

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures;
use crate::inference::{self, FAKE_MODEL, FakeInference};

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use insights_testing::TestWorld;
///
/// let world = TestWorld::new()
///     .with_session("-Users-me-code-app", "s1")
///     .unwrap();
///
/// let result = world.run(&["run", "--no-open"]).unwrap();
/// assert!(result.success());
/// assert_eq!(world.calls().unwrap(), vec!["facets", "report"]);
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    corpus: PathBuf,
    output_dir: PathBuf,
    call_log: PathBuf,
}

impl TestWorld {
    /// Create a new isolated environment with a working fake inference command.
    pub fn new() -> Self {
        Self::try_new(FakeInference::Working).expect("Failed to create test world")
    }

    pub fn try_new(behaviour: FakeInference) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().to_path_buf();
        let corpus = base.join("projects");
        let output_dir = base.join("out");
        std::fs::create_dir_all(&corpus)?;
        std::fs::create_dir_all(&output_dir)?;

        let world = Self {
            call_log: base.join("calls.log"),
            temp_dir,
            corpus,
            output_dir,
        };
        world.install_inference(behaviour)?;
        Ok(world)
    }

    /// Claude Code projects directory (`--sessions-dir`)
    pub fn corpus(&self) -> &Path {
        &self.corpus
    }

    /// Facet cache and report directory (`--output-dir`)
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn facets_dir(&self) -> PathBuf {
        self.output_dir.join("facets")
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Replace the fake inference command and point the config at it.
    ///
    /// Retries use a zero backoff so failing batches do not slow tests down.
    pub fn install_inference(&self, behaviour: FakeInference) -> Result<()> {
        let script = self.temp_dir.path().join("fake-llm");
        inference::install(&script, &self.call_log, behaviour)?;
        self.write_config(&format!(
            "[inference]\ncommand = '{}'\nmodel = '{}'\ntimeout_secs = 30\n\n[retry]\nbackoff_secs = [0]\n",
            script.display(),
            FAKE_MODEL
        ))
    }

    /// Overwrite `<out>/config.toml`
    pub fn write_config(&self, toml: &str) -> Result<()> {
        std::fs::write(self.output_dir.join("config.toml"), toml)?;
        Ok(())
    }

    /// Add a session log with a short conversation dated 2024-02-12.
    pub fn with_session(self, project: &str, session_id: &str) -> Result<Self> {
        self.add_session(project, session_id)?;
        Ok(self)
    }

    pub fn add_session(&self, project: &str, session_id: &str) -> Result<PathBuf> {
        let content = fixtures::conversation(&format!("task {}", session_id), "2024-02-12");
        fixtures::write_log(&self.corpus, project, session_id, &content)
    }

    /// Absolute path of a session log in the corpus
    pub fn session_path(&self, project: &str, session_id: &str) -> PathBuf {
        self.corpus.join(project).join(format!("{}.jsonl", session_id))
    }

    /// Inference calls made so far, in order (`facets`, `report` or `failing`)
    pub fn calls(&self) -> Result<Vec<String>> {
        inference::recorded_calls(&self.call_log)
    }

    /// Configure a CLI command with this test environment's directories.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--sessions-dir")
            .arg(&self.corpus)
            .arg("--output-dir")
            .arg(&self.output_dir)
            .env_remove("RUST_LOG")
            .env_remove("INSIGHTS_SESSIONS_DIR")
            .env_remove("INSIGHTS_OUTPUT_DIR")
            .current_dir(self.temp_dir.path());
        cmd
    }

    /// Execute the `insights` binary with `args` and capture its output.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("insights")
            .map_err(|e| anyhow::anyhow!("Failed to find insights binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
