use insights_types::truncate_chars;
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{Envelope, InferenceBackend, InferenceError};
use crate::InferenceConfig;

/// Characters of stderr kept in a [`InferenceError::NonZeroExit`]
pub const STDERR_EXCERPT_CHARS: usize = 500;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long output readers get to finish after a timed-out child is killed
const READER_GRACE: Duration = Duration::from_millis(500);

/// Runs an external CLI as `<program> -m <model> -p "" -o json` with the prompt on stdin.
///
/// The prompt is written to a temporary file first and the file is handed to
/// the child as its stdin, so prompt size is not bounded by argument or pipe
/// limits. The file is removed when the call returns.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: PathBuf,
    model: String,
    timeout: Duration,
}

impl CommandBackend {
    pub fn new(program: impl Into<PathBuf>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
            timeout,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(&config.command, &config.model, config.timeout())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn spawn(&self, stdin: std::fs::File) -> Result<Child, InferenceError> {
        Command::new(&self.program)
            .args([
                OsStr::new("-m"),
                OsStr::new(&self.model),
                OsStr::new("-p"),
                OsStr::new(""),
                OsStr::new("-o"),
                OsStr::new("json"),
            ])
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(InferenceError::Spawn)
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<ExitStatus, InferenceError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InferenceError::Timeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl InferenceBackend for CommandBackend {
    fn model(&self) -> &str {
        &self.model
    }

    fn invoke(&self, prompt: &str) -> Result<Envelope, InferenceError> {
        let mut prompt_file = tempfile::Builder::new()
            .prefix("insights-prompt-")
            .suffix(".txt")
            .tempfile()?;
        prompt_file.write_all(prompt.as_bytes())?;
        prompt_file.flush()?;

        let mut child = self.spawn(prompt_file.reopen()?)?;
        tracing::debug!(
            program = %self.program.display(),
            prompt_bytes = prompt.len(),
            pid = child.id(),
            "inference command started"
        );

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait_with_deadline(&mut child) {
            Ok(status) => status,
            Err(err) => {
                release([stdout, stderr]);
                return Err(err);
            }
        };
        let stdout = collect(stdout)?;
        let stderr = collect(stderr)?;

        if !status.success() {
            let stderr = stderr.trim();
            let excerpt = if stderr.is_empty() {
                "(no stderr)".to_string()
            } else {
                truncate_chars(stderr, STDERR_EXCERPT_CHARS).to_string()
            };
            return Err(InferenceError::NonZeroExit {
                code: status.code(),
                stderr: excerpt,
            });
        }

        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Err(InferenceError::EmptyOutput);
        }

        serde_json::from_str(stdout).map_err(|e| InferenceError::MalformedEnvelope(e.to_string()))
    }
}

type Reader = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

/// Read a child pipe to the end on its own thread so a chatty child cannot block on a full pipe
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Reader {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(reader: Reader) -> Result<String, InferenceError> {
    let Some(handle) = reader else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| InferenceError::Io(std::io::Error::other("output reader panicked")))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Join readers that finish within [`READER_GRACE`] and detach the rest.
///
/// A grandchild that inherited the pipes keeps them open after the child is
/// killed; its readers stay parked until that process exits.
fn release(readers: [Reader; 2]) {
    let deadline = Instant::now() + READER_GRACE;
    for handle in readers.into_iter().flatten() {
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
        }
        if handle.is_finished() {
            let _ = handle.join();
        } else {
            tracing::debug!("output reader still blocked after kill, detaching");
        }
    }
}

/// Locate an executable: a path is checked directly, a bare name is searched on `PATH`
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|p| is_executable(p))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
