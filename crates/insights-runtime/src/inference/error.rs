use std::fmt;
use std::time::Duration;

/// Why an inference call produced no usable envelope.
///
/// Every variant is transient from the pipeline's point of view: the batch is
/// retried and abandoned only after the retry budget is spent.
#[derive(Debug)]
pub enum InferenceError {
    /// The command could not be started
    Spawn(std::io::Error),

    /// Writing the prompt or reading the output failed
    Io(std::io::Error),

    /// The command exited unsuccessfully (`code` is `None` when killed by a signal)
    NonZeroExit { code: Option<i32>, stderr: String },

    /// The command succeeded but wrote nothing
    EmptyOutput,

    /// Output was not a `{"response": ...}` envelope
    MalformedEnvelope(String),

    /// The command ran past its deadline and was killed
    Timeout(Duration),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Spawn(err) => write!(f, "failed to start command: {}", err),
            InferenceError::Io(err) => write!(f, "IO error: {}", err),
            InferenceError::NonZeroExit { code, stderr } => match code {
                Some(code) => write!(f, "Exit code {}: {}", code, stderr),
                None => write!(f, "Terminated by signal: {}", stderr),
            },
            InferenceError::EmptyOutput => write!(f, "Empty stdout"),
            InferenceError::MalformedEnvelope(msg) => write!(f, "JSON parse error: {}", msg),
            InferenceError::Timeout(after) => write!(f, "Timeout ({}s)", after.as_secs()),
        }
    }
}

impl std::error::Error for InferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InferenceError::Spawn(err) | InferenceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for InferenceError {
    fn from(err: std::io::Error) -> Self {
        InferenceError::Io(err)
    }
}
