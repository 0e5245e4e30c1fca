//! Fake inference command.
//!
//! A shell script standing in for the real LLM CLI. It reads the prompt from
//! stdin, appends one line per call to a log (`facets` or `report`) and answers
//! with a JSON envelope:
//! - batch prompts get one facet per `===SESSION_BOUNDARY::<id>===` line
//!   (the `<session_id>` placeholder in the prompt template is skipped)
//! - anything else gets a fenced HTML report

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Behaviour of the fake command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeInference {
    /// Answers every call successfully
    Working,
    /// Exits non-zero on every call
    Failing,
}

/// Model name the fake reports latency for
pub const FAKE_MODEL: &str = "fake-model";

const WORKING_SCRIPT: &str = r#"#!/bin/sh
prompt=$(cat)
if printf '%s\n' "$prompt" | grep -q '^===SESSION_BOUNDARY::'; then
  echo facets >> "__CALL_LOG__"
  records=""
  for id in $(printf '%s\n' "$prompt" | sed -n 's/^===SESSION_BOUNDARY::\([^<>]*\)===$/\1/p'); do
    rec=$(printf '{\\"session_id\\":\\"%s\\",\\"outcome\\":\\"fully_achieved\\",\\"session_type\\":\\"single_task\\",\\"goal_categories\\":{\\"bug_fix\\":1},\\"brief_summary\\":\\"Fixed it\\"}' "$id")
    records="${records:+$records,}$rec"
  done
  printf '{"response":"```json\\n[%s]\\n```","stats":{"models":{"fake-model":{"api":{"totalLatencyMs":2500}}}}}\n' "$records"
else
  echo report >> "__CALL_LOG__"
  printf '{"response":"```html\\n<!DOCTYPE html><html><body>insights report</body></html>\\n```"}\n'
fi
"#;

const FAILING_SCRIPT: &str = r#"#!/bin/sh
cat > /dev/null
echo failing >> "__CALL_LOG__"
echo "quota exceeded" >&2
exit 2
"#;

/// Write the fake command to `path` (mode 0755), logging calls to `call_log`
pub fn install(path: &Path, call_log: &Path, behaviour: FakeInference) -> Result<PathBuf> {
    let template = match behaviour {
        FakeInference::Working => WORKING_SCRIPT,
        FakeInference::Failing => FAILING_SCRIPT,
    };
    let script = template.replace("__CALL_LOG__", &call_log.display().to_string());
    fs::write(path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path.to_path_buf())
}

/// Calls recorded in `call_log`, in order; a missing log means no calls
pub fn recorded_calls(call_log: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(call_log) {
        Ok(text) => Ok(text.lines().map(str::to_string).collect()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}
