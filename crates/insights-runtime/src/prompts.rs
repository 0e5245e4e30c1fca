use std::path::Path;

use crate::Result;

const BUNDLED_FACET_PROMPT: &str = include_str!("../prompts/facet_prompt.txt");
const BUNDLED_REPORT_PROMPT: &str = include_str!("../prompts/report_prompt.txt");

pub const FACET_PROMPT_FILE: &str = "facet_prompt.txt";
pub const REPORT_PROMPT_FILE: &str = "report_prompt.txt";

/// Prompt templates for the two inference calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub facet: String,
    pub report: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            facet: BUNDLED_FACET_PROMPT.to_string(),
            report: BUNDLED_REPORT_PROMPT.to_string(),
        }
    }
}

impl Prompts {
    /// Bundled prompts, each replaced by its file in `dir` when that file exists
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut prompts = Self::default();
        let Some(dir) = dir else {
            return Ok(prompts);
        };

        for (file, slot) in [
            (FACET_PROMPT_FILE, &mut prompts.facet),
            (REPORT_PROMPT_FILE, &mut prompts.report),
        ] {
            let path = dir.join(file);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using prompt override");
                *slot = std::fs::read_to_string(&path)?;
            }
        }

        Ok(prompts)
    }
}
