//! Terminal output for the CLI commands.
//!
//! Views write to stdout; diagnostics stay on the tracing subscriber (stderr).

pub mod plan;
pub mod progress;
pub mod projects;

pub use plan::PlanView;
pub use progress::{print_extract_progress, print_extract_summary};
pub use projects::ProjectsView;

use owo_colors::OwoColorize;

/// Colors output only when stdout is a terminal
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn ok(&self, text: &str) -> String {
        if self.enabled {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.enabled {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.enabled {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Whole thousands, as shown in progress lines (`12K chars`)
pub fn kilo(n: usize) -> usize {
    n / 1000
}
