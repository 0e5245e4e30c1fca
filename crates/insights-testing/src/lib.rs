//! Testing infrastructure for insights integration tests.
//!
//! - `TestWorld`: isolated corpus + output directories and a fake inference command
//! - `fixtures`: Claude Code session log generation
//! - `assertions`: checks against the facet cache and report files

pub mod assertions;
pub mod fixtures;
pub mod inference;
pub mod world;

pub use inference::FakeInference;
pub use world::{CliResult, TestWorld};
