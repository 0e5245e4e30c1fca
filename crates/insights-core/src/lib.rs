pub mod path;
pub mod project;

pub use path::*;
pub use project::*;
