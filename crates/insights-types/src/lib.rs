pub mod domain;
mod util;

pub use domain::*;
pub use util::*;
