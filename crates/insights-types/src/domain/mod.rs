mod facet;
mod session;
mod stats;

pub use facet::*;
pub use session::*;
pub use stats::*;
