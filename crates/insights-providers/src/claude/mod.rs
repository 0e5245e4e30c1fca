mod cleaner;
mod discovery;
pub(crate) mod schema;

pub use cleaner::{NOISE_TYPES, clean_transcript, clean_transcript_str};
pub use discovery::{DiscoveryOptions, MIN_SESSION_BYTES, SUBAGENTS_DIR, discover_sessions};
