// Error types
pub mod error;

// Claude Code session logs
pub mod claude;

pub use claude::{
    DiscoveryOptions, MIN_SESSION_BYTES, NOISE_TYPES, SUBAGENTS_DIR, clean_transcript,
    clean_transcript_str, discover_sessions,
};

pub use error::{Error, Result};
