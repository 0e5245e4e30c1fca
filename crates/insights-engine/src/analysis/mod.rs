mod aggregate;
mod temporal;

pub use aggregate::compute_aggregate_stats;
pub use temporal::{compute_temporal_stats, iso_week_key};
