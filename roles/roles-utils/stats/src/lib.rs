pub mod stats_adapter;
pub mod stats_client;
pub mod stats_poller;

// Re-export the record and the capabilities built around it
pub use stats_adapter::{MetricRecord, RawValue};
pub use stats_client::{MetricSource, StatsClient, StatsClientError};
pub use stats_poller::{PollScheduler, PollTick};
