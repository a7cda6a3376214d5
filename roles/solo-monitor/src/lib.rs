//! Solo mining monitor.
//!
//! Polls a solo pool's stats endpoint for one address, renders the derived
//! values, and raises alerts when the best share or the network difficulty
//! moves. All mutable state lives in a [`monitor::MonitorContext`] owned by a
//! single [`monitor::Monitor`] event loop.

pub mod alerts;
pub mod config;
pub mod detector;
pub mod error;
pub mod export;
pub mod history;
pub mod monitor;
pub mod presenter;
pub mod snapshot;
pub mod store;
pub mod terminal;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::MonitorError;
pub use monitor::{Capabilities, Command, Monitor, MonitorHandle, MonitorSettings};
