//! Daily feelings poll.
//!
//! Users report how their day went on a four step scale and the backend
//! keeps one counter per step per calendar day. Two operations are exposed:
//! record a feeling for today, and fetch the counters of any given date.
//!
//! Counters live in a key-value style table keyed by `YYYY-MM-DD`. Every
//! write is a single atomic "add one" on the backend, so any number of
//! concurrent requests can be served without in-process coordination.

pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod feeling;
pub mod polls;
pub mod startup;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::models::PollResult;
pub use engine::StorageEngine;
pub use error::PollError;
pub use feeling::Feeling;
