//! Work queue and serial diff pipeline.
//!
//! Producers submit target snapshots; a single apply stage takes them in FIFO
//! order and turns each into a staged changeset against the last state it
//! handed out. Every queue operation holds one lock for its whole duration.
//!
//! # Key Types
//!
//! - [`WorkQueue`] -- Mutex-guarded FIFO queue, optionally bounded
//! - [`DiffPipeline`] -- Diffs queued targets against the last applied state
//! - [`QueueConfig`] -- Capacity bound

pub mod config;
pub mod error;
pub mod pipeline;
pub mod queue;

pub use config::QueueConfig;
pub use error::{QueueError, QueueResult};
pub use pipeline::DiffPipeline;
pub use queue::WorkQueue;
