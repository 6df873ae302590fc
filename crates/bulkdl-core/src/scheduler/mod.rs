//! Batch execution across a fixed pool of worker threads.

mod pool;

pub use pool::{run_batch, Worker};
