//! Adaptive Search Executor (C9) and Worker pool (C10).
//!
//! The queue itself (C8) lives in `research-db`; this crate is the
//! consuming side: claim, search, score, dedup, persist, repeat.

pub mod error;
pub mod executor;
pub mod pool;
pub mod populate;

pub use error::{Error, Result};
pub use executor::{ExecutionOutcome, ExecutorConfig, StopReason};
pub use pool::{PoolConfig, PoolStats, WorkerPool};
