//! Error types for the benchmark harness.
//!
//! Each layer has its own error enum so a failure can be traced back to the
//! component that raised it, avoiding generic wrappers like `anyhow` or
//! `Box<dyn Error>`.

mod backend_error;
mod benchmark_error;

pub use backend_error::BackendError;
pub use benchmark_error::BenchmarkError;

/// Result type alias for compute backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result type alias for benchmark orchestration.
pub type BenchmarkResult<T> = std::result::Result<T, BenchmarkError>;
