use thiserror::Error;

/// Errors raised by a compute backend while preparing or running a kernel.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{operand} operand has {actual} elements, expected {expected}")]
    OperandSizeMismatch {
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Thread count must be at least 1, got {count}")]
    InvalidThreadCount { count: usize },

    #[error("Compute context unavailable: {message}")]
    ContextUnavailable { message: String },

    #[error("Unsupported operation on backend '{backend}': {message}")]
    Unsupported { backend: String, message: String },

    #[error("Worker thread panicked during kernel execution")]
    WorkerPanicked,
}
