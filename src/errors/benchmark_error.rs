//! Errors surfaced by the benchmark runner and sweep driver.

use thiserror::Error;

use super::BackendError;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Dimension {dimension} must be greater than 0")]
    ZeroDimension { dimension: &'static str },

    #[error("Shape {n1}/{n2}/{m} overflows the addressable element or FLOP range")]
    ShapeOverflow { n1: usize, n2: usize, m: usize },

    #[error(
        "Kernel reported a zero duration for {total_flop} FLOP; throughput would be undefined"
    )]
    ZeroDuration { total_flop: u64 },

    #[error("Failed to create compute context for backend '{backend}'")]
    ContextCreation {
        backend: String,
        #[source]
        source: BackendError,
    },

    #[error("Backend failure in {mode} trial {shape}")]
    Backend {
        mode: String,
        shape: String,
        #[source]
        source: BackendError,
    },

    #[error("Failed to parse configuration file '{path}'")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration validation error for field '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Matrix of {rows}x{cols} elements exceeds the addressable range")]
    MatrixTooLarge { rows: usize, cols: usize },

    #[error("Worker thread panicked while generating operand data")]
    GeneratorPanicked,

    #[error("IO error")]
    Io(#[from] std::io::Error),
}
