//! Throughput benchmark for bf16 inner-product and GEMM kernels.
//!
//! The harness generates deterministic bf16 operands, runs each kernel once
//! per problem shape on a pluggable [`backend::ComputeBackend`], derives data
//! size, FLOP count and GFLOPS from the measured duration, and reports every
//! sweep phase as one table.

pub mod backend;
pub mod benchmarks;
pub mod errors;
mod utils;

pub use backend::{ComputeBackend, CpuContext, ReferenceBackend};
pub use benchmarks::{
    BenchRow, BenchmarkRunner, ConfigLoader, KernelMode, MatrixGenerator, Report, ReportSink,
    Shape, SweepConfig, SweepDriver,
};
pub use errors::{BackendError, BackendResult, BenchmarkError, BenchmarkResult};
