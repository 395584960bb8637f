//! Benchmark orchestration: operand generation, single trials, sweeps,
//! derived metrics and reporting.

pub mod benchmark_runner;
pub mod benchmark_types;
pub mod data_generator;
pub mod performance_metrics;
pub mod report;
pub mod sweep_driver;

pub use benchmark_runner::{BenchmarkRunner, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use benchmark_types::{
    BenchRow, KernelMode, RectangularSweepConfig, Shape, SquareSweepConfig, SweepConfig,
};
pub use data_generator::{DEFAULT_SEED, MatrixGenerator, Operand};
pub use performance_metrics::{
    PLATEAU_MAX_DROP, PLATEAU_REFERENCE_SIZE, ThroughputDrop, data_size_mib,
    detect_throughput_drop, throughput_gflops, total_flop,
};
pub use report::{RecordingSink, Report, ReportSink, StdoutSink};
pub use sweep_driver::{SweepDriver, rectangular_shapes, square_shapes};
