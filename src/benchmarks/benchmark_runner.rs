//! Single-trial benchmark execution and configuration loading.

use std::fs;
use std::io::ErrorKind;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;

use super::benchmark_types::{BenchRow, KernelMode, Shape, SweepConfig};
use super::data_generator::{MatrixGenerator, Operand};
use super::performance_metrics::throughput_gflops;
use super::report::Report;
use crate::backend::ComputeBackend;
use crate::errors::{BenchmarkError, BenchmarkResult};

pub const DEFAULT_CONFIG_PATH: &str = "configs/sweep.json";

/// Configuration loader that handles JSON files with fallbacks
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration file with fallback to defaults
    pub fn load_config<T>(path: &str, config_name: &str) -> BenchmarkResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| BenchmarkError::ConfigParse {
                    path: path.to_string(),
                    source: e,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Config file '{}' not found, using default configuration for {}",
                    path, config_name
                );
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load and validate the sweep configuration
    pub fn load_sweep_config() -> BenchmarkResult<SweepConfig> {
        Self::load_sweep_config_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_sweep_config_from(path: &str) -> BenchmarkResult<SweepConfig> {
        let config: SweepConfig = Self::load_config(path, "sweep")?;
        config.validate()?;
        Ok(config)
    }
}

/// Runs one (mode, shape) trial at a time against a backend.
pub struct BenchmarkRunner<B: ComputeBackend> {
    backend: B,
    generator: MatrixGenerator,
    debug: bool,
}

impl<B: ComputeBackend> BenchmarkRunner<B> {
    pub fn new(backend: B, generator: MatrixGenerator) -> Self {
        Self {
            backend,
            generator,
            debug: false,
        }
    }

    /// Forward the debug flag to every backend call.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn generator(&self) -> &MatrixGenerator {
        &self.generator
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn create_context(&self) -> BenchmarkResult<B::Context> {
        self.backend
            .create_context()
            .map_err(|source| BenchmarkError::ContextCreation {
                backend: self.backend.name().to_string(),
                source,
            })
    }

    /// Generates fresh operands, runs the kernel once and appends the
    /// resulting row to `report`.
    ///
    /// Nothing is appended when the trial fails: backend failures and
    /// degenerate timings are returned to the caller unchanged.
    pub fn run_trial(
        &self,
        mode: KernelMode,
        shape: Shape,
        context: &B::Context,
        report: &mut Report,
    ) -> BenchmarkResult<()> {
        let total_flop = shape.total_flop()?;
        let label = mode.label(self.backend.name());

        let ((lhs_rows, lhs_cols), (rhs_rows, rhs_cols)) = shape.operand_dims(mode);
        let lhs = self.generator.generate(Operand::Lhs, lhs_rows, lhs_cols)?;
        let rhs = self.generator.generate(Operand::Rhs, rhs_rows, rhs_cols)?;

        let elapsed = match mode {
            KernelMode::InnerProduct => {
                self.backend
                    .run_inner_product(shape, &lhs, &rhs, context, self.debug)
            }
            KernelMode::Gemm => self
                .backend
                .run_matmul(shape, &lhs, &rhs, context, self.debug),
        };
        let duration_ns = elapsed.map_err(|source| BenchmarkError::Backend {
            mode: label.clone(),
            shape: shape.to_string(),
            source,
        })?;

        let gflops = throughput_gflops(total_flop, duration_ns).inspect_err(|_| {
            error!("{} {} returned a zero duration", label, shape);
        })?;

        let row = BenchRow {
            mode: label,
            shape,
            data_size_mib: shape.data_size_mib(),
            total_flop,
            duration_ns,
            gflops,
        };
        debug!(
            "{} {}: {} FLOP in {} ns ({:.2} GFLOPS)",
            row.mode, row.shape, row.total_flop, row.duration_ns, row.gflops
        );
        report.push(row);
        Ok(())
    }
}
