//! Benchmark type definitions and configuration structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::performance_metrics::total_flop;
use crate::errors::{BenchmarkError, BenchmarkResult};

/// Which accelerated kernel a trial exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelMode {
    /// Pairwise dot products between rows of A (N1×M) and rows of B (N2×M).
    InnerProduct,
    /// Standard matrix multiply, A (N1×M) by B (M×N2).
    Gemm,
}

impl KernelMode {
    pub fn short_label(&self) -> &'static str {
        match self {
            KernelMode::InnerProduct => "IP",
            KernelMode::Gemm => "GEMM",
        }
    }

    /// Row label shown in reports, e.g. `IP / CPU-REF`.
    pub fn label(&self, backend_name: &str) -> String {
        format!("{} / {}", self.short_label(), backend_name)
    }
}

impl fmt::Display for KernelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_label())
    }
}

/// Problem size of one trial.
///
/// `n1` is the row count of the left operand, `n2` the row count (inner
/// product) or column count (GEMM) of the right operand and `m` the shared
/// contraction dimension. All three are guaranteed to be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    n1: usize,
    n2: usize,
    m: usize,
}

impl Shape {
    pub fn new(n1: usize, n2: usize, m: usize) -> BenchmarkResult<Self> {
        // Rejects zero dimensions and FLOP overflow.
        total_flop(n1, n2, m)?;
        let shape = Self { n1, n2, m };
        shape.operand_lens(KernelMode::InnerProduct)?;
        shape.operand_lens(KernelMode::Gemm)?;
        Ok(shape)
    }

    pub fn square(size: usize) -> BenchmarkResult<Self> {
        Self::new(size, size, size)
    }

    pub fn n1(&self) -> usize {
        self.n1
    }

    pub fn n2(&self) -> usize {
        self.n2
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn is_square(&self) -> bool {
        self.n1 == self.n2 && self.n2 == self.m
    }

    /// Returns `(rows, cols)` of the left and right operands for `mode`.
    pub fn operand_dims(&self, mode: KernelMode) -> ((usize, usize), (usize, usize)) {
        match mode {
            KernelMode::InnerProduct => ((self.n1, self.m), (self.n2, self.m)),
            KernelMode::Gemm => ((self.n1, self.m), (self.m, self.n2)),
        }
    }

    /// Element counts of the left and right operands.
    pub fn operand_lens(&self, mode: KernelMode) -> BenchmarkResult<(usize, usize)> {
        let ((lhs_rows, lhs_cols), (rhs_rows, rhs_cols)) = self.operand_dims(mode);
        let lhs = lhs_rows.checked_mul(lhs_cols);
        let rhs = rhs_rows.checked_mul(rhs_cols);
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
            _ => Err(self.overflow()),
        }
    }

    fn overflow(&self) -> BenchmarkError {
        BenchmarkError::ShapeOverflow {
            n1: self.n1,
            n2: self.n2,
            m: self.m,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.n1, self.n2, self.m)
    }
}

/// One reported row: the measured outcome of a single (mode, shape) trial.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchRow {
    pub mode: String,
    pub shape: Shape,
    pub data_size_mib: f64,
    pub total_flop: u64,
    pub duration_ns: u64,
    pub gflops: f64,
}

/// Square sweep: N1 = N2 = M = size for each size, both kernel modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SquareSweepConfig {
    pub sizes: Vec<usize>,
}

impl Default for SquareSweepConfig {
    fn default() -> Self {
        Self {
            sizes: powers_of_two(64, 32768),
        }
    }
}

/// Rectangular sweep: fixed M, N2 = `n2_base` × multiplier, inner product only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RectangularSweepConfig {
    pub n1_sizes: Vec<usize>,
    pub n2_base: usize,
    pub n2_multipliers: Vec<usize>,
    pub m: usize,
}

impl Default for RectangularSweepConfig {
    fn default() -> Self {
        Self {
            n1_sizes: powers_of_two(32, 32768),
            n2_base: 1024 * 1024,
            n2_multipliers: vec![1, 2, 4, 8],
            m: 1024,
        }
    }
}

/// Full benchmark configuration, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    pub square: SquareSweepConfig,
    pub rectangular: RectangularSweepConfig,
    /// Worker threads used to populate operand matrices.
    pub generator_threads: Option<usize>,
    /// Worker threads used by the reference backend.
    pub backend_threads: Option<usize>,
}

impl SweepConfig {
    /// Validates the configuration
    pub fn validate(&self) -> BenchmarkResult<()> {
        validate_sizes("square.sizes", &self.square.sizes)?;
        validate_sizes("rectangular.n1_sizes", &self.rectangular.n1_sizes)?;
        validate_sizes("rectangular.n2_multipliers", &self.rectangular.n2_multipliers)?;

        if self.rectangular.n2_base == 0 {
            return Err(BenchmarkError::ConfigValidation {
                field: "rectangular.n2_base".to_string(),
                message: "N2 base must be greater than 0".to_string(),
            });
        }

        if self.rectangular.m == 0 {
            return Err(BenchmarkError::ConfigValidation {
                field: "rectangular.m".to_string(),
                message: "M must be greater than 0".to_string(),
            });
        }

        for (field, threads) in [
            ("generator_threads", self.generator_threads),
            ("backend_threads", self.backend_threads),
        ] {
            if threads == Some(0) {
                return Err(BenchmarkError::ConfigValidation {
                    field: field.to_string(),
                    message: "Thread count must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn validate_sizes(field: &str, sizes: &[usize]) -> BenchmarkResult<()> {
    if sizes.is_empty() {
        return Err(BenchmarkError::ConfigValidation {
            field: field.to_string(),
            message: "Must list at least one value".to_string(),
        });
    }
    if sizes.contains(&0) {
        return Err(BenchmarkError::ConfigValidation {
            field: field.to_string(),
            message: "Values must be greater than 0".to_string(),
        });
    }
    Ok(())
}

fn powers_of_two(from: usize, to: usize) -> Vec<usize> {
    std::iter::successors(Some(from), |&size| size.checked_mul(2))
        .take_while(|&size| size <= to)
        .collect()
}
