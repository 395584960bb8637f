//! Derived metrics for a single trial and sanity checks over a finished sweep.

use half::bf16;

use super::benchmark_types::{BenchRow, Shape};
use crate::errors::{BenchmarkError, BenchmarkResult};

/// Bytes per operand element.
pub const ELEMENT_SIZE_BYTES: usize = std::mem::size_of::<bf16>();

const BYTES_PER_MIB: f64 = (1024 * 1024) as f64;

/// Square size whose throughput anchors the plateau check.
pub const PLATEAU_REFERENCE_SIZE: usize = 4096;

/// Largest tolerated ratio between reference and largest-size throughput.
pub const PLATEAU_MAX_DROP: f64 = 10.0;

/// Total size of both operand matrices in MiB.
pub fn data_size_mib(n1: usize, n2: usize, m: usize) -> f64 {
    let elements = n1 as f64 * m as f64 + n2 as f64 * m as f64;
    elements * ELEMENT_SIZE_BYTES as f64 / BYTES_PER_MIB
}

/// Floating-point operations of an N1×N2 output where each entry takes
/// M multiplications and M−1 additions.
pub fn total_flop(n1: usize, n2: usize, m: usize) -> BenchmarkResult<u64> {
    for (dimension, value) in [("N1", n1), ("N2", n2), ("M", m)] {
        if value == 0 {
            return Err(BenchmarkError::ZeroDimension { dimension });
        }
    }

    let overflow = || BenchmarkError::ShapeOverflow { n1, n2, m };
    let per_output = (m as u64).checked_mul(2).ok_or_else(overflow)? - 1;
    (n1 as u64)
        .checked_mul(n2 as u64)
        .and_then(|outputs| outputs.checked_mul(per_output))
        .ok_or_else(overflow)
}

/// FLOP per nanosecond, which is numerically GFLOP/s.
pub fn throughput_gflops(total_flop: u64, duration_ns: u64) -> BenchmarkResult<f64> {
    if duration_ns == 0 {
        return Err(BenchmarkError::ZeroDuration { total_flop });
    }
    Ok(total_flop as f64 / duration_ns as f64)
}

impl Shape {
    pub fn data_size_mib(&self) -> f64 {
        data_size_mib(self.n1(), self.n2(), self.m())
    }

    pub fn total_flop(&self) -> BenchmarkResult<u64> {
        total_flop(self.n1(), self.n2(), self.m())
    }
}

/// A suspicious throughput collapse between the reference size and the
/// largest size of a square sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputDrop {
    pub reference: Shape,
    pub reference_gflops: f64,
    pub largest: Shape,
    pub largest_gflops: f64,
}

impl ThroughputDrop {
    pub fn ratio(&self) -> f64 {
        self.reference_gflops / self.largest_gflops
    }
}

/// Flags a square sweep whose largest size runs more than
/// [`PLATEAU_MAX_DROP`] times slower than size [`PLATEAU_REFERENCE_SIZE`].
///
/// Throughput should rise and then plateau as sizes grow, so a collapse this
/// large usually points at a measurement problem rather than the hardware.
/// Returns `None` when either row is missing.
pub fn detect_throughput_drop(rows: &[BenchRow]) -> Option<ThroughputDrop> {
    let reference = rows
        .iter()
        .find(|row| row.shape.is_square() && row.shape.n1() == PLATEAU_REFERENCE_SIZE)?;
    let largest = rows
        .iter()
        .filter(|row| row.shape.is_square() && row.shape.n1() > PLATEAU_REFERENCE_SIZE)
        .max_by_key(|row| row.shape.n1())?;

    if largest.gflops * PLATEAU_MAX_DROP < reference.gflops {
        Some(ThroughputDrop {
            reference: reference.shape,
            reference_gflops: reference.gflops,
            largest: largest.shape,
            largest_gflops: largest.gflops,
        })
    } else {
        None
    }
}
