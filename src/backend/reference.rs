//! CPU reference backend.
//!
//! Runs both kernels on the host with the SIMD dot kernels from
//! `utils::dot`. Output rows are spread over a scoped worker pool;
//! each worker pulls the next row index from a shared counter, computes it
//! into its own scratch row and moves on. The numeric output is discarded.

use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use half::bf16;
use log::info;

use super::ComputeBackend;
use crate::benchmarks::Shape;
use crate::errors::{BackendError, BackendResult};
use crate::utils::{DotKernel, dot_bf16};

pub const REFERENCE_BACKEND_NAME: &str = "CPU-REF";

/// Kernel variant and worker count selected when a sweep starts.
#[derive(Debug, Clone)]
pub struct CpuContext {
    kernel: DotKernel,
    threads: usize,
}

impl CpuContext {
    /// Name of the dot kernel detected for this CPU.
    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

/// The dot kernel is always the best one the running CPU supports; it is
/// not selectable from outside the crate.
///
/// ```compile_fail
/// use matbench::utils::dot::DotKernel;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReferenceBackend {
    threads: Option<usize>,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

impl ComputeBackend for ReferenceBackend {
    type Context = CpuContext;

    fn name(&self) -> &str {
        REFERENCE_BACKEND_NAME
    }

    fn create_context(&self) -> BackendResult<CpuContext> {
        let threads = self.threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        if threads == 0 {
            return Err(BackendError::InvalidThreadCount { count: 0 });
        }

        let kernel = DotKernel::detect();
        info!(
            "{} context: {} kernel, {} worker threads",
            REFERENCE_BACKEND_NAME,
            kernel.name(),
            threads
        );
        Ok(CpuContext { kernel, threads })
    }

    fn run_inner_product(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &CpuContext,
        debug: bool,
    ) -> BackendResult<u64> {
        let (n1, n2, m) = (shape.n1(), shape.n2(), shape.m());
        check_operand("lhs", lhs, n1 * m)?;
        check_operand("rhs", rhs, n2 * m)?;

        let start = Instant::now();
        inner_product_rows(lhs, rhs, n1, n2, m, context)?;
        let elapsed_ns = elapsed_nanos(start);

        if debug {
            info!(
                "{} ip {}: kernel={} threads={} elapsed={}ns",
                REFERENCE_BACKEND_NAME,
                shape,
                context.kernel.name(),
                context.threads,
                elapsed_ns
            );
        }
        Ok(elapsed_ns)
    }

    fn run_matmul(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &CpuContext,
        debug: bool,
    ) -> BackendResult<u64> {
        let (n1, n2, m) = (shape.n1(), shape.n2(), shape.m());
        check_operand("lhs", lhs, n1 * m)?;
        check_operand("rhs", rhs, m * n2)?;

        let start = Instant::now();
        // B is M×N2; packing it to N2×M turns every output entry into a
        // contiguous dot product.
        let packed = transpose(rhs, m, n2);
        inner_product_rows(lhs, &packed, n1, n2, m, context)?;
        let elapsed_ns = elapsed_nanos(start);

        if debug {
            info!(
                "{} gemm {}: kernel={} threads={} elapsed={}ns (includes packing B)",
                REFERENCE_BACKEND_NAME,
                shape,
                context.kernel.name(),
                context.threads,
                elapsed_ns
            );
        }
        Ok(elapsed_ns)
    }
}

fn check_operand(operand: &'static str, values: &[bf16], expected: usize) -> BackendResult<()> {
    if values.len() != expected {
        return Err(BackendError::OperandSizeMismatch {
            operand,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn elapsed_nanos(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Row-major `rows x cols` to row-major `cols x rows`.
fn transpose(values: &[bf16], rows: usize, cols: usize) -> Vec<bf16> {
    let mut packed = vec![bf16::ZERO; values.len()];
    for (r, row) in values.chunks_exact(cols).enumerate().take(rows) {
        for (c, &value) in row.iter().enumerate() {
            packed[c * rows + r] = value;
        }
    }
    packed
}

/// Computes every entry (i, j) = dot(lhs row i, rhs row j) for an
/// `n1 x n2` output, both operands stored with row length `m`.
fn inner_product_rows(
    lhs: &[bf16],
    rhs: &[bf16],
    n1: usize,
    n2: usize,
    m: usize,
    context: &CpuContext,
) -> BackendResult<()> {
    let kernel = context.kernel;
    let num_threads = context.threads.min(n1).max(1);
    let next_row = AtomicUsize::new(0);

    thread::scope(|scope| {
        let next_row = &next_row;

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                scope.spawn(move || {
                    let mut scratch = vec![0.0f32; n2];
                    loop {
                        let row = next_row.fetch_add(1, Ordering::Relaxed);
                        if row >= n1 {
                            break;
                        }

                        let lhs_row = &lhs[row * m..(row + 1) * m];
                        for (out, rhs_row) in scratch.iter_mut().zip(rhs.chunks_exact(m)) {
                            *out = dot_bf16(kernel, lhs_row, rhs_row);
                        }
                        black_box(&scratch);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().map_err(|_| BackendError::WorkerPanicked)?;
        }

        Ok(())
    })
}
