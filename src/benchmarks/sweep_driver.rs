//! Problem-size sweeps.
//!
//! Each sweep creates one backend context, plans all of its shapes up front
//! and then runs the trials strictly one after another in declared order.
//! A phase is flushed to the sink only once every trial in it succeeded; the
//! first failure aborts the phase and nothing of it is reported.

use log::{info, warn};

use super::benchmark_runner::BenchmarkRunner;
use super::benchmark_types::{
    KernelMode, RectangularSweepConfig, Shape, SquareSweepConfig, SweepConfig,
};
use super::performance_metrics::detect_throughput_drop;
use super::report::{Report, ReportSink};
use crate::backend::ComputeBackend;
use crate::errors::{BenchmarkError, BenchmarkResult};

/// N1 = N2 = M = size for every size, in order.
pub fn square_shapes(sizes: &[usize]) -> BenchmarkResult<Vec<Shape>> {
    sizes.iter().map(|&size| Shape::square(size)).collect()
}

/// (N1, N2 base × multiplier, M) for every N1, then every multiplier.
pub fn rectangular_shapes(config: &RectangularSweepConfig) -> BenchmarkResult<Vec<Shape>> {
    let mut shapes = Vec::with_capacity(config.n1_sizes.len() * config.n2_multipliers.len());
    for &n1 in &config.n1_sizes {
        for &multiplier in &config.n2_multipliers {
            let n2 = config
                .n2_base
                .checked_mul(multiplier)
                .ok_or(BenchmarkError::ShapeOverflow {
                    n1,
                    n2: config.n2_base,
                    m: config.m,
                })?;
            shapes.push(Shape::new(n1, n2, config.m)?);
        }
    }
    Ok(shapes)
}

pub struct SweepDriver<B: ComputeBackend> {
    runner: BenchmarkRunner<B>,
}

impl<B: ComputeBackend> SweepDriver<B> {
    pub fn new(runner: BenchmarkRunner<B>) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &BenchmarkRunner<B> {
        &self.runner
    }

    /// Square sweep followed by rectangular sweep.
    pub fn run_all(&self, config: &SweepConfig, sink: &mut dyn ReportSink) -> BenchmarkResult<()> {
        config.validate()?;
        self.run_square_sweep(&config.square, sink)?;
        self.run_rectangular_sweep(&config.rectangular, sink)
    }

    /// Inner product over all sizes into one report, then GEMM over the same
    /// sizes into a second one.
    pub fn run_square_sweep(
        &self,
        config: &SquareSweepConfig,
        sink: &mut dyn ReportSink,
    ) -> BenchmarkResult<()> {
        let shapes = square_shapes(&config.sizes)?;
        let context = self.runner.create_context()?;

        let mut report = Report::new("Square sweep: inner product");
        self.run_phase(KernelMode::InnerProduct, &shapes, &context, &mut report)?;
        warn_on_throughput_drop(&report);
        report.flush_into(sink)?;

        let mut report = Report::new("Square sweep: GEMM");
        self.run_phase(KernelMode::Gemm, &shapes, &context, &mut report)?;
        warn_on_throughput_drop(&report);
        report.flush_into(sink)
    }

    /// Inner product over every (N1, multiplier) pair into a single report.
    pub fn run_rectangular_sweep(
        &self,
        config: &RectangularSweepConfig,
        sink: &mut dyn ReportSink,
    ) -> BenchmarkResult<()> {
        let shapes = rectangular_shapes(config)?;
        let context = self.runner.create_context()?;

        let mut report = Report::new("Rectangular sweep: inner product");
        self.run_phase(KernelMode::InnerProduct, &shapes, &context, &mut report)?;
        report.flush_into(sink)
    }

    fn run_phase(
        &self,
        mode: KernelMode,
        shapes: &[Shape],
        context: &B::Context,
        report: &mut Report,
    ) -> BenchmarkResult<()> {
        info!(
            "{}: {} trials on {}",
            report.title(),
            shapes.len(),
            self.runner.backend().name()
        );
        for (index, &shape) in shapes.iter().enumerate() {
            info!("  [{}/{}] {} {}", index + 1, shapes.len(), mode, shape);
            self.runner.run_trial(mode, shape, context, report)?;
        }
        info!("{} complete", report.title());
        Ok(())
    }
}

fn warn_on_throughput_drop(report: &Report) {
    if let Some(drop) = detect_throughput_drop(report.rows()) {
        warn!(
            "{}: throughput at {} ({:.2} GFLOPS) is {:.1}x lower than at {} ({:.2} GFLOPS); check the measurement",
            report.title(),
            drop.largest,
            drop.largest_gflops,
            drop.ratio(),
            drop.reference,
            drop.reference_gflops
        );
    }
}
