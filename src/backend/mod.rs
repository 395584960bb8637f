//! Compute backends executing the timed kernels.
//!
//! A backend owns everything hardware specific: how a device and its
//! execution stream are brought up, and how the bf16 inner product and
//! matrix multiply are dispatched. The harness only sees the elapsed time of
//! each call, so any accelerated library can be plugged in by implementing
//! [`ComputeBackend`]. [`ReferenceBackend`] runs both kernels on the CPU
//! without vendor libraries.

pub mod reference;

use half::bf16;

use crate::benchmarks::Shape;
use crate::errors::BackendResult;

pub use reference::{CpuContext, ReferenceBackend};

/// Capability interface for a timed low-precision compute path.
pub trait ComputeBackend {
    /// Initialised device and stream, created once per sweep and shared by
    /// every trial of that sweep.
    type Context;

    /// Short name used in report labels.
    fn name(&self) -> &str;

    fn create_context(&self) -> BackendResult<Self::Context>;

    /// Computes the N1×N2 inner products of the rows of `lhs` (N1×M) with
    /// the rows of `rhs` (N2×M) and returns the elapsed nanoseconds.
    fn run_inner_product(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &Self::Context,
        debug: bool,
    ) -> BackendResult<u64>;

    /// Computes `lhs` (N1×M) times `rhs` (M×N2) and returns the elapsed
    /// nanoseconds.
    fn run_matmul(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &Self::Context,
        debug: bool,
    ) -> BackendResult<u64>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for &B {
    type Context = B::Context;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn create_context(&self) -> BackendResult<Self::Context> {
        (**self).create_context()
    }

    fn run_inner_product(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &Self::Context,
        debug: bool,
    ) -> BackendResult<u64> {
        (**self).run_inner_product(shape, lhs, rhs, context, debug)
    }

    fn run_matmul(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &Self::Context,
        debug: bool,
    ) -> BackendResult<u64> {
        (**self).run_matmul(shape, lhs, rhs, context, debug)
    }
}
