//! Scripted compute backends for exercising the orchestration without
//! real kernels.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use half::bf16;
use matbench::backend::ComputeBackend;
use matbench::benchmarks::{KernelMode, Shape};
use matbench::errors::{BackendError, BackendResult};

/// One observed kernel invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub mode: KernelMode,
    pub shape: Shape,
    pub lhs: Vec<bf16>,
    pub rhs_len: usize,
    pub context_id: usize,
    pub debug: bool,
}

/// Reports a fixed duration for every call (or one derived from the shape
/// when `duration_for` is set), optionally failing the `fail_on_call`-th
/// call (1-based), and records what it was given.
pub struct ScriptedBackend {
    pub duration_ns: u64,
    pub duration_for: Option<fn(Shape) -> u64>,
    pub fail_on_call: Option<usize>,
    pub fail_context: bool,
    pub contexts_created: Cell<usize>,
    pub calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn with_duration(duration_ns: u64) -> Self {
        Self {
            duration_ns,
            duration_for: None,
            fail_on_call: None,
            fail_context: false,
            contexts_created: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_duration_fn(duration_for: fn(Shape) -> u64) -> Self {
        Self {
            duration_for: Some(duration_for),
            ..Self::with_duration(1_000)
        }
    }

    pub fn failing_on_call(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::with_duration(1_000)
        }
    }

    pub fn failing_context() -> Self {
        Self {
            fail_context: true,
            ..Self::with_duration(1_000)
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(
        &self,
        mode: KernelMode,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &usize,
        debug: bool,
    ) -> BackendResult<u64> {
        self.calls.borrow_mut().push(RecordedCall {
            mode,
            shape,
            lhs: lhs.to_vec(),
            rhs_len: rhs.len(),
            context_id: *context,
            debug,
        });

        if self.fail_on_call == Some(self.call_count()) {
            return Err(BackendError::Unsupported {
                backend: self.name().to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(self.duration_for.map_or(self.duration_ns, |duration| duration(shape)))
    }
}

impl ComputeBackend for ScriptedBackend {
    type Context = usize;

    fn name(&self) -> &str {
        "MOCK"
    }

    fn create_context(&self) -> BackendResult<usize> {
        if self.fail_context {
            return Err(BackendError::ContextUnavailable {
                message: "no device".to_string(),
            });
        }
        let id = self.contexts_created.get() + 1;
        self.contexts_created.set(id);
        Ok(id)
    }

    fn run_inner_product(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &usize,
        debug: bool,
    ) -> BackendResult<u64> {
        self.record(KernelMode::InnerProduct, shape, lhs, rhs, context, debug)
    }

    fn run_matmul(
        &self,
        shape: Shape,
        lhs: &[bf16],
        rhs: &[bf16],
        context: &usize,
        debug: bool,
    ) -> BackendResult<u64> {
        self.record(KernelMode::Gemm, shape, lhs, rhs, context, debug)
    }
}
