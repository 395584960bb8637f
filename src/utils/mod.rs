//! Low-level numeric helpers shared by the backends.

pub(crate) mod dot;

pub(crate) use dot::{DotKernel, dot_bf16};
