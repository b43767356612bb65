//! Umbrella crate for the `cell-count` workspace.
//!
//! Re-exports the foundational primitives and the tracing engine.

pub use cc_core::*;
pub use cc_trace::*;
