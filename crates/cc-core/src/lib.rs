//! Foundational primitives for the cell-count boundary tracer.
//!
//! ## Frames
//! A frame is an owned, row-major RGB buffer addressed by `(x, y)` with
//! `(0, 0)` at the top-left corner. The tracing engine never touches pixel
//! storage outside these accessors, so every neighbor probe is bounds-checked
//! before the read.
//!
//! ## Line classification
//! Boundary pixels are recognised by proximity to one of two reference
//! colors under a dual threshold: every channel difference must stay below a
//! per-channel tolerance, and the summed difference below a total tolerance.
//!
//! ## Visited state
//! Visited pixels are tracked in a [`VisitedMask`] scoped to one frame, not
//! by repainting the frame. Annotated output is derived from the mask after
//! processing.

mod color;
mod error;
mod frame;
mod visited;

pub use color::{ColorMatchConfig, LineClassifier, Rgb8, is_similar_color};
pub use error::Error;
pub use frame::Frame;
pub use visited::VisitedMask;
