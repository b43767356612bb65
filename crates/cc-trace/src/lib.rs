//! Closed-loop ("cell") counting over colored line-art frames.
//!
//! The engine walks pixel-to-pixel along line-colored pixels using the
//! 8-compass adjacency and detects when a walk closes back on its seed:
//! - [`Direction`] supplies the adjacency and turn-candidate tables.
//! - `resolve_junction` strips branch-point clusters from the traceable
//!   graph with a work-list flood fill.
//! - [`BoundaryWalker`] follows one boundary from a seed pixel and reports
//!   closed-loop vs. dead-end, sharing an adaptive loop-size estimate
//!   across walks.
//! - [`CellCounter`] scans each frame row-major, walks every unvisited line
//!   pixel, and accumulates one count per frame.
//!
//! Image decoding, file enumeration and report formatting are left to the
//! caller behind the [`FrameSource`] / [`FrameSink`] seams.

mod counter;
mod direction;
mod junction;
mod observe;
mod walker;

pub use counter::{
    CellCounter, CounterConfig, ErrorPolicy, FrameError, FrameSink, FrameSource, FrameStats,
    annotate,
};
pub use direction::{
    CLOCKWISE, Direction, Orientation, choose_direction, side_and_corner_opposite,
};
pub use junction::resolve_junction;
pub use observe::{MarkGranularity, MarkProbe, TraceObserver};
pub use walker::{BoundaryWalker, WalkConfig, WalkOutcome};
