use cc_core::{Frame, LineClassifier, VisitedMask};

use crate::direction::CLOCKWISE;
use crate::observe::MarkProbe;

/// Neutralizes a branch-point cluster around `(x, y)`.
///
/// A pixel qualifies as a junction when at least three of its 8 neighbors
/// are line-colored and not yet visited. The junction pixel and every
/// qualifying neighbor are marked visited, and each newly marked neighbor is
/// re-tested with the same rule via an explicit work list until the cluster
/// is exhausted. The cluster is thereby removed from the traceable graph and
/// contributes no cell.
///
/// Returns the number of pixels newly marked. `work` is caller-provided
/// scratch so repeated resolutions reuse one allocation.
pub fn resolve_junction(
    frame: &Frame,
    classifier: &LineClassifier,
    visited: &mut VisitedMask,
    x: usize,
    y: usize,
    work: &mut Vec<(usize, usize)>,
    probe: &mut MarkProbe<'_>,
) -> usize {
    let width = frame.width();
    let height = frame.height();
    let mut marked = 0;

    work.clear();
    work.push((x, y));

    while let Some((cx, cy)) = work.pop() {
        let mut unvisited_line = [None; 8];
        let mut count = 0;
        for (slot, d) in CLOCKWISE.iter().enumerate() {
            let Some((nx, ny)) = d.step(cx, cy, width, height) else {
                continue;
            };
            if visited.contains(nx, ny) {
                continue;
            }
            let px = frame.get(nx, ny).copied().unwrap_or_default();
            if classifier.is_line(px) {
                unvisited_line[slot] = Some((nx, ny));
                count += 1;
            }
        }

        if count < 3 {
            continue;
        }

        if visited.mark(cx, cy) {
            marked += 1;
            probe.mark(cx, cy);
        }

        for (nx, ny) in unvisited_line.into_iter().flatten() {
            if visited.mark(nx, ny) {
                marked += 1;
                probe.mark(nx, ny);
                work.push((nx, ny));
            }
        }
    }

    marked
}
