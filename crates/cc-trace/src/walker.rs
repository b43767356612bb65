use cc_core::{Frame, LineClassifier, VisitedMask};

use crate::counter::FrameStats;
use crate::direction::{
    CLOCKWISE, Direction, Orientation, choose_direction, ordered, side_and_corner_opposite,
};
use crate::junction::resolve_junction;
use crate::observe::MarkProbe;

/// Terminal state of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The walk closed back on its seed; exactly one cell.
    LoopClosed,
    /// Every attempted path ran out of traceable pixels.
    DeadEnd,
    /// The seed itself was a junction; the cluster was neutralized instead.
    JunctionAbort,
    /// The defensive step budget ran out. Not a cell, tallied separately.
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalkConfig {
    /// A walk returning to its seed closes once it travelled more than this
    /// fraction of the running average loop size.
    pub closure_fraction: f32,
    /// A walk also closes once its revisit count exceeds this multiple of
    /// the running average, catching loops whose seed was consumed.
    pub revisit_multiplier: f32,
    pub orientation: Orientation,
    /// Per-walk step budget; `None` means twice the frame area.
    pub step_budget: Option<usize>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            closure_fraction: 0.8,
            revisit_multiplier: 1.0,
            orientation: Orientation::Clockwise,
            step_budget: None,
        }
    }
}

enum AttemptEnd {
    Closed,
    DeadEnd,
    Exhausted,
}

/// Follows one boundary from a seed pixel to closure or termination.
///
/// The walker owns reusable scratch (per-walk traveled mask, junction work
/// list) so one instance can serve many walks without reallocating.
#[derive(Debug, Default)]
pub struct BoundaryWalker {
    traveled: Vec<u8>,
    touched: Vec<usize>,
    moves: Vec<Direction>,
    junction_work: Vec<(usize, usize)>,
}

impl BoundaryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the boundary seeded at `(x, y)`.
    ///
    /// Every pixel the walk touches is left marked in `visited` regardless
    /// of the outcome, so the outer scan never reprocesses this boundary.
    /// On closure the running average `average_size` is folded towards the
    /// travelled pixel count.
    #[allow(clippy::too_many_arguments)]
    pub fn walk(
        &mut self,
        frame: &Frame,
        classifier: &LineClassifier,
        visited: &mut VisitedMask,
        seed: (usize, usize),
        average_size: &mut f32,
        cfg: &WalkConfig,
        probe: &mut MarkProbe<'_>,
        stats: &mut FrameStats,
    ) -> WalkOutcome {
        let (sx, sy) = seed;
        let width = frame.width();
        let height = frame.height();

        if self.traveled.len() != width * height {
            self.traveled = vec![0; width * height];
            self.touched.clear();
        }

        if visited.mark(sx, sy) {
            probe.mark(sx, sy);
        }

        let mut initial = Vec::new();
        let mut surround = 0;
        for d in CLOCKWISE {
            let Some((nx, ny)) = d.step(sx, sy, width, height) else {
                continue;
            };
            let is_line = classifier.is_line(*frame.get(nx, ny).expect("stepped in bounds"));
            if is_line || visited.contains(nx, ny) {
                surround += 1;
            }
            if is_line {
                initial.push(d);
            }
        }

        // A seed with three or more traceable neighbors is itself a branch
        // point; neutralize the cluster instead of walking it.
        if surround >= 3 {
            stats.junction_pixels += resolve_junction(
                frame,
                classifier,
                visited,
                sx,
                sy,
                &mut self.junction_work,
                probe,
            );
            return WalkOutcome::JunctionAbort;
        }

        ordered(&mut initial, cfg.orientation);

        for start_dir in initial {
            match self.attempt(
                frame,
                classifier,
                visited,
                seed,
                start_dir,
                average_size,
                cfg,
                probe,
                stats,
            ) {
                AttemptEnd::Closed => return WalkOutcome::LoopClosed,
                AttemptEnd::Exhausted => return WalkOutcome::BudgetExhausted,
                AttemptEnd::DeadEnd => {}
            }
        }

        WalkOutcome::DeadEnd
    }

    /// One walk attempt along `start_dir`. The traveled set is fresh per
    /// attempt; the shared visited mask keeps everything it touches.
    #[allow(clippy::too_many_arguments)]
    fn attempt(
        &mut self,
        frame: &Frame,
        classifier: &LineClassifier,
        visited: &mut VisitedMask,
        seed: (usize, usize),
        start_dir: Direction,
        average_size: &mut f32,
        cfg: &WalkConfig,
        probe: &mut MarkProbe<'_>,
        stats: &mut FrameStats,
    ) -> AttemptEnd {
        let width = frame.width();
        let height = frame.height();
        let budget = cfg
            .step_budget
            .unwrap_or_else(|| 2 * width * height)
            .max(1);

        self.reset_traveled();
        self.record_traveled(seed.0, seed.1, width);
        let mut traveled_len = 1_usize;
        let mut revisits = 0_usize;

        let (mut cx, mut cy) = seed;
        let mut dir = start_dir;

        for _ in 0..budget {
            // The walk can only leave the frame from a lookahead position;
            // a step over the border is a dead end, never an access.
            let Some((nx, ny)) = dir.step(cx, cy, width, height) else {
                return AttemptEnd::DeadEnd;
            };

            if self.record_traveled(nx, ny, width) {
                traveled_len += 1;
            } else {
                revisits += 1;
            }
            if visited.mark(nx, ny) {
                probe.mark(nx, ny);
            }

            let back_at_seed = (nx, ny) == seed
                && traveled_len as f32 > cfg.closure_fraction * *average_size;
            let orbit_detected = revisits as f32 > cfg.revisit_multiplier * *average_size;
            if back_at_seed || orbit_detected {
                *average_size = (*average_size + traveled_len as f32) / 2.0;
                return AttemptEnd::Closed;
            }

            let candidates = dir.turn_candidates();
            self.collect_moves(frame, classifier, visited, nx, ny, &candidates);

            if self.moves.is_empty() {
                // One-step lookahead straight ahead before giving up; the
                // lookahead pixel is not recorded as a confirmed move.
                let Some((lx, ly)) = dir.step(nx, ny, width, height) else {
                    return AttemptEnd::DeadEnd;
                };
                self.collect_lookahead_moves(frame, classifier, lx, ly, dir);
                if self.moves.is_empty() {
                    return AttemptEnd::DeadEnd;
                }
                (cx, cy) = (lx, ly);
            } else {
                (cx, cy) = (nx, ny);
            }

            dir = match self.moves.len() {
                // A single move is followed unconditionally; tie-breaking
                // over a one-element set can only return that element.
                1 => self.moves[0],
                2 => {
                    let straight: Vec<Direction> = self
                        .moves
                        .iter()
                        .copied()
                        .filter(|d| d.is_straight())
                        .collect();
                    if straight.len() == 1 {
                        let s = straight[0];
                        let diag = if self.moves[0] == s {
                            self.moves[1]
                        } else {
                            self.moves[0]
                        };
                        if side_and_corner_opposite(s, diag) {
                            choose_direction(&candidates, &self.moves, cfg.orientation)
                        } else {
                            s
                        }
                    } else {
                        choose_direction(&candidates, &self.moves, cfg.orientation)
                    }
                }
                _ => {
                    // Branch point reached mid-walk: strip the cluster, then
                    // keep walking along the tie-break direction.
                    stats.junction_pixels += resolve_junction(
                        frame,
                        classifier,
                        visited,
                        cx,
                        cy,
                        &mut self.junction_work,
                        probe,
                    );
                    choose_direction(&candidates, &self.moves, cfg.orientation)
                }
            };
        }

        AttemptEnd::Exhausted
    }

    /// Candidate moves whose target is in-bounds and line-colored or
    /// already visited.
    fn collect_moves(
        &mut self,
        frame: &Frame,
        classifier: &LineClassifier,
        visited: &VisitedMask,
        x: usize,
        y: usize,
        candidates: &[Direction],
    ) {
        self.moves.clear();
        for &d in candidates {
            let Some((tx, ty)) = d.step(x, y, frame.width(), frame.height()) else {
                continue;
            };
            let px = *frame.get(tx, ty).expect("stepped in bounds");
            if classifier.is_line(px) || visited.contains(tx, ty) {
                self.moves.push(d);
            }
        }
    }

    /// Lookahead variant: narrow candidate fan, line-colored targets only.
    fn collect_lookahead_moves(
        &mut self,
        frame: &Frame,
        classifier: &LineClassifier,
        x: usize,
        y: usize,
        dir: Direction,
    ) {
        self.moves.clear();
        for d in dir.lookahead_candidates() {
            let Some((tx, ty)) = d.step(x, y, frame.width(), frame.height()) else {
                continue;
            };
            if classifier.is_line(*frame.get(tx, ty).expect("stepped in bounds")) {
                self.moves.push(d);
            }
        }
    }

    fn reset_traveled(&mut self) {
        for &i in &self.touched {
            self.traveled[i] = 0;
        }
        self.touched.clear();
    }

    /// Returns true when the pixel was not yet traveled this attempt.
    fn record_traveled(&mut self, x: usize, y: usize, width: usize) -> bool {
        let i = y * width + x;
        if self.traveled[i] != 0 {
            return false;
        }
        self.traveled[i] = 1;
        self.touched.push(i);
        true
    }
}

#[cfg(test)]
mod tests {
    use cc_core::{Frame, LineClassifier, Rgb8, VisitedMask};

    use super::{BoundaryWalker, WalkConfig, WalkOutcome};
    use crate::counter::FrameStats;
    use crate::observe::MarkProbe;

    const LINE: Rgb8 = Rgb8::new(255, 127, 127);
    const BACKGROUND: Rgb8 = Rgb8::new(255, 255, 255);

    fn hollow_square(w: usize, h: usize, x0: usize, y0: usize, side: usize) -> Frame {
        let mut frame = Frame::new_fill(w, h, BACKGROUND);
        for i in 0..side {
            *frame.get_mut(x0 + i, y0).expect("top") = LINE;
            *frame.get_mut(x0 + i, y0 + side - 1).expect("bottom") = LINE;
            *frame.get_mut(x0, y0 + i).expect("left") = LINE;
            *frame.get_mut(x0 + side - 1, y0 + i).expect("right") = LINE;
        }
        frame
    }

    fn walk_at(frame: &Frame, seed: (usize, usize), avg: &mut f32) -> (WalkOutcome, VisitedMask) {
        let classifier = LineClassifier::default();
        let mut visited = VisitedMask::new(frame.width(), frame.height());
        let mut walker = BoundaryWalker::new();
        let mut stats = FrameStats::default();
        let outcome = walker.walk(
            frame,
            &classifier,
            &mut visited,
            seed,
            avg,
            &WalkConfig::default(),
            &mut MarkProbe::disabled(),
            &mut stats,
        );
        (outcome, visited)
    }

    #[test]
    fn square_outline_closes() {
        let frame = hollow_square(14, 14, 2, 2, 10);
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (2, 2), &mut avg);

        assert_eq!(outcome, WalkOutcome::LoopClosed);
        // 36 boundary pixels; the average folds towards the travelled count.
        assert!(avg > 35.0 && avg < 40.0);
        for x in 2..12 {
            assert!(visited.contains(x, 2), "top row pixel ({x}, 2)");
        }
    }

    #[test]
    fn closure_updates_average_exactly() {
        let frame = hollow_square(14, 14, 2, 2, 10);
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (2, 2), &mut avg);

        assert_eq!(outcome, WalkOutcome::LoopClosed);
        let travelled = visited.len() as f32;
        assert_eq!(avg, (40.0 + travelled) / 2.0);
    }

    #[test]
    fn open_segment_dead_ends_and_stays_visited() {
        let mut frame = Frame::new_fill(12, 5, BACKGROUND);
        for x in 2..10 {
            *frame.get_mut(x, 2).expect("in bounds") = LINE;
        }
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (2, 2), &mut avg);

        assert_eq!(outcome, WalkOutcome::DeadEnd);
        assert_eq!(avg, 40.0);
        for x in 2..10 {
            assert!(visited.contains(x, 2), "segment pixel ({x}, 2)");
        }
    }

    #[test]
    fn lone_perpendicular_turn_is_followed() {
        // An L: horizontal run ending in a corner where the only move turns
        // 90 degrees down. The walk takes the turn, consumes the vertical
        // leg and dead-ends past its tip.
        let mut frame = Frame::new_fill(12, 9, BACKGROUND);
        for x in 2..=8 {
            *frame.get_mut(x, 2).expect("horizontal leg") = LINE;
        }
        for y in 3..=5 {
            *frame.get_mut(8, y).expect("vertical leg") = LINE;
        }
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (2, 2), &mut avg);

        assert_eq!(outcome, WalkOutcome::DeadEnd);
        for x in 2..=8 {
            assert!(visited.contains(x, 2), "horizontal pixel ({x}, 2)");
        }
        for y in 3..=5 {
            assert!(visited.contains(8, y), "vertical pixel (8, {y})");
        }
        // The lookahead past the tip is a probe position, never a mark.
        assert!(!visited.contains(8, 6));
    }

    #[test]
    fn junction_seed_aborts_and_strips_cluster() {
        let mut frame = Frame::new_fill(9, 9, BACKGROUND);
        for i in 1..8 {
            *frame.get_mut(i, 4).expect("row") = LINE;
            *frame.get_mut(4, i).expect("col") = LINE;
        }
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (4, 4), &mut avg);

        assert_eq!(outcome, WalkOutcome::JunctionAbort);
        assert!(visited.contains(4, 4));
        assert!(visited.contains(3, 4));
        assert!(visited.contains(5, 4));
        assert!(visited.contains(4, 3));
        assert!(visited.contains(4, 5));
    }

    #[test]
    fn tiny_loop_closes_through_revisit_counter() {
        // A 3x3 ring travels 8 pixels, under 0.8 * 40, so the seed test
        // never fires; the walk orbits until the revisit counter exceeds
        // the running average and closes through that path instead.
        let frame = hollow_square(7, 7, 2, 2, 3);
        let mut avg = 40.0;

        let (outcome, visited) = walk_at(&frame, (2, 2), &mut avg);

        assert_eq!(outcome, WalkOutcome::LoopClosed);
        assert_eq!(visited.len(), 8);
        assert_eq!(avg, (40.0 + 8.0) / 2.0);
    }

    #[test]
    fn step_budget_exhaustion_is_reported() {
        let frame = hollow_square(14, 14, 2, 2, 10);
        let classifier = LineClassifier::default();
        let mut visited = VisitedMask::new(14, 14);
        let mut walker = BoundaryWalker::new();
        let mut stats = FrameStats::default();
        let mut avg = 40.0;
        let cfg = WalkConfig {
            step_budget: Some(3),
            ..WalkConfig::default()
        };

        let outcome = walker.walk(
            &frame,
            &classifier,
            &mut visited,
            (2, 2),
            &mut avg,
            &cfg,
            &mut MarkProbe::disabled(),
            &mut stats,
        );

        assert_eq!(outcome, WalkOutcome::BudgetExhausted);
    }
}
