use cc_core::{Error, Frame, LineClassifier, Rgb8, VisitedMask};

use crate::observe::{MarkGranularity, MarkProbe, TraceObserver};
use crate::walker::{BoundaryWalker, WalkConfig, WalkOutcome};

/// Boxed error for frame I/O collaborators.
pub type FrameError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies the ordered frame sequence. Implemented by the caller; the
/// engine never touches image decoding.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn load_frame(&mut self, index: usize) -> Result<Frame, FrameError>;
}

/// Persists annotated frames. Implemented by the caller.
pub trait FrameSink {
    fn save_frame(&mut self, index: usize, frame: &Frame) -> Result<(), FrameError>;
}

/// What to do when a frame fails to load or has zero dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record a zero count for the frame and continue, keeping the count
    /// sequence aligned with the frame order.
    SkipFrame,
    #[default]
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterConfig {
    pub classifier: LineClassifier,
    pub walk: WalkConfig,
    /// Seed for the adaptive loop-size estimate.
    pub initial_average_size: f32,
    /// Annotation color for pixels touched by walks and junction floods.
    pub marker: Rgb8,
    pub mark_granularity: MarkGranularity,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            classifier: LineClassifier::default(),
            walk: WalkConfig::default(),
            initial_average_size: 40.0,
            marker: Rgb8::new(190, 255, 48),
            mark_granularity: MarkGranularity::Disabled,
        }
    }
}

/// Per-frame outcome tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub cells: usize,
    pub walks: usize,
    pub dead_ends: usize,
    pub junction_aborts: usize,
    /// Pixels removed from the traceable graph by junction resolution.
    pub junction_pixels: usize,
    /// Walks that hit the defensive step budget. Never counted as cells.
    pub budget_exhausted: usize,
    pub visited_pixels: usize,
}

/// Scans frames row-major, walks every unvisited line pixel, and keeps one
/// cell count per frame.
///
/// The adaptive loop-size estimate persists across frames of one counter
/// instance; the visited mask is rebuilt per frame. Processing is strictly
/// sequential within a frame: later scan positions depend on the visited
/// marks of earlier walks.
#[derive(Debug)]
pub struct CellCounter {
    config: CounterConfig,
    walker: BoundaryWalker,
    counts: Vec<usize>,
    average_size: f32,
    last_visited: Option<VisitedMask>,
}

impl Default for CellCounter {
    fn default() -> Self {
        Self::new(CounterConfig::default())
    }
}

impl CellCounter {
    pub fn new(config: CounterConfig) -> Self {
        Self {
            average_size: config.initial_average_size,
            config,
            walker: BoundaryWalker::new(),
            counts: Vec::new(),
            last_visited: None,
        }
    }

    /// Cell counts of the frames processed so far, in input order.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Current adaptive loop-size estimate.
    pub fn average_size(&self) -> f32 {
        self.average_size
    }

    pub fn reset_average(&mut self) {
        self.average_size = self.config.initial_average_size;
    }

    /// Visited mask of the most recently processed frame.
    pub fn last_visited(&self) -> Option<&VisitedMask> {
        self.last_visited.as_ref()
    }

    pub fn count_frame(&mut self, frame: &Frame) -> Result<FrameStats, Error> {
        self.count_frame_observed(frame, None)
    }

    /// Like [`CellCounter::count_frame`] with a diagnostic observer. The
    /// observer sees pixel marks per [`MarkGranularity`]; results do not
    /// depend on it.
    pub fn count_frame_observed(
        &mut self,
        frame: &Frame,
        observer: Option<&mut dyn TraceObserver>,
    ) -> Result<FrameStats, Error> {
        if frame.is_empty() {
            return Err(Error::EmptyFrame);
        }

        let index = self.counts.len();
        let mut visited = VisitedMask::new(frame.width(), frame.height());
        let mut probe = match self.config.mark_granularity {
            MarkGranularity::Disabled => MarkProbe::disabled(),
            granularity => MarkProbe::new(observer, granularity),
        };

        let mut stats = FrameStats::default();
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if visited.contains(x, y) {
                    continue;
                }
                if !self
                    .config
                    .classifier
                    .is_line(*frame.get(x, y).expect("scan in bounds"))
                {
                    continue;
                }

                stats.walks += 1;
                let outcome = self.walker.walk(
                    frame,
                    &self.config.classifier,
                    &mut visited,
                    (x, y),
                    &mut self.average_size,
                    &self.config.walk,
                    &mut probe,
                    &mut stats,
                );
                match outcome {
                    WalkOutcome::LoopClosed => stats.cells += 1,
                    WalkOutcome::DeadEnd => stats.dead_ends += 1,
                    WalkOutcome::JunctionAbort => stats.junction_aborts += 1,
                    WalkOutcome::BudgetExhausted => stats.budget_exhausted += 1,
                }
            }
        }

        stats.visited_pixels = visited.len();
        if self.config.mark_granularity != MarkGranularity::Disabled {
            probe.frame_traced(index, &visited);
        }

        self.counts.push(stats.cells);
        self.last_visited = Some(visited);
        Ok(stats)
    }

    /// Drives a whole frame sequence: load, count, and (optionally) save an
    /// annotated copy of each frame.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        mut sink: Option<&mut dyn FrameSink>,
        policy: ErrorPolicy,
    ) -> Result<Vec<usize>, FrameError> {
        let total = source.frame_count();
        let mut counts = Vec::with_capacity(total);

        for index in 0..total {
            let frame = match source.load_frame(index) {
                Ok(frame) => frame,
                Err(err) => match policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::SkipFrame => {
                        // Recorded in the running sequence too, so counts()
                        // and frame indices stay aligned with source order.
                        self.counts.push(0);
                        counts.push(0);
                        continue;
                    }
                },
            };

            let stats = match self.count_frame(&frame) {
                Ok(stats) => stats,
                Err(err) => match policy {
                    ErrorPolicy::Abort => return Err(Box::new(err)),
                    ErrorPolicy::SkipFrame => {
                        self.counts.push(0);
                        counts.push(0);
                        continue;
                    }
                },
            };
            counts.push(stats.cells);

            if let Some(s) = sink.as_deref_mut() {
                let visited = self
                    .last_visited
                    .as_ref()
                    .expect("visited mask stored after counting");
                let annotated = annotate(&frame, visited, self.config.marker);
                s.save_frame(index, &annotated)?;
            }
        }

        Ok(counts)
    }
}

/// Copy of `frame` with every visited pixel recolored to `marker`.
pub fn annotate(frame: &Frame, visited: &VisitedMask, marker: Rgb8) -> Frame {
    let mut out = frame.clone();
    for (x, y) in visited.iter_marked() {
        if let Some(px) = out.get_mut(x, y) {
            *px = marker;
        }
    }
    out
}
