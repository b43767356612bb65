use cc_core::VisitedMask;

/// How often the diagnostic hook fires while a frame is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkGranularity {
    #[default]
    Disabled,
    /// [`TraceObserver::pixel_marked`] on every newly marked pixel.
    EveryMark,
    /// Only [`TraceObserver::frame_traced`] once per frame.
    PerFrame,
}

/// Diagnostic hook for visual debugging. The engine's results never depend
/// on an observer being present or on what it does.
pub trait TraceObserver {
    fn pixel_marked(&mut self, _x: usize, _y: usize) {}

    fn frame_traced(&mut self, _index: usize, _visited: &VisitedMask) {}
}

/// Threads an optional observer through the walker and junction resolver.
pub struct MarkProbe<'a> {
    observer: Option<&'a mut dyn TraceObserver>,
    per_mark: bool,
}

impl<'a> MarkProbe<'a> {
    pub fn new(observer: Option<&'a mut dyn TraceObserver>, granularity: MarkGranularity) -> Self {
        Self {
            per_mark: matches!(granularity, MarkGranularity::EveryMark) && observer.is_some(),
            observer,
        }
    }

    pub fn disabled() -> Self {
        Self {
            observer: None,
            per_mark: false,
        }
    }

    pub(crate) fn mark(&mut self, x: usize, y: usize) {
        if self.per_mark
            && let Some(obs) = self.observer.as_deref_mut()
        {
            obs.pixel_marked(x, y);
        }
    }

    pub(crate) fn frame_traced(&mut self, index: usize, visited: &VisitedMask) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.frame_traced(index, visited);
        }
    }
}
