//! Progress reporting.

/// Receives completion percentages during a run.
///
/// Implementations must not block. Any `FnMut(u8)` closure is a `Progress`.
pub trait Progress {
    /// Called with a percentage in `0..=100`, never lower than the previous
    /// call of the same run.
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> Progress for F {
    #[inline]
    fn report(&mut self, percent: u8) {
        self(percent)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    #[inline]
    fn report(&mut self, _percent: u8) {}
}

/// Forwards only values above the last one forwarded, capped at 100.
pub(crate) struct ProgressTracker<P> {
    inner: P,
    last: Option<u8>,
}

impl<P: Progress> ProgressTracker<P> {
    pub(crate) fn new(inner: P) -> Self {
        Self { inner, last: None }
    }

    pub(crate) fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.inner.report(percent);
    }
}
