/// Receives completion updates from a conversion.
///
/// Updates arrive on the thread driving the conversion, in completion order.
pub trait ProgressObserver {
    /// `done` of `total` units (regions) have completed
    fn on_progress(&self, done: usize, total: usize);

    /// The conversion ended, successfully or not
    fn on_finish(&self) {}
}

/// Observer that ignores every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;
impl ProgressObserver for NoProgress {
    fn on_progress(&self, _done: usize, _total: usize) {}
}

impl<F: Fn(usize, usize)> ProgressObserver for F {
    fn on_progress(&self, done: usize, total: usize) {
        self(done, total);
    }
}
