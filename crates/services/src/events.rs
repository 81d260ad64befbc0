use karo_core::model::Milestone;

/// Sink for milestone notifications, implemented by the presentation layer.
///
/// The engine calls it synchronously once scoring is final; any popup delay
/// is up to the implementation.
pub trait QuizEvents: Send + Sync {
    fn milestone(&self, milestone: Milestone);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl QuizEvents for NoopEvents {
    fn milestone(&self, _milestone: Milestone) {}
}
