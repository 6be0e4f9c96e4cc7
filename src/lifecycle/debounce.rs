use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Collapses a burst of signals into one delivery, `window` after the last signal.
///
/// Only the latest value is kept. Time is passed in by the caller so the host event loop stays
/// in charge of scheduling.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    closed: bool,
}

impl<T> Debouncer<T> {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(500);

    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            closed: false,
        }
    }

    /// Records a signal and restarts the window. Ignored once closed.
    pub fn signal(&mut self, value: T, now: Instant) -> bool {
        if self.closed {
            return false;
        }
        self.pending = Some((value, now + self.window));
        true
    }

    /// Takes the pending value if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Cancels the pending signal and refuses any further ones.
    pub fn close(&mut self) {
        self.pending = None;
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

/// Shared debouncer, handed to whoever produces the signals.
pub type SharedDebouncer<T> = Arc<Mutex<Debouncer<T>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once_with_last_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.signal(1, start);
        debouncer.signal(2, start + Duration::from_millis(300));
        assert_eq!(debouncer.poll(start + Duration::from_millis(600)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(800)), Some(2));
        assert_eq!(debouncer.poll(start + Duration::from_millis(2000)), None);
    }

    #[test]
    fn test_closed_debouncer_ignores_signals() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.signal(1, start);
        debouncer.close();
        assert!(!debouncer.signal(2, start));
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
