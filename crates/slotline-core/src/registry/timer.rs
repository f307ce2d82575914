use tokio_util::sync::CancellationToken;

/// Stop handle of a spawned timer task.
///
/// The timer task watches the paired [`CancellationToken`]; stopping the handle
/// (explicitly or by dropping it) ends the task at its next wakeup.
#[derive(Debug, Default)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Create a handle for a timer that is about to be spawned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to hand over to the timer task.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop the timer.
    #[inline]
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the timer has been stopped.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
