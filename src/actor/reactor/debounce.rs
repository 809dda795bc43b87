use std::future;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Restart-on-retrigger timer. Every [`trigger`](Self::trigger) pushes the
/// deadline out by the full delay; the owner polls [`fired`](Self::fired)
/// from its select loop and claims the run with [`take`](Self::take).
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self { Self { delay, deadline: None } }

    /// Applies from the next trigger on.
    pub fn set_delay(&mut self, delay: Duration) { self.delay = delay; }

    pub fn trigger(&mut self) { self.deadline = Some(Instant::now() + self.delay); }

    pub fn is_pending(&self) -> bool { self.deadline.is_some() }

    /// Completes at the deadline. Never completes while nothing is pending.
    pub async fn fired(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => future::pending().await,
        }
    }

    /// Clears the pending run, returning whether there was one.
    pub fn take(&mut self) -> bool { self.deadline.take().is_some() }
}

#[cfg(test)]
mod tests {
    use tokio::time::{advance, timeout};

    use super::*;

    const DELAY: Duration = Duration::from_millis(1000);

    /// The paused clock jumps straight to deadlines, up to timer resolution.
    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "{elapsed:?} vs {expected:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_delay() {
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.is_pending());
        let start = Instant::now();
        debouncer.trigger();
        debouncer.fired().await;
        assert_elapsed(start, DELAY);
        assert!(debouncer.take());
        assert!(!debouncer.take());
    }

    #[tokio::test(start_paused = true)]
    async fn retrigger_restarts_the_timer() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();
        debouncer.trigger();
        advance(Duration::from_millis(600)).await;
        debouncer.trigger();
        debouncer.fired().await;
        assert_elapsed(start, Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_debouncer_never_fires() {
        let debouncer = Debouncer::new(DELAY);
        assert!(timeout(Duration::from_secs(60), debouncer.fired()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn new_delay_applies_to_next_trigger() {
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.set_delay(Duration::from_millis(50));
        let start = Instant::now();
        debouncer.trigger();
        debouncer.fired().await;
        assert_elapsed(start, Duration::from_millis(50));
    }
}
