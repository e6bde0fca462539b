use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// One armed, not-yet-fired timed wallpaper change.
///
/// Arming spawns a task that sleeps until the deadline and then delivers a
/// single fire event on the given channel. The flag flips exactly once, in
/// either `cancel` or the timer task, so a fire and a cancel can race freely:
/// whichever wins excludes the other. Cancellation therefore prevents fires
/// that have not started yet but never interrupts one that has.
#[derive(Debug)]
pub struct PendingAction {
    fire_at: Instant,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl PendingAction {
    pub fn arm(delay: Duration, fired: mpsc::Sender<()>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let fire_at = Instant::now() + delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(fire_at).await;
            if flag
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                // Receiver gone means the scheduler is shutting down
                let _ = fired.send(()).await;
            }
        });

        Self {
            fire_at,
            cancelled,
            handle,
        }
    }

    /// Idempotent. Cancelling an action that already fired is a no-op.
    /// Returns true when the cancel won, i.e. the action will never fire.
    pub fn cancel(&self) -> bool {
        let won = self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            self.handle.abort();
        }
        won
    }

    /// Time remaining until the deadline; zero once it has passed.
    pub fn scheduled_in(&self) -> Duration {
        self.fire_at.saturating_duration_since(Instant::now())
    }
}

impl Drop for PendingAction {
    fn drop(&mut self) {
        // No orphaned scheduled work survives the owner
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(1);
        let pending = PendingAction::arm(Duration::from_secs(30), tx);
        assert!(pending.scheduled_in() <= Duration::from_secs(30));

        rx.recv().await.expect("timer should fire");
        assert_eq!(pending.scheduled_in(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (tx, mut rx) = mpsc::channel(1);
        let pending = PendingAction::arm(Duration::from_secs(30), tx);

        pending.cancel();
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::channel(1);
        let pending = PendingAction::arm(Duration::from_secs(30), tx);

        assert!(pending.cancel());
        assert!(!pending.cancel());
        assert!(!pending.cancel());

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let (tx, mut rx) = mpsc::channel(1);
        let pending = PendingAction::arm(Duration::from_secs(1), tx);

        rx.recv().await.expect("timer should fire");
        assert!(!pending.cancel());

        // No second event can ever arrive
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel(1);
        let pending = PendingAction::arm(Duration::from_secs(30), tx);
        drop(pending);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_at_most_one_fire_under_racing_cancels() {
        // Repeatedly race a cancel against a very short deadline. A winning
        // cancel means the action never fires; a losing cancel means the
        // fire was already in flight and arrives exactly once.
        for round in 0..200u64 {
            let (tx, mut rx) = mpsc::channel(1);
            let pending = PendingAction::arm(Duration::from_micros(200), tx);

            tokio::time::sleep(Duration::from_micros((round % 7) * 100)).await;
            let cancel_won = pending.cancel();

            tokio::time::sleep(Duration::from_millis(2)).await;
            let mut events = 0;
            while rx.try_recv().is_ok() {
                events += 1;
            }

            if cancel_won {
                assert_eq!(events, 0, "fire escaped a winning cancel in round {}", round);
            } else {
                assert_eq!(events, 1, "expected exactly one fire in round {}", round);
            }
        }
    }
}
