// # Scheduled Tasks
//
// Cancellable timers backed by spawned tokio tasks. A timer never touches
// scheduler state directly: when it fires it posts a message back to the
// owning task, which decides whether the message is still current.
//
// ## Cancellation
//
// - `cancel()` aborts the task; calling it again (or after the timer has
//   fired) is a no-op
// - Dropping a `ScheduledTask` cancels it, so replacing a stored timer
//   cancels the previous instance
// - A message already queued before cancellation may still be delivered;
//   receivers must discard stale messages

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A cancellable one-shot or repeating timer
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Post `message` to `tx` once, after `delay`
    pub fn after<T: Send + 'static>(delay: Duration, tx: mpsc::UnboundedSender<T>, message: T) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message);
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Post `message` to `tx` every `period`, first after one full period
    ///
    /// Stops on its own once the receiver is gone.
    pub fn every<T: Clone + Send + 'static>(
        period: Duration,
        tx: mpsc::UnboundedSender<T>,
        message: T,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if tx.send(message.clone()).is_err() {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Cancel the timer (idempotent)
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the timer may still fire
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
