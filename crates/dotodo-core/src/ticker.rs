//! On-demand clock ticks.
//!
//! A [`Ticker`] holds a [`TickSubscription`] only while at least one task is
//! running. The subscription owns a tokio task driving an interval; dropping
//! it aborts that task, so no timer outlives the last running task.
//!
//! ```ignore
//! let (mut ticker, mut ticks) = Ticker::new(config.tick_interval());
//! ticker.sync(board.running_count());
//! while ticker.is_active() {
//!     ticks.recv().await;
//!     board.tick();
//!     ticker.sync(board.running_count());
//! }
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// What [`Ticker::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickChange {
    Subscribed,
    Unsubscribed,
    Unchanged,
}

/// A live interval task. Aborted on drop.
#[derive(Debug)]
pub struct TickSubscription {
    handle: JoinHandle<()>,
}

impl TickSubscription {
    fn spawn(period: Duration, tx: mpsc::Sender<()>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                // A full channel means the consumer has not caught up; one
                // pending tick is as good as several.
                if let Err(mpsc::error::TrySendError::Closed(())) = tx.try_send(()) {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Subscribes to ticks while there is work to tick for.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    tx: mpsc::Sender<()>,
    subscription: Option<TickSubscription>,
}

impl Ticker {
    /// Create an idle ticker and the receiver its ticks arrive on.
    pub fn new(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let ticker = Self {
            period: period.max(Duration::from_millis(1)),
            tx,
            subscription: None,
        };
        (ticker, rx)
    }

    /// Subscribe when `running` becomes nonzero, unsubscribe when it hits zero.
    ///
    /// Must be called from within a tokio runtime.
    pub fn sync(&mut self, running: usize) -> TickChange {
        match (running > 0, self.subscription.is_some()) {
            (true, false) => {
                debug!(running, "tick subscription started");
                self.subscription = Some(TickSubscription::spawn(self.period, self.tx.clone()));
                TickChange::Subscribed
            }
            (false, true) => {
                debug!("tick subscription stopped");
                self.subscription = None;
                TickChange::Unsubscribed
            }
            _ => TickChange::Unchanged,
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drop the subscription unconditionally.
    pub fn shutdown(&mut self) {
        self.subscription = None;
    }
}
