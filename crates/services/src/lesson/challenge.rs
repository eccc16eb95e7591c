use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use super::runner::LessonRunner;

/// Countdown granularity.
pub const TICK: Duration = Duration::from_secs(1);

/// Where a lesson view is in challenge mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Idle,
    Running { remaining_secs: u32 },
    /// The countdown reached zero; no further challenge can start in this view.
    Expired,
}

/// A running countdown task bound to one lesson view.
///
/// Dropping it aborts the task, so no tick can fire after the view is gone.
pub(crate) struct Countdown {
    task: JoinHandle<()>,
    remaining: watch::Receiver<u32>,
}

impl Countdown {
    pub(crate) fn spawn(runner: Weak<Mutex<LessonRunner>>, duration_secs: u32) -> Self {
        let (tx, remaining) = watch::channel(duration_secs);
        let task = tokio::spawn(run(runner, duration_secs, tx));
        Self { task, remaining }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tick once per second, publishing the remaining seconds. The zero value is
/// published only after the runner has been auto-finished.
async fn run(runner: Weak<Mutex<LessonRunner>>, duration_secs: u32, tx: watch::Sender<u32>) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    let mut remaining = duration_secs;

    while remaining > 0 {
        ticker.tick().await;
        remaining -= 1;

        let Some(shared) = runner.upgrade() else {
            return;
        };
        if remaining > 0 {
            shared.lock().await.set_challenge_remaining(remaining);
        } else if tokio::spawn(auto_finish(shared)).await.is_err() {
            warn!("challenge auto-finish task did not complete");
        }

        tx.send_replace(remaining);
    }
}

/// Runs detached from the countdown: aborting the countdown while this is in
/// flight must not leave a check half applied.
async fn auto_finish(shared: Arc<Mutex<LessonRunner>>) {
    let mut guard = shared.lock().await;
    if let Some(outcome) = guard.expire_challenge().await {
        debug!(
            "challenge expired for {}: auto-finished at {}%",
            guard.lesson().id(),
            outcome.score_percent()
        );
    }
}
