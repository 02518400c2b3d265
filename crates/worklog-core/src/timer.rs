//! Cancellable one-shot and periodic tasks on the tokio runtime.
//!
//! A [`ScheduledTask`] aborts its task when cancelled or dropped. Owners that
//! re-check state when the task fires compare the task's token against the
//! one they currently hold, so a replaced task can never act.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::warn;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Longest period a periodic task accepts; `Instant + period` must not overflow.
const MAX_PERIOD: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Handle for a task spawned by [`schedule_once`] or [`schedule_every`].
#[derive(Debug)]
pub struct ScheduledTask {
    abort_handle: AbortHandle,
    token: u64,
}

impl ScheduledTask {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Abort the task. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Reserve the token the next scheduled task will carry.
pub fn next_token() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}

/// Run `f(token)` once after `delay`.
///
/// Returns `None` outside a tokio runtime; the caller then runs without the timer.
pub fn schedule_once<F, Fut>(delay: Duration, f: F) -> Option<ScheduledTask>
where
    F: FnOnce(u64) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        warn!("No tokio runtime; timer not scheduled");
        return None;
    };
    let token = next_token();
    let handle = runtime.spawn(async move {
        tokio::time::sleep(delay).await;
        f(token).await;
    });
    Some(ScheduledTask {
        abort_handle: handle.abort_handle(),
        token,
    })
}

/// Run `f()` every `period`, first firing one period from now.
///
/// Periods longer than thirty years are clamped.
pub fn schedule_every<F, Fut>(period: Duration, mut f: F) -> Option<ScheduledTask>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        warn!("No tokio runtime; periodic task not scheduled");
        return None;
    };
    let period = period.min(MAX_PERIOD);
    let token = next_token();
    let handle = runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            f().await;
        }
    });
    Some(ScheduledTask {
        abort_handle: handle.abort_handle(),
        token,
    })
}
