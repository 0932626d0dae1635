//! Deadline-bounded polling.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Result of [`poll_until`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe reported a value
    Ready(T),
    /// The deadline passed first
    TimedOut { waited: Duration },
}

/// Run `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe returns `Ok(Some(v))` when the awaited condition holds,
/// `Ok(None)` to keep waiting, and `Err` to stop immediately. It is always
/// called at least once, and once more at the deadline, so a condition that
/// becomes true exactly at the deadline is still observed.
pub async fn poll_until<T, E, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let start = Instant::now();
    let deadline = start + timeout;

    loop {
        if let Some(value) = probe().await? {
            return Ok(PollOutcome::Ready(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(PollOutcome::TimedOut {
                waited: now - start,
            });
        }

        sleep(interval.min(deadline - now)).await;
    }
}
