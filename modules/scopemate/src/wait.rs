//! Condition waits. Every wait in the system goes through `wait_until`,
//! which makes the one deliberately unbounded wait (the human-approved
//! second factor) an explicit `deadline: None` at the call site instead of
//! an accident of omission.

use std::future::Future;
use std::time::Duration;

use chromiumoxide::{Element, Page};
use thiserror::Error;
use tokio::time::{sleep, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
#[error("condition not met within {0:?}")]
pub struct WaitTimeout(pub Duration);

/// Poll `condition` until it yields a value. `deadline: None` waits
/// forever; callers opt into that explicitly.
pub async fn wait_until<F, Fut, T>(
    mut condition: F,
    interval: Duration,
    deadline: Option<Duration>,
) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = condition().await {
            return Ok(value);
        }
        if let Some(limit) = deadline {
            if started.elapsed() >= limit {
                return Err(WaitTimeout(limit));
            }
        }
        sleep(interval).await;
    }
}

/// Bounded wait for an element to exist in the page.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<Element, WaitTimeout> {
    wait_until(
        || {
            let page = page.clone();
            let selector = selector.to_string();
            async move { page.find_element(&selector).await.ok() }
        },
        POLL_INTERVAL,
        Some(timeout),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn immediate_condition_returns_at_once() {
        let value = wait_until(
            || async { Some(42) },
            Duration::from_millis(1),
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn bounded_wait_times_out() {
        let result: Result<(), _> = wait_until(
            || async { None },
            Duration::from_millis(1),
            Some(Duration::from_millis(10)),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unbounded_wait_returns_when_condition_flips() {
        let polls = AtomicU32::new(0);
        let value = wait_until(
            || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move { (n >= 5).then_some("approved") }
            },
            Duration::from_millis(1),
            None,
        )
        .await
        .unwrap();
        assert_eq!(value, "approved");
    }
}
