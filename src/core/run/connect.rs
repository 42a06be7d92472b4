use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::error::{UpdaterError, UpdaterResult};

pub const MAX_ATTEMPTS: u32 = 5;
pub const RETRY_STEP: Duration = Duration::from_secs(1);

/// Any HTTP answer from the server root means the host is up, whatever
/// the status code.
pub async fn server_reachable(client: &Client, server: &Url) -> bool {
    match client.head(server.clone()).send().await {
        Ok(response) => {
            debug!("{} answered {}", server, response.status());
            true
        }
        Err(e) => {
            warn!("{} unreachable: {}", server, e);
            false
        }
    }
}

/// Retry `attempt` with linear backoff: after failed attempt `n` wait
/// `n * step`. Gives up after `max_attempts` without a final wait.
///
/// `on_failure` is told the failed attempt number and the upcoming delay
/// (`None` once the budget is spent).
pub async fn connect_with_backoff<F, Fut>(
    max_attempts: u32,
    step: Duration,
    cancel: &CancellationToken,
    mut attempt: F,
    mut on_failure: impl FnMut(u32, Option<Duration>),
) -> UpdaterResult<bool>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = bool>,
{
    for n in 1..=max_attempts {
        if attempt(n).await {
            return Ok(true);
        }

        if n == max_attempts {
            on_failure(n, None);
            break;
        }

        let delay = step * n;
        on_failure(n, Some(delay));
        tokio::select! {
            _ = cancel.cancelled() => return Err(UpdaterError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }

    Ok(false)
}
