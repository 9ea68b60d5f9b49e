use std::time::Duration;

use anyhow::Result;
use log::debug;
use reqwest::Method;
use serde_json::Value;
use tokio::time::{Instant, sleep};

use super::Client;
use crate::error::ApiError;
use crate::http::HttpAgent;

/// `status` values meaning the job has not finished yet.
pub const POLL_IN_PROGRESS: &[&str] = &["QUEUED", "WAITING"];

/// First backoff step. Each later step doubles it.
pub const INITIAL_POLL_WAIT: Duration = Duration::from_secs(1);

impl<A: HttpAgent> Client<A> {
    /// Repeats a GET until the response `status` leaves the in-progress set.
    ///
    /// Waits 1s, 2s, 4s, ... between attempts. The loop is bounded by
    /// `max_wait` (the configured default when `None`) measured from the first
    /// request; exceeding it fails with [`ApiError::PollTimeout`].
    #[tracing::instrument(skip(self))]
    pub async fn poll(
        &mut self,
        path: &str,
        params: &[(&str, &str)],
        max_wait: Option<Duration>,
    ) -> Result<Value> {
        let max_wait = max_wait.unwrap_or(self.config.poll_max_wait);
        let url = self.uri(path, params)?;
        let started = Instant::now();
        let mut wait = INITIAL_POLL_WAIT;

        let mut response = self.dispatch(Method::GET, url.clone(), None).await?;
        while is_in_progress(&response) {
            debug!(
                "{} is {}, checking again in {}s",
                path,
                response["status"],
                wait.as_secs()
            );
            sleep(wait).await;

            let elapsed = started.elapsed();
            if elapsed > max_wait {
                return Err(ApiError::PollTimeout { elapsed, max_wait }.into());
            }

            response = self.dispatch(Method::GET, url.clone(), None).await?;
            wait *= 2;
        }

        Ok(response)
    }
}

fn is_in_progress(response: &Value) -> bool {
    response
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| POLL_IN_PROGRESS.contains(&status))
}
