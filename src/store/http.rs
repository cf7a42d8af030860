//! Remote document store client.
//!
//! Documents live at `{base}/streaks/{userId}`: `GET` returns the JSON record
//! (404 when absent), `PUT` replaces it.

use super::{StoreError, StreakStore};
use crate::domain::{StreakRecord, UserId};
use async_trait::async_trait;
use backoff::future::retry_notify;
use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Streak store backed by a remote HTTP document service.
#[derive(Debug, Clone)]
pub struct HttpStreakStore {
    client: Client,
    base_url: Url,
    retry_budget: Duration,
}

impl HttpStreakStore {
    /// Create a client for the service at `base_url`.
    ///
    /// Transient failures are retried with exponential backoff until
    /// `retry_budget` has elapsed; a zero budget means a single attempt.
    pub fn new(base_url: Url, retry_budget: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            retry_budget,
        }
    }

    fn document_url(&self, user: &UserId) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::StorageUnavailable(format!("store URL {} cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .push("streaks")
            .push(user.as_str());
        Ok(url)
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        }
    }
}

fn transport_error(err: reqwest::Error) -> backoff::Error<StoreError> {
    backoff::Error::transient(StoreError::StorageUnavailable(err.to_string()))
}

fn check_status(status: StatusCode) -> Result<(), backoff::Error<StoreError>> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(backoff::Error::permanent(StoreError::NotAuthenticated));
    }
    let err = StoreError::StorageUnavailable(format!("HTTP {}", status.as_u16()));
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(backoff::Error::transient(err));
    }
    Err(backoff::Error::permanent(err))
}

fn log_retry(err: StoreError, wait: Duration) {
    warn!(
        error = %err,
        retry_in_ms = wait.as_millis() as u64,
        "Streak store request failed, retrying"
    );
}

#[async_trait]
impl StreakStore for HttpStreakStore {
    async fn get_snapshot(&self, user: &UserId) -> Result<Option<StreakRecord>, StoreError> {
        let url = self.document_url(user)?;
        debug!(user = %user, url = %url, "Fetching streak document");

        retry_notify(
            self.backoff(),
            || async {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(transport_error)?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                check_status(status)?;

                let body = response.bytes().await.map_err(transport_error)?;
                serde_json::from_slice::<StreakRecord>(&body)
                    .map(Some)
                    .map_err(|e| {
                        backoff::Error::permanent(StoreError::Corrupt {
                            user: user.to_string(),
                            reason: e.to_string(),
                        })
                    })
            },
            log_retry,
        )
        .await
    }

    async fn put_snapshot(&self, user: &UserId, record: &StreakRecord) -> Result<(), StoreError> {
        let url = self.document_url(user)?;
        debug!(user = %user, url = %url, "Writing streak document");

        retry_notify(
            self.backoff(),
            || async {
                let response = self
                    .client
                    .put(url.clone())
                    .json(record)
                    .send()
                    .await
                    .map_err(transport_error)?;
                check_status(response.status())
            },
            log_retry,
        )
        .await
    }
}
