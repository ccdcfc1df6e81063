//! REST client for the traces backend

use crate::app::filters::TraceQuery;
use crate::constants::{MAX_RETRIES, RETRY_DELAY};
use crate::error::ApiError;
use crate::types::{Metrics, TracesPage};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: RETRY_DELAY,
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retries run out. Cancellation interrupts both the attempt and the wait.
pub async fn retry_async<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    token: &CancellationToken,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        let result = tokio::select! {
            _ = token.cancelled() => return Err(ApiError::Cancelled),
            result = operation() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                warn!(
                    operation = operation_name,
                    attempt,
                    max_retries = policy.max_retries,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::select! {
                    _ = token.cancelled() => return Err(ApiError::Cancelled),
                    _ = tokio::time::sleep(policy.delay) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracesClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl TracesClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("trace-observer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    pub fn traces_url(&self, query: &TraceQuery) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().extend_pairs(query.params());
        url
    }

    pub fn metrics_url(&self) -> Result<Url, ApiError> {
        let raw = format!("{}/metrics", self.base_url.as_str().trim_end_matches('/'));
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    pub async fn fetch_traces(
        &self,
        query: &TraceQuery,
        token: &CancellationToken,
    ) -> Result<TracesPage, ApiError> {
        let url = self.traces_url(query);
        debug!(url = %url, "Fetching traces");
        retry_async(&self.retry, "fetch_traces", token, move || self.get_json(url.clone())).await
    }

    pub async fn fetch_metrics(&self, token: &CancellationToken) -> Result<Metrics, ApiError> {
        let url = self.metrics_url()?;
        debug!(url = %url, "Fetching metrics");
        retry_async(&self.retry, "fetch_metrics", token, move || self.get_json(url.clone())).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filters::FilterState;
    use crate::types::{CardFilter, TimeRange};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(1),
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: 503,
            reason: "Service Unavailable".into(),
        }
    }

    #[test]
    fn traces_url_carries_only_set_params() {
        let client = TracesClient::new("https://traces.example.com/api/traces").unwrap();
        let url = client.traces_url(&FilterState::default().query(""));
        assert_eq!(
            url.as_str(),
            "https://traces.example.com/api/traces?page=1&limit=10"
        );

        let query = FilterState::default()
            .toggle_card(CardFilter::Failed)
            .with_time_range(TimeRange::LastHour)
            .query("refund flow");
        let url = client.traces_url(&query);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("page".into(), "1".into()),
                ("limit".into(), "10".into()),
                ("search".into(), "refund flow".into()),
                ("timeRange".into(), "1h".into()),
                ("activeCards".into(), r#"["failed"]"#.into()),
            ]
        );
    }

    #[test]
    fn metrics_url_appends_segment() {
        let client = TracesClient::new("http://localhost:5000/api/traces/").unwrap();
        assert_eq!(
            client.metrics_url().unwrap().as_str(),
            "http://localhost:5000/api/traces/metrics"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = TracesClient::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let result = retry_async(&fast(), "test", &token, || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = retry_async(&fast(), "test", &token, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Status { status: 503, .. })));
        // One attempt plus three retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn decode_errors_are_not_retried() {
        let token = CancellationToken::new();
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<TracesPage, _> = retry_async(&fast(), "test", &token, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                serde_json::from_str::<TracesPage>("{not json").map_err(ApiError::from)
            }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<(), _> = retry_async(&fast(), "test", &token, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(unavailable())
            }
        })
        .await;
        assert!(result.unwrap_err().is_cancelled());
        assert!(calls.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn cancel_during_backoff() {
        let token = CancellationToken::new();
        let slow = RetryPolicy {
            max_retries: 3,
            delay: Duration::from_secs(60),
        };
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let result: Result<(), _> =
            retry_async(&slow, "test", &token, || async { Err(unavailable()) }).await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
