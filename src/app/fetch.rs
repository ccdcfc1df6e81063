//! Background fetching of traces and metrics
//!
//! Requests run on the app's tokio runtime and report back through a channel
//! that the UI drains once per frame. Every traces request gets an id; only
//! the result of the most recent one is applied.

use super::filters::TraceQuery;
use super::App;
use crate::error::ApiError;
use crate::types::{Metrics, Trace, TracesPage};
use eframe::egui;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) enum FetchEvent {
    Traces {
        request_id: u64,
        result: Result<TracesPage, ApiError>,
    },
    Metrics(Result<Metrics, ApiError>),
}

/// Current page of traces plus the bookkeeping for in-flight requests
#[derive(Debug, Default)]
pub struct TraceFeed {
    traces: Vec<Trace>,
    total: u64,
    loading: bool,
    latest_request: u64,
    error: Option<String>,
}

impl TraceFeed {
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a new request; earlier ones become stale
    pub fn begin(&mut self) -> u64 {
        self.latest_request += 1;
        self.loading = true;
        self.latest_request
    }

    /// Apply a finished request. Returns true if the row list was replaced.
    ///
    /// A failed request degrades to an empty page.
    pub fn apply(&mut self, request_id: u64, result: Result<TracesPage, ApiError>) -> bool {
        if request_id != self.latest_request {
            debug!(request_id, latest = self.latest_request, "Discarding stale traces response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                info!(rows = page.data.len(), total = page.total, "Traces loaded");
                self.traces = page.data;
                self.total = page.total;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch traces");
                self.traces.clear();
                self.total = 0;
                self.error = Some(e.to_string());
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsState {
    Loading,
    Ready(Metrics),
    Failed,
}

impl App {
    /// Fetch again if the query derived from the current filters changed
    pub(crate) fn refresh_if_needed(&mut self, ctx: &egui::Context) {
        let query = self.filters.query(self.debouncer.settled());
        if self.last_query.as_ref() != Some(&query) {
            self.start_traces_fetch(ctx, query);
        }
    }

    pub(crate) fn start_traces_fetch(&mut self, ctx: &egui::Context, query: TraceQuery) {
        if let Some(previous) = self.cancel_token.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());

        let request_id = self.feed.begin();
        debug!(request_id, page = query.page, limit = query.limit, "Starting traces request");
        self.last_query = Some(query.clone());

        let client = self.client.clone();
        let tx = self.fetch_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_traces(&query, &token).await;
            if matches!(&result, Err(e) if e.is_cancelled()) {
                debug!(request_id, "Traces request cancelled");
                return;
            }
            let _ = tx.send(FetchEvent::Traces { request_id, result });
            ctx.request_repaint();
        });
    }

    pub(crate) fn start_metrics_fetch(&mut self, ctx: &egui::Context) {
        self.metrics = MetricsState::Loading;
        let client = self.client.clone();
        let tx = self.fetch_tx.clone();
        let token = self.shutdown.child_token();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_metrics(&token).await;
            if matches!(&result, Err(e) if e.is_cancelled()) {
                return;
            }
            let _ = tx.send(FetchEvent::Metrics(result));
            ctx.request_repaint();
        });
    }

    /// Drain finished requests into the app state
    pub(crate) fn poll_fetch_results(&mut self) {
        while let Ok(event) = self.fetch_rx.try_recv() {
            match event {
                FetchEvent::Traces { request_id, result } => {
                    if self.feed.apply(request_id, result) {
                        self.cancel_token = None;
                        self.selected_rows.clear();
                        self.list.scroll_to_top();
                    }
                }
                FetchEvent::Metrics(Ok(metrics)) => {
                    debug!(?metrics, "Metrics loaded");
                    self.metrics = MetricsState::Ready(metrics);
                }
                FetchEvent::Metrics(Err(e)) => {
                    warn!(error = %e, "Failed to fetch metrics");
                    self.metrics = MetricsState::Failed;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str], total: u64) -> TracesPage {
        TracesPage {
            data: ids
                .iter()
                .map(|id| serde_json::from_value(serde_json::json!({ "id": id })).unwrap())
                .collect(),
            total,
        }
    }

    #[test]
    fn latest_response_wins() {
        let mut feed = TraceFeed::default();
        let first = feed.begin();
        let second = feed.begin();
        assert!(feed.is_loading());

        // The newer request finishes first
        assert!(feed.apply(second, Ok(page(&["b1", "b2"], 2))));
        assert!(!feed.is_loading());

        // The superseded one must not overwrite it
        assert!(!feed.apply(first, Ok(page(&["a1"], 1))));
        assert_eq!(feed.traces().len(), 2);
        assert_eq!(feed.traces()[0].id, "b1");
        assert_eq!(feed.total(), 2);
    }

    #[test]
    fn stale_response_keeps_loading_flag() {
        let mut feed = TraceFeed::default();
        let first = feed.begin();
        feed.begin();
        assert!(!feed.apply(first, Ok(page(&["a1"], 1))));
        assert!(feed.is_loading());
        assert!(feed.traces().is_empty());
    }

    #[test]
    fn failure_degrades_to_empty_page() {
        let mut feed = TraceFeed::default();
        let id = feed.begin();
        feed.apply(id, Ok(page(&["x"], 40)));

        let id = feed.begin();
        let replaced = feed.apply(
            id,
            Err(ApiError::Status {
                status: 500,
                reason: "Internal Server Error".into(),
            }),
        );
        assert!(replaced);
        assert!(feed.traces().is_empty());
        assert_eq!(feed.total(), 0);
        assert_eq!(feed.error(), Some("HTTP 500: Internal Server Error"));

        let id = feed.begin();
        feed.apply(id, Ok(page(&[], 0)));
        assert_eq!(feed.error(), None);
    }
}
