//! Filter snapshots, the fetch key derived from them, and search debouncing
//!
//! `FilterState` is never mutated in place: every update returns a new
//! snapshot, and the app compares the derived `TraceQuery` with the last one
//! it fetched to decide whether a new request is needed.

use crate::constants::{DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE};
use crate::types::{CardFilter, TimeRange};
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub page: u32,
    pub limit: u32,
    /// In the order the cards were activated
    pub active_cards: Vec<CardFilter>,
    pub time_range: TimeRange,
    /// Raw text of the search box (not debounced)
    pub search: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            active_cards: Vec::new(),
            time_range: TimeRange::All,
            search: String::new(),
        }
    }
}

impl FilterState {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn with_limit(&self, limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            ..self.clone()
        }
    }

    pub fn toggle_card(&self, card: CardFilter) -> Self {
        let mut active_cards = self.active_cards.clone();
        if let Some(pos) = active_cards.iter().position(|c| *c == card) {
            active_cards.remove(pos);
        } else {
            active_cards.push(card);
        }
        Self {
            page: 1,
            active_cards,
            ..self.clone()
        }
    }

    pub fn remove_card(&self, card: CardFilter) -> Self {
        Self {
            page: 1,
            active_cards: self
                .active_cards
                .iter()
                .copied()
                .filter(|c| *c != card)
                .collect(),
            ..self.clone()
        }
    }

    pub fn with_time_range(&self, time_range: TimeRange) -> Self {
        Self {
            page: 1,
            time_range,
            ..self.clone()
        }
    }

    /// Drop the time range chip; unlike picking a range, this keeps the page
    pub fn without_time_range(&self) -> Self {
        Self {
            time_range: TimeRange::All,
            ..self.clone()
        }
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            page: 1,
            search: search.into(),
            ..self.clone()
        }
    }

    /// Defaults, keeping the chosen page size
    pub fn cleared(&self) -> Self {
        Self {
            limit: self.limit,
            ..Self::default()
        }
    }

    pub fn is_card_active(&self, card: CardFilter) -> bool {
        self.active_cards.contains(&card)
    }

    /// Number shown on the filter badge: active cards plus a non-default time range
    pub fn active_filter_count(&self) -> usize {
        self.active_cards.len() + usize::from(self.time_range != TimeRange::All)
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0 || !self.search.trim().is_empty()
    }

    /// Fetch key for this snapshot with the given debounced search
    pub fn query(&self, debounced_search: &str) -> TraceQuery {
        TraceQuery {
            page: self.page,
            limit: self.limit,
            time_range: self.time_range,
            active_cards: self.active_cards.clone(),
            search: debounced_search.trim().to_string(),
        }
    }
}

/// Everything a traces request depends on. Two equal queries return the same page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceQuery {
    pub page: u32,
    pub limit: u32,
    pub time_range: TimeRange,
    pub active_cards: Vec<CardFilter>,
    pub search: String,
}

impl TraceQuery {
    /// Query-string parameters. Empty values are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if self.time_range != TimeRange::All {
            params.push(("timeRange", self.time_range.value().to_string()));
        }
        if !self.active_cards.is_empty() {
            let keys: Vec<&str> = self.active_cards.iter().map(|c| c.key()).collect();
            // A Vec<&str> always serializes
            params.push((
                "activeCards",
                serde_json::to_string(&keys).unwrap_or_default(),
            ));
        }
        params
    }
}

/// Delays search text changes until typing pauses.
///
/// Blank input settles immediately so clearing the box refreshes at once.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    settled: String,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            settled: String::new(),
            pending: None,
        }
    }

    /// The last settled (trimmed) search
    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// Record new input. Returns true if the settled value changed right away.
    pub fn input(&mut self, text: &str, now: Instant) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.pending = None;
            let changed = !self.settled.is_empty();
            self.settled.clear();
            return changed;
        }
        self.pending = Some((trimmed.to_string(), now + self.delay));
        false
    }

    /// Settle pending input whose deadline has passed. Returns true if the
    /// settled value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                let Some((text, _)) = self.pending.take() else {
                    return false;
                };
                if text != self.settled {
                    self.settled = text;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Time left until pending input settles, for repaint scheduling
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }

    /// Drop pending input and settle on nothing (used by "Clear all")
    pub fn reset(&mut self) -> bool {
        self.pending = None;
        let changed = !self.settled.is_empty();
        self.settled.clear();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let f = FilterState::default();
        assert_eq!(f.page, 1);
        assert_eq!(f.limit, 10);
        assert!(f.active_cards.is_empty());
        assert_eq!(f.time_range, TimeRange::All);
        assert_eq!(f.active_filter_count(), 0);
        assert!(!f.has_active_filters());
    }

    #[test]
    fn updates_return_new_snapshots() {
        let base = FilterState::default().with_page(4);
        let next = base.toggle_card(CardFilter::Failed);
        // The original snapshot is untouched
        assert_eq!(base.page, 4);
        assert!(base.active_cards.is_empty());
        assert_eq!(next.page, 1);
        assert_eq!(next.active_cards, vec![CardFilter::Failed]);
    }

    #[test]
    fn every_filter_change_resets_page() {
        let f = FilterState::default().with_page(3);
        assert_eq!(f.with_limit(25).page, 1);
        assert_eq!(f.with_time_range(TimeRange::LastDay).page, 1);
        assert_eq!(f.with_search("refund").page, 1);
        assert_eq!(f.toggle_card(CardFilter::Pii).page, 1);
        assert_eq!(f.remove_card(CardFilter::Pii).page, 1);
        assert_eq!(f.with_page(0).page, 1);
    }

    #[test]
    fn removing_time_range_chip_keeps_page() {
        let f = FilterState::default()
            .with_time_range(TimeRange::LastDay)
            .with_page(4);
        let next = f.without_time_range();
        assert_eq!(next.time_range, TimeRange::All);
        assert_eq!(next.page, 4);
        assert_eq!(next.active_filter_count(), 0);
    }

    #[test]
    fn toggle_card_keeps_activation_order() {
        let f = FilterState::default()
            .toggle_card(CardFilter::Pii)
            .toggle_card(CardFilter::Failed)
            .toggle_card(CardFilter::Anomalous)
            .toggle_card(CardFilter::Failed);
        assert_eq!(f.active_cards, vec![CardFilter::Pii, CardFilter::Anomalous]);
    }

    #[test]
    fn filter_count_includes_time_range() {
        let f = FilterState::default()
            .toggle_card(CardFilter::Failed)
            .toggle_card(CardFilter::DataExposure)
            .with_time_range(TimeRange::LastWeek);
        assert_eq!(f.active_filter_count(), 3);
        assert_eq!(f.with_time_range(TimeRange::All).active_filter_count(), 2);
        // Search is not counted on the badge
        assert_eq!(f.with_search("x").active_filter_count(), 3);
    }

    #[test]
    fn cleared_keeps_page_size() {
        let f = FilterState::default()
            .with_limit(50)
            .toggle_card(CardFilter::Failed)
            .with_time_range(TimeRange::LastHour)
            .with_search("abc")
            .with_page(2);
        let c = f.cleared();
        assert_eq!(c.limit, 50);
        assert_eq!(c, FilterState::default().with_limit(50));
    }

    #[test]
    fn default_query_sends_only_paging() {
        let q = FilterState::default().query("");
        assert_eq!(
            q.params(),
            vec![("page", "1".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn full_query_params() {
        let q = FilterState::default()
            .toggle_card(CardFilter::Failed)
            .toggle_card(CardFilter::DataExposure)
            .with_time_range(TimeRange::LastDay)
            .with_limit(25)
            .with_page(2)
            .query("  refund  ");
        assert_eq!(
            q.params(),
            vec![
                ("page", "2".to_string()),
                ("limit", "25".to_string()),
                ("search", "refund".to_string()),
                ("timeRange", "24h".to_string()),
                ("activeCards", r#"["failed","dataExposure"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn query_ignores_raw_search_text() {
        let f = FilterState::default().with_search("typing in progr");
        assert_eq!(f.query(""), FilterState::default().query(""));
    }

    #[test]
    fn debounce_settles_after_delay() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(Duration::from_millis(300));
        assert!(!d.input("ref", t0));
        assert!(!d.input("refund ", t0 + Duration::from_millis(100)));
        assert!(!d.poll(t0 + Duration::from_millis(350)));
        assert_eq!(
            d.remaining(t0 + Duration::from_millis(350)),
            Some(Duration::from_millis(50))
        );
        assert!(d.poll(t0 + Duration::from_millis(400)));
        assert_eq!(d.settled(), "refund");
        assert_eq!(d.remaining(t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn blank_input_clears_immediately() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(Duration::from_millis(300));
        d.input("abc", t0);
        assert!(d.poll(t0 + Duration::from_millis(300)));
        assert!(d.input("   ", t0 + Duration::from_millis(310)));
        assert_eq!(d.settled(), "");
        // Nothing left pending
        assert!(!d.poll(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn retyping_same_value_does_not_refetch() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(Duration::from_millis(300));
        d.input("abc", t0);
        assert!(d.poll(t0 + Duration::from_millis(300)));
        d.input("abc ", t0 + Duration::from_millis(400));
        assert!(!d.poll(t0 + Duration::from_millis(800)));
    }

    #[test]
    fn reset_drops_pending_input() {
        let t0 = Instant::now();
        let mut d = SearchDebouncer::new(Duration::from_millis(300));
        d.input("abc", t0);
        assert!(!d.reset());
        assert!(!d.poll(t0 + Duration::from_secs(1)));
        assert_eq!(d.settled(), "");
    }
}
