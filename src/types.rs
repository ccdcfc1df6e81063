//! Common types and data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One activity trace as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub application: String,
    /// Milliseconds
    #[serde(default)]
    pub duration: u64,
    /// RFC 3339
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub is_anomalous: bool,
    #[serde(default)]
    pub has_sensitive_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_calls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Fields this client does not model, kept for the raw JSON view
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Trace {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Identifier shown to the user (`id`, falling back to `traceId`)
    pub fn display_id(&self) -> &str {
        if self.id.is_empty() {
            self.trace_id.as_deref().unwrap_or_default()
        } else {
            &self.id
        }
    }

    pub fn severity(&self) -> Severity {
        if self.status == "failed" || self.is_anomalous {
            Severity::Critical
        } else if self.has_sensitive_data {
            Severity::Warning
        } else if self.is_success() {
            Severity::Healthy
        } else {
            Severity::None
        }
    }
}

/// Row stripe classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Healthy,
    None,
}

/// One page of traces
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TracesPage {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub total: u64,
}

/// Summary counters shown on the metric cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub failed_runs: u64,
    pub anomalous_runs: u64,
    pub data_exposure_runs: u64,
    pub pii_runs: u64,
}

impl Metrics {
    pub fn value_for(&self, card: CardFilter) -> u64 {
        match card {
            CardFilter::Failed => self.failed_runs,
            CardFilter::Anomalous => self.anomalous_runs,
            CardFilter::DataExposure => self.data_exposure_runs,
            CardFilter::Pii => self.pii_runs,
        }
    }
}

/// Metric card that doubles as a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardFilter {
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "anomalous")]
    Anomalous,
    #[serde(rename = "dataExposure")]
    DataExposure,
    #[serde(rename = "pii")]
    Pii,
}

impl CardFilter {
    pub const ALL: [CardFilter; 4] = [
        CardFilter::Failed,
        CardFilter::Anomalous,
        CardFilter::DataExposure,
        CardFilter::Pii,
    ];

    /// Wire key used in the `activeCards` query parameter
    pub fn key(self) -> &'static str {
        match self {
            CardFilter::Failed => "failed",
            CardFilter::Anomalous => "anomalous",
            CardFilter::DataExposure => "dataExposure",
            CardFilter::Pii => "pii",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CardFilter::Failed => "Failed Runs",
            CardFilter::Anomalous => "Anomalous Runs",
            CardFilter::DataExposure => "Data Exposure Runs",
            CardFilter::Pii => "Runs Touching PII",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            CardFilter::Failed => "Runs that failed",
            CardFilter::Anomalous => "Detected unusual behaviour",
            CardFilter::DataExposure => "Runs with data exposure",
            CardFilter::Pii => "Last 24 Hours",
        }
    }

    /// Text of the active-filter chip
    pub fn chip_label(self) -> &'static str {
        match self {
            CardFilter::Failed => "Status is failed",
            CardFilter::Anomalous => "Anomalous runs",
            CardFilter::DataExposure => "Data exposure",
            CardFilter::Pii => "Touching PII",
        }
    }
}

/// Time window filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "1h")]
    LastHour,
    #[serde(rename = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    LastMonth,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::All,
        TimeRange::LastHour,
        TimeRange::LastDay,
        TimeRange::LastWeek,
        TimeRange::LastMonth,
    ];

    pub fn value(self) -> &'static str {
        match self {
            TimeRange::All => "all",
            TimeRange::LastHour => "1h",
            TimeRange::LastDay => "24h",
            TimeRange::LastWeek => "7d",
            TimeRange::LastMonth => "30d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::All => "All Time",
            TimeRange::LastHour => "Last 1 Hour",
            TimeRange::LastDay => "Last 24 Hours",
            TimeRange::LastWeek => "Last 7 Days",
            TimeRange::LastMonth => "Last 30 Days",
        }
    }
}

/// Column that can be shown or hidden from the column menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKey {
    TraceId,
    StartTime,
    Duration,
    Agent,
    Application,
    RunSteps,
    LlmCalls,
    ToolCalls,
    Tokens,
    DataCategories,
    Anomalous,
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 11] = [
        ColumnKey::TraceId,
        ColumnKey::StartTime,
        ColumnKey::Duration,
        ColumnKey::Agent,
        ColumnKey::Application,
        ColumnKey::RunSteps,
        ColumnKey::LlmCalls,
        ColumnKey::ToolCalls,
        ColumnKey::Tokens,
        ColumnKey::DataCategories,
        ColumnKey::Anomalous,
    ];

    /// Label in the column toggle menu
    pub fn toggle_label(self) -> &'static str {
        match self {
            ColumnKey::TraceId => "Trace ID",
            ColumnKey::StartTime => "Start Time",
            ColumnKey::Duration => "Duration",
            ColumnKey::Agent => "Agent",
            ColumnKey::Application => "Application",
            ColumnKey::RunSteps => "Run Steps",
            ColumnKey::LlmCalls => "LLM Calls",
            ColumnKey::ToolCalls => "Tool Calls",
            ColumnKey::Tokens => "Tokens",
            ColumnKey::DataCategories => "Data Categories",
            ColumnKey::Anomalous => "Anomalous",
        }
    }
}

/// Set of visible toggleable columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleColumns(BTreeSet<ColumnKey>);

impl Default for VisibleColumns {
    fn default() -> Self {
        Self(ColumnKey::ALL.into_iter().collect())
    }
}

impl VisibleColumns {
    pub fn is_visible(&self, key: ColumnKey) -> bool {
        self.0.contains(&key)
    }

    /// Returns a new set with `key` flipped
    pub fn toggled(&self, key: ColumnKey) -> Self {
        let mut set = self.0.clone();
        if !set.remove(&key) {
            set.insert(key);
        }
        Self(set)
    }

    /// Header/cell layout for the visible columns
    pub fn table_columns(&self) -> Vec<TableColumn> {
        let mut cols = vec![TableColumn::Select, TableColumn::Status];
        for key in ColumnKey::ALL {
            if !self.is_visible(key) {
                continue;
            }
            match key {
                ColumnKey::TraceId => cols.push(TableColumn::TraceId),
                ColumnKey::StartTime => cols.push(TableColumn::StartTime),
                ColumnKey::Duration => cols.push(TableColumn::Duration),
                ColumnKey::Agent => cols.push(TableColumn::Agent),
                ColumnKey::Application => cols.push(TableColumn::Application),
                ColumnKey::RunSteps => cols.push(TableColumn::RunSteps),
                ColumnKey::LlmCalls => cols.push(TableColumn::LlmCalls),
                ColumnKey::ToolCalls => cols.push(TableColumn::ToolCalls),
                ColumnKey::Tokens => {
                    cols.push(TableColumn::InputTokens);
                    cols.push(TableColumn::OutputTokens);
                }
                ColumnKey::DataCategories => cols.push(TableColumn::DataCategories),
                ColumnKey::Anomalous => cols.push(TableColumn::Anomalous),
            }
        }
        cols
    }
}

/// Physical table column (header cell + body cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Select,
    Status,
    TraceId,
    StartTime,
    Duration,
    Agent,
    Application,
    RunSteps,
    LlmCalls,
    ToolCalls,
    InputTokens,
    OutputTokens,
    DataCategories,
    Anomalous,
}

impl TableColumn {
    pub fn header(self) -> &'static str {
        match self {
            TableColumn::Select | TableColumn::Status => "",
            TableColumn::TraceId => "TRACE ID",
            TableColumn::StartTime => "START TIME",
            TableColumn::Duration => "DURATION",
            TableColumn::Agent => "AGENT",
            TableColumn::Application => "APPLICATION",
            TableColumn::RunSteps => "STEPS",
            TableColumn::LlmCalls => "LLM",
            TableColumn::ToolCalls => "TOOLS",
            TableColumn::InputTokens => "IN TOKENS",
            TableColumn::OutputTokens => "OUT TOKENS",
            TableColumn::DataCategories => "CATEGORIES",
            TableColumn::Anomalous => "ANOM.",
        }
    }

    pub fn width(self) -> ColumnWidth {
        match self {
            TableColumn::Select | TableColumn::Status => ColumnWidth::Fixed(36.0),
            TableColumn::TraceId => ColumnWidth::Parts(2.0),
            TableColumn::StartTime => ColumnWidth::Parts(1.4),
            TableColumn::Duration => ColumnWidth::Parts(1.0),
            TableColumn::Agent => ColumnWidth::Parts(1.6),
            TableColumn::Application => ColumnWidth::Parts(1.6),
            TableColumn::RunSteps | TableColumn::LlmCalls | TableColumn::ToolCalls => {
                ColumnWidth::Parts(0.7)
            }
            TableColumn::InputTokens | TableColumn::OutputTokens => ColumnWidth::Parts(1.0),
            TableColumn::DataCategories => ColumnWidth::Parts(1.3),
            TableColumn::Anomalous => ColumnWidth::Parts(0.8),
        }
    }

    /// Centered numeric/badge columns
    pub fn is_centered(self) -> bool {
        matches!(
            self,
            TableColumn::RunSteps
                | TableColumn::LlmCalls
                | TableColumn::ToolCalls
                | TableColumn::InputTokens
                | TableColumn::OutputTokens
                | TableColumn::Anomalous
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    Fixed(f32),
    Parts(f32),
}

/// Resolve column widths for the available table width
pub fn layout_columns(columns: &[TableColumn], available_width: f32) -> Vec<f32> {
    let fixed: f32 = columns
        .iter()
        .filter_map(|c| match c.width() {
            ColumnWidth::Fixed(w) => Some(w),
            ColumnWidth::Parts(_) => None,
        })
        .sum();
    let parts: f32 = columns
        .iter()
        .filter_map(|c| match c.width() {
            ColumnWidth::Parts(p) => Some(p),
            ColumnWidth::Fixed(_) => None,
        })
        .sum();
    let part = if parts > 0.0 {
        ((available_width - fixed).max(0.0)) / parts
    } else {
        0.0
    };

    columns
        .iter()
        .map(|c| match c.width() {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Parts(p) => p * part,
        })
        .collect()
}
