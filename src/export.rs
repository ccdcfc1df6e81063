//! CSV export of traces and JSON export of the current filters

use crate::app::filters::FilterState;
use crate::error::ExportError;
use crate::types::Trace;
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::info;

const CSV_HEADERS: [&str; 9] = [
    "ID",
    "Name",
    "Status",
    "Agent",
    "Application",
    "Duration",
    "Timestamp",
    "Anomalous",
    "Sensitive Data",
];

pub const FILTERS_FILE_NAME: &str = "traces-filters.json";

/// What the export button will write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Filters,
}

impl ExportKind {
    /// CSV when there is anything to export, the filter snapshot otherwise
    pub fn for_row_count(rows: usize) -> Self {
        if rows == 0 {
            ExportKind::Filters
        } else {
            ExportKind::Csv
        }
    }

    pub fn default_file_name(self, today: NaiveDate) -> String {
        match self {
            ExportKind::Csv => csv_file_name(today),
            ExportKind::Filters => FILTERS_FILE_NAME.to_string(),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::Filters => "json",
        }
    }
}

pub fn csv_file_name(today: NaiveDate) -> String {
    format!("traces-export-{}.csv", today.format("%Y-%m-%d"))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Every cell quoted, embedded quotes doubled, rows joined with `\n`
pub fn traces_to_csv<'a>(
    traces: impl IntoIterator<Item = &'a Trace>,
) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    for t in traces {
        writer.write_record([
            t.id.as_str(),
            t.name.as_str(),
            t.status.as_str(),
            t.agent.as_str(),
            t.application.as_str(),
            t.duration.to_string().as_str(),
            t.timestamp.as_str(),
            yes_no(t.is_anomalous),
            yes_no(t.has_sensitive_data),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let mut csv = String::from_utf8_lossy(&bytes).into_owned();
    // No terminator after the last row
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}

pub fn filters_to_json(filters: &FilterState) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(filters)?)
}

fn write(path: &Path, contents: &str) -> Result<PathBuf, ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

pub fn write_csv<'a>(
    path: &Path,
    traces: impl IntoIterator<Item = &'a Trace>,
) -> Result<PathBuf, ExportError> {
    let csv = traces_to_csv(traces)?;
    let written = write(path, &csv)?;
    info!(path = %written.display(), bytes = csv.len(), "Exported traces as CSV");
    Ok(written)
}

pub fn write_filters(path: &Path, filters: &FilterState) -> Result<PathBuf, ExportError> {
    let json = filters_to_json(filters)?;
    let written = write(path, &json)?;
    info!(path = %written.display(), "Exported filters as JSON");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardFilter, TimeRange};

    fn trace(id: &str, name: &str, anomalous: bool) -> Trace {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "status": "success",
            "agent": "planner",
            "application": "support-bot",
            "duration": 1520,
            "timestamp": "2024-01-05T14:03:00Z",
            "isAnomalous": anomalous,
            "hasSensitiveData": true
        }))
        .unwrap()
    }

    #[test]
    fn csv_layout() {
        let rows = [trace("t-1", "Refund", true), trace("t-2", "Lookup", false)];
        let csv = traces_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            r#""ID","Name","Status","Agent","Application","Duration","Timestamp","Anomalous","Sensitive Data""#
        );
        assert_eq!(
            lines[1],
            r#""t-1","Refund","success","planner","support-bot","1520","2024-01-05T14:03:00Z","Yes","Yes""#
        );
        assert!(lines[2].ends_with(r#""No","Yes""#));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let rows = [trace("t-3", r#"say "hi", then leave"#, false)];
        let csv = traces_to_csv(&rows).unwrap();
        assert!(csv.contains(r#""say ""hi"", then leave""#));
    }

    #[test]
    fn commas_and_newlines_stay_inside_one_cell() {
        let rows = [trace("t-4", "first, second\nthird", false)];
        let csv = traces_to_csv(&rows).unwrap();
        assert!(csv.contains("\"first, second\nthird\""));
        assert!(csv.starts_with("\"ID\","));
    }

    #[test]
    fn header_only_for_no_rows() {
        let csv = traces_to_csv(std::iter::empty()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn file_names() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(csv_file_name(day), "traces-export-2024-03-09.csv");
        assert_eq!(ExportKind::for_row_count(0), ExportKind::Filters);
        assert_eq!(ExportKind::for_row_count(3), ExportKind::Csv);
        assert_eq!(
            ExportKind::Filters.default_file_name(day),
            "traces-filters.json"
        );
    }

    #[test]
    fn filters_json_uses_wire_names() {
        let f = FilterState::default()
            .toggle_card(CardFilter::DataExposure)
            .with_time_range(TimeRange::LastMonth);
        let value: serde_json::Value =
            serde_json::from_str(&filters_to_json(&f).unwrap()).unwrap();
        assert_eq!(value["activeCards"], serde_json::json!(["dataExposure"]));
        assert_eq!(value["timeRange"], "30d");
        assert_eq!(value["page"], 1);
        assert_eq!(value["limit"], 10);
        assert_eq!(value["search"], "");
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [trace("t-1", "Refund", false)];

        let csv_path = dir.path().join("out.csv");
        let written = write_csv(&csv_path, &rows).unwrap();
        assert_eq!(written, csv_path);
        assert_eq!(
            std::fs::read_to_string(&csv_path).unwrap(),
            traces_to_csv(&rows).unwrap()
        );

        let json_path = dir.path().join(FILTERS_FILE_NAME);
        write_filters(&json_path, &FilterState::default()).unwrap();
        assert!(std::fs::read_to_string(&json_path).unwrap().contains("\"page\": 1"));
    }

    #[test]
    fn write_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_csv(&path, std::iter::empty()).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
        assert!(err.to_string().contains("out.csv"));
    }
}
