//! The renderer-agnostic report: what JSON, HTML and PDF outputs are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::kinds::ReportType;
use super::range::DateRange;
use crate::i18n::Locale;

/// One table column: a stable key into each row object and its localized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
}

impl ColumnSpec {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Filters actually applied to the data, after scoping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppliedFilters {
    /// The project explicitly requested, if any
    pub project_id: Option<i32>,
    /// Projects the rows were restricted to; absent for unrestricted users
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<i32>>,
    pub dog_id: Option<i32>,
    pub employee_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// An export holding `returned` of `total` rows on one page; `has_next`
    /// flags truncation at the export cap.
    pub fn single_page(total: u64, returned: u64) -> Self {
        Self {
            page: 1,
            per_page: returned.max(1),
            total,
            total_pages: u64::from(total > 0),
            has_next: returned < total,
            has_prev: false,
        }
    }

    /// Zero-based offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KpiBucket {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Count(u64),
    /// `None` when there was nothing to average
    Number(Option<f64>),
    Breakdown(Vec<KpiBucket>),
}

impl KpiValue {
    /// Display form used by the HTML and PDF renderers.
    pub fn display(&self) -> String {
        match self {
            KpiValue::Count(n) => n.to_string(),
            KpiValue::Number(Some(v)) => format!("{:.2}", v),
            KpiValue::Number(None) => "-".to_string(),
            KpiValue::Breakdown(buckets) if buckets.is_empty() => "-".to_string(),
            KpiValue::Breakdown(buckets) => buckets
                .iter()
                .map(|b| format!("{}: {}", b.key, b.count))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Kpi {
    pub key: String,
    pub label: String,
    #[schema(value_type = Object)]
    pub value: KpiValue,
}

impl Kpi {
    pub fn new(key: &str, label: &str, value: KpiValue) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportDocument {
    pub report_type: ReportType,
    pub title: String,
    pub locale: Locale,
    pub range: DateRange,
    pub filters: AppliedFilters,
    pub columns: Vec<ColumnSpec>,
    /// Row objects keyed by `columns[].key`
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Value>,
    pub pagination: Pagination,
    /// Present only when `show_kpis` was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpis: Option<Vec<Kpi>>,
    pub generated_at: DateTime<Utc>,
}

impl ReportDocument {
    /// Text of one cell, empty for nulls.
    pub fn cell(row: &serde_json::Value, key: &str) -> String {
        match row.get(key) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(f) if n.is_f64() => format!("{:.2}", f),
                _ => n.to_string(),
            },
            Some(other) => other.to_string(),
        }
    }
}
