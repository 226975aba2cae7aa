//! Unified reporting: request normalization, date ranges, permission scoping,
//! data sources and output rendering.

pub mod clock;
pub mod document;
pub mod error;
pub mod kinds;
pub mod legacy;
pub mod query;
pub mod range;
pub mod render;
pub mod scope;
pub mod sources;

pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{AppliedFilters, ColumnSpec, Kpi, KpiBucket, KpiValue, Pagination, ReportDocument};
pub use error::ReportError;
pub use kinds::ReportType;
pub use query::{OutputFormat, ReportQuery, ReportRequest};
pub use range::{resolve_range, DateRange, RangeType};
pub use scope::{ProjectScope, UserGrants};

/// Size limits applied while normalizing and generating reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLimits {
    pub default_per_page: u64,
    pub max_per_page: u64,
    pub max_custom_days: i64,
    pub export_max_rows: u64,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            default_per_page: 25,
            max_per_page: 200,
            max_custom_days: 366,
            export_max_rows: 5000,
        }
    }
}
