//! HTML and PDF output for report documents. JSON output is the document
//! itself, serialized by the handler.

pub mod html;
pub mod pdf;

pub use html::{escape_html, render_html};
pub use pdf::{BasicPdfRenderer, PdfRenderer};

use super::document::ReportDocument;
use crate::i18n::Msg;

/// Attachment name for an exported report, e.g. `veterinary-report_2024-03-01_2024-03-31.pdf`.
pub fn pdf_filename(doc: &ReportDocument) -> String {
    format!(
        "{}-report_{}_{}.pdf",
        doc.report_type.slug(),
        doc.range.date_from.format("%Y-%m-%d"),
        doc.range.date_to.format("%Y-%m-%d")
    )
}

/// "Period: 2024-03-01 - 2024-03-31" in the document locale.
pub(crate) fn period_line(doc: &ReportDocument) -> String {
    if doc.range.date_from == doc.range.date_to {
        format!("{}: {}", doc.locale.text(Msg::Period), doc.range.date_from)
    } else {
        format!(
            "{}: {} - {}",
            doc.locale.text(Msg::Period),
            doc.range.date_from,
            doc.range.date_to
        )
    }
}

pub(crate) fn generated_line(doc: &ReportDocument) -> String {
    format!(
        "{}: {}",
        doc.locale.text(Msg::GeneratedAt),
        doc.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use crate::i18n::Locale;
    use crate::reports::document::*;
    use crate::reports::kinds::ReportType;
    use crate::reports::range::{DateRange, RangeType};

    pub fn document(locale: Locale, rows: usize, with_kpis: bool) -> ReportDocument {
        let from = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        ReportDocument {
            report_type: ReportType::Veterinary,
            title: ReportType::Veterinary.title(locale).to_string(),
            locale,
            range: DateRange {
                range_type: RangeType::Monthly,
                date_from: from,
                date_to: to,
            },
            filters: AppliedFilters::default(),
            columns: vec![
                ColumnSpec::new("date", "Date"),
                ColumnSpec::new("dog", "Dog"),
                ColumnSpec::new("cost", "Cost"),
            ],
            rows: (0..rows)
                .map(|i| json!({"date": "2024-03-02", "dog": format!("Rex {}", i), "cost": 10.5}))
                .collect(),
            pagination: Pagination::new(1, 25, rows as u64),
            kpis: with_kpis.then(|| {
                vec![Kpi::new("total_visits", "Total visits", KpiValue::Count(rows as u64))]
            }),
            generated_at: Utc.with_ymd_and_hms(2024, 3, 31, 9, 30, 0).unwrap(),
        }
    }
}
