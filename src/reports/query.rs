//! Turns the raw query string of a report request into a typed request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use super::error::ReportError;
use super::range::{resolve_range, DateRange, RangeType};
use super::ReportLimits;

/// Raw report query parameters. Every field is kept as text so that each
/// malformed value can be reported by name; blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Restrict to one project (must be within the caller's scope)
    pub project_id: Option<String>,
    /// daily | weekly | monthly | custom
    pub range_type: Option<String>,
    /// Range start, YYYY-MM-DD
    pub date_from: Option<String>,
    /// Range end, YYYY-MM-DD
    pub date_to: Option<String>,
    pub dog_id: Option<String>,
    /// Responsible staff member (vet, trainer, recorder or examiner)
    pub employee_id: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    pub per_page: Option<String>,
    /// true/false, 1/0, yes/no, on/off
    pub show_kpis: Option<String>,
    /// json | html | pdf
    pub format: Option<String>,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
    Pdf,
}

/// A validated report request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub range: DateRange,
    pub project_id: Option<i32>,
    pub dog_id: Option<i32>,
    pub employee_id: Option<i32>,
    pub page: u64,
    pub per_page: u64,
    pub show_kpis: bool,
    pub format: OutputFormat,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_id(field: &'static str, raw: &Option<String>) -> Result<Option<i32>, ReportError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    let parsed = value
        .parse::<i64>()
        .map_err(|_| ReportError::InvalidInteger {
            field,
            value: value.to_string(),
        })?;
    if parsed <= 0 {
        return Err(ReportError::NotPositive { field });
    }
    i32::try_from(parsed)
        .map(Some)
        .map_err(|_| ReportError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn parse_count(field: &'static str, raw: &Option<String>) -> Result<Option<u64>, ReportError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    let parsed = value
        .parse::<i64>()
        .map_err(|_| ReportError::InvalidInteger {
            field,
            value: value.to_string(),
        })?;
    if parsed <= 0 {
        return Err(ReportError::NotPositive { field });
    }
    Ok(Some(parsed as u64))
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, ReportError> {
    let Some(value) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ReportError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

fn parse_flag(field: &'static str, raw: &Option<String>) -> Result<Option<bool>, ReportError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(ReportError::InvalidBoolean {
            field,
            value: value.to_string(),
        }),
    }
}

impl ReportQuery {
    /// Builds the query from a raw query string. Repeated keys keep the last
    /// value, unknown keys are ignored.
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut query = ReportQuery::default();
        let Some(raw) = raw else {
            return query;
        };
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "project_id" => &mut query.project_id,
                "range_type" => &mut query.range_type,
                "date_from" => &mut query.date_from,
                "date_to" => &mut query.date_to,
                "dog_id" => &mut query.dog_id,
                "employee_id" => &mut query.employee_id,
                "page" => &mut query.page,
                "per_page" => &mut query.per_page,
                "show_kpis" => &mut query.show_kpis,
                "format" => &mut query.format,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        query
    }

    /// Validates every parameter and resolves the date range.
    pub fn normalize(
        &self,
        today: NaiveDate,
        limits: &ReportLimits,
    ) -> Result<ReportRequest, ReportError> {
        let format = match present(&self.format) {
            None => OutputFormat::default(),
            Some(value) => value
                .parse::<OutputFormat>()
                .map_err(|_| ReportError::UnknownFormat(value.to_string()))?,
        };

        let project_id = parse_id("project_id", &self.project_id)?;
        let dog_id = parse_id("dog_id", &self.dog_id)?;
        let employee_id = parse_id("employee_id", &self.employee_id)?;

        let page = parse_count("page", &self.page)?.unwrap_or(1);
        let per_page = parse_count("per_page", &self.per_page)?
            .unwrap_or(limits.default_per_page)
            .min(limits.max_per_page);
        let show_kpis = parse_flag("show_kpis", &self.show_kpis)?.unwrap_or(false);

        let range_type = RangeType::parse(self.range_type.as_deref())?;
        let date_from = parse_date("date_from", self.date_from.as_deref())?;
        let date_to = parse_date("date_to", self.date_to.as_deref())?;
        let range = resolve_range(range_type, date_from, date_to, today, limits.max_custom_days)?;

        Ok(ReportRequest {
            range,
            project_id,
            dog_id,
            employee_id,
            page,
            per_page,
            show_kpis,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    fn normalize(qs: &str) -> Result<ReportRequest, ReportError> {
        ReportQuery::from_query_string(Some(qs)).normalize(today(), &ReportLimits::default())
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let req = ReportQuery::default()
            .normalize(today(), &ReportLimits::default())
            .unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 25);
        assert!(!req.show_kpis);
        assert_eq!(req.format, OutputFormat::Json);
        assert_eq!(req.range.range_type, RangeType::Daily);
        assert_eq!(req.range.date_from, today());
        assert_eq!(req.project_id, None);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let req = normalize("project_id=&dog_id=&range_type=&page=&format=").unwrap();
        assert_eq!(req.project_id, None);
        assert_eq!(req.dog_id, None);
        assert_eq!(req.page, 1);
    }

    #[test]
    fn full_query_is_parsed() {
        let req = normalize(
            "project_id=3&range_type=custom&date_from=2024-01-01&date_to=2024-01-31\
             &dog_id=9&employee_id=4&page=2&per_page=10&show_kpis=yes&format=HTML",
        )
        .unwrap();
        assert_eq!(req.project_id, Some(3));
        assert_eq!(req.dog_id, Some(9));
        assert_eq!(req.employee_id, Some(4));
        assert_eq!((req.page, req.per_page), (2, 10));
        assert!(req.show_kpis);
        assert_eq!(req.format, OutputFormat::Html);
        assert_eq!(req.range.days(), 31);
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(normalize("per_page=5000").unwrap().per_page, 200);
    }

    #[test]
    fn repeated_keys_keep_the_last_value() {
        assert_eq!(normalize("page=1&page=4").unwrap().page, 4);
    }

    #[test_case("project_id=abc", "project_id"; "non numeric project")]
    #[test_case("dog_id=1.5", "dog_id"; "fractional dog")]
    #[test_case("employee_id=99999999999", "employee_id"; "overflowing employee")]
    #[test_case("page=two", "page"; "non numeric page")]
    fn malformed_integers_name_their_field(qs: &str, expected: &str) {
        assert_matches!(normalize(qs), Err(ReportError::InvalidInteger { field, .. }) if field == expected);
    }

    #[test_case("page=0", "page")]
    #[test_case("per_page=0", "per_page")]
    #[test_case("project_id=-2", "project_id")]
    fn non_positive_values_are_rejected(qs: &str, expected: &str) {
        assert_matches!(normalize(qs), Err(ReportError::NotPositive { field }) if field == expected);
    }

    #[test_case("true", true)]
    #[test_case("1", true)]
    #[test_case("ON", true)]
    #[test_case("no", false)]
    #[test_case("0", false)]
    fn show_kpis_flags(raw: &str, expected: bool) {
        assert_eq!(normalize(&format!("show_kpis={}", raw)).unwrap().show_kpis, expected);
    }

    #[test]
    fn bad_flag_format_and_dates() {
        assert_matches!(normalize("show_kpis=maybe"), Err(ReportError::InvalidBoolean { .. }));
        assert_matches!(normalize("format=xlsx"), Err(ReportError::UnknownFormat(f)) if f == "xlsx");
        assert_matches!(
            normalize("date_from=13/03/2024"),
            Err(ReportError::InvalidDate { field: "date_from", .. })
        );
        assert_matches!(
            normalize("range_type=custom&date_from=2024-02-30&date_to=2024-03-01"),
            Err(ReportError::InvalidDate { field: "date_from", .. })
        );
        assert_matches!(
            normalize("range_type=fortnightly"),
            Err(ReportError::UnknownRangeType(_))
        );
    }

    #[test]
    fn inverted_dates_are_a_bad_request() {
        assert_matches!(
            normalize("date_from=2024-03-10&date_to=2024-03-01"),
            Err(ReportError::InvertedRange { .. })
        );
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let q = ReportQuery::from_query_string(Some("range_type=%77eekly&format=%68tml"));
        assert_eq!(q.range_type.as_deref(), Some("weekly"));
        assert_eq!(q.format.as_deref(), Some("html"));
    }
}
