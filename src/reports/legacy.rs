//! Translation of the old fixed-range veterinary endpoints into unified
//! report URLs.

use chrono::{Days, NaiveDate};
use strum::{AsRefStr, Display};

use super::error::ReportError;
use super::kinds::ReportType;
use super::query::parse_date;
use super::range::{week_bounds, RangeType};

/// Query keys the redirect recomputes; everything else is passed through.
const REPLACED_KEYS: &[&str] = &["date", "week_start", "range_type", "date_from", "date_to"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum LegacyRoute {
    /// `/reports/veterinary/daily?date=`
    Daily,
    /// `/reports/veterinary/weekly?week_start=` or `?date=`
    Weekly,
}

#[derive(Debug, Default)]
struct LegacyParams<'a> {
    date: Option<String>,
    week_start: Option<String>,
    preserved: Vec<&'a str>,
}

fn split_query(raw: Option<&str>) -> LegacyParams<'_> {
    let mut params = LegacyParams::default();
    let segments = raw.unwrap_or_default().split('&').filter(|s| !s.is_empty());
    for segment in segments {
        let Some((key, value)) = url::form_urlencoded::parse(segment.as_bytes()).next() else {
            continue;
        };
        match &*key {
            "date" => params.date = Some(value.into_owned()),
            "week_start" => params.week_start = Some(value.into_owned()),
            k if REPLACED_KEYS.contains(&k) => {}
            _ => params.preserved.push(segment),
        }
    }
    params
}

/// Computes the `Location` of the unified veterinary report for a legacy
/// request. Unrelated query segments are kept verbatim and in order.
pub fn redirect_location(
    route: LegacyRoute,
    raw_query: Option<&str>,
    today: NaiveDate,
    base_path: &str,
) -> Result<String, ReportError> {
    let params = split_query(raw_query);
    let date = parse_date("date", params.date.as_deref())?;

    let (range_type, from, to) = match route {
        LegacyRoute::Daily => {
            let day = date.unwrap_or(today);
            (RangeType::Daily, day, day)
        }
        LegacyRoute::Weekly => {
            match parse_date("week_start", params.week_start.as_deref())? {
                Some(start) => {
                    let end = start
                        .checked_add_days(Days::new(6))
                        .ok_or(ReportError::DateOutOfRange)?;
                    (RangeType::Weekly, start, end)
                }
                None => {
                    let (monday, sunday) = week_bounds(date.unwrap_or(today))?;
                    (RangeType::Weekly, monday, sunday)
                }
            }
        }
    };

    let mut location = format!(
        "{}/reports/{}?range_type={}&date_from={}&date_to={}",
        base_path.trim_end_matches('/'),
        ReportType::Veterinary.slug(),
        range_type,
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
    );
    for segment in params.preserved {
        location.push('&');
        location.push_str(segment);
    }
    Ok(location)
}
