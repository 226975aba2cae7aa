//! Date-range resolution for `range_type` = daily, weekly, monthly or custom.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use super::error::ReportError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RangeType {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl RangeType {
    /// Parses a raw `range_type` value; blank means "not given".
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, ReportError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(value) => value
                .parse::<RangeType>()
                .map(Some)
                .map_err(|_| ReportError::UnknownRangeType(value.to_string())),
        }
    }
}

/// Inclusive calendar range a report covers. `date_from <= date_to` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub range_type: RangeType,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.date_to - self.date_from).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }
}

fn add_days(date: NaiveDate, n: u64) -> Result<NaiveDate, ReportError> {
    date.checked_add_days(Days::new(n))
        .ok_or(ReportError::DateOutOfRange)
}

fn sub_days(date: NaiveDate, n: u64) -> Result<NaiveDate, ReportError> {
    date.checked_sub_days(Days::new(n))
        .ok_or(ReportError::DateOutOfRange)
}

/// Monday and Sunday of the ISO week containing `date`.
pub fn week_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate), ReportError> {
    let monday = sub_days(date, u64::from(date.weekday().num_days_from_monday()))?;
    Ok((monday, add_days(monday, 6)?))
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate), ReportError> {
    let first = date.with_day(1).ok_or(ReportError::DateOutOfRange)?;
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or(ReportError::DateOutOfRange)?;
    Ok((first, last))
}

/// Derives the concrete `[date_from, date_to]` for a report request.
///
/// * daily: one day, `date_from` or `date_to` or today.
/// * weekly: seven days starting at `date_from`, ending at `date_to`, or the
///   Monday..Sunday week of today.
/// * monthly: the calendar month of `date_from` or `date_to` or today.
/// * custom: both bounds required, at most `max_custom_days` long.
///
/// Without a `range_type` the request is custom when both bounds are given and
/// daily otherwise.
pub fn resolve_range(
    range_type: Option<RangeType>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    today: NaiveDate,
    max_custom_days: i64,
) -> Result<DateRange, ReportError> {
    let range_type = range_type.unwrap_or(match (date_from, date_to) {
        (Some(_), Some(_)) => RangeType::Custom,
        _ => RangeType::Daily,
    });

    let (from, to) = match range_type {
        RangeType::Daily => match (date_from, date_to) {
            (Some(from), Some(to)) if from != to => {
                return Err(ReportError::DailyMismatch { from, to })
            }
            _ => {
                let anchor = date_from.or(date_to).unwrap_or(today);
                (anchor, anchor)
            }
        },
        RangeType::Weekly => match (date_from, date_to) {
            (Some(from), Some(to)) => {
                if add_days(from, 6)? != to {
                    return Err(ReportError::WeeklyMismatch { from, to });
                }
                (from, to)
            }
            (Some(from), None) => (from, add_days(from, 6)?),
            (None, Some(to)) => (sub_days(to, 6)?, to),
            (None, None) => week_bounds(today)?,
        },
        RangeType::Monthly => {
            if let (Some(from), Some(to)) = (date_from, date_to) {
                if (from.year(), from.month()) != (to.year(), to.month()) || from > to {
                    return Err(ReportError::MonthlyMismatch { from, to });
                }
            }
            month_bounds(date_from.or(date_to).unwrap_or(today))?
        }
        RangeType::Custom => {
            let from = date_from.ok_or(ReportError::MissingBound { field: "date_from" })?;
            let to = date_to.ok_or(ReportError::MissingBound { field: "date_to" })?;
            if from > to {
                return Err(ReportError::InvertedRange { from, to });
            }
            let days = (to - from).num_days() + 1;
            if days > max_custom_days {
                return Err(ReportError::RangeTooLong {
                    days,
                    max: max_custom_days,
                });
            }
            (from, to)
        }
    };

    Ok(DateRange {
        range_type,
        date_from: from,
        date_to: to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // Wednesday
    const TODAY: (i32, u32, u32) = (2024, 3, 13);

    fn today() -> NaiveDate {
        d(TODAY.0, TODAY.1, TODAY.2)
    }

    fn resolve(
        rt: Option<RangeType>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DateRange, ReportError> {
        resolve_range(rt, from, to, today(), 366)
    }

    #[rstest]
    #[case("daily", RangeType::Daily)]
    #[case("WEEKLY", RangeType::Weekly)]
    #[case(" Monthly ", RangeType::Monthly)]
    #[case("custom", RangeType::Custom)]
    fn parses_range_types(#[case] raw: &str, #[case] expected: RangeType) {
        assert_eq!(RangeType::parse(Some(raw)).unwrap(), Some(expected));
    }

    #[test]
    fn blank_and_unknown_range_types() {
        assert_eq!(RangeType::parse(None).unwrap(), None);
        assert_eq!(RangeType::parse(Some("")).unwrap(), None);
        assert_matches!(
            RangeType::parse(Some("yearly")),
            Err(ReportError::UnknownRangeType(v)) if v == "yearly"
        );
    }

    #[rstest]
    #[case(None, None, today(), today())]
    #[case(Some(d(2024, 1, 5)), None, d(2024, 1, 5), d(2024, 1, 5))]
    #[case(None, Some(d(2024, 1, 6)), d(2024, 1, 6), d(2024, 1, 6))]
    #[case(Some(d(2024, 1, 7)), Some(d(2024, 1, 7)), d(2024, 1, 7), d(2024, 1, 7))]
    fn daily_ranges(
        #[case] from: Option<NaiveDate>,
        #[case] to: Option<NaiveDate>,
        #[case] expected_from: NaiveDate,
        #[case] expected_to: NaiveDate,
    ) {
        let range = resolve(Some(RangeType::Daily), from, to).unwrap();
        assert_eq!((range.date_from, range.date_to), (expected_from, expected_to));
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn daily_with_two_different_days_is_rejected() {
        assert_matches!(
            resolve(Some(RangeType::Daily), Some(d(2024, 1, 1)), Some(d(2024, 1, 2))),
            Err(ReportError::DailyMismatch { .. })
        );
    }

    #[rstest]
    #[case(None, None, d(2024, 3, 11), d(2024, 3, 17))]
    #[case(Some(d(2024, 2, 27)), None, d(2024, 2, 27), d(2024, 3, 4))]
    #[case(None, Some(d(2024, 1, 3)), d(2023, 12, 28), d(2024, 1, 3))]
    #[case(Some(d(2024, 5, 1)), Some(d(2024, 5, 7)), d(2024, 5, 1), d(2024, 5, 7))]
    fn weekly_ranges(
        #[case] from: Option<NaiveDate>,
        #[case] to: Option<NaiveDate>,
        #[case] expected_from: NaiveDate,
        #[case] expected_to: NaiveDate,
    ) {
        let range = resolve(Some(RangeType::Weekly), from, to).unwrap();
        assert_eq!((range.date_from, range.date_to), (expected_from, expected_to));
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn weekly_with_wrong_span_is_rejected() {
        assert_matches!(
            resolve(Some(RangeType::Weekly), Some(d(2024, 5, 1)), Some(d(2024, 5, 9))),
            Err(ReportError::WeeklyMismatch { .. })
        );
    }

    #[rstest]
    #[case(None, None, d(2024, 3, 1), d(2024, 3, 31))]
    #[case(Some(d(2024, 2, 14)), None, d(2024, 2, 1), d(2024, 2, 29))]
    #[case(Some(d(2023, 2, 14)), None, d(2023, 2, 1), d(2023, 2, 28))]
    #[case(None, Some(d(2023, 12, 25)), d(2023, 12, 1), d(2023, 12, 31))]
    #[case(Some(d(2024, 4, 3)), Some(d(2024, 4, 20)), d(2024, 4, 1), d(2024, 4, 30))]
    fn monthly_ranges(
        #[case] from: Option<NaiveDate>,
        #[case] to: Option<NaiveDate>,
        #[case] expected_from: NaiveDate,
        #[case] expected_to: NaiveDate,
    ) {
        let range = resolve(Some(RangeType::Monthly), from, to).unwrap();
        assert_eq!((range.date_from, range.date_to), (expected_from, expected_to));
    }

    #[test]
    fn monthly_across_months_is_rejected() {
        assert_matches!(
            resolve(Some(RangeType::Monthly), Some(d(2024, 4, 20)), Some(d(2024, 5, 2))),
            Err(ReportError::MonthlyMismatch { .. })
        );
    }

    #[test]
    fn custom_ranges() {
        let range = resolve(Some(RangeType::Custom), Some(d(2024, 1, 1)), Some(d(2024, 2, 15)))
            .unwrap();
        assert_eq!(range.days(), 46);

        assert_matches!(
            resolve(Some(RangeType::Custom), Some(d(2024, 1, 1)), None),
            Err(ReportError::MissingBound { field: "date_to" })
        );
        assert_matches!(
            resolve(Some(RangeType::Custom), None, Some(d(2024, 1, 1))),
            Err(ReportError::MissingBound { field: "date_from" })
        );
        assert_matches!(
            resolve(Some(RangeType::Custom), Some(d(2024, 2, 1)), Some(d(2024, 1, 1))),
            Err(ReportError::InvertedRange { .. })
        );
        assert_matches!(
            resolve(Some(RangeType::Custom), Some(d(2022, 1, 1)), Some(d(2024, 1, 1))),
            Err(ReportError::RangeTooLong { max: 366, .. })
        );
    }

    #[test]
    fn omitted_range_type_is_inferred() {
        let both = resolve(None, Some(d(2024, 1, 1)), Some(d(2024, 1, 9))).unwrap();
        assert_eq!(both.range_type, RangeType::Custom);

        let one = resolve(None, Some(d(2024, 1, 1)), None).unwrap();
        assert_eq!(one.range_type, RangeType::Daily);

        let none = resolve(None, None, None).unwrap();
        assert_eq!(none.range_type, RangeType::Daily);
        assert_eq!(none.date_from, today());
    }

    #[test]
    fn inverted_range_without_type_is_rejected() {
        assert_matches!(
            resolve(None, Some(d(2024, 3, 10)), Some(d(2024, 3, 1))),
            Err(ReportError::InvertedRange { .. })
        );
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, day)| d(y, m, day))
    }

    fn any_anchored_type() -> impl Strategy<Value = RangeType> {
        prop_oneof![
            Just(RangeType::Daily),
            Just(RangeType::Weekly),
            Just(RangeType::Monthly),
        ]
    }

    proptest! {
        #[test]
        fn resolved_ranges_hold_their_shape(
            rt in any_anchored_type(),
            anchor in any_date(),
            use_from in any::<bool>(),
        ) {
            let (from, to) = if use_from { (Some(anchor), None) } else { (None, Some(anchor)) };
            let range = resolve_range(Some(rt), from, to, anchor, 366).unwrap();

            prop_assert!(range.date_from <= range.date_to);
            prop_assert!(range.contains(anchor));
            match rt {
                RangeType::Daily => prop_assert_eq!(range.days(), 1),
                RangeType::Weekly => prop_assert_eq!(range.days(), 7),
                RangeType::Monthly => {
                    prop_assert_eq!(range.date_from.day(), 1);
                    prop_assert_eq!(range.date_to.succ_opt().unwrap().day(), 1);
                    prop_assert_eq!(range.date_from.month(), range.date_to.month());
                }
                RangeType::Custom => unreachable!(),
            }
        }

        #[test]
        fn default_week_starts_on_monday(today in any_date()) {
            let range = resolve_range(Some(RangeType::Weekly), None, None, today, 366).unwrap();
            prop_assert_eq!(range.date_from.weekday(), chrono::Weekday::Mon);
            prop_assert_eq!(range.date_to.weekday(), chrono::Weekday::Sun);
            prop_assert!(range.contains(today));
        }

        #[test]
        fn custom_ranges_never_invert(a in any_date(), b in any_date()) {
            match resolve_range(Some(RangeType::Custom), Some(a), Some(b), a, 100_000) {
                Ok(range) => prop_assert!(range.date_from <= range.date_to),
                Err(err) => {
                    prop_assert!(a > b);
                    prop_assert!(matches!(err, ReportError::InvertedRange { .. }), "unexpected error: {:?}", err);
                }
            }
        }
    }
}
