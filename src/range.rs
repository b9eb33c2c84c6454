use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// A resolved span of work: `begin <= end`, both instants in the plan's
/// declared time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    begin: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl DateRange {
    /// Panics when `begin > end`; ranges are only ever built from a begin
    /// plus a non-negative duration, so a violation is a caller bug.
    pub fn new(begin: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        assert!(begin <= end, "date range requires begin <= end");
        Self { begin, end }
    }

    pub fn begin(&self) -> DateTime<FixedOffset> {
        self.begin
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Whether `day` falls inside the inclusive civil-date span of the range.
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.begin.date_naive() <= day && day <= self.end.date_naive()
    }
}

/// The extreme ranges over a set of resolved spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalSuccessRange {
    /// The range with the earliest begin.
    pub minimum: DateRange,
    /// The range with the latest end.
    pub maximum: DateRange,
}

impl TotalSuccessRange {
    /// The single span covering everything: earliest begin to latest end.
    pub fn envelope(&self) -> DateRange {
        DateRange::new(self.minimum.begin, self.maximum.end)
    }
}

/// Pointwise union: earliest begin and latest end over `ranges`, or `None`
/// when the input is empty.
pub fn envelope(ranges: impl IntoIterator<Item = DateRange>) -> Option<DateRange> {
    let mut iter = ranges.into_iter();
    let first = iter.next()?;
    let (begin, end) = iter.fold((first.begin, first.end), |(begin, end), range| {
        (begin.min(range.begin), end.max(range.end))
    });
    Some(DateRange::new(begin, end))
}

/// The range with the earliest begin and the range with the latest end, or
/// `None` on empty input. Ties are not distinguished further.
pub fn total_success_range(ranges: &[DateRange]) -> Option<TotalSuccessRange> {
    let minimum = *ranges.iter().min_by_key(|range| range.begin)?;
    let maximum = *ranges.iter().max_by_key(|range| range.end)?;
    Some(TotalSuccessRange { minimum, maximum })
}

/// The range with the latest end.
///
/// This is a primitive, not an entry point: callers guarantee `ranges` is
/// non-empty, and it panics otherwise.
pub fn max_by_end(ranges: &[DateRange]) -> DateRange {
    *ranges
        .iter()
        .max_by_key(|range| range.end)
        .expect("max_by_end requires at least one range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn range(begin_day: u32, end_day: u32) -> DateRange {
        let offset = FixedOffset::east_opt(0).unwrap();
        let at = |day: u32| {
            chrono::NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_time(chrono::NaiveTime::MIN)
                .and_local_timezone(offset)
                .unwrap()
        };
        DateRange::new(at(begin_day), at(end_day))
    }

    #[test]
    fn envelope_takes_pointwise_extremes() {
        let merged = envelope([range(2, 3), range(5, 10)]).unwrap();
        assert_eq!(merged, range(2, 10));
    }

    #[test]
    fn envelope_of_nothing_is_none() {
        assert!(envelope([]).is_none());
    }

    #[test]
    fn total_success_range_tracks_both_extremes() {
        let total = total_success_range(&[range(5, 6), range(2, 3), range(4, 10)]).unwrap();
        assert_eq!(total.minimum, range(2, 3));
        assert_eq!(total.maximum, range(4, 10));
        assert_eq!(total.envelope(), range(2, 10));
    }

    #[test]
    fn total_success_range_empty_is_none() {
        assert!(total_success_range(&[]).is_none());
    }

    #[test]
    fn max_by_end_picks_latest_finish() {
        assert_eq!(max_by_end(&[range(1, 4), range(2, 9), range(3, 5)]), range(2, 9));
    }

    #[test]
    #[should_panic(expected = "at least one range")]
    fn max_by_end_panics_on_empty_input() {
        max_by_end(&[]);
    }

    #[test]
    #[should_panic(expected = "begin <= end")]
    fn inverted_range_is_rejected() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let early = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_time(chrono::NaiveTime::MIN)
            .and_local_timezone(offset)
            .unwrap();
        let late = early + chrono::Duration::days(1);
        DateRange::new(late, early);
    }
}
