use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Sub-kind of a declared holiday event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Holiday,
    Special,
}

/// A declared non-working day, keyed in the calendar by its civil date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HolidayEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, label: None }
    }

    pub fn labeled(kind: EventKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: Some(label.into()),
        }
    }
}

/// Why a given date is not a business day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayClass {
    RegularWeekday,
    Event(EventKind),
}

#[derive(Debug)]
pub enum CalendarError {
    EmptyRange { begin: NaiveDate, end: NaiveDate },
    InvalidTimeZone(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::EmptyRange { begin, end } => {
                write!(f, "calendar range is empty: {begin} > {end}")
            }
            CalendarError::InvalidTimeZone(raw) => {
                write!(f, "invalid time zone offset '{raw}'")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

/// Working-day calendar for one plan: a declared time zone, the inclusive
/// date range the plan lives in, the weekly non-working days, and the
/// declared holiday events.
///
/// Every instant the engine works with is manufactured through
/// [`WorkCalendar::midnight`] or derived from another instant by calendar
/// arithmetic, so all instants in one pass carry the calendar's offset by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    offset: FixedOffset,
    range_begin: NaiveDate,
    range_end: NaiveDate,
    regular_holidays: HashSet<Weekday>,
    events: BTreeMap<NaiveDate, HolidayEvent>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::new(
            FixedOffset::east_opt(0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            [Weekday::Sat, Weekday::Sun],
            [],
        )
        .expect("default calendar range is non-empty")
    }
}

impl WorkCalendar {
    pub fn new<I, J>(
        offset: FixedOffset,
        range_begin: NaiveDate,
        range_end: NaiveDate,
        regular_holidays: I,
        events: J,
    ) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = (NaiveDate, HolidayEvent)>,
    {
        if range_begin > range_end {
            return Err(CalendarError::EmptyRange {
                begin: range_begin,
                end: range_end,
            });
        }

        Ok(Self {
            offset,
            range_begin,
            range_end,
            regular_holidays: regular_holidays.into_iter().collect(),
            events: events.into_iter().collect(),
        })
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let offset = config
            .time_zone
            .parse::<FixedOffset>()
            .map_err(|_| CalendarError::InvalidTimeZone(config.time_zone.clone()))?;
        Self::new(
            offset,
            config.range_begin,
            config.range_end,
            config.regular_holidays.iter().copied(),
            config.events.iter().map(|event| {
                (
                    event.date,
                    HolidayEvent {
                        kind: event.kind,
                        label: event.label.clone(),
                    },
                )
            }),
        )
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn range_begin(&self) -> NaiveDate {
        self.range_begin
    }

    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    /// Add a holiday event; replaces any event already declared on that date.
    pub fn add_event(&mut self, date: NaiveDate, event: HolidayEvent) {
        self.events.insert(date, event);
    }

    pub fn remove_event(&mut self, date: NaiveDate) {
        self.events.remove(&date);
    }

    /// Replace the weekly non-working days (e.g. Sat/Sun for a 5-day week).
    pub fn set_regular_holidays(&mut self, days: impl IntoIterator<Item = Weekday>) {
        self.regular_holidays = days.into_iter().collect();
    }

    /// The midnight-truncated instant of `date` in the declared zone.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        date.and_time(NaiveTime::MIN)
            .and_local_timezone(self.offset)
            .single()
            .expect("fixed offsets map local midnight to exactly one instant")
    }

    /// Check whether a date can carry work.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.regular_holidays.contains(&date.weekday()) && !self.events.contains_key(&date)
    }

    /// Classify a non-business day; `None` for business days.
    pub fn holiday_class(&self, date: NaiveDate) -> Option<HolidayClass> {
        if let Some(event) = self.events.get(&date) {
            return Some(HolidayClass::Event(event.kind));
        }
        if self.regular_holidays.contains(&date.weekday()) {
            return Some(HolidayClass::RegularWeekday);
        }
        None
    }

    /// The same instant when it falls on a business day, otherwise the
    /// midnight of the next business day.
    pub fn next_business_day_on_or_after(
        &self,
        from: DateTime<FixedOffset>,
    ) -> DateTime<FixedOffset> {
        if self.is_business_day(from.date_naive()) {
            return from;
        }
        self.midnight(self.next_business_day_after(from.date_naive()))
    }

    /// Advance `begin` by `days` business days, skipping non-business days.
    ///
    /// Whole days each land on the next strictly-later business day; a
    /// fractional remainder is spent inside the final business day rather
    /// than spilling past it. Zero duration returns `begin` unchanged.
    pub fn add_business_duration(
        &self,
        begin: DateTime<FixedOffset>,
        days: f64,
    ) -> DateTime<FixedOffset> {
        if days <= 0.0 {
            return begin;
        }

        // Work in fractions of a day so a begin at mid-day carries its
        // already-elapsed portion into the arithmetic.
        let elapsed = f64::from(begin.time().num_seconds_from_midnight()) / 86_400.0;
        let total = elapsed + days;
        let whole = total.trunc() as i64;
        let fraction = total.fract();

        let mut date = begin.date_naive();
        for _ in 0..whole {
            date = self.next_business_day_after(date);
        }

        self.midnight(date) + Duration::milliseconds((fraction * MILLIS_PER_DAY).round() as i64)
    }

    fn next_business_day_after(&self, from: NaiveDate) -> NaiveDate {
        let mut current = from + Duration::days(1);
        while !self.is_business_day(current) {
            current = current + Duration::days(1);
        }
        current
    }

    /// Every civil day in the plan's bounding range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.range_end;
        std::iter::successors(Some(self.range_begin), move |current| {
            let next = *current + Duration::days(1);
            (next <= end).then_some(next)
        })
    }

    /// Get all business days in a date range
    pub fn business_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_business_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }

    /// Count business days in a date range
    pub fn count_business_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;

        while current <= end {
            if self.is_business_day(current) {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        count
    }
}

/// Serde-friendly mirror of [`WorkCalendar`]: the time zone as an offset
/// string plus sorted weekday and event lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    time_zone: String,
    range_begin: NaiveDate,
    range_end: NaiveDate,
    regular_holidays: Vec<Weekday>,
    #[serde(default)]
    events: Vec<HolidayEventConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEventConfig {
    pub date: NaiveDate,
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WorkCalendarConfig {
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    pub fn range_begin(&self) -> NaiveDate {
        self.range_begin
    }

    pub fn range_end(&self) -> NaiveDate {
        self.range_end
    }

    pub fn regular_holidays(&self) -> &[Weekday] {
        &self.regular_holidays
    }

    pub fn events(&self) -> &[HolidayEventConfig] {
        &self.events
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let mut regular: Vec<Weekday> = calendar.regular_holidays.iter().copied().collect();
        regular.sort_by_key(|wd| wd.num_days_from_monday());

        let events = calendar
            .events
            .iter()
            .map(|(date, event)| HolidayEventConfig {
                date: *date,
                kind: event.kind,
                label: event.label.clone(),
            })
            .collect();

        Self {
            time_zone: calendar.offset.to_string(),
            range_begin: calendar.range_begin,
            range_end: calendar.range_end,
            regular_holidays: regular,
            events,
        }
    }
}
