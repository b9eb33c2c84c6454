use chrono::{FixedOffset, NaiveDate, Weekday};
use timeline_tool::calendar::{EventKind, HolidayClass, HolidayEvent, WorkCalendar};

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekday_calendar() -> WorkCalendar {
    WorkCalendar::new(
        utc(),
        date(2024, 1, 1),
        date(2024, 12, 31),
        [Weekday::Sat, Weekday::Sun],
        [],
    )
    .unwrap()
}

#[test]
fn weekends_are_not_business_days() {
    let cal = weekday_calendar();
    // 2024-01-06 is a Saturday, 2024-01-07 is a Sunday
    assert!(!cal.is_business_day(date(2024, 1, 6)));
    assert!(!cal.is_business_day(date(2024, 1, 7)));
    assert!(cal.is_business_day(date(2024, 1, 8)));
}

#[test]
fn declared_events_block_business_days() {
    let mut cal = weekday_calendar();
    let day = date(2024, 2, 6); // a Tuesday
    assert!(cal.is_business_day(day));
    cal.add_event(day, HolidayEvent::labeled(EventKind::Holiday, "Founding Day"));
    assert!(!cal.is_business_day(day));
    cal.remove_event(day);
    assert!(cal.is_business_day(day));
}

#[test]
fn holiday_class_distinguishes_weekly_and_event() {
    let mut cal = weekday_calendar();
    cal.add_event(date(2024, 2, 6), HolidayEvent::new(EventKind::Special));
    assert_eq!(
        cal.holiday_class(date(2024, 1, 6)),
        Some(HolidayClass::RegularWeekday)
    );
    assert_eq!(
        cal.holiday_class(date(2024, 2, 6)),
        Some(HolidayClass::Event(EventKind::Special))
    );
    assert_eq!(cal.holiday_class(date(2024, 2, 7)), None);
}

#[test]
fn on_or_after_keeps_business_days_unchanged() {
    let cal = weekday_calendar();
    let monday = cal.midnight(date(2024, 1, 8));
    assert_eq!(cal.next_business_day_on_or_after(monday), monday);
}

#[test]
fn on_or_after_skips_to_monday() {
    let cal = weekday_calendar();
    let saturday = cal.midnight(date(2024, 1, 6));
    assert_eq!(
        cal.next_business_day_on_or_after(saturday),
        cal.midnight(date(2024, 1, 8))
    );
}

#[test]
fn zero_duration_returns_begin_unchanged() {
    let cal = weekday_calendar();
    let begin = cal.midnight(date(2024, 1, 8));
    assert_eq!(cal.add_business_duration(begin, 0.0), begin);
}

#[test]
fn one_day_from_friday_ends_monday() {
    let cal = weekday_calendar();
    let friday = cal.midnight(date(2024, 1, 5));
    assert_eq!(
        cal.add_business_duration(friday, 1.0),
        cal.midnight(date(2024, 1, 8))
    );
}

#[test]
fn whole_days_skip_declared_events() {
    let mut cal = weekday_calendar();
    cal.add_event(date(2024, 1, 8), HolidayEvent::new(EventKind::Holiday)); // Monday
    let friday = cal.midnight(date(2024, 1, 5));
    assert_eq!(
        cal.add_business_duration(friday, 1.0),
        cal.midnight(date(2024, 1, 9))
    );
}

#[test]
fn fractional_remainder_stays_within_the_day() {
    let cal = weekday_calendar();
    let monday = cal.midnight(date(2024, 1, 8));
    let half = cal.add_business_duration(monday, 0.5);
    assert_eq!(half, monday + chrono::Duration::hours(12));

    // 1.5 days from Friday: Friday is spent whole, the half lands in Monday.
    let friday = cal.midnight(date(2024, 1, 5));
    assert_eq!(
        cal.add_business_duration(friday, 1.5),
        cal.midnight(date(2024, 1, 8)) + chrono::Duration::hours(12)
    );
}

#[test]
fn mid_day_begin_carries_elapsed_fraction() {
    let cal = weekday_calendar();
    let tuesday_noon = cal.midnight(date(2024, 1, 9)) + chrono::Duration::hours(12);
    assert_eq!(
        cal.add_business_duration(tuesday_noon, 1.0),
        cal.midnight(date(2024, 1, 10)) + chrono::Duration::hours(12)
    );
}

#[test]
fn days_covers_the_bounding_range_inclusive() {
    let cal = WorkCalendar::new(
        utc(),
        date(2024, 1, 1),
        date(2024, 1, 10),
        [Weekday::Sat, Weekday::Sun],
        [],
    )
    .unwrap();
    let days: Vec<NaiveDate> = cal.days().collect();
    assert_eq!(days.len(), 10);
    assert_eq!(days.first().copied().unwrap(), date(2024, 1, 1));
    assert_eq!(days.last().copied().unwrap(), date(2024, 1, 10));
}

#[test]
fn business_days_in_range_and_count_match() {
    let cal = weekday_calendar();
    let start = date(2024, 1, 8); // Mon
    let end = date(2024, 1, 14); // Sun
    let days = cal.business_days_in_range(start, end);
    assert_eq!(days.len() as i64, cal.count_business_days(start, end));
    assert_eq!(days.len(), 5);
}

#[test]
fn empty_range_is_rejected() {
    let result = WorkCalendar::new(utc(), date(2024, 2, 1), date(2024, 1, 1), [], []);
    assert!(result.is_err());
}

#[test]
fn config_round_trips_losslessly() {
    let mut cal = WorkCalendar::new(
        FixedOffset::east_opt(9 * 3600).unwrap(),
        date(2024, 4, 1),
        date(2025, 3, 31),
        [Weekday::Sun],
        [],
    )
    .unwrap();
    cal.add_event(
        date(2024, 5, 3),
        HolidayEvent::labeled(EventKind::Holiday, "Constitution Day"),
    );

    let config = cal.to_config();
    assert_eq!(config.time_zone(), "+09:00");
    let rebuilt = WorkCalendar::from_config(&config).unwrap();
    assert_eq!(rebuilt, cal);
}

#[test]
fn config_with_bad_time_zone_is_rejected() {
    let mut config = WorkCalendar::default().to_config();
    let json = serde_json::to_string(&config).unwrap();
    let json = json.replace("+00:00", "not-a-zone");
    config = serde_json::from_str(&json).unwrap();
    assert!(WorkCalendar::from_config(&config).is_err());
}
