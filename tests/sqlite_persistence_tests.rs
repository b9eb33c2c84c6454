#![cfg(feature = "sqlite")]

use chrono::{FixedOffset, NaiveDate, Weekday};
use timeline_tool::calculations::work_range::CalculatorConfig;
use timeline_tool::calendar::WorkCalendar;
use timeline_tool::metadata::PlanMetadata;
use timeline_tool::persistence::PlanStore;
use timeline_tool::persistence::sqlite::SqlitePlanStore;
use timeline_tool::plan::Plan;
use timeline_tool::timeline::ROOT_ID;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_plan() -> Plan {
    let calendar = WorkCalendar::new(
        FixedOffset::east_opt(0).unwrap(),
        date(2024, 1, 1),
        date(2024, 12, 31),
        [Weekday::Sat, Weekday::Sun],
        [],
    )
    .unwrap();
    let mut plan = Plan::new(PlanMetadata::default(), calendar);
    plan.set_config(CalculatorConfig::new(250).unwrap());

    let timeline = plan.timeline_mut();
    let phase = timeline.insert_group(ROOT_ID, "Phase 1").unwrap();
    let first = timeline.insert_task(phase, "First").unwrap();
    timeline.set_static_begin(first, Some(date(2024, 1, 9))).unwrap();
    timeline.set_workload(first, 3.0).unwrap();
    let second = timeline.insert_task(phase, "Second").unwrap();
    timeline.set_workload(second, 1.5).unwrap();
    timeline.set_previous(second, vec![first]).unwrap();

    plan
}

#[test]
fn empty_store_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();
    assert!(store.load_plan().unwrap().is_none());
}

#[test]
fn save_and_load_round_trips_the_plan() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();

    let plan = sample_plan();
    store.save_plan(&plan).unwrap();
    let loaded = store.load_plan().unwrap().expect("plan was stored");

    assert_eq!(loaded, plan);
    assert_eq!(loaded.work_ranges(), plan.work_ranges());
}

#[test]
fn saving_twice_replaces_the_stored_plan() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqlitePlanStore::new(dir.path().join("plan.db")).unwrap();

    let mut plan = sample_plan();
    store.save_plan(&plan).unwrap();

    plan.timeline_mut().insert_task(ROOT_ID, "Extra").unwrap();
    store.save_plan(&plan).unwrap();

    let loaded = store.load_plan().unwrap().expect("plan was stored");
    assert_eq!(loaded.timeline().len(), plan.timeline().len());
    assert_eq!(loaded, plan);
}
