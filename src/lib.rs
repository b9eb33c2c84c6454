pub mod calculations;
pub mod calendar;
pub mod graph;
pub mod metadata;
pub(crate) mod node_validation;
pub mod persistence;
pub mod plan;
pub mod range;
pub mod resource;
pub mod timeline;

pub use calculations::day_index::{DayInfo, build_day_index};
pub use calculations::work_range::{
    CalculatorConfig, ConfigError, DEFAULT_RECURSIVE_MAX, WorkRange, WorkRangeCalculator,
    calculate_work_ranges, success_ranges,
};
pub use calendar::{
    CalendarError, EventKind, HolidayClass, HolidayEvent, HolidayEventConfig, WorkCalendar,
    WorkCalendarConfig,
};
pub use graph::TimelineDag;
pub use metadata::PlanMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PersistenceResult, PlanStore, export_ranges_to_csv, load_plan_from_json,
    save_plan_to_json, validate_plan,
};
pub use plan::Plan;
pub use range::{DateRange, TotalSuccessRange, envelope, max_by_end, total_success_range};
pub use resource::ResourceAssignment;
pub use timeline::{
    GroupNode, NodeId, NodeKind, ROOT_ID, TaskNode, Timeline, TimelineError, TimelineNode,
    TimelineResult,
};
