pub mod day_index;
pub mod work_range;

pub use day_index::{DayInfo, build_day_index};
pub use work_range::{
    CalculatorConfig, ConfigError, DEFAULT_RECURSIVE_MAX, WorkRange, WorkRangeCalculator,
    calculate_work_ranges, success_ranges,
};
