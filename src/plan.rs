use crate::calculations::day_index::{DayInfo, build_day_index};
use crate::calculations::work_range::{CalculatorConfig, WorkRange, WorkRangeCalculator};
use crate::calendar::WorkCalendar;
use crate::metadata::PlanMetadata;
use crate::timeline::{NodeId, Timeline};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// One whole plan: metadata, the node tree, the working-day calendar and the
/// pass configuration. This is the snapshot the engine is handed by the
/// display layer; edits go through [`Plan::timeline_mut`] and each edit is
/// followed by a fresh [`Plan::work_ranges`] pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    metadata: PlanMetadata,
    timeline: Timeline,
    calendar: WorkCalendar,
    config: CalculatorConfig,
}

impl Plan {
    pub fn new(metadata: PlanMetadata, calendar: WorkCalendar) -> Self {
        Self {
            metadata,
            timeline: Timeline::new(),
            calendar,
            config: CalculatorConfig::default(),
        }
    }

    pub fn from_parts(
        metadata: PlanMetadata,
        timeline: Timeline,
        calendar: WorkCalendar,
        config: CalculatorConfig,
    ) -> Self {
        Self {
            metadata,
            timeline,
            calendar,
            config,
        }
    }

    pub fn metadata(&self) -> &PlanMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: PlanMetadata) {
        self.metadata = metadata;
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn config(&self) -> CalculatorConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CalculatorConfig) {
        self.config = config;
    }

    /// Run one scheduling pass over the current tree.
    pub fn work_ranges(&self) -> HashMap<NodeId, WorkRange> {
        WorkRangeCalculator::new(&self.timeline, &self.calendar, self.config).execute()
    }

    /// Derive the per-day resource index from a completed pass.
    pub fn day_index(&self, ranges: &HashMap<NodeId, WorkRange>) -> BTreeMap<NaiveDate, DayInfo> {
        build_day_index(&self.timeline, ranges, &self.calendar)
    }
}
