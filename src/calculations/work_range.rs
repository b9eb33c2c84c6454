use crate::calendar::WorkCalendar;
use crate::graph::TimelineDag;
use crate::range::{DateRange, envelope};
use crate::timeline::{GroupNode, NodeId, TaskNode, Timeline, TimelineNode};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

pub const DEFAULT_RECURSIVE_MAX: usize = 1000;

/// Per-node result of one calculation pass. Only `Success` carries data; the
/// other variants are terminal reasons the display layer renders per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkRange {
    Success(DateRange),
    /// Not yet resolved within the current pass. Never survives a completed
    /// pass: leftovers become `Recursive`.
    Loading,
    /// No static begin and no dependency to derive a begin from.
    NoInput,
    /// The task lists itself as its own predecessor.
    SelfSelected,
    /// A group without children has no range to derive.
    NoChildren,
    /// Every input resolved, but all of them were themselves input-starved.
    RelationNoInput,
    /// Every input resolved, none successfully.
    RelationError,
    /// Still unresolved when the iteration cap was reached: a true dependency
    /// cycle or a chain feeding on one.
    Recursive,
    /// Resolution hit an internal fault; recovered per node, never fatal to
    /// the pass.
    Unknown,
}

impl WorkRange {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkRange::Success(_))
    }

    pub fn success(&self) -> Option<DateRange> {
        match self {
            WorkRange::Success(range) => Some(*range),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, WorkRange::Loading)
    }

    /// Stable reason label for the display layer.
    pub fn label(&self) -> &'static str {
        match self {
            WorkRange::Success(_) => "success",
            WorkRange::Loading => "loading",
            WorkRange::NoInput => "no input",
            WorkRange::SelfSelected => "self selected",
            WorkRange::NoChildren => "no children",
            WorkRange::RelationNoInput => "relation no input",
            WorkRange::RelationError => "relation error",
            WorkRange::Recursive => "recursive relation",
            WorkRange::Unknown => "unknown error",
        }
    }

    fn input_starved(&self) -> bool {
        matches!(self, WorkRange::NoInput | WorkRange::RelationNoInput)
    }
}

impl fmt::Display for WorkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ZeroRecursiveMax,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroRecursiveMax => {
                write!(f, "recursive_max must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Pass configuration. `recursive_max` bounds the relaxation; zero is a
/// contract violation rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorConfig {
    recursive_max: usize,
}

impl CalculatorConfig {
    pub fn new(recursive_max: usize) -> Result<Self, ConfigError> {
        if recursive_max == 0 {
            return Err(ConfigError::ZeroRecursiveMax);
        }
        Ok(Self { recursive_max })
    }

    pub fn recursive_max(&self) -> usize {
        self.recursive_max
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            recursive_max: DEFAULT_RECURSIVE_MAX,
        }
    }
}

/// One read-only scheduling pass over the whole tree.
///
/// The tree plus the calendar are the only inputs; the output maps every
/// node id to a [`WorkRange`]. Group ranges depend on children and task
/// begins depend on predecessor ends, and a user can wire those into a true
/// cycle, so resolution is a bounded fixed-point relaxation over an explicit
/// `Loading` state rather than a single topological pass.
pub struct WorkRangeCalculator<'a> {
    timeline: &'a Timeline,
    calendar: &'a WorkCalendar,
    config: CalculatorConfig,
}

impl<'a> WorkRangeCalculator<'a> {
    pub fn new(timeline: &'a Timeline, calendar: &'a WorkCalendar, config: CalculatorConfig) -> Self {
        Self {
            timeline,
            calendar,
            config,
        }
    }

    pub fn execute(&self) -> HashMap<NodeId, WorkRange> {
        let mut ranges: HashMap<NodeId, WorkRange> = self
            .timeline
            .node_ids()
            .map(|id| (id, WorkRange::Loading))
            .collect();

        // Self-references resolve before relaxation and stay pinned.
        for task in self.timeline.tasks() {
            if task.previous.contains(&task.id) {
                ranges.insert(task.id, WorkRange::SelfSelected);
            }
        }

        let order = TimelineDag::build(self.timeline).sweep_order();

        for _ in 0..self.config.recursive_max {
            let mut changed = false;
            for id in &order {
                if !matches!(ranges.get(id), Some(WorkRange::Loading)) {
                    continue;
                }
                let next = match catch_unwind(AssertUnwindSafe(|| self.resolve(*id, &ranges))) {
                    Ok(state) => state,
                    Err(_) => {
                        tracing::warn!(node = %id, "node resolution panicked, marking unknown");
                        WorkRange::Unknown
                    }
                };
                if !next.is_loading() {
                    ranges.insert(*id, next);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Whatever is still loading can never make progress: a cycle, or a
        // chain starving on one.
        for state in ranges.values_mut() {
            if state.is_loading() {
                *state = WorkRange::Recursive;
            }
        }

        ranges
    }

    fn resolve(&self, id: NodeId, ranges: &HashMap<NodeId, WorkRange>) -> WorkRange {
        match self.timeline.node(id) {
            Some(TimelineNode::Task(task)) => self.resolve_task(task, ranges),
            Some(TimelineNode::Group(group)) => self.resolve_group(group, ranges),
            // Sweep order and arena come from the same tree; a miss here is
            // an internal fault.
            None => WorkRange::Unknown,
        }
    }

    fn resolve_task(&self, task: &TaskNode, ranges: &HashMap<NodeId, WorkRange>) -> WorkRange {
        let begin = if let Some(date) = task.static_begin {
            self.calendar
                .next_business_day_on_or_after(self.calendar.midnight(date))
        } else {
            if task.previous.is_empty() {
                return WorkRange::NoInput;
            }
            let mut latest: Option<DateTime<FixedOffset>> = None;
            let mut starved_only = true;
            for prev in &task.previous {
                match ranges.get(prev).copied().unwrap_or(WorkRange::RelationError) {
                    WorkRange::Loading => return WorkRange::Loading,
                    WorkRange::Success(range) => {
                        let end = range.end();
                        latest = Some(latest.map_or(end, |current| current.max(end)));
                    }
                    failure => {
                        if !failure.input_starved() {
                            starved_only = false;
                        }
                    }
                }
            }
            match latest {
                // Later predecessor wins; ties are not distinguished further.
                Some(end) => self.calendar.next_business_day_on_or_after(end),
                None if starved_only => return WorkRange::RelationNoInput,
                None => return WorkRange::RelationError,
            }
        };

        let end = self.calendar.add_business_duration(begin, task.workload_days);
        WorkRange::Success(DateRange::new(begin, end))
    }

    fn resolve_group(&self, group: &GroupNode, ranges: &HashMap<NodeId, WorkRange>) -> WorkRange {
        if group.children.is_empty() {
            return WorkRange::NoChildren;
        }

        let mut successes = Vec::new();
        let mut starved_only = true;
        for child in &group.children {
            match ranges.get(child).copied().unwrap_or(WorkRange::RelationError) {
                WorkRange::Loading => return WorkRange::Loading,
                WorkRange::Success(range) => successes.push(range),
                failure => {
                    if !failure.input_starved() {
                        starved_only = false;
                    }
                }
            }
        }

        // Best-effort union: any successful child gives the group a range,
        // failed siblings are not propagated.
        match envelope(successes) {
            Some(range) => WorkRange::Success(range),
            None if starved_only => WorkRange::RelationNoInput,
            None => WorkRange::RelationError,
        }
    }
}

/// Pure-function entry point: `(tree, calendar, config) -> results`. One
/// call per edit; results from a previous pass are discarded wholesale.
pub fn calculate_work_ranges(
    timeline: &Timeline,
    calendar: &WorkCalendar,
    config: CalculatorConfig,
) -> HashMap<NodeId, WorkRange> {
    WorkRangeCalculator::new(timeline, calendar, config).execute()
}

/// The `Success` payloads of a result map, for the union utilities.
pub fn success_ranges<'a>(ranges: impl IntoIterator<Item = &'a WorkRange>) -> Vec<DateRange> {
    ranges
        .into_iter()
        .filter_map(WorkRange::success)
        .collect()
}
