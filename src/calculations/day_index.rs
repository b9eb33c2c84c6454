use crate::calculations::work_range::WorkRange;
use crate::calendar::WorkCalendar;
use crate::range::DateRange;
use crate::timeline::{NodeId, Timeline};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// What is happening on one calendar day: which (resource, task) pairs are
/// booked and which tasks are active.
///
/// Over-allocation is surfaced through cardinality: a
/// [`DayInfo::booked_count`] greater than one means the same resource is
/// booked by more than one task that day. Whether that is "too many" is the
/// caller's policy, not ours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayInfo {
    assignments: BTreeSet<(String, NodeId)>,
    nodes: BTreeSet<NodeId>,
}

impl DayInfo {
    /// Distinct (resource id, task id) bookings on this day.
    pub fn assignments(&self) -> &BTreeSet<(String, NodeId)> {
        &self.assignments
    }

    /// Tasks whose resolved range covers this day.
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// How many distinct tasks book `resource_id` on this day.
    pub fn booked_count(&self, resource_id: &str) -> usize {
        self.assignments
            .iter()
            .filter(|(resource, _)| resource == resource_id)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the per-day index over every calendar day in the plan's bounding
/// range from a completed pass's results. A task covers the inclusive
/// civil-date span of its `Success` range; failed nodes contribute nothing.
pub fn build_day_index(
    timeline: &Timeline,
    ranges: &HashMap<NodeId, WorkRange>,
    calendar: &WorkCalendar,
) -> BTreeMap<NaiveDate, DayInfo> {
    // Resolve the per-task spans once; the day fan-out only reads.
    let covered: Vec<(NodeId, DateRange, Vec<String>)> = timeline
        .tasks()
        .filter_map(|task| {
            let range = ranges.get(&task.id)?.success()?;
            let resources = task
                .assignments
                .iter()
                .map(|assignment| assignment.resource_id.clone())
                .collect();
            Some((task.id, range, resources))
        })
        .collect();

    let days: Vec<NaiveDate> = calendar.days().collect();
    days.par_iter()
        .map(|day| {
            let mut info = DayInfo::default();
            for (id, range, resources) in &covered {
                if range.contains_day(*day) {
                    info.nodes.insert(*id);
                    for resource in resources {
                        info.assignments.insert((resource.clone(), *id));
                    }
                }
            }
            (*day, info)
        })
        .collect()
}
