use super::{PersistenceError, PersistenceResult};
use crate::calculations::work_range::{CalculatorConfig, DEFAULT_RECURSIVE_MAX};
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::metadata::PlanMetadata;
use crate::plan::Plan;
use crate::resource::ResourceAssignment;
use crate::timeline::{NodeId, ROOT_ID, Timeline, TimelineNode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// On-disk document: metadata, the calendar block, the pass configuration
/// and the node tree rooted at the implicit root group. Versioning is the
/// loading caller's concern; this layer only requires the layout itself.
#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    metadata: PlanMetadata,
    calendar: WorkCalendarConfig,
    #[serde(default = "default_recursive_max")]
    recursive_max: usize,
    root: NodeSnapshot,
}

fn default_recursive_max() -> usize {
    DEFAULT_RECURSIVE_MAX
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NodeSnapshot {
    Group {
        id: NodeId,
        name: String,
        #[serde(default)]
        children: Vec<NodeSnapshot>,
    },
    Task {
        id: NodeId,
        name: String,
        workload_days: f64,
        #[serde(default)]
        progress: f64,
        #[serde(default)]
        previous: Vec<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        static_begin: Option<NaiveDate>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        assignments: Vec<ResourceAssignment>,
    },
}

impl PlanSnapshot {
    fn from_plan(plan: &Plan) -> PersistenceResult<Self> {
        super::validate_plan(plan)?;
        Ok(Self {
            metadata: plan.metadata().clone(),
            calendar: plan.calendar().to_config(),
            recursive_max: plan.config().recursive_max(),
            root: node_snapshot(plan.timeline(), ROOT_ID)?,
        })
    }

    fn into_plan(self) -> PersistenceResult<Plan> {
        let calendar = WorkCalendar::from_config(&self.calendar)?;
        let config = CalculatorConfig::new(self.recursive_max)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;

        let NodeSnapshot::Group { id, children, .. } = &self.root else {
            return Err(PersistenceError::InvalidData(
                "root node must be a group".into(),
            ));
        };
        if *id != ROOT_ID {
            return Err(PersistenceError::InvalidData(format!(
                "root group must carry the reserved id, found {id}"
            )));
        }

        // Two phases: dependency targets may live anywhere in the tree, so
        // every node must exist before any edge is set.
        let mut timeline = Timeline::new();
        let mut pending: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for child in children {
            insert_subtree(&mut timeline, ROOT_ID, child, &mut pending)?;
        }
        for (task_id, previous) in pending {
            timeline.set_previous(task_id, previous)?;
        }

        let plan = Plan::from_parts(self.metadata, timeline, calendar, config);
        super::validate_plan(&plan)?;
        Ok(plan)
    }
}

fn node_snapshot(timeline: &Timeline, id: NodeId) -> PersistenceResult<NodeSnapshot> {
    match timeline.node(id) {
        Some(TimelineNode::Group(group)) => {
            let mut children = Vec::with_capacity(group.children.len());
            for child in &group.children {
                children.push(node_snapshot(timeline, *child)?);
            }
            Ok(NodeSnapshot::Group {
                id: group.id,
                name: group.name.clone(),
                children,
            })
        }
        Some(TimelineNode::Task(task)) => Ok(NodeSnapshot::Task {
            id: task.id,
            name: task.name.clone(),
            workload_days: task.workload_days,
            progress: task.progress,
            previous: task.previous.clone(),
            static_begin: task.static_begin,
            assignments: task.assignments.clone(),
        }),
        None => Err(PersistenceError::InvalidData(format!(
            "tree references unknown node {id}"
        ))),
    }
}

fn insert_subtree(
    timeline: &mut Timeline,
    parent: NodeId,
    snapshot: &NodeSnapshot,
    pending: &mut Vec<(NodeId, Vec<NodeId>)>,
) -> PersistenceResult<()> {
    match snapshot {
        NodeSnapshot::Group { id, name, children } => {
            timeline.insert_group_with_id(*id, parent, name.clone())?;
            for child in children {
                insert_subtree(timeline, *id, child, pending)?;
            }
        }
        NodeSnapshot::Task {
            id,
            name,
            workload_days,
            progress,
            previous,
            static_begin,
            assignments,
        } => {
            timeline.insert_task_with_id(*id, parent, name.clone())?;
            timeline.set_workload(*id, *workload_days)?;
            timeline.set_progress(*id, *progress)?;
            timeline.set_static_begin(*id, *static_begin)?;
            timeline.set_assignments(*id, assignments.clone())?;
            if !previous.is_empty() {
                pending.push((*id, previous.clone()));
            }
        }
    }
    Ok(())
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let snapshot = PlanSnapshot::from_plan(plan)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    snapshot.into_plan()
}
