use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::calculations::work_range::CalculatorConfig;
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::metadata::PlanMetadata;
use crate::plan::Plan;
use crate::resource::ResourceAssignment;
use crate::timeline::{NodeId, ROOT_ID, Timeline, TimelineNode};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Row payload for one node; tree position lives in the table columns.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NodeRecord {
    Group {
        name: String,
    },
    Task {
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

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS plan_header (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL,
                calendar_json TEXT NOT NULL,
                recursive_max INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS timeline_nodes (
                id TEXT PRIMARY KEY,
                parent_id TEXT NOT NULL,
                depth INTEGER NOT NULL,
                position INTEGER NOT NULL,
                node_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_header(&self, tx: &rusqlite::Transaction, plan: &Plan) -> PersistenceResult<()> {
        let metadata_json = serde_json::to_string(plan.metadata())?;
        let calendar_json = serde_json::to_string(&plan.calendar().to_config())?;
        tx.execute("DELETE FROM plan_header", [])?;
        tx.execute(
            "INSERT INTO plan_header (id, metadata_json, calendar_json, recursive_max)
             VALUES (1, ?1, ?2, ?3)",
            params![
                metadata_json,
                calendar_json,
                plan.config().recursive_max() as i64
            ],
        )?;
        Ok(())
    }

    fn save_nodes(&self, tx: &rusqlite::Transaction, plan: &Plan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM timeline_nodes", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO timeline_nodes (id, parent_id, depth, position, node_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        let timeline = plan.timeline();
        let mut stack: Vec<(NodeId, i64)> = vec![(ROOT_ID, 0)];
        while let Some((group_id, depth)) = stack.pop() {
            let children = timeline
                .children(group_id)
                .map_err(PersistenceError::from)?;
            for (position, child) in children.iter().enumerate() {
                let record = node_record(timeline, *child)?;
                let json = serde_json::to_string(&record)?;
                stmt.execute(params![
                    child.to_string(),
                    group_id.to_string(),
                    depth + 1,
                    position as i64,
                    json
                ])?;
                if matches!(timeline.node(*child), Some(TimelineNode::Group(_))) {
                    stack.push((*child, depth + 1));
                }
            }
        }
        Ok(())
    }
}

fn node_record(timeline: &Timeline, id: NodeId) -> PersistenceResult<NodeRecord> {
    match timeline.node(id) {
        Some(TimelineNode::Group(group)) => Ok(NodeRecord::Group {
            name: group.name.clone(),
        }),
        Some(TimelineNode::Task(task)) => Ok(NodeRecord::Task {
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

fn parse_node_id(raw: &str) -> PersistenceResult<NodeId> {
    raw.parse::<NodeId>()
        .map_err(|_| PersistenceError::InvalidData(format!("invalid node id '{raw}'")))
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_header(&tx, plan)?;
        self.save_nodes(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<Plan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare(
            "SELECT metadata_json, calendar_json, recursive_max FROM plan_header WHERE id = 1",
        )?;
        let header: Option<(String, String, i64)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;

        let Some((metadata_json, calendar_json, recursive_max)) = header else {
            return Ok(None);
        };

        let metadata: PlanMetadata = serde_json::from_str(&metadata_json)?;
        let calendar_config: WorkCalendarConfig = serde_json::from_str(&calendar_json)?;
        let calendar = WorkCalendar::from_config(&calendar_config)?;
        let config = CalculatorConfig::new(recursive_max.max(0) as usize)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;

        // Parents precede children in depth order, per-parent order comes
        // from the position column.
        let mut stmt = conn.prepare(
            "SELECT id, parent_id, node_json FROM timeline_nodes
             ORDER BY depth ASC, parent_id ASC, position ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut timeline = Timeline::new();
        let mut pending: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for row in rows {
            let (id_raw, parent_raw, json) = row?;
            let id = parse_node_id(&id_raw)?;
            let parent = parse_node_id(&parent_raw)?;
            match serde_json::from_str::<NodeRecord>(&json)? {
                NodeRecord::Group { name } => {
                    timeline.insert_group_with_id(id, parent, name)?;
                }
                NodeRecord::Task {
                    name,
                    workload_days,
                    progress,
                    previous,
                    static_begin,
                    assignments,
                } => {
                    timeline.insert_task_with_id(id, parent, name)?;
                    timeline.set_workload(id, workload_days)?;
                    timeline.set_progress(id, progress)?;
                    timeline.set_static_begin(id, static_begin)?;
                    timeline.set_assignments(id, assignments)?;
                    if !previous.is_empty() {
                        pending.push((id, previous));
                    }
                }
            }
        }
        for (task_id, previous) in pending {
            timeline.set_previous(task_id, previous)?;
        }

        let plan = Plan::from_parts(metadata, timeline, calendar, config);
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}
