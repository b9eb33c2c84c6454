use super::PersistenceResult;
use crate::calculations::work_range::WorkRange;
use crate::timeline::{NodeId, NodeKind, ROOT_ID, Timeline};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
struct RangeCsvRecord {
    id: String,
    name: String,
    kind: &'static str,
    state: &'static str,
    begin: String,
    end: String,
}

/// Flat export of a completed pass, one row per node in chart display order.
/// Failed nodes keep their reason label and empty date columns.
pub fn export_ranges_to_csv<P: AsRef<Path>>(
    timeline: &Timeline,
    ranges: &HashMap<NodeId, WorkRange>,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for id in timeline.preorder() {
        if id == ROOT_ID {
            continue;
        }
        let Some(node) = timeline.node(id) else {
            continue;
        };
        let state = ranges.get(&id).copied().unwrap_or(WorkRange::Loading);
        let (begin, end) = state
            .success()
            .map(|range| (range.begin().to_rfc3339(), range.end().to_rfc3339()))
            .unwrap_or_default();

        writer.serialize(RangeCsvRecord {
            id: id.to_string(),
            name: node.name().to_string(),
            kind: match node.kind() {
                NodeKind::Group => "group",
                NodeKind::Task => "task",
            },
            state: state.label(),
            begin,
            end,
        })?;
    }

    writer.flush()?;
    Ok(())
}
