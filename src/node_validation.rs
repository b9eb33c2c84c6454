use crate::timeline::{ROOT_ID, TaskNode, Timeline};
use std::fmt;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct NodeValidationError {
    message: String,
}

impl NodeValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for NodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NodeValidationError {}

pub fn validate_task(task: &TaskNode) -> Result<(), NodeValidationError> {
    if !task.workload_days.is_finite() || task.workload_days < -EPSILON {
        return Err(NodeValidationError::new(format!(
            "task {} has invalid workload {}",
            task.id, task.workload_days
        )));
    }

    if !task.progress.is_finite()
        || task.progress < -EPSILON
        || task.progress > 1.0 + EPSILON
    {
        return Err(NodeValidationError::new(format!(
            "task {} has invalid progress {} (must be between 0 and 1)",
            task.id, task.progress
        )));
    }

    for (idx, assignment) in task.assignments.iter().enumerate() {
        if assignment.resource_id.trim().is_empty() {
            return Err(NodeValidationError::new(format!(
                "task {} assignment #{} requires a non-empty resource_id",
                task.id, idx
            )));
        }
        if !assignment.allocation_units.is_finite() || assignment.allocation_units < -EPSILON {
            return Err(NodeValidationError::new(format!(
                "task {} assignment for '{}' has invalid allocation_units {}",
                task.id, assignment.resource_id, assignment.allocation_units
            )));
        }
    }

    Ok(())
}

/// Whole-tree validation run at the persistence boundary.
///
/// A self-referencing dependency is deliberately NOT rejected here: the
/// calculator owns that condition and reports it per node.
pub fn validate_timeline(timeline: &Timeline) -> Result<(), NodeValidationError> {
    for task in timeline.tasks() {
        validate_task(task)?;

        for target in &task.previous {
            if *target == ROOT_ID {
                return Err(NodeValidationError::new(format!(
                    "task {} depends on the reserved root group",
                    task.id
                )));
            }
            if !timeline.contains(*target) {
                return Err(NodeValidationError::new(format!(
                    "task {} depends on unknown node {}",
                    task.id, target
                )));
            }
        }
    }
    Ok(())
}
