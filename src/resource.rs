use serde::{Deserialize, Serialize};

/// An assignment of a resource (person, crew, equipment tag) to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAssignment {
    /// Identifier for the resource. This can be a person id, crew name, or
    /// equipment tag.
    pub resource_id: String,
    /// Optional role or description for the resource while working on the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Planned units for the assignment (e.g., hours or FTE-days). Must be
    /// non-negative.
    pub allocation_units: f64,
    /// Optional free-form notes about the assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ResourceAssignment {
    pub fn new(resource_id: impl Into<String>, allocation_units: f64) -> Self {
        Self {
            resource_id: resource_id.into(),
            role: None,
            allocation_units,
            notes: None,
        }
    }
}
