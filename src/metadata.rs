use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub plan_name: String,
    pub plan_description: String,
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            plan_name: "New Plan".to_string(),
            plan_description: "No description".to_string(),
        }
    }
}
