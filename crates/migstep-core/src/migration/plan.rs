//! Migration plan container.

use super::error::MigrationError;
use super::step::{Step, StepKind};
use serde::{Deserialize, Serialize};

/// The ordered steps produced by one migration run.
///
/// Serializes as a plain JSON array of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationPlan {
    steps: Vec<Step>,
}

impl MigrationPlan {
    /// Create a plan from recorded steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Get the steps in call order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Consume the plan, returning its steps.
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    /// Iterate over the steps in call order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Get the number of steps in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if this plan is empty (no steps).
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get all steps tagged with a content type instance id.
    pub fn steps_for_content_type_instance(&self, instance_id: &str) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|s| s.meta.content_type_instance_id == instance_id)
            .collect()
    }

    /// Get all steps of a kind.
    pub fn steps_of_kind(&self, kind: StepKind) -> Vec<&Step> {
        self.steps.iter().filter(|s| s.kind == kind).collect()
    }

    /// Return a copy of the plan with every step's origin removed.
    pub fn without_origins(&self) -> Self {
        Self {
            steps: self.steps.iter().map(Step::without_origin).collect(),
        }
    }

    /// Render the plan as compact JSON.
    pub fn to_json(&self) -> Result<String, MigrationError> {
        serde_json::to_string(self).map_err(|e| MigrationError::Serialization(e.to_string()))
    }

    /// Render the plan as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, MigrationError> {
        serde_json::to_string_pretty(self).map_err(|e| MigrationError::Serialization(e.to_string()))
    }
}

impl IntoIterator for MigrationPlan {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a MigrationPlan {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
