//! Step records - the unit of output of a migration run.
//!
//! A step describes one atomic change to a content type or one of its
//! fields. Steps serialize to the shape consumed by executors:
//!
//! ```text
//! { "type": "field/update",
//!   "meta": { "contentTypeInstanceId": "contentType/person/0",
//!             "fieldInstanceId": "fields/fullName/0" },
//!   "payload": { "contentTypeId": "person", "fieldId": "fullName",
//!                "props": { "name": "Full Name" } } }
//! ```

use super::props::Props;
use serde::{Deserialize, Serialize};
use std::panic::Location;

/// Kind of a migration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// A content type is created.
    #[serde(rename = "contentType/create")]
    ContentTypeCreate,
    /// One property of a content type is set.
    #[serde(rename = "contentType/update")]
    ContentTypeUpdate,
    /// A field is created on a content type.
    #[serde(rename = "field/create")]
    FieldCreate,
    /// One property of a field is set.
    #[serde(rename = "field/update")]
    FieldUpdate,
    /// A field is removed from a content type.
    #[serde(rename = "field/delete")]
    FieldDelete,
}

impl StepKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::ContentTypeCreate => "contentType/create",
            StepKind::ContentTypeUpdate => "contentType/update",
            StepKind::FieldCreate => "field/create",
            StepKind::FieldUpdate => "field/update",
            StepKind::FieldDelete => "field/delete",
        }
    }

    /// Whether steps of this kind target a field.
    pub fn is_field_step(&self) -> bool {
        matches!(
            self,
            StepKind::FieldCreate | StepKind::FieldUpdate | StepKind::FieldDelete
        )
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source location of the builder call that produced a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Origin {
    /// Build an origin from a captured caller location.
    pub fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Identity of the builder instance a step belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMeta {
    /// `contentType/<contentTypeId>/<index>`.
    pub content_type_instance_id: String,
    /// `fields/<fieldId>/<index>`, present on field steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_instance_id: Option<String>,
}

/// What a step changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPayload {
    /// Target content type id.
    pub content_type_id: String,
    /// Target field id, present on field steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    /// Properties set by this step, present on update steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
}

/// A single immutable step of a migration plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step kind.
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Instance identity of the mutated entity.
    pub meta: StepMeta,
    /// Change payload.
    pub payload: StepPayload,
    /// Where the step was recorded, if origin capture is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Step {
    /// Get the content type instance id this step belongs to.
    pub fn content_type_instance_id(&self) -> &str {
        &self.meta.content_type_instance_id
    }

    /// Get the field instance id, if this is a field step.
    pub fn field_instance_id(&self) -> Option<&str> {
        self.meta.field_instance_id.as_deref()
    }

    /// Get the props of an update step.
    pub fn props(&self) -> Option<&Props> {
        self.payload.props.as_ref()
    }

    /// Return a copy of this step without its origin.
    pub fn without_origin(&self) -> Self {
        Self {
            origin: None,
            ..self.clone()
        }
    }

    /// Get a one-line description of this step.
    pub fn description(&self) -> String {
        let target = match &self.payload.field_id {
            Some(field_id) => format!("'{}.{}'", self.payload.content_type_id, field_id),
            None => format!("'{}'", self.payload.content_type_id),
        };
        let keys = self
            .payload
            .props
            .as_ref()
            .map(|props| props.keys().cloned().collect::<Vec<_>>().join(", "));

        match (self.kind, keys) {
            (StepKind::ContentTypeCreate, _) => format!("create content type {}", target),
            (StepKind::ContentTypeUpdate, Some(keys)) => {
                format!("update content type {} {{{}}}", target, keys)
            }
            (StepKind::ContentTypeUpdate, None) => format!("update content type {}", target),
            (StepKind::FieldCreate, _) => format!("create field {}", target),
            (StepKind::FieldUpdate, Some(keys)) => format!("update field {} {{{}}}", target, keys),
            (StepKind::FieldUpdate, None) => format!("update field {}", target),
            (StepKind::FieldDelete, _) => format!("delete field {}", target),
        }
    }
}
