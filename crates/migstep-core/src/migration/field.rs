//! Field builder.

use super::props::{single_prop, split_props, Props};
use super::recorder::{ContentTypeRef, FieldRef, SharedRecorder};
use super::step::StepKind;
use serde_json::Value;
use std::panic::Location;
use std::sync::Arc;

/// Fluent handle for one field instance of a content type instance.
///
/// Every setter records one `field/update` step. Handles are cheap to clone;
/// two handles are equal when they denote the same field instance of the same
/// migration run.
#[derive(Clone)]
pub struct FieldBuilder {
    recorder: SharedRecorder,
    field: FieldRef,
}

impl FieldBuilder {
    /// Allocate a new field instance and record `field/create` followed by
    /// one `field/update` per prop.
    pub(crate) fn create(
        recorder: &SharedRecorder,
        content_type: &ContentTypeRef,
        field_id: &str,
        props: Props,
        location: &'static Location<'static>,
    ) -> Self {
        let mut guard = recorder.lock();
        let field = guard.allocate_field(content_type, field_id);
        guard.record_field(StepKind::FieldCreate, &field, None, location);
        for prop in split_props(props) {
            guard.record_field(StepKind::FieldUpdate, &field, Some(prop), location);
        }
        drop(guard);

        Self {
            recorder: Arc::clone(recorder),
            field,
        }
    }

    /// Resolve the field instance for editing. Records nothing.
    pub(crate) fn edit(recorder: &SharedRecorder, content_type: &ContentTypeRef, field_id: &str) -> Self {
        let field = recorder.lock().resolve_field(content_type, field_id);
        Self {
            recorder: Arc::clone(recorder),
            field,
        }
    }

    /// Resolve the field instance and record a `field/delete` step.
    pub(crate) fn delete(
        recorder: &SharedRecorder,
        content_type: &ContentTypeRef,
        field_id: &str,
        location: &'static Location<'static>,
    ) -> Self {
        let mut guard = recorder.lock();
        let field = guard.resolve_field(content_type, field_id);
        guard.record_field(StepKind::FieldDelete, &field, None, location);
        drop(guard);

        Self {
            recorder: Arc::clone(recorder),
            field,
        }
    }

    /// Get the field id.
    pub fn field_id(&self) -> &str {
        &self.field.field_id
    }

    /// Get the field instance id (`fields/<fieldId>/<index>`).
    pub fn instance_id(&self) -> &str {
        &self.field.instance_id
    }

    /// Get the owning content type id.
    pub fn content_type_id(&self) -> &str {
        &self.field.content_type.content_type_id
    }

    /// Get the owning content type instance id.
    pub fn content_type_instance_id(&self) -> &str {
        &self.field.content_type.instance_id
    }

    /// Set an arbitrary property. Any key is accepted.
    #[track_caller]
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        let location = Location::caller();
        let props = single_prop(key, value.into());
        self.recorder
            .lock()
            .record_field(StepKind::FieldUpdate, &self.field, Some(props), location);
        self
    }

    /// Set the display name.
    #[track_caller]
    pub fn name(&self, value: impl Into<Value>) -> &Self {
        self.set("name", value)
    }

    /// Set the field type (property `type`).
    #[track_caller]
    pub fn field_type(&self, value: impl Into<Value>) -> &Self {
        self.set("type", value)
    }

    /// Set whether the field is omitted from delivery.
    #[track_caller]
    pub fn omitted(&self, value: impl Into<Value>) -> &Self {
        self.set("omitted", value)
    }

    /// Mark the field as required.
    #[track_caller]
    pub fn required(&self, value: impl Into<Value>) -> &Self {
        self.set("required", value)
    }

    /// Mark the field as localized.
    #[track_caller]
    pub fn localized(&self, value: impl Into<Value>) -> &Self {
        self.set("localized", value)
    }

    /// Disable editing of the field.
    #[track_caller]
    pub fn disabled(&self, value: impl Into<Value>) -> &Self {
        self.set("disabled", value)
    }

    /// Set the validation rules.
    #[track_caller]
    pub fn validations(&self, value: impl Into<Value>) -> &Self {
        self.set("validations", value)
    }

    /// Set the link type of a link field (property `linkType`).
    #[track_caller]
    pub fn link_type(&self, value: impl Into<Value>) -> &Self {
        self.set("linkType", value)
    }

    /// Set the item schema of an array field.
    #[track_caller]
    pub fn items(&self, value: impl Into<Value>) -> &Self {
        self.set("items", value)
    }
}

impl PartialEq for FieldBuilder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.recorder, &other.recorder) && self.field == other.field
    }
}

impl Eq for FieldBuilder {}

impl std::fmt::Debug for FieldBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBuilder")
            .field("content_type_instance_id", &self.field.content_type.instance_id)
            .field("instance_id", &self.field.instance_id)
            .finish()
    }
}
