//! Shared step recorder for one migration run.
//!
//! All builders of a run hold a handle to the same recorder. It owns the
//! ordered step list and the instance registries, and lives exactly as long
//! as the run's builders do.

use super::props::Props;
use super::registry::{content_type_instance_id, field_instance_id, InstanceRegistry};
use super::step::{Origin, Step, StepKind, StepMeta, StepPayload};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;
use tracing::{debug, warn};

/// Recorder handle shared between a migration context and its builders.
pub(crate) type SharedRecorder = Arc<Mutex<Recorder>>;

/// Resolved identity of a content type builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ContentTypeRef {
    pub(crate) content_type_id: String,
    pub(crate) instance_id: String,
}

/// Resolved identity of a field builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FieldRef {
    pub(crate) content_type: ContentTypeRef,
    pub(crate) field_id: String,
    pub(crate) instance_id: String,
}

/// Step sink and identity allocator for one run.
#[derive(Debug)]
pub(crate) struct Recorder {
    steps: Vec<Step>,
    content_types: InstanceRegistry,
    /// Field registries keyed by content type instance id.
    fields: HashMap<String, InstanceRegistry>,
    capture_origin: bool,
    finalized: bool,
}

impl Recorder {
    pub(crate) fn new(capture_origin: bool) -> Self {
        Self {
            steps: Vec::new(),
            content_types: InstanceRegistry::new(),
            fields: HashMap::new(),
            capture_origin,
            finalized: false,
        }
    }

    pub(crate) fn shared(capture_origin: bool) -> SharedRecorder {
        Arc::new(Mutex::new(Self::new(capture_origin)))
    }

    /// Allocate a new content type instance.
    pub(crate) fn allocate_content_type(&mut self, content_type_id: &str) -> ContentTypeRef {
        let index = self.content_types.allocate(content_type_id);
        ContentTypeRef {
            content_type_id: content_type_id.to_string(),
            instance_id: content_type_instance_id(content_type_id, index),
        }
    }

    /// Resolve the latest content type instance, allocating one if unseen.
    pub(crate) fn resolve_content_type(&mut self, content_type_id: &str) -> ContentTypeRef {
        let index = self.content_types.resolve(content_type_id);
        ContentTypeRef {
            content_type_id: content_type_id.to_string(),
            instance_id: content_type_instance_id(content_type_id, index),
        }
    }

    /// Allocate a new field instance within a content type instance.
    pub(crate) fn allocate_field(&mut self, content_type: &ContentTypeRef, field_id: &str) -> FieldRef {
        let index = self
            .fields
            .entry(content_type.instance_id.clone())
            .or_default()
            .allocate(field_id);
        FieldRef {
            content_type: content_type.clone(),
            field_id: field_id.to_string(),
            instance_id: field_instance_id(field_id, index),
        }
    }

    /// Resolve the latest field instance within a content type instance,
    /// allocating one if the field id is unseen there.
    pub(crate) fn resolve_field(&mut self, content_type: &ContentTypeRef, field_id: &str) -> FieldRef {
        let index = self
            .fields
            .entry(content_type.instance_id.clone())
            .or_default()
            .resolve(field_id);
        FieldRef {
            content_type: content_type.clone(),
            field_id: field_id.to_string(),
            instance_id: field_instance_id(field_id, index),
        }
    }

    /// Record a content type step.
    pub(crate) fn record_content_type(
        &mut self,
        kind: StepKind,
        content_type: &ContentTypeRef,
        props: Option<Props>,
        location: &'static Location<'static>,
    ) {
        let step = Step {
            kind,
            meta: StepMeta {
                content_type_instance_id: content_type.instance_id.clone(),
                field_instance_id: None,
            },
            payload: StepPayload {
                content_type_id: content_type.content_type_id.clone(),
                field_id: None,
                props,
            },
            origin: self.origin(location),
        };
        self.push(step);
    }

    /// Record a field step.
    pub(crate) fn record_field(
        &mut self,
        kind: StepKind,
        field: &FieldRef,
        props: Option<Props>,
        location: &'static Location<'static>,
    ) {
        let step = Step {
            kind,
            meta: StepMeta {
                content_type_instance_id: field.content_type.instance_id.clone(),
                field_instance_id: Some(field.instance_id.clone()),
            },
            payload: StepPayload {
                content_type_id: field.content_type.content_type_id.clone(),
                field_id: Some(field.field_id.clone()),
                props,
            },
            origin: self.origin(location),
        };
        self.push(step);
    }

    /// Take the recorded steps and close the recorder.
    pub(crate) fn finish(&mut self) -> Vec<Step> {
        self.finalized = true;
        std::mem::take(&mut self.steps)
    }

    /// Drop any recorded steps and close the recorder.
    pub(crate) fn abort(&mut self) {
        self.finalized = true;
        self.steps.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    fn origin(&self, location: &'static Location<'static>) -> Option<Origin> {
        self.capture_origin.then(|| Origin::from_location(location))
    }

    fn push(&mut self, step: Step) {
        if self.finalized {
            warn!(
                step_type = %step.kind,
                content_type_instance = %step.meta.content_type_instance_id,
                "builder used after the plan was finalized; step dropped"
            );
            return;
        }

        debug!(
            seq = self.steps.len(),
            step_type = %step.kind,
            content_type_instance = %step.meta.content_type_instance_id,
            field_instance = step.meta.field_instance_id.as_deref().unwrap_or(""),
            "recorded step"
        );
        self.steps.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_scopes_follow_content_type_instance() {
        let mut recorder = Recorder::new(false);
        let first = recorder.allocate_content_type("person");
        let second = recorder.allocate_content_type("person");

        assert_eq!(recorder.allocate_field(&first, "age").instance_id, "fields/age/0");
        assert_eq!(recorder.allocate_field(&second, "age").instance_id, "fields/age/0");
        assert_eq!(recorder.allocate_field(&first, "age").instance_id, "fields/age/1");
        assert_eq!(recorder.resolve_field(&first, "age").instance_id, "fields/age/1");
    }

    #[test]
    fn test_update_steps_carry_props() {
        let mut recorder = Recorder::new(false);
        let person = recorder.resolve_content_type("person");
        let age = recorder.allocate_field(&person, "age");

        let mut props = Props::new();
        props.insert("name".to_string(), serde_json::json!("Person"));
        recorder.record_content_type(StepKind::ContentTypeUpdate, &person, Some(props), Location::caller());

        let mut props = Props::new();
        props.insert("type".to_string(), serde_json::json!("Integer"));
        recorder.record_field(StepKind::FieldUpdate, &age, Some(props), Location::caller());

        let steps = recorder.finish();
        assert_eq!(steps[0].props().unwrap()["name"], "Person");
        assert_eq!(steps[1].props().unwrap()["type"], "Integer");
        assert_eq!(steps[1].field_instance_id(), Some("fields/age/0"));
    }

    #[test]
    fn test_origin_capture_toggle() {
        let location = Location::caller();

        let mut recorder = Recorder::new(true);
        let person = recorder.resolve_content_type("person");
        recorder.record_content_type(StepKind::ContentTypeCreate, &person, None, location);
        let steps = recorder.finish();
        let origin = steps[0].origin.as_ref().expect("origin captured");
        assert_eq!(origin.line, location.line());

        let mut recorder = Recorder::new(false);
        recorder.record_content_type(StepKind::ContentTypeCreate, &person, None, location);
        assert!(recorder.finish()[0].origin.is_none());
    }

    #[test]
    fn test_steps_after_finish_are_dropped() {
        let mut recorder = Recorder::new(false);
        let person = recorder.resolve_content_type("person");
        recorder.record_content_type(StepKind::ContentTypeCreate, &person, None, Location::caller());
        assert_eq!(recorder.finish().len(), 1);

        recorder.record_content_type(StepKind::ContentTypeUpdate, &person, None, Location::caller());
        assert_eq!(recorder.len(), 0);
    }

    #[test]
    fn test_abort_discards_steps() {
        let mut recorder = Recorder::new(false);
        let person = recorder.resolve_content_type("person");
        recorder.record_content_type(StepKind::ContentTypeCreate, &person, None, Location::caller());
        recorder.abort();
        assert!(recorder.finish().is_empty());
    }
}
