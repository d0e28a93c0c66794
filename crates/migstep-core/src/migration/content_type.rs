//! Content type builder.

use super::field::FieldBuilder;
use super::props::{single_prop, split_props, IntoProps, Props};
use super::recorder::{ContentTypeRef, SharedRecorder};
use super::step::StepKind;
use serde_json::Value;
use std::panic::Location;
use std::sync::Arc;

/// Fluent handle for one content type instance.
///
/// Setters record one `contentType/update` step each. Field operations are
/// scoped to this instance: field indexes restart at 0 for every content
/// type instance.
#[derive(Clone)]
pub struct ContentTypeBuilder {
    recorder: SharedRecorder,
    content_type: ContentTypeRef,
}

impl ContentTypeBuilder {
    /// Allocate a new instance and record `contentType/create` followed by one
    /// `contentType/update` per prop.
    pub(crate) fn create(
        recorder: &SharedRecorder,
        content_type_id: &str,
        props: Props,
        location: &'static Location<'static>,
    ) -> Self {
        let mut guard = recorder.lock();
        let content_type = guard.allocate_content_type(content_type_id);
        guard.record_content_type(StepKind::ContentTypeCreate, &content_type, None, location);
        for prop in split_props(props) {
            guard.record_content_type(StepKind::ContentTypeUpdate, &content_type, Some(prop), location);
        }
        drop(guard);

        Self {
            recorder: Arc::clone(recorder),
            content_type,
        }
    }

    /// Resolve the latest instance for `content_type_id` (allocating index 0
    /// on first reference) and record one `contentType/update` per prop.
    pub(crate) fn edit(
        recorder: &SharedRecorder,
        content_type_id: &str,
        props: Props,
        location: &'static Location<'static>,
    ) -> Self {
        let mut guard = recorder.lock();
        let content_type = guard.resolve_content_type(content_type_id);
        for prop in split_props(props) {
            guard.record_content_type(StepKind::ContentTypeUpdate, &content_type, Some(prop), location);
        }
        drop(guard);

        Self {
            recorder: Arc::clone(recorder),
            content_type,
        }
    }

    /// Get the content type id.
    pub fn content_type_id(&self) -> &str {
        &self.content_type.content_type_id
    }

    /// Get the instance id (`contentType/<contentTypeId>/<index>`).
    pub fn instance_id(&self) -> &str {
        &self.content_type.instance_id
    }

    /// Set an arbitrary property. Any key is accepted.
    #[track_caller]
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        let location = Location::caller();
        let props = single_prop(key, value.into());
        self.recorder.lock().record_content_type(
            StepKind::ContentTypeUpdate,
            &self.content_type,
            Some(props),
            location,
        );
        self
    }

    /// Set the display name.
    #[track_caller]
    pub fn name(&self, value: impl Into<Value>) -> &Self {
        self.set("name", value)
    }

    /// Set the description.
    #[track_caller]
    pub fn description(&self, value: impl Into<Value>) -> &Self {
        self.set("description", value)
    }

    /// Set the field used as entry title (property `displayField`).
    #[track_caller]
    pub fn display_field(&self, value: impl Into<Value>) -> &Self {
        self.set("displayField", value)
    }

    /// Create a new field instance without props.
    #[track_caller]
    pub fn create_field(&self, field_id: &str) -> FieldBuilder {
        FieldBuilder::create(
            &self.recorder,
            &self.content_type,
            field_id,
            Props::new(),
            Location::caller(),
        )
    }

    /// Create a new field instance and set its props in key order.
    #[track_caller]
    pub fn create_field_with(&self, field_id: &str, props: impl IntoProps) -> FieldBuilder {
        FieldBuilder::create(
            &self.recorder,
            &self.content_type,
            field_id,
            props.into_props(),
            Location::caller(),
        )
    }

    /// Get the builder for a field of this instance. Repeated calls with the
    /// same id return equal handles.
    pub fn edit_field(&self, field_id: &str) -> FieldBuilder {
        FieldBuilder::edit(&self.recorder, &self.content_type, field_id)
    }

    /// Record removal of a field of this instance.
    #[track_caller]
    pub fn delete_field(&self, field_id: &str) -> FieldBuilder {
        FieldBuilder::delete(&self.recorder, &self.content_type, field_id, Location::caller())
    }
}

impl PartialEq for ContentTypeBuilder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.recorder, &other.recorder) && self.content_type == other.content_type
    }
}

impl Eq for ContentTypeBuilder {}

impl std::fmt::Debug for ContentTypeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTypeBuilder")
            .field("instance_id", &self.content_type.instance_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::recorder::Recorder;
    use crate::migration::step::Step;
    use serde_json::json;

    fn steps(recorder: &SharedRecorder) -> Vec<Step> {
        recorder.lock().finish()
    }

    fn props(value: Value) -> Props {
        value.into_props()
    }

    #[test]
    fn test_create_allocates_new_instances() {
        let recorder = Recorder::shared(false);
        let first = ContentTypeBuilder::create(&recorder, "person", Props::new(), Location::caller());
        let second = ContentTypeBuilder::create(&recorder, "person", Props::new(), Location::caller());
        assert_eq!(first.instance_id(), "contentType/person/0");
        assert_eq!(second.instance_id(), "contentType/person/1");
        assert_ne!(first, second);

        let steps = steps(&recorder);
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.kind == StepKind::ContentTypeCreate));
    }

    #[test]
    fn test_edit_reuses_latest_instance() {
        let recorder = Recorder::shared(false);
        let edited = ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller());
        let again = ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller());
        assert_eq!(edited, again);
        assert_eq!(edited.instance_id(), "contentType/person/0");

        let created = ContentTypeBuilder::create(&recorder, "person", Props::new(), Location::caller());
        assert_eq!(created.instance_id(), "contentType/person/1");
        let latest = ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller());
        assert_eq!(latest, created);

        // Edits without props record nothing; only the create does.
        assert_eq!(steps(&recorder).len(), 1);
    }

    #[test]
    fn test_edit_records_update_per_prop() {
        let recorder = Recorder::shared(false);
        ContentTypeBuilder::edit(
            &recorder,
            "address",
            props(json!({ "name": "the new name", "description": "d" })),
            Location::caller(),
        );

        let steps = steps(&recorder);
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.kind == StepKind::ContentTypeUpdate));
        assert!(steps[0].props().unwrap().contains_key("name"));
        assert!(steps[1].props().unwrap().contains_key("description"));
    }

    #[test]
    fn test_generic_setter_matches_named_setter() {
        let recorder = Recorder::shared(false);
        let person = ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller());
        person
            .name("a person")
            .set("fussel", "a person")
            .description("d")
            .display_field("favorite");

        let steps = steps(&recorder);
        let props: Vec<Value> = steps
            .iter()
            .map(|s| Value::Object(s.props().unwrap().clone()))
            .collect();
        assert_eq!(
            props,
            vec![
                json!({ "name": "a person" }),
                json!({ "fussel": "a person" }),
                json!({ "description": "d" }),
                json!({ "displayField": "favorite" }),
            ]
        );
    }

    #[test]
    fn test_edit_field_returns_cached_builder() {
        let recorder = Recorder::shared(false);
        let person = ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller());
        let created = person.create_field_with("age", json!({ "type": "Integer" }));
        let edited = person.edit_field("age");
        assert_eq!(created, edited);
        assert_eq!(person.edit_field("age"), edited);
    }

    #[test]
    fn test_field_scopes_are_per_instance() {
        let recorder = Recorder::shared(false);
        let first = ContentTypeBuilder::create(&recorder, "person", Props::new(), Location::caller());
        let second = ContentTypeBuilder::create(&recorder, "person", Props::new(), Location::caller());

        let a = second.create_field("fullName");
        let b = first.create_field("fullName");
        assert_eq!(a.instance_id(), "fields/fullName/0");
        assert_eq!(b.instance_id(), "fields/fullName/0");
        assert_eq!(a.content_type_instance_id(), "contentType/person/1");
        assert_eq!(b.content_type_instance_id(), "contentType/person/0");
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_field_on_unseen_id() {
        let recorder = Recorder::shared(false);
        ContentTypeBuilder::edit(&recorder, "person", Props::new(), Location::caller()).delete_field("age");

        let steps = steps(&recorder);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::FieldDelete);
        assert_eq!(steps[0].content_type_instance_id(), "contentType/person/0");
        assert_eq!(steps[0].field_instance_id(), Some("fields/age/0"));
    }
}
