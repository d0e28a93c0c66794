//! Migration-plan recording.
//!
//! A migration callback drives fluent content type and field builders. Every
//! builder call is turned into one or more declarative steps, appended to a
//! single ordered plan:
//!
//! | Call | Steps |
//! |------|-------|
//! | `create_content_type_with(id, props)` | `contentType/create`, then one `contentType/update` per prop |
//! | `edit_content_type_with(id, props)` | one `contentType/update` per prop |
//! | content type setter | one `contentType/update` |
//! | `create_field_with(id, props)` | `field/create`, then one `field/update` per prop |
//! | `edit_field(id)` | none |
//! | field setter | one `field/update` |
//! | `delete_field(id)` | one `field/delete` |
//!
//! Steps are tagged with run-scoped instance ids (`contentType/person/0`,
//! `fields/fullName/0`) so an executor can correlate steps issued through
//! the same builder.
//!
//! # Example
//!
//! ```
//! use migstep_core::migration::{MigrationConfig, MigrationRunner};
//!
//! let runner = MigrationRunner::new(MigrationConfig::new().with_capture_origin(false));
//! let plan = runner
//!     .plan(|m| {
//!         let person = m.create_content_type_with("person", [("description", "A person")]);
//!         person.create_field("fullName").name("Full Name").field_type("Symbol");
//!         m.edit_content_type("address").delete_field("age");
//!     })
//!     .unwrap();
//!
//! assert_eq!(plan.len(), 6);
//! ```
//!
//! The planner does not check that steps are applicable to any real schema;
//! unknown property names and operations on missing entities are recorded
//! as-is.

pub mod content_type;
pub mod error;
pub mod field;
pub mod plan;
pub mod props;
mod recorder;
pub mod registry;
pub mod runner;
pub mod step;

// Re-export main types

// Builder types
pub use content_type::ContentTypeBuilder;
pub use field::FieldBuilder;

// Error types
pub use error::{CallbackError, MigrationError};

// Plan and step types
pub use plan::MigrationPlan;
pub use props::{single_prop, split_props, IntoProps, Props};
pub use step::{Origin, Step, StepKind, StepMeta, StepPayload};

// Registry types
pub use registry::{content_type_instance_id, field_instance_id, InstanceRegistry};

// Runner types
pub use runner::{
    migration, migration_async, CallbackResult, Migration, MigrationConfig, MigrationRunner,
};
