//! migstep core - records schema migration builder calls as an ordered,
//! declarative step plan.
//!
//! This crate provides the builder API, the instance registry, the migration
//! runner and call-script replay. Applying a plan to a live schema store is
//! left to an executor.

pub mod migration;
pub mod script;

pub use migration::{
    migration, migration_async, ContentTypeBuilder, FieldBuilder, Migration, MigrationConfig,
    MigrationError, MigrationPlan, MigrationRunner, Origin, Props, Step, StepKind,
};
pub use script::{MigrationScript, ScriptCall, ScriptError};
