//! Migration runner - executes a migration callback and collects its plan.
//!
//! Each run gets a fresh recorder: a new step list and new instance
//! registries. The callback runs exactly once. If it fails, the recorded
//! steps are discarded and the error is returned instead of a plan.

use super::content_type::ContentTypeBuilder;
use super::error::{CallbackError, MigrationError};
use super::plan::MigrationPlan;
use super::props::{IntoProps, Props};
use super::recorder::{Recorder, SharedRecorder};
use crate::script::MigrationScript;
use std::future::{ready, Future, Ready};
use std::panic::Location;
use tracing::{info, warn};

/// Migration runner configuration.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Whether steps carry the source location of the call that produced them.
    pub capture_origin: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            capture_origin: true,
        }
    }
}

impl MigrationConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether origins are captured.
    pub fn with_capture_origin(mut self, capture: bool) -> Self {
        self.capture_origin = capture;
        self
    }
}

/// Outcome of a migration callback.
///
/// Implemented for `()` and for `Result<(), E>`, so callbacks may be
/// infallible or return an error.
pub trait CallbackResult {
    /// Convert into a result with a boxed error.
    fn into_callback_result(self) -> Result<(), CallbackError>;
}

impl CallbackResult for () {
    fn into_callback_result(self) -> Result<(), CallbackError> {
        Ok(())
    }
}

impl<E> CallbackResult for Result<(), E>
where
    E: Into<CallbackError>,
{
    fn into_callback_result(self) -> Result<(), CallbackError> {
        self.map_err(Into::into)
    }
}

/// Top-level migration context handed to the callback.
///
/// Clones share the same run.
#[derive(Clone)]
pub struct Migration {
    recorder: SharedRecorder,
}

impl Migration {
    fn new(recorder: SharedRecorder) -> Self {
        Self { recorder }
    }

    /// Create a new content type instance.
    #[track_caller]
    pub fn create_content_type(&self, content_type_id: &str) -> ContentTypeBuilder {
        ContentTypeBuilder::create(&self.recorder, content_type_id, Props::new(), Location::caller())
    }

    /// Create a new content type instance and set its props in key order.
    #[track_caller]
    pub fn create_content_type_with(
        &self,
        content_type_id: &str,
        props: impl IntoProps,
    ) -> ContentTypeBuilder {
        ContentTypeBuilder::create(
            &self.recorder,
            content_type_id,
            props.into_props(),
            Location::caller(),
        )
    }

    /// Edit the most recent instance of a content type, or instance 0 if the
    /// id has not been referenced in this run.
    #[track_caller]
    pub fn edit_content_type(&self, content_type_id: &str) -> ContentTypeBuilder {
        ContentTypeBuilder::edit(&self.recorder, content_type_id, Props::new(), Location::caller())
    }

    /// Edit a content type and set the given props in key order.
    #[track_caller]
    pub fn edit_content_type_with(
        &self,
        content_type_id: &str,
        props: impl IntoProps,
    ) -> ContentTypeBuilder {
        ContentTypeBuilder::edit(
            &self.recorder,
            content_type_id,
            props.into_props(),
            Location::caller(),
        )
    }

    /// Number of steps recorded so far in this run.
    pub fn recorded_steps(&self) -> usize {
        self.recorder.lock().len()
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("recorded_steps", &self.recorded_steps())
            .finish()
    }
}

/// Runs migration callbacks and produces plans.
#[derive(Debug, Clone, Default)]
pub struct MigrationRunner {
    config: MigrationConfig,
}

impl MigrationRunner {
    /// Create a runner with the given configuration.
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// Get the runner configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Run a synchronous callback and return its plan.
    pub fn plan<F, R>(&self, callback: F) -> Result<MigrationPlan, MigrationError>
    where
        F: FnOnce(&Migration) -> R,
        R: CallbackResult,
    {
        let migration = self.start();
        let outcome = callback(&migration).into_callback_result();
        Self::finish(&migration, outcome)
    }

    /// Run a synchronous callback now and deliver its plan as a future.
    pub fn run<F, R>(&self, callback: F) -> Ready<Result<MigrationPlan, MigrationError>>
    where
        F: FnOnce(&Migration) -> R,
        R: CallbackResult,
    {
        ready(self.plan(callback))
    }

    /// Run an asynchronous callback, awaiting it before finalizing the plan.
    pub async fn run_async<F, Fut>(&self, callback: F) -> Result<MigrationPlan, MigrationError>
    where
        F: FnOnce(Migration) -> Fut,
        Fut: Future,
        Fut::Output: CallbackResult,
    {
        let migration = self.start();
        let outcome = callback(migration.clone()).await.into_callback_result();
        Self::finish(&migration, outcome)
    }

    /// Replay a call script and return its plan.
    ///
    /// Replayed steps carry no origin: the Rust call site of a replay is not
    /// the location of the call in the script.
    pub fn run_script(&self, script: &MigrationScript) -> Result<MigrationPlan, MigrationError> {
        let migration = Self::start_with(false);
        match script.replay(&migration) {
            Ok(()) => Self::finish(&migration, Ok(())),
            Err(e) => {
                migration.recorder.lock().abort();
                warn!(error = %e, "call script replay failed; plan discarded");
                Err(e.into())
            }
        }
    }

    fn start(&self) -> Migration {
        Self::start_with(self.config.capture_origin)
    }

    fn start_with(capture_origin: bool) -> Migration {
        info!(capture_origin, "starting migration run");
        Migration::new(Recorder::shared(capture_origin))
    }

    fn finish(
        migration: &Migration,
        outcome: Result<(), CallbackError>,
    ) -> Result<MigrationPlan, MigrationError> {
        let mut recorder = migration.recorder.lock();
        match outcome {
            Ok(()) => {
                let steps = recorder.finish();
                info!(steps = steps.len(), "migration plan finalized");
                Ok(MigrationPlan::new(steps))
            }
            Err(source) => {
                recorder.abort();
                warn!(error = %source, "migration callback failed; plan discarded");
                Err(MigrationError::Callback { source })
            }
        }
    }
}

/// Run a synchronous migration callback with the default configuration.
///
/// The callback runs before this function returns; the plan is delivered
/// through the returned future.
pub fn migration<F, R>(callback: F) -> Ready<Result<MigrationPlan, MigrationError>>
where
    F: FnOnce(&Migration) -> R,
    R: CallbackResult,
{
    MigrationRunner::default().run(callback)
}

/// Run an asynchronous migration callback with the default configuration.
pub async fn migration_async<F, Fut>(callback: F) -> Result<MigrationPlan, MigrationError>
where
    F: FnOnce(Migration) -> Fut,
    Fut: Future,
    Fut::Output: CallbackResult,
{
    MigrationRunner::default().run_async(callback).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::step::StepKind;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_handles_are_send_and_sync() {
        assert_send_sync::<Migration>();
        assert_send_sync::<ContentTypeBuilder>();
        assert_send_sync::<crate::migration::FieldBuilder>();
    }

    #[test]
    fn test_plan_collects_steps_in_order() {
        let runner = MigrationRunner::new(MigrationConfig::new().with_capture_origin(false));
        let plan = runner
            .plan(|m| {
                let person = m.create_content_type("person");
                person.name("Person");
                m.edit_content_type("address").delete_field("zip");
            })
            .unwrap();

        let kinds: Vec<StepKind> = plan.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::ContentTypeCreate,
                StepKind::ContentTypeUpdate,
                StepKind::FieldDelete,
            ]
        );
        assert!(plan.iter().all(|s| s.origin.is_none()));
    }

    #[test]
    fn test_callback_error_discards_plan() {
        let result = MigrationRunner::default().plan(|m| {
            m.create_content_type("person");
            Err::<(), _>("no good")
        });

        match result {
            Err(MigrationError::Callback { source }) => assert_eq!(source.to_string(), "no good"),
            other => panic!("expected callback error, got {:?}", other),
        }
    }

    #[test]
    fn test_each_run_starts_fresh() {
        let runner = MigrationRunner::default();
        for _ in 0..2 {
            let plan = runner
                .plan(|m| {
                    m.create_content_type("person");
                })
                .unwrap();
            assert_eq!(plan.steps()[0].content_type_instance_id(), "contentType/person/0");
        }
    }

    #[test]
    fn test_origin_points_at_callback() {
        let line = line!() + 3;
        let plan = MigrationRunner::default()
            .plan(|m| {
                m.create_content_type_with("person", [("description", "d")]);
            })
            .unwrap();

        assert_eq!(plan.len(), 2);
        for step in plan.iter() {
            let origin = step.origin.as_ref().unwrap();
            assert_eq!(origin.line, line);
            assert!(origin.file.ends_with("runner.rs"));
        }
    }

    #[test]
    fn test_recorded_steps_counter() {
        MigrationRunner::default()
            .plan(|m| {
                assert_eq!(m.recorded_steps(), 0);
                m.create_content_type("person").description("d");
                assert_eq!(m.recorded_steps(), 2);
            })
            .unwrap();
    }
}
