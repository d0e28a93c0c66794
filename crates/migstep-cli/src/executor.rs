//! Call-script planning.

use crate::formatter::Formatter;
use migstep_core::{MigrationError, MigrationPlan, MigrationRunner, MigrationScript, ScriptError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The script could not be loaded.
    #[error("{0}")]
    Script(#[from] ScriptError),

    /// The script could not be planned.
    #[error("{0}")]
    Migration(#[from] MigrationError),

    /// The output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// What to print for a planned script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Every step.
    Plan,
    /// Step counts per kind.
    Summary,
}

/// Load a script, plan it and return its plan.
pub fn plan_script(runner: &MigrationRunner, path: &Path) -> Result<MigrationPlan, ExecuteError> {
    let script = MigrationScript::load(path)?;
    info!(path = %path.display(), calls = script.len(), "loaded call script");

    let plan = runner.run_script(&script)?;
    Ok(plan)
}

/// Load and plan a script, returning formatted output.
pub fn execute(
    runner: &MigrationRunner,
    path: &Path,
    report: Report,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let plan = plan_script(runner, path)?;

    Ok(match report {
        Report::Plan => formatter.format_plan(&plan),
        Report::Summary => formatter.format_summary(&plan),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::JsonFormatter;

    fn write_script(dir: &tempfile::TempDir, text: &str) -> std::path::PathBuf {
        let path = dir.path().join("script.json");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_execute_plan() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(
            &dir,
            r#"[{"op": "editContentType", "id": "person", "as": "p"},
                {"op": "deleteField", "on": "p", "id": "age"}]"#,
        );

        let output = execute(&MigrationRunner::default(), &path, Report::Plan, &JsonFormatter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "type": "field/delete",
                "meta": {
                    "contentTypeInstanceId": "contentType/person/0",
                    "fieldInstanceId": "fields/age/0"
                },
                "payload": { "contentTypeId": "person", "fieldId": "age" }
            }])
        );
    }

    #[test]
    fn test_execute_reports_replay_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, r#"[{"op": "set", "on": "nope", "key": "name", "value": 1}]"#);

        let err = execute(&MigrationRunner::default(), &path, Report::Summary, &JsonFormatter)
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Migration(MigrationError::Script(_))));
        assert!(err.to_string().contains("unknown handle 'nope'"));
    }

    #[test]
    fn test_execute_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            &MigrationRunner::default(),
            &dir.path().join("missing.json"),
            Report::Plan,
            &JsonFormatter,
        )
        .unwrap_err();
        assert!(matches!(err, ExecuteError::Script(ScriptError::Io { .. })));
    }
}
