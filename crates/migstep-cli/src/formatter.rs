//! Output formatters for migration plans.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use migstep_core::{MigrationPlan, Step, StepKind};

/// How `plan` and `summary` reports are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One row per step
    Table,
    /// The plan's own JSON shape
    Json,
    /// Comma-separated rows, props quoted
    Csv,
}

impl OutputFormat {
    /// Get the formatter that renders reports in this format.
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Same spelling clap accepts for `--format`.
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Err(std::fmt::Error),
        }
    }
}

/// Renders migration plans and their per-kind step counts.
pub trait Formatter: Send + Sync {
    /// Render every step of the plan, in call order.
    fn format_plan(&self, plan: &MigrationPlan) -> String;

    /// Render how many steps of each kind the plan holds.
    fn format_summary(&self, plan: &MigrationPlan) -> String;

    /// Render a failure message.
    fn format_error(&self, error: &str) -> String;
}

const KINDS: [StepKind; 5] = [
    StepKind::ContentTypeCreate,
    StepKind::ContentTypeUpdate,
    StepKind::FieldCreate,
    StepKind::FieldUpdate,
    StepKind::FieldDelete,
];

fn kind_counts(plan: &MigrationPlan) -> Vec<(StepKind, usize)> {
    KINDS
        .iter()
        .map(|kind| (*kind, plan.steps_of_kind(*kind).len()))
        .collect()
}

fn props_text(step: &Step) -> String {
    step.props()
        .map(|props| serde_json::Value::Object(props.clone()).to_string())
        .unwrap_or_default()
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_plan(&self, plan: &MigrationPlan) -> String {
        if plan.is_empty() {
            return "Empty plan".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("#"),
            Cell::new("type"),
            Cell::new("content type instance"),
            Cell::new("field instance"),
            Cell::new("props"),
        ]);

        for (seq, step) in plan.iter().enumerate() {
            table.add_row(vec![
                Cell::new(seq),
                Cell::new(step.kind),
                Cell::new(step.content_type_instance_id()),
                Cell::new(step.field_instance_id().unwrap_or("")),
                Cell::new(props_text(step)),
            ]);
        }

        table.to_string()
    }

    fn format_summary(&self, plan: &MigrationPlan) -> String {
        let mut table = Table::new();
        table.set_header(vec!["type", "steps"]);

        for (kind, count) in kind_counts(plan) {
            table.add_row(vec![Cell::new(kind), Cell::new(count)]);
        }
        table.add_row(vec![Cell::new("total"), Cell::new(plan.len())]);

        table.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_plan(&self, plan: &MigrationPlan) -> String {
        plan.to_json_pretty().unwrap_or_else(|_| "[]".to_string())
    }

    fn format_summary(&self, plan: &MigrationPlan) -> String {
        let mut obj = serde_json::Map::new();
        for (kind, count) in kind_counts(plan) {
            obj.insert(kind.to_string(), serde_json::Value::from(count));
        }
        obj.insert("total".to_string(), serde_json::Value::from(plan.len()));

        serde_json::to_string_pretty(&serde_json::Value::Object(obj))
            .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({
            "error": error
        })
        .to_string()
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_plan(&self, plan: &MigrationPlan) -> String {
        let mut output = String::from("seq,type,content_type_instance,field_instance,props\n");
        for (seq, step) in plan.iter().enumerate() {
            output.push_str(&format!(
                "{},{},{},{},\"{}\"\n",
                seq,
                step.kind,
                step.content_type_instance_id(),
                step.field_instance_id().unwrap_or(""),
                escape_csv(&props_text(step)),
            ));
        }
        output
    }

    fn format_summary(&self, plan: &MigrationPlan) -> String {
        let mut output = String::from("type,steps\n");
        for (kind, count) in kind_counts(plan) {
            output.push_str(&format!("{},{}\n", kind, count));
        }
        output.push_str(&format!("total,{}\n", plan.len()));
        output
    }

    fn format_error(&self, error: &str) -> String {
        format!("error\n\"{}\"", escape_csv(error))
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
