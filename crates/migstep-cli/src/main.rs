//! migstep command-line planner
//!
//! Replays a JSON call script through the migration builders and prints the
//! resulting step plan.

mod executor;
mod formatter;

use clap::{Parser, Subcommand};
use executor::Report;
use formatter::OutputFormat;
use migstep_core::{MigrationConfig, MigrationRunner};
use std::path::PathBuf;

/// migstep command-line planner
#[derive(Parser, Debug)]
#[command(name = "migstep")]
#[command(version, about = "Compile migration call scripts into step plans")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, global = true, default_value = "json", value_enum)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every step of the plan
    Plan {
        /// Call script (JSON array of builder calls)
        script: PathBuf,
    },
    /// Print step counts per step type
    Summary {
        /// Call script (JSON array of builder calls)
        script: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive("migstep_cli=info"))
                .add_directive(directive("migstep_core=warn")),
        )
        .init();

    let args = Args::parse();
    let formatter = args.format.formatter();

    if let Err(e) = run(&args, &*formatter) {
        eprintln!("{}", formatter.format_error(&e.to_string()));
        std::process::exit(1);
    }
}

fn directive(text: &str) -> tracing_subscriber::filter::Directive {
    text.parse()
        .unwrap_or_else(|_| tracing_subscriber::filter::LevelFilter::INFO.into())
}

fn run(args: &Args, formatter: &dyn formatter::Formatter) -> Result<(), executor::ExecuteError> {
    let runner = MigrationRunner::new(MigrationConfig::default());

    let (script, report) = match &args.command {
        Command::Plan { script } => (script, Report::Plan),
        Command::Summary { script } => (script, Report::Summary),
    };

    let output = executor::execute(&runner, script, report, formatter)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", output))?;
            tracing::info!(path = %path.display(), "plan written");
        }
        None => println!("{}", output),
    }

    Ok(())
}
