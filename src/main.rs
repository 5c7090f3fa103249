//! vibeexpr - inspect and evaluate serialized expressions

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vibeexpr::complex;
use vibeexpr::engine::{
    Coordinator, EngineRegistry, ReferenceEngine, ERROR_WHEN_EVALUATING_EXPRESSION,
    REFERENCE_ENGINE,
};
use vibeexpr::expression::{Expression, Symbol};
use vibeexpr::serialization::SerializedExpression;

/// vibeexpr - A symbolic expression toolkit
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a serialized expression and print it
    Inspect {
        /// Serialized expression file
        file: PathBuf,

        /// Map bulk span payloads instead of copying them
        #[arg(long)]
        lazy: bool,
    },

    /// Evaluate a serialized expression through an engine pipeline
    Eval {
        /// Serialized expression file
        file: PathBuf,

        /// Pipeline stage, repeatable (defaults to the reference engine)
        #[arg(short, long = "engine")]
        engines: Vec<String>,

        /// Write the serialized result here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a sample query plan
    Demo {
        /// Destination file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Inspect { file, lazy } => inspect(&file, lazy),
        Command::Eval {
            file,
            engines,
            output,
        } => eval(&file, engines, output.as_deref()),
        Command::Demo { file } => demo(&file),
    }
}

fn read(file: &Path) -> Result<SerializedExpression> {
    SerializedExpression::read_from(file)
        .with_context(|| format!("Failed to read serialized expression from {}", file.display()))
}

fn inspect(file: &Path, lazy: bool) -> Result<()> {
    let serialized = read(file)?;
    let header = serialized.header()?;
    info!(
        "{}: format v{}, {} body bytes",
        file.display(),
        header.version,
        header.body_len
    );
    let expr = if lazy {
        serialized.lazily_deserialize()
    } else {
        serialized.deserialize()
    }
    .context("Failed to decode expression")?;
    println!("{}", expr);
    Ok(())
}

fn eval(file: &Path, engines: Vec<String>, output: Option<&Path>) -> Result<()> {
    let expr = read(file)?
        .deserialize()
        .context("Failed to decode expression")?;

    let registry = EngineRegistry::new();
    registry.register(REFERENCE_ENGINE, Arc::new(ReferenceEngine::new()));
    let mut coordinator = Coordinator::new(registry);
    if engines.is_empty() {
        coordinator.set_pipeline([REFERENCE_ENGINE]);
    } else {
        coordinator.set_pipeline(engines);
    }

    let result = coordinator.evaluate(expr);
    if result.has_head(ERROR_WHEN_EVALUATING_EXPRESSION) {
        warn!("evaluation failed");
        println!("{}", result);
        bail!("Failed to evaluate {}", file.display());
    }

    match output {
        Some(path) => {
            SerializedExpression::new(result)?
                .write_to(path)
                .with_context(|| format!("Failed to write result to {}", path.display()))?;
            info!("result written to {}", path.display());
        }
        None => println!("{}", result),
    }
    Ok(())
}

/// Customers born after 1930, youngest first.
fn sample_plan() -> Expression {
    let customers = complex!(
        "Table",
        complex!("ID", complex!("List", 1, 2, 3)),
        complex!("FirstName", complex!("List", "John", "Sam", "Barbara")),
        complex!("LastName", complex!("List", "McCarthy", "Madden", "Liskov")),
        complex!("BirthYear", complex!("List", 1927, 1976, 1939))
    );
    let birth_year = Expression::from(Symbol::new("BirthYear"));
    complex!(
        "Top",
        complex!(
            "Select",
            customers,
            complex!("Where", complex!("Greater", birth_year, 1930))
        ),
        complex!("By", Symbol::new("BirthYear"), Symbol::new("desc")),
        2
    )
    .into()
}

fn demo(file: &Path) -> Result<()> {
    let plan = sample_plan();
    println!("{}", plan);
    let serialized = SerializedExpression::new(plan)?;
    serialized
        .write_to(file)
        .with_context(|| format!("Failed to write sample plan to {}", file.display()))?;
    println!("wrote {} bytes to {}", serialized.len(), file.display());
    Ok(())
}
