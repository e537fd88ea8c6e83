//! Changeset Cast CLI
//!
//! Casts a params document against a schema file, runs optional validation
//! rules and prints the outcome as JSON.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use familiar_changeset::{Changeset, ChangesetConfig, KeyCase, Record, RuleSet, Schema};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "changeset-cast")]
#[command(about = "Cast and validate params against a schema")]
struct Cli {
    /// Schema file (JSON or TOML)
    #[arg(short, long)]
    schema: PathBuf,

    /// Params document (JSON object), or "-" for stdin
    #[arg(short, long)]
    params: String,

    /// Baseline record (JSON object); empty when omitted
    #[arg(short, long)]
    baseline: Option<PathBuf>,

    /// Permitted fields, comma separated
    #[arg(long, value_delimiter = ',')]
    permit: Vec<String>,

    /// Validation rule file (JSON or TOML)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Keep surrounding whitespace in strings
    #[arg(long)]
    no_trim: bool,

    /// Projection to include in the report
    #[arg(long, value_enum, default_value = "persistence")]
    projection: ProjectionKind,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectionKind {
    /// No projection
    None,
    /// Keys as configured (`projection.key_case`)
    Persistence,
    /// Snake-case keys regardless of config
    Snake,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the changeset is valid
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ChangesetConfig::load_from(cli.config.as_deref()).context("loading config")?;

    let schema = Schema::from_path(&cli.schema)
        .with_context(|| format!("loading schema {}", cli.schema.display()))?;

    let params = read_record(&cli.params).context("reading params")?;
    let baseline = match &cli.baseline {
        Some(path) => read_record(&path.to_string_lossy())
            .with_context(|| format!("reading baseline {}", path.display()))?,
        None => Record::new(),
    };

    let mut options = config.cast_options();
    if cli.no_trim {
        options.trim_strings = false;
    }

    let mut changeset = Changeset::new(baseline, schema)
        .cast_with(&params, cli.permit.as_slice(), options)?;

    if let Some(path) = &cli.rules {
        let rules = RuleSet::from_path(path)
            .with_context(|| format!("loading rules {}", path.display()))?;
        changeset = changeset.apply_rules(&rules)?;
    }

    let policy = config.relation_policy();
    let params = match cli.projection {
        ProjectionKind::None => None,
        ProjectionKind::Persistence => Some(changeset.project(&policy, config.key_case())),
        ProjectionKind::Snake => Some(changeset.project(&policy, KeyCase::Snake)),
    };

    let mut report = json!({
        "valid": changeset.is_valid(),
        "changes": changeset.changes(),
        "errors": changeset.transform_errors(),
        "record": changeset.apply_changes(),
    });
    if let (Some(params), Value::Object(map)) = (params, &mut report) {
        map.insert("params".to_string(), Value::Object(params));
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(changeset.is_valid())
}

fn read_record(source: &str) -> anyhow::Result<Record> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(source))?
    };

    match serde_json::from_str::<Value>(&content)? {
        Value::Object(record) => Ok(record),
        other => bail!("expected a JSON object, got {}", other),
    }
}
