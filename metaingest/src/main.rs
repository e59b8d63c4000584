//! # metaingest command line
//!
//! ```bash
//! metaingest glossary business_glossary.yml --enable-auto-id
//! metaingest resolve recipe.yml
//! metaingest env-vars recipe.yml
//! metaingest usage events.yml --config usage.toml
//! metaingest schema glossary
//! ```
//!
//! Work units are written to stdout as JSON lines; logs and the run summary
//! go to stderr. Set `RUST_LOG=debug` for detailed logs.

use std::io::{self, BufWriter, Write as _};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize as _;
use confres::{HttpFetch, LoadOptions, ProbeEnv, load_config_file, load_config_file_with};
use metaingest::{
    WorkUnit,
    ctx::IngestContext,
    glossary::{BusinessGlossaryConfig, BusinessGlossarySource, BusinessGlossarySourceConfig},
    usage::{BaseUsageConfig, CollapseWhitespace, UsageEventsFile},
};

#[derive(Parser)]
#[command(name = "metaingest", version, about = "Metadata ingestion from glossary and usage files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a business glossary file into work units
    Glossary {
        /// Glossary file path or URL, `-` for stdin with --allow-stdin
        file: String,

        /// Hash every derived id instead of using the dotted path
        #[arg(long)]
        enable_auto_id: bool,

        /// Read YAML from stdin when the file is `-`
        #[arg(long)]
        allow_stdin: bool,
    },
    /// Print a config file with environment variables resolved
    Resolve {
        file: String,

        #[arg(long)]
        allow_stdin: bool,
    },
    /// List the environment variables a config file references
    EnvVars { file: String },
    /// Aggregate a read-events file into usage work units
    Usage {
        /// Events file path or URL
        events: String,

        /// Usage config overriding the one embedded in the events file
        #[arg(long)]
        config: Option<String>,
    },
    /// Print the JSON schema of an input format
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaKind {
    Glossary,
    GlossarySource,
    Usage,
    UsageEvents,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Glossary {
            file,
            enable_auto_id,
            allow_stdin,
        } => {
            let ctx = IngestContext::default();
            let mut source = BusinessGlossarySource::new(BusinessGlossarySourceConfig {
                file: file.clone(),
                enable_auto_id,
            })
            .with_load_options(LoadOptions {
                allow_stdin,
                ..Default::default()
            });
            let units = source
                .workunits(&ctx)
                .with_context(|| format!("failed to ingest glossary {file}"))?;
            write_units(&units)?;

            let report = source.report();
            summary(&ctx.run_id, report.workunits_produced, report.warnings.len());
        }
        Commands::Resolve { file, allow_stdin } => {
            let options = LoadOptions {
                allow_stdin,
                ..Default::default()
            };
            let value = load_config_file(&file, &options)
                .with_context(|| format!("failed to load {file}"))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::EnvVars { file } => {
            let probe = ProbeEnv::new();
            load_config_file_with(&file, &LoadOptions::default(), &HttpFetch, &probe)
                .with_context(|| format!("failed to load {file}"))?;
            for name in probe.into_names() {
                println!("{name}");
            }
        }
        Commands::Usage { events, config } => {
            let ctx = IngestContext::default();
            let value = load_config_file(&events, &LoadOptions::default())
                .with_context(|| format!("failed to load {events}"))?;
            let mut events_file = UsageEventsFile::from_value(value)?;

            if let Some(config) = config {
                let value = load_config_file(&config, &LoadOptions::default())
                    .with_context(|| format!("failed to load {config}"))?;
                events_file.config = BaseUsageConfig::from_value(value)?;
            }

            let units = events_file.workunits(&ctx, &CollapseWhitespace)?;
            write_units(&units)?;
            summary(&ctx.run_id, units.len(), 0);
        }
        Commands::Schema { kind } => {
            let schema = match kind {
                SchemaKind::Glossary => schemars::schema_for!(BusinessGlossaryConfig),
                SchemaKind::GlossarySource => schemars::schema_for!(BusinessGlossarySourceConfig),
                SchemaKind::Usage => schemars::schema_for!(BaseUsageConfig),
                SchemaKind::UsageEvents => schemars::schema_for!(UsageEventsFile),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn write_units(units: &[WorkUnit]) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    for unit in units {
        serde_json::to_writer(&mut out, unit)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn summary(run_id: &str, produced: usize, warnings: usize) {
    let line = format!("{run_id}: {produced} work units, {warnings} warnings");
    if warnings > 0 {
        eprintln!("{}", line.yellow());
    } else {
        eprintln!("{}", line.green());
    }
}
