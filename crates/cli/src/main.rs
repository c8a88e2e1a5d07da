use anyhow::Context;
use artifacts_core::{
    ArtifactService, AssemblyConfig, ClinicalData, CodeTables, TermCategory,
};
use artifacts_uuid::{SequentialIdProvider, SystemClock};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "artifacts")]
#[command(about = "OP consultation document generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a document bundle from clinical input
    Generate {
        /// Clinical input file (.json, .yaml or .yml)
        input: PathBuf,
        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
        /// Output file (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Use sequential identifiers with this prefix for reproducible output
        #[arg(long)]
        sequential_ids: Option<String>,
    },
    /// Decode a bundle and check its internal consistency
    Validate {
        /// Bundle JSON file
        bundle: PathBuf,
    },
    /// Look up the terminology code for an item name
    Lookup {
        /// Item name, e.g. "Hypertension"
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("artifacts_core=error".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate {
            input,
            compact,
            output,
            sequential_ids,
        }) => {
            let data = load_input(&input)?;
            let cfg = Arc::new(
                AssemblyConfig::from_env_values(
                    std::env::var("ARTIFACTS_LANGUAGE").ok(),
                    std::env::var("ARTIFACTS_IDENTIFIER_SYSTEM").ok(),
                    None,
                )?
                .with_pretty(!compact),
            );
            let service = match sequential_ids {
                Some(prefix) => ArtifactService::with_collaborators(
                    cfg,
                    Arc::new(SequentialIdProvider::new(&prefix)?),
                    Arc::new(SystemClock),
                ),
                None => ArtifactService::new(cfg),
            };

            let generated = service.generate(&data)?;
            for warning in &generated.warnings {
                eprintln!("warning: {}", warning);
            }
            match output {
                Some(path) => {
                    std::fs::write(&path, &generated.text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote document to {}", path.display());
                }
                None => println!("{}", generated.text),
            }
        }
        Some(Commands::Validate { bundle }) => {
            let text = std::fs::read_to_string(&bundle)
                .with_context(|| format!("failed to read {}", bundle.display()))?;
            match ArtifactService::validate_document(&text) {
                Ok(doc) => {
                    let sections = doc.composition().map(|c| c.section.len()).unwrap_or(0);
                    println!(
                        "Valid document {}: {} entries, {} sections",
                        doc.id,
                        doc.entry.len(),
                        sections
                    );
                }
                Err(e) => anyhow::bail!("Invalid document: {}", e),
            }
        }
        Some(Commands::Lookup { name }) => {
            println!("{}", describe_lookup(&CodeTables::standard(), &name));
        }
        None => {
            println!("Use 'artifacts --help' for commands");
        }
    }

    Ok(())
}

/// Reads clinical input, choosing YAML or JSON by file extension.
///
/// Schema mismatches report the failing path, e.g. `coMorbidities[0].name`.
fn load_input(path: &Path) -> anyhow::Result<ClinicalData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed = if is_yaml {
        serde_path_to_error::deserialize(serde_yaml::Deserializer::from_str(&text))
            .map_err(|e| anyhow::anyhow!("input schema mismatch at {}: {}", e.path(), e.inner()))
    } else {
        let mut de = serde_json::Deserializer::from_str(&text);
        serde_path_to_error::deserialize(&mut de)
            .map_err(|e| anyhow::anyhow!("input schema mismatch at {}: {}", e.path(), e.inner()))
    };

    parsed.with_context(|| format!("failed to parse {}", path.display()))
}

fn describe_lookup(tables: &CodeTables, name: &str) -> String {
    match tables.lookup(name) {
        Some((category, term)) => {
            let coding = term.primary();
            format!(
                "{} ({}): {} {} \"{}\"",
                name.trim(),
                category.as_str(),
                coding.map(|c| c.system.as_str()).unwrap_or_default(),
                coding.map(|c| c.code.as_str()).unwrap_or_default(),
                term.label().unwrap_or_default()
            )
        }
        None => format!("{}: unresolved", name.trim()),
    }
}
