//! Catalog transform CLI entry point.
//!
//! Reads a catalog as JSON, applies the configured rewrite rules, and writes
//! the enriched catalog back out as JSON.

use anyhow::{Context, Result};
use catalog_transform::{Catalog, CatalogEnricher, CatalogHandler, TransformSettings};
use clap::Parser;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "catalog-transform")]
#[command(
    author,
    version,
    about = "Derive resource identifiers and properties from catalog metadata"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "CATALOG_TRANSFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog file to enrich (JSON). Reads stdin when absent or "-".
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write the enriched catalog here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,
}

fn print_example_config() {
    let example = r#"# Catalog Transform Configuration Example
version: "1"

# Property rules run first, in order. Each reads the string at sourcePath,
# and when sourcePattern matches, writes the rewritten value.
propertyTransforms:
  # "v_horz_100m_blue_avg in m/s" -> unit: "m/s"
  - sourcePath: "original-name"
    sourcePattern: '^.*in\s(.*)'
    targetProperty: "unit"

  # Without targetProperty the result becomes the resource identifier.
  - sourcePath: "original-name"
    sourcePattern: '(.*)\sin .*'

  # Split into an array; only fill groups that are not already set.
  - operation: SetIfNotExists
    sourcePath: "original-name"
    sourcePattern: '.*?([0-9]+m)_(.*)_(.*)\sin .*'
    targetProperty: "groups"
    targetTemplate: "$2 ($1);$2 ($3)"
    separator: ";"

  # ${path} variables resolve against the properties before any rule ran.
  - sourcePath: "original-name"
    sourcePattern: '^(\w+?)_.*'
    targetProperty: "description"
    targetTemplate: "$1 (${sensor/location})"

# Identifier rules run last and chain their output left to right.
idTransforms:
  - sourcePattern: '(.*)_very_long_name(.*)'
    targetTemplate: "$1_VLN$2"
"#;
    println!("{}", example);
}

fn load_settings(path: &Path) -> Result<TransformSettings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let settings = if path
        .extension()
        .is_some_and(|e| e == "yaml" || e == "yml")
    {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(settings)
}

fn read_catalog(path: Option<&Path>) -> Result<Catalog> {
    let content = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read catalog file: {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read catalog from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid catalog JSON")
}

fn write_catalog(catalog: &Catalog, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    match path {
        Some(p) => std::fs::write(p, json + "\n")
            .with_context(|| format!("Failed to write output file: {}", p.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries the catalog)
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Print example config if requested
    if args.example_config {
        print_example_config();
        return Ok(());
    }

    // Load configuration
    let settings = match &args.config {
        Some(path) => load_settings(path)?,
        None => TransformSettings::default(),
    };

    if settings.is_empty() {
        warn!("No transform rules configured, catalog will pass through unchanged");
    }

    let enricher = CatalogEnricher::new(settings)?;

    // Validate only if requested
    if args.validate {
        info!(
            version = %enricher.settings().version,
            rules = enricher.chain().len(),
            paths = enricher.chain().paths().len(),
            "Configuration is valid"
        );
        return Ok(());
    }

    let catalog = read_catalog(args.catalog.as_deref())?;
    info!(
        config = ?args.config,
        catalog = %catalog.id,
        resources = catalog.resources().len(),
        "Enriching catalog"
    );

    let enriched = enricher.enrich_catalog(catalog).await?;
    write_catalog(&enriched, args.output.as_deref())?;

    let stats = enricher.stats();
    info!(
        resources = stats.resources_total,
        renamed = stats.resources_renamed,
        rules_applied = stats.rules_applied,
        "Done"
    );

    Ok(())
}
