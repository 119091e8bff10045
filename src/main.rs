//! Herd Select - Entry Point
//!
//! Loads group definitions and a population, validates the configuration,
//! then runs every enabled group and prints the selected ids.

use std::path::PathBuf;

use clap::Parser;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use herd_select::core::error::Result;
use herd_select::core::types::{EntityId, EntityKind};
use herd_select::entity::parameter::Filterable;
use herd_select::grouping::{GroupCatalog, Population, SelectionSet};

/// Run configured selection groups over a population
#[derive(Parser, Debug)]
#[command(name = "herd-select")]
#[command(about = "Filter, sort and window herd individuals with TOML-defined groups")]
struct Args {
    /// Group definitions (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Population to select from (JSON with ruminants, labour and cohorts)
    #[arg(long)]
    population: Option<PathBuf>,

    /// Seed override for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after validation
    #[arg(long)]
    validate_only: bool,

    /// Log filter directive, overrides the configured default
    #[arg(long)]
    log: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

/// One group's selection, as printed
#[derive(Serialize)]
struct GroupResult {
    group: String,
    kind: EntityKind,
    ids: Vec<EntityId>,
}

fn run_catalog<T: Filterable>(
    kind: EntityKind,
    catalog: &GroupCatalog<T>,
    individuals: &[T],
    rng: &mut ChaCha8Rng,
    results: &mut Vec<GroupResult>,
) -> Result<()> {
    for (group, selected) in catalog.select_all(individuals, rng)? {
        tracing::info!(%group, %kind, selected = selected.len(), "group evaluated");
        results.push(GroupResult {
            group,
            kind,
            ids: selected.iter().map(|i| i.id()).collect(),
        });
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut set = SelectionSet::load(&args.config)?;

    let directive = args
        .log
        .clone()
        .unwrap_or_else(|| set.engine.log_filter.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(seed) = args.seed {
        set.engine.seed = seed;
    }

    tracing::info!(config = %args.config.display(), seed = set.engine.seed, "Herd Select starting...");

    if let Err(err) = set.prepare() {
        eprintln!("{}", err);
        return Err(err);
    }
    println!("Configuration is valid");

    if args.validate_only {
        return Ok(());
    }

    let population = match &args.population {
        Some(path) => Population::load(path)?,
        None => {
            tracing::warn!("no population supplied, nothing to select");
            Population::default()
        }
    };

    let mut rng = set.engine.rng();
    let mut results = Vec::new();
    run_catalog(EntityKind::Ruminant, &set.ruminants, &population.ruminants, &mut rng, &mut results)?;
    run_catalog(EntityKind::Labour, &set.labour, &population.labour, &mut rng, &mut results)?;
    run_catalog(EntityKind::Cohort, &set.cohorts, &population.cohorts, &mut rng, &mut results)?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            let ids: Vec<String> = result.ids.iter().map(|id| id.to_string()).collect();
            println!("{} ({}): [{}]", result.group, result.kind, ids.join(", "));
        }
    }

    Ok(())
}
