// std
use std::{collections::HashMap, path::PathBuf};
// crates.io
use clap::{
    builder::{
        styling::{AnsiColor, Effects},
        Styles,
    },
    Parser, Subcommand,
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;
// self
use citesim::config::{self, ConfigurationSet};
use citesim::experiment::{load_queries, Experiment, ExperimentError};
use citesim::features::MinMaxScaler;
use citesim::retrieval::read_corpus;
use citesim::types::CandidateId;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab", styles = styles())]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the next batch, resuming from the existing result logs.
    Run {
        #[arg(long, short = 'c', value_name = "FILE")]
        config: PathBuf,
    },
    /// Simulate one query across every configuration without persisting.
    Query {
        #[arg(long, short = 'c', value_name = "FILE")]
        config: PathBuf,
        #[arg(long, value_name = "N")]
        index: usize,
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
    /// Write the full configuration grid. Refuses to overwrite.
    GenerateSettings {
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,
    },
    /// Fit the corpus-wide scaler offline.
    FitScaler {
        #[arg(long, value_name = "FILE")]
        corpus: PathBuf,
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,
    },
    /// Map a global snapshot onto citation counts.
    Citations {
        #[arg(long, value_name = "FILE")]
        snapshot: PathBuf,
        #[arg(long, value_name = "FILE")]
        corpus: PathBuf,
        #[arg(long, short = 'o', value_name = "FILE")]
        output: PathBuf,
    },
}

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Red.on_default() | Effects::BOLD)
        .usage(AnsiColor::Red.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    match args.command {
        Command::Run { config } => {
            let cfg = config::load(&config)?;
            init_tracing(&cfg.log_level);

            let experiment = Experiment::open(&cfg)?;
            let queries = load_queries(&cfg.paths.queries)?;
            let summary = experiment.run_batch(&queries)?;
            tracing::info!(
                "Processed {} queries in range {}..{}",
                summary.queries_processed,
                summary.range.start,
                summary.range.end
            );
        }
        Command::Query { config, index, seed } => {
            let cfg = config::load(&config)?;
            init_tracing(&cfg.log_level);

            let experiment = Experiment::open(&cfg)?;
            let queries = load_queries(&cfg.paths.queries)?;
            let query = queries
                .get(index)
                .ok_or(ExperimentError::QueryOutOfRange { index, len: queries.len() })?;
            let seed = seed.unwrap_or(cfg.run.base_seed);
            let results = experiment.run_single_query(&query.embedding, index as u64, seed)?;

            let by_config: Vec<_> = experiment
                .configurations()
                .iter()
                .zip(&results)
                .map(|(settings, distribution)| {
                    serde_json::json!({ "settings": settings, "distribution": distribution })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&by_config)?);
        }
        Command::GenerateSettings { output } => {
            init_tracing("info");
            tracing::info!("Generating experiment configurations");
            let set = ConfigurationSet::grid();
            set.save_new(&output)?;
            let version = set.version()?;
            tracing::info!(
                version = version.as_str(),
                "Generated {} configurations at {:?}",
                set.len(),
                output
            );
        }
        Command::FitScaler { corpus, output } => {
            init_tracing("info");
            let records = read_corpus(&corpus)?;
            let features: Vec<_> = records.iter().map(|r| r.features()).collect();
            let scaler = MinMaxScaler::fit(features.iter())?;
            scaler.save(&output)?;
            tracing::info!(n_samples = scaler.n_samples, "Global scaler saved to {:?}", output);
        }
        Command::Citations { snapshot, corpus, output } => {
            init_tracing("info");
            let records = read_corpus(&corpus)?;
            let lookup: HashMap<CandidateId, u64> =
                records.into_iter().map(|r| (r.id, r.citation_count)).collect();
            let rows = citesim::citations::transform(&snapshot, &lookup, &output)?;
            if rows == 0 {
                eyre::bail!("snapshot {snapshot:?} contains no rows");
            }
        }
    }

    Ok(())
}
