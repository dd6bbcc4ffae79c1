//! The `seed` subcommand: ingest Pokémon from the PokéAPI into SQLite.

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pokedex_lib::ingest::MAX_POKEMON_ID;
use pokedex_lib::pokeapi::Client;
use pokedex_lib::{validation, IngestMode, Pokedex, PokedexConfig, SeedOutcome};

use crate::output::{print_seed_outcome, OutputFormat};

#[derive(Args)]
pub struct SeedArgs {
    /// Number of Pokémon to fetch (capped at 1010)
    #[arg(long)]
    pub limit: Option<String>,

    /// Continue after the highest stored id instead of creating from scratch
    #[arg(long, conflicts_with = "replace")]
    pub append: bool,

    /// Clear the collection and fetch again even if data exists
    #[arg(long)]
    pub replace: bool,
}

impl SeedArgs {
    fn mode(&self) -> IngestMode {
        if self.append {
            IngestMode::Append
        } else if self.replace {
            IngestMode::Replace
        } else {
            IngestMode::Create
        }
    }
}

async fn upstream_species(config: &PokedexConfig) -> u32 {
    let client = match config.pokeapi_base_url {
        Some(ref url) => Client::with_base_url(url),
        None => Client::new(),
    };
    let count = match client {
        Ok(client) => client.species_count().await,
        Err(e) => Err(e),
    };
    match count {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("Could not read species count: {}", e);
            MAX_POKEMON_ID
        }
    }
}

pub async fn run(
    args: &SeedArgs,
    pokedex: &Pokedex,
    config: &PokedexConfig,
    format: &OutputFormat,
) -> Result<()> {
    let limit = match args.limit {
        Some(ref raw) => validation::validate_seed_limit(raw)?,
        None => pokedex.settings().default_limit,
    };
    let mode = args.mode();

    let available = upstream_species(config).await;
    eprintln!(
        "PokéAPI lists {} species; seeding up to {} ({} mode)",
        available, limit, mode
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} batches {msg}",
        )?,
    );
    let mut fetched = 0;
    let mut failed = 0;
    let outcome = pokedex
        .seed(mode, limit, |batch| {
            pb.set_length(batch.total_batches as u64);
            fetched += batch.fetched;
            failed += batch.failed;
            pb.set_message(format!(
                "ids {} | {} ok, {} err",
                batch.range, fetched, failed
            ));
            pb.inc(1);
        })
        .await?;
    pb.finish_and_clear();

    if let SeedOutcome::AlreadyPopulated { .. } = outcome {
        eprintln!("Use --append to add new entries or --replace to start over");
    }
    print_seed_outcome(&outcome, format)
}
