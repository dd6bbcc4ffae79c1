//! The `stats` subcommand: dashboard aggregations and seed bookkeeping.

use anyhow::Result;
use chrono::{DateTime, Local};
use pokedex_lib::Pokedex;

use crate::output::{print_stats, OutputFormat};

pub async fn run(pokedex: &Pokedex, format: &OutputFormat) -> Result<()> {
    let info = pokedex.seed_info().await?;
    match info.last_seeded_at.as_deref().map(DateTime::parse_from_rfc3339) {
        Some(Ok(at)) => eprintln!(
            "{} Pokémon stored, last seeded {} ({})",
            info.stored,
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            info.last_seed_mode.as_deref().unwrap_or("unknown")
        ),
        _ => eprintln!("{} Pokémon stored, never seeded", info.stored),
    }

    let stats = pokedex.stats().await?;
    print_stats(&stats, format)
}
