mod commands;
mod output;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pokedex_lib::{Pokedex, PokedexConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Ingest, query and serve Pokémon data from the PokéAPI")]
struct Cli {
    /// Output format: table, json, csv, markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// SQLite database path (overrides POKEDEX_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve(commands::serve::ServeArgs),
    /// Fetch Pokémon from the PokéAPI into the database
    Seed(commands::seed::SeedArgs),
    /// List stored Pokémon
    Pokemon(commands::pokemon::PokemonArgs),
    /// Show type, rarity and generation counts
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pokedex=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let mut config = PokedexConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args, &config).await?,
        Commands::Seed(args) => {
            let pokedex = Pokedex::from_config(&config)?;
            commands::seed::run(args, &pokedex, &config, &format).await?
        }
        Commands::Pokemon(args) => {
            let pokedex = Pokedex::from_config(&config)?;
            commands::pokemon::run(args, &pokedex, &format).await?
        }
        Commands::Stats => {
            let pokedex = Pokedex::from_config(&config)?;
            commands::stats::run(&pokedex, &format).await?
        }
    }

    Ok(())
}
