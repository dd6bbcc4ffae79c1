//! The `serve` subcommand: run the HTTP API.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use pokedex_lib::{Pokedex, PokedexConfig};

use crate::server;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides POKEDEX_BIND)
    #[arg(long)]
    pub bind: Option<String>,
}

pub async fn run(args: &ServeArgs, config: &PokedexConfig) -> Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&config.bind);
    let app = Arc::new(Pokedex::from_config(config)?);
    server::serve(app, bind).await
}
