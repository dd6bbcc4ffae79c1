//! The `pokemon` subcommand: list stored Pokémon with filters.

use anyhow::Result;
use clap::Args;
use pokedex_lib::{ListParams, Pokedex, PokemonQuery};

use crate::output::{print_pokemon, OutputFormat};

#[derive(Args)]
pub struct PokemonArgs {
    /// Case-insensitive name substring
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by type (e.g. fire, water), or "all"
    #[arg(long = "type")]
    pub type_name: Option<String>,

    /// Filter by rarity: legendary, mythical, normal, all
    #[arg(long)]
    pub rarity: Option<String>,

    /// Filter by generation number, or "all"
    #[arg(long)]
    pub generation: Option<String>,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: String,

    /// Results per page
    #[arg(long, default_value = "50")]
    pub limit: String,
}

impl PokemonArgs {
    fn to_params(&self) -> ListParams {
        ListParams {
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            legendary: self.rarity.clone(),
            generation: self.generation.clone(),
            page: Some(self.page.clone()),
            limit: Some(self.limit.clone()),
        }
    }
}

pub async fn run(args: &PokemonArgs, pokedex: &Pokedex, format: &OutputFormat) -> Result<()> {
    let query = PokemonQuery::try_from(&args.to_params())?;
    let list = pokedex.list(&query).await?;

    if let Some(ref message) = list.message {
        eprintln!("{}", message);
    }
    eprintln!(
        "Page {}/{} ({} total Pokémon)",
        list.pagination.page, list.pagination.pages, list.pagination.total
    );

    print_pokemon(&list.records, format)
}
