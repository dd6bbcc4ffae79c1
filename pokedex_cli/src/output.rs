use anyhow::Result;
use pokedex_lib::{DashboardStats, PokemonRecord, SeedOutcome};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct PokemonRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    id: u32,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Types")]
    #[serde(rename = "Types")]
    types: String,
    #[tabled(rename = "Gen")]
    #[serde(rename = "Gen")]
    generation: u32,
    #[tabled(rename = "Rarity")]
    #[serde(rename = "Rarity")]
    rarity: String,
    #[tabled(rename = "HP")]
    #[serde(rename = "HP")]
    hp: u32,
    #[tabled(rename = "Atk")]
    #[serde(rename = "Atk")]
    attack: u32,
    #[tabled(rename = "Def")]
    #[serde(rename = "Def")]
    defense: u32,
    #[tabled(rename = "SpA")]
    #[serde(rename = "SpA")]
    special_attack: u32,
    #[tabled(rename = "SpD")]
    #[serde(rename = "SpD")]
    special_defense: u32,
    #[tabled(rename = "Spe")]
    #[serde(rename = "Spe")]
    speed: u32,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: u32,
}

#[derive(Tabled, Serialize)]
struct CountRow {
    #[tabled(rename = "Group")]
    #[serde(rename = "Group")]
    group: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    #[serde(rename = "Count")]
    count: i64,
}

#[derive(Tabled, Serialize)]
struct SeedRow {
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

// -- Row builders --

fn build_pokemon_rows(records: &[PokemonRecord]) -> Vec<PokemonRow> {
    records
        .iter()
        .map(|r| PokemonRow {
            id: r.id,
            name: r.name.clone(),
            types: r.types.join("/"),
            generation: r.generation,
            rarity: r.rarity().to_string(),
            hp: r.stats.hp,
            attack: r.stats.attack,
            defense: r.stats.defense,
            special_attack: r.stats.special_attack,
            special_defense: r.stats.special_defense,
            speed: r.stats.speed,
            total: r.stats.total(),
        })
        .collect()
}

fn build_stats_rows(stats: &DashboardStats) -> Vec<CountRow> {
    let mut rows: Vec<CountRow> = stats
        .type_counts
        .iter()
        .map(|t| CountRow {
            group: "type".to_string(),
            value: t.type_name.clone(),
            count: t.count,
        })
        .collect();

    let r = &stats.rarity_counts;
    for (label, count) in [
        ("legendary", r.legendary),
        ("mythical", r.mythical),
        ("normal", r.normal),
        ("total", r.total),
    ] {
        rows.push(CountRow {
            group: "rarity".to_string(),
            value: label.to_string(),
            count,
        });
    }

    rows.extend(stats.generation_counts.iter().map(|g| CountRow {
        group: "generation".to_string(),
        value: g.generation.to_string(),
        count: g.count,
    }));
    rows
}

fn build_seed_rows(outcome: &SeedOutcome) -> Vec<SeedRow> {
    let row = |field: &str, value: String| SeedRow {
        field: field.to_string(),
        value,
    };
    let mut rows = vec![row("Message", outcome.message())];
    match outcome {
        SeedOutcome::AlreadyPopulated { existing_count } => {
            rows.push(row("Existing", existing_count.to_string()));
        }
        SeedOutcome::NothingFetched {
            existing_count,
            stats,
            ..
        } => {
            rows.push(row("Existing", existing_count.to_string()));
            rows.push(row("Failed", stats.failed.to_string()));
        }
        SeedOutcome::Inserted {
            mode,
            count,
            total_count,
            stats,
        } => {
            rows.push(row("Action", mode.action().to_string()));
            rows.push(row("Inserted", count.to_string()));
            rows.push(row("Total stored", total_count.to_string()));
            rows.push(row("Batches", stats.batches.to_string()));
            rows.push(row("Skipped (stored)", stats.skipped_existing.to_string()));
            rows.push(row("Failed", stats.failed.to_string()));
        }
    }
    rows
}

// -- Generic printers --

fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

pub fn print_pokemon(records: &[PokemonRecord], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&records);
            Ok(())
        }
        _ => print_rows(build_pokemon_rows(records), format),
    }
}

pub fn print_stats(stats: &DashboardStats, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(stats);
            Ok(())
        }
        _ => print_rows(build_stats_rows(stats), format),
    }
}

pub fn print_seed_outcome(outcome: &SeedOutcome, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(outcome);
            Ok(())
        }
        _ => print_rows(build_seed_rows(outcome), format),
    }
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
