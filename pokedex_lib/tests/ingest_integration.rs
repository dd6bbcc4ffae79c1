use std::sync::Arc;
use std::time::Duration;

use pokedex_lib::pokeapi::Client;
use pokedex_lib::{
    AdminKeys, BatchIngestor, IdRange, IngestMode, IngestSettings, PokeApiSource, Pokedex,
    PokemonQuery, RecordSource, SeedOutcome, SourceError, Store,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn pokemon_body(base: &str, id: u32, types: &[&str]) -> Value {
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t, "url": "" } }))
        .collect();
    json!({
        "id": id,
        "name": format!("mon-{}", id),
        "height": 10,
        "weight": 100,
        "base_experience": 64,
        "types": types,
        "sprites": {
            "front_default": format!("https://img.example/{}.png", id),
            "front_shiny": null
        },
        "stats": [
            { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "" } },
            { "base_stat": 49, "effort": 0, "stat": { "name": "attack", "url": "" } }
        ],
        "abilities": [
            { "ability": { "name": "overgrow", "url": "" }, "is_hidden": false, "slot": 1 }
        ],
        "species": {
            "name": format!("mon-{}", id),
            "url": format!("{}/pokemon-species/{}/", base, id)
        }
    })
}

fn species_body(generation: u32, legendary: bool, mythical: bool) -> Value {
    json!({
        "name": "mon",
        "is_legendary": legendary,
        "is_mythical": mythical,
        "generation": {
            "name": "generation",
            "url": format!("https://pokeapi.co/api/v2/generation/{}/", generation)
        },
        "color": { "name": "green", "url": "" },
        "habitat": { "name": "grassland", "url": "" },
        "shape": null
    })
}

async fn mount_pokemon(server: &MockServer, id: u32, types: &[&str], species: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/pokemon/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(
            &server.uri(),
            id,
            types,
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/pokemon-species/{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(species))
        .mount(server)
        .await;
}

async fn mount_missing(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/pokemon/{}", id)))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(server)
        .await;
}

fn fast_settings() -> IngestSettings {
    IngestSettings {
        dispatch_delay: Duration::ZERO,
        batch_cooldown: Duration::ZERO,
        ..Default::default()
    }
}

fn source_for(server: &MockServer) -> Arc<PokeApiSource> {
    let client = Client::with_base_url(&server.uri()).unwrap();
    Arc::new(PokeApiSource::new(client))
}

// ============================================================================
// Record source
// ============================================================================

#[tokio::test]
async fn source_combines_pokemon_and_species() {
    let server = MockServer::start().await;
    mount_pokemon(&server, 151, &["psychic"], species_body(1, false, true)).await;

    let record = source_for(&server).fetch_record(151).await.unwrap();
    assert_eq!(record.id, 151);
    assert_eq!(record.types, vec!["psychic"]);
    assert!(record.is_mythical);
    assert_eq!(record.generation, 1);
    assert_eq!(record.color, "green");
    assert_eq!(record.habitat.as_deref(), Some("grassland"));
    assert_eq!(record.stats.hp, 45);
    assert_eq!(record.stats.speed, 0);
}

#[tokio::test]
async fn source_reports_http_status() {
    let server = MockServer::start().await;
    mount_missing(&server, 3).await;

    let source = source_for(&server);
    let err = source.try_fetch_record(3).await.unwrap_err();
    match err {
        SourceError::Api(e) => assert_eq!(e.status(), Some(404)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(source.fetch_record(3).await.is_none());
}

#[tokio::test]
async fn source_species_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pokemon_body(
            &server.uri(),
            7,
            &["water"],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pokemon-species/7/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(source_for(&server).fetch_record(7).await.is_none());
}

#[tokio::test]
async fn source_rejects_payload_without_types() {
    let server = MockServer::start().await;
    mount_pokemon(&server, 9, &[], species_body(1, false, false)).await;

    let err = source_for(&server).try_fetch_record(9).await.unwrap_err();
    assert!(matches!(err, SourceError::Normalize(_)));
}

// ============================================================================
// Batch ingestion
// ============================================================================

#[tokio::test]
async fn ingest_range_skips_failed_id() {
    let server = MockServer::start().await;
    for id in [1, 2, 4, 5] {
        mount_pokemon(&server, id, &["grass"], species_body(1, false, false)).await;
    }
    mount_missing(&server, 3).await;

    let ingestor = BatchIngestor::new(source_for(&server), fast_settings());
    let report = ingestor
        .run(IdRange::new(1, 5), None, |_| {})
        .await
        .unwrap();

    let mut ids: Vec<u32> = report.records.iter().map(|r| r.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 4, 5]);
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.stats.batches, 1);
}

// ============================================================================
// Service end to end
// ============================================================================

#[tokio::test]
async fn seed_then_query_and_aggregate() {
    let server = MockServer::start().await;
    mount_pokemon(&server, 1, &["grass", "poison"], species_body(1, false, false)).await;
    mount_pokemon(&server, 2, &["grass", "poison"], species_body(1, false, false)).await;
    mount_pokemon(&server, 3, &["psychic"], species_body(1, true, false)).await;
    mount_pokemon(&server, 4, &["psychic"], species_body(2, false, true)).await;

    let svc = Pokedex::new(
        Store::in_memory().unwrap(),
        source_for(&server),
        fast_settings(),
        AdminKeys::new(None),
        Duration::from_secs(60),
    );

    let outcome = svc.seed(IngestMode::Create, 4, |_| {}).await.unwrap();
    assert!(matches!(
        outcome,
        SeedOutcome::Inserted {
            count: 4,
            total_count: 4,
            ..
        }
    ));

    let list = svc.list(&PokemonQuery::default()).await.unwrap();
    assert_eq!(list.pagination.total, 4);
    assert!(list.message.is_none());

    let mut mythical = PokemonQuery::default();
    mythical.filter.rarity = Some(pokedex_lib::Rarity::Mythical);
    let list = svc.list(&mythical).await.unwrap();
    assert_eq!(list.pagination.total, 1);
    assert_eq!(list.records[0].id, 4);

    let stats = svc.stats().await.unwrap();
    assert_eq!(stats.type_counts[0].count, 2);
    assert_eq!(stats.rarity_counts.legendary, 1);
    assert_eq!(stats.rarity_counts.mythical, 1);
    assert_eq!(stats.rarity_counts.normal, 2);
    assert_eq!(stats.generation_counts.len(), 2);
}
