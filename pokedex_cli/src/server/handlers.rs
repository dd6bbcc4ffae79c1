use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use pokedex_lib::auth::bearer_token;
use pokedex_lib::{validation, IngestMode, ListParams, PokedexError, PokemonQuery};
use serde::{Deserialize, Serialize};

use super::responses;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub configured: bool,
}

pub async fn health(State(app): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        configured: app.is_configured(),
    })
}

pub async fn list_pokemon(
    State(app): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    if !app.is_configured() {
        return responses::list_not_configured();
    }
    let query = match PokemonQuery::try_from(&params) {
        Ok(q) => q,
        Err(e) => return responses::bad_request(&e.to_string()),
    };
    match app.list(&query).await {
        Ok(list) => responses::list_ok(&list),
        Err(PokedexError::NotConfigured) => responses::list_not_configured(),
        Err(e) => {
            tracing::error!("Error fetching pokemon: {}", e);
            responses::list_failed()
        }
    }
}

pub async fn pokemon_stats(State(app): State<AppState>) -> Response {
    match app.stats().await {
        Ok(stats) => responses::stats_ok(&stats),
        Err(PokedexError::NotConfigured) => responses::stats_not_configured(),
        Err(e) => {
            tracing::error!("Error fetching stats: {}", e);
            responses::stats_failed()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedParams {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub limit: Option<String>,
    pub force: Option<String>,
}

/// Query-string key wins over the `Authorization` header.
fn admin_token<'a>(params: &'a SeedParams, headers: &'a HeaderMap) -> Option<&'a str> {
    params.api_key.as_deref().or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
    })
}

pub async fn seed(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SeedParams>,
) -> Response {
    if !app.is_configured() {
        return responses::seed_not_configured();
    }
    if app.authorize(admin_token(&params, &headers)).is_err() {
        tracing::warn!("Rejected seed request with invalid admin key");
        return responses::unauthorized();
    }

    let limit = match params.limit.as_deref() {
        None => app.settings().default_limit,
        Some(raw) => match validation::validate_seed_limit(raw) {
            Ok(limit) => limit,
            Err(e) => return responses::bad_request(&e.to_string()),
        },
    };
    let mode = if params.force.as_deref() == Some("true") {
        IngestMode::Append
    } else {
        IngestMode::Create
    };

    // Detached so a dropped connection does not cancel the run.
    let run = tokio::spawn(async move { app.seed(mode, limit, |_| {}).await });
    match run.await {
        Ok(Ok(outcome)) => responses::seed_outcome(&outcome),
        Ok(Err(PokedexError::NotConfigured)) => responses::seed_not_configured(),
        Ok(Err(e)) => {
            tracing::error!("Seed failed: {}", e);
            responses::seed_failed(&e.to_string())
        }
        Err(e) => {
            tracing::error!("Seed task failed: {}", e);
            responses::seed_failed(&e.to_string())
        }
    }
}
