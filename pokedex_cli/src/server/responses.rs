//! JSON bodies for every outcome of the three API endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pokedex_lib::query::NO_DATA_MESSAGE;
use pokedex_lib::{DashboardStats, Pagination, PokemonList, SeedOutcome};
use serde_json::{json, Value};

pub const NOT_CONFIGURED: &str = "Data store is not configured";
pub const APPEND_HINT: &str = "Add ?force=true to append new Pokémon after the highest stored id";

pub(crate) fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

pub(crate) fn bad_request(message: &str) -> Response {
    json_response(StatusCode::BAD_REQUEST, json!({ "error": message }))
}

// -- /api/pokemon --

pub(crate) fn list_ok(list: &PokemonList) -> Response {
    (StatusCode::OK, Json(list)).into_response()
}

pub(crate) fn list_not_configured() -> Response {
    json_response(
        StatusCode::OK,
        json!({
            "records": [],
            "pagination": Pagination::default(),
            "error": NOT_CONFIGURED,
            "setup_required": true,
        }),
    )
}

pub(crate) fn list_failed() -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "Failed to fetch pokemon",
            "records": [],
            "pagination": Pagination::default(),
        }),
    )
}

// -- /api/pokemon/stats --

fn stats_body(stats: &DashboardStats) -> Value {
    serde_json::to_value(stats).unwrap_or_else(|_| json!({}))
}

pub(crate) fn stats_ok(stats: &DashboardStats) -> Response {
    let mut body = stats_body(stats);
    if stats.is_empty() {
        body["message"] = json!(NO_DATA_MESSAGE);
    }
    json_response(StatusCode::OK, body)
}

pub(crate) fn stats_not_configured() -> Response {
    let mut body = stats_body(&DashboardStats::default());
    body["error"] = json!(NOT_CONFIGURED);
    body["setup_required"] = json!(true);
    json_response(StatusCode::OK, body)
}

pub(crate) fn stats_failed() -> Response {
    let mut body = stats_body(&DashboardStats::default());
    body["error"] = json!("Failed to fetch stats");
    json_response(StatusCode::INTERNAL_SERVER_ERROR, body)
}

// -- /api/admin/seed --

pub(crate) fn seed_not_configured() -> Response {
    json_response(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": NOT_CONFIGURED, "setup_required": true }),
    )
}

pub(crate) fn unauthorized() -> Response {
    json_response(StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
}

pub(crate) fn seed_outcome(outcome: &SeedOutcome) -> Response {
    let body = match outcome {
        SeedOutcome::AlreadyPopulated { existing_count } => json!({
            "message": outcome.message(),
            "action": APPEND_HINT,
            "existing_count": existing_count,
        }),
        SeedOutcome::NothingFetched { existing_count, .. } => json!({
            "message": outcome.message(),
            "existing_count": existing_count,
        }),
        SeedOutcome::Inserted {
            mode,
            count,
            total_count,
            ..
        } => json!({
            "success": true,
            "message": outcome.message(),
            "count": count,
            "total_count": total_count,
            "action": mode.action(),
        }),
    };
    json_response(StatusCode::OK, body)
}

pub(crate) fn seed_failed(details: &str) -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Failed to seed the database", "details": details }),
    )
}
