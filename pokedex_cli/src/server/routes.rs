use axum::routing::get;
use axum::Router;

use super::handlers;
use super::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/pokemon", get(handlers::list_pokemon))
        .route("/api/pokemon/stats", get(handlers::pokemon_stats))
        .route("/api/admin/seed", get(handlers::seed).post(handlers::seed))
        .with_state(state)
}
