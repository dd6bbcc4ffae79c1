//! HTTP surface: list, stats and seed endpoints over a shared [`Pokedex`].

mod handlers;
mod responses;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use pokedex_lib::Pokedex;

pub use routes::router;

pub type AppState = Arc<Pokedex>;

pub async fn serve(app: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(app)).await?;
    Ok(())
}
