//! HTTP client for the PokéAPI v2 REST API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    types::{Pokemon, PokemonID, ResourceList, Species},
    Error,
};

/// Request timeout for PokéAPI calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("pokedex/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the PokéAPI v2 REST API.
///
/// Holds a single `reqwest::Client`, so connections are pooled across the
/// many small requests an ingestion run makes.
pub struct Client {
    http: reqwest::Client,
    /// Base URL for the API. Defaults to `https://pokeapi.co/api/v2`.
    base_api_url: String,
}

impl Client {
    /// Creates a new client pointing at the public PokéAPI.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url("https://pokeapi.co/api/v2")
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })
    }

    async fn get<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .get(url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get {}: {}", url, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::warn!("{} returned status {}: {}", url, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse {}: {} | body: {}", url, e, snippet);
            Error::InvalidResponse(e.to_string())
        })
    }

    /// Fetches a single Pokémon by national dex number.
    pub async fn get_pokemon(&self, id: PokemonID) -> Result<Pokemon, Error> {
        let url = self.get_url(format!("/pokemon/{}", id).as_str())?;
        self.get::<Pokemon>(url).await
    }

    /// Fetches a species by national dex number.
    pub async fn get_species(&self, id: PokemonID) -> Result<Species, Error> {
        let url = self.get_url(format!("/pokemon-species/{}", id).as_str())?;
        self.get::<Species>(url).await
    }

    /// Fetches a species from the absolute URL embedded in a [`Pokemon`] payload.
    pub async fn get_species_by_url(&self, species_url: &str) -> Result<Species, Error> {
        let url = Url::parse(species_url).map_err(|e| {
            tracing::error!("Invalid species URL {}: {}", species_url, e);
            Error::RequestFailed
        })?;
        self.get::<Species>(url).await
    }

    /// Total number of species the API currently knows about.
    pub async fn species_count(&self) -> Result<u32, Error> {
        let mut url = self.get_url("/pokemon-species/")?;
        url.query_pairs_mut().append_pair("limit", "1");
        let list = self.get::<ResourceList>(url).await?;
        Ok(list.count)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::with_base_url("http://localhost:9999/api/v2/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api/v2");
        let url = client.get_url("/pokemon/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9999/api/v2/pokemon/1");
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("Not Found"), "Not Found");
    }

    #[test]
    fn truncate_body_cuts_long_bodies() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }
}
