//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::IngestSettings;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct PokedexConfig {
    /// SQLite database path. `None` leaves the service unconfigured.
    pub db_path: Option<PathBuf>,
    pub admin_api_key: Option<String>,
    pub pokeapi_base_url: Option<String>,
    pub bind: String,
    pub ingest: IngestSettings,
    pub stats_ttl: Duration,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            admin_api_key: None,
            pokeapi_base_url: None,
            bind: DEFAULT_BIND.to_string(),
            ingest: IngestSettings::default(),
            stats_ttl: DEFAULT_STATS_TTL,
        }
    }
}

impl PokedexConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset, blank, or unparsable
    /// values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let num = |key: &str, default: u64| {
            text(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let defaults = IngestSettings::default();
        let ingest = IngestSettings {
            batch_size: num("POKEDEX_BATCH_SIZE", defaults.batch_size as u64).max(1) as usize,
            dispatch_delay: Duration::from_millis(num(
                "POKEDEX_DISPATCH_DELAY_MS",
                defaults.dispatch_delay.as_millis() as u64,
            )),
            batch_cooldown: Duration::from_millis(num(
                "POKEDEX_BATCH_COOLDOWN_MS",
                defaults.batch_cooldown.as_millis() as u64,
            )),
            ..defaults
        };

        Self {
            db_path: text("POKEDEX_DB").map(PathBuf::from),
            admin_api_key: text("ADMIN_API_KEY"),
            pokeapi_base_url: text("POKEAPI_BASE_URL"),
            bind: text("POKEDEX_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            ingest,
            stats_ttl: Duration::from_secs(num(
                "POKEDEX_STATS_TTL_SECS",
                DEFAULT_STATS_TTL.as_secs(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> PokedexConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PokedexConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config(&[]), PokedexConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            ("POKEDEX_DB", "/tmp/pokedex.db"),
            ("ADMIN_API_KEY", "s3cret"),
            ("POKEAPI_BASE_URL", "http://localhost:9000"),
            ("POKEDEX_BIND", "0.0.0.0:8080"),
            ("POKEDEX_BATCH_SIZE", "5"),
            ("POKEDEX_DISPATCH_DELAY_MS", "0"),
            ("POKEDEX_BATCH_COOLDOWN_MS", "250"),
            ("POKEDEX_STATS_TTL_SECS", "0"),
        ]);
        assert_eq!(cfg.db_path, Some(PathBuf::from("/tmp/pokedex.db")));
        assert_eq!(cfg.admin_api_key.as_deref(), Some("s3cret"));
        assert_eq!(cfg.pokeapi_base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.ingest.batch_size, 5);
        assert_eq!(cfg.ingest.dispatch_delay, Duration::ZERO);
        assert_eq!(cfg.ingest.batch_cooldown, Duration::from_millis(250));
        assert_eq!(cfg.stats_ttl, Duration::ZERO);
    }

    #[test]
    fn blank_and_garbage_fall_back() {
        let cfg = config(&[
            ("POKEDEX_DB", "  "),
            ("POKEDEX_BATCH_SIZE", "ten"),
            ("POKEDEX_BATCH_COOLDOWN_MS", "-1"),
        ]);
        assert_eq!(cfg.db_path, None);
        assert_eq!(cfg.ingest.batch_size, 10);
        assert_eq!(cfg.ingest.batch_cooldown, Duration::from_millis(1000));
    }

    #[test]
    fn zero_batch_size_is_raised_to_one() {
        assert_eq!(config(&[("POKEDEX_BATCH_SIZE", "0")]).ingest.batch_size, 1);
    }
}
