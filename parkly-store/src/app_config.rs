use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ZoneWeight {
    pub zone: String,
    pub weight: i32,
}

/// Weights for slot desirability scoring
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub zone_weights: Vec<ZoneWeight>,
    pub free_bonus: i32,
    pub near_free_bonus: i32,
    pub near_free_threshold_minutes: i64,
    pub average_duration_minutes: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            zone_weights: vec![
                ZoneWeight { zone: "A".to_string(), weight: 100 },
                ZoneWeight { zone: "B".to_string(), weight: 70 },
                ZoneWeight { zone: "C".to_string(), weight: 40 },
            ],
            free_bonus: 50,
            near_free_bonus: 30,
            near_free_threshold_minutes: 15,
            average_duration_minutes: 60,
        }
    }
}

impl ScoringConfig {
    /// Unknown zones weigh nothing
    pub fn zone_weight(&self, zone: &str) -> i32 {
        self.zone_weights
            .iter()
            .find(|w| w.zone == zone)
            .map(|w| w.weight)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ZoneSeed {
    pub zone: String,
    pub count: u32,
    pub price_per_hour: f64,
}

/// Demo catalog written into an empty slot store
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SeedConfig {
    pub on_startup: bool,
    pub zones: Vec<ZoneSeed>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let zone = |zone: &str, count, price_per_hour| ZoneSeed {
            zone: zone.to_string(),
            count,
            price_per_hour,
        };
        Self {
            on_startup: false,
            zones: vec![zone("A", 6, 80.0), zone("B", 8, 50.0), zone("C", 6, 30.0)],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    pub history_limit: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { history_limit: 50 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            ttl_seconds: 86_400,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `PARKLY_SERVER__PORT=8081` would set `server.port`
            .add_source(config::Environment::with_prefix("PARKLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_defaults() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.zone_weight("A"), 100);
        assert_eq!(scoring.zone_weight("B"), 70);
        assert_eq!(scoring.zone_weight("C"), 40);
        assert_eq!(scoring.zone_weight("Z"), 0);
        assert_eq!(scoring.free_bonus, 50);
        assert_eq!(scoring.near_free_bonus, 30);
    }

    #[test]
    fn test_seed_defaults_total_twenty() {
        let seed = SeedConfig::default();
        let total: u32 = seed.zones.iter().map(|z| z.count).sum();
        assert_eq!(total, 20);
        assert!(!seed.on_startup);
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let s = config::Config::builder()
            .set_override("server.port", 8080)
            .unwrap()
            .set_override("database.url", "postgres://localhost/parkly")
            .unwrap()
            .set_override("redis.url", "redis://127.0.0.1/")
            .unwrap()
            .set_override("scoring.free_bonus", 60)
            .unwrap()
            .set_override("session.backend", "redis")
            .unwrap()
            .build()
            .unwrap();

        let config: Config = s.try_deserialize().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scoring.free_bonus, 60);
        assert_eq!(config.scoring.zone_weight("A"), 100);
        assert_eq!(config.session.backend, SessionBackend::Redis);
        assert_eq!(config.session.ttl_seconds, 86_400);
        assert_eq!(config.booking.history_limit, 50);
    }
}
