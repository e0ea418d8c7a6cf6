//! Process configuration, read from environment variables.

use core::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "inkpress-dev-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Deployment environment. Controls whether internal error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// `true` when no secret was configured and the development default is in use.
    pub jwt_secret_defaulted: bool,
    pub jwt_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub log_level: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
    pub cors_origins: Vec<String>,
    pub seed_sample_posts: bool,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("log_level", &self.log_level)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("cors_origins", &self.cors_origins)
            .field("seed_sample_posts", &self.seed_sample_posts)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                var: "APP_ENV",
                value: v,
            })?,
            None => Environment::Development,
        };

        let (jwt_secret, jwt_secret_defaulted) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if environment.is_production() => {
                return Err(ConfigError::Missing("JWT_SECRET"));
            }
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let jwt_ttl = match get("JWT_EXPIRES_IN") {
            Some(v) => parse_ttl(&v).ok_or(ConfigError::Invalid {
                var: "JWT_EXPIRES_IN",
                value: v,
            })?,
            None => chrono::Duration::hours(24),
        };

        let window_ms: u64 = parse_or(&get, "RATE_LIMIT_WINDOW_MS", 900_000)?;

        Ok(Self {
            environment,
            port: parse_or(&get, "PORT", 3001)?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "memory://".to_string()),
            jwt_secret,
            jwt_secret_defaulted,
            jwt_ttl,
            bcrypt_cost: parse_or(&get, "BCRYPT_COST", 12)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            rate_limit_window: Duration::from_millis(window_ms),
            rate_limit_max_requests: parse_or(&get, "RATE_LIMIT_MAX_REQUESTS", 100)?,
            cors_origins: get("CORS_ORIGIN")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]),
            seed_sample_posts: parse_or(&get, "SEED_SAMPLE_POSTS", false)?,
        })
    }

    /// In-memory configuration for tests: cheap hashing, generous rate limit.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            environment: Environment::Test,
            port: 0,
            database_url: "memory://".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_secret_defaulted: false,
            jwt_ttl: chrono::Duration::hours(24),
            bcrypt_cost: 4,
            log_level: "warn".to_string(),
            rate_limit_window: Duration::from_secs(900),
            rate_limit_max_requests: 10_000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            seed_sample_posts: false,
        }
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { var, value: v }),
        None => Ok(default),
    }
}

/// Parse a token lifetime: `"3600"` (seconds), `"90s"`, `"15m"`, `"24h"`, `"7d"`.
///
/// Zero and negative lifetimes are rejected.
pub fn parse_ttl(s: &str) -> Option<chrono::Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let n: i64 = digits.parse().ok()?;
    if n <= 0 {
        return None;
    }
    match unit.trim() {
        "" | "s" => chrono::Duration::try_seconds(n),
        "m" => chrono::Duration::try_minutes(n),
        "h" => chrono::Duration::try_hours(n),
        "d" => chrono::Duration::try_days(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_url, "memory://");
        assert!(config.jwt_secret_defaulted);
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(24));
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.rate_limit_window, Duration::from_millis(900_000));
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.cors_origins, ["http://localhost:3000"]);
        assert!(!config.seed_sample_posts);
    }

    #[test]
    fn production_requires_a_secret() {
        let err = AppConfig::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let ok = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert!(ok.environment.is_production());
        assert!(!ok.jwt_secret_defaulted);
    }

    #[test]
    fn explicit_values_are_parsed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("JWT_EXPIRES_IN", "15m"),
            ("CORS_ORIGIN", "https://a.example, https://b.example"),
            ("SEED_SAMPLE_POSTS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_ttl, chrono::Duration::minutes(15));
        assert_eq!(config.cors_origins, ["https://a.example", "https://b.example"]);
        assert!(config.seed_sample_posts);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "PORT",
                value: "eighty".into()
            }
        );
        assert!(AppConfig::from_lookup(lookup(&[("APP_ENV", "staging")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("JWT_EXPIRES_IN", "1w")])).is_err());
    }

    #[test]
    fn ttl_units() {
        assert_eq!(parse_ttl("24h"), Some(chrono::Duration::hours(24)));
        assert_eq!(parse_ttl("3600"), Some(chrono::Duration::seconds(3600)));
        assert_eq!(parse_ttl("90s"), Some(chrono::Duration::seconds(90)));
        assert_eq!(parse_ttl("7d"), Some(chrono::Duration::days(7)));
        assert_eq!(parse_ttl("0h"), None);
        assert_eq!(parse_ttl("h"), None);
        assert_eq!(parse_ttl(""), None);
    }

    #[test]
    fn debug_hides_secret() {
        let config = AppConfig::for_tests("super-secret-value");
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }
}
