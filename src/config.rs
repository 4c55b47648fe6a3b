// Runtime configuration for the ticketing service
// Every setting comes from the environment (optionally seeded from a .env file)

use std::time::Duration;

use crate::cart::MAX_TICKETS_PER_LINE;

/// Development frontend origin used when FRONTEND_URL_DEV is not set
pub const DEFAULT_DEV_ORIGIN: &str = "http://localhost:5173";

/// Error raised when an environment variable holds an unusable value
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{name} must be at most {max}, got {value}")]
    AboveMaximum {
        name: &'static str,
        max: u64,
        value: u64,
    },
}

/// Deployment environment, read from NODE_ENV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

/// Per-client token bucket applied to the API prefixes
///
/// A client may burst `max_requests` requests; the bucket refills fully
/// over `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 300,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// De-duplicated CORS allow-list, insertion order preserved
    pub allowed_origins: Vec<String>,
    /// Maximum number of seats one selection may hold
    pub seat_limit: usize,
    /// Simulated payment latency
    pub payment_delay: Duration,
    /// Cosmetic cart hold window
    pub cart_hold: Duration,
    /// `None` disables rate limiting entirely
    pub rate_limit: Option<RateLimitSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: Environment::Development,
            allowed_origins: vec![DEFAULT_DEV_ORIGIN.to_string()],
            seat_limit: 10,
            payment_delay: Duration::from_millis(3000),
            cart_hold: Duration::from_secs(600),
            rate_limit: Some(RateLimitSettings::default()),
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Split out from `from_env` so tests can supply variables without
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", "port number")?.unwrap_or(defaults.port);
        let environment = Environment::parse(lookup("NODE_ENV"));

        let allowed_origins = build_allowed_origins(
            lookup("FRONTEND_URL"),
            lookup("FRONTEND_URL_DEV"),
            lookup("FRONTEND_ORIGINS"),
        );

        let seat_limit: usize =
            parse_var(&lookup, "SEAT_LIMIT", "integer")?.unwrap_or(defaults.seat_limit);
        if seat_limit == 0 {
            return Err(ConfigError::MustBePositive("SEAT_LIMIT"));
        }
        // a full selection has to fit in one cart line
        if seat_limit > MAX_TICKETS_PER_LINE as usize {
            return Err(ConfigError::AboveMaximum {
                name: "SEAT_LIMIT",
                max: MAX_TICKETS_PER_LINE.into(),
                value: seat_limit as u64,
            });
        }

        let payment_delay = parse_var::<u64, _>(&lookup, "PAYMENT_DELAY_MS", "integer")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.payment_delay);

        let cart_hold_secs: u64 = parse_var(&lookup, "CART_HOLD_SECONDS", "integer")?
            .unwrap_or(defaults.cart_hold.as_secs());
        if cart_hold_secs == 0 {
            return Err(ConfigError::MustBePositive("CART_HOLD_SECONDS"));
        }

        let limit_defaults = RateLimitSettings::default();
        let max_requests: u32 = parse_var(&lookup, "RATE_LIMIT_MAX", "integer")?
            .unwrap_or(limit_defaults.max_requests);
        let window_secs: u64 = parse_var(&lookup, "RATE_LIMIT_WINDOW_SECS", "integer")?
            .unwrap_or(limit_defaults.window.as_secs());
        if max_requests == 0 {
            return Err(ConfigError::MustBePositive("RATE_LIMIT_MAX"));
        }
        if window_secs == 0 {
            return Err(ConfigError::MustBePositive("RATE_LIMIT_WINDOW_SECS"));
        }

        Ok(Self {
            host,
            port,
            environment,
            allowed_origins,
            seat_limit,
            payment_delay,
            cart_hold: Duration::from_secs(cart_hold_secs),
            rate_limit: Some(RateLimitSettings {
                max_requests,
                window: Duration::from_secs(window_secs),
            }),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(
    lookup: &F,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name,
                expected,
                value: raw,
            }),
    }
}

/// Union of the production URL, the development URL and the extra
/// comma-separated origins, with blanks and duplicates removed
pub fn build_allowed_origins(
    prod: Option<String>,
    dev: Option<String>,
    extra: Option<String>,
) -> Vec<String> {
    let dev = dev
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DEV_ORIGIN.to_string());
    let extra = extra.unwrap_or_default();

    let candidates = prod
        .into_iter()
        .chain(std::iter::once(dev))
        .chain(extra.split(',').map(str::to_string));

    let mut origins: Vec<String> = Vec::new();
    for origin in candidates {
        let origin = origin.trim();
        if origin.is_empty() || origins.iter().any(|o| o == origin) {
            continue;
        }
        origins.push(origin.to_string());
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.allowed_origins, vec![DEFAULT_DEV_ORIGIN.to_string()]);
        assert_eq!(config.seat_limit, 10);
        assert_eq!(config.payment_delay, Duration::from_secs(3));
        assert_eq!(config.cart_hold, Duration::from_secs(600));
        assert_eq!(config.rate_limit, Some(RateLimitSettings::default()));
    }

    #[test]
    fn test_port_and_environment_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("NODE_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.is_production());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_seat_limit_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SEAT_LIMIT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::MustBePositive("SEAT_LIMIT")));
    }

    #[test]
    fn test_seat_limit_above_line_maximum_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("SEAT_LIMIT", "12")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::AboveMaximum { name: "SEAT_LIMIT", max: 10, value: 12 }
        ));
        assert_eq!(err.to_string(), "SEAT_LIMIT must be at most 10, got 12");

        let config = Config::from_lookup(lookup_from(&[("SEAT_LIMIT", "4")])).unwrap();
        assert_eq!(config.seat_limit, 4);
    }

    #[test]
    fn test_allowed_origins_union() {
        let origins = build_allowed_origins(
            Some("https://tickets.faz.co.zm".to_string()),
            None,
            Some(" https://admin.faz.co.zm , ,https://tickets.faz.co.zm".to_string()),
        );
        assert_eq!(
            origins,
            vec![
                "https://tickets.faz.co.zm".to_string(),
                DEFAULT_DEV_ORIGIN.to_string(),
                "https://admin.faz.co.zm".to_string(),
            ]
        );
    }

    #[test]
    fn test_blank_prod_origin_is_dropped() {
        let origins = build_allowed_origins(
            Some("".to_string()),
            Some("http://127.0.0.1:3000".to_string()),
            None,
        );
        assert_eq!(origins, vec!["http://127.0.0.1:3000".to_string()]);
    }
}
