use crate::app_config::{AppConfig, Environment, GeocoderKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let google_api_key = require("GOOGLE_MAP_API_KEY")?;
    let yahoo_app_id = require("YAHOO_API_KEY")?;

    let env = parse_environment(&or_default("DOKOIKO_ENV", "development"))?;
    let bind_addr = or_default("DOKOIKO_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DOKOIKO_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("DOKOIKO_LOG_LEVEL", "info");
    let geocoder = parse_geocoder(&or_default("DOKOIKO_GEOCODER", "google"))?;
    let categories_path = lookup("DOKOIKO_CATEGORIES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let provider_request_timeout_secs = parse_u64("DOKOIKO_PROVIDER_TIMEOUT_SECS", "10")?;
    let provider_user_agent =
        or_default("DOKOIKO_PROVIDER_USER_AGENT", "dokoiko/0.1 (place-search)");
    let provider_max_retries = parse_u32("DOKOIKO_PROVIDER_MAX_RETRIES", "2")?;
    let provider_retry_backoff_ms = parse_u64("DOKOIKO_PROVIDER_RETRY_BACKOFF_MS", "500")?;
    let round_timeout_secs = parse_u64("DOKOIKO_ROUND_TIMEOUT_SECS", "20")?;
    let session_ttl_secs = parse_u64("DOKOIKO_SESSION_TTL_SECS", "1800")?;
    let rate_limit_per_minute = parse_usize("DOKOIKO_RATE_LIMIT_PER_MINUTE", "120")?;

    if provider_request_timeout_secs == 0 {
        return Err(invalid(
            "DOKOIKO_PROVIDER_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    if round_timeout_secs == 0 {
        return Err(invalid(
            "DOKOIKO_ROUND_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_api_key,
        yahoo_app_id,
        geocoder,
        categories_path,
        provider_request_timeout_secs,
        provider_user_agent,
        provider_max_retries,
        provider_retry_backoff_ms,
        round_timeout_secs,
        session_ttl_secs,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DOKOIKO_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_geocoder(s: &str) -> Result<GeocoderKind, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "google" => Ok(GeocoderKind::Google),
        "gsi" => Ok(GeocoderKind::Gsi),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DOKOIKO_GEOCODER".to_string(),
            reason: format!("expected 'google' or 'gsi', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
