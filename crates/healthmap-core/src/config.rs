use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass.kumi.systems/api/interpreter";
pub const DEFAULT_ROUTER_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_USER_AGENT: &str = "healthmap/0.1 (nearby-services)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// configuration pointed at the public OpenStreetMap services.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
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

    let parse_radius = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(var, format!("must be a positive number, got {value}")));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("HEALTHMAP_ENV", "development"));
    let bind_addr = parse_addr("HEALTHMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("HEALTHMAP_LOG_LEVEL", "info");

    let geocoder_url = or_default("HEALTHMAP_GEOCODER_URL", DEFAULT_GEOCODER_URL);
    let overpass_url = or_default("HEALTHMAP_OVERPASS_URL", DEFAULT_OVERPASS_URL);
    let router_url = or_default("HEALTHMAP_ROUTER_URL", DEFAULT_ROUTER_URL);

    let request_timeout_secs = parse_u64("HEALTHMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("HEALTHMAP_USER_AGENT", DEFAULT_USER_AGENT);
    let search_radius_km = parse_radius("HEALTHMAP_SEARCH_RADIUS_KM", "5")?;
    let rate_limit_per_minute = parse_usize("HEALTHMAP_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        geocoder_url,
        overpass_url,
        router_url,
        request_timeout_secs,
        user_agent,
        search_radius_km,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
