use crate::app_config::{AppConfig, Environment, LoginCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or a credential is half-set.
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
/// Returns `ConfigError` if values are invalid or a credential is half-set.
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
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("INSTALENS_ENV", "development"))?;
    let log_level = or_default("INSTALENS_LOG_LEVEL", "info");

    let base_url = or_default("INSTALENS_BASE_URL", "https://www.instagram.com")
        .trim()
        .trim_end_matches('/')
        .to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "INSTALENS_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{base_url}'"),
        });
    }

    let login = match optional("INSTALENS_LOGIN_USERNAME") {
        Some(username) => Some(LoginCredentials {
            username,
            password: require("INSTALENS_LOGIN_PASSWORD")?,
        }),
        None => None,
    };
    let cookies_path = optional("INSTALENS_COOKIES_PATH").map(PathBuf::from);

    let headless = parse_bool("INSTALENS_HEADLESS", &or_default("INSTALENS_HEADLESS", "true"))?;
    let chrome_path = optional("INSTALENS_CHROME_PATH").map(PathBuf::from);

    let max_concurrent_profiles = parse_usize("INSTALENS_MAX_CONCURRENT_PROFILES", "5")?;
    if max_concurrent_profiles == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "INSTALENS_MAX_CONCURRENT_PROFILES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let first_post_timeout_secs = parse_u64("INSTALENS_FIRST_POST_TIMEOUT_SECS", "20")?;
    let next_post_timeout_secs = parse_u64("INSTALENS_NEXT_POST_TIMEOUT_SECS", "5")?;
    let comments_timeout_secs = parse_u64("INSTALENS_COMMENTS_TIMEOUT_SECS", "10")?;
    let login_timeout_secs = parse_u64("INSTALENS_LOGIN_TIMEOUT_SECS", "15")?;
    let page_settle_ms = parse_u64("INSTALENS_PAGE_SETTLE_MS", "5000")?;

    let output_dir = PathBuf::from(or_default("INSTALENS_OUTPUT_DIR", "."));
    let diagnostics_dir = PathBuf::from(or_default("INSTALENS_DIAGNOSTICS_DIR", "./diagnostics"));

    Ok(AppConfig {
        env,
        log_level,
        base_url,
        login,
        cookies_path,
        headless,
        chrome_path,
        max_concurrent_profiles,
        first_post_timeout_secs,
        next_post_timeout_secs,
        comments_timeout_secs,
        login_timeout_secs,
        page_settle_ms,
        output_dir,
        diagnostics_dir,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "INSTALENS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
