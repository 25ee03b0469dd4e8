use std::env;

use thiserror::Error;

/// Fallback signing secret for local sessions. Never accepted in production.
const LOCAL_SESSION_SECRET: &str = "catalog-admin-local-session-secret";

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

/// AppConfig
///
/// Holds the application's entire configuration state. It is immutable once loaded
/// and pulled into handlers and middleware through `FromRef`, like every other piece
/// of the unified `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log format and cookie security.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Base URL of the catalog REST API, without a trailing slash.
    pub catalog_api_url: String,
    // HMAC secret used to sign and verify session tokens.
    pub session_secret: String,
    // Lifetime of an issued session, in minutes.
    pub session_ttl_minutes: i64,
    // Optional JSON file replacing the built-in navigation menu.
    pub menu_config_path: Option<String>,
    // Honors the `x-user-name`/`x-user-role` development headers. Local only, opt-in.
    pub header_bypass: bool,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (pretty logs, header bypass) and the hardened production setup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// Provides a local configuration that needs no environment variables,
    /// primarily used for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            catalog_api_url: "http://localhost:3002/api".to_string(),
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_minutes: 480,
            menu_config_path: None,
            header_bypass: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Errors
    /// Fails fast when a variable required by the current environment is missing
    /// (the session secret in production), when the session TTL is outside
    /// `1..=MAX_SESSION_TTL_MINUTES`, or when the header bypass is requested outside
    /// `Env::Local`.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let session_secret = match (env, env::var("SESSION_SECRET")) {
            (_, Ok(secret)) if !secret.trim().is_empty() => secret,
            (Env::Production, _) => return Err(ConfigError::Missing("SESSION_SECRET")),
            (Env::Local, _) => LOCAL_SESSION_SECRET.to_string(),
        };

        let session_ttl_minutes = match env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) if (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) => minutes,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_TTL_MINUTES",
                        value: raw,
                    });
                }
            },
            Err(_) => 480,
        };

        let header_bypass = match env::var("AUTH_HEADER_BYPASS").as_deref() {
            Err(_) | Ok("false") | Ok("0") | Ok("") => false,
            Ok("true") | Ok("1") if env == Env::Local => true,
            Ok(raw) => {
                return Err(ConfigError::Invalid {
                    name: "AUTH_HEADER_BYPASS",
                    value: raw.to_string(),
                });
            }
        };

        let catalog_api_url = env::var("CATALOG_API_URL")
            .unwrap_or_else(|_| "http://localhost:3002/api".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            catalog_api_url,
            session_secret,
            session_ttl_minutes,
            menu_config_path: env::var("MENU_CONFIG_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            header_bypass,
        })
    }
}
