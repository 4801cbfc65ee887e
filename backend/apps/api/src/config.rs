//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env` is
//! loaded).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use classroom::ClassroomConfig;
use classroom::application::config::PasswordParams;
use platform::password::PasswordHasher;

const DEFAULT_DATABASE_URL: &str = "sqlite://classroom.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Everything `main` needs to start serving
#[derive(Debug)]
pub struct ApiConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub classroom: ClassroomConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `development` relaxes the secret requirement and the Secure flag.
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        development: bool,
    ) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &lookup, DEFAULT_MAX_CONNECTIONS)?;

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let session_secret = match lookup("SESSION_SECRET") {
            Some(secret_b64) => decode_secret(&secret_b64)?,
            None if development => {
                tracing::warn!("SESSION_SECRET not set, using a random secret");
                platform::crypto::random_secret()
            }
            None => bail!("SESSION_SECRET must be set in production"),
        };

        let cookie_secure = parse_or("COOKIE_SECURE", &lookup, !development)?;

        let session_lifetime = lookup("SESSION_LIFETIME_SECS")
            .map(|secs| secs.parse().map(Duration::from_secs))
            .transpose()
            .context("SESSION_LIFETIME_SECS must be a number of seconds")?;

        let defaults = PasswordParams::default();
        let params = PasswordParams {
            memory_kib: parse_or("PASSWORD_MEMORY_KIB", &lookup, defaults.memory_kib)?,
            iterations: parse_or("PASSWORD_ITERATIONS", &lookup, defaults.iterations)?,
            parallelism: parse_or("PASSWORD_PARALLELISM", &lookup, defaults.parallelism)?,
        };
        let password_hasher =
            PasswordHasher::new(params).context("Invalid PASSWORD_* settings")?;

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            classroom: ClassroomConfig {
                session_secret,
                session_lifetime,
                cookie_secure,
                password_hasher,
                ..ClassroomConfig::default()
            },
        })
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value")),
        None => Ok(default),
    }
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("SESSION_SECRET must be base64")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", bytes.len()))
}
