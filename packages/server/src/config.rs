//! Startup configuration read from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crowd_guard_density::venue::{self, DEFAULT_VENUE_ID};
use crowd_guard_density::{DensityError, Venue};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ASSISTANT_TIMEOUT_SECS: u64 = 20;

/// Default cap on open chat sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Default idle time after which a chat session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Where the venue layout comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueSource {
    /// A built-in venue, by id.
    Builtin(String),
    /// A TOML file on disk.
    File(PathBuf),
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Venue layout (`VENUE_PATH` wins over `VENUE`).
    pub venue: VenueSource,
    /// Prediction endpoint for live readings (`DENSITY_URL`). The venue's
    /// sample readings are served when unset.
    pub density_url: Option<String>,
    /// Request timeout for `density_url` (`DENSITY_TIMEOUT_SECS`).
    pub density_timeout: Duration,
    /// Upper bound on one assistant reply (`ASSISTANT_TIMEOUT_SECS`).
    pub assistant_timeout: Duration,
    /// Cap on open chat sessions (`MAX_CHAT_SESSIONS`).
    pub max_sessions: usize,
    /// Idle time after which a chat session is dropped
    /// (`CHAT_SESSION_TTL_SECS`).
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Unparseable numbers are
    /// logged and replaced by their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let venue = lookup("VENUE_PATH").map_or_else(
            || VenueSource::Builtin(lookup("VENUE").unwrap_or_else(|| DEFAULT_VENUE_ID.to_string())),
            |path| VenueSource::File(PathBuf::from(path)),
        );

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT),
            venue,
            density_url: lookup("DENSITY_URL").filter(|url| !url.trim().is_empty()),
            density_timeout: Duration::from_secs(parse_or(
                "DENSITY_TIMEOUT_SECS",
                lookup("DENSITY_TIMEOUT_SECS"),
                crowd_guard_density::source::DEFAULT_TIMEOUT.as_secs(),
            )),
            assistant_timeout: Duration::from_secs(parse_or(
                "ASSISTANT_TIMEOUT_SECS",
                lookup("ASSISTANT_TIMEOUT_SECS"),
                DEFAULT_ASSISTANT_TIMEOUT_SECS,
            )),
            max_sessions: parse_or(
                "MAX_CHAT_SESSIONS",
                lookup("MAX_CHAT_SESSIONS"),
                DEFAULT_MAX_SESSIONS,
            ),
            session_ttl: Duration::from_secs(parse_or(
                "CHAT_SESSION_TTL_SECS",
                lookup("CHAT_SESSION_TTL_SECS"),
                DEFAULT_SESSION_TTL.as_secs(),
            )),
        }
    }

    /// Loads the configured venue.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError`] if the venue is unknown, unreadable or
    /// invalid.
    pub fn load_venue(&self) -> Result<Venue, DensityError> {
        match &self.venue {
            VenueSource::Builtin(id) => venue::builtin(id),
            VenueSource::File(path) => venue::load(path),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    value: Option<String>,
    default: T,
) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);

        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.venue, VenueSource::Builtin("biec".to_string()));
        assert_eq!(config.density_url, None);
        assert_eq!(config.density_timeout, Duration::from_secs(10));
        assert_eq!(config.assistant_timeout, Duration::from_secs(20));
        assert_eq!(config.max_sessions, 1000);
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn session_limits_from_environment() {
        let config = config(&[("MAX_CHAT_SESSIONS", "50"), ("CHAT_SESSION_TTL_SECS", "60")]);
        assert_eq!(config.max_sessions, 50);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn venue_path_wins_over_venue_id() {
        let config = config(&[("VENUE", "biec"), ("VENUE_PATH", "/etc/venue.toml")]);
        assert_eq!(
            config.venue,
            VenueSource::File(PathBuf::from("/etc/venue.toml"))
        );
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = config(&[("PORT", "http"), ("ASSISTANT_TIMEOUT_SECS", "5")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.assistant_timeout, Duration::from_secs(5));
    }

    #[test]
    fn default_venue_loads() {
        let venue = config(&[]).load_venue().unwrap();
        assert_eq!(venue.grid.zones().len(), 20);
    }

    #[test]
    fn unknown_builtin_venue_is_an_error() {
        let err = config(&[("VENUE", "wembley")]).load_venue().unwrap_err();
        assert!(matches!(err, DensityError::UnknownVenue { .. }));
    }
}
