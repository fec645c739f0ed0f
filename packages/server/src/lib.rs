#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for crowd safety monitoring.
//!
//! Serves the REST API for incident reporting, zone density heatmaps and
//! the role-aware assistant. All state lives in memory: the incident
//! registry, the venue layout loaded at startup and the open chat
//! sessions. Live density readings come from a prediction endpoint when
//! `DENSITY_URL` is set, otherwise from the venue's sample readings.

pub mod config;
mod handlers;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crowd_guard_assistant::UserRole;
use crowd_guard_assistant::prompt::{Hotspot, SafetySnapshot};
use crowd_guard_assistant::providers::{ChatProvider, Unconfigured, create_provider_from_env};
use crowd_guard_assistant::session::ChatSession;
use crowd_guard_density::source::{HttpReadings, ReadingSource, StaticReadings};
use crowd_guard_density::{DensityError, Heatmap, Venue};
use crowd_guard_incident::IncidentRegistry;

use crate::config::ServerConfig;

/// Hotspots included in assistant prompts.
const PROMPT_HOTSPOTS: usize = 5;

/// An open chat session.
struct SessionEntry {
    role: UserRole,
    session: Arc<tokio::sync::Mutex<ChatSession>>,
    last_used: Instant,
}

/// Shared application state.
pub struct AppState {
    /// The monitored venue.
    pub venue: Venue,
    /// Active incidents. Writers are serialized by the lock.
    pub registry: RwLock<IncidentRegistry>,
    /// Source of current zone readings.
    pub readings: Box<dyn ReadingSource>,
    /// LLM provider for the assistant.
    pub provider: Box<dyn ChatProvider>,
    /// Upper bound on one assistant reply.
    pub assistant_timeout: Duration,
    max_sessions: usize,
    session_ttl: Duration,
    sessions: Mutex<BTreeMap<String, SessionEntry>>,
}

impl AppState {
    /// Creates state with an empty incident registry and no sessions,
    /// using the default session limits of [`ServerConfig`].
    #[must_use]
    pub fn new(
        venue: Venue,
        readings: Box<dyn ReadingSource>,
        provider: Box<dyn ChatProvider>,
        assistant_timeout: Duration,
    ) -> Self {
        Self {
            venue,
            registry: RwLock::new(IncidentRegistry::new()),
            readings,
            provider,
            assistant_timeout,
            max_sessions: config::DEFAULT_MAX_SESSIONS,
            session_ttl: config::DEFAULT_SESSION_TTL,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sets how many chat sessions may be open at once and how long an
    /// idle one is kept.
    #[must_use]
    pub fn with_session_limits(mut self, max_sessions: usize, session_ttl: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.session_ttl = session_ttl;
        self
    }

    /// Read access to the registry.
    pub fn registry(&self) -> RwLockReadGuard<'_, IncidentRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the registry.
    pub fn registry_mut(&self) -> RwLockWriteGuard<'_, IncidentRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session with `id`, creating one for `role` if `id` is
    /// absent, unknown or was opened for a different role. The returned id
    /// is the session's key.
    ///
    /// Opening a session first drops sessions idle for longer than the
    /// TTL, then the least recently used ones while the cap is reached.
    fn session(
        &self,
        id: Option<&str>,
        role: UserRole,
    ) -> (String, Arc<tokio::sync::Mutex<ChatSession>>) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if let Some(id) = id
            && let Some(entry) = sessions.get_mut(id)
        {
            if entry.role == role {
                entry.last_used = now;
                return (id.to_string(), Arc::clone(&entry.session));
            }
            log::info!(
                "Chat session {id} was opened as {}, opening a new {role} session",
                entry.role
            );
        }

        let ttl = self.session_ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_used) < ttl);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }
        if sessions.len() < before {
            log::debug!("Dropped {} chat sessions", before - sessions.len());
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(tokio::sync::Mutex::new(ChatSession::new(role)));
        sessions.insert(
            id.clone(),
            SessionEntry {
                role,
                session: Arc::clone(&session),
                last_used: now,
            },
        );
        log::debug!("Opened {role} chat session {id}");
        (id, session)
    }

    /// Closes a chat session. Returns `false` if it wasn't open.
    pub fn close_session(&self, id: &str) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some();
        if removed {
            log::debug!("Closed chat session {id}");
        }
        removed
    }

    /// Number of open chat sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fetches current readings and classifies them against the venue.
    ///
    /// # Errors
    ///
    /// Returns [`DensityError`] if the reading source fails or reports a
    /// non-finite value.
    pub async fn heatmap(&self) -> Result<Heatmap, DensityError> {
        let readings = self.readings.readings().await?;
        Heatmap::build(&self.venue.grid, &readings)
    }

    /// Collects the data the assistant answers from.
    ///
    /// A failing reading source leaves the hotspot list empty.
    pub async fn safety_snapshot(&self) -> SafetySnapshot {
        let hotspots = match self.heatmap().await {
            Ok(heatmap) => heatmap
                .hotspots(PROMPT_HOTSPOTS)
                .into_iter()
                .filter_map(|cell| {
                    Some(Hotspot {
                        zone_name: cell.zone.zone_name.clone(),
                        value: cell.reading?,
                        tier: cell.tier?,
                    })
                })
                .collect(),
            Err(e) => {
                log::warn!("No density data for assistant prompt: {e}");
                Vec::new()
            }
        };

        SafetySnapshot {
            event: Some(self.venue.event.clone()),
            incidents: self.registry().summary(),
            hotspots,
        }
    }
}

/// Registers every `/api` route.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/event", web::get().to(handlers::event))
            .route("/categories", web::get().to(handlers::categories))
            .route("/incidents/summary", web::get().to(handlers::incident_summary))
            .route("/incidents", web::get().to(handlers::incidents))
            .route("/incidents", web::post().to(handlers::report_incident))
            .route("/incidents/{id}", web::delete().to(handlers::resolve_incident))
            .route("/zones", web::get().to(handlers::zones))
            .route("/density/tiers", web::get().to(handlers::tiers))
            .route("/density/classify", web::get().to(handlers::classify_reading))
            .route("/heatmap", web::get().to(handlers::heatmap))
            .route("/assistant", web::post().to(handlers::assistant))
            .route(
                "/assistant/{session_id}",
                web::delete().to(handlers::close_assistant_session),
            ),
    );
}

/// Builds the reading source described by `config`.
///
/// # Errors
///
/// Returns [`DensityError::Http`] if the HTTP client can't be built.
pub fn reading_source(
    config: &ServerConfig,
    venue: &Venue,
) -> Result<Box<dyn ReadingSource>, DensityError> {
    let source: Box<dyn ReadingSource> = match &config.density_url {
        Some(url) => Box::new(HttpReadings::new(url.clone(), config.density_timeout)?),
        None => Box::new(StaticReadings::new(venue.sample_readings.clone())),
    };
    log::info!("Density readings from {}", source.describe());
    Ok(source)
}

/// Starts the crowd safety API server.
///
/// Reads [`ServerConfig`] from the environment, loads the venue, sets up
/// the reading source and the assistant provider, and starts the
/// Actix-Web HTTP server. A missing AI configuration is not fatal: the
/// assistant then answers with its offline fallback. This is a regular
/// async function; the caller is responsible for providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the venue or reading source
/// can't be set up, or if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Loading venue...");
    let venue = config.load_venue().map_err(std::io::Error::other)?;
    log::info!(
        "Monitoring {} at {} ({} zones)",
        venue.event.name,
        venue.name,
        venue.grid.zones().len()
    );

    let readings = reading_source(&config, &venue).map_err(std::io::Error::other)?;

    let provider: Box<dyn ChatProvider> = match create_provider_from_env() {
        Ok(provider) => {
            log::info!("Assistant provider: {}", provider.name());
            provider
        }
        Err(e) => {
            log::warn!("Assistant will answer offline: {e}");
            Box::new(Unconfigured::new(e.to_string()))
        }
    };

    let state = web::Data::new(
        AppState::new(venue, readings, provider, config.assistant_timeout)
            .with_session_limits(config.max_sessions, config.session_ttl),
    );

    let ServerConfig {
        bind_addr, port, ..
    } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
