//! HTTP handler functions for the crowd safety API.

use actix_web::{HttpResponse, web};
use crowd_guard_assistant::{AssistantError, UserRole};
use crowd_guard_density::{Heatmap, HeatmapCell, classify, describe, legend};
use crowd_guard_incident::IncidentError;
use crowd_guard_incident_models::{IncidentCategory, IncidentDraft, IncidentId};
use crowd_guard_server_models::{
    ApiCategory, ApiEvent, ApiHealth, ApiHeatmap, ApiHeatmapCell, ApiHotspot, ApiIncident,
    ApiTier, ApiTierSummary, ApiZone, AssistantRequest, AssistantResponse, ClassifyParams,
    CreatedIncident, HeatmapQueryParams, IncidentQueryParams,
};

use crate::AppState;

const DEFAULT_HOTSPOTS: usize = 5;

fn error_json(message: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/event`
pub async fn event(state: web::Data<AppState>) -> HttpResponse {
    let event = &state.venue.event;
    HttpResponse::Ok().json(ApiEvent {
        venue_id: state.venue.id.clone(),
        name: event.name.clone(),
        date: event.date.clone(),
        venue: event.venue.clone(),
    })
}

/// `GET /api/categories`
pub async fn categories() -> HttpResponse {
    let categories: Vec<ApiCategory> = IncidentCategory::all()
        .iter()
        .map(|&name| ApiCategory { name })
        .collect();
    HttpResponse::Ok().json(categories)
}

/// `GET /api/incidents`
///
/// Lists active incidents in report order, optionally filtered by
/// category. An unknown category yields an empty list.
pub async fn incidents(
    state: web::Data<AppState>,
    params: web::Query<IncidentQueryParams>,
) -> HttpResponse {
    let incidents: Vec<ApiIncident> = {
        let registry = state.registry();
        match params.category.as_deref() {
            Some(category) => registry
                .by_category(category)
                .into_iter()
                .cloned()
                .map(ApiIncident::from)
                .collect(),
            None => registry
                .all()
                .iter()
                .cloned()
                .map(ApiIncident::from)
                .collect(),
        }
    };
    HttpResponse::Ok().json(incidents)
}

/// `POST /api/incidents`
pub async fn report_incident(
    state: web::Data<AppState>,
    draft: web::Json<IncidentDraft>,
) -> HttpResponse {
    let result = state.registry_mut().record(draft.into_inner());
    match result {
        Ok(id) => HttpResponse::Created().json(CreatedIncident { id }),
        Err(e) => {
            log::warn!("Rejected incident report: {e}");
            HttpResponse::BadRequest().json(error_json(e))
        }
    }
}

/// `DELETE /api/incidents/{id}`
///
/// Resolves an incident and returns it.
pub async fn resolve_incident(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let Ok(id) = path.parse::<IncidentId>() else {
        return HttpResponse::BadRequest().json(error_json(format!(
            "Invalid incident id: {}",
            path.as_str()
        )));
    };

    let result = state.registry_mut().resolve(id);
    match result {
        Ok(incident) => HttpResponse::Ok().json(ApiIncident::from(incident)),
        Err(e @ IncidentError::NotFound { .. }) => HttpResponse::NotFound().json(error_json(e)),
        Err(e) => {
            log::error!("Failed to resolve incident {id}: {e}");
            HttpResponse::InternalServerError().json(error_json(e))
        }
    }
}

/// `GET /api/incidents/summary`
pub async fn incident_summary(state: web::Data<AppState>) -> HttpResponse {
    let summary = state.registry().summary();
    HttpResponse::Ok().json(summary)
}

/// `GET /api/zones`
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    let grid = &state.venue.grid;
    let zones: Vec<ApiZone> = grid
        .zones()
        .iter()
        .map(|zone| ApiZone {
            zone_id: zone.zone_id.clone(),
            zone_name: zone.zone_name.clone(),
            x: zone.x_coord,
            y: zone.y_coord,
            position: grid.position(zone),
            distance_from_center: grid.distance_from_center(zone),
        })
        .collect();
    HttpResponse::Ok().json(zones)
}

/// `GET /api/density/tiers`
///
/// Returns the legend, least crowded first.
pub async fn tiers() -> HttpResponse {
    let tiers: Vec<ApiTier> = legend()
        .into_iter()
        .map(|(tier, descriptor)| ApiTier::new(Some(tier), descriptor))
        .collect();
    HttpResponse::Ok().json(tiers)
}

/// `GET /api/density/classify`
pub async fn classify_reading(params: web::Query<ClassifyParams>) -> HttpResponse {
    match classify(params.value) {
        Ok(tier) => HttpResponse::Ok().json(ApiTier::new(Some(tier), describe(tier))),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// `GET /api/heatmap`
///
/// Classifies the current readings for every zone.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    match state.heatmap().await {
        Ok(heatmap) => HttpResponse::Ok().json(api_heatmap(
            &heatmap,
            params.hotspots.unwrap_or(DEFAULT_HOTSPOTS),
        )),
        Err(e) => {
            log::error!(
                "Failed to build heatmap from {}: {e}",
                state.readings.describe()
            );
            HttpResponse::BadGateway().json(error_json(format!("Density data unavailable: {e}")))
        }
    }
}

fn api_cell(cell: &HeatmapCell) -> ApiHeatmapCell {
    ApiHeatmapCell {
        zone_name: cell.zone.zone_name.clone(),
        x: cell.zone.x_coord,
        y: cell.zone.y_coord,
        value: cell.reading,
        tier: ApiTier::new(cell.tier, cell.descriptor),
    }
}

fn api_heatmap(heatmap: &Heatmap, hotspots: usize) -> ApiHeatmap {
    let summary = heatmap.summary();
    ApiHeatmap {
        columns: heatmap.columns(),
        rows: heatmap.rows(),
        layout: heatmap
            .layout()
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.map(api_cell)).collect())
            .collect(),
        summary: ApiTierSummary {
            low: summary.low,
            medium: summary.medium,
            high: summary.high,
            unknown: summary.unknown,
        },
        hotspots: heatmap
            .hotspots(hotspots)
            .into_iter()
            .filter_map(|cell| {
                Some(ApiHotspot {
                    zone_name: cell.zone.zone_name.clone(),
                    value: cell.reading?,
                    tier: cell.tier?,
                })
            })
            .collect(),
    }
}

/// `POST /api/assistant`
///
/// Sends one message to the assistant. Provider failures are not errors:
/// the reply is then the offline fallback with `degraded` set.
pub async fn assistant(
    state: web::Data<AppState>,
    body: web::Json<AssistantRequest>,
) -> HttpResponse {
    let AssistantRequest {
        session_id,
        user_type,
        query,
    } = body.into_inner();

    let Some(user_type) = user_type else {
        return HttpResponse::BadRequest().json(error_json("userType is required"));
    };
    let Ok(role) = user_type.parse::<UserRole>() else {
        return HttpResponse::BadRequest().json(error_json(format!(
            "Unknown userType: {user_type}. Use 'admin', 'responder' or 'invitee'."
        )));
    };
    let Some(query) = query else {
        return HttpResponse::BadRequest().json(error_json("query is required"));
    };

    let snapshot = state.safety_snapshot().await;
    let (session_id, session) = state.session(session_id.as_deref(), role);

    let result = session
        .lock()
        .await
        .ask(
            state.provider.as_ref(),
            &query,
            &snapshot,
            state.assistant_timeout,
        )
        .await;

    match result {
        Ok(reply) => HttpResponse::Ok().json(AssistantResponse {
            session_id,
            reply: reply.text,
            degraded: reply.degraded,
        }),
        Err(e @ AssistantError::EmptyMessage) => HttpResponse::BadRequest().json(error_json(e)),
        Err(e) => {
            log::error!("Assistant request failed: {e}");
            HttpResponse::InternalServerError().json(error_json(e))
        }
    }
}

/// `DELETE /api/assistant/{sessionId}`
///
/// Closes a chat session and forgets its history.
pub async fn close_assistant_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    if state.close_session(path.as_str()) {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(error_json(format!(
            "Unknown session: {}",
            path.as_str()
        )))
    }
}
