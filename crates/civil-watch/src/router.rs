use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::{SituationEngine, SituationOverview};
use crate::error::AppError;
use crate::geo::{Coordinate, Location};
use crate::hazards::{Hazard, HazardStatistics};
use crate::incidents::{Incident, IncidentMarker};
use crate::instructions::Instruction;
use crate::notifications::{Notification, NotificationDraft};
use crate::shelters::{Capacity, RankedShelter, Shelter, ShelterKind};

type SharedEngine = Arc<SituationEngine>;

/// Router exposing the situational registries over JSON.
pub fn situation_router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/api/v1/overview", get(overview_handler))
        .route(
            "/api/v1/location",
            get(location_handler).put(update_location_handler),
        )
        .route("/api/v1/hazards/active", get(active_hazards_handler))
        .route("/api/v1/hazards/statistics", get(hazard_statistics_handler))
        .route("/api/v1/hazards/:hazard_id", get(hazard_handler))
        .route(
            "/api/v1/hazards/:hazard_id/instructions",
            get(hazard_instructions_handler),
        )
        .route("/api/v1/shelters", get(shelters_handler))
        .route("/api/v1/shelters/nearest", get(nearest_shelters_handler))
        .route("/api/v1/shelters/available", get(available_shelters_handler))
        .route("/api/v1/shelters/:shelter_id", get(shelter_handler))
        .route("/api/v1/shelters/:shelter_id/occupy", post(occupy_handler))
        .route("/api/v1/shelters/:shelter_id/release", post(release_handler))
        .route(
            "/api/v1/notifications",
            get(notifications_handler).post(add_notification_handler),
        )
        .route("/api/v1/notifications/unread", get(unread_notifications_handler))
        .route("/api/v1/notifications/read-all", post(mark_all_read_handler))
        .route(
            "/api/v1/notifications/:notification_id",
            axum::routing::delete(delete_notification_handler),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler),
        )
        .route("/api/v1/incidents", get(incidents_handler))
        .route("/api/v1/incidents/calendar", get(incident_calendar_handler))
        .with_state(engine)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PointQuery {
    pub(crate) lat: Option<f64>,
    pub(crate) lon: Option<f64>,
    pub(crate) radius_km: Option<f64>,
    pub(crate) limit: Option<usize>,
}

impl PointQuery {
    /// The requested point, or `None` when neither coordinate was given.
    fn coordinate(&self) -> Result<Option<Coordinate>, AppError> {
        match (self.lat, self.lon) {
            (None, None) => Ok(None),
            (Some(lat), Some(lon)) => {
                let point = Coordinate::new(lat, lon);
                if point.is_valid() {
                    Ok(Some(point))
                } else {
                    Err(AppError::BadRequest(format!(
                        "coordinate {point} is out of range"
                    )))
                }
            }
            _ => Err(AppError::BadRequest(
                "lat and lon must be supplied together".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShelterListQuery {
    pub(crate) kind: Option<ShelterKind>,
    #[serde(default)]
    pub(crate) active_only: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub(crate) min_available: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct CapacityChange {
    pub(crate) count: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CapacityView {
    pub(crate) shelter_id: String,
    pub(crate) total: u32,
    pub(crate) current: u32,
    pub(crate) available: u32,
    pub(crate) occupancy_percent: f64,
}

impl CapacityView {
    fn new(shelter_id: String, capacity: Capacity) -> Self {
        Self {
            shelter_id,
            total: capacity.total(),
            current: capacity.current(),
            available: capacity.available(),
            occupancy_percent: capacity.occupancy_percent(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationUpdate {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationFeed {
    pub(crate) unread_count: usize,
    pub(crate) notifications: Vec<Notification>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IncidentQuery {
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarQuery {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

pub(crate) async fn overview_handler(State(engine): State<SharedEngine>) -> Json<SituationOverview> {
    Json(engine.overview(Utc::now()))
}

pub(crate) async fn location_handler(State(engine): State<SharedEngine>) -> Json<Location> {
    Json(engine.location.current())
}

pub(crate) async fn update_location_handler(
    State(engine): State<SharedEngine>,
    Json(update): Json<LocationUpdate>,
) -> Result<Json<Location>, AppError> {
    let point = Coordinate::new(update.latitude, update.longitude);
    if !point.is_valid() {
        return Err(AppError::BadRequest(format!(
            "coordinate {point} is out of range"
        )));
    }
    engine.location.set_current(point);
    Ok(Json(engine.location.current()))
}

/// Active hazards; filtered spatially when `lat`/`lon` are supplied.
pub(crate) async fn active_hazards_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<PointQuery>,
) -> Result<Json<Vec<Hazard>>, AppError> {
    let now = Utc::now();
    let hazards = match query.coordinate()? {
        Some(point) => {
            let radius = query
                .radius_km
                .unwrap_or(engine.config().hazard_search_radius_km);
            engine.risks.active_near(point, radius, now)
        }
        None => engine.risks.active_now(now),
    };
    Ok(Json(hazards))
}

pub(crate) async fn hazard_statistics_handler(
    State(engine): State<SharedEngine>,
) -> Json<HazardStatistics> {
    Json(engine.risks.statistics(Utc::now()))
}

pub(crate) async fn hazard_handler(
    State(engine): State<SharedEngine>,
    Path(hazard_id): Path<String>,
) -> Result<Json<Hazard>, AppError> {
    engine
        .risks
        .get(&hazard_id)
        .map(Json)
        .ok_or(AppError::NotFound {
            resource: "hazard",
            id: hazard_id,
        })
}

pub(crate) async fn hazard_instructions_handler(
    State(engine): State<SharedEngine>,
    Path(hazard_id): Path<String>,
) -> Result<Json<Vec<Instruction>>, AppError> {
    let hazard = engine.risks.get(&hazard_id).ok_or(AppError::NotFound {
        resource: "hazard",
        id: hazard_id,
    })?;
    Ok(Json(engine.instructions.guidance_for(&hazard)))
}

pub(crate) async fn shelters_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<ShelterListQuery>,
) -> Json<Vec<Shelter>> {
    let shelters = match query.kind {
        Some(kind) => engine.shelters.by_type(kind),
        None => engine.shelters.all(),
    };
    let shelters = shelters
        .into_iter()
        .filter(|shelter| !query.active_only || shelter.is_active)
        .collect();
    Json(shelters)
}

/// Nearest active shelters; defaults to the subject's location.
pub(crate) async fn nearest_shelters_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<PointQuery>,
) -> Result<Json<Vec<RankedShelter>>, AppError> {
    let from = query
        .coordinate()?
        .unwrap_or_else(|| engine.location.current().coordinate);
    let limit = query
        .limit
        .unwrap_or(engine.config().overview_shelter_limit);
    Ok(Json(engine.shelters.nearest(from, limit)))
}

pub(crate) async fn available_shelters_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<AvailabilityQuery>,
) -> Json<Vec<Shelter>> {
    Json(engine.shelters.with_capacity(query.min_available.unwrap_or(1)))
}

pub(crate) async fn shelter_handler(
    State(engine): State<SharedEngine>,
    Path(shelter_id): Path<String>,
) -> Result<Json<Shelter>, AppError> {
    engine
        .shelters
        .get(&shelter_id)
        .map(Json)
        .ok_or(AppError::NotFound {
            resource: "shelter",
            id: shelter_id,
        })
}

pub(crate) async fn occupy_handler(
    State(engine): State<SharedEngine>,
    Path(shelter_id): Path<String>,
    Json(change): Json<CapacityChange>,
) -> Result<Json<CapacityView>, AppError> {
    match engine.shelters.occupy(&shelter_id, change.count)? {
        Some(capacity) => Ok(Json(CapacityView::new(shelter_id, capacity))),
        None => Err(AppError::NotFound {
            resource: "shelter",
            id: shelter_id,
        }),
    }
}

pub(crate) async fn release_handler(
    State(engine): State<SharedEngine>,
    Path(shelter_id): Path<String>,
    Json(change): Json<CapacityChange>,
) -> Result<Json<CapacityView>, AppError> {
    match engine.shelters.release(&shelter_id, change.count)? {
        Some(capacity) => Ok(Json(CapacityView::new(shelter_id, capacity))),
        None => Err(AppError::NotFound {
            resource: "shelter",
            id: shelter_id,
        }),
    }
}

pub(crate) async fn notifications_handler(
    State(engine): State<SharedEngine>,
) -> Json<NotificationFeed> {
    Json(NotificationFeed {
        unread_count: engine.notifications.unread_count(),
        notifications: engine.notifications.all(),
    })
}

pub(crate) async fn unread_notifications_handler(
    State(engine): State<SharedEngine>,
) -> Json<Vec<Notification>> {
    Json(engine.notifications.unread())
}

pub(crate) async fn add_notification_handler(
    State(engine): State<SharedEngine>,
    Json(draft): Json<NotificationDraft>,
) -> Response {
    let notification = engine.notifications.add(draft);
    (StatusCode::CREATED, Json(notification)).into_response()
}

pub(crate) async fn mark_read_handler(
    State(engine): State<SharedEngine>,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if engine.notifications.mark_read(&notification_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound {
            resource: "notification",
            id: notification_id,
        })
    }
}

pub(crate) async fn mark_all_read_handler(State(engine): State<SharedEngine>) -> Response {
    let marked = engine.notifications.mark_all_read();
    (StatusCode::OK, Json(json!({ "marked": marked }))).into_response()
}

pub(crate) async fn delete_notification_handler(
    State(engine): State<SharedEngine>,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, AppError> {
    if engine.notifications.delete(&notification_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound {
            resource: "notification",
            id: notification_id,
        })
    }
}

pub(crate) async fn incidents_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<IncidentQuery>,
) -> Json<Vec<Incident>> {
    let incidents = match query.date {
        Some(date) => engine.incidents.on_date(date),
        None => engine.incidents.active(),
    };
    Json(incidents)
}

pub(crate) async fn incident_calendar_handler(
    State(engine): State<SharedEngine>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<BTreeMap<u32, Vec<IncidentMarker>>>, AppError> {
    if !(1..=12).contains(&query.month) {
        return Err(AppError::BadRequest(format!(
            "month {} must be between 1 and 12",
            query.month
        )));
    }
    Ok(Json(engine.incidents.month_calendar(query.year, query.month)))
}
