use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use civil_watch::alarm::AlarmStatus;
use civil_watch::{situation_router, SituationEngine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct AlarmUpdate {
    pub(crate) raised: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct AlarmView {
    pub(crate) raised: bool,
    /// Present only on updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) previous: Option<bool>,
}

pub(crate) fn with_service_routes(engine: Arc<SituationEngine>) -> axum::Router {
    situation_router(engine)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/alarm",
            axum::routing::get(alarm_endpoint).post(update_alarm_endpoint),
        )
        .route(
            "/api/v1/notifications/revision",
            axum::routing::get(feed_revision_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn alarm_endpoint(Extension(state): Extension<AppState>) -> Json<AlarmView> {
    Json(AlarmView {
        raised: state.alarm.is_raised(),
        previous: None,
    })
}

/// External trigger for the public alarm.
pub(crate) async fn update_alarm_endpoint(
    Extension(state): Extension<AppState>,
    Json(update): Json<AlarmUpdate>,
) -> Json<AlarmView> {
    let previous = state.alarm.set(update.raised);
    Json(AlarmView {
        raised: update.raised,
        previous: Some(previous),
    })
}

pub(crate) async fn feed_revision_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({ "revision": state.feed_revision.load(Ordering::Relaxed) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use civil_watch::alarm::AlarmSwitch;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, AtomicU64};

    fn test_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            alarm: Box::leak(Box::new(AlarmSwitch::new())),
            feed_revision: Arc::new(AtomicU64::new(7)),
        }
    }

    #[tokio::test]
    async fn alarm_endpoint_toggles_switch() {
        let state = test_state(true);

        let Json(before) = alarm_endpoint(Extension(state.clone())).await;
        assert!(!before.raised);

        let Json(updated) = update_alarm_endpoint(
            Extension(state.clone()),
            Json(AlarmUpdate { raised: true }),
        )
        .await;
        assert_eq!(
            updated,
            AlarmView {
                raised: true,
                previous: Some(false)
            }
        );
        assert!(state.alarm.is_raised());
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(test_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(test_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn feed_revision_is_exposed() {
        let Json(body) = feed_revision_endpoint(Extension(test_state(true))).await;
        assert_eq!(body["revision"], 7);
    }
}
