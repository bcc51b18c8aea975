use crate::cli::ServeArgs;
use crate::infra::{situation_source, track_feed_revision, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use civil_watch::alarm::AlarmSwitch;
use civil_watch::config::AppConfig;
use civil_watch::error::AppError;
use civil_watch::sources::SituationSource;
use civil_watch::telemetry;
use civil_watch::SituationEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let alarm = AlarmSwitch::global();
    let source = situation_source(&config.feeds);
    let engine = Arc::new(SituationEngine::try_from_source(
        config.situation.clone(),
        Arc::new(alarm),
        source.as_ref(),
    )?);

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        alarm,
        feed_revision: track_feed_revision(&engine.notifications),
    };

    spawn_hazard_poller(
        Arc::clone(&engine),
        source,
        config.feeds.hazard_refresh_interval(),
    );

    let app = with_service_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "situational data service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Re-pull hazards on a fixed period; shelters and the rest only load at startup.
fn spawn_hazard_poller(
    engine: Arc<SituationEngine>,
    source: Arc<dyn SituationSource>,
    period: Duration,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick fires immediately and startup already loaded hazards
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Some(count) = engine.refresh_hazards(source.as_ref()) {
                debug!(count, "hazard feed polled");
            }
        }
    });
}
