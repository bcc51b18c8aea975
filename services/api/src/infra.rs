use civil_watch::alarm::AlarmSwitch;
use civil_watch::config::FeedConfig;
use civil_watch::notifications::NotificationCenter;
use civil_watch::sources::{CsvDirectorySource, FixtureSource, SituationSource};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) alarm: &'static AlarmSwitch,
    /// Bumped on every notification feed change so pollers can skip refetching.
    pub(crate) feed_revision: Arc<AtomicU64>,
}

/// Pick the data feed: CSV snapshots when a directory is configured, fixtures otherwise.
pub(crate) fn situation_source(feeds: &FeedConfig) -> Arc<dyn SituationSource> {
    match &feeds.data_dir {
        Some(dir) => {
            info!(path = %dir.display(), "loading situational data from CSV snapshots");
            Arc::new(CsvDirectorySource::new(dir.clone()))
        }
        None => {
            info!("DATA_DIR not set; serving built-in demonstration data");
            Arc::new(FixtureSource::default())
        }
    }
}

/// Subscribe a counter to the feed; returns the shared revision.
pub(crate) fn track_feed_revision(center: &NotificationCenter) -> Arc<AtomicU64> {
    let revision = Arc::new(AtomicU64::new(0));
    let bumped = Arc::clone(&revision);
    center.subscribe(move || {
        bumped.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });
    revision
}
