use crate::infra::situation_source;
use chrono::Utc;
use civil_watch::alarm::AlarmSwitch;
use civil_watch::config::AppConfig;
use civil_watch::error::AppError;
use civil_watch::geo::Coordinate;
use civil_watch::{SituationEngine, SituationOverview};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct OverviewArgs {
    /// Latitude of the position to inspect (defaults to the configured location)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the position to inspect
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub(crate) lon: Option<f64>,
    /// Directory holding hazards.csv and shelters.csv (overrides DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Maximum number of shelters to list
    #[arg(long)]
    pub(crate) shelters: Option<usize>,
}

pub(crate) fn run_overview(args: OverviewArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.data_dir {
        config.feeds.data_dir = Some(dir);
    }
    if let Some(limit) = args.shelters {
        config.situation.overview_shelter_limit = limit;
    }

    let source = situation_source(&config.feeds);
    let engine = SituationEngine::try_from_source(
        config.situation.clone(),
        Arc::new(AlarmSwitch::global()),
        source.as_ref(),
    )?;

    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let point = Coordinate::new(lat, lon);
        if !point.is_valid() {
            return Err(AppError::BadRequest(format!(
                "coordinate {point} is out of range"
            )));
        }
        engine.location.set_current(point);
    }

    render_overview(&engine.overview(Utc::now()));
    Ok(())
}

pub(crate) fn render_overview(overview: &SituationOverview) {
    println!("Situational overview");
    println!(
        "Position: {} (generated {})",
        overview.location.coordinate,
        overview.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    if overview.alarm_raised {
        println!("PUBLIC ALARM RAISED");
    }

    if overview.hazards_nearby.is_empty() {
        println!("\nActive hazards nearby: none");
    } else {
        println!("\nActive hazards nearby");
        for hazard in &overview.hazards_nearby {
            println!(
                "- {} {} [{}]: {}",
                hazard.kind.icon(),
                hazard.title,
                hazard.level.label(),
                hazard.description
            );
            for step in &hazard.instructions {
                println!("    * {step}");
            }
        }
    }

    println!("\nHazard levels");
    for (level, count) in &overview.statistics.by_level {
        println!("- {} ({}): {}", level.label(), level.color(), count);
    }

    if overview.shelters.is_empty() {
        println!("\nShelters in range: none");
    } else {
        println!("\nShelters in range");
        for entry in &overview.shelters {
            let shelter = &entry.ranked.shelter;
            println!(
                "- {} {} ({}), {:.2} km {}, {} of {} places free",
                shelter.kind.icon(),
                shelter.name,
                shelter.kind.label(),
                entry.ranked.distance_km,
                entry.direction.label(),
                shelter.capacity.available(),
                shelter.capacity.total()
            );
        }
    }

    println!("\nUnread notifications: {}", overview.unread_notifications);
}

#[cfg(test)]
mod tests {
    use super::*;
    use civil_watch::sources::SourceError;

    #[test]
    fn overview_fails_when_the_data_directory_is_missing() {
        let args = OverviewArgs {
            data_dir: Some(PathBuf::from("/nonexistent/civil-watch-data")),
            ..OverviewArgs::default()
        };

        let err = run_overview(args).expect_err("missing CSV snapshots");
        assert!(matches!(err, AppError::Source(SourceError::Io { .. })));
    }
}
