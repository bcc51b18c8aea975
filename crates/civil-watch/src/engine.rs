//! Composition root for the situational registries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::alarm::AlarmStatus;
use crate::config::SituationConfig;
use crate::geo::{bearing_deg, direction_name, Direction, Location, LocationTracker};
use crate::hazards::{Hazard, HazardStatistics, RiskRegistry};
use crate::incidents::IncidentLog;
use crate::instructions::InstructionLibrary;
use crate::notifications::NotificationCenter;
use crate::shelters::{RankedShelter, ShelterRegistry};
use crate::sources::{SituationSource, SourceError};

/// Which registries accepted fresh data during a refresh.
///
/// `None` means the registry kept its previous contents, either because the
/// load failed (listed in `failed`) or because the source does not supply it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub hazards: Option<usize>,
    pub shelters: Option<usize>,
    pub notifications: Option<usize>,
    pub incidents: Option<usize>,
    pub instructions: Option<usize>,
    pub failed: Vec<&'static str>,
}

impl RefreshReport {
    /// True when every load the source attempted succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A shelter ranked for the subject, with the compass direction to walk.
#[derive(Debug, Clone, Serialize)]
pub struct ShelterDirections {
    #[serde(flatten)]
    pub ranked: RankedShelter,
    pub bearing_deg: f64,
    pub direction: Direction,
}

/// Everything a dashboard needs for the subject's current position.
#[derive(Debug, Clone, Serialize)]
pub struct SituationOverview {
    pub generated_at: DateTime<Utc>,
    pub location: Location,
    pub alarm_raised: bool,
    pub hazards_nearby: Vec<Hazard>,
    pub statistics: HazardStatistics,
    pub shelters: Vec<ShelterDirections>,
    pub unread_notifications: usize,
}

pub struct SituationEngine {
    config: SituationConfig,
    pub risks: RiskRegistry,
    pub shelters: ShelterRegistry,
    pub notifications: NotificationCenter,
    pub incidents: IncidentLog,
    pub instructions: InstructionLibrary,
    pub location: LocationTracker,
    alarm: Arc<dyn AlarmStatus>,
}

impl SituationEngine {
    pub fn new(config: SituationConfig, alarm: Arc<dyn AlarmStatus>) -> Self {
        let location = LocationTracker::new(config.default_location());
        Self {
            config,
            risks: RiskRegistry::default(),
            shelters: ShelterRegistry::default(),
            notifications: NotificationCenter::default(),
            incidents: IncidentLog::default(),
            instructions: InstructionLibrary::default(),
            location,
            alarm,
        }
    }

    /// Build an engine and fill every registry from `source`; failed loads leave registries empty.
    pub fn from_source(
        config: SituationConfig,
        alarm: Arc<dyn AlarmStatus>,
        source: &dyn SituationSource,
    ) -> Self {
        let engine = Self::new(config, alarm);
        engine.refresh(source);
        engine
    }

    /// Like [`SituationEngine::from_source`], but any failed load is returned instead of logged.
    pub fn try_from_source(
        config: SituationConfig,
        alarm: Arc<dyn AlarmStatus>,
        source: &dyn SituationSource,
    ) -> Result<Self, SourceError> {
        let hazards = source.load_hazards()?;
        let shelters = source.load_shelters()?;
        let notifications = source.load_notifications().transpose()?;
        let incidents = source.load_incidents().transpose()?;
        let instructions = source.load_instructions().transpose()?;

        let engine = Self::new(config, alarm);
        engine.risks.replace(hazards);
        engine.shelters.replace(shelters);
        if let Some(records) = notifications {
            engine.notifications.replace(records);
        }
        if let Some(records) = incidents {
            engine.incidents.replace(records);
        }
        if let Some(records) = instructions {
            engine.instructions.replace(records);
        }

        info!(source = %source.describe(), "situational data loaded");
        Ok(engine)
    }

    pub fn config(&self) -> &SituationConfig {
        &self.config
    }

    pub fn alarm_raised(&self) -> bool {
        self.alarm.is_raised()
    }

    /// Replace every registry whose load succeeds.
    ///
    /// Failed loads keep last-known data. Registries the source does not
    /// supply are left alone.
    pub fn refresh(&self, source: &dyn SituationSource) -> RefreshReport {
        let origin = source.describe();
        let mut failed = Vec::new();

        let hazards = apply(&origin, "hazards", source.load_hazards(), &mut failed, |records| {
            self.risks.replace(records)
        });
        let shelters = apply(&origin, "shelters", source.load_shelters(), &mut failed, |records| {
            self.shelters.replace(records)
        });
        let notifications = source.load_notifications().and_then(|loaded| {
            apply(&origin, "notifications", loaded, &mut failed, |records| {
                self.notifications.replace(records)
            })
        });
        let incidents = source.load_incidents().and_then(|loaded| {
            apply(&origin, "incidents", loaded, &mut failed, |records| {
                self.incidents.replace(records)
            })
        });
        let instructions = source.load_instructions().and_then(|loaded| {
            apply(&origin, "instructions", loaded, &mut failed, |records| {
                self.instructions.replace(records)
            })
        });

        let report = RefreshReport {
            hazards,
            shelters,
            notifications,
            incidents,
            instructions,
            failed,
        };

        info!(source = %origin, complete = report.is_complete(), "situational data refreshed");
        report
    }

    /// Pull hazards only, as the periodic feed poll does.
    pub fn refresh_hazards(&self, source: &dyn SituationSource) -> Option<usize> {
        let mut failed = Vec::new();
        apply(
            &source.describe(),
            "hazards",
            source.load_hazards(),
            &mut failed,
            |records| self.risks.replace(records),
        )
    }

    pub fn hazards_near_subject(&self, now: DateTime<Utc>) -> Vec<Hazard> {
        let subject = self.location.current().coordinate;
        self.risks
            .active_near(subject, self.config.hazard_search_radius_km, now)
    }

    /// Closest active shelters inside the configured search radius.
    pub fn shelters_near_subject(&self, limit: usize) -> Vec<ShelterDirections> {
        let subject = self.location.current().coordinate;
        self.shelters
            .within(subject, self.config.shelter_search_radius_km)
            .into_iter()
            .take(limit)
            .map(|ranked| {
                let bearing = bearing_deg(subject, ranked.shelter.location.coordinate);
                ShelterDirections {
                    ranked,
                    bearing_deg: bearing,
                    direction: direction_name(bearing),
                }
            })
            .collect()
    }

    pub fn overview(&self, now: DateTime<Utc>) -> SituationOverview {
        SituationOverview {
            generated_at: now,
            location: self.location.current(),
            alarm_raised: self.alarm_raised(),
            hazards_nearby: self.hazards_near_subject(now),
            statistics: self.risks.statistics(now),
            shelters: self.shelters_near_subject(self.config.overview_shelter_limit),
            unread_notifications: self.notifications.unread_count(),
        }
    }
}

fn apply<T, F>(
    origin: &str,
    registry: &'static str,
    loaded: Result<Vec<T>, SourceError>,
    failed: &mut Vec<&'static str>,
    store: F,
) -> Option<usize>
where
    F: FnOnce(Vec<T>),
{
    match loaded {
        Ok(records) => {
            let count = records.len();
            store(records);
            Some(count)
        }
        Err(err) => {
            warn!(source = origin, registry, error = %err, "refresh failed; keeping last-known data");
            failed.push(registry);
            None
        }
    }
}
