use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::geo::Coordinate;
use crate::hazards::domain::{Hazard, HazardKind, HazardLevel, HazardZone};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

pub(super) fn hazard(id: &str, kind: HazardKind, level: HazardLevel) -> Hazard {
    let created = now() - Duration::hours(6);
    Hazard {
        id: id.to_string(),
        kind,
        level,
        title: format!("{} advisory", kind.label()),
        description: String::new(),
        zone: HazardZone::circle(Coordinate::new(55.7558, 37.6173), 25.0),
        active_from: None,
        active_until: None,
        instructions: vec!["Follow official announcements".to_string()],
        evacuation_required: false,
        source: "EMERCOM".to_string(),
        created_at: created,
        updated_at: created,
    }
}

pub(super) fn centered(mut hazard: Hazard, center: Coordinate, radius_km: f64) -> Hazard {
    hazard.zone = HazardZone::circle(center, radius_km);
    hazard
}

pub(super) fn created(mut hazard: Hazard, at: DateTime<Utc>) -> Hazard {
    hazard.created_at = at;
    hazard.updated_at = at;
    hazard
}

pub(super) fn window(
    mut hazard: Hazard,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Hazard {
    hazard.active_from = from;
    hazard.active_until = until;
    hazard
}
