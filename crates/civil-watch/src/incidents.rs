//! Reported incidents and the calendar view built from them.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::hazards::{HazardKind, HazardLevel};
use crate::records::first_per_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentLocation {
    pub coordinate: Coordinate,
    pub address: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: HazardKind,
    pub severity: HazardLevel,
    pub location: IncidentLocation,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub incident_date: NaiveDate,
    pub reported_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub affected_count: u32,
    #[serde(default)]
    pub casualties: u32,
    #[serde(default)]
    pub damage_estimate: Option<f64>,
    /// Hazard ids this incident relates to; resolved by callers, not here.
    #[serde(default)]
    pub related_hazards: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// One dot on the incident calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncidentMarker {
    pub kind: HazardKind,
    pub severity: HazardLevel,
}

#[derive(Debug, Default)]
pub struct IncidentLog {
    incidents: RwLock<Vec<Incident>>,
}

impl IncidentLog {
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self {
            incidents: RwLock::new(unique(incidents)),
        }
    }

    pub fn replace(&self, incidents: Vec<Incident>) {
        *self.incidents.write().expect("incident log lock poisoned") = unique(incidents);
    }

    pub fn get(&self, id: &str) -> Option<Incident> {
        let guard = self.incidents.read().expect("incident log lock poisoned");
        guard.iter().find(|incident| incident.id == id).cloned()
    }

    pub fn active(&self) -> Vec<Incident> {
        self.filtered(|incident| incident.is_active)
    }

    /// Incidents dated `date`, most recently reported first.
    pub fn on_date(&self, date: NaiveDate) -> Vec<Incident> {
        let mut incidents = self.filtered(|incident| incident.incident_date == date);
        incidents.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
        incidents
    }

    /// Markers for every day of `year`/`month` that has at least one incident.
    pub fn month_calendar(&self, year: i32, month: u32) -> BTreeMap<u32, Vec<IncidentMarker>> {
        let guard = self.incidents.read().expect("incident log lock poisoned");
        let mut calendar: BTreeMap<u32, Vec<IncidentMarker>> = BTreeMap::new();

        for incident in guard.iter().filter(|incident| {
            incident.incident_date.year() == year && incident.incident_date.month() == month
        }) {
            calendar
                .entry(incident.incident_date.day())
                .or_default()
                .push(IncidentMarker {
                    kind: incident.kind,
                    severity: incident.severity,
                });
        }

        calendar
    }

    fn filtered<P>(&self, predicate: P) -> Vec<Incident>
    where
        P: Fn(&Incident) -> bool,
    {
        let guard = self.incidents.read().expect("incident log lock poisoned");
        guard.iter().filter(|incident| predicate(incident)).cloned().collect()
    }
}

fn unique(incidents: Vec<Incident>) -> Vec<Incident> {
    first_per_id("incidents", incidents, |incident| incident.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn incident(id: &str, date: NaiveDate, kind: HazardKind, severity: HazardLevel) -> Incident {
        Incident {
            id: id.to_string(),
            title: format!("{} report", kind.label()),
            description: String::new(),
            kind,
            severity,
            location: IncidentLocation {
                coordinate: Coordinate::new(55.75, 37.61),
                address: "Tverskaya 1".to_string(),
                region: "Moscow".to_string(),
            },
            is_active: true,
            incident_date: date,
            reported_at: Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap()),
            resolved_at: None,
            affected_count: 0,
            casualties: 0,
            damage_estimate: None,
            related_hazards: Vec::new(),
        }
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).expect("valid date")
    }

    #[test]
    fn month_calendar_groups_markers_by_day() {
        let mut resolved = incident("i-3", day(20), HazardKind::Fire, HazardLevel::High);
        resolved.is_active = false;
        let log = IncidentLog::new(vec![
            incident("i-1", day(14), HazardKind::Flood, HazardLevel::Medium),
            resolved,
            incident("i-4", day(20), HazardKind::Storm, HazardLevel::Low),
            incident(
                "other-month",
                NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
                HazardKind::Heat,
                HazardLevel::Low,
            ),
        ]);

        let calendar = log.month_calendar(2025, 1);
        assert_eq!(calendar.keys().copied().collect::<Vec<_>>(), vec![14, 20]);
        assert_eq!(calendar[&20].len(), 2);
        assert_eq!(calendar[&20][0].kind, HazardKind::Fire);
        assert_eq!(log.active().len(), 3);
    }

    #[test]
    fn on_date_lists_latest_reports_first() {
        let mut late = incident("late", day(27), HazardKind::Technogenic, HazardLevel::Medium);
        late.reported_at = late.reported_at + chrono::Duration::hours(5);
        let log = IncidentLog::new(vec![
            incident("early", day(27), HazardKind::Technogenic, HazardLevel::Medium),
            late,
        ]);

        let ids: Vec<String> = log.on_date(day(27)).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["late", "early"]);
        assert!(log.on_date(day(1)).is_empty());
        assert!(log.get("late").is_some());
    }
}
