use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Hazard, HazardKind, HazardLevel};
use crate::geo::{distance_km, Coordinate};
use crate::records::first_per_id;

/// Aggregate view over the hazards active at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardStatistics {
    pub total: usize,
    /// Always carries all four severity buckets.
    pub by_level: BTreeMap<HazardLevel, usize>,
    /// Only kinds that occur at least once.
    pub by_kind: BTreeMap<HazardKind, usize>,
}

/// In-memory store of hazard records, refreshed wholesale from a feed.
#[derive(Debug, Default)]
pub struct RiskRegistry {
    hazards: RwLock<Vec<Hazard>>,
}

impl RiskRegistry {
    pub fn new(hazards: Vec<Hazard>) -> Self {
        Self {
            hazards: RwLock::new(unique(hazards)),
        }
    }

    /// Swap the full contents for a fresh feed snapshot. Repeated ids keep the first record.
    pub fn replace(&self, hazards: Vec<Hazard>) {
        let mut guard = self.hazards.write().expect("risk registry lock poisoned");
        *guard = unique(hazards);
    }

    pub fn len(&self) -> usize {
        self.hazards.read().expect("risk registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Hazard> {
        let guard = self.hazards.read().expect("risk registry lock poisoned");
        guard.iter().find(|hazard| hazard.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Hazard> {
        self.hazards
            .read()
            .expect("risk registry lock poisoned")
            .clone()
    }

    /// Hazards whose activity window contains `now`, newest first.
    ///
    /// Records created at the same instant keep their feed order.
    pub fn active_now(&self, now: DateTime<Utc>) -> Vec<Hazard> {
        let guard = self.hazards.read().expect("risk registry lock poisoned");
        let mut active: Vec<Hazard> = guard
            .iter()
            .filter(|hazard| hazard.is_active_at(now))
            .cloned()
            .collect();
        drop(guard);

        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }

    /// Active hazards whose zone is reached by a query circle around `point`.
    pub fn active_near(
        &self,
        point: Coordinate,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> Vec<Hazard> {
        self.active_now(now)
            .into_iter()
            .filter(|hazard| {
                distance_km(point, hazard.zone.center) <= hazard.zone.radius_km + radius_km
            })
            .collect()
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> HazardStatistics {
        let active = self.active_now(now);

        let mut by_level: BTreeMap<HazardLevel, usize> =
            HazardLevel::ALL.iter().map(|level| (*level, 0)).collect();
        let mut by_kind = BTreeMap::new();

        for hazard in &active {
            *by_level.entry(hazard.level).or_insert(0) += 1;
            *by_kind.entry(hazard.kind).or_insert(0) += 1;
        }

        HazardStatistics {
            total: active.len(),
            by_level,
            by_kind,
        }
    }
}

fn unique(hazards: Vec<Hazard>) -> Vec<Hazard> {
    first_per_id("hazards", hazards, |hazard| hazard.id.as_str())
}
