use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{Capacity, CapacityViolation, Shelter, ShelterKind};
use crate::geo::{distance_km, Coordinate};
use crate::records::first_per_id;

/// A shelter paired with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedShelter {
    pub shelter: Shelter,
    pub distance_km: f64,
}

/// Owns the shelter list and serializes every capacity change.
#[derive(Debug, Default)]
pub struct ShelterRegistry {
    shelters: RwLock<Vec<Shelter>>,
}

impl ShelterRegistry {
    pub fn new(shelters: Vec<Shelter>) -> Self {
        Self {
            shelters: RwLock::new(unique(shelters)),
        }
    }

    pub fn replace(&self, shelters: Vec<Shelter>) {
        let mut guard = self.shelters.write().expect("shelter registry lock poisoned");
        *guard = unique(shelters);
    }

    pub fn all(&self) -> Vec<Shelter> {
        self.shelters
            .read()
            .expect("shelter registry lock poisoned")
            .clone()
    }

    pub fn active(&self) -> Vec<Shelter> {
        let guard = self.shelters.read().expect("shelter registry lock poisoned");
        guard
            .iter()
            .filter(|shelter| shelter.is_active)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Shelter> {
        let guard = self.shelters.read().expect("shelter registry lock poisoned");
        guard.iter().find(|shelter| shelter.id == id).cloned()
    }

    pub fn by_type(&self, kind: ShelterKind) -> Vec<Shelter> {
        let guard = self.shelters.read().expect("shelter registry lock poisoned");
        guard
            .iter()
            .filter(|shelter| shelter.kind == kind)
            .cloned()
            .collect()
    }

    /// Active shelters with at least `min_available` free places (minimum 1).
    pub fn with_capacity(&self, min_available: u32) -> Vec<Shelter> {
        let min_available = min_available.max(1);
        self.active()
            .into_iter()
            .filter(|shelter| shelter.capacity.available() >= min_available)
            .collect()
    }

    /// Active shelters ranked by distance from `from`, closest first.
    ///
    /// Equal distances keep registry order.
    pub fn nearest(&self, from: Coordinate, limit: usize) -> Vec<RankedShelter> {
        if limit == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<RankedShelter> = self
            .active()
            .into_iter()
            .map(|shelter| {
                let distance_km = distance_km(from, shelter.location.coordinate);
                RankedShelter {
                    shelter,
                    distance_km,
                }
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked.truncate(limit);
        ranked
    }

    /// Active shelters inside `radius_km` of `from`, closest first.
    pub fn within(&self, from: Coordinate, radius_km: f64) -> Vec<RankedShelter> {
        self.nearest(from, usize::MAX)
            .into_iter()
            .take_while(|ranked| ranked.distance_km <= radius_km)
            .collect()
    }

    /// Admit `count` people into a shelter.
    ///
    /// Returns `Ok(None)` when the id is unknown.
    pub fn occupy(&self, id: &str, count: u32) -> Result<Option<Capacity>, CapacityViolation> {
        self.adjust(id, |capacity| capacity.occupy(count))
    }

    /// Discharge `count` people from a shelter.
    pub fn release(&self, id: &str, count: u32) -> Result<Option<Capacity>, CapacityViolation> {
        self.adjust(id, |capacity| capacity.release(count))
    }

    fn adjust<F>(&self, id: &str, change: F) -> Result<Option<Capacity>, CapacityViolation>
    where
        F: FnOnce(&mut Capacity) -> Result<(), CapacityViolation>,
    {
        let mut guard = self.shelters.write().expect("shelter registry lock poisoned");
        let Some(shelter) = guard.iter_mut().find(|shelter| shelter.id == id) else {
            debug!(shelter_id = id, "capacity change for unknown shelter ignored");
            return Ok(None);
        };

        // Work on a copy so a rejected change leaves the stored counters untouched.
        let mut capacity = shelter.capacity;
        if let Err(violation) = change(&mut capacity) {
            warn!(shelter_id = id, %violation, "capacity change rejected");
            return Err(violation);
        }

        shelter.capacity = capacity;
        debug!(
            shelter_id = id,
            current = capacity.current(),
            total = capacity.total(),
            "shelter occupancy updated"
        );
        Ok(Some(capacity))
    }
}

fn unique(shelters: Vec<Shelter>) -> Vec<Shelter> {
    first_per_id("shelters", shelters, |shelter| shelter.id.as_str())
}
