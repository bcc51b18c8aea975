use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Kind of protective facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelterKind {
    Bunker,
    Shelter,
    EvacuationPoint,
    TemporaryHousing,
    Medical,
    #[serde(other)]
    Unknown,
}

impl ShelterKind {
    pub fn label(self) -> &'static str {
        match self {
            ShelterKind::Bunker => "Civil defence bunker",
            ShelterKind::Shelter => "Shelter",
            ShelterKind::EvacuationPoint => "Evacuation point",
            ShelterKind::TemporaryHousing => "Temporary housing",
            ShelterKind::Medical => "Medical station",
            ShelterKind::Unknown => "Facility",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ShelterKind::Bunker => "🏛️",
            ShelterKind::Shelter => "🏠",
            ShelterKind::EvacuationPoint => "🚩",
            ShelterKind::TemporaryHousing => "🏕️",
            ShelterKind::Medical => "🏥",
            ShelterKind::Unknown => "📍",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bunker" => ShelterKind::Bunker,
            "shelter" => ShelterKind::Shelter,
            "evacuation_point" => ShelterKind::EvacuationPoint,
            "temporary_housing" => ShelterKind::TemporaryHousing,
            "medical" => ShelterKind::Medical,
            _ => ShelterKind::Unknown,
        }
    }
}

/// Rejected change to a shelter's occupancy counter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityViolation {
    #[error("occupancy {current} exceeds capacity {total}")]
    OverCapacity { current: u32, total: u32 },
    #[error("cannot admit {requested} people: only {available} places left")]
    Exceeded { requested: u32, available: u32 },
    #[error("cannot release {requested} people: only {current} present")]
    Underflow { requested: u32, current: u32 },
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawCapacity {
    total: u32,
    #[serde(default)]
    current: u32,
}

/// Occupancy counters; `current <= total` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCapacity")]
pub struct Capacity {
    total: u32,
    current: u32,
}

impl TryFrom<RawCapacity> for Capacity {
    type Error = CapacityViolation;

    fn try_from(raw: RawCapacity) -> Result<Self, Self::Error> {
        Capacity::new(raw.total, raw.current)
    }
}

impl Capacity {
    pub fn new(total: u32, current: u32) -> Result<Self, CapacityViolation> {
        if current > total {
            return Err(CapacityViolation::OverCapacity { current, total });
        }
        Ok(Self { total, current })
    }

    pub fn empty(total: u32) -> Self {
        Self { total, current: 0 }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn available(&self) -> u32 {
        self.total - self.current
    }

    pub fn occupancy_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.total) * 100.0
    }

    /// Admit `count` people, failing without change if that overfills the shelter.
    pub fn occupy(&mut self, count: u32) -> Result<(), CapacityViolation> {
        let available = self.available();
        if count > available {
            return Err(CapacityViolation::Exceeded {
                requested: count,
                available,
            });
        }
        self.current += count;
        Ok(())
    }

    /// Discharge `count` people, failing without change on underflow.
    pub fn release(&mut self, count: u32) -> Result<(), CapacityViolation> {
        if count > self.current {
            return Err(CapacityViolation::Underflow {
                requested: count,
                current: self.current,
            });
        }
        self.current -= count;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterLocation {
    pub coordinate: Coordinate,
    pub address: String,
    /// Negative floors are underground.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelterAmenities {
    pub accessible: bool,
    pub medical: bool,
    pub food: bool,
    pub water: bool,
    pub power: bool,
    pub communication: bool,
}

impl Default for ShelterAmenities {
    fn default() -> Self {
        Self {
            accessible: true,
            medical: false,
            food: false,
            water: true,
            power: true,
            communication: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelterContact {
    pub phone: Option<String>,
    pub responsible_person: Option<String>,
    /// `None` means the facility is staffed around the clock.
    pub working_hours: Option<String>,
}

/// A capacity-bounded safe location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: String,
    pub name: String,
    pub kind: ShelterKind,
    pub location: ShelterLocation,
    pub capacity: Capacity,
    #[serde(default)]
    pub amenities: ShelterAmenities,
    #[serde(default)]
    pub contact: ShelterContact,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub last_verified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl Shelter {
    pub fn summary(&self) -> ShelterSummary {
        ShelterSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            address: self.location.address.clone(),
            capacity_available: self.capacity.available(),
            is_active: self.is_active,
        }
    }
}

/// Compact listing row for shelter pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterSummary {
    pub id: String,
    pub name: String,
    pub kind: ShelterKind,
    pub address: String,
    pub capacity_available: u32,
    pub is_active: bool,
}
