use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Category of danger a hazard record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Flood,
    Fire,
    Earthquake,
    Storm,
    Heat,
    Cold,
    Technogenic,
    Epidemic,
    Radiation,
    Chemical,
    /// Any value a feed sends that this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl HazardKind {
    pub fn label(self) -> &'static str {
        match self {
            HazardKind::Flood => "Flood",
            HazardKind::Fire => "Fire",
            HazardKind::Earthquake => "Earthquake",
            HazardKind::Storm => "Storm",
            HazardKind::Heat => "Extreme heat",
            HazardKind::Cold => "Extreme cold",
            HazardKind::Technogenic => "Industrial accident",
            HazardKind::Epidemic => "Epidemic",
            HazardKind::Radiation => "Radiation threat",
            HazardKind::Chemical => "Chemical threat",
            HazardKind::Unknown => "Unknown",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            HazardKind::Flood => "🌊",
            HazardKind::Fire => "🔥",
            HazardKind::Earthquake => "🌋",
            HazardKind::Storm => "🌪️",
            HazardKind::Heat => "☀️",
            HazardKind::Cold => "❄️",
            HazardKind::Epidemic => "🦠",
            HazardKind::Radiation => "☢️",
            HazardKind::Chemical => "☣️",
            HazardKind::Technogenic | HazardKind::Unknown => "⚠️",
        }
    }

    /// Lenient parse used at collaborator boundaries such as CSV imports.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "flood" => HazardKind::Flood,
            "fire" => HazardKind::Fire,
            "earthquake" => HazardKind::Earthquake,
            "storm" => HazardKind::Storm,
            "heat" => HazardKind::Heat,
            "cold" => HazardKind::Cold,
            "technogenic" => HazardKind::Technogenic,
            "epidemic" => HazardKind::Epidemic,
            "radiation" => HazardKind::Radiation,
            "chemical" => HazardKind::Chemical,
            _ => HazardKind::Unknown,
        }
    }
}

/// Severity, ordered from least to most dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl HazardLevel {
    pub const ALL: [HazardLevel; 4] = [
        HazardLevel::Low,
        HazardLevel::Medium,
        HazardLevel::High,
        HazardLevel::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HazardLevel::Low => "low",
            HazardLevel::Medium => "medium",
            HazardLevel::High => "high",
            HazardLevel::Critical => "critical",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            HazardLevel::Low => "#4CAF50",
            HazardLevel::Medium => "#FFC107",
            HazardLevel::High => "#FF9800",
            HazardLevel::Critical => "#F44336",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(HazardLevel::Low),
            "medium" => Some(HazardLevel::Medium),
            "high" => Some(HazardLevel::High),
            "critical" => Some(HazardLevel::Critical),
            _ => None,
        }
    }
}

/// Circular area a hazard applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub center: Coordinate,
    pub radius_km: f64,
    /// Outline supplied by some feeds; kept for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Coordinate>>,
}

impl HazardZone {
    pub fn circle(center: Coordinate, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            polygon: None,
        }
    }
}

/// A time-windowed, geo-zoned danger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: String,
    pub kind: HazardKind,
    pub level: HazardLevel,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub zone: HazardZone,
    #[serde(default)]
    pub active_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub evacuation_required: bool,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hazard {
    /// Inclusive check against the optional activity window.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.active_from.map_or(true, |from| now >= from);
        let not_ended = self.active_until.map_or(true, |until| now <= until);
        started && not_ended
    }
}
