use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use super::Coordinate;

/// Position of the subject, optionally annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Location {
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            address: None,
            city: None,
            region: None,
        }
    }
}

/// Tracks where the subject currently is, falling back to a configured default.
#[derive(Debug)]
pub struct LocationTracker {
    default: Location,
    current: RwLock<Option<Location>>,
}

impl LocationTracker {
    pub fn new(default: Location) -> Self {
        Self {
            default,
            current: RwLock::new(None),
        }
    }

    /// The last reported location, or the default when none was reported.
    pub fn current(&self) -> Location {
        let guard = self.current.read().expect("location lock poisoned");
        guard.clone().unwrap_or_else(|| self.default.clone())
    }

    pub fn set_current(&self, coordinate: Coordinate) {
        let mut guard = self.current.write().expect("location lock poisoned");
        *guard = Some(Location::at(coordinate));
    }

    /// Forget the reported location so the default applies again.
    pub fn reset(&self) {
        let mut guard = self.current.write().expect("location lock poisoned");
        *guard = None;
    }

    pub fn default_location(&self) -> &Location {
        &self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moscow() -> Location {
        Location {
            coordinate: Coordinate::new(55.7558, 37.6173),
            accuracy_m: None,
            address: None,
            city: Some("Moscow".to_string()),
            region: Some("Moscow Oblast".to_string()),
        }
    }

    #[test]
    fn falls_back_to_default_until_set() {
        let tracker = LocationTracker::new(moscow());
        assert_eq!(tracker.current(), moscow());

        tracker.set_current(Coordinate::new(59.9343, 30.3351));
        assert_eq!(tracker.current().coordinate, Coordinate::new(59.9343, 30.3351));
        assert!(tracker.current().city.is_none());

        tracker.reset();
        assert_eq!(tracker.current(), moscow());
    }
}
