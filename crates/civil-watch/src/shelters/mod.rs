//! Shelters, their occupancy counters, and distance ranking.

pub mod domain;
pub mod registry;

pub use domain::{
    Capacity, CapacityViolation, Shelter, ShelterAmenities, ShelterContact, ShelterKind,
    ShelterLocation, ShelterSummary,
};
pub use registry::{RankedShelter, ShelterRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::thread;

    const SUBJECT: Coordinate = Coordinate::new(55.7558, 37.6173);

    fn shelter(id: &str, kind: ShelterKind, at: Coordinate, total: u32, current: u32) -> Shelter {
        Shelter {
            id: id.to_string(),
            name: format!("Shelter {id}"),
            kind,
            location: ShelterLocation {
                coordinate: at,
                address: "1 Example St".to_string(),
                floor: None,
            },
            capacity: Capacity::new(total, current).expect("valid capacity"),
            amenities: ShelterAmenities::default(),
            contact: ShelterContact::default(),
            is_active: true,
            last_verified: Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            notes: None,
            images: Vec::new(),
        }
    }

    fn registry() -> ShelterRegistry {
        let mut closed = shelter(
            "closed",
            ShelterKind::Shelter,
            Coordinate::new(55.7559, 37.6174),
            80,
            0,
        );
        closed.is_active = false;

        ShelterRegistry::new(vec![
            shelter(
                "school",
                ShelterKind::Shelter,
                Coordinate::new(55.758, 37.620),
                200,
                45,
            ),
            shelter(
                "bunker",
                ShelterKind::Bunker,
                Coordinate::new(55.755, 37.618),
                500,
                0,
            ),
            closed,
            shelter(
                "evac",
                ShelterKind::EvacuationPoint,
                Coordinate::new(55.760, 37.625),
                150,
                148,
            ),
        ])
    }

    #[test]
    fn active_and_by_type_filters() {
        let registry = registry();
        assert_eq!(registry.all().len(), 4);
        assert_eq!(registry.active().len(), 3);

        let shelters = registry.by_type(ShelterKind::Shelter);
        let ids: Vec<&str> = shelters.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["school", "closed"]);
        assert!(registry.by_type(ShelterKind::Medical).is_empty());
    }

    #[test]
    fn with_capacity_only_counts_active_free_places() {
        let registry = registry();
        let roomy: Vec<String> = registry
            .with_capacity(3)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(roomy, vec!["school".to_string(), "bunker".to_string()]);
        assert_eq!(registry.with_capacity(0).len(), 3);
        assert_eq!(registry.with_capacity(1).len(), 3);
    }

    #[test]
    fn nearest_sorts_ascending_and_truncates() {
        let registry = registry();
        let ranked = registry.nearest(SUBJECT, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].shelter.id, "bunker");
        assert_eq!(ranked[1].shelter.id, "school");
        assert!(ranked[0].distance_km <= ranked[1].distance_km);
        assert!(registry.nearest(SUBJECT, 0).is_empty());
        assert_eq!(registry.nearest(SUBJECT, 10).len(), 3);
    }

    #[test]
    fn nearest_keeps_registry_order_for_equal_distances() {
        let spot = Coordinate::new(55.76, 37.63);
        let registry = ShelterRegistry::new(vec![
            shelter("far", ShelterKind::Medical, Coordinate::new(56.0, 38.0), 10, 0),
            shelter("twin-a", ShelterKind::Shelter, spot, 10, 0),
            shelter("twin-b", ShelterKind::Bunker, spot, 10, 0),
        ]);

        let ids: Vec<String> = registry
            .nearest(SUBJECT, 3)
            .into_iter()
            .map(|ranked| ranked.shelter.id)
            .collect();
        assert_eq!(ids, vec!["twin-a", "twin-b", "far"]);
    }

    #[test]
    fn within_applies_search_radius() {
        let registry = registry();
        assert_eq!(registry.within(SUBJECT, 10.0).len(), 3);
        let close = registry.within(SUBJECT, 0.2);
        assert_eq!(close.len(), 1);
        assert_eq!(close[0].shelter.id, "bunker");
    }

    #[test]
    fn occupy_rejects_overflow_and_leaves_counters_unchanged() {
        let registry = registry();
        let err = registry.occupy("evac", 3).expect_err("only two places left");
        assert_eq!(
            err,
            CapacityViolation::Exceeded {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(registry.get("evac").expect("exists").capacity.current(), 148);

        let capacity = registry
            .occupy("evac", 2)
            .expect("fits")
            .expect("known shelter");
        assert_eq!(capacity.available(), 0);
    }

    #[test]
    fn release_rejects_underflow() {
        let registry = registry();
        assert!(registry.release("bunker", 1).is_err());
        let capacity = registry
            .release("school", 45)
            .expect("everyone leaves")
            .expect("known shelter");
        assert_eq!(capacity.current(), 0);
    }

    #[test]
    fn capacity_changes_for_unknown_ids_are_absent() {
        let registry = registry();
        assert_eq!(registry.occupy("missing", 1), Ok(None));
        assert_eq!(registry.release("missing", 1), Ok(None));
    }

    #[test]
    fn concurrent_admissions_never_exceed_total() {
        let registry = Arc::new(ShelterRegistry::new(vec![shelter(
            "gym",
            ShelterKind::TemporaryHousing,
            SUBJECT,
            100,
            0,
        )]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    (0..20)
                        .filter(|_| matches!(registry.occupy("gym", 1), Ok(Some(_))))
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles
            .into_iter()
            .map(|handle| handle.join().expect("worker finished"))
            .sum();

        let capacity = registry.get("gym").expect("exists").capacity;
        assert_eq!(admitted, 100);
        assert_eq!(capacity.current(), 100);
        assert_eq!(capacity.available(), 0);
    }

    #[test]
    fn summary_reports_free_places() {
        let summary = registry().get("school").expect("exists").summary();
        assert_eq!(summary.capacity_available, 155);
        assert_eq!(summary.kind, ShelterKind::Shelter);
    }

    #[test]
    fn repeated_ids_collapse_to_one_shelter() {
        let registry = registry();
        let mut shadow = registry.get("school").expect("exists");
        shadow.capacity = Capacity::empty(10);
        let mut shelters = registry.all();
        shelters.push(shadow);
        registry.replace(shelters);

        let ids: Vec<String> = registry
            .nearest(SUBJECT, 10)
            .into_iter()
            .map(|ranked| ranked.shelter.id)
            .collect();
        assert_eq!(ids, vec!["bunker", "school", "evac"]);

        let capacity = registry
            .occupy("school", 5)
            .expect("fits")
            .expect("known shelter");
        assert_eq!((capacity.total(), capacity.current()), (200, 50));
        assert_eq!(registry.all().len(), 4);
    }
}
