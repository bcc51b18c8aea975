use super::common::*;
use chrono::Duration;

use crate::geo::Coordinate;
use crate::hazards::{HazardKind, HazardLevel, RiskRegistry};

const MOSCOW: Coordinate = Coordinate::new(55.7558, 37.6173);
const TVER: Coordinate = Coordinate::new(56.8587, 35.9176);
const ST_PETERSBURG: Coordinate = Coordinate::new(59.9343, 30.3351);

#[test]
fn active_now_excludes_expired_and_future_hazards() {
    let now = now();
    let registry = RiskRegistry::new(vec![
        hazard("open", HazardKind::Heat, HazardLevel::Low),
        window(
            hazard("expired", HazardKind::Flood, HazardLevel::High),
            None,
            Some(now - Duration::minutes(1)),
        ),
        window(
            hazard("pending", HazardKind::Storm, HazardLevel::Medium),
            Some(now + Duration::hours(2)),
            None,
        ),
        window(
            hazard("bounded", HazardKind::Fire, HazardLevel::Critical),
            Some(now - Duration::hours(1)),
            Some(now + Duration::hours(1)),
        ),
    ]);

    let ids: Vec<String> = registry
        .active_now(now)
        .into_iter()
        .map(|hazard| hazard.id)
        .collect();
    assert_eq!(ids, vec!["open".to_string(), "bounded".to_string()]);
}

#[test]
fn active_now_orders_newest_first_and_keeps_feed_order_on_ties() {
    let now = now();
    let registry = RiskRegistry::new(vec![
        created(
            hazard("older", HazardKind::Cold, HazardLevel::Low),
            now - Duration::days(2),
        ),
        created(
            hazard("tie-a", HazardKind::Fire, HazardLevel::High),
            now - Duration::hours(1),
        ),
        created(
            hazard("newest", HazardKind::Storm, HazardLevel::Medium),
            now - Duration::minutes(5),
        ),
        created(
            hazard("tie-b", HazardKind::Flood, HazardLevel::High),
            now - Duration::hours(1),
        ),
    ]);

    let ids: Vec<String> = registry
        .active_now(now)
        .into_iter()
        .map(|hazard| hazard.id)
        .collect();
    assert_eq!(ids, vec!["newest", "tie-a", "tie-b", "older"]);
}

#[test]
fn active_near_keeps_hazards_whose_zone_meets_the_query_circle() {
    let now = now();
    let registry = RiskRegistry::new(vec![
        centered(hazard("moscow", HazardKind::Flood, HazardLevel::Medium), MOSCOW, 25.0),
        centered(
            hazard("north", HazardKind::Storm, HazardLevel::High),
            ST_PETERSBURG,
            50.0,
        ),
    ]);

    let near_moscow = registry.active_near(MOSCOW, 10.0, now);
    assert_eq!(near_moscow.len(), 1);
    assert_eq!(near_moscow[0].id, "moscow");

    assert!(registry.active_near(TVER, 10.0, now).is_empty());
    let wide = registry.active_near(TVER, 200.0, now);
    assert_eq!(wide.len(), 1);
    assert_eq!(wide[0].id, "moscow");
}

#[test]
fn active_near_never_returns_inactive_hazards() {
    let now = now();
    let registry = RiskRegistry::new(vec![window(
        centered(hazard("expired", HazardKind::Fire, HazardLevel::High), MOSCOW, 5.0),
        None,
        Some(now - Duration::days(1)),
    )]);

    assert!(registry.active_near(MOSCOW, 100.0, now).is_empty());
}

#[test]
fn statistics_report_every_level_and_only_seen_kinds() {
    let now = now();
    let registry = RiskRegistry::new(vec![
        hazard("a", HazardKind::Flood, HazardLevel::Medium),
        hazard("b", HazardKind::Heat, HazardLevel::Low),
        hazard("c", HazardKind::Flood, HazardLevel::Medium),
        window(
            hazard("d", HazardKind::Chemical, HazardLevel::Critical),
            None,
            Some(now - Duration::hours(3)),
        ),
    ]);

    let stats = registry.statistics(now);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_level.len(), 4);
    assert_eq!(stats.by_level[&HazardLevel::Low], 1);
    assert_eq!(stats.by_level[&HazardLevel::Medium], 2);
    assert_eq!(stats.by_level[&HazardLevel::High], 0);
    assert_eq!(stats.by_level[&HazardLevel::Critical], 0);
    assert_eq!(stats.by_kind.len(), 2);
    assert_eq!(stats.by_kind[&HazardKind::Flood], 2);
    assert!(!stats.by_kind.contains_key(&HazardKind::Chemical));
}

#[test]
fn statistics_serialize_with_snake_case_keys() {
    let registry = RiskRegistry::new(vec![hazard("a", HazardKind::Technogenic, HazardLevel::High)]);
    let value = serde_json::to_value(registry.statistics(now())).expect("serializes");
    assert_eq!(value["by_level"]["high"], 1);
    assert_eq!(value["by_level"]["critical"], 0);
    assert_eq!(value["by_kind"]["technogenic"], 1);
}

#[test]
fn lookups_of_unknown_ids_are_absent() {
    let registry = RiskRegistry::new(vec![hazard("risk_1", HazardKind::Flood, HazardLevel::Low)]);
    assert!(registry.get("risk_1").is_some());
    assert!(registry.get("risk_404").is_none());
}

#[test]
fn replace_swaps_the_full_snapshot() {
    let registry = RiskRegistry::new(vec![hazard("old", HazardKind::Flood, HazardLevel::Low)]);
    registry.replace(vec![
        hazard("new-1", HazardKind::Fire, HazardLevel::High),
        hazard("new-2", HazardKind::Storm, HazardLevel::Medium),
    ]);

    assert_eq!(registry.len(), 2);
    assert!(registry.get("old").is_none());
}

#[test]
fn repeated_ids_keep_the_first_record() {
    let registry = RiskRegistry::default();
    registry.replace(vec![
        hazard("flood", HazardKind::Flood, HazardLevel::High),
        hazard("flood", HazardKind::Flood, HazardLevel::Low),
    ]);

    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.get("flood").map(|hazard| hazard.level),
        Some(HazardLevel::High)
    );
    assert_eq!(registry.statistics(now()).total, 1);
}
