use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use super::{SituationSource, SourceError};
use crate::geo::Coordinate;
use crate::hazards::{Hazard, HazardKind, HazardLevel, HazardZone};
use crate::incidents::{Incident, IncidentLocation};
use crate::instructions::{
    ChecklistItem, Difficulty, Instruction, InstructionCategory, InstructionStep,
};
use crate::notifications::{Notification, NotificationType};
use crate::shelters::{
    Capacity, Shelter, ShelterAmenities, ShelterContact, ShelterKind, ShelterLocation,
};

/// Built-in demonstration data centred on Moscow.
///
/// Timestamps are derived from the instant the source was created so the
/// data always looks current.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    loaded_at: DateTime<Utc>,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl FixtureSource {
    pub fn at(loaded_at: DateTime<Utc>) -> Self {
        Self { loaded_at }
    }

    fn shelter(
        &self,
        id: &str,
        name: &str,
        kind: ShelterKind,
        location: ShelterLocation,
        capacity: Capacity,
    ) -> Shelter {
        Shelter {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            location,
            capacity,
            amenities: ShelterAmenities::default(),
            contact: ShelterContact::default(),
            is_active: true,
            last_verified: self.loaded_at,
            notes: None,
            images: Vec::new(),
        }
    }

    fn incident(&self, id: &str, day: u32, kind: HazardKind, severity: HazardLevel) -> Option<Incident> {
        let date = NaiveDate::from_ymd_opt(self.loaded_at.year(), self.loaded_at.month(), day)?;
        let reported_at = date.and_hms_opt(10, 0, 0)?.and_utc();
        Some(Incident {
            id: id.to_string(),
            title: format!("{} reported", kind.label()),
            description: String::new(),
            kind,
            severity,
            location: IncidentLocation {
                coordinate: Coordinate::new(55.7558, 37.6173),
                address: "Moscow".to_string(),
                region: "Moscow Oblast".to_string(),
            },
            is_active: date >= self.loaded_at.date_naive(),
            incident_date: date,
            reported_at,
            resolved_at: None,
            affected_count: 0,
            casualties: 0,
            damage_estimate: None,
            related_hazards: Vec::new(),
        })
    }
}

impl SituationSource for FixtureSource {
    fn load_hazards(&self) -> Result<Vec<Hazard>, SourceError> {
        let moscow = Coordinate::new(55.7558, 37.6173);
        Ok(vec![
            Hazard {
                id: "risk_1".to_string(),
                kind: HazardKind::Flood,
                level: HazardLevel::Medium,
                title: "Flood watch".to_string(),
                description: "River levels across the region may rise".to_string(),
                zone: HazardZone::circle(moscow, 25.0),
                active_from: None,
                active_until: None,
                instructions: vec![
                    "Prepare an emergency go-bag".to_string(),
                    "Move valuables to upper floors".to_string(),
                    "Follow EMERCOM announcements".to_string(),
                ],
                evacuation_required: false,
                source: "Roshydromet".to_string(),
                created_at: self.loaded_at,
                updated_at: self.loaded_at,
            },
            Hazard {
                id: "risk_2".to_string(),
                kind: HazardKind::Heat,
                level: HazardLevel::Low,
                title: "Abnormal heat".to_string(),
                description: "Temperatures up to +35°C expected".to_string(),
                zone: HazardZone::circle(moscow, 100.0),
                active_from: None,
                active_until: None,
                instructions: vec![
                    "Avoid long exposure to the sun".to_string(),
                    "Drink more water".to_string(),
                    "Wear a hat".to_string(),
                ],
                evacuation_required: false,
                source: "Roshydromet".to_string(),
                created_at: self.loaded_at - Duration::minutes(30),
                updated_at: self.loaded_at - Duration::minutes(30),
            },
        ])
    }

    fn load_shelters(&self) -> Result<Vec<Shelter>, SourceError> {
        let invalid = |id: &str, err: crate::shelters::CapacityViolation| SourceError::InvalidRecord {
            path: "fixtures".into(),
            id: id.to_string(),
            reason: err.to_string(),
        };

        let mut school = self.shelter(
            "shelter_1",
            "School No. 564, building 5",
            ShelterKind::Shelter,
            ShelterLocation {
                coordinate: Coordinate::new(55.758, 37.620),
                address: "10 Primernaya St".to_string(),
                floor: None,
            },
            Capacity::new(200, 45).map_err(|err| invalid("shelter_1", err))?,
        );
        school.amenities.medical = true;
        school.amenities.food = true;
        school.contact.phone = Some("+7 (495) 123-45-67".to_string());

        let mut bunker = self.shelter(
            "shelter_2",
            "Civil defence bunker No. 12",
            ShelterKind::Bunker,
            ShelterLocation {
                coordinate: Coordinate::new(55.755, 37.618),
                address: "5 Bezopasnaya St".to_string(),
                floor: Some(-2),
            },
            Capacity::empty(500),
        );
        bunker.amenities.medical = true;
        bunker.amenities.food = true;
        bunker.contact.phone = Some("+7 (495) 987-65-43".to_string());

        let mut evacuation = self.shelter(
            "shelter_3",
            "Evacuation point No. 3",
            ShelterKind::EvacuationPoint,
            ShelterLocation {
                coordinate: Coordinate::new(55.760, 37.625),
                address: "25 Mira Ave".to_string(),
                floor: None,
            },
            Capacity::new(150, 20).map_err(|err| invalid("shelter_3", err))?,
        );
        evacuation.contact.phone = Some("+7 (495) 111-22-33".to_string());

        Ok(vec![school, bunker, evacuation])
    }

    fn load_notifications(&self) -> Option<Result<Vec<Notification>, SourceError>> {
        Some(Ok(vec![Notification {
            id: "notif_1".to_string(),
            title: "Weather warning".to_string(),
            message: "Strong wind expected tomorrow. Take care!".to_string(),
            kind: NotificationType::Warning,
            is_read: false,
            created_at: self.loaded_at,
            action_url: None,
            action_label: None,
        }]))
    }

    fn load_incidents(&self) -> Option<Result<Vec<Incident>, SourceError>> {
        let calendar = [
            ("incident_14", 14, HazardKind::Flood, HazardLevel::Medium),
            ("incident_20", 20, HazardKind::Fire, HazardLevel::High),
            ("incident_21", 21, HazardKind::Storm, HazardLevel::Low),
            ("incident_27", 27, HazardKind::Technogenic, HazardLevel::Medium),
            ("incident_28", 28, HazardKind::Heat, HazardLevel::Low),
        ];

        Some(Ok(calendar
            .into_iter()
            .filter_map(|(id, day, kind, severity)| self.incident(id, day, kind, severity))
            .collect()))
    }

    fn load_instructions(&self) -> Option<Result<Vec<Instruction>, SourceError>> {
        Some(Ok(vec![Instruction {
            id: "instr_flood".to_string(),
            title: "Preparing for a flood".to_string(),
            category: InstructionCategory::Preparation,
            hazard_kind: Some(HazardKind::Flood),
            summary: "What to do before water levels rise".to_string(),
            steps: vec![
                InstructionStep {
                    order: 1,
                    title: "Pack a go-bag".to_string(),
                    description: "Documents, medicine, water and a torch".to_string(),
                    image: None,
                    is_critical: true,
                },
                InstructionStep {
                    order: 2,
                    title: "Secure the home".to_string(),
                    description: "Switch off gas and power, move valuables upstairs".to_string(),
                    image: None,
                    is_critical: false,
                },
            ],
            checklist: vec![
                ChecklistItem {
                    step: "Documents in a waterproof bag".to_string(),
                    completed: false,
                },
                ChecklistItem {
                    step: "Three days of drinking water".to_string(),
                    completed: false,
                },
            ],
            difficulty: Difficulty::Easy,
            estimated_minutes: Some(30),
            priority: 10,
        }]))
    }

    fn describe(&self) -> String {
        "built-in fixtures".to_string()
    }
}
