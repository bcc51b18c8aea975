use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::{SituationSource, SourceError};
use crate::geo::Coordinate;
use crate::hazards::{Hazard, HazardKind, HazardLevel, HazardZone};
use crate::shelters::{
    Capacity, Shelter, ShelterAmenities, ShelterContact, ShelterKind, ShelterLocation,
};

const HAZARDS_FILE: &str = "hazards.csv";
const SHELTERS_FILE: &str = "shelters.csv";

/// Reads `hazards.csv` and `shelters.csv` from a directory.
///
/// Multi-valued hazard instructions are separated by `|`.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn open(&self, name: &str) -> Result<(PathBuf, File), SourceError> {
        let path = self.root.join(name);
        let file = File::open(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, file))
    }
}

impl SituationSource for CsvDirectorySource {
    fn load_hazards(&self) -> Result<Vec<Hazard>, SourceError> {
        let (path, file) = self.open(HAZARDS_FILE)?;
        parse_hazards(&path, file, Utc::now())
    }

    fn load_shelters(&self) -> Result<Vec<Shelter>, SourceError> {
        let (path, file) = self.open(SHELTERS_FILE)?;
        parse_shelters(&path, file, Utc::now())
    }

    fn describe(&self) -> String {
        format!("csv directory {}", self.root.display())
    }
}

#[derive(Debug, Deserialize)]
struct HazardRow {
    id: String,
    kind: String,
    level: String,
    title: String,
    #[serde(default)]
    description: String,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active_from: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active_until: Option<String>,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    evacuation_required: Option<bool>,
    #[serde(default)]
    source: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShelterRow {
    id: String,
    name: String,
    kind: String,
    latitude: f64,
    longitude: f64,
    address: String,
    #[serde(default)]
    floor: Option<i32>,
    total: u32,
    #[serde(default)]
    current: Option<u32>,
    #[serde(default)]
    accessible: Option<bool>,
    #[serde(default)]
    medical: Option<bool>,
    #[serde(default)]
    food: Option<bool>,
    #[serde(default)]
    water: Option<bool>,
    #[serde(default)]
    power: Option<bool>,
    #[serde(default)]
    communication: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    last_verified: Option<String>,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub(crate) fn parse_hazards<R: Read>(
    path: &Path,
    input: R,
    loaded_at: DateTime<Utc>,
) -> Result<Vec<Hazard>, SourceError> {
    let mut hazards = Vec::new();
    let mut seen = HashSet::new();

    for row in reader(input).deserialize::<HazardRow>() {
        let row = row.map_err(|source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |reason: String| SourceError::InvalidRecord {
            path: path.to_path_buf(),
            id: row.id.clone(),
            reason,
        };
        if !seen.insert(row.id.clone()) {
            return Err(invalid("duplicate id".to_string()));
        }

        let center = Coordinate::new(row.latitude, row.longitude);
        if !center.is_valid() {
            return Err(invalid(format!("coordinate {center} out of range")));
        }
        if !(row.radius_km >= 0.0) {
            return Err(invalid(format!("radius {} must be non-negative", row.radius_km)));
        }
        let level = HazardLevel::parse(&row.level)
            .ok_or_else(|| invalid(format!("unknown level '{}'", row.level)))?;
        let active_from = parse_timestamp(row.active_from.as_deref(), &invalid)?;
        let active_until = parse_timestamp(row.active_until.as_deref(), &invalid)?;
        let created_at = parse_timestamp(row.created_at.as_deref(), &invalid)?.unwrap_or(loaded_at);

        let instructions = row
            .instructions
            .split('|')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();

        hazards.push(Hazard {
            id: row.id.clone(),
            kind: HazardKind::parse(&row.kind),
            level,
            title: row.title.clone(),
            description: row.description.clone(),
            zone: HazardZone::circle(center, row.radius_km),
            active_from,
            active_until,
            instructions,
            evacuation_required: row.evacuation_required.unwrap_or(false),
            source: row.source.clone(),
            created_at,
            updated_at: created_at,
        });
    }

    Ok(hazards)
}

pub(crate) fn parse_shelters<R: Read>(
    path: &Path,
    input: R,
    loaded_at: DateTime<Utc>,
) -> Result<Vec<Shelter>, SourceError> {
    let mut shelters = Vec::new();
    let mut seen = HashSet::new();

    for row in reader(input).deserialize::<ShelterRow>() {
        let row = row.map_err(|source| SourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |reason: String| SourceError::InvalidRecord {
            path: path.to_path_buf(),
            id: row.id.clone(),
            reason,
        };
        if !seen.insert(row.id.clone()) {
            return Err(invalid("duplicate id".to_string()));
        }

        let coordinate = Coordinate::new(row.latitude, row.longitude);
        if !coordinate.is_valid() {
            return Err(invalid(format!("coordinate {coordinate} out of range")));
        }
        let capacity = Capacity::new(row.total, row.current.unwrap_or(0))
            .map_err(|violation| invalid(violation.to_string()))?;
        let last_verified =
            parse_timestamp(row.last_verified.as_deref(), &invalid)?.unwrap_or(loaded_at);

        let defaults = ShelterAmenities::default();
        shelters.push(Shelter {
            id: row.id.clone(),
            name: row.name.clone(),
            kind: ShelterKind::parse(&row.kind),
            location: ShelterLocation {
                coordinate,
                address: row.address.clone(),
                floor: row.floor,
            },
            capacity,
            amenities: ShelterAmenities {
                accessible: row.accessible.unwrap_or(defaults.accessible),
                medical: row.medical.unwrap_or(defaults.medical),
                food: row.food.unwrap_or(defaults.food),
                water: row.water.unwrap_or(defaults.water),
                power: row.power.unwrap_or(defaults.power),
                communication: row.communication.unwrap_or(defaults.communication),
            },
            contact: ShelterContact {
                phone: row.phone.clone(),
                ..ShelterContact::default()
            },
            is_active: row.is_active.unwrap_or(true),
            last_verified,
            notes: None,
            images: Vec::new(),
        });
    }

    Ok(shelters)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp<F>(raw: Option<&str>, invalid: &F) -> Result<Option<DateTime<Utc>>, SourceError>
where
    F: Fn(String) -> SourceError,
{
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| invalid(format!("unparseable timestamp '{value}'")))
}
