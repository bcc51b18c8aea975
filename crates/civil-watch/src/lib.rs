//! Situational data engine for civil-protection clients.
//!
//! Registries for hazards, shelters, incidents, instructions and
//! notifications, the geodesy they share, and an HTTP router exposing them.

pub mod alarm;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod hazards;
pub mod incidents;
pub mod instructions;
pub mod notifications;
mod records;
pub mod router;
pub mod shelters;
pub mod sources;
pub mod telemetry;

pub use engine::{RefreshReport, ShelterDirections, SituationEngine, SituationOverview};
pub use router::situation_router;
