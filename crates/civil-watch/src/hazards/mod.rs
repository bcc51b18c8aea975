//! Hazard records and the registry answering "what is dangerous right now, and where".

pub mod domain;
pub mod registry;

#[cfg(test)]
mod tests;

pub use domain::{Hazard, HazardKind, HazardLevel, HazardZone};
pub use registry::{HazardStatistics, RiskRegistry};
