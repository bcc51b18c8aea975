//! Collaborators that supply registry contents.
//!
//! Registries never know where their data came from; the engine pulls a full
//! snapshot from a [`SituationSource`] and swaps it in.

mod files;
mod fixtures;

pub use files::CsvDirectorySource;
pub use fixtures::FixtureSource;

use std::path::PathBuf;

use crate::hazards::Hazard;
use crate::incidents::Incident;
use crate::instructions::Instruction;
use crate::notifications::Notification;
use crate::shelters::Shelter;

/// Pull-based supplier of situational records.
///
/// Hazards and shelters are mandatory. The remaining loaders return `None`
/// when the source does not carry that kind of record, and the engine then
/// leaves the matching registry untouched.
pub trait SituationSource: Send + Sync {
    fn load_hazards(&self) -> Result<Vec<Hazard>, SourceError>;

    fn load_shelters(&self) -> Result<Vec<Shelter>, SourceError>;

    fn load_notifications(&self) -> Option<Result<Vec<Notification>, SourceError>> {
        None
    }

    fn load_incidents(&self) -> Option<Result<Vec<Incident>, SourceError>> {
        None
    }

    fn load_instructions(&self) -> Option<Result<Vec<Instruction>, SourceError>> {
        None
    }

    /// Short name used in logs.
    fn describe(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("record {id} in {path} is invalid: {reason}")]
    InvalidRecord {
        path: PathBuf,
        id: String,
        reason: String,
    },
    #[error("source unavailable: {0}")]
    Unavailable(String),
}
