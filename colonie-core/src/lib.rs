//! Colonie Core
//!
//! Read-only analytics over a record of robot ethical decisions. A closed
//! catalog of declarative report definitions is evaluated by one generic
//! aggregation engine against snapshots of the four entity collections.
//! This crate has no presentation concerns; callers render the records.

pub mod catalog;
pub mod engine;
pub mod model;
pub mod numbers;
pub mod record;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use catalog::{LawVocabulary, ReportDefinition, ReportId, TIMELINE_CAP, UnknownReport};
pub use engine::{ReportError, evaluate};
pub use model::{
    Action, Dataset, Entity, EntityId, Human, LawPriority, Outcome, Robot, RobotModel, RobotState,
    Scenario, VULNERABILITY_RANK, Vulnerability,
};
pub use numbers::percentage;
pub use record::{Category, Record, Value};
pub use seed::{SeedConfig, generate_dataset};
pub use store::{JsonFileSource, MemorySource, Snapshot, StoreError, StoreSource};

/// Front door for evaluating catalog reports
///
/// Every call acquires its own snapshot from the source and releases it
/// before returning, on success and on failure alike.
#[derive(Debug)]
pub struct ReportEngine<S>
where
    S: StoreSource,
{
    source: S,
}

impl<S> ReportEngine<S>
where
    S: StoreSource,
{
    /// Create a new engine reading from the provided source
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Evaluate one report
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::StoreUnavailable`] when a snapshot cannot be
    /// acquired. An empty store is not an error.
    pub fn evaluate(&self, id: ReportId) -> Result<Vec<Record>, ReportError> {
        let snapshot = self.source.open()?;
        Ok(evaluate(&snapshot, id.definition()))
    }

    /// Evaluate several reports against one snapshot, in the order given
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::StoreUnavailable`] when the snapshot cannot be
    /// acquired.
    pub fn evaluate_many(
        &self,
        ids: &[ReportId],
    ) -> Result<Vec<(ReportId, Vec<Record>)>, ReportError> {
        let snapshot = self.source.open()?;
        Ok(ids
            .iter()
            .map(|id| (*id, evaluate(&snapshot, id.definition())))
            .collect())
    }

    /// Evaluate the whole catalog against one snapshot
    ///
    /// # Errors
    ///
    /// Same as [`ReportEngine::evaluate_many`].
    pub fn evaluate_all(&self) -> Result<Vec<(ReportId, Vec<Record>)>, ReportError> {
        self.evaluate_many(&ReportId::ALL)
    }
}
