use thiserror::Error;

use crate::world::{Branch, PopulationId};

/// Recoverable failures of individual operations. None of these abort the
/// simulation loop; a failed effect application is recorded and the turn
/// continues.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("not enough {branch} research points: need {needed}, have {available}")]
    InsufficientResearch {
        branch: Branch,
        needed: f64,
        available: f64,
    },

    #[error("technology '{0}' has already been researched")]
    AlreadyResearched(String),

    #[error("unknown technology '{0}'")]
    UnknownTechnology(String),

    #[error("unknown population group {0}")]
    UnknownPopulation(PopulationId),

    #[error("invalid threshold {threshold} for population '{population}': {reason}")]
    InvalidThreshold {
        population: String,
        threshold: u64,
        reason: String,
    },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}
