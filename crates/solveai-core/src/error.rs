//! Error types for `solveai-core`.

use thiserror::Error;

use crate::analysis::ConceptId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("problem description is empty")]
  EmptyProblem,

  #[error("concept count {0} is outside 1..=6")]
  InvalidConceptCount(u8),

  #[error("analysis has an empty problem summary")]
  EmptySummary,

  #[error("analysis contains concept id {0} more than once")]
  DuplicateConceptId(ConceptId),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
