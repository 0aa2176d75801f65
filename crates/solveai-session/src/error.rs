//! Error type for `solveai-session`.

use solveai_core::{analysis::ConceptId, report::ReportId, solver::SolverError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("another request is already in flight")]
  Busy,

  #[error("there is no analysis to save")]
  NothingToSave,

  #[error("no analysis is loaded")]
  NoAnalysis,

  #[error("no concept is selected")]
  NoConceptSelected,

  #[error("concept {0} not found")]
  ConceptNotFound(ConceptId),

  #[error("report {0} not found")]
  ReportNotFound(ReportId),

  #[error("competitors have already been analyzed for this concept")]
  AlreadyAnalyzed,

  #[error("message is empty")]
  EmptyMessage,

  #[error(transparent)]
  Invalid(#[from] solveai_core::Error),

  #[error(transparent)]
  Solver(#[from] SolverError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
