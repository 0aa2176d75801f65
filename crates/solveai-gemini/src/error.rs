//! Error type for `solveai-gemini`.

use solveai_core::solver::SolverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("gemini returned {status}: {message}")]
  Status { status: u16, message: String },

  #[error("gemini returned no text")]
  EmptyResponse,

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("response does not match the analysis schema: {0}")]
  Schema(#[from] solveai_core::Error),
}

impl From<Error> for SolverError {
  fn from(e: Error) -> Self { SolverError::GenerationFailed(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
