//! The remote solver contract.
//!
//! A solver is a stateless facade over the hosted generative service. Only
//! [`Solver::solve`] and [`Solver::analyze_competitors`] report failure to the
//! caller; the other operations fold failures into an empty or absent result
//! so that nothing the service does can abort a session.

use std::future::Future;

use thiserror::Error;

use crate::{
  analysis::{AnalysisPayload, GeneratedConcept},
  input::ProblemInput,
  report::ChatMessage,
  research::{CompetitorAnalysisResult, GeneratedImage, MarketNiche},
};

/// Failure talking to the solver service.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
  /// Transport, status or schema failure. The detail is for logs; users see
  /// a generic message.
  #[error("generation failed: {0}")]
  GenerationFailed(String),
}

/// Inline text shown in a chat when the service could not be reached.
pub const CHAT_ERROR_REPLY: &str = "Error connecting.";

/// Inline text shown when the service replied with nothing.
pub const CHAT_EMPTY_REPLY: &str = "Error";

/// A conversation about one concept.
pub trait RefinementChat: Send {
  /// Send a user turn and return the reply. Failures come back as inline
  /// error text ([`CHAT_ERROR_REPLY`]) rather than as an `Err`.
  fn send<'a>(&'a mut self, text: &'a str) -> impl Future<Output = String> + Send + 'a;
}

pub trait Solver: Send + Sync {
  type Chat: RefinementChat + 'static;

  /// Produce an analysis for `input`.
  fn solve<'a>(
    &'a self,
    input: &'a ProblemInput,
  ) -> impl Future<Output = Result<AnalysisPayload, SolverError>> + Send + 'a;

  /// A few concrete problems worth solving in `domain`; empty on failure.
  fn suggest_problems<'a>(
    &'a self,
    domain: &'a str,
  ) -> impl Future<Output = Vec<String>> + Send + 'a;

  /// Underserved niches in `domain`; empty on failure.
  fn discover_niches<'a>(
    &'a self,
    domain: &'a str,
  ) -> impl Future<Output = Vec<MarketNiche>> + Send + 'a;

  /// Visualise a concept. `None` means "could not generate", not an error.
  fn generate_image<'a>(
    &'a self,
    prompt: &'a str,
  ) -> impl Future<Output = Option<GeneratedImage>> + Send + 'a;

  /// Open a chat about `concept`, hydrated with the turns already recorded.
  fn open_refinement_chat(
    &self,
    concept: &GeneratedConcept,
    history: &[ChatMessage],
  ) -> Self::Chat;

  /// Research real-world competitors of `concept`. An unparseable answer
  /// yields [`CompetitorAnalysis::failed`](crate::research::CompetitorAnalysis::failed)
  /// rather than an error.
  fn analyze_competitors<'a>(
    &'a self,
    concept: &'a GeneratedConcept,
  ) -> impl Future<Output = Result<CompetitorAnalysisResult, SolverError>> + Send + 'a;
}
