//! Handlers for `/session` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/session` | Current [`Snapshot`] |
//! | `POST`   | `/session/analysis` | Body: [`ProblemInput`]; 409 while analyzing |
//! | `DELETE` | `/session/analysis` | Back to idle, unsaved work dropped |
//! | `POST`   | `/session/concepts/:id/select` | 404 for unknown concepts |
//! | `POST`   | `/session/back` | Leave the open concept |
//! | `POST`   | `/session/chat` | Body: `{"text":"..."}`; returns the reply message |
//! | `POST`   | `/session/competitors` | One-shot scan of the open concept |
//! | `POST`   | `/session/save` | Returns `{"id":"..."}` |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use solveai_core::{
  analysis::ConceptId,
  input::ProblemInput,
  report::{ChatMessage, ReportId},
  research::CompetitorAnalysisResult,
  solver::Solver,
  store::ReportStore,
};
use solveai_session::{ANALYSIS_FAILED, Error as SessionError, Snapshot};

use crate::{SharedSession, error::ApiError};

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// `GET /session`
pub async fn snapshot<St, So>(State(session): State<SharedSession<St, So>>) -> Json<Snapshot>
where
  St: ReportStore,
  So: Solver,
{
  Json(session.lock().await.snapshot())
}

// ─── Analysis ─────────────────────────────────────────────────────────────────

/// `POST /session/analysis`
///
/// The solver round trip runs on its own task, so a client that disconnects
/// mid-analysis still leaves the session `Viewing` or `Idle`.
pub async fn analyze<St, So>(
  State(session): State<SharedSession<St, So>>,
  Json(input): Json<ProblemInput>,
) -> Result<Json<Snapshot>, ApiError>
where
  St: ReportStore + 'static,
  So: Solver + 'static,
{
  tokio::spawn(run_analysis(session, input)).await?
}

async fn run_analysis<St, So>(
  session: SharedSession<St, So>,
  input: ProblemInput,
) -> Result<Json<Snapshot>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let (ticket, solver) = {
    let mut guard = session.lock().await;
    (guard.begin_analysis(input)?, guard.solver())
  };

  let outcome = solver.solve(&ticket.input).await;

  let mut guard = session.lock().await;
  match guard.finish_analysis(ticket, outcome) {
    Ok(true) => Ok(Json(guard.snapshot())),
    Ok(false) => Err(ApiError::Conflict("analysis was superseded".into())),
    Err(SessionError::Solver(_)) => Err(ApiError::Upstream(ANALYSIS_FAILED.into())),
    Err(e) => Err(e.into()),
  }
}

/// `DELETE /session/analysis`
pub async fn reset<St, So>(State(session): State<SharedSession<St, So>>) -> Json<Snapshot>
where
  St: ReportStore,
  So: Solver,
{
  let mut guard = session.lock().await;
  guard.new_analysis();
  Json(guard.snapshot())
}

// ─── Refinement ───────────────────────────────────────────────────────────────

/// `POST /session/concepts/:id/select`
pub async fn select<St, So>(
  State(session): State<SharedSession<St, So>>,
  Path(id): Path<u32>,
) -> Result<Json<Snapshot>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let mut guard = session.lock().await;
  guard.select_concept(ConceptId(id))?;
  Ok(Json(guard.snapshot()))
}

/// `POST /session/back`
pub async fn back<St, So>(
  State(session): State<SharedSession<St, So>>,
) -> Result<Json<Snapshot>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let mut guard = session.lock().await;
  guard.back()?;
  Ok(Json(guard.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
  pub text: String,
}

/// `POST /session/chat`, body `{"text":"..."}`
///
/// Like `analyze`, the turn completes on its own task even if the client
/// goes away, so the reply is still recorded and the chat handed back.
pub async fn chat<St, So>(
  State(session): State<SharedSession<St, So>>,
  Json(body): Json<ChatBody>,
) -> Result<Json<ChatMessage>, ApiError>
where
  St: ReportStore + 'static,
  So: Solver + 'static,
{
  tokio::spawn(run_chat(session, body.text)).await?
}

async fn run_chat<St, So>(
  session: SharedSession<St, So>,
  text: String,
) -> Result<Json<ChatMessage>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let mut ticket = session.lock().await.begin_chat(&text)?;
  let reply = ticket.send().await;

  let message = session.lock().await.finish_chat(ticket, reply).cloned();
  message
    .map(Json)
    .ok_or_else(|| ApiError::Conflict("concept was closed before the reply arrived".into()))
}

/// `POST /session/competitors`
pub async fn competitors<St, So>(
  State(session): State<SharedSession<St, So>>,
) -> Result<Json<CompetitorAnalysisResult>, ApiError>
where
  St: ReportStore + 'static,
  So: Solver + 'static,
{
  tokio::spawn(run_competitor_scan(session)).await?
}

async fn run_competitor_scan<St, So>(
  session: SharedSession<St, So>,
) -> Result<Json<CompetitorAnalysisResult>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let (ticket, solver) = {
    let mut guard = session.lock().await;
    (guard.begin_competitor_scan()?, guard.solver())
  };

  let outcome = solver.analyze_competitors(&ticket.concept).await;

  let result = session
    .lock()
    .await
    .finish_competitor_scan(ticket, outcome)?
    .cloned();
  result
    .map(Json)
    .ok_or_else(|| ApiError::Conflict("concept was closed before the scan finished".into()))
}

// ─── Save ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Saved {
  pub id: ReportId,
}

/// `POST /session/save`
pub async fn save<St, So>(
  State(session): State<SharedSession<St, So>>,
) -> Result<Json<Saved>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let id = session.lock().await.save().await?;
  Ok(Json(Saved { id }))
}
