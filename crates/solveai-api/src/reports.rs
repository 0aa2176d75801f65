//! Handlers for `/reports` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reports` | Summaries, most recent first |
//! | `POST`   | `/reports/:id/load` | Replaces the session; 404 if unknown |
//! | `DELETE` | `/reports/:id` | 204, or 404 if unknown |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Serialize;
use solveai_core::{
  report::{Report, ReportId},
  solver::Solver,
  store::ReportStore,
};
use solveai_session::Snapshot;

use crate::{SharedSession, error::ApiError};

/// One row of the saved-reports listing.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
  pub id:          ReportId,
  pub timestamp:   i64,
  pub title:       String,
  pub concepts:    usize,
  /// Number of concepts with a saved refinement ledger.
  pub refinements: usize,
}

impl From<&Report> for ReportSummary {
  fn from(report: &Report) -> Self {
    Self {
      id:          report.id.clone(),
      timestamp:   report.timestamp,
      title:       report.summary_line().to_owned(),
      concepts:    report.data.generated_concepts.len(),
      refinements: report.refinements.len(),
    }
  }
}

/// `GET /reports`
pub async fn list<St, So>(State(session): State<SharedSession<St, So>>) -> Json<Vec<ReportSummary>>
where
  St: ReportStore,
  So: Solver,
{
  let guard = session.lock().await;
  Json(guard.reports().iter().map(ReportSummary::from).collect())
}

/// `POST /reports/:id/load`
pub async fn load<St, So>(
  State(session): State<SharedSession<St, So>>,
  Path(id): Path<String>,
) -> Result<Json<Snapshot>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let mut guard = session.lock().await;
  guard.load_report(&ReportId::new(id))?;
  Ok(Json(guard.snapshot()))
}

/// `DELETE /reports/:id`
pub async fn delete_one<St, So>(
  State(session): State<SharedSession<St, So>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  let id = ReportId::new(id);
  if session.lock().await.delete_report(&id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("report {id} not found")))
  }
}
