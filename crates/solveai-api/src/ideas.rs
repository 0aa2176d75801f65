//! Ideation helpers that bypass the session state machine.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/suggestions` | Optional `?domain=`; empty list on failure |
//! | `GET`  | `/niches` | Optional `?domain=`; empty list on failure |
//! | `POST` | `/images` | Body: `{"prompt":"..."}`; 502 if nothing was generated |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use solveai_core::{research::MarketNiche, solver::Solver, store::ReportStore};

use crate::{SharedSession, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct DomainParams {
  #[serde(default)]
  pub domain: String,
}

/// `GET /suggestions[?domain=<domain>]`
pub async fn suggestions<St, So>(
  State(session): State<SharedSession<St, So>>,
  Query(params): Query<DomainParams>,
) -> Json<Vec<String>>
where
  St: ReportStore,
  So: Solver,
{
  let solver = session.lock().await.solver();
  Json(solver.suggest_problems(&params.domain).await)
}

/// `GET /niches[?domain=<domain>]`
pub async fn niches<St, So>(
  State(session): State<SharedSession<St, So>>,
  Query(params): Query<DomainParams>,
) -> Json<Vec<MarketNiche>>
where
  St: ReportStore,
  So: Solver,
{
  let solver = session.lock().await.solver();
  Json(solver.discover_niches(&params.domain).await)
}

#[derive(Debug, Deserialize)]
pub struct ImageBody {
  pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
  pub mime_type: String,
  pub data_url:  String,
}

/// `POST /images`, body `{"prompt":"..."}`
pub async fn image<St, So>(
  State(session): State<SharedSession<St, So>>,
  Json(body): Json<ImageBody>,
) -> Result<Json<ImageResponse>, ApiError>
where
  St: ReportStore,
  So: Solver,
{
  if body.prompt.trim().is_empty() {
    return Err(ApiError::BadRequest("prompt is empty".into()));
  }

  let solver = session.lock().await.solver();
  let image = solver
    .generate_image(&body.prompt)
    .await
    .ok_or_else(|| ApiError::Upstream("could not generate an image".into()))?;

  Ok(Json(ImageResponse { data_url: image.to_data_url(), mime_type: image.mime_type }))
}
