//! JSON HTTP API for SolveAI.
//!
//! Exposes an axum [`Router`] over one shared [`Session`]. The session lock is
//! released while the solver works, so `GET /session` stays responsive during
//! an analysis and a second submit is refused with `409`. Each solver round
//! trip runs on a spawned task, so a dropped request cannot leave the session
//! waiting for a result that never gets applied.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let session = Session::open(store, solver).await?;
//! let app = solveai_api::api_router(solveai_api::shared(session));
//! ```

pub mod error;
pub mod ideas;
pub mod reports;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use solveai_core::{solver::Solver, store::ReportStore};
use solveai_session::Session;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// The state every handler receives.
pub type SharedSession<St, So> = Arc<Mutex<Session<St, So>>>;

pub fn shared<St, So>(session: Session<St, So>) -> SharedSession<St, So>
where
  St: ReportStore,
  So: Solver,
{
  Arc::new(Mutex::new(session))
}

/// Build the API router for `session`.
pub fn api_router<St, So>(session: SharedSession<St, So>) -> Router<()>
where
  St: ReportStore + 'static,
  So: Solver + 'static,
{
  Router::new()
    // Session
    .route("/session", get(session::snapshot::<St, So>))
    .route(
      "/session/analysis",
      post(session::analyze::<St, So>).delete(session::reset::<St, So>),
    )
    .route("/session/concepts/{id}/select", post(session::select::<St, So>))
    .route("/session/back", post(session::back::<St, So>))
    .route("/session/chat", post(session::chat::<St, So>))
    .route("/session/competitors", post(session::competitors::<St, So>))
    .route("/session/save", post(session::save::<St, So>))
    // Reports
    .route("/reports", get(reports::list::<St, So>))
    .route("/reports/{id}", axum::routing::delete(reports::delete_one::<St, So>))
    .route("/reports/{id}/load", post(reports::load::<St, So>))
    // Ideation
    .route("/suggestions", get(ideas::suggestions::<St, So>))
    .route("/niches", get(ideas::niches::<St, So>))
    .route("/images", post(ideas::image::<St, So>))
    .layer(TraceLayer::new_for_http())
    .with_state(session)
}
