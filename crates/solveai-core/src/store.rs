//! The `ReportStore` trait.
//!
//! Implemented by storage backends (e.g. `solveai-store-sqlite`). The session
//! controller depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::report::{Report, ReportId};

/// Durable mapping from report id to saved session.
///
/// Every write replaces the whole collection as one unit, so a failed write
/// never leaves previously saved reports half-updated.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReportStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the persisted collection, most recently saved first.
  ///
  /// Missing or malformed data yields an empty list, never an error; only an
  /// unreachable medium is reported.
  fn load(&self) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  /// Alias of [`load`](Self::load) for callers that browse rather than boot.
  fn list(&self) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_ {
    self.load()
  }

  /// Replace the report with the same id, or insert it.
  fn upsert(&self, report: Report) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a report. Unknown ids are a no-op, not an error.
  fn delete<'a>(
    &'a self,
    id: &'a ReportId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
