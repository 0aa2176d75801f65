//! The SolveAI session controller.
//!
//! A [`Session`] owns one analysis at a time plus its refinement ledgers, and
//! mediates between the user, a [`Solver`](solveai_core::solver::Solver) and a
//! [`ReportStore`](solveai_core::store::ReportStore).
//!
//! Every remote call is split into a synchronous `begin_*` transition that
//! hands out a ticket and a `finish_*` that applies the outcome. Callers that
//! share a session behind a lock can release it while the call is in flight;
//! results for tickets from an earlier session generation are dropped.

pub mod error;
mod session;
mod snapshot;

pub use error::{Error, Result};
pub use session::{ANALYSIS_FAILED, AnalysisTicket, ChatTicket, ScanTicket, Session, State};
pub use snapshot::{SelectedConcept, Snapshot};

#[cfg(test)]
mod tests;
