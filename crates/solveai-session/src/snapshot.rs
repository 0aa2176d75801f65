//! Serializable view of a [`Session`] for rendering surfaces.

use serde::Serialize;
use solveai_core::{
  analysis::{AnalysisPayload, GeneratedConcept},
  report::{RefinementLedger, Refinements, ReportId},
  solver::Solver,
  store::ReportStore,
};

use crate::{Session, State};

/// Everything a surface needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
  pub state:         State,
  pub active_report: Option<ReportId>,
  pub analysis:      Option<AnalysisPayload>,
  pub refinements:   Refinements,
  pub selected:      Option<SelectedConcept>,
  pub last_error:    Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedConcept {
  pub concept:      GeneratedConcept,
  /// Working copy, including turns not saved yet.
  pub ledger:       RefinementLedger,
  pub chat_pending: bool,
  pub scan_pending: bool,
}

impl<St, So> Session<St, So>
where
  St: ReportStore,
  So: Solver,
{
  pub fn snapshot(&self) -> Snapshot {
    Snapshot {
      state:         self.state(),
      active_report: self.active_report().cloned(),
      analysis:      self.analysis().cloned(),
      refinements:   self.refinements().clone(),
      selected:      self.workbench().map(|w| SelectedConcept {
        concept:      w.concept.clone(),
        ledger:       w.ledger.clone(),
        chat_pending: w.chat.is_none(),
        scan_pending: w.scanning,
      }),
      last_error:    self.last_error().map(str::to_owned),
    }
  }
}
