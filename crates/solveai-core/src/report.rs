//! Reports, refinement ledgers and the list algebra shared by every
//! [`ReportStore`](crate::store::ReportStore) and the session's in-memory
//! mirror.
//!
//! A report is a saved analysis session: the solver payload plus one
//! refinement ledger per concept the user worked on. The persisted form is a
//! JSON array of reports under a single storage key.

use std::{collections::BTreeMap, fmt};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
  analysis::{AnalysisPayload, ConceptId, GeneratedConcept},
  research::CompetitorAnalysisResult,
};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 { Utc::now().timestamp_millis() }

/// Logical clock step for a save: never earlier than the previous write.
pub fn next_timestamp(previous: Option<i64>, now: i64) -> i64 {
  previous.map_or(now, |prev| prev.max(now))
}

// ─── ReportId ────────────────────────────────────────────────────────────────

/// Opaque report identifier, stable for the lifetime of the report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ReportId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ReportId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

/// Derive a fresh id from `now`, bumping past any id already in `existing`.
pub fn allocate_report_id(existing: &[Report], now: i64) -> ReportId {
  let mut candidate = now;
  loop {
    let id = ReportId(candidate.to_string());
    if existing.iter().all(|r| r.id != id) {
      return id;
    }
    candidate += 1;
  }
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Model,
}

/// One turn of a refinement chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub role:      Role,
  pub text:      String,
  /// Milliseconds since the epoch.
  pub timestamp: i64,
}

impl ChatMessage {
  pub fn user(text: impl Into<String>) -> Self {
    Self { role: Role::User, text: text.into(), timestamp: now_millis() }
  }

  pub fn model(text: impl Into<String>) -> Self {
    Self { role: Role::Model, text: text.into(), timestamp: now_millis() }
  }
}

// ─── Refinement ledger ───────────────────────────────────────────────────────

/// Chat transcript and cached research for one generated concept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementLedger {
  /// Append-only; never reordered.
  #[serde(default)]
  pub messages:            Vec<ChatMessage>,
  /// Populated once by a competitor scan and never invalidated.
  #[serde(default, rename = "competitorAnalysis")]
  pub competitor_analysis: Option<CompetitorAnalysisResult>,
}

impl RefinementLedger {
  /// A new thread for `concept`, opened with the assistant's greeting.
  pub fn greeting(concept: &GeneratedConcept) -> Self {
    Self {
      messages:            vec![ChatMessage::model(format!(
        "Hi! I'm your assistant for **{}**. I can help you expand on this {}, \
         discuss implementation, or suggest next steps.",
        concept.name, concept.kind
      ))],
      competitor_analysis: None,
    }
  }
}

/// Ledgers keyed by concept id.
pub type Refinements = BTreeMap<ConceptId, RefinementLedger>;

// ─── Report ──────────────────────────────────────────────────────────────────

/// A persisted analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub id:          ReportId,
  /// Last-write instant, milliseconds since the epoch.
  pub timestamp:   i64,
  /// Stored and returned verbatim.
  pub data:        AnalysisPayload,
  #[serde(default)]
  pub refinements: Refinements,
}

impl Report {
  /// Concept ids that have a ledger but no matching generated concept.
  pub fn stale_refinement_ids(&self) -> Vec<ConceptId> {
    self
      .refinements
      .keys()
      .copied()
      .filter(|id| !self.data.has_concept(*id))
      .collect()
  }

  /// Drop ledgers whose concept no longer exists; returns the dropped ids.
  pub fn prune_stale_refinements(&mut self) -> Vec<ConceptId> {
    let stale = self.stale_refinement_ids();
    for id in &stale {
      self.refinements.remove(id);
    }
    stale
  }

  /// Short title for report listings.
  pub fn summary_line(&self) -> &str { self.data.headline() }
}

// ─── List algebra ────────────────────────────────────────────────────────────

/// Most recently saved first. Stable, so earlier entries win ties.
pub fn sort_most_recent_first(reports: &mut [Report]) {
  reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Replace the report with the same id, or insert it. The written report is
/// placed first before sorting so it leads any report with an equal timestamp.
pub fn upsert_report(reports: &mut Vec<Report>, report: Report) {
  reports.retain(|r| r.id != report.id);
  reports.insert(0, report);
  sort_most_recent_first(reports);
}

/// Remove the report with `id`. Returns whether anything was removed.
pub fn remove_report(reports: &mut Vec<Report>, id: &ReportId) -> bool {
  let before = reports.len();
  reports.retain(|r| &r.id != id);
  reports.len() != before
}

/// Decode the persisted collection. Anything that is not a valid report array
/// yields `None`; callers treat that as "no saved reports".
pub fn decode_collection(raw: &str) -> Option<Vec<Report>> {
  let mut reports: Vec<Report> = serde_json::from_str(raw).ok()?;
  sort_most_recent_first(&mut reports);
  Some(reports)
}
