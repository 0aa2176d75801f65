//! Session state machine and report orchestration.

use std::{fmt, sync::Arc};

use serde::Serialize;
use solveai_core::{
  analysis::{AnalysisPayload, ConceptId, GeneratedConcept},
  input::ProblemInput,
  report::{
    ChatMessage, RefinementLedger, Refinements, Report, ReportId, allocate_report_id,
    next_timestamp, now_millis, remove_report, upsert_report,
  },
  research::{CompetitorAnalysisResult, GeneratedImage, MarketNiche},
  solver::{RefinementChat, Solver, SolverError},
  store::ReportStore,
};

use crate::{Error, Result};

/// Message surfaced to the user when an analysis request fails.
pub const ANALYSIS_FAILED: &str = "Could not generate solutions. Please try again.";

// ─── State ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
  /// No analysis; waiting for a problem.
  Idle,
  /// An analysis request is in flight.
  Analyzing,
  /// An analysis is shown.
  Viewing,
  /// One concept of the analysis is open for refinement.
  Refining,
}

impl fmt::Display for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Idle => "idle",
      Self::Analyzing => "analyzing",
      Self::Viewing => "viewing",
      Self::Refining => "refining",
    })
  }
}

/// The concept currently open in `Refining`, with its working copy of the
/// ledger. Merged into the refinement map only on save.
pub(crate) struct Workbench<C> {
  pub concept:  GeneratedConcept,
  pub ledger:   RefinementLedger,
  /// `None` while a ticket has the chat checked out.
  pub chat:     Option<C>,
  pub scanning: bool,
}

// ─── Tickets ──────────────────────────────────────────────────────────────────

/// An analysis request handed out by [`Session::begin_analysis`].
#[must_use]
#[derive(Debug)]
pub struct AnalysisTicket {
  generation: u64,
  pub input:  ProblemInput,
}

/// A chat turn handed out by [`Session::begin_chat`]. Carries the chat itself
/// so at most one request per thread is in flight.
#[must_use]
pub struct ChatTicket<C> {
  generation: u64,
  concept:    ConceptId,
  text:       String,
  chat:       C,
}

impl<C: RefinementChat> ChatTicket<C> {
  pub fn text(&self) -> &str { &self.text }

  /// Run the turn against the service. Never fails; errors come back as
  /// inline reply text.
  pub async fn send(&mut self) -> String { self.chat.send(&self.text).await }
}

/// A competitor scan handed out by [`Session::begin_competitor_scan`].
#[must_use]
#[derive(Debug)]
pub struct ScanTicket {
  generation:  u64,
  pub concept: GeneratedConcept,
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// One user's working session: the current analysis, its refinements, and an
/// in-memory mirror of the saved reports.
pub struct Session<St, So>
where
  St: ReportStore,
  So: Solver,
{
  store:         St,
  solver:        Arc<So>,
  state:         State,
  reports:       Vec<Report>,
  active_report: Option<ReportId>,
  analysis:      Option<AnalysisPayload>,
  refinements:   Refinements,
  workbench:     Option<Workbench<So::Chat>>,
  /// Bumped on every navigation that invalidates in-flight tickets.
  generation:    u64,
  last_error:    Option<String>,
}

impl<St, So> Session<St, So>
where
  St: ReportStore,
  So: Solver,
{
  /// Start an idle session, loading the saved reports from `store`.
  pub async fn open(store: St, solver: So) -> Result<Self> {
    let reports = store.load().await.map_err(Error::store)?;
    tracing::info!(reports = reports.len(), "session opened");
    Ok(Self {
      store,
      solver: Arc::new(solver),
      state: State::Idle,
      reports,
      active_report: None,
      analysis: None,
      refinements: Refinements::new(),
      workbench: None,
      generation: 0,
      last_error: None,
    })
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn state(&self) -> State { self.state }

  /// Shared handle to the solver, for calls made without holding the session.
  pub fn solver(&self) -> Arc<So> { Arc::clone(&self.solver) }

  /// Saved reports, most recent first.
  pub fn reports(&self) -> &[Report] { &self.reports }

  pub fn active_report(&self) -> Option<&ReportId> { self.active_report.as_ref() }

  pub fn analysis(&self) -> Option<&AnalysisPayload> { self.analysis.as_ref() }

  pub fn refinements(&self) -> &Refinements { &self.refinements }

  pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }

  /// The open concept, if refining.
  pub fn selected_concept(&self) -> Option<&GeneratedConcept> {
    self.workbench.as_ref().map(|w| &w.concept)
  }

  /// Working copy of the open concept's ledger, including unsaved turns.
  pub fn current_ledger(&self) -> Option<&RefinementLedger> {
    self.workbench.as_ref().map(|w| &w.ledger)
  }

  pub(crate) fn workbench(&self) -> Option<&Workbench<So::Chat>> { self.workbench.as_ref() }

  fn invalidate(&mut self) { self.generation += 1; }

  fn is_current(&self, generation: u64, what: &str) -> bool {
    let current = generation == self.generation;
    if !current {
      tracing::warn!(ticket = generation, session = self.generation, "discarding stale {what} result");
    }
    current
  }

  // ── Analysis ──────────────────────────────────────────────────────────────

  /// Drop the current analysis and any unsaved refinements, back to `Idle`.
  pub fn new_analysis(&mut self) {
    self.invalidate();
    self.state = State::Idle;
    self.analysis = None;
    self.refinements.clear();
    self.workbench = None;
    self.active_report = None;
    self.last_error = None;
  }

  /// Validate `input` and move to `Analyzing`. Whatever was on screen is
  /// discarded, saved or not.
  pub fn begin_analysis(&mut self, input: ProblemInput) -> Result<AnalysisTicket> {
    if self.state == State::Analyzing {
      return Err(Error::Busy);
    }
    input.validate()?;

    self.new_analysis();
    self.state = State::Analyzing;
    tracing::debug!(strategy = %input.strategy, concepts = input.concept_count, "analysis started");
    Ok(AnalysisTicket { generation: self.generation, input })
  }

  /// Apply an analysis outcome. Returns `Ok(false)` when the ticket was
  /// stale and the outcome was dropped.
  pub fn finish_analysis(
    &mut self,
    ticket: AnalysisTicket,
    outcome: std::result::Result<AnalysisPayload, SolverError>,
  ) -> Result<bool> {
    if !self.is_current(ticket.generation, "analysis") {
      return Ok(false);
    }

    match outcome {
      Ok(payload) => {
        tracing::info!(
          concepts = payload.generated_concepts.len(),
          existing = payload.existing_solutions.len(),
          "analysis ready"
        );
        self.analysis = Some(payload);
        self.state = State::Viewing;
        Ok(true)
      }
      Err(e) => {
        tracing::warn!(error = %e, "analysis failed");
        self.state = State::Idle;
        self.last_error = Some(ANALYSIS_FAILED.to_owned());
        Err(e.into())
      }
    }
  }

  /// `begin_analysis`, solve, `finish_analysis`.
  pub async fn submit(&mut self, input: ProblemInput) -> Result<()> {
    let ticket = self.begin_analysis(input)?;
    let outcome = self.solver.solve(&ticket.input).await;
    self.finish_analysis(ticket, outcome).map(|_| ())
  }

  // ── Refinement ────────────────────────────────────────────────────────────

  /// Open concept `id` for refinement. Switching directly from another open
  /// concept discards that concept's unsaved turns, as `back` would.
  pub fn select_concept(&mut self, id: ConceptId) -> Result<&RefinementLedger> {
    let analysis = self.analysis.as_ref().ok_or(Error::NoAnalysis)?;
    let concept = analysis.concept(id).ok_or(Error::ConceptNotFound(id))?.clone();

    let ledger = self
      .refinements
      .get(&id)
      .cloned()
      .unwrap_or_else(|| RefinementLedger::greeting(&concept));
    let chat = self.solver.open_refinement_chat(&concept, &ledger.messages);

    tracing::debug!(concept = %id, messages = ledger.messages.len(), "concept selected");
    self.invalidate();
    self.state = State::Refining;
    let workbench = self
      .workbench
      .insert(Workbench { concept, ledger, chat: Some(chat), scanning: false });
    Ok(&workbench.ledger)
  }

  /// Leave `Refining`. Turns not yet saved are dropped.
  pub fn back(&mut self) -> Result<()> {
    if self.state != State::Refining {
      return Err(Error::NoConceptSelected);
    }
    self.invalidate();
    self.workbench = None;
    self.state = State::Viewing;
    Ok(())
  }

  /// Record the user's turn and check out the chat for it.
  pub fn begin_chat(&mut self, text: &str) -> Result<ChatTicket<So::Chat>> {
    let text = text.trim();
    if text.is_empty() {
      return Err(Error::EmptyMessage);
    }
    let workbench = self.workbench.as_mut().ok_or(Error::NoConceptSelected)?;
    let chat = workbench.chat.take().ok_or(Error::Busy)?;

    workbench.ledger.messages.push(ChatMessage::user(text));
    Ok(ChatTicket {
      generation: self.generation,
      concept: workbench.concept.id,
      text: text.to_owned(),
      chat,
    })
  }

  /// Append the reply for `ticket` and return the chat. `None` if the ticket
  /// was stale.
  pub fn finish_chat(
    &mut self,
    ticket: ChatTicket<So::Chat>,
    reply: String,
  ) -> Option<&ChatMessage> {
    if !self.is_current(ticket.generation, "chat") {
      return None;
    }
    let workbench = self.workbench.as_mut()?;
    if workbench.concept.id != ticket.concept {
      return None;
    }

    workbench.chat = Some(ticket.chat);
    workbench.ledger.messages.push(ChatMessage::model(reply));
    workbench.ledger.messages.last()
  }

  /// `begin_chat`, send, `finish_chat`. Returns the model's reply.
  pub async fn send_message(&mut self, text: &str) -> Result<String> {
    let mut ticket = self.begin_chat(text)?;
    let reply = ticket.send().await;
    self.finish_chat(ticket, reply.clone());
    Ok(reply)
  }

  /// Start the one-shot competitor scan for the open concept.
  pub fn begin_competitor_scan(&mut self) -> Result<ScanTicket> {
    let workbench = self.workbench.as_mut().ok_or(Error::NoConceptSelected)?;
    if workbench.ledger.competitor_analysis.is_some() {
      return Err(Error::AlreadyAnalyzed);
    }
    if workbench.scanning {
      return Err(Error::Busy);
    }

    workbench.scanning = true;
    Ok(ScanTicket { generation: self.generation, concept: workbench.concept.clone() })
  }

  /// Cache a scan result on the open concept. `Ok(None)` if the ticket was
  /// stale.
  pub fn finish_competitor_scan(
    &mut self,
    ticket: ScanTicket,
    outcome: std::result::Result<CompetitorAnalysisResult, SolverError>,
  ) -> Result<Option<&CompetitorAnalysisResult>> {
    if !self.is_current(ticket.generation, "competitor scan") {
      return Ok(None);
    }
    let Some(workbench) = self.workbench.as_mut() else {
      return Ok(None);
    };
    workbench.scanning = false;

    match outcome {
      Ok(result) => {
        tracing::info!(
          concept = %ticket.concept.id,
          competitors = result.data.competitors.len(),
          sources = result.sources.len(),
          "competitor scan complete"
        );
        self.last_error = None;
        Ok(Some(&*workbench.ledger.competitor_analysis.insert(result)))
      }
      Err(e) => {
        tracing::warn!(concept = %ticket.concept.id, error = %e, "competitor scan failed");
        self.last_error = Some(e.to_string());
        Err(e.into())
      }
    }
  }

  /// `begin_competitor_scan`, analyze, `finish_competitor_scan`.
  pub async fn scan_competitors(&mut self) -> Result<CompetitorAnalysisResult> {
    let ticket = self.begin_competitor_scan()?;
    let outcome = self.solver.analyze_competitors(&ticket.concept).await;
    self
      .finish_competitor_scan(ticket, outcome)?
      .cloned()
      .ok_or(Error::NoConceptSelected)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  /// Persist the current analysis and every refinement ledger. From
  /// `Refining`, the open concept's working ledger is merged first.
  ///
  /// Updates the active report if there is one, otherwise creates a report
  /// and makes it active. On a store failure the in-memory session is kept
  /// as is.
  pub async fn save(&mut self) -> Result<ReportId> {
    let analysis = match (&self.analysis, self.state) {
      (Some(a), State::Viewing | State::Refining) => a.clone(),
      _ => return Err(Error::NothingToSave),
    };

    if let Some(workbench) = &self.workbench {
      self
        .refinements
        .insert(workbench.concept.id, workbench.ledger.clone());
    }

    let now = now_millis();
    let id = match &self.active_report {
      Some(id) => id.clone(),
      None => allocate_report_id(&self.reports, now),
    };
    let previous = self.reports.iter().find(|r| r.id == id).map(|r| r.timestamp);

    let mut report = Report {
      id: id.clone(),
      timestamp: next_timestamp(previous, now),
      data: analysis,
      refinements: self.refinements.clone(),
    };
    let stale = report.prune_stale_refinements();
    if !stale.is_empty() {
      tracing::warn!(report = %id, ?stale, "dropping refinements for unknown concepts");
    }

    self
      .store
      .upsert(report.clone())
      .await
      .map_err(|e| {
        tracing::warn!(report = %id, error = %e, "save failed");
        Error::store(e)
      })?;

    tracing::info!(report = %id, refinements = report.refinements.len(), "report saved");
    upsert_report(&mut self.reports, report);
    self.active_report = Some(id.clone());
    Ok(id)
  }

  /// Replace the session with a saved report and show it.
  pub fn load_report(&mut self, id: &ReportId) -> Result<&AnalysisPayload> {
    let report = self
      .reports
      .iter()
      .find(|r| &r.id == id)
      .cloned()
      .ok_or_else(|| Error::ReportNotFound(id.clone()))?;

    tracing::info!(report = %id, refinements = report.refinements.len(), "report loaded");
    self.invalidate();
    self.state = State::Viewing;
    self.workbench = None;
    self.refinements = report.refinements;
    self.active_report = Some(report.id);
    self.last_error = None;
    Ok(&*self.analysis.insert(report.data))
  }

  /// Delete a saved report. What is on screen is untouched; deleting the
  /// active report only forgets that it was saved. Returns whether a report
  /// was removed.
  pub async fn delete_report(&mut self, id: &ReportId) -> Result<bool> {
    self.store.delete(id).await.map_err(Error::store)?;

    let removed = remove_report(&mut self.reports, id);
    if self.active_report.as_ref() == Some(id) {
      self.active_report = None;
    }
    if removed {
      tracing::info!(report = %id, "report deleted");
    }
    Ok(removed)
  }

  /// Re-read the store into the in-memory mirror.
  pub async fn refresh_reports(&mut self) -> Result<&[Report]> {
    self.reports = self.store.list().await.map_err(Error::store)?;
    Ok(&self.reports)
  }

  // ── Pass-through helpers ──────────────────────────────────────────────────

  pub async fn suggest_problems(&self, domain: &str) -> Vec<String> {
    self.solver.suggest_problems(domain).await
  }

  pub async fn discover_niches(&self, domain: &str) -> Vec<MarketNiche> {
    self.solver.discover_niches(domain).await
  }

  pub async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage> {
    self.solver.generate_image(prompt).await
  }
}
