//! Session controller tests with a scripted solver over the SQLite store.

use std::io;

use solveai_core::{
  analysis::{AnalysisPayload, ConceptId, GeneratedConcept},
  input::{ProblemInput, Strategy},
  report::{ChatMessage, Report, ReportId, Role},
  research::{
    CompetitorAnalysis, CompetitorAnalysisResult, GeneratedImage, MarketNiche, SearchSource,
  },
  solver::{CHAT_ERROR_REPLY, RefinementChat, Solver, SolverError},
  store::ReportStore,
};
use solveai_store_sqlite::SqliteReportStore;

use crate::{ANALYSIS_FAILED, Error, Session, State};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSolver {
  fail_solve: bool,
  fail_chat:  bool,
  fail_scan:  bool,
}

struct FakeChat {
  fail: bool,
}

impl RefinementChat for FakeChat {
  async fn send(&mut self, text: &str) -> String {
    if self.fail { CHAT_ERROR_REPLY.to_owned() } else { format!("Re: {text}") }
  }
}

impl Solver for FakeSolver {
  type Chat = FakeChat;

  async fn solve(&self, _input: &ProblemInput) -> Result<AnalysisPayload, SolverError> {
    if self.fail_solve {
      Err(SolverError::GenerationFailed("503".into()))
    } else {
      Ok(payload("Headphone cables tangle. Every day."))
    }
  }

  async fn suggest_problems(&self, _domain: &str) -> Vec<String> { vec!["Lost keys".into()] }

  async fn discover_niches(&self, _domain: &str) -> Vec<MarketNiche> { Vec::new() }

  async fn generate_image(&self, _prompt: &str) -> Option<GeneratedImage> { None }

  fn open_refinement_chat(&self, _concept: &GeneratedConcept, _history: &[ChatMessage]) -> FakeChat {
    FakeChat { fail: self.fail_chat }
  }

  async fn analyze_competitors(
    &self,
    concept: &GeneratedConcept,
  ) -> Result<CompetitorAnalysisResult, SolverError> {
    if self.fail_scan {
      return Err(SolverError::GenerationFailed("timeout".into()));
    }
    Ok(CompetitorAnalysisResult {
      data:    CompetitorAnalysis {
        competitors:                   Vec::new(),
        differentiation_opportunities: vec![format!("Beat {}", concept.name)],
        verdict:                       "Open field".into(),
      },
      sources: vec![SearchSource { title: "Shop".into(), uri: "https://shop.example".into() }],
    })
  }
}

/// A store whose medium is gone.
struct BrokenStore;

impl ReportStore for BrokenStore {
  type Error = io::Error;

  async fn load(&self) -> Result<Vec<Report>, io::Error> { Ok(Vec::new()) }

  async fn upsert(&self, _report: Report) -> Result<(), io::Error> {
    Err(io::Error::other("disk full"))
  }

  async fn delete(&self, _id: &ReportId) -> Result<(), io::Error> {
    Err(io::Error::other("disk full"))
  }
}

fn payload(summary: &str) -> AnalysisPayload {
  let concept = |id: u32, name: &str| {
    serde_json::json!({
      "id": id,
      "name": name,
      "type": "product",
      "success_rating": { "score": 75, "scale": "0-100", "justification": "" },
      "design_considerations": {
        "materials_or_tech": [],
        "estimated_complexity": "medium",
        "estimated_cost_level": "low"
      }
    })
  };
  serde_json::from_value(serde_json::json!({
    "problem_understanding": {
      "summary": summary,
      "root_cause": "Loose cables",
      "assumptions": [],
      "design_goals": []
    },
    "existing_solutions": [],
    "generated_concepts": [concept(1, "Snap Spool"), concept(2, "Magnetic Clip")],
    "overall_recommendations": {
      "best_approach": "Snap Spool",
      "reason": "Cheap",
      "suggested_next_steps": []
    }
  }))
  .expect("valid payload")
}

fn headphones() -> ProblemInput {
  ProblemInput::new("My headphones always tangle").with_strategy(Strategy::Both)
}

async fn store() -> SqliteReportStore {
  SqliteReportStore::open_in_memory().await.expect("store")
}

async fn session_with(
  store: SqliteReportStore,
  solver: FakeSolver,
) -> Session<SqliteReportStore, FakeSolver> {
  Session::open(store, solver).await.expect("session")
}

async fn viewing() -> Session<SqliteReportStore, FakeSolver> {
  let mut s = session_with(store().await, FakeSolver::default()).await;
  s.submit(headphones()).await.unwrap();
  s
}

// ─── Analysis ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_lands_in_viewing_with_a_clean_slate() {
  let s = viewing().await;
  assert_eq!(s.state(), State::Viewing);
  assert!(s.analysis().is_some());
  assert!(s.refinements().is_empty());
  assert!(s.active_report().is_none());
  assert!(s.last_error().is_none());
}

#[tokio::test]
async fn failed_submit_returns_to_idle_with_message() {
  let solver = FakeSolver { fail_solve: true, ..FakeSolver::default() };
  let mut s = session_with(store().await, solver).await;

  let err = s.submit(headphones()).await.unwrap_err();
  assert!(matches!(err, Error::Solver(_)));
  assert_eq!(s.state(), State::Idle);
  assert_eq!(s.last_error(), Some(ANALYSIS_FAILED));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_transition() {
  let mut s = viewing().await;
  let err = s.begin_analysis(ProblemInput::new("   ")).unwrap_err();
  assert!(matches!(err, Error::Invalid(solveai_core::Error::EmptyProblem)));
  assert_eq!(s.state(), State::Viewing);
}

#[tokio::test]
async fn second_submit_while_analyzing_is_busy() {
  let mut s = session_with(store().await, FakeSolver::default()).await;
  let _ticket = s.begin_analysis(headphones()).unwrap();
  assert!(matches!(s.begin_analysis(headphones()), Err(Error::Busy)));
  assert_eq!(s.state(), State::Analyzing);
}

#[tokio::test]
async fn late_analysis_after_navigation_is_discarded() {
  let mut s = session_with(store().await, FakeSolver::default()).await;
  let ticket = s.begin_analysis(headphones()).unwrap();
  s.new_analysis();

  let applied = s
    .finish_analysis(ticket, Ok(payload("Late result.")))
    .unwrap();
  assert!(!applied);
  assert_eq!(s.state(), State::Idle);
  assert!(s.analysis().is_none());
}

// ─── Refinement ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn selecting_a_concept_opens_it_with_a_greeting() {
  let mut s = viewing().await;
  let ledger = s.select_concept(ConceptId(1)).unwrap();
  assert_eq!(ledger.messages.len(), 1);
  assert_eq!(ledger.messages[0].role, Role::Model);
  assert!(ledger.messages[0].text.contains("**Snap Spool**"));
  assert_eq!(s.state(), State::Refining);
}

#[tokio::test]
async fn selecting_requires_a_known_concept() {
  let mut idle = session_with(store().await, FakeSolver::default()).await;
  assert!(matches!(idle.select_concept(ConceptId(1)), Err(Error::NoAnalysis)));

  let mut s = viewing().await;
  assert!(matches!(
    s.select_concept(ConceptId(9)),
    Err(Error::ConceptNotFound(ConceptId(9)))
  ));
  assert_eq!(s.state(), State::Viewing);
}

#[tokio::test]
async fn each_message_gets_exactly_one_reply() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();

  let reply = s.send_message("  What materials?  ").await.unwrap();
  assert_eq!(reply, "Re: What materials?");

  let ledger = s.current_ledger().unwrap();
  let roles: Vec<_> = ledger.messages.iter().map(|m| m.role).collect();
  assert_eq!(roles, [Role::Model, Role::User, Role::Model]);
  assert_eq!(ledger.messages[1].text, "What materials?");
}

#[tokio::test]
async fn chat_failure_is_recorded_inline() {
  let solver = FakeSolver { fail_chat: true, ..FakeSolver::default() };
  let mut s = session_with(store().await, solver).await;
  s.submit(headphones()).await.unwrap();
  s.select_concept(ConceptId(2)).unwrap();

  let reply = s.send_message("Hello?").await.unwrap();
  assert_eq!(reply, CHAT_ERROR_REPLY);
  assert_eq!(s.current_ledger().unwrap().messages.len(), 3);
}

#[tokio::test]
async fn blank_messages_and_missing_concept_are_rejected() {
  let mut s = viewing().await;
  assert!(matches!(s.begin_chat("hi"), Err(Error::NoConceptSelected)));

  s.select_concept(ConceptId(1)).unwrap();
  assert!(matches!(s.begin_chat(" \n"), Err(Error::EmptyMessage)));
}

#[tokio::test]
async fn one_chat_request_in_flight_per_thread() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();

  let mut ticket = s.begin_chat("first").unwrap();
  assert!(matches!(s.begin_chat("second"), Err(Error::Busy)));
  assert!(s.snapshot().selected.unwrap().chat_pending);

  let reply = ticket.send().await;
  let appended = s.finish_chat(ticket, reply).unwrap();
  assert_eq!(appended.text, "Re: first");
  assert!(s.begin_chat("second").is_ok());
}

#[tokio::test]
async fn back_drops_unsaved_turns() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();
  s.send_message("Scratch that").await.unwrap();
  s.back().unwrap();
  assert_eq!(s.state(), State::Viewing);
  assert!(matches!(s.back(), Err(Error::NoConceptSelected)));

  let ledger = s.select_concept(ConceptId(1)).unwrap();
  assert_eq!(ledger.messages.len(), 1);
}

#[tokio::test]
async fn chat_reply_for_a_closed_concept_is_discarded() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();
  let mut ticket = s.begin_chat("Still there?").unwrap();
  s.back().unwrap();
  s.select_concept(ConceptId(1)).unwrap();

  let reply = ticket.send().await;
  assert!(s.finish_chat(ticket, reply).is_none());
  assert_eq!(s.current_ledger().unwrap().messages.len(), 1);
}

#[tokio::test]
async fn competitor_scan_is_cached_once() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();

  let result = s.scan_competitors().await.unwrap();
  assert_eq!(result.data.differentiation_opportunities, ["Beat Snap Spool"]);
  assert!(matches!(s.begin_competitor_scan(), Err(Error::AlreadyAnalyzed)));
  assert_eq!(
    s.current_ledger().unwrap().competitor_analysis.as_ref(),
    Some(&result)
  );
}

#[tokio::test]
async fn failed_scan_leaves_the_cache_empty() {
  let solver = FakeSolver { fail_scan: true, ..FakeSolver::default() };
  let mut s = session_with(store().await, solver).await;
  s.submit(headphones()).await.unwrap();
  s.select_concept(ConceptId(1)).unwrap();

  assert!(matches!(s.scan_competitors().await, Err(Error::Solver(_))));
  assert!(s.current_ledger().unwrap().competitor_analysis.is_none());
  assert!(s.last_error().is_some());
  assert!(s.begin_competitor_scan().is_ok());
}

#[tokio::test]
async fn successful_scan_clears_an_earlier_failure() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();

  let ticket = s.begin_competitor_scan().unwrap();
  let outcome = Err(SolverError::GenerationFailed("timeout".into()));
  assert!(s.finish_competitor_scan(ticket, outcome).is_err());
  assert!(s.last_error().is_some());

  s.scan_competitors().await.unwrap();
  assert!(s.last_error().is_none());
  assert!(s.snapshot().last_error.is_none());
}

#[tokio::test]
async fn concurrent_scan_is_busy() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();
  let _ticket = s.begin_competitor_scan().unwrap();
  assert!(matches!(s.begin_competitor_scan(), Err(Error::Busy)));
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn saved_chat_survives_reload_in_order() {
  let store = store().await;
  let mut s = session_with(store.clone(), FakeSolver::default()).await;
  s.submit(headphones()).await.unwrap();
  s.select_concept(ConceptId(1)).unwrap();
  s.send_message("What materials should I use?").await.unwrap();
  let id = s.save().await.unwrap();

  let mut fresh = session_with(store, FakeSolver::default()).await;
  assert_eq!(fresh.reports().len(), 1);
  fresh.load_report(&id).unwrap();
  assert_eq!(fresh.state(), State::Viewing);
  assert_eq!(fresh.active_report(), Some(&id));

  let ledger = &fresh.refinements()[&ConceptId(1)];
  let tail: Vec<_> = ledger.messages[1..]
    .iter()
    .map(|m| (m.role, m.text.as_str()))
    .collect();
  assert_eq!(
    tail,
    [
      (Role::User, "What materials should I use?"),
      (Role::Model, "Re: What materials should I use?"),
    ]
  );

  let ledger = fresh.select_concept(ConceptId(1)).unwrap();
  assert_eq!(ledger.messages.len(), 3);
}

#[tokio::test]
async fn saving_again_updates_the_same_report() {
  let mut s = viewing().await;
  let first = s.save().await.unwrap();
  let first_ts = s.reports()[0].timestamp;

  s.select_concept(ConceptId(2)).unwrap();
  s.send_message("Colours?").await.unwrap();
  let second = s.save().await.unwrap();

  assert_eq!(first, second);
  assert_eq!(s.reports().len(), 1);
  assert!(s.reports()[0].timestamp >= first_ts);
  assert!(s.reports()[0].refinements.contains_key(&ConceptId(2)));
  assert_eq!(s.state(), State::Refining);
}

#[tokio::test]
async fn nothing_to_save_without_an_analysis() {
  let mut s = session_with(store().await, FakeSolver::default()).await;
  assert!(matches!(s.save().await, Err(Error::NothingToSave)));
}

#[tokio::test]
async fn store_failure_keeps_the_session() {
  let mut s = Session::open(BrokenStore, FakeSolver::default()).await.unwrap();
  s.submit(headphones()).await.unwrap();
  s.select_concept(ConceptId(1)).unwrap();
  s.send_message("Keep me").await.unwrap();

  assert!(matches!(s.save().await, Err(Error::Store(_))));
  assert!(s.active_report().is_none());
  assert!(s.reports().is_empty());
  assert_eq!(s.current_ledger().unwrap().messages.len(), 3);
  assert_eq!(s.state(), State::Refining);
}

#[tokio::test]
async fn deleting_the_active_report_only_forgets_the_pointer() {
  let mut s = viewing().await;
  s.select_concept(ConceptId(1)).unwrap();
  s.send_message("Hi").await.unwrap();
  let id = s.save().await.unwrap();
  let before = s.snapshot();

  assert!(s.delete_report(&id).await.unwrap());
  assert!(s.active_report().is_none());
  assert!(s.reports().is_empty());
  assert_eq!(s.analysis(), before.analysis.as_ref());
  assert_eq!(s.refinements(), &before.refinements);
  assert_eq!(s.state(), State::Refining);

  assert!(!s.delete_report(&id).await.unwrap());
}

#[tokio::test]
async fn new_analysis_discards_unsaved_work_but_not_the_saved_report() {
  let store = store().await;
  let mut s = session_with(store.clone(), FakeSolver::default()).await;
  s.submit(headphones()).await.unwrap();
  let id = s.save().await.unwrap();
  let saved = store.list().await.unwrap();

  s.select_concept(ConceptId(1)).unwrap();
  s.send_message("Unsaved thought").await.unwrap();
  s.submit(ProblemInput::new("Cold coffee")).await.unwrap();

  assert!(s.active_report().is_none());
  assert!(s.refinements().is_empty());
  assert_eq!(store.list().await.unwrap(), saved);
  assert!(saved[0].refinements.is_empty());
  assert_eq!(saved[0].id, id);
}

#[tokio::test]
async fn loading_an_unknown_report_fails() {
  let mut s = viewing().await;
  let missing = ReportId::from("nope");
  assert!(matches!(s.load_report(&missing), Err(Error::ReportNotFound(_))));
  assert_eq!(s.state(), State::Viewing);
}

#[tokio::test]
async fn loading_a_report_closes_the_open_concept() {
  let mut s = viewing().await;
  let id = s.save().await.unwrap();
  s.select_concept(ConceptId(1)).unwrap();
  let mut ticket = s.begin_chat("in flight").unwrap();

  s.load_report(&id).unwrap();
  assert_eq!(s.state(), State::Viewing);
  assert!(s.selected_concept().is_none());

  let reply = ticket.send().await;
  assert!(s.finish_chat(ticket, reply).is_none());
}

#[tokio::test]
async fn pass_throughs_reach_the_solver() {
  let s = viewing().await;
  assert_eq!(s.suggest_problems("").await, ["Lost keys"]);
  assert!(s.discover_niches("fintech").await.is_empty());
  assert!(s.generate_image("spool").await.is_none());
}
