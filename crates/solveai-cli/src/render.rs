//! Plain-text rendering of analyses, reports and refinement threads.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use solveai_core::{
  analysis::{AnalysisPayload, GeneratedConcept},
  report::{ChatMessage, RefinementLedger, Report, Role},
  research::{CompetitorAnalysisResult, MarketNiche},
};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// `2026-10-19 14:03` in local time, or the raw value if out of range.
pub fn timestamp(millis: i64) -> String {
  DateTime::from_timestamp_millis(millis)
    .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| millis.to_string())
}

fn bullets(out: &mut String, items: &[String]) {
  for item in items {
    let _ = writeln!(out, "  • {item}");
  }
}

pub fn analysis(payload: &AnalysisPayload) -> String {
  let mut out = String::new();
  let pu = &payload.problem_understanding;

  let _ = writeln!(out, "PROBLEM\n{RULE}\n{}\n", pu.summary);
  let _ = writeln!(out, "Root cause: {}", pu.root_cause);
  if !pu.design_goals.is_empty() {
    let _ = writeln!(out, "Design goals:");
    bullets(&mut out, &pu.design_goals);
  }

  if !payload.existing_solutions.is_empty() {
    let _ = writeln!(out, "\nPROVEN SOLUTIONS\n{RULE}");
    for s in &payload.existing_solutions {
      let _ = writeln!(out, "[{}] {}  ({}% efficacy)", s.id, s.name, s.efficacy_rating);
      if !s.description.is_empty() {
        let _ = writeln!(out, "    {}", s.description);
      }
      if !s.real_world_example.is_empty() {
        let _ = writeln!(out, "    e.g. {}", s.real_world_example);
      }
    }
  }

  if !payload.generated_concepts.is_empty() {
    let _ = writeln!(out, "\nNEW CONCEPTS\n{RULE}");
    for c in &payload.generated_concepts {
      out.push_str(&concept_line(c));
    }
  }

  let rec = &payload.overall_recommendations;
  let _ = writeln!(out, "\nRECOMMENDATION\n{RULE}\n{}: {}", rec.best_approach, rec.reason);
  if !rec.suggested_next_steps.is_empty() {
    bullets(&mut out, &rec.suggested_next_steps);
  }
  out
}

fn concept_line(c: &GeneratedConcept) -> String {
  let mut out = format!(
    "[{}] {} ({}, {}% success, {} complexity, {} cost)\n",
    c.id,
    c.name,
    c.kind,
    c.success_rating.score,
    c.design_considerations.estimated_complexity,
    c.design_considerations.estimated_cost_level,
  );
  if !c.one_line_pitch.is_empty() {
    let _ = writeln!(out, "    {}", c.one_line_pitch);
  }
  out
}

/// One line per report for listings.
pub fn report_row(report: &Report) -> String {
  let plans = match report.refinements.len() {
    0 => String::new(),
    1 => "  [1 plan]".to_owned(),
    n => format!("  [{n} plans]"),
  };
  format!(
    "{:<15} {}  {}{plans}",
    report.id,
    timestamp(report.timestamp),
    report.summary_line()
  )
}

pub fn message(msg: &ChatMessage) -> String {
  let who = match msg.role {
    Role::User => "you",
    Role::Model => "assistant",
  };
  format!("{who}> {}", msg.text)
}

pub fn ledger(ledger: &RefinementLedger) -> String {
  let mut out = String::new();
  for msg in &ledger.messages {
    let _ = writeln!(out, "{}", message(msg));
  }
  if let Some(research) = &ledger.competitor_analysis {
    out.push_str(&competitors(research));
  }
  out
}

pub fn competitors(result: &CompetitorAnalysisResult) -> String {
  let mut out = format!("\nMARKET SCAN\n{RULE}\n{}\n", result.data.verdict);
  for c in &result.data.competitors {
    let _ = writeln!(out, "  • {} ({}): {}. Weakness: {}", c.name, c.product_name, c.key_overlap, c.weakness);
  }
  if !result.data.differentiation_opportunities.is_empty() {
    let _ = writeln!(out, "Opportunities:");
    bullets(&mut out, &result.data.differentiation_opportunities);
  }
  for source in &result.sources {
    let _ = writeln!(out, "  ↗ {} <{}>", source.title, source.uri);
  }
  out
}

pub fn niches(niches: &[MarketNiche]) -> String {
  let mut out = String::new();
  for n in niches {
    let _ = writeln!(
      out,
      "{} [{} competition]\n    {}\n    Gap: {}",
      n.name, n.competition_level, n.description, n.potential_gap
    );
  }
  out
}

/// A saved report with every refinement thread.
pub fn report(report: &Report) -> String {
  let mut out = format!("Report {} (saved {})\n\n", report.id, timestamp(report.timestamp));
  out.push_str(&analysis(&report.data));
  for (id, thread) in &report.refinements {
    let name = report
      .data
      .concept(*id)
      .map_or("unknown concept", |c| c.name.as_str());
    let _ = writeln!(out, "\nREFINEMENT: {name}\n{RULE}");
    out.push_str(&ledger(thread));
  }
  out
}

#[cfg(test)]
mod tests {
  use solveai_core::{
    analysis::ConceptId,
    report::{ReportId, Refinements},
  };

  use super::*;

  fn sample() -> Report {
    let data: AnalysisPayload = serde_json::from_value(serde_json::json!({
      "problem_understanding": {
        "summary": "Cables tangle. Often.",
        "root_cause": "Loose",
        "assumptions": [],
        "design_goals": ["Speed"]
      },
      "existing_solutions": [],
      "generated_concepts": [{
        "id": 1,
        "name": "Snap Spool",
        "type": "product",
        "one_line_pitch": "Snap it, forget it.",
        "success_rating": { "score": 88, "scale": "0-100", "justification": "" },
        "design_considerations": {
          "materials_or_tech": [],
          "estimated_complexity": "low",
          "estimated_cost_level": "medium"
        }
      }],
      "overall_recommendations": {
        "best_approach": "Snap Spool",
        "reason": "Cheap",
        "suggested_next_steps": ["Prototype"]
      }
    }))
    .unwrap();
    let mut refinements = Refinements::new();
    refinements.insert(ConceptId(1), RefinementLedger {
      messages:            vec![ChatMessage::user("Materials?"), ChatMessage::model("TPU.")],
      competitor_analysis: None,
    });
    Report { id: ReportId::from("1700000000000"), timestamp: 1_700_000_000_000, data, refinements }
  }

  #[test]
  fn analysis_lists_concepts_with_their_ratings() {
    let text = analysis(&sample().data);
    assert!(text.contains("[1] Snap Spool (product, 88% success, low complexity, medium cost)"));
    assert!(text.contains("Snap it, forget it."));
    assert!(text.contains("  • Prototype"));
    assert!(!text.contains("PROVEN SOLUTIONS"));
  }

  #[test]
  fn report_rows_count_plans() {
    let row = report_row(&sample());
    assert!(row.starts_with("1700000000000"));
    assert!(row.contains("Cables tangle"));
    assert!(row.ends_with("[1 plan]"));
  }

  #[test]
  fn full_report_includes_threads() {
    let text = report(&sample());
    assert!(text.contains("REFINEMENT: Snap Spool"));
    assert!(text.contains("you> Materials?"));
    assert!(text.contains("assistant> TPU."));
  }
}
