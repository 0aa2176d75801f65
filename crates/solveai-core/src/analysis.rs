//! The analysis payload: the structured answer the solver service returns
//! for one submitted problem.
//!
//! Field names follow the snake_case JSON the service emits, so a payload can
//! be deserialised straight from model output and persisted verbatim inside a
//! [`Report`](crate::report::Report). Model output is never trusted as-is:
//! [`AnalysisPayload::from_model_output`] parses and then sanitises it.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Identifier of a generated concept; unique within one analysis.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConceptId(pub u32);

impl fmt::Display for ConceptId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// What kind of thing a generated concept is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptKind {
  Product,
  Service,
  Method,
}

impl ConceptKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Product => "product",
      Self::Service => "service",
      Self::Method => "method",
    }
  }
}

impl fmt::Display for ConceptKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Coarse three-step rating used for complexity, cost and competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Low,
  Medium,
  High,
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
    })
  }
}

// ─── Problem understanding ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemUnderstanding {
  pub summary:      String,
  pub root_cause:   String,
  #[serde(default)]
  pub assumptions:  Vec<String>,
  #[serde(default)]
  pub design_goals: Vec<String>,
}

// ─── Existing solutions ──────────────────────────────────────────────────────

/// A proven, real-world approach to the problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingSolution {
  pub id:                 u32,
  pub name:               String,
  #[serde(default)]
  pub description:        String,
  #[serde(default)]
  pub why_it_works:       String,
  /// A specific company, product or historical precedent.
  #[serde(default)]
  pub real_world_example: String,
  #[serde(default)]
  pub limitations:        Vec<String>,
  /// 0–100, based on how well the approach generally works.
  #[serde(default)]
  pub efficacy_rating:    u32,
}

// ─── Generated concepts ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPersona {
  pub name:          String,
  #[serde(default)]
  pub description:   String,
  #[serde(default)]
  pub primary_needs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessRating {
  /// 0–100.
  pub score:         u32,
  #[serde(default)]
  pub scale:         String,
  #[serde(default)]
  pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConsiderations {
  #[serde(default)]
  pub materials_or_tech:    Vec<String>,
  pub estimated_complexity: Level,
  pub estimated_cost_level: Level,
}

/// A newly generated product, service or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedConcept {
  pub id:                      ConceptId,
  pub name:                    String,
  #[serde(rename = "type")]
  pub kind:                    ConceptKind,
  #[serde(default)]
  pub one_line_pitch:          String,
  #[serde(default)]
  pub detailed_description:    String,
  #[serde(default)]
  pub key_features:            Vec<String>,
  #[serde(default)]
  pub user_benefits:           Vec<String>,
  #[serde(default)]
  pub target_personas:         Vec<TargetPersona>,
  #[serde(default)]
  pub risks_and_limitations:   Vec<String>,
  #[serde(default)]
  pub monetization_strategies: Vec<String>,
  pub success_rating:          SuccessRating,
  pub design_considerations:   DesignConsiderations,
  /// Prompt handed to the image model to visualise the concept.
  #[serde(default)]
  pub image_prompt:            String,
  #[serde(default)]
  pub tags:                    Vec<String>,
}

// ─── Recommendation ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRecommendations {
  pub best_approach:        String,
  pub reason:               String,
  #[serde(default)]
  pub suggested_next_steps: Vec<String>,
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// Everything the solver produced for one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
  pub problem_understanding:   ProblemUnderstanding,
  /// Populated for the `existing` and `both` strategies.
  #[serde(default)]
  pub existing_solutions:      Vec<ExistingSolution>,
  /// Populated for the `new` and `both` strategies.
  #[serde(default)]
  pub generated_concepts:      Vec<GeneratedConcept>,
  pub overall_recommendations: OverallRecommendations,
}

impl AnalysisPayload {
  /// Parse raw model output and run [`sanitize`](Self::sanitize) over it.
  ///
  /// Missing list fields default to empty; missing scalar fields, unknown
  /// enum strings and the checks in `sanitize` are rejected.
  pub fn from_model_output(text: &str) -> Result<Self> {
    let mut payload: Self = serde_json::from_str(text.trim())?;
    payload.sanitize()?;
    Ok(payload)
  }

  /// Clamp ratings into 0–100 and reject structurally unusable payloads.
  pub fn sanitize(&mut self) -> Result<()> {
    if self.problem_understanding.summary.trim().is_empty() {
      return Err(Error::EmptySummary);
    }

    let mut seen = HashSet::new();
    for concept in &mut self.generated_concepts {
      if !seen.insert(concept.id) {
        return Err(Error::DuplicateConceptId(concept.id));
      }
      concept.success_rating.score = concept.success_rating.score.min(100);
    }

    for solution in &mut self.existing_solutions {
      solution.efficacy_rating = solution.efficacy_rating.min(100);
    }

    Ok(())
  }

  /// Look up a generated concept by id.
  pub fn concept(&self, id: ConceptId) -> Option<&GeneratedConcept> {
    self.generated_concepts.iter().find(|c| c.id == id)
  }

  /// Whether `id` names one of this payload's generated concepts.
  pub fn has_concept(&self, id: ConceptId) -> bool { self.concept(id).is_some() }

  /// The first sentence of the problem summary; used as a report title.
  pub fn headline(&self) -> &str {
    let summary = self.problem_understanding.summary.trim();
    summary.split('.').next().unwrap_or(summary).trim()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn concept_json(id: u32, score: u32) -> serde_json::Value {
    serde_json::json!({
      "id": id,
      "name": format!("Concept {id}"),
      "type": "product",
      "one_line_pitch": "A pitch",
      "detailed_description": "A description",
      "success_rating": { "score": score, "scale": "0-100", "justification": "ok" },
      "design_considerations": {
        "materials_or_tech": ["silicone"],
        "estimated_complexity": "low",
        "estimated_cost_level": "medium"
      },
      "image_prompt": "a drawing"
    })
  }

  fn payload_json(concepts: Vec<serde_json::Value>) -> String {
    serde_json::json!({
      "problem_understanding": {
        "summary": "Cables tangle in pockets. Users lose time.",
        "root_cause": "Loose flexible wire",
        "assumptions": [],
        "design_goals": ["stay untangled"]
      },
      "existing_solutions": [{
        "id": 1,
        "name": "Cable clip",
        "description": "Clip the cable",
        "why_it_works": "Keeps loops fixed",
        "real_world_example": "Apple leather wrap",
        "limitations": ["easy to lose"],
        "efficacy_rating": 140
      }],
      "generated_concepts": concepts,
      "overall_recommendations": {
        "best_approach": "Concept 1",
        "reason": "Cheap",
        "suggested_next_steps": ["prototype"]
      }
    })
    .to_string()
  }

  #[test]
  fn parses_and_clamps_ratings() {
    let text = payload_json(vec![concept_json(1, 250), concept_json(2, 80)]);
    let payload = AnalysisPayload::from_model_output(&text).unwrap();

    assert_eq!(payload.generated_concepts.len(), 2);
    assert_eq!(payload.generated_concepts[0].success_rating.score, 100);
    assert_eq!(payload.generated_concepts[1].success_rating.score, 80);
    assert_eq!(payload.existing_solutions[0].efficacy_rating, 100);
    assert_eq!(payload.generated_concepts[0].kind, ConceptKind::Product);
  }

  #[test]
  fn missing_lists_default_to_empty() {
    let mut value: serde_json::Value =
      serde_json::from_str(&payload_json(vec![])).unwrap();
    value.as_object_mut().unwrap().remove("existing_solutions");
    value.as_object_mut().unwrap().remove("generated_concepts");

    let payload = AnalysisPayload::from_model_output(&value.to_string()).unwrap();
    assert!(payload.existing_solutions.is_empty());
    assert!(payload.generated_concepts.is_empty());
  }

  #[test]
  fn rejects_duplicate_concept_ids() {
    let text = payload_json(vec![concept_json(3, 70), concept_json(3, 60)]);
    let err = AnalysisPayload::from_model_output(&text).unwrap_err();
    assert!(matches!(err, Error::DuplicateConceptId(ConceptId(3))));
  }

  #[test]
  fn rejects_unknown_concept_kind() {
    let mut concept = concept_json(1, 70);
    concept["type"] = serde_json::json!("gadget");
    let text = payload_json(vec![concept]);
    assert!(matches!(
      AnalysisPayload::from_model_output(&text),
      Err(Error::Serialization(_))
    ));
  }

  #[test]
  fn rejects_blank_summary() {
    let mut value: serde_json::Value =
      serde_json::from_str(&payload_json(vec![])).unwrap();
    value["problem_understanding"]["summary"] = serde_json::json!("   ");
    assert!(matches!(
      AnalysisPayload::from_model_output(&value.to_string()),
      Err(Error::EmptySummary)
    ));
  }

  #[test]
  fn headline_is_first_sentence() {
    let payload =
      AnalysisPayload::from_model_output(&payload_json(vec![concept_json(1, 70)]))
        .unwrap();
    assert_eq!(payload.headline(), "Cables tangle in pockets");
    assert!(payload.has_concept(ConceptId(1)));
    assert!(!payload.has_concept(ConceptId(9)));
  }
}
