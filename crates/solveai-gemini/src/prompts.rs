//! Prompt text and response schemas sent to the model.

use serde_json::{Value, json};
use solveai_core::{
  analysis::GeneratedConcept,
  input::{ProblemInput, Strategy},
};

pub(crate) const SOLVE_TEMPERATURE: f32 = 0.7;
pub(crate) const IDEATION_TEMPERATURE: f32 = 0.8;
pub(crate) const RESEARCH_TEMPERATURE: f32 = 0.5;

pub(crate) const DEFAULT_PROBLEM_DOMAIN: &str = "everyday life";
pub(crate) const DEFAULT_NICHE_DOMAIN: &str = "emerging industries";

pub(crate) const SOLVER_INSTRUCTION: &str = "\
You are \"SolveAI\", an expert universal problem solver and innovation consultant.
Answer the user's problem according to the requested strategy:
1. EXISTING: study real-world data, historical precedent and proven methods; report what has actually worked for others.
2. NEW: invent fresh products, services or methodologies that have not been fully explored.
3. BOTH: combine proven pathways with new inventions.

Respond with valid JSON only, following the response schema exactly.

Scoring:
- success_rating.score is an integer from 0 to 100.
- Existing solutions are scored on historical efficacy.
- New concepts are scored on viability and desirability; good ideas belong in the 60-95 range.
- Do not give arbitrarily low scores to new concepts.

Guidelines:
- Existing solutions cite specific real-world examples and explain why they work.
- New concepts may be physical products, software services or new system methodologies.";

/// User turn for an analysis request.
pub(crate) fn solve_prompt(input: &ProblemInput) -> String {
  let n = input.concept_count;
  let ask = match input.strategy {
    Strategy::Existing => {
      "Provide 3 proven, real-world solutions or products that successfully solve this. \
       Leave generated_concepts empty."
        .to_owned()
    }
    Strategy::New => {
      format!("Provide {n} fresh, innovative concepts (products, services or methods). Leave existing_solutions empty.")
    }
    Strategy::Both => {
      format!("Provide 2 proven existing solutions AND {n} new innovative concepts.")
    }
  };

  format!(
    "Problem to solve: \"{problem}\"\nContext/Domain: \"{domain}\"\nConstraints: \"{constraints}\"\n\n\
     Requested strategy: {strategy}\n{ask}",
    problem = input.problem_description.trim(),
    domain = input.domain.trim(),
    constraints = input.constraints.trim(),
    strategy = input.strategy.as_str().to_uppercase(),
  )
}

pub(crate) fn suggestion_prompt(domain: &str) -> String {
  let domain = non_blank(domain, DEFAULT_PROBLEM_DOMAIN);
  format!(
    "List 3 distinct, specific, real-world problems, inconveniences or unmet needs in the domain \
     of \"{domain}\" that need solving. Return a JSON array of strings."
  )
}

pub(crate) fn niche_prompt(domain: &str) -> String {
  let domain = non_blank(domain, DEFAULT_NICHE_DOMAIN);
  format!(
    "Identify 3-5 specific, underserved market niches or \"blue ocean\" opportunities within the \
     broader industry of \"{domain}\". For each niche give a name, a brief description, the \
     estimated competition level (low/medium/high) and the specific gap or opportunity."
  )
}

pub(crate) fn competitor_prompt(concept: &GeneratedConcept) -> String {
  format!(
    "Search the market for real-world existing solutions similar to:\n\
     Name: {name}\nDescription: {description}\n\n\
     Identify 3 real competitors or similar existing methods.\n\n\
     Return a JSON object:\n\
     {{\n  \"competitors\": [\n    {{ \"name\": \"Name\", \"product_name\": \"Product\", \
     \"key_overlap\": \"Similarity\", \"weakness\": \"Weakness\" }}\n  ],\n  \
     \"differentiation_opportunities\": [\"Strategy 1\", \"Strategy 2\"],\n  \
     \"verdict\": \"Short summary.\"\n}}\n\nOutput ONLY valid JSON.",
    name = concept.name,
    description = concept.detailed_description,
  )
}

/// System instruction for a refinement chat about `concept`.
pub(crate) fn chat_instruction(concept: &GeneratedConcept) -> String {
  format!(
    "You are an expert consultant and engineer helping a user refine and develop a specific \
     solution: \"{name}\".\n\nSolution type: {kind}\nDescription: {description}\n\n\
     Help the user implement it.\n\
     - For a product: discuss materials, manufacturing and specs.\n\
     - For a method or service: discuss steps, rollout and process.\n\
     - Be practical, innovative and encouraging.",
    name = concept.name,
    kind = concept.kind,
    description = concept.detailed_description,
  )
}

/// The two turns every refinement chat starts from.
pub(crate) fn chat_seed(concept: &GeneratedConcept) -> (String, String) {
  let context = serde_json::to_string(concept).unwrap_or_default();
  (
    format!("I want to work on {}. Context: {context}", concept.name),
    format!(
      "I'm ready to help you develop {}. What specific aspect would you like to tackle first?",
      concept.name
    ),
  )
}

fn non_blank<'a>(value: &'a str, fallback: &'a str) -> &'a str {
  let trimmed = value.trim();
  if trimmed.is_empty() { fallback } else { trimmed }
}

// ─── Schemas ─────────────────────────────────────────────────────────────────

fn string_array() -> Value { json!({ "type": "ARRAY", "items": { "type": "STRING" } }) }

fn level() -> Value { json!({ "type": "STRING", "enum": ["low", "medium", "high"] }) }

pub(crate) fn analysis_schema() -> Value {
  json!({
    "type": "OBJECT",
    "properties": {
      "problem_understanding": {
        "type": "OBJECT",
        "properties": {
          "summary": { "type": "STRING" },
          "root_cause": { "type": "STRING" },
          "assumptions": string_array(),
          "design_goals": string_array(),
        },
        "required": ["summary", "root_cause", "assumptions", "design_goals"],
      },
      "existing_solutions": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "id": { "type": "INTEGER" },
            "name": { "type": "STRING" },
            "description": { "type": "STRING" },
            "why_it_works": { "type": "STRING" },
            "real_world_example": { "type": "STRING" },
            "limitations": string_array(),
            "efficacy_rating": { "type": "INTEGER" },
          },
          "required": ["id", "name"],
        },
      },
      "generated_concepts": {
        "type": "ARRAY",
        "items": {
          "type": "OBJECT",
          "properties": {
            "id": { "type": "INTEGER" },
            "name": { "type": "STRING" },
            "type": { "type": "STRING", "enum": ["product", "service", "method"] },
            "one_line_pitch": { "type": "STRING" },
            "detailed_description": { "type": "STRING" },
            "key_features": string_array(),
            "user_benefits": string_array(),
            "target_personas": {
              "type": "ARRAY",
              "items": {
                "type": "OBJECT",
                "properties": {
                  "name": { "type": "STRING" },
                  "description": { "type": "STRING" },
                  "primary_needs": string_array(),
                },
              },
            },
            "risks_and_limitations": string_array(),
            "monetization_strategies": string_array(),
            "success_rating": {
              "type": "OBJECT",
              "properties": {
                "score": { "type": "INTEGER" },
                "scale": { "type": "STRING" },
                "justification": { "type": "STRING" },
              },
              "required": ["score"],
            },
            "design_considerations": {
              "type": "OBJECT",
              "properties": {
                "materials_or_tech": string_array(),
                "estimated_complexity": level(),
                "estimated_cost_level": level(),
              },
              "required": ["estimated_complexity", "estimated_cost_level"],
            },
            "image_prompt": { "type": "STRING" },
            "tags": string_array(),
          },
          "required": ["id", "name", "type", "success_rating", "design_considerations"],
        },
      },
      "overall_recommendations": {
        "type": "OBJECT",
        "properties": {
          "best_approach": { "type": "STRING" },
          "reason": { "type": "STRING" },
          "suggested_next_steps": string_array(),
        },
        "required": ["best_approach", "reason", "suggested_next_steps"],
      },
    },
    "required": [
      "problem_understanding",
      "existing_solutions",
      "generated_concepts",
      "overall_recommendations"
    ],
  })
}

pub(crate) fn suggestion_schema() -> Value { string_array() }

pub(crate) fn niche_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "name": { "type": "STRING" },
        "description": { "type": "STRING" },
        "competition_level": level(),
        "potential_gap": { "type": "STRING" },
      },
      "required": ["name", "description", "competition_level", "potential_gap"],
    },
  })
}
