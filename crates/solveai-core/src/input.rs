//! The problem a user submits for analysis.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which kinds of answers the solver should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
  /// Proven, real-world solutions only.
  Existing,
  /// Freshly generated concepts only.
  New,
  /// A mix of both.
  #[default]
  Both,
}

impl Strategy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Existing => "existing",
      Self::New => "new",
      Self::Both => "both",
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Strategy {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "existing" => Ok(Self::Existing),
      "new" => Ok(Self::New),
      "both" => Ok(Self::Both),
      other => Err(format!("unknown strategy {other:?} (existing|new|both)")),
    }
  }
}

pub const DEFAULT_CONCEPT_COUNT: u8 = 3;
pub const MAX_CONCEPT_COUNT: u8 = 6;

/// A problem statement plus the knobs that shape the solver request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemInput {
  pub problem_description: String,
  #[serde(default)]
  pub domain:              String,
  #[serde(default)]
  pub constraints:         String,
  #[serde(default)]
  pub strategy:            Strategy,
  #[serde(default = "default_concept_count")]
  pub concept_count:       u8,
}

fn default_concept_count() -> u8 { DEFAULT_CONCEPT_COUNT }

impl ProblemInput {
  /// Convenience constructor with every optional field at its default.
  pub fn new(problem_description: impl Into<String>) -> Self {
    Self {
      problem_description: problem_description.into(),
      domain:              String::new(),
      constraints:         String::new(),
      strategy:            Strategy::default(),
      concept_count:       DEFAULT_CONCEPT_COUNT,
    }
  }

  pub fn with_strategy(mut self, strategy: Strategy) -> Self {
    self.strategy = strategy;
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.problem_description.trim().is_empty() {
      return Err(Error::EmptyProblem);
    }
    if !(1..=MAX_CONCEPT_COUNT).contains(&self.concept_count) {
      return Err(Error::InvalidConceptCount(self.concept_count));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_fill_in_when_deserialising() {
    let input: ProblemInput =
      serde_json::from_str(r#"{"problem_description":"Tangled cables"}"#).unwrap();
    assert_eq!(input.strategy, Strategy::Both);
    assert_eq!(input.concept_count, DEFAULT_CONCEPT_COUNT);
    assert!(input.validate().is_ok());
  }

  #[test]
  fn blank_problem_is_rejected() {
    assert!(matches!(
      ProblemInput::new("   \n").validate(),
      Err(Error::EmptyProblem)
    ));
  }

  #[test]
  fn concept_count_is_bounded() {
    let mut input = ProblemInput::new("x");
    input.concept_count = 0;
    assert!(matches!(input.validate(), Err(Error::InvalidConceptCount(0))));
    input.concept_count = MAX_CONCEPT_COUNT + 1;
    assert!(input.validate().is_err());
  }

  #[test]
  fn strategy_parses_case_insensitively() {
    assert_eq!("BOTH".parse::<Strategy>().unwrap(), Strategy::Both);
    assert_eq!("existing".parse::<Strategy>().unwrap(), Strategy::Existing);
    assert!("sideways".parse::<Strategy>().is_err());
  }
}
