//! Domain models: topics, generated exercises, and grading outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five exercise categories.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
  Divisibility,
  Primality,
  Factorization,
  Exponentiation,
  Remainder,
}

impl Topic {
  pub const ALL: [Topic; 5] = [
    Topic::Divisibility,
    Topic::Primality,
    Topic::Factorization,
    Topic::Exponentiation,
    Topic::Remainder,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Topic::Divisibility => "divisibility",
      Topic::Primality => "primality",
      Topic::Factorization => "factorization",
      Topic::Exponentiation => "exponentiation",
      Topic::Remainder => "remainder",
    }
  }
}

impl fmt::Display for Topic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Topic {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    Topic::ALL
      .iter()
      .copied()
      .find(|t| t.as_str() == wanted)
      .ok_or_else(|| format!("unknown topic '{}'", s.trim()))
  }
}

/// One generated question. Immutable once created; discarded after grading.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
  pub id: String,
  pub topic: Topic,
  pub prompt: String,
  /// Canonical answer text; for factorization the "×"-joined ascending factors.
  pub answer: String,
  pub explanation: String,
  /// The integer the question is about (the number being factored, tested, etc.).
  pub subject_value: i64,
  /// Only filled for factorization exercises.
  #[serde(default)] pub expected_factors: Vec<i64>,
}

/// Outcome of grading one submission against one exercise.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeResult {
  pub correct: bool,
  pub expected_display: String,
  pub explanation: String,
}
