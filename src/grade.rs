//! Grading: submitted text + exercise -> verdict with an explanation.
//!
//! Non-factorization topics compare trimmed, lowercased strings exactly
//! (`"08"` is not `"8"`). Factorization answers are parsed into a multiset
//! and validated rule by rule; the first failing rule decides the message.

use crate::domain::{Exercise, GradeResult, Topic};
use crate::kernel::{is_prime, multiset_equals, parse_factor_tokens};
use crate::util::{join_factors_spaced, normalize_answer};

pub const FORMAT_HINT: &str =
  "Enter the prime factors separated by ×, x, *, commas or spaces, for example 2×2×3.";
pub const RANGE_HINT: &str = "Use whole numbers greater than or equal to 2 only.";

pub fn grade(ex: &Exercise, submitted: &str) -> GradeResult {
  match ex.topic {
    Topic::Factorization => grade_factorization(ex, submitted),
    _ => grade_exact(ex, submitted),
  }
}

fn grade_exact(ex: &Exercise, submitted: &str) -> GradeResult {
  let correct = normalize_answer(submitted) == normalize_answer(&ex.answer);
  let explanation = if correct {
    format!("Correct! {}", ex.explanation)
  } else {
    format!("The answer is {}. {}", ex.answer, ex.explanation)
  };
  GradeResult { correct, expected_display: ex.answer.clone(), explanation }
}

fn incorrect(ex: &Exercise, explanation: String) -> GradeResult {
  GradeResult { correct: false, expected_display: ex.answer.clone(), explanation }
}

fn grade_factorization(ex: &Exercise, submitted: &str) -> GradeResult {
  let n = ex.subject_value;
  let tokens = parse_factor_tokens(submitted);

  if tokens.is_empty() {
    return incorrect(ex, FORMAT_HINT.into());
  }

  // Decimals and out-of-range integers are not whole numbers we can check.
  if !tokens.invalid.is_empty() || tokens.values.iter().any(|&v| v < 2) {
    return incorrect(ex, RANGE_HINT.into());
  }
  let parsed = tokens.values;

  let mut not_prime: Vec<i64> = Vec::new();
  for &v in &parsed {
    if !is_prime(v) && !not_prime.contains(&v) {
      not_prime.push(v);
    }
  }
  if !not_prime.is_empty() {
    let list = not_prime.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
    let msg = if not_prime.len() == 1 {
      format!("{list} is not prime. Break it down further into prime factors.")
    } else {
      format!("Not prime: {list}. Break these numbers down further into prime factors.")
    };
    return incorrect(ex, msg);
  }

  match parsed.iter().try_fold(1i64, |acc, &v| acc.checked_mul(v)) {
    Some(product) if product == n => {}
    Some(product) => {
      return incorrect(
        ex,
        format!("Your factors multiply to {product}, but the number is {n}."),
      );
    }
    None => {
      return incorrect(ex, format!("Your factors multiply to far more than {n}."));
    }
  }

  // Unreachable for valid input: equal products of primes have equal multisets.
  if multiset_equals(&parsed, &ex.expected_factors) {
    let mut sorted = parsed;
    sorted.sort_unstable();
    GradeResult {
      correct: true,
      expected_display: ex.answer.clone(),
      explanation: format!("Correct! {n} = {}", join_factors_spaced(&sorted)),
    }
  } else {
    incorrect(
      ex,
      format!("Expected factorization: {n} = {}", join_factors_spaced(&ex.expected_factors)),
    )
  }
}
