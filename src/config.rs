//! Loading trainer configuration (reward values, storage path, exercise pools) from TOML.
//!
//! Every field is optional; see `TrainerConfig` and `ExercisePools` for the schema
//! and defaults. A missing or broken file never stops the server.

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::kernel::{is_prime, smallest_factor};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
  /// XP credited for each correct answer.
  pub xp_per_correct: u32,
  /// Number of exercises in a quiz round.
  pub round_length: usize,
  pub stats_path: String,
  /// Fixed RNG seed for reproducible sessions (demos, classroom projectors).
  pub rng_seed: Option<u64>,
  /// Unanswered single exercises kept in memory; the oldest is evicted past this.
  pub max_open_exercises: usize,
  /// Unfinished rounds kept in memory; the oldest is evicted past this.
  pub max_open_rounds: usize,
  pub pools: ExercisePools,
}

impl Default for TrainerConfig {
  fn default() -> Self {
    Self {
      xp_per_correct: 10,
      round_length: 5,
      stats_path: "./data/stats.json".into(),
      rng_seed: None,
      max_open_exercises: 1000,
      max_open_rounds: 200,
      pools: ExercisePools::default(),
    }
  }
}

/// Candidate tables and ranges the generator draws from. Ranges are inclusive.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExercisePools {
  pub divisibility_min: i64,
  pub divisibility_max: i64,
  pub divisors: Vec<i64>,
  pub primality_candidates: Vec<i64>,
  pub factorization_subjects: Vec<i64>,
  pub exponent_bases: Vec<i64>,
  pub exponents: Vec<u32>,
  pub dividend_min: i64,
  pub dividend_max: i64,
  pub divisor_min: i64,
  pub divisor_max: i64,
}

impl Default for ExercisePools {
  fn default() -> Self {
    Self {
      divisibility_min: 10,
      divisibility_max: 199,
      divisors: vec![2, 3, 5, 10],
      primality_candidates: vec![11, 13, 15, 17, 19, 21, 22, 23, 25, 27, 29, 31, 33],
      factorization_subjects: vec![12, 18, 20, 24, 36, 45, 50, 60],
      exponent_bases: vec![2, 3, 4, 5],
      exponents: vec![2, 3, 4],
      dividend_min: 10,
      dividend_max: 99,
      divisor_min: 3,
      divisor_max: 11,
    }
  }
}

fn ordered(lo: i64, hi: i64) -> (i64, i64) {
  if lo <= hi { (lo, hi) } else { (hi, lo) }
}

impl ExercisePools {
  /// Repair a user-supplied table so generation can never divide by zero,
  /// draw from an empty list, or ask to factor a prime.
  pub fn sanitized(mut self) -> Self {
    let defaults = ExercisePools::default();

    (self.divisibility_min, self.divisibility_max) = ordered(self.divisibility_min, self.divisibility_max);
    (self.dividend_min, self.dividend_max) = ordered(self.dividend_min, self.dividend_max);
    (self.divisor_min, self.divisor_max) = ordered(self.divisor_min, self.divisor_max);
    if self.divisor_min < 2 {
      warn!(target: "arith_trainer", divisor_min = self.divisor_min, "Remainder divisor_min below 2; raising to 2");
      self.divisor_min = 2;
      self.divisor_max = self.divisor_max.max(2);
    }

    self.divisors.retain(|&d| d >= 2);
    self.factorization_subjects.retain(|&n| smallest_factor(n).is_some());
    self.exponents.retain(|&e| (2..=12).contains(&e));
    if self.exponents.is_empty() {
      self.exponents = defaults.exponents.clone();
    }
    let max_exp = self.exponents.iter().copied().max().unwrap_or(2);
    self.exponent_bases.retain(|&b| b >= 0 && b.checked_pow(max_exp).is_some());

    if self.divisors.is_empty() {
      warn!(target: "arith_trainer", "No usable divisors configured; using defaults");
      self.divisors = defaults.divisors;
    }
    if self.primality_candidates.is_empty() {
      warn!(target: "arith_trainer", "No primality candidates configured; using defaults");
      self.primality_candidates = defaults.primality_candidates;
    }
    if self.factorization_subjects.is_empty() {
      warn!(target: "arith_trainer", "No composite factorization subjects configured; using defaults");
      self.factorization_subjects = defaults.factorization_subjects;
    }
    if self.exponent_bases.is_empty() {
      self.exponent_bases = defaults.exponent_bases;
    }
    if !self.primality_candidates.iter().any(|&n| is_prime(n)) {
      warn!(target: "arith_trainer", "Primality pool has no primes; every answer will be \"no\"");
    }
    self
  }
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH; defaults on any IO/parse error.
/// STATS_PATH overrides the configured stats file.
pub fn load_config_from_env() -> TrainerConfig {
  let mut cfg = match std::env::var("TRAINER_CONFIG_PATH").ok() {
    Some(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match parse_config(&s) {
        Ok(cfg) => {
          info!(target: "arith_trainer", %path, "Loaded trainer config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "arith_trainer", %path, error = %e, "Failed to parse TOML config");
          TrainerConfig::default()
        }
      },
      Err(e) => {
        error!(target: "arith_trainer", %path, error = %e, "Failed to read TOML config file");
        TrainerConfig::default()
      }
    },
    None => TrainerConfig::default(),
  };

  if let Ok(p) = std::env::var("STATS_PATH") {
    if !p.trim().is_empty() {
      cfg.stats_path = p;
    }
  }
  cfg
}

/// Parse TOML text and sanitize the pools.
pub fn parse_config(s: &str) -> Result<TrainerConfig, toml::de::Error> {
  let mut cfg = toml::from_str::<TrainerConfig>(s)?;
  cfg.pools = cfg.pools.sanitized();
  if cfg.round_length == 0 {
    cfg.round_length = TrainerConfig::default().round_length;
  }
  cfg.max_open_exercises = cfg.max_open_exercises.max(1);
  cfg.max_open_rounds = cfg.max_open_rounds.max(1);
  Ok(cfg)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_toml_gives_defaults() {
    let cfg = parse_config("").expect("parse");
    assert_eq!(cfg.xp_per_correct, 10);
    assert_eq!(cfg.round_length, 5);
    assert_eq!((cfg.max_open_exercises, cfg.max_open_rounds), (1000, 200));
    assert_eq!(cfg.pools, ExercisePools::default());
  }

  #[test]
  fn partial_pools_override_only_given_fields() {
    let cfg = parse_config(
      r#"
        xp_per_correct = 25
        [pools]
        factorization_subjects = [72, 84]
        divisor_min = 12
        divisor_max = 4
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.xp_per_correct, 25);
    assert_eq!(cfg.pools.factorization_subjects, vec![72, 84]);
    assert_eq!((cfg.pools.divisor_min, cfg.pools.divisor_max), (4, 12));
    assert_eq!(cfg.pools.divisors, vec![2, 3, 5, 10]);
  }

  #[test]
  fn sanitize_drops_unusable_entries() {
    let pools = ExercisePools {
      divisors: vec![0, 1, 7],
      factorization_subjects: vec![13, 1, 0, 28],
      primality_candidates: vec![],
      divisor_min: 0,
      divisor_max: 1,
      ..ExercisePools::default()
    }
    .sanitized();
    assert_eq!(pools.divisors, vec![7]);
    assert_eq!(pools.factorization_subjects, vec![28]);
    assert_eq!(pools.primality_candidates, ExercisePools::default().primality_candidates);
    assert_eq!((pools.divisor_min, pools.divisor_max), (2, 2));
  }

  #[test]
  fn zero_caps_are_raised_to_one() {
    let cfg = parse_config("max_open_exercises = 0\nmax_open_rounds = 0").expect("parse");
    assert_eq!((cfg.max_open_exercises, cfg.max_open_rounds), (1, 1));
  }

  #[test]
  fn bad_toml_is_an_error() {
    assert!(parse_config("xp_per_correct = \"lots\"").is_err());
  }
}
