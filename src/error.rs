//! Error types for the fallible outer layers (stats persistence, quiz orchestration).
//!
//! The arithmetic kernel and the exercise engine never fail; these only
//! cover storage and lookups of exercises/rounds by id.

use thiserror::Error;

/// Failures reading or writing the stats record.
#[derive(Debug, Error)]
pub enum StatsError {
  #[error("stats I/O error at {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("stats file {path} is not valid JSON: {source}")]
  Json {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Failures of quiz-level operations.
#[derive(Debug, Error)]
pub enum QuizError {
  #[error("unknown exercise id: {0}")]
  UnknownExercise(String),

  #[error("unknown round id: {0}")]
  UnknownRound(String),

  #[error(transparent)]
  Stats(#[from] StatsError),
}

impl QuizError {
  /// Returns `true` if the caller referenced something that does not exist (or no longer does).
  pub fn is_client_error(&self) -> bool {
    !matches!(self, QuizError::Stats(_))
  }
}
