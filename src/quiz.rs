//! Quiz orchestration shared by HTTP and WebSocket handlers.
//!
//! This includes:
//!   - single exercises: generate, store, grade once, record the answer
//!   - rounds of `round_length` exercises with a running score
//!   - the "find all primes" widget completion
//!
//! Grading stays pure (`grade::grade`); this layer turns each verdict into an
//! `AnswerDelta` and pushes it through the injected stats store.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Exercise, GradeResult, Topic};
use crate::error::QuizError;
use crate::grade::grade;
use crate::state::AppState;
use crate::stats::{AnswerDelta, StatsRecord};
use crate::util::trunc_for_log;

/// An open round: its exercises and how far the learner got.
#[derive(Clone, Debug)]
pub struct QuizRound {
  pub id: String,
  pub exercises: Vec<Exercise>,
  pub answered: usize,
  pub score: u32,
}

impl QuizRound {
  pub fn current(&self) -> Option<&Exercise> {
    self.exercises.get(self.answered)
  }

  pub fn length(&self) -> usize {
    self.exercises.len()
  }
}

#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub result: GradeResult,
  pub topic: Topic,
  pub xp_gained: u32,
  pub new_medals: Vec<String>,
  pub stats: StatsRecord,
}

#[derive(Clone, Debug)]
pub struct RoundProgress {
  pub round_id: String,
  pub answered: usize,
  pub length: usize,
  pub score: u32,
  /// Next exercise, `None` once the round is over.
  pub next: Option<Exercise>,
}

#[instrument(level = "info", skip(state))]
pub async fn new_exercise(state: &AppState, topic: Option<Topic>) -> Exercise {
  let ex = state.generate_exercise(topic).await;
  state.insert_exercise(ex.clone()).await;
  info!(target: "exercise", id = %ex.id, topic = %ex.topic, "Exercise served");
  ex
}

/// Grade an open single exercise and record the result. The exercise is
/// consumed once the result is saved; a failed save leaves it open for a retry.
#[instrument(level = "info", skip(state, answer), fields(%exercise_id, answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, exercise_id: &str, answer: &str) -> Result<AnswerOutcome, QuizError> {
  let ex = state
    .take_exercise(exercise_id)
    .await
    .ok_or_else(|| QuizError::UnknownExercise(exercise_id.to_string()))?;
  let (result, delta) = grade_answer(state, &ex, answer);
  match state.update_stats(|s| s.apply_answer(delta)).await {
    Ok((stats, new_medals)) => {
      log_graded(&ex, &result, answer);
      Ok(AnswerOutcome { result, topic: ex.topic, xp_gained: delta.xp, new_medals, stats })
    }
    Err(e) => {
      warn!(target: "exercise", id = %ex.id, error = %e, "Answer not recorded; exercise kept open");
      state.insert_exercise(ex).await;
      Err(e.into())
    }
  }
}

fn grade_answer(state: &AppState, ex: &Exercise, answer: &str) -> (GradeResult, AnswerDelta) {
  let result = grade(ex, answer);
  let delta = AnswerDelta::from_grade(ex.topic, &result, state.config.xp_per_correct);
  (result, delta)
}

fn log_graded(ex: &Exercise, result: &GradeResult, answer: &str) {
  info!(
    target: "exercise",
    id = %ex.id,
    topic = %ex.topic,
    correct = result.correct,
    answer = %trunc_for_log(answer, 40),
    "Answer graded"
  );
}

#[instrument(level = "info", skip(state))]
pub async fn start_round(state: &AppState) -> RoundProgress {
  let length = state.config.round_length.max(1);
  let mut exercises = Vec::with_capacity(length);
  for _ in 0..length {
    exercises.push(state.generate_exercise(None).await);
  }
  let round = QuizRound { id: Uuid::new_v4().to_string(), exercises, answered: 0, score: 0 };
  let progress = RoundProgress {
    round_id: round.id.clone(),
    answered: 0,
    length,
    score: 0,
    next: round.current().cloned(),
  };
  state.insert_round(round).await;
  info!(target: "exercise", round_id = %progress.round_id, length, "Round started");
  progress
}

/// Grade the current exercise of a round and advance it. The final answer
/// closes the round and records it (session count, best score, medals) in
/// the same stats write as the answer itself. Nothing advances if that write fails.
#[instrument(level = "info", skip(state, answer), fields(%round_id, answer_len = answer.len()))]
pub async fn answer_round(
  state: &AppState,
  round_id: &str,
  answer: &str,
) -> Result<(AnswerOutcome, RoundProgress), QuizError> {
  let mut rounds = state.rounds.write().await;
  let round = rounds
    .get_mut(round_id)
    .ok_or_else(|| QuizError::UnknownRound(round_id.to_string()))?;
  let ex = round
    .current()
    .cloned()
    .ok_or_else(|| QuizError::UnknownRound(round_id.to_string()))?;

  let (result, delta) = grade_answer(state, &ex, answer);
  let answered = round.answered + 1;
  let score = round.score + u32::from(result.correct);
  let length = round.length();
  let finished = answered >= length;

  let (stats, new_medals) = state
    .update_stats(|s| {
      let mut medals = s.apply_answer(delta);
      if finished {
        medals.extend(s.apply_round(score, length as u32));
      }
      medals
    })
    .await?;
  log_graded(&ex, &result, answer);

  round.answered = answered;
  round.score = score;
  let progress = RoundProgress {
    round_id: round.id.clone(),
    answered,
    length,
    score,
    next: round.current().cloned(),
  };
  if finished {
    rounds.remove(round_id);
    info!(target: "exercise", %round_id, score, length, "Round finished");
  }
  let outcome = AnswerOutcome { result, topic: ex.topic, xp_gained: delta.xp, new_medals, stats };
  Ok((outcome, progress))
}

/// The learner found every prime in the widget's grid.
#[instrument(level = "info", skip(state))]
pub async fn complete_primes_widget(state: &AppState) -> Result<(StatsRecord, Vec<String>), QuizError> {
  Ok(state.update_stats(|s| s.mark_primes_found()).await?)
}

#[instrument(level = "debug", skip(state))]
pub async fn current_stats(state: &AppState) -> Result<StatsRecord, QuizError> {
  Ok(state.load_stats().await?)
}
