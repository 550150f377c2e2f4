//! HTTP endpoint handlers. These are thin wrappers that forward to quiz logic or the kernel.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{error, info, instrument, warn};

use crate::domain::Topic;
use crate::error::QuizError;
use crate::kernel;
use crate::protocol::*;
use crate::quiz;
use crate::state::AppState;

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let status = if self.is_client_error() {
      StatusCode::NOT_FOUND
    } else {
      error!(target: "stats", error = %self, "Stats store failure");
      StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

fn bad_request(message: String) -> Response {
  (StatusCode::BAD_REQUEST, Json(ErrorOut { error: message })).into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_exercise(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ExerciseQuery>,
) -> Response {
  let topic = match q.topic.as_deref().map(str::parse::<Topic>).transpose() {
    Ok(t) => t,
    Err(e) => {
      warn!(target: "exercise", error = %e, "Rejected exercise request");
      return bad_request(e);
    }
  };
  let ex = quiz::new_exercise(&state, topic).await;
  Json(to_out(&ex)).into_response()
}

#[instrument(level = "info", skip(state, body), fields(%body.exercise_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, QuizError> {
  let outcome = quiz::submit_answer(&state, &body.exercise_id, &body.answer).await?;
  info!(target: "exercise", id = %body.exercise_id, correct = outcome.result.correct, "HTTP answer evaluated");
  Ok(Json(AnswerOut::from(&outcome)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_round(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let progress = quiz::start_round(&state).await;
  Json(RoundOut::from(&progress))
}

#[instrument(level = "info", skip(state, body), fields(%body.round_id, answer_len = body.answer.len()))]
pub async fn http_post_round_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RoundAnswerIn>,
) -> Result<Json<RoundAnswerOut>, QuizError> {
  let (outcome, progress) = quiz::answer_round(&state, &body.round_id, &body.answer).await?;
  Ok(Json(RoundAnswerOut { result: AnswerOut::from(&outcome), round: RoundOut::from(&progress) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsOut>, QuizError> {
  let stats = quiz::current_stats(&state).await?;
  Ok(Json(StatsOut::from(&stats)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_primes_complete(
  State(state): State<Arc<AppState>>,
) -> Result<Json<WidgetCompleteOut>, QuizError> {
  let (stats, new_medals) = quiz::complete_primes_widget(&state).await?;
  Ok(Json(WidgetCompleteOut { new_medals, stats: StatsOut::from(&stats) }))
}

/// Reject numbers too large for trial division on a request thread.
fn bounded_n(n: i64) -> Result<i64, Response> {
  if n.unsigned_abs() > kernel::KERNEL_N_MAX.unsigned_abs() {
    warn!(target: "arith_trainer", n, max = kernel::KERNEL_N_MAX, "Rejected kernel request");
    return Err(bad_request(format!("n must be between -{0} and {0}", kernel::KERNEL_N_MAX)));
  }
  Ok(n)
}

#[instrument(level = "debug")]
pub async fn http_get_divisibility(Query(q): Query<NumberQuery>) -> Response {
  match bounded_n(q.n) {
    Ok(n) => Json::<DivisibilityOut>(kernel::divisibility_report(n)).into_response(),
    Err(resp) => resp,
  }
}

#[instrument(level = "debug")]
pub async fn http_get_prime(Query(q): Query<NumberQuery>) -> Response {
  let n = match bounded_n(q.n) {
    Ok(n) => n,
    Err(resp) => return resp,
  };
  Json(PrimeCheckOut {
    n,
    is_prime: kernel::is_prime(n),
    smallest_factor: kernel::smallest_factor(n),
  })
  .into_response()
}

#[instrument(level = "debug")]
pub async fn http_get_factorize(Query(q): Query<NumberQuery>) -> Response {
  let n = match bounded_n(q.n) {
    Ok(n) => n,
    Err(resp) => return resp,
  };
  Json(FactorizeOut {
    n,
    factors: kernel::prime_factors(n),
    steps: kernel::factorization_steps(n),
  })
  .into_response()
}

#[instrument(level = "debug")]
pub async fn http_get_primes(Query(q): Query<LimitQuery>) -> Json<PrimesOut> {
  let limit = q.limit.unwrap_or(100).min(kernel::PRIMES_LIMIT_MAX);
  Json(PrimesOut { limit, primes: kernel::primes_up_to(limit) })
}

#[instrument(level = "debug", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_normalize(Json(body): Json<NormalizeIn>) -> Json<NormalizeOut> {
  Json(NormalizeOut { values: kernel::normalize_factor_list(&body.text) })
}
