//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to quiz logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{to_out, AnswerOut, ClientWsMessage, RoundOut, ServerWsMessage, StatsOut};
use crate::quiz;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "arith_trainer", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "arith_trainer", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = handle_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "arith_trainer", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "arith_trainer", "WebSocket disconnected");
}

/// Parse, dispatch, serialize response.
async fn handle_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "arith_trainer", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewExercise { topic } => {
      let ex = quiz::new_exercise(state, topic).await;
      ServerWsMessage::Exercise { exercise: to_out(&ex) }
    }

    ClientWsMessage::SubmitAnswer { exercise_id, answer } => {
      match quiz::submit_answer(state, &exercise_id, &answer).await {
        Ok(outcome) => {
          info!(target: "exercise", id = %exercise_id, correct = outcome.result.correct, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult(AnswerOut::from(&outcome))
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::StartRound => {
      let progress = quiz::start_round(state).await;
      ServerWsMessage::Round(RoundOut::from(&progress))
    }

    ClientWsMessage::RoundAnswer { round_id, answer } => {
      match quiz::answer_round(state, &round_id, &answer).await {
        Ok((outcome, progress)) => ServerWsMessage::RoundAnswerResult {
          result: AnswerOut::from(&outcome),
          round: RoundOut::from(&progress),
        },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetStats => match quiz::current_stats(state).await {
      Ok(stats) => ServerWsMessage::Stats(StatsOut::from(&stats)),
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}
