//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Exercise, GradeResult, Topic};
use crate::kernel::{DivisibilityReport, FactorStep};
use crate::quiz::{AnswerOutcome, RoundProgress};
use crate::stats::{StatsRecord, TopicCounter};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewExercise {
        #[serde(default)]
        topic: Option<Topic>,
    },
    SubmitAnswer {
        #[serde(rename = "exerciseId")]
        exercise_id: String,
        answer: String,
    },
    StartRound,
    RoundAnswer {
        #[serde(rename = "roundId")]
        round_id: String,
        answer: String,
    },
    GetStats,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Exercise {
        exercise: ExerciseOut,
    },
    AnswerResult(AnswerOut),
    Round(RoundOut),
    RoundAnswerResult {
        result: AnswerOut,
        round: RoundOut,
    },
    Stats(StatsOut),
    Error {
        message: String,
    },
}

/// Exercise as shown to the learner: no canonical answer before grading.
#[derive(Debug, Serialize)]
pub struct ExerciseOut {
    pub id: String,
    pub topic: Topic,
    pub prompt: String,
}

pub fn to_out(ex: &Exercise) -> ExerciseOut {
    ExerciseOut {
        id: ex.id.clone(),
        topic: ex.topic,
        prompt: ex.prompt.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ExerciseQuery {
    pub topic: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "exerciseId")]
    pub exercise_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    pub expected: String,
    pub explanation: String,
    pub topic: Topic,
    #[serde(rename = "xpGained")]
    pub xp_gained: u32,
    #[serde(rename = "newMedals")]
    pub new_medals: Vec<String>,
    /// Totals after this answer.
    pub xp: u32,
    pub level: u32,
}

impl From<&AnswerOutcome> for AnswerOut {
    fn from(o: &AnswerOutcome) -> Self {
        let GradeResult { correct, expected_display, explanation } = o.result.clone();
        Self {
            correct,
            expected: expected_display,
            explanation,
            topic: o.topic,
            xp_gained: o.xp_gained,
            new_medals: o.new_medals.clone(),
            xp: o.stats.xp,
            level: o.stats.level(),
        }
    }
}

#[derive(Deserialize)]
pub struct RoundAnswerIn {
    #[serde(rename = "roundId")]
    pub round_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct RoundOut {
    #[serde(rename = "roundId")]
    pub round_id: String,
    pub answered: usize,
    pub length: usize,
    pub score: u32,
    pub finished: bool,
    pub next: Option<ExerciseOut>,
}

impl From<&RoundProgress> for RoundOut {
    fn from(p: &RoundProgress) -> Self {
        Self {
            round_id: p.round_id.clone(),
            answered: p.answered,
            length: p.length,
            score: p.score,
            finished: p.next.is_none(),
            next: p.next.as_ref().map(to_out),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoundAnswerOut {
    pub result: AnswerOut,
    pub round: RoundOut,
}

#[derive(Debug, Serialize)]
pub struct TopicStatsOut {
    pub topic: Topic,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
    pub xp: u32,
    pub level: u32,
    pub medals: Vec<String>,
    #[serde(rename = "bestRoundScore")]
    pub best_round_score: u32,
    pub sessions: u32,
    #[serde(rename = "totalQuestions")]
    pub total_questions: u32,
    #[serde(rename = "correctQuestions")]
    pub correct_questions: u32,
    pub accuracy: Option<f64>,
    pub topics: Vec<TopicStatsOut>,
    #[serde(rename = "primesWidgetCompleted")]
    pub primes_widget_completed: bool,
}

impl From<&StatsRecord> for StatsOut {
    fn from(s: &StatsRecord) -> Self {
        let topics = Topic::ALL
            .iter()
            .map(|&topic| {
                let TopicCounter { correct, wrong } = s.topic(topic);
                TopicStatsOut { topic, correct, wrong, accuracy: s.topic(topic).accuracy() }
            })
            .collect();
        Self {
            xp: s.xp,
            level: s.level(),
            medals: s.medals.iter().cloned().collect(),
            best_round_score: s.best_round_score,
            sessions: s.sessions,
            total_questions: s.total_questions,
            correct_questions: s.correct_questions,
            accuracy: s.accuracy(),
            topics,
            primes_widget_completed: s.primes_widget_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WidgetCompleteOut {
    #[serde(rename = "newMedals")]
    pub new_medals: Vec<String>,
    pub stats: StatsOut,
}

#[derive(Debug, Deserialize)]
pub struct NumberQuery {
    pub n: i64,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct PrimeCheckOut {
    pub n: i64,
    #[serde(rename = "isPrime")]
    pub is_prime: bool,
    #[serde(rename = "smallestFactor")]
    pub smallest_factor: Option<i64>,
}

pub type DivisibilityOut = DivisibilityReport;

#[derive(Serialize)]
pub struct FactorizeOut {
    pub n: i64,
    pub factors: Vec<i64>,
    pub steps: Vec<FactorStep>,
}

#[derive(Serialize)]
pub struct PrimesOut {
    pub limit: i64,
    pub primes: Vec<i64>,
}

#[derive(Deserialize)]
pub struct NormalizeIn {
    pub text: String,
}

#[derive(Serialize)]
pub struct NormalizeOut {
    pub values: Vec<i64>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
