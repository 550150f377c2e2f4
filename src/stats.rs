//! Progress tracking: the persisted stats record, the pure deltas the quiz
//! computes from grading results, medal rules, and the storage interface.
//!
//! The engine never touches storage. `quiz` computes an `AnswerDelta`, applies
//! it to a loaded `StatsRecord`, and hands the record back to a `StatsStore`.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::domain::{GradeResult, Topic};
use crate::error::StatsError;

pub const XP_PER_LEVEL: u32 = 100;

pub const MEDAL_FIRST_CORRECT: &str = "first_correct";
pub const MEDAL_TEN_CORRECT: &str = "ten_correct";
pub const MEDAL_XP_100: &str = "xp_100";
pub const MEDAL_PERFECT_ROUND: &str = "perfect_round";
pub const MEDAL_ALL_TOPICS: &str = "all_topics";
pub const MEDAL_PRIME_HUNTER: &str = "prime_hunter";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopicCounter {
  pub correct: u32,
  pub wrong: u32,
}

impl TopicCounter {
  pub fn total(&self) -> u32 {
    self.correct + self.wrong
  }

  /// Share of correct answers, `None` before the first answer.
  pub fn accuracy(&self) -> Option<f64> {
    match self.total() {
      0 => None,
      t => Some(self.correct as f64 / t as f64),
    }
  }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatsRecord {
  pub xp: u32,
  pub medals: BTreeSet<String>,
  pub best_round_score: u32,
  pub sessions: u32,
  pub total_questions: u32,
  pub correct_questions: u32,
  pub per_topic: BTreeMap<Topic, TopicCounter>,
  pub primes_widget_completed: bool,
}

/// What one graded answer changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnswerDelta {
  pub topic: Topic,
  pub correct: bool,
  pub xp: u32,
}

impl AnswerDelta {
  pub fn from_grade(topic: Topic, result: &GradeResult, xp_per_correct: u32) -> Self {
    Self {
      topic,
      correct: result.correct,
      xp: if result.correct { xp_per_correct } else { 0 },
    }
  }
}

impl StatsRecord {
  pub fn level(&self) -> u32 {
    self.xp / XP_PER_LEVEL + 1
  }

  pub fn accuracy(&self) -> Option<f64> {
    match self.total_questions {
      0 => None,
      t => Some(self.correct_questions as f64 / t as f64),
    }
  }

  pub fn topic(&self, topic: Topic) -> TopicCounter {
    self.per_topic.get(&topic).copied().unwrap_or_default()
  }

  /// Apply one graded answer. Returns medals earned by this update.
  pub fn apply_answer(&mut self, delta: AnswerDelta) -> Vec<String> {
    self.total_questions += 1;
    let counter = self.per_topic.entry(delta.topic).or_default();
    if delta.correct {
      counter.correct += 1;
      self.correct_questions += 1;
      self.xp = self.xp.saturating_add(delta.xp);
    } else {
      counter.wrong += 1;
    }
    self.award_medals()
  }

  /// Record a finished round of `length` exercises with `score` correct.
  pub fn apply_round(&mut self, score: u32, length: u32) -> Vec<String> {
    self.sessions += 1;
    self.best_round_score = self.best_round_score.max(score);
    let mut earned = Vec::new();
    if length > 0 && score == length && self.medals.insert(MEDAL_PERFECT_ROUND.to_string()) {
      earned.push(MEDAL_PERFECT_ROUND.to_string());
    }
    earned.extend(self.award_medals());
    earned
  }

  pub fn mark_primes_found(&mut self) -> Vec<String> {
    self.primes_widget_completed = true;
    self.award_medals()
  }

  /// Threshold medals. Medals are never taken away.
  fn award_medals(&mut self) -> Vec<String> {
    let all_topics = Topic::ALL.iter().all(|t| self.topic(*t).correct > 0);
    let rules = [
      (MEDAL_FIRST_CORRECT, self.correct_questions >= 1),
      (MEDAL_TEN_CORRECT, self.correct_questions >= 10),
      (MEDAL_XP_100, self.xp >= 100),
      (MEDAL_ALL_TOPICS, all_topics),
      (MEDAL_PRIME_HUNTER, self.primes_widget_completed),
    ];
    let mut earned = Vec::new();
    for (medal, reached) in rules {
      if reached && self.medals.insert(medal.to_string()) {
        earned.push(medal.to_string());
      }
    }
    earned
  }
}

/// Load/save interface for the stats record.
pub trait StatsStore: Send + Sync {
  fn load(&self) -> Result<StatsRecord, StatsError>;
  fn save(&self, record: &StatsRecord) -> Result<(), StatsError>;
}

/// Pretty-printed JSON file. A missing file reads as a fresh record.
/// Saves go through a sibling temp file renamed over the target, so readers
/// see either the old record or the new one.
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn io_err(&self, source: std::io::Error) -> StatsError {
    StatsError::Io { path: self.path.display().to_string(), source }
  }

  fn json_err(&self, source: serde_json::Error) -> StatsError {
    StatsError::Json { path: self.path.display().to_string(), source }
  }
}

impl StatsStore for JsonFileStore {
  #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
  fn load(&self) -> Result<StatsRecord, StatsError> {
    let text = match std::fs::read_to_string(&self.path) {
      Ok(t) => t,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(target: "stats", "No stats file yet; starting fresh");
        return Ok(StatsRecord::default());
      }
      Err(e) => return Err(self.io_err(e)),
    };
    serde_json::from_str(&text).map_err(|e| self.json_err(e))
  }

  #[instrument(level = "debug", skip(self, record), fields(path = %self.path.display(), xp = record.xp))]
  fn save(&self, record: &StatsRecord) -> Result<(), StatsError> {
    let dir = match self.path.parent() {
      Some(d) if !d.as_os_str().is_empty() => d,
      _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
    let text = serde_json::to_string_pretty(record).map_err(|e| self.json_err(e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
    tmp.write_all(text.as_bytes()).map_err(|e| self.io_err(e))?;
    tmp.as_file().sync_all().map_err(|e| self.io_err(e))?;
    tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
    Ok(())
  }
}

/// In-process store for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
  record: std::sync::Mutex<StatsRecord>,
}

#[cfg(test)]
impl StatsStore for MemoryStore {
  fn load(&self) -> Result<StatsRecord, StatsError> {
    Ok(self.record.lock().unwrap_or_else(|e| e.into_inner()).clone())
  }

  fn save(&self, record: &StatsRecord) -> Result<(), StatsError> {
    *self.record.lock().unwrap_or_else(|e| e.into_inner()) = record.clone();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn graded(correct: bool) -> GradeResult {
    GradeResult { correct, expected_display: "8".into(), explanation: String::new() }
  }

  #[test]
  fn delta_only_awards_xp_when_correct() {
    assert_eq!(AnswerDelta::from_grade(Topic::Remainder, &graded(true), 10).xp, 10);
    assert_eq!(AnswerDelta::from_grade(Topic::Remainder, &graded(false), 10).xp, 0);
  }

  #[test]
  fn apply_answer_updates_counters() {
    let mut s = StatsRecord::default();
    let earned = s.apply_answer(AnswerDelta { topic: Topic::Primality, correct: true, xp: 10 });
    assert_eq!(earned, vec![MEDAL_FIRST_CORRECT.to_string()]);
    s.apply_answer(AnswerDelta { topic: Topic::Primality, correct: false, xp: 0 });

    assert_eq!(s.xp, 10);
    assert_eq!(s.total_questions, 2);
    assert_eq!(s.correct_questions, 1);
    assert_eq!(s.topic(Topic::Primality), TopicCounter { correct: 1, wrong: 1 });
    assert_eq!(s.topic(Topic::Primality).accuracy(), Some(0.5));
    assert_eq!(s.topic(Topic::Remainder).accuracy(), None);
    assert_eq!(s.accuracy(), Some(0.5));
  }

  #[test]
  fn threshold_medals_and_level() {
    let mut s = StatsRecord::default();
    for i in 0..10 {
      let topic = Topic::ALL[i % Topic::ALL.len()];
      s.apply_answer(AnswerDelta { topic, correct: true, xp: 10 });
    }
    assert_eq!(s.xp, 100);
    assert_eq!(s.level(), 2);
    for m in [MEDAL_FIRST_CORRECT, MEDAL_TEN_CORRECT, MEDAL_XP_100, MEDAL_ALL_TOPICS] {
      assert!(s.medals.contains(m), "missing {m}");
    }
    assert!(!s.medals.contains(MEDAL_PRIME_HUNTER));
    // already held: nothing new
    assert!(s.apply_answer(AnswerDelta { topic: Topic::Remainder, correct: true, xp: 10 }).is_empty());
  }

  #[test]
  fn rounds_track_sessions_best_and_perfect() {
    let mut s = StatsRecord::default();
    assert!(s.apply_round(3, 5).is_empty());
    assert_eq!(s.apply_round(5, 5), vec![MEDAL_PERFECT_ROUND.to_string()]);
    s.apply_round(2, 5);
    assert_eq!(s.sessions, 3);
    assert_eq!(s.best_round_score, 5);
  }

  #[test]
  fn primes_widget_awards_medal_once() {
    let mut s = StatsRecord::default();
    assert_eq!(s.mark_primes_found(), vec![MEDAL_PRIME_HUNTER.to_string()]);
    assert!(s.mark_primes_found().is_empty());
    assert!(s.primes_widget_completed);
  }

  #[test]
  fn json_store_roundtrip_and_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("nested").join("stats.json"));
    assert_eq!(store.load().expect("load"), StatsRecord::default());

    let mut s = StatsRecord::default();
    s.apply_answer(AnswerDelta { topic: Topic::Factorization, correct: true, xp: 10 });
    s.mark_primes_found();
    store.save(&s).expect("save");
    assert_eq!(store.load().expect("reload"), s);

    let raw = std::fs::read_to_string(store.path()).expect("read");
    assert!(raw.contains("\"factorization\""));
  }

  #[test]
  fn json_store_replaces_file_whole() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    let store = JsonFileStore::new(&path);

    let mut big = StatsRecord::default();
    for i in 0..50 {
      big.medals.insert(format!("medal_{i:03}"));
    }
    store.save(&big).expect("save big");
    let small = StatsRecord { xp: 7, ..StatsRecord::default() };
    store.save(&small).expect("save small");

    // a shorter record leaves no tail of the longer one behind
    let raw = std::fs::read_to_string(&path).expect("read");
    let parsed: StatsRecord = serde_json::from_str(&raw).expect("whole json");
    assert_eq!(parsed, small);

    // only the target remains: the temp file was renamed, not left around
    let names: Vec<_> = std::fs::read_dir(dir.path())
      .expect("read_dir")
      .map(|e| e.expect("entry").file_name())
      .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("stats.json")]);
  }

  #[test]
  fn failed_save_keeps_previous_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    let store = JsonFileStore::new(&path);
    let first = StatsRecord { xp: 40, ..StatsRecord::default() };
    store.save(&first).expect("save");

    // a directory squatting on the target makes the final rename fail
    let blocked = JsonFileStore::new(dir.path().join("blocked"));
    std::fs::create_dir(blocked.path()).expect("mkdir");
    std::fs::write(blocked.path().join("keep"), "x").expect("write");
    assert!(matches!(blocked.save(&first), Err(StatsError::Io { .. })));

    assert_eq!(store.load().expect("load"), first);
    let leftovers = std::fs::read_dir(dir.path()).expect("read_dir").count();
    assert_eq!(leftovers, 2, "temp file cleaned up after failed rename");
  }

  #[test]
  fn json_store_reports_corrupt_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("stats.json");
    std::fs::write(&path, "{ not json").expect("write");
    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StatsError::Json { .. }));
  }

  #[test]
  fn older_records_with_missing_fields_still_load() {
    let s: StatsRecord = serde_json::from_str(r#"{ "xp": 40, "medals": ["first_correct"] }"#).expect("parse");
    assert_eq!(s.xp, 40);
    assert_eq!(s.sessions, 0);
    assert!(s.per_topic.is_empty());
  }

  #[test]
  fn memory_store_keeps_last_save() {
    let store = MemoryStore::default();
    let mut s = store.load().unwrap();
    s.xp = 30;
    store.save(&s).unwrap();
    assert_eq!(store.load().unwrap().xp, 30);
  }
}
