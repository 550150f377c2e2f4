//! Application state: exercise and round stores, the random source, and the stats store.
//!
//! This module owns:
//!   - open exercises by id (generated, not yet graded)
//!   - open quiz rounds by id
//!   - the shared `RandomSource` (seeded from config when `rng_seed` is set)
//!   - the injected `StatsStore`, with a lock serializing load-modify-save
//!
//! Open exercises and rounds are capped; once full, the oldest entry is dropped.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::config::{load_config_from_env, TrainerConfig};
use crate::domain::{Exercise, Topic};
use crate::error::StatsError;
use crate::generate::generate;
use crate::quiz::QuizRound;
use crate::random::{RandomSource, SeededRandom};
use crate::stats::{JsonFileStore, StatsRecord, StatsStore};

/// Id-keyed items waiting for an answer, oldest first.
#[derive(Debug)]
pub struct OpenItems<T> {
    items: HashMap<String, T>,
    order: VecDeque<String>,
    cap: usize,
}

impl<T> OpenItems<T> {
    pub fn new(cap: usize) -> Self {
        Self { items: HashMap::new(), order: VecDeque::new(), cap: cap.max(1) }
    }

    /// Insert (or refresh) an item; returns the ids evicted to stay under the cap.
    pub fn insert(&mut self, id: String, item: T) -> Vec<String> {
        if self.items.insert(id.clone(), item).is_some() {
            self.order.retain(|k| k != &id);
        }
        self.order.push_back(id);
        let mut evicted = Vec::new();
        while self.items.len() > self.cap {
            match self.order.pop_front() {
                Some(old) => {
                    self.items.remove(&old);
                    evicted.push(old);
                }
                None => break,
            }
        }
        evicted
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let item = self.items.remove(id)?;
        self.order.retain(|k| k != id);
        Some(item)
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct AppState {
    pub config: TrainerConfig,
    pub exercises: Arc<RwLock<OpenItems<Exercise>>>,
    pub rounds: Arc<RwLock<OpenItems<QuizRound>>>,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    stats: Arc<dyn StatsStore>,
    stats_guard: Mutex<()>,
}

impl AppState {
    /// Build state from env: load config, open the JSON stats file, seed the RNG.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env();
        let store = JsonFileStore::new(&config.stats_path);
        info!(
            target: "arith_trainer",
            stats_path = %store.path().display(),
            xp_per_correct = config.xp_per_correct,
            round_length = config.round_length,
            max_open_exercises = config.max_open_exercises,
            max_open_rounds = config.max_open_rounds,
            seeded = config.rng_seed.is_some(),
            "Trainer configured"
        );
        let rng = SeededRandom::new(config.rng_seed);
        Self::with_parts(config, Box::new(rng), Arc::new(store))
    }

    /// Assemble state from explicit collaborators (tests, embedding).
    pub fn with_parts(
        config: TrainerConfig,
        rng: Box<dyn RandomSource + Send>,
        stats: Arc<dyn StatsStore>,
    ) -> Self {
        Self {
            exercises: Arc::new(RwLock::new(OpenItems::new(config.max_open_exercises))),
            rounds: Arc::new(RwLock::new(OpenItems::new(config.max_open_rounds))),
            config,
            rng: Mutex::new(rng),
            stats,
            stats_guard: Mutex::new(()),
        }
    }

    /// Generate a fresh exercise from the configured pools (not stored).
    #[instrument(level = "debug", skip(self))]
    pub async fn generate_exercise(&self, topic: Option<Topic>) -> Exercise {
        let mut rng = self.rng.lock().await;
        let ex = generate(&mut **rng, &self.config.pools, topic);
        debug!(target: "exercise", id = %ex.id, topic = %ex.topic, subject = ex.subject_value, "Generated exercise");
        ex
    }

    #[instrument(level = "debug", skip(self, ex), fields(id = %ex.id))]
    pub async fn insert_exercise(&self, ex: Exercise) {
        let evicted = self.exercises.write().await.insert(ex.id.clone(), ex);
        if !evicted.is_empty() {
            debug!(target: "exercise", count = evicted.len(), "Evicted stale exercises");
        }
    }

    /// Remove an open exercise; graded exercises are discarded.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn take_exercise(&self, id: &str) -> Option<Exercise> {
        self.exercises.write().await.remove(id)
    }

    #[instrument(level = "debug", skip(self, round), fields(id = %round.id))]
    pub async fn insert_round(&self, round: QuizRound) {
        let evicted = self.rounds.write().await.insert(round.id.clone(), round);
        if !evicted.is_empty() {
            debug!(target: "exercise", count = evicted.len(), "Evicted stale rounds");
        }
    }

    pub async fn load_stats(&self) -> Result<StatsRecord, StatsError> {
        let _guard = self.stats_guard.lock().await;
        self.stats.load()
    }

    /// Load, mutate and save the stats record as one step.
    #[instrument(level = "debug", skip(self, f))]
    pub async fn update_stats<T>(
        &self,
        f: impl FnOnce(&mut StatsRecord) -> T,
    ) -> Result<(StatsRecord, T), StatsError> {
        let _guard = self.stats_guard.lock().await;
        let mut record = self.stats.load()?;
        let out = f(&mut record);
        self.stats.save(&record)?;
        debug!(target: "stats", xp = record.xp, total = record.total_questions, "Stats saved");
        Ok((record, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_items_evict_oldest_past_cap() {
        let mut open = OpenItems::new(3);
        for i in 0..3 {
            assert!(open.insert(format!("e{i}"), i).is_empty());
        }
        assert_eq!(open.insert("e3".into(), 3), vec!["e0".to_string()]);
        assert_eq!(open.len(), 3);
        assert!(!open.contains("e0"));

        // removing frees a slot without touching the others
        assert_eq!(open.remove("e2"), Some(2));
        assert!(open.insert("e4".into(), 4).is_empty());
        assert_eq!(open.insert("e5".into(), 5), vec!["e1".to_string()]);
        assert!(open.contains("e3") && open.contains("e4") && open.contains("e5"));
    }

    #[test]
    fn reinserting_refreshes_age() {
        let mut open = OpenItems::new(2);
        open.insert("a".into(), 1);
        open.insert("b".into(), 2);
        open.insert("a".into(), 10);
        assert_eq!(open.insert("c".into(), 3), vec!["b".to_string()]);
        assert_eq!(open.get_mut("a").copied(), Some(10));
        assert!(!open.is_empty());
    }
}
