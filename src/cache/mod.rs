//! Fitted-model cache.
//!
//! Models are memoized by the full tuple that determines them: data
//! snapshot, pollutant, target, feature set, model kind, country set and
//! the hyperparameters the kind reads. Entries are shared as
//! `Arc<FittedModel>` and evicted least-recently-used once the cache is
//! full.

use crate::error::Result;
use crate::loader::SourceVersion;
use crate::model::{FittedModel, Hyperparameters, ModelKind};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Default number of fitted models kept.
pub const DEFAULT_CAPACITY: usize = 32;

/// Everything that determines a fitted model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FitKey {
    /// Data snapshot.
    pub source_version: SourceVersion,
    /// Pollutant filter.
    pub pollutant: String,
    /// Target column.
    pub target: String,
    /// Feature columns, primary first.
    pub feature_set: Vec<String>,
    /// Model family.
    pub model_kind: ModelKind,
    /// Country codes in the encoding, ascending.
    pub country_set: Vec<String>,
    /// Hyperparameters relevant to `model_kind`.
    pub hyperparameters: Vec<(&'static str, u64)>,
}

impl FitKey {
    /// Builds a key, keeping only the hyperparameters `model_kind` reads.
    #[must_use]
    pub fn new(
        source_version: SourceVersion,
        pollutant: impl Into<String>,
        target: impl Into<String>,
        feature_set: Vec<String>,
        model_kind: ModelKind,
        country_set: Vec<String>,
        hyperparameters: &Hyperparameters,
    ) -> Self {
        Self {
            source_version,
            pollutant: pollutant.into(),
            target: target.into(),
            feature_set,
            model_kind,
            country_set,
            hyperparameters: hyperparameters.fingerprint(model_kind),
        }
    }
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that trained a model.
    pub misses: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate (0.0 - 1.0).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Entry {
    model: Arc<FittedModel>,
    last_used: u64,
}

/// LRU cache of fitted models.
///
/// # Examples
///
/// ```
/// use aqfleet::cache::{FitKey, ModelCache};
/// use aqfleet::loader::SourceVersion;
/// use aqfleet::model::{train, Hyperparameters, ModelKind};
/// use aqfleet::primitives::{Matrix, Vector};
///
/// let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).unwrap();
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0]);
/// let hp = Hyperparameters::default();
/// let key = FitKey::new(SourceVersion(1), "PM10", "AnnualAvg_mean",
///     vec!["AF_fleet".into()], ModelKind::Ols, vec!["AT".into()], &hp);
///
/// let mut cache = ModelCache::new(4);
/// let first = cache.get_or_train(key.clone(), || train(&x, &y, ModelKind::Ols, &hp)).unwrap();
/// let second = cache.get_or_train(key, || unreachable!()).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct ModelCache {
    capacity: usize,
    entries: HashMap<FitKey, Entry>,
    clock: u64,
    stats: CacheStats,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ModelCache {
    /// Creates a cache holding at most `capacity` models (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of models kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is cached. Does not touch recency or counters.
    #[must_use]
    pub fn contains(&self, key: &FitKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Returns the cached model for `key`, or runs `train` and caches it.
    ///
    /// A failed `train` caches nothing.
    ///
    /// # Errors
    ///
    /// Propagates the error from `train`.
    pub fn get_or_train<F>(&mut self, key: FitKey, train: F) -> Result<Arc<FittedModel>>
    where
        F: FnOnce() -> Result<FittedModel>,
    {
        let now = self.tick();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = now;
            self.stats.hits += 1;
            debug!(kind = %key.model_kind, pollutant = %key.pollutant, "model cache hit");
            return Ok(Arc::clone(&entry.model));
        }

        self.stats.misses += 1;
        debug!(kind = %key.model_kind, pollutant = %key.pollutant, "model cache miss");
        let model = Arc::new(train()?);

        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            Entry {
                model: Arc::clone(&model),
                last_used: now,
            },
        );
        Ok(model)
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
            debug!(kind = %key.model_kind, pollutant = %key.pollutant, "evicted cached model");
        }
    }

    /// Drops every cached model (counters are kept).
    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            debug!(dropped = self.entries.len(), "model cache invalidated");
        }
        self.entries.clear();
    }

    /// Drops models trained on any snapshot other than `current`.
    pub fn retain_version(&mut self, current: SourceVersion) {
        self.entries.retain(|k, _| k.source_version == current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::train;
    use crate::primitives::{Matrix, Vector};

    fn key(pollutant: &str, kind: ModelKind) -> FitKey {
        FitKey::new(
            SourceVersion(7),
            pollutant,
            "AnnualAvg_mean",
            vec!["AF_fleet".to_string()],
            kind,
            vec!["AT".to_string(), "NO".to_string()],
            &Hyperparameters::default(),
        )
    }

    fn fit() -> Result<FittedModel> {
        let x = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("valid");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
        train(&x, &y, ModelKind::Ols, &Hyperparameters::default())
    }

    #[test]
    fn test_hit_on_identical_key() {
        let mut cache = ModelCache::new(4);
        let a = cache.get_or_train(key("PM10", ModelKind::Ols), fit).expect("fit");
        let b = cache
            .get_or_train(key("PM10", ModelKind::Ols), || panic!("must not retrain"))
            .expect("hit");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn test_miss_on_any_differing_component() {
        let base = key("PM10", ModelKind::Ols);
        let variants = vec![
            FitKey {
                source_version: SourceVersion(8),
                ..base.clone()
            },
            FitKey {
                pollutant: "NO2".into(),
                ..base.clone()
            },
            FitKey {
                target: "AnnualAvg_max".into(),
                ..base.clone()
            },
            FitKey {
                feature_set: vec!["AF_fleet".into(), "GDP".into()],
                ..base.clone()
            },
            FitKey {
                model_kind: ModelKind::Ridge,
                ..base.clone()
            },
            FitKey {
                country_set: vec!["AT".into()],
                ..base.clone()
            },
            FitKey {
                hyperparameters: vec![("alpha", 1)],
                ..base.clone()
            },
        ];

        let mut cache = ModelCache::new(16);
        cache.get_or_train(base, fit).expect("fit");
        for variant in variants {
            cache.get_or_train(variant, fit).expect("fit");
        }
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 8);
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut cache = ModelCache::new(2);
        cache.get_or_train(key("A", ModelKind::Ols), fit).expect("fit");
        cache.get_or_train(key("B", ModelKind::Ols), fit).expect("fit");
        // Touch A so B becomes least recently used
        cache.get_or_train(key("A", ModelKind::Ols), fit).expect("hit");
        cache.get_or_train(key("C", ModelKind::Ols), fit).expect("fit");

        assert!(cache.contains(&key("A", ModelKind::Ols)));
        assert!(!cache.contains(&key("B", ModelKind::Ols)));
        assert!(cache.contains(&key("C", ModelKind::Ols)));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_failed_training_is_not_cached() {
        let mut cache = ModelCache::new(2);
        let k = key("PM10", ModelKind::Ols);
        let result =
            cache.get_or_train(k.clone(), || Err(crate::error::AqError::insufficient_data("x")));
        assert!(result.is_err());
        assert!(!cache.contains(&k));
    }

    #[test]
    fn test_invalidate_and_retain_version() {
        let mut cache = ModelCache::new(4);
        cache.get_or_train(key("A", ModelKind::Ols), fit).expect("fit");
        let mut other = key("B", ModelKind::Ols);
        other.source_version = SourceVersion(99);
        cache.get_or_train(other, fit).expect("fit");

        cache.retain_version(SourceVersion(7));
        assert_eq!(cache.len(), 1);

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        assert_eq!(ModelCache::new(0).capacity(), 1);
        assert_eq!(ModelCache::default().capacity(), DEFAULT_CAPACITY);
    }
}
