//! Memoized summaries for a session
//!
//! Every key carries the entry-log generation and the calorie target, so a
//! lookup after an append or a profile change can only miss. Stale keys are
//! purged on the next insert; within one generation the least recently
//! used date is evicted first.

use calorie_tracker_shared::{DailySummary, MealSlotSummary, NutritionResult, PeriodReport};
use chrono::NaiveDate;
use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::debug;

/// Memo key: entry-log generation, calorie target and date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub generation: u64,
    pub target: i32,
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(generation: u64, target: i32, date: NaiveDate) -> Self {
        Self {
            generation,
            target,
            date,
        }
    }

    fn same_inputs(&self, other: &CacheKey) -> bool {
        self.generation == other.generation && self.target == other.target
    }
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU memo table for one kind of result
#[derive(Debug, Clone)]
pub struct MemoTable<V> {
    name: &'static str,
    entries: LruCache<CacheKey, V>,
    stats: CacheStats,
}

impl<V: Clone> MemoTable<V> {
    /// Capacity used when zero entries are requested
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(name: &'static str, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            name,
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    ///
    /// Errors are returned as is and never cached.
    pub fn get_or_try_insert_with<F>(&mut self, key: CacheKey, compute: F) -> NutritionResult<V>
    where
        F: FnOnce() -> NutritionResult<V>,
    {
        // `get` also marks the key most recently used
        if let Some(value) = self.entries.get(&key) {
            self.stats.hits += 1;
            debug!(table = self.name, date = %key.date, generation = key.generation, "Cache hit");
            return Ok(value.clone());
        }

        self.stats.misses += 1;
        debug!(table = self.name, date = %key.date, generation = key.generation, "Cache miss, recomputing");

        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    fn insert(&mut self, key: CacheKey, value: V) {
        // Keys from older generations or targets can never be hit again
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .map(|(existing, _)| *existing)
            .filter(|existing| !existing.same_inputs(&key))
            .collect();
        for existing in &stale {
            self.entries.pop(existing);
        }

        if let Some((evicted, _)) = self.entries.push(key, value) {
            if evicted != key {
                debug!(table = self.name, date = %evicted.date, "Evicted least recently used entry");
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The session's memo tables
#[derive(Debug, Clone)]
pub struct SummaryCache {
    pub daily: MemoTable<DailySummary>,
    pub meal_slots: MemoTable<Vec<MealSlotSummary>>,
    pub weekly: MemoTable<PeriodReport>,
}

impl SummaryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            daily: MemoTable::new("daily", max_entries),
            meal_slots: MemoTable::new("meal_slots", max_entries),
            weekly: MemoTable::new("weekly", max_entries),
        }
    }

    pub fn clear(&mut self) {
        self.daily.clear();
        self.meal_slots.clear();
        self.weekly.clear();
    }

    /// Combined counters over every table
    pub fn stats(&self) -> CacheStats {
        [self.daily.stats(), self.meal_slots.stats(), self.weekly.stats()]
            .into_iter()
            .fold(CacheStats::default(), |acc, s| CacheStats {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
            })
    }
}
