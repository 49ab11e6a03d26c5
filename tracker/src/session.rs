//! Session context
//!
//! Holds everything one user's session works with: identity, profile, the
//! derived calorie target and the append-only entry log. Summaries are
//! memoized per (generation, target, date) and always match a full
//! recomputation.

use crate::cache::{CacheKey, CacheStats, SummaryCache};
use crate::config::TrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use calorie_tracker_shared::{
    aggregate_day, compute_daily_target, meal_slots_for_day, period_report, validate_entries, weekly_report,
    DailySummary, FoodItem, LoggedEntry, MealSlot, MealSlotSummary, Profile, PeriodReport,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Who the session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Result of appending to the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOutcome {
    pub entry: LoggedEntry,
    /// Summary of the entry's day after the append
    pub summary: DailySummary,
    pub message: String,
}

impl LogOutcome {
    fn new(entry: LoggedEntry, summary: DailySummary) -> Self {
        let mut message = format!(
            "Meal added successfully! Calories: {} kcal | Total today: {}/{}",
            entry.nutrients.calories.normalize(),
            summary.total_calories.normalize(),
            summary.target_calories
        );
        if summary.is_over_target() {
            message.push_str(" | You've exceeded your daily target!");
        } else {
            message.push_str(&format!(" | Remaining: {} kcal", summary.remaining_calories.normalize()));
        }
        Self { entry, summary, message }
    }
}

/// Flat, serializable form of a session for local storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub user: Option<UserIdentity>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub entries: Vec<LoggedEntry>,
}

impl SessionSnapshot {
    /// Read a snapshot from a JSON file
    pub fn read_from(path: &Path) -> TrackerResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the snapshot as pretty JSON
    pub fn write_to(&self, path: &Path) -> TrackerResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// Explicit per-user session state
#[derive(Debug, Clone)]
pub struct SessionContext {
    session_id: Uuid,
    user: Option<UserIdentity>,
    profile: Option<Profile>,
    target: Option<i32>,
    entries: Vec<LoggedEntry>,
    generation: u64,
    cache: SummaryCache,
}

impl SessionContext {
    pub fn new(cache_max_entries: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user: None,
            profile: None,
            target: None,
            entries: Vec::new(),
            generation: 0,
            cache: SummaryCache::new(cache_max_entries),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.cache.max_entries)
    }

    /// Rebuild a session from a stored snapshot
    ///
    /// The profile and every entry are re-checked; a bad snapshot is
    /// rejected as a whole.
    pub fn restore(snapshot: SessionSnapshot, cache_max_entries: usize) -> TrackerResult<Self> {
        let mut session = Self::new(cache_max_entries);
        session.user = snapshot.user;
        if let Some(profile) = snapshot.profile {
            session.set_profile(profile)?;
        }
        session.log_entries(snapshot.entries)?;
        Ok(session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            profile: self.profile,
            entries: self.entries.clone(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: UserIdentity) {
        info!(session_id = %self.session_id, user_id = %user.id, "Session user set");
        self.user = Some(user);
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Replace the profile and recompute the target
    pub fn set_profile(&mut self, profile: Profile) -> TrackerResult<i32> {
        profile.validate()?;
        let target = compute_daily_target(&profile);

        info!(
            session_id = %self.session_id,
            activity_level = %profile.activity_level,
            goal = %profile.goal,
            target_calories = target,
            "Profile updated"
        );

        self.profile = Some(profile);
        self.target = Some(target);
        Ok(target)
    }

    pub fn target(&self) -> Option<i32> {
        self.target
    }

    fn require_target(&self) -> TrackerResult<i32> {
        self.target.ok_or(TrackerError::MissingProfile)
    }

    pub fn entries(&self) -> &[LoggedEntry] {
        &self.entries
    }

    /// Number of successful appends so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Append a batch of entries, all or nothing
    pub fn log_entries(&mut self, batch: Vec<LoggedEntry>) -> TrackerResult<usize> {
        if let Err(err) = validate_entries(&batch) {
            warn!(
                session_id = %self.session_id,
                rejected = err.issues().len(),
                "Rejected entry batch"
            );
            return Err(err.into());
        }
        if batch.is_empty() {
            return Ok(0);
        }

        let count = batch.len();
        self.entries.extend(batch);
        self.generation += 1;
        debug!(session_id = %self.session_id, count, generation = self.generation, "Entries appended");
        Ok(count)
    }

    /// Append one entry and report the day's standing
    pub fn log_entry(&mut self, entry: LoggedEntry) -> TrackerResult<LogOutcome> {
        self.require_target()?;
        let date = entry.date;
        self.log_entries(vec![entry.clone()])?;
        let summary = self.daily_summary(date)?;
        Ok(LogOutcome::new(entry, summary))
    }

    /// Log `quantity` grams or servings of a catalog food
    pub fn log_food(
        &mut self,
        food: &FoodItem,
        quantity: Decimal,
        date: NaiveDate,
        meal_slot: MealSlot,
    ) -> TrackerResult<LogOutcome> {
        let entry = LoggedEntry::from_food(food, quantity, date, meal_slot)?;
        self.log_entry(entry)
    }

    fn key(&self, date: NaiveDate) -> TrackerResult<CacheKey> {
        Ok(CacheKey::new(self.generation, self.require_target()?, date))
    }

    /// Totals for one day against the current target
    pub fn daily_summary(&mut self, date: NaiveDate) -> TrackerResult<DailySummary> {
        let key = self.key(date)?;
        let entries = &self.entries;
        Ok(self
            .cache
            .daily
            .get_or_try_insert_with(key, || aggregate_day(entries, key.target, date))?)
    }

    /// The four meal slots of one day
    pub fn meal_slots(&mut self, date: NaiveDate) -> TrackerResult<Vec<MealSlotSummary>> {
        let key = self.key(date)?;
        let entries = &self.entries;
        Ok(self
            .cache
            .meal_slots
            .get_or_try_insert_with(key, || meal_slots_for_day(entries, date))?)
    }

    /// Seven days ending at `end`
    pub fn weekly_report(&mut self, end: NaiveDate) -> TrackerResult<PeriodReport> {
        let key = self.key(end)?;
        let entries = &self.entries;
        Ok(self
            .cache
            .weekly
            .get_or_try_insert_with(key, || weekly_report(entries, key.target, end))?)
    }

    /// Report over an arbitrary inclusive range, not memoized
    pub fn period_report(&self, start: NaiveDate, end: NaiveDate) -> TrackerResult<PeriodReport> {
        let target = self.require_target()?;
        Ok(period_report(&self.entries, target, start, end)?)
    }
}
