//! Record store abstraction and the in-memory implementation.
//!
//! The tracker only depends on the [`RecordStore`] trait; file formats
//! and real persistence belong to outer layers. [`MemoryStore`] backs
//! the tests and the CLI's snapshot loading.

use std::sync::Mutex;

use crate::error::StoreError;
use crate::habit::{CompletionRecord, Habit};

/// Storage operations the tracker needs. Implementations serialize
/// their own read-modify-write cycles; a batch upsert performs one
/// cycle instead of N.
pub trait RecordStore {
    fn list_habits(&self) -> Result<Vec<Habit>, StoreError>;
    fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError>;
    /// Insert or replace a habit by id.
    fn save_habit(&self, habit: &Habit) -> Result<(), StoreError>;
    /// Returns false when no habit carried the id.
    fn delete_habit(&self, id: &str) -> Result<bool, StoreError>;

    fn list_completions(&self) -> Result<Vec<CompletionRecord>, StoreError>;
    fn list_completions_for_habit(
        &self,
        habit_id: &str,
    ) -> Result<Vec<CompletionRecord>, StoreError>;
    /// Insert or replace; the latest write wins per (habit_id, date).
    fn upsert_completion(&self, record: &CompletionRecord) -> Result<(), StoreError>;
    fn upsert_completions(&self, records: &[CompletionRecord]) -> Result<(), StoreError>;
    /// Returns false when no record carried the id.
    fn delete_completion(&self, id: &str) -> Result<bool, StoreError>;
    /// Returns the number of records removed.
    fn delete_completions_for_habit(&self, habit_id: &str) -> Result<usize, StoreError>;
}

#[derive(Default)]
struct Collections {
    habits: Vec<Habit>,
    completions: Vec<CompletionRecord>,
}

fn replace_completion(completions: &mut Vec<CompletionRecord>, record: &CompletionRecord) {
    match completions
        .iter()
        .position(|r| r.habit_id == record.habit_id && r.date == record.date)
    {
        Some(index) => completions[index] = record.clone(),
        None => completions.push(record.clone()),
    }
}

/// In-memory store guarded by a single mutex over both collections.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from already-loaded collections.
    pub fn from_collections(habits: Vec<Habit>, completions: Vec<CompletionRecord>) -> Self {
        Self {
            inner: Mutex::new(Collections {
                habits,
                completions,
            }),
        }
    }

    /// Clone out both collections, habits first.
    pub fn snapshot(&self) -> Result<(Vec<Habit>, Vec<CompletionRecord>), StoreError> {
        let inner = self.inner.lock()?;
        Ok((inner.habits.clone(), inner.completions.clone()))
    }
}

impl RecordStore for MemoryStore {
    fn list_habits(&self) -> Result<Vec<Habit>, StoreError> {
        Ok(self.inner.lock()?.habits.clone())
    }

    fn get_habit(&self, id: &str) -> Result<Option<Habit>, StoreError> {
        Ok(self.inner.lock()?.habits.iter().find(|h| h.id == id).cloned())
    }

    fn save_habit(&self, habit: &Habit) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        match inner.habits.iter().position(|h| h.id == habit.id) {
            Some(index) => inner.habits[index] = habit.clone(),
            None => inner.habits.push(habit.clone()),
        }
        Ok(())
    }

    fn delete_habit(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock()?;
        let before = inner.habits.len();
        inner.habits.retain(|h| h.id != id);
        Ok(inner.habits.len() < before)
    }

    fn list_completions(&self) -> Result<Vec<CompletionRecord>, StoreError> {
        Ok(self.inner.lock()?.completions.clone())
    }

    fn list_completions_for_habit(
        &self,
        habit_id: &str,
    ) -> Result<Vec<CompletionRecord>, StoreError> {
        Ok(self
            .inner
            .lock()?
            .completions
            .iter()
            .filter(|r| r.habit_id == habit_id)
            .cloned()
            .collect())
    }

    fn upsert_completion(&self, record: &CompletionRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        replace_completion(&mut inner.completions, record);
        Ok(())
    }

    fn upsert_completions(&self, records: &[CompletionRecord]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock()?;
        for record in records {
            replace_completion(&mut inner.completions, record);
        }
        Ok(())
    }

    fn delete_completion(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock()?;
        let before = inner.completions.len();
        inner.completions.retain(|r| r.id != id);
        Ok(inner.completions.len() < before)
    }

    fn delete_completions_for_habit(&self, habit_id: &str) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock()?;
        let before = inner.completions.len();
        inner.completions.retain(|r| r.habit_id != habit_id);
        Ok(before - inner.completions.len())
    }
}
