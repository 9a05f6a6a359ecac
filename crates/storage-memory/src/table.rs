//! Keyed in-memory table shared by the repositories.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::StorageError;
use policyhub_core::Result;

/// Rows of `T` keyed by a string identifier.
pub struct MemoryTable<T> {
    entity: &'static str,
    rows: RwLock<HashMap<String, T>>,
}

impl<T: Clone> MemoryTable<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<T>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::LockPoisoned(self.entity))?;
        Ok(rows.get(key).cloned())
    }

    /// Rows matching `predicate`, in no particular order.
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::LockPoisoned(self.entity))?;
        Ok(rows.values().filter(|row| predicate(row)).cloned().collect())
    }

    pub fn all(&self) -> Result<Vec<T>> {
        self.filter(|_| true)
    }

    /// Fails with [`StorageError::Duplicate`] when `key` is taken.
    pub fn insert(&self, key: &str, row: T) -> Result<T> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::LockPoisoned(self.entity))?;
        if rows.contains_key(key) {
            return Err(StorageError::Duplicate {
                entity: self.entity,
                key: key.to_string(),
            }
            .into());
        }
        rows.insert(key.to_string(), row.clone());
        Ok(row)
    }

    /// Fails with [`StorageError::Missing`] when `key` is absent.
    pub fn update(&self, key: &str, row: T) -> Result<T> {
        self.update_if(key, row, |_| true)
    }

    /// Replaces the row at `key` only if `guard` accepts the stored row.
    /// Check and write happen under the same lock; a rejected row is a
    /// [`StorageError::Conflict`].
    pub fn update_if<F>(&self, key: &str, row: T, guard: F) -> Result<T>
    where
        F: FnOnce(&T) -> bool,
    {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::LockPoisoned(self.entity))?;
        let existing = rows.get_mut(key).ok_or_else(|| StorageError::Missing {
            entity: self.entity,
            key: key.to_string(),
        })?;
        if !guard(&*existing) {
            return Err(StorageError::Conflict {
                entity: self.entity,
                key: key.to_string(),
            }
            .into());
        }
        *existing = row.clone();
        Ok(row)
    }

    pub fn upsert(&self, key: &str, row: T) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::LockPoisoned(self.entity))?;
        rows.insert(key.to_string(), row);
        Ok(())
    }
}
