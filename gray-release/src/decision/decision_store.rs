use std::sync::Arc;

use crate::{
    api::errors::GrayReleaseError,
    decision::decision_models::DecisionRecord,
    metrics::{
        consts::{CORRUPT_RECORD_COUNTER, STORAGE_ERRORS_COUNTER},
        utils::{inc, label},
    },
    rules::rule_models::GrayRule,
    storage::{KeyValueStore, StorageError},
};

/// Keeps the gray-release record under a single storage key.
#[derive(Clone)]
pub struct DecisionStore {
    storage: Arc<dyn KeyValueStore + Send + Sync>,
    key: String,
}

impl DecisionStore {
    pub fn new(storage: Arc<dyn KeyValueStore + Send + Sync>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored record, if there is a readable one.
    pub fn try_load(&self) -> Option<DecisionRecord> {
        let value = match self.storage.get(&self.key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read gray release record {}: {}", self.key, e);
                inc(STORAGE_ERRORS_COUNTER, &[label("op", "get")], 1);
                return None;
            }
        };

        match serde_json::from_value::<DecisionRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("ignoring corrupt gray release record {}: {}", self.key, e);
                inc(CORRUPT_RECORD_COUNTER, &[], 1);
                None
            }
        }
    }

    /// Missing or unreadable records load as "rule closed, not a gray target".
    pub fn load(&self) -> DecisionRecord {
        self.try_load().unwrap_or_default()
    }

    pub fn is_gray_version(&self) -> bool {
        self.load().is_gray_version
    }

    /// Replaces the whole record.
    pub fn save(&self, rule: &GrayRule, is_gray_version: bool) -> Result<(), GrayReleaseError> {
        let record = DecisionRecord::new(rule.clone(), is_gray_version);
        self.write(&record)
    }

    /// Stores a freshly fetched rule, keeping the verdict already on record.
    pub fn save_rule(&self, rule: &GrayRule) -> Result<(), GrayReleaseError> {
        let previous = self.load();
        self.save(rule, previous.is_gray_version)
    }

    pub fn clear(&self) -> Result<(), GrayReleaseError> {
        self.storage.remove(&self.key).map_err(|e| {
            tracing::error!("failed to clear gray release record {}: {}", self.key, e);
            inc(STORAGE_ERRORS_COUNTER, &[label("op", "remove")], 1);
            GrayReleaseError::from(e)
        })
    }

    fn write(&self, record: &DecisionRecord) -> Result<(), GrayReleaseError> {
        let value = serde_json::to_value(record).map_err(StorageError::from)?;
        self.storage.set(&self.key, value).map_err(|e| {
            tracing::error!("failed to write gray release record {}: {}", self.key, e);
            inc(STORAGE_ERRORS_COUNTER, &[label("op", "set")], 1);
            GrayReleaseError::from(e)
        })
    }
}
