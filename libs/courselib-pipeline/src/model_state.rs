//! Per-request snapshot of binding and validation results.

use std::collections::BTreeMap;

use courselib_errors::FieldErrors;

/// A single error recorded against a model state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError {
    pub message: String,
}

/// Everything recorded for one key: the raw value the client sent (if one
/// could be read) and the errors raised while binding or validating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelStateEntry {
    pub attempted_value: Option<String>,
    pub errors: Vec<ModelError>,
}

/// Field key -> binding/validation outcome.
///
/// Keys are either action parameter names (`authorId`, `course`) or model
/// property names (`title`). Ordered so that rendered problems are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    entries: BTreeMap<String, ModelStateEntry>,
}

impl ModelState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .errors
            .push(ModelError {
                message: message.into(),
            });
    }

    pub fn set_attempted_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().attempted_value = Some(value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ModelStateEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.values().map(|e| e.errors.len()).sum()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Messages per key, skipping keys that only carry an attempted value.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.errors.is_empty())
            .map(|(key, entry)| {
                let messages = entry.errors.iter().map(|e| e.message.clone()).collect();
                (key.clone(), messages)
            })
            .collect()
    }

    /// Fold another state into this one, appending errors per key.
    pub fn merge(&mut self, other: Self) {
        for (key, entry) in other.entries {
            let target = self.entries.entry(key).or_default();
            if entry.attempted_value.is_some() {
                target.attempted_value = entry.attempted_value;
            }
            target.errors.extend(entry.errors);
        }
    }
}
