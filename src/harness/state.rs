//! Cross-scenario values produced during one run.
use super::error::HarnessError;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    writer: String,
    value: Value,
}

/// Key/value carryover owned by the orchestrator. Each key is written once.
#[derive(Debug, Default)]
pub struct SharedState {
    slots: BTreeMap<String, Slot>,
}

impl SharedState {
    pub fn new() -> Self {
        SharedState::default()
    }

    /// Record `value` under `key`; a second write to the same key is a wiring
    /// error regardless of which scenario attempts it.
    pub fn insert(&mut self, key: &str, writer: &str, value: Value) -> Result<(), HarnessError> {
        if let Some(existing) = self.slots.get(key) {
            return Err(HarnessError::configuration(format!(
                "shared key {key:?} already written by {}; {writer} may not write it again",
                existing.writer
            )));
        }
        self.slots.insert(
            key.to_string(),
            Slot {
                writer: writer.to_string(),
                value,
            },
        );
        Ok(())
    }

    pub fn view(&self) -> StateView<'_> {
        StateView { state: self }
    }
}

/// Read-only handle given to scenario request functions.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    state: &'a SharedState,
}

impl<'a> StateView<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.state.slots.get(key).map(|slot| &slot.value)
    }

    /// String value under `key`; absence is a prerequisite failure.
    pub fn require_str(&self, key: &str) -> Result<&'a str, HarnessError> {
        match self.get(key) {
            Some(Value::String(value)) => Ok(value),
            Some(other) => Err(HarnessError::prerequisite(format!(
                "shared key {key:?} holds a non-string value {other}"
            ))),
            None => Err(HarnessError::prerequisite(format!(
                "shared key {key:?} has not been produced"
            ))),
        }
    }
}
