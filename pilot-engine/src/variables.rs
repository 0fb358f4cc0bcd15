use serde_json::{Map, Value};
use std::collections::HashMap;

/// Run-scoped bindings written by steps that declare an `outputVariable`.
#[derive(Debug, Default)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        tracing::trace!(variable = %name, "variables.set");
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Move every binding out, leaving the table empty.
    pub fn drain_snapshot(&mut self) -> Map<String, Value> {
        std::mem::take(&mut self.values).into_iter().collect()
    }
}
