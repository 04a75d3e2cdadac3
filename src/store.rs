use crate::db;
use rusqlite::Connection;

/// Minimal durable key/value capability behind the preset library.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

impl PreferenceStore for Connection {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        db::preference_get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        db::preference_set(self, key, value)
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    values: std::cell::RefCell<std::collections::HashMap<String, String>>,
    fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

#[cfg(test)]
impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("store is read-only");
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
