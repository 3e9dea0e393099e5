//! Settings collaborator contract.
//!
//! Settings are externally mutable strings read through at the point of
//! use; the engine never caches them across settlement attempts. Parsing
//! and fallback live in `opendeal-policy`, not here — this contract only
//! hands back raw values.

use std::collections::HashMap;
use std::sync::RwLock;

/// Read-through access to the external key-value settings store.
pub trait SettingsProvider: Send + Sync {
    /// The raw string value for `key`, or `None` when unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-memory settings, mutable at any time (mirroring the admin UI
/// editing the real table mid-flight).
#[derive(Debug, Default)]
pub struct MemorySettings {
    inner: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite a key.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.into(), value.into());
        }
    }

    /// Remove a key, restoring the hardcoded default downstream.
    pub fn clear(&self, key: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(key);
        }
    }
}

impl SettingsProvider for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get("min_offer_amount"), None);

        settings.set("min_offer_amount", "2.50");
        assert_eq!(settings.get("min_offer_amount").as_deref(), Some("2.50"));

        settings.set("min_offer_amount", "3.00");
        assert_eq!(settings.get("min_offer_amount").as_deref(), Some("3.00"));

        settings.clear("min_offer_amount");
        assert_eq!(settings.get("min_offer_amount"), None);
    }
}
