//! In-memory token storage.

use parking_lot::RwLock;
use farmhand_domain::TokenPair;

use crate::ports::TokenStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

/// Thread-safe process-local token store.
///
/// Used by tests and by embedders that keep their own persistence; the CLI
/// uses the file-backed store from the infrastructure crate.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: RwLock<Slots>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given pair.
    #[must_use]
    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        store.set_pair(pair);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slots.read().access.clone()
    }

    fn get_refresh(&self) -> Option<String> {
        self.slots.read().refresh.clone()
    }

    fn set(&self, access_token: &str, refresh_token: Option<&str>) {
        let mut slots = self.slots.write();
        slots.access = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            slots.refresh = Some(refresh.to_string());
        }
    }

    fn remove(&self) {
        *self.slots.write() = Slots::default();
    }

    fn pair(&self) -> Option<TokenPair> {
        let slots = self.slots.read();
        Some(TokenPair::new(slots.access.clone()?, slots.refresh.clone()?))
    }
}
