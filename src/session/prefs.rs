//! Render-preference store (C10, spec.md §4.9, §3): RW-locked since
//! every request reads its session's remembered preferences but writes
//! only happen when the client's `d=` fields actually change.

use crate::dispatch::options::RenderOptions;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct RenderPrefStore {
    by_session: RwLock<HashMap<String, RenderOptions>>,
}

impl RenderPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_key: &str) -> Option<RenderOptions> {
        self.by_session.read().get(session_key).cloned()
    }

    pub fn remember(&self, session_key: &str, opts: RenderOptions) {
        self.by_session.write().insert(session_key.to_string(), opts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_and_returns_last_options() {
        let store = RenderPrefStore::new();
        assert!(store.get("sess").is_none());
        let mut opts = RenderOptions::default();
        opts.screen_width = 320;
        store.remember("sess", opts.clone());
        assert_eq!(store.get("sess"), Some(opts));
    }
}
