//! Hidden-form store (C10, spec.md §4.9): keyed by session key, with
//! `Augment` merge-if-absent semantics so a client's own submitted
//! values are never overwritten by a stale recorded default.

use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct HiddenFieldStore {
    // session_key -> action -> (field -> value)
    by_session: Mutex<HashMap<String, HashMap<String, HashMap<String, String>>>>,
}

impl HiddenFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record hidden fields discovered while rendering `action` for
    /// `session_key`, overwriting any prior recording for that action.
    pub fn record(&self, session_key: &str, action: &str, fields: HashMap<String, String>) {
        self.by_session
            .lock()
            .entry(session_key.to_string())
            .or_default()
            .insert(action.to_string(), fields);
    }

    /// Does `session_key` have any recorded hidden fields for `action`?
    pub fn has_action(&self, session_key: &str, action: &str) -> bool {
        self.by_session
            .lock()
            .get(session_key)
            .map(|actions| actions.contains_key(action))
            .unwrap_or(false)
    }

    /// Merge stored hidden fields into `body`, inserting only the keys
    /// `body` does not already contain.
    pub fn augment(&self, session_key: &str, action: &str, body: &mut Vec<(String, String)>) {
        let Some(stored) = self
            .by_session
            .lock()
            .get(session_key)
            .and_then(|actions| actions.get(action))
            .cloned()
        else {
            return;
        };
        let present: std::collections::HashSet<String> =
            body.iter().map(|(k, _)| k.clone()).collect();
        for (key, value) in stored {
            if !present.contains(&key) {
                body.push((key, value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augment_inserts_only_missing_fields() {
        let store = HiddenFieldStore::new();
        let mut stored = HashMap::new();
        stored.insert("csrf".to_string(), "xyz".to_string());
        stored.insert("q".to_string(), "default".to_string());
        store.record("sess", "action", stored);

        let mut body = vec![("q".to_string(), "client-value".to_string())];
        store.augment("sess", "action", &mut body);

        assert_eq!(
            body,
            vec![
                ("q".to_string(), "client-value".to_string()),
                ("csrf".to_string(), "xyz".to_string()),
            ]
        );
    }

    #[test]
    fn has_action_reports_presence() {
        let store = HiddenFieldStore::new();
        assert!(!store.has_action("sess", "action"));
        store.record("sess", "action", HashMap::new());
        assert!(store.has_action("sess", "action"));
    }
}
