//! Cookie jars (C10, spec.md §4.9): one jar per derived client key.
//!
//! Jar selection priority (spec.md §4.10 step 3): explicit `h`/`c` ⇒
//! `AUTH|h|c`; else a stored token ⇒ `AUTH|prefix|code`; else `host|UA`.

use cookie::Cookie;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct CookieJarStore {
    jars: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl CookieJarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self, jar_key: &str) -> Vec<(String, String)> {
        self.jars
            .lock()
            .get(jar_key)
            .map(|jar| jar.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn header_value(&self, jar_key: &str) -> Option<String> {
        let pairs = self.get_all(jar_key);
        if pairs.is_empty() {
            return None;
        }
        Some(
            pairs
                .into_iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Parse `Set-Cookie` header values from an upstream response and
    /// merge them into `jar_key`'s jar.
    pub fn store_set_cookies(&self, jar_key: &str, set_cookie_headers: &[String]) {
        let mut jars = self.jars.lock();
        let jar = jars.entry(jar_key.to_string()).or_default();
        for raw in set_cookie_headers {
            if let Ok(cookie) = Cookie::parse(raw.clone()) {
                jar.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }
}

/// Derive the jar key per the priority rules in spec.md §4.10.
pub fn derive_jar_key(
    explicit_h: Option<&str>,
    explicit_c: Option<&str>,
    stored_prefix: Option<&str>,
    stored_code: Option<&str>,
    host: &str,
    user_agent: &str,
) -> String {
    if let (Some(h), Some(c)) = (explicit_h, explicit_c) {
        if !h.is_empty() && !c.is_empty() {
            return format!("AUTH|{h}|{c}");
        }
    }
    if let (Some(prefix), Some(code)) = (stored_prefix, stored_code) {
        return format!("AUTH|{prefix}|{code}");
    }
    format!("{host}|{user_agent}")
}
