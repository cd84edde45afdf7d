//! Auth token store (C10, spec.md §4.9): `clientKey → (prefix, code)`
//! with a 7-day TTL, guarded the way the image cache guards its disk
//! budget — a single internal mutex, since this store's read path isn't
//! hot enough to warrant an `RwLock`.

use parking_lot::Mutex;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const PREFIX: &str = "t19-14";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub prefix: String,
    pub code: String,
}

impl AuthToken {
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.prefix, &self.code)
    }
}

struct Entry {
    token: AuthToken,
    expires_at: Instant,
}

#[derive(Default)]
pub struct AuthStore {
    by_client_key: Mutex<HashMap<String, Entry>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing non-expired token for `client_key`, or mint
    /// and register a new one.
    pub fn ensure(&self, client_key: &str) -> AuthToken {
        let mut map = self.by_client_key.lock();
        let now = Instant::now();
        if let Some(entry) = map.get(client_key) {
            if entry.expires_at > now {
                return entry.token.clone();
            }
        }
        let token = mint_token();
        map.insert(
            client_key.to_string(),
            Entry {
                token: token.clone(),
                expires_at: now + TTL,
            },
        );
        token
    }

    /// Look up a session by its `(prefix, code)` pair — splitting
    /// `"prefix.code"` first if the caller passed a combined `h` field —
    /// refreshing TTL on hit. A miss returns an unregistered token (the
    /// caller still gets *something* to echo back, it's just not one
    /// this store will recognize on the next request).
    pub fn ensure_by_code(&self, prefix: &str, code: &str) -> AuthToken {
        let mut map = self.by_client_key.lock();
        let now = Instant::now();
        for entry in map.values_mut() {
            if entry.token.prefix == prefix && entry.token.code == code {
                entry.expires_at = now + TTL;
                return entry.token.clone();
            }
        }
        AuthToken {
            prefix: prefix.to_string(),
            code: code.to_string(),
        }
    }

    /// Derived session key for an already-resolved `(prefix, code)` pair,
    /// used as the `AUTH|prefix|code` cookie-jar/form-store key.
    pub fn session_key(token: &AuthToken) -> String {
        format!("AUTH|{}|{}", token.prefix, token.code)
    }
}

/// Split a combined `"prefix.code"` `h` field, per spec.md §6.2.
pub fn split_combined_h(h: &str) -> Option<(String, String)> {
    let (prefix, code) = h.split_once('.')?;
    Some((prefix.to_string(), code.to_string()))
}

fn mint_token() -> AuthToken {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    AuthToken {
        prefix: PREFIX.to_string(),
        code: hex::encode(hasher.finalize()),
    }
}
