//! Session state (C10, spec.md §4.9): auth tokens, cookie jars,
//! render preferences, hidden-form bookkeeping, and the pagination
//! page cache. Each store is its own small internally-locked type;
//! together they form the dispatcher's process-wide singleton state
//! (spec.md §9 "Cookie jars / auth tokens / form store / render-prefs").

pub mod auth;
pub mod cache;
pub mod cookies;
pub mod hidden;
pub mod prefs;

pub use auth::{AuthStore, AuthToken};
pub use cache::{CachedPage, PageCache};
pub use cookies::{derive_jar_key, CookieJarStore};
pub use hidden::HiddenFieldStore;
pub use prefs::RenderPrefStore;

/// Every session-scoped store, owned by the dispatcher singleton for
/// the life of the process.
#[derive(Default)]
pub struct SessionState {
    pub auth: AuthStore,
    pub cookies: CookieJarStore,
    pub prefs: RenderPrefStore,
    pub hidden: HiddenFieldStore,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}
