//! Per-request context, modeled on `rama-core`'s `Context<S>`.
//!
//! `State` carries the process-wide singletons (session store, site
//! profile store, image cache, HTTP client) that every [`crate::service::Service`]
//! needs read access to; `extensions` carries per-request typed values
//! discovered while handling a single connection (e.g. the resolved
//! session key), the same way rama threads request-scoped extensions
//! through its service stack.

use http::Extensions;
use std::sync::Arc;

/// Context passed to and between services as input.
#[derive(Clone)]
pub struct Context<S> {
    state: Arc<S>,
    extensions: Extensions,
}

impl<S> Context<S> {
    /// Create a new [`Context`] wrapping shared `state`.
    pub fn new(state: Arc<S>) -> Self {
        Self {
            state,
            extensions: Extensions::new(),
        }
    }

    /// Access the shared state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Clone the `Arc` handle to the shared state.
    pub fn state_arc(&self) -> Arc<S> {
        self.state.clone()
    }

    /// Insert a per-request extension value.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, val: T) -> Option<T> {
        self.extensions.insert(val)
    }

    /// Look up a per-request extension value.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(u32);

    #[test]
    fn state_round_trips() {
        let ctx = Context::new(Arc::new(Dummy(42)));
        assert_eq!(ctx.state().0, 42);
    }

    #[test]
    fn extensions_round_trip() {
        let mut ctx = Context::new(Arc::new(Dummy(0)));
        assert!(ctx.get::<&'static str>().is_none());
        ctx.insert("session-key");
        assert_eq!(ctx.get::<&'static str>(), Some(&"session-key"));
    }
}
