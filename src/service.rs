//! The `Service` trait, modeled on `rama-core::service::Service`.

use crate::context::Context;
use crate::error::BoxError;
use std::future::Future;

/// A service serves a response (or error) for a request, given a context.
///
/// Every endpoint in [`crate::dispatch`] is one `Service` impl; the
/// dispatcher itself is a thin router composing them, the same shape rama
/// uses for its own HTTP services.
pub trait Service<S, Request>: Send + Sync + 'static {
    /// Response type.
    type Response: Send + 'static;
    /// Error type.
    type Error: Into<BoxError> + Send + 'static;

    /// Serve a response or error for `req`, given `ctx`.
    fn serve(
        &self,
        ctx: Context<S>,
        req: Request,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}
