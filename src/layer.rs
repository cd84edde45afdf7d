//! The `Layer` trait, modeled on `rama-core::layer::Layer`, plus the one
//! layer this proxy actually needs: request logging (spec.md §4.10,
//! "Middleware logs each request").

use crate::context::Context;
use crate::error::BoxError;
use crate::service::Service;
use std::time::Instant;
use tracing::info;

/// Wraps an inner `Service`/handler to produce a new one.
pub trait Layer<S> {
    /// The wrapped service type.
    type Service;

    /// Wrap `inner` with this layer.
    fn layer(&self, inner: S) -> Self::Service;
}

/// Logs method, path, status-ish outcome, and wall time for every request.
#[derive(Clone, Copy, Default)]
pub struct LogLayer;

impl<S> Layer<S> for LogLayer {
    type Service = LogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LogService { inner }
    }
}

/// The service produced by [`LogLayer`].
pub struct LogService<S> {
    inner: S,
}

impl<S, St, Req> Service<St, Req> for LogService<S>
where
    S: Service<St, Req>,
    Req: RequestLabel + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;

    async fn serve(&self, ctx: Context<St>, req: Req) -> Result<Self::Response, Self::Error> {
        let label = req.request_label();
        let start = Instant::now();
        let result = self.inner.serve(ctx, req).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => info!(%label, ?elapsed, "request served"),
            Err(_) => info!(%label, ?elapsed, "request failed"),
        }
        result
    }
}

/// Anything that can describe itself for the access log.
pub trait RequestLabel {
    /// A short, loggable description of this request (endpoint + target).
    fn request_label(&self) -> String;
}

#[allow(dead_code)]
fn _assert_box_error<E: Into<BoxError>>() {}
