//! Error utilities, modeled on `rama-error`.
//!
//! Rama does not use `thiserror`/`anyhow`; it works with a single boxed
//! [`std::error::Error`] trait object (`BoxError`) and a small context
//! extension trait. We follow the same shape here: most call sites just
//! want to `?`-propagate a boxed error up to the request dispatcher, which
//! is the one place that must turn a failure into a well-formed OMS error
//! page rather than an HTTP error (spec.md §7).

use std::error::Error as StdError;
use std::fmt;

/// Alias for a type-erased error.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The coarse error kinds the dispatcher needs to distinguish (spec.md §7).
///
/// Everything that is *not* one of these is treated as an opaque
/// [`BoxError`] and rendered as a generic synthesized error page.
#[derive(Debug)]
pub enum OperettaError {
    /// Missing/invalid URL on a debug endpoint.
    BadRequest(String),
    /// Upstream connect/read timed out.
    UpstreamTimeout(String),
    /// Upstream connection reset, DNS failure, TLS failure, etc.
    UpstreamTransport(BoxError),
    /// HTML or CSS parsing failed hard (no recoverable partial tree).
    ParseFailure(String),
    /// Debug-only upstream failure that should surface as HTTP 502.
    BadGateway(String),
}

impl fmt::Display for OperettaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::UpstreamTimeout(url) => write!(f, "upstream timeout: {url}"),
            Self::UpstreamTransport(err) => write!(f, "upstream transport error: {err}"),
            Self::ParseFailure(msg) => write!(f, "parse failure: {msg}"),
            Self::BadGateway(msg) => write!(f, "bad gateway: {msg}"),
        }
    }
}

impl StdError for OperettaError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::UpstreamTransport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// A context-carrying wrapper error, produced by [`ErrorContext::context`].
#[derive(Debug)]
struct Contextual {
    msg: String,
    source: BoxError,
}

impl fmt::Display for Contextual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.msg, self.source)
    }
}

impl StdError for Contextual {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Extension trait to attach a human readable message to any error on its
/// way up the call stack, mirroring `rama_error::ErrorExt`.
pub trait ErrorExt {
    /// Wrap `self` with a static context message.
    fn context(self, msg: &'static str) -> BoxError;
    /// Wrap `self` with a lazily computed context message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> BoxError;
}

impl<E> ErrorExt for E
where
    E: StdError + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> BoxError {
        Box::new(Contextual {
            msg: msg.to_owned(),
            source: Box::new(self),
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> BoxError {
        Box::new(Contextual {
            msg: f(),
            source: Box::new(self),
        })
    }
}

/// Extension trait for `Result`/`Option`, mirroring `rama_error::ErrorContext`.
pub trait ErrorContext<T> {
    /// Attach context to the error variant (or convert `None` into an
    /// error), producing `Result<T, BoxError>`.
    fn context(self, msg: &'static str) -> Result<T, BoxError>;
    /// Lazy variant of [`ErrorContext::context`].
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, BoxError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T, BoxError> {
        self.map_err(|e| e.context(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, BoxError> {
        self.map_err(|e| e.with_context(f))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, msg: &'static str) -> Result<T, BoxError> {
        self.ok_or_else(|| -> BoxError { msg.to_owned().into() })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, BoxError> {
        self.ok_or_else(|| -> BoxError { f().into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_message_and_source() {
        let err: Result<(), std::io::Error> =
            Err(std::io::Error::other("disk full"));
        let wrapped = err.context("writing cache entry").unwrap_err();
        let s = format!("{wrapped}");
        assert!(s.contains("writing cache entry"));
        assert!(s.contains("disk full"));
    }

    #[test]
    fn option_context_produces_error() {
        let value: Option<u32> = None;
        let err = value.context("missing field").unwrap_err();
        assert_eq!(format!("{err}"), "missing field");
    }
}
