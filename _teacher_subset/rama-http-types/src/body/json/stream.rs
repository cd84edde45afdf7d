use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use rama_core::futures::{Stream, ready};
use rama_error::{BoxError, ErrorContext as _, OpaqueError};
use serde::Deserialize;

use super::config::ParseConfig;
use super::engine::NdjsonEngine;

pin_project! {
    /// Wraps a [Stream] of [Result]s of data blocks, i.e. types that reference as byte array, and offers
    /// a [Stream] mplementation over parsed NDJSON-records according to [Deserialize], forwarding
    /// potential errors returned by the wrapped iterator.
    pub struct JsonStream<T, S> {
        engine: NdjsonEngine<T>,
        #[pin]
        bytes_stream: S
    }
}

impl<T, S> JsonStream<T, S> {
    /// Creates a new fallible NDJSON-stream wrapping the given `bytes_stream` with default
    /// [ParseConfig].
    pub fn new(bytes_stream: S) -> Self {
        Self {
            engine: NdjsonEngine::new(),
            bytes_stream,
        }
    }

    /// Creates a new fallible NDJSON-stream wrapping the given `bytes_stream` with the given
    /// [ParseConfig] to control its behavior. See [ParseConfig] for more details.
    pub fn new_with_config(bytes_stream: S, config: ParseConfig) -> Self {
        Self {
            engine: NdjsonEngine::with_config(config),
            bytes_stream,
        }
    }
}

impl<T, S, B, E> Stream for JsonStream<T, S>
where
    for<'deserialize> T: Deserialize<'deserialize>,
    E: Into<BoxError>,
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<T, OpaqueError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(result) = this.engine.pop() {
                return Poll::Ready(Some(result.context("json-deserialize next value")));
            }

            let bytes = ready!(this.bytes_stream.as_mut().poll_next(cx));

            match bytes {
                Some(Ok(bytes)) => this.engine.input(bytes),
                Some(Err(err)) => {
                    let err = OpaqueError::from_boxed(err.into());
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.engine.finalize();
                    return Poll::Ready(
                        this.engine
                            .pop()
                            .map(|res| res.context("json-deserialize last value")),
                    );
                }
            }
        }
    }
}
