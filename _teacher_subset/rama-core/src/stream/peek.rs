use std::{
    fmt,
    io::{IoSlice, Read, Write},
    pin::Pin,
    task::{Context, Poll, ready},
};

use pin_project_lite::pin_project;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, ReadBuf};

pin_project! {
    /// a stream which has peeked some data of the inner stream,
    /// to be read first prior to any other reading
    ///
    /// It's similar to `ChainReader`, except that writing is also
    /// supported and happening directly in function of the inner stream.
    pub struct PeekStream<P, S> {
        done_peek: bool,
        #[pin]
        peek: P,
        #[pin]
        inner: S,
    }
}

impl<P, S> PeekStream<P, S> {
    /// Create a new [`PeekStream`] for the given
    /// peek [`AsyncRead`] and inner [`Stream`].
    ///
    /// [`Stream`]: super::Stream
    pub fn new(peek: P, inner: S) -> Self {
        Self {
            done_peek: false,
            peek,
            inner,
        }
    }
}

impl<P, S> fmt::Debug for PeekStream<P, S>
where
    P: fmt::Debug,
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeekStream")
            .field("done_peek", &self.done_peek)
            .field("peek", &self.peek)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<P, S> Clone for PeekStream<P, S>
where
    P: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            done_peek: self.done_peek,
            peek: self.peek.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<P, S> AsyncRead for PeekStream<P, S>
where
    P: AsyncRead,
    S: AsyncRead,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let me = self.project();

        if !*me.done_peek {
            let rem = buf.remaining();
            ready!(me.peek.poll_read(cx, buf))?;
            if buf.remaining() == rem {
                *me.done_peek = true;
            } else {
                return Poll::Ready(Ok(()));
            }
        }
        me.inner.poll_read(cx, buf)
    }
}

impl<P, S> AsyncBufRead for PeekStream<P, S>
where
    P: AsyncBufRead,
    S: AsyncBufRead,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        let me = self.project();

        if !*me.done_peek {
            match ready!(me.peek.poll_fill_buf(cx)?) {
                [] => {
                    *me.done_peek = true;
                }
                buf => return Poll::Ready(Ok(buf)),
            }
        }
        me.inner.poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let me = self.project();
        if !*me.done_peek {
            me.peek.consume(amt)
        } else {
            me.inner.consume(amt)
        }
    }
}

impl<P, S> Read for PeekStream<P, S>
where
    P: Read,
    S: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.done_peek {
            let n = self.peek.read(buf)?;
            if n == 0 {
                self.done_peek = true;
            } else {
                return Ok(n);
            }
        }
        self.inner.read(buf)
    }
}

impl<P, S> AsyncWrite for PeekStream<P, S>
where
    S: AsyncWrite,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let me = self.project();
        me.inner.poll_write(cx, buf)
    }

    fn poll_flush(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        let me = self.project();
        me.inner.poll_flush(cx)
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        let me = self.project();
        me.inner.poll_shutdown(cx)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<Result<usize, std::io::Error>> {
        let me = self.project();
        me.inner.poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }
}

impl<P, S> Write for PeekStream<P, S>
where
    S: Write,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
