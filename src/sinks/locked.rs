//! # Lock-per-write sink.
//!
//! [`LockedSink`] serializes every line through an async mutex around the
//! writer. The line is rendered before the lock is taken, so the critical
//! section is exactly one `write_all` plus one `flush`.
//!
//! ## What it measures
//! Every firing pays for one lock acquisition and one write to the underlying
//! stream. With large N and small P the mutex queue becomes the hot spot and the
//! benchmark measures sink contention as much as scheduling.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::SinkError;

use super::{OutputEvent, Sink};

/// Sink that takes a lock around each write.
pub struct LockedSink<W> {
    writer: Mutex<W>,
}

impl<W> LockedSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Runs `f` against the writer while holding the lock.
    pub async fn inspect<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        let writer = self.writer.lock().await;
        f(&writer)
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl LockedSink<tokio::io::Stdout> {
    /// Sink over the process stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> Sink for LockedSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn write(&self, ev: &OutputEvent) -> Result<(), SinkError> {
        let line = ev.line();
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(SinkError::write)?;
        writer.flush().await.map_err(SinkError::write)
    }

    async fn flush(&self) -> Result<(), SinkError> {
        self.writer.lock().await.flush().await.map_err(SinkError::write)
    }

    fn name(&self) -> &'static str {
        "locked"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn writes_whole_lines() {
        let sink = LockedSink::new(Vec::new());
        let msg: Arc<str> = Arc::from("hello world!");
        sink.write(&OutputEvent::new(0, msg.clone())).await.unwrap();
        sink.write(&OutputEvent::new(1, msg)).await.unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "hello world! 0\nhello world! 1\n");
    }

    #[tokio::test]
    async fn concurrent_writers_never_interleave() {
        let sink = Arc::new(LockedSink::new(Vec::new()));
        let msg: Arc<str> = Arc::from("a fairly long message to widen the race window");

        let mut set = tokio::task::JoinSet::new();
        for unit in 0..64u64 {
            let sink = sink.clone();
            let msg = msg.clone();
            set.spawn(async move {
                for _ in 0..16 {
                    sink.write(&OutputEvent::new(unit, msg.clone())).await.unwrap();
                    tokio::task::yield_now().await;
                }
            });
        }
        while set.join_next().await.is_some() {}

        let out = sink
            .inspect(|buf| String::from_utf8(buf.clone()).unwrap())
            .await;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 64 * 16);
        for line in lines {
            let (text, id) = line.rsplit_once(' ').unwrap();
            assert_eq!(text, &*msg);
            assert!(id.parse::<u64>().unwrap() < 64);
        }
    }

    #[tokio::test]
    async fn broken_writer_surfaces_write_error() {
        let sink = LockedSink::new(BrokenPipe);
        let err = sink
            .write(&OutputEvent::new(3, Arc::from("x")))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "sink_write_failed");
    }
}
