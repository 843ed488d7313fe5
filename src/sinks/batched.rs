//! # Queue-and-batch sink.
//!
//! [`BatchedSink`] moves the write off the firing path. A firing renders its
//! line and hands it to a bounded queue; one writer task drains the queue into
//! a buffered writer.
//!
//! ```text
//! unit 0 ──┐
//! unit 1 ──┼── send(line) ──► [bounded queue] ──► writer task ──► BufWriter ──► stream
//! unit N ──┘   (suspends                           flush when queue drained
//!               when full)                         or every `flush_every` lines
//! ```
//!
//! ## What it measures
//! Units contend only on the queue, not on the stream. A full queue suspends the
//! sender instead of dropping its line, so every firing is still emitted
//! exactly once. Stream errors happen on the writer task after the firing has
//! returned; they are published as `SinkFlushFailed` instead of being returned
//! to the unit.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::{mpsc, oneshot};

use crate::error::SinkError;
use crate::events::{Bus, Event, EventKind};

use super::{OutputEvent, Sink};

const NAME: &str = "batched";

enum Command {
    Line(String),
    Flush(oneshot::Sender<Result<(), SinkError>>),
}

/// Sink that queues lines for a single buffered writer task.
pub struct BatchedSink {
    tx: mpsc::Sender<Command>,
}

impl BatchedSink {
    /// Spawns the writer task over `writer`.
    ///
    /// - `capacity`: queue length before senders suspend (min 1)
    /// - `flush_every`: flush at least every N lines even while the queue stays busy (min 1)
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<W>(writer: W, capacity: usize, flush_every: usize, bus: Bus) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(drain(writer, rx, flush_every.max(1), bus));
        Self { tx }
    }

    /// Batched sink over the process stdout.
    pub fn stdout(capacity: usize, flush_every: usize, bus: Bus) -> Self {
        Self::spawn(tokio::io::stdout(), capacity, flush_every, bus)
    }
}

#[async_trait]
impl Sink for BatchedSink {
    async fn write(&self, ev: &OutputEvent) -> Result<(), SinkError> {
        self.tx
            .send(Command::Line(ev.line()))
            .await
            .map_err(|_| SinkError::Closed)
    }

    async fn flush(&self) -> Result<(), SinkError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .await
            .map_err(|_| SinkError::Closed)?;
        done.await.map_err(|_| SinkError::Closed)?
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

async fn drain<W>(writer: W, mut rx: mpsc::Receiver<Command>, flush_every: usize, bus: Bus)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut out = BufWriter::new(writer);
    let mut buffered = 0usize;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Line(line) => {
                if let Err(e) = out.write_all(line.as_bytes()).await {
                    report(&bus, SinkError::write(e));
                    continue;
                }
                buffered += 1;
                if buffered >= flush_every || rx.is_empty() {
                    buffered = 0;
                    if let Err(e) = out.flush().await {
                        report(&bus, SinkError::write(e));
                    }
                }
            }
            Command::Flush(reply) => {
                buffered = 0;
                let _ = reply.send(out.flush().await.map_err(SinkError::write));
            }
        }
    }

    if let Err(e) = out.flush().await {
        report(&bus, SinkError::write(e));
    }
}

fn report(bus: &Bus, err: SinkError) {
    bus.publish(
        Event::new(EventKind::SinkFlushFailed)
            .with_name(NAME)
            .with_reason(err.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl AsyncWrite for SharedBuf {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    struct FailingFlush;

    impl AsyncWrite for FailingFlush {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn flush_emits_every_queued_line() {
        let buf = SharedBuf::default();
        let sink = BatchedSink::spawn(buf.clone(), 4, 1024, Bus::new(8));
        let msg: Arc<str> = Arc::from("hello world!");

        for unit in 0..10 {
            sink.write(&OutputEvent::new(unit, msg.clone())).await.unwrap();
        }
        sink.flush().await.unwrap();

        let out = buf.contents();
        let mut ids: Vec<u64> = out
            .lines()
            .map(|l| l.strip_prefix("hello world! ").unwrap().parse().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn writer_failures_become_events() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let sink = BatchedSink::spawn(FailingFlush, 4, 1, bus);

        sink.write(&OutputEvent::new(0, Arc::from("x"))).await.unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SinkFlushFailed);
        assert_eq!(ev.name.as_deref(), Some("batched"));
        assert!(sink.flush().await.is_err());
    }
}
