use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    core::Config,
    events::Bus,
    sinks::SinkRef,
    subscribers::{Subscribe, SubscriberSet},
};

use super::bench::Bench;

/// Builder for constructing a [`Bench`] with optional subscribers and sink.
pub struct BenchBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    sink: Option<SinkRef>,
}

impl BenchBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            sink: None,
        }
    }

    /// Sets event subscribers for observability.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Injects the shared sink every unit writes to.
    ///
    /// Without it the bench writes to stdout using [`Config::sink`].
    pub fn with_sink(mut self, sink: SinkRef) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the bench: event bus, subscriber workers, listener and sink.
    ///
    /// The listener is only started when there is at least one subscriber.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Bench> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let sink = self.sink.unwrap_or_else(|| self.cfg.sink.stdout(&bus));

        Arc::new(Bench::new_internal(
            self.cfg,
            bus,
            subs,
            sink,
            CancellationToken::new(),
            CancellationToken::new(),
        ))
    }
}
