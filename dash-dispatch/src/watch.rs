//! Wiring of the watch loop: one adapter per registered address, one
//! aggregator, one dispatcher.

use dash_events::{AggregatedEvents, Aggregator, ButtonWatcher, EventSourceAdapter, SourceError};
use tracing::{error, info};

use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::error::DispatchError;
use crate::registry::Registry;

/// Running subscriptions for every watchable button.
pub struct WatchSession {
    aggregator: Aggregator,
    events: AggregatedEvents,
}

impl WatchSession {
    /// Subscribe to every address in `registry` through `watcher`.
    ///
    /// A button whose subscription fails is logged and skipped; the session
    /// only fails when the registry is empty or no button could be watched.
    /// Must be called inside a tokio runtime.
    pub fn start(
        watcher: &dyn ButtonWatcher,
        interface: &str,
        registry: &Registry,
        capacity: usize,
    ) -> Result<Self, DispatchError> {
        if registry.is_empty() {
            return Err(DispatchError::NoButtons);
        }

        let mut adapters = Vec::with_capacity(registry.len());
        let mut last_failure: Option<SourceError> = None;
        for command in registry.commands() {
            match EventSourceAdapter::start(watcher, interface, command.address()) {
                Ok(adapter) => adapters.push(adapter),
                Err(e) => {
                    error!(
                        button = command.name(),
                        address = %command.address(),
                        "Cannot watch button: {}",
                        e
                    );
                    last_failure = Some(e);
                }
            }
        }

        if adapters.is_empty() {
            return Err(DispatchError::Source(last_failure.unwrap_or(SourceError::Closed)));
        }

        info!(
            interface,
            watched = adapters.len(),
            configured = registry.len(),
            "Watching buttons"
        );
        let (aggregator, events) = Aggregator::aggregate(adapters, capacity);
        Ok(Self { aggregator, events })
    }

    /// Number of buttons actually being watched
    pub fn watched(&self) -> usize {
        self.aggregator.source_count()
    }

    /// Split into the aggregator (keep it alive to keep watching) and its output
    pub fn into_parts(self) -> (Aggregator, AggregatedEvents) {
        (self.aggregator, self.events)
    }

    /// Run `dispatcher` over this session's presses.
    ///
    /// Nothing in the session ends the loop on its own: it runs until the
    /// process is terminated.
    pub async fn run(self, dispatcher: &Dispatcher) -> DispatchStats {
        let (_aggregator, events) = self.into_parts();
        dispatcher.run(events).await
    }
}
