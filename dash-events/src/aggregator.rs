//! Event Aggregator: fan-in of every button's press stream into one queue.
//!
//! Each source is drained by its own forwarding task. All forwarders write into
//! one bounded channel owned by the [`Aggregator`]; a full channel makes the
//! forwarders wait rather than drop presses. The aggregator keeps its own
//! sender, so the output stays open when individual sources die and only
//! closes after [`Aggregator::shutdown`] (or drop).

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapter::EventSourceAdapter;
use crate::address::HardwareAddress;
use crate::event::PressEvent;
use crate::watcher::PressStream;

/// Default capacity of the shared queue. Presses are human-paced.
pub const DEFAULT_CAPACITY: usize = 64;

/// Owner of the shared queue and of every forwarding task.
pub struct Aggregator {
    sender: Option<mpsc::Sender<PressEvent>>,
    forwarders: Vec<(HardwareAddress, JoinHandle<()>)>,
}

impl Aggregator {
    /// Create an aggregator with an empty set of sources.
    pub fn new(capacity: usize) -> (Self, AggregatedEvents) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
                forwarders: Vec::new(),
            },
            AggregatedEvents { receiver },
        )
    }

    /// Merge the given adapters into one stream.
    ///
    /// Spawns one forwarding task per adapter inside the current tokio runtime.
    pub fn aggregate(
        adapters: impl IntoIterator<Item = EventSourceAdapter>,
        capacity: usize,
    ) -> (Self, AggregatedEvents) {
        let (mut aggregator, events) = Self::new(capacity);
        for adapter in adapters {
            aggregator.attach(adapter);
        }
        (aggregator, events)
    }

    /// Start forwarding one adapter's presses into the shared queue.
    ///
    /// Must be called inside a tokio runtime.
    pub fn attach(&mut self, adapter: EventSourceAdapter) {
        let address = adapter.address().clone();
        self.attach_stream(address, adapter.into_stream());
    }

    /// Start forwarding a raw press stream into the shared queue.
    ///
    /// Spawns the forwarding task, so it must be called inside a tokio runtime.
    pub fn attach_stream(&mut self, address: HardwareAddress, presses: PressStream) {
        let Some(sender) = self.sender.clone() else {
            warn!(%address, "Aggregator already shut down, source ignored");
            return;
        };

        let task = tokio::spawn(forward(address.clone(), presses, sender));
        self.forwarders.push((address, task));
    }

    /// Number of sources attached so far
    pub fn source_count(&self) -> usize {
        self.forwarders.len()
    }

    /// Addresses whose forwarding task is still running
    pub fn live_sources(&self) -> Vec<HardwareAddress> {
        self.forwarders
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Stop every forwarder and release the queue.
    ///
    /// Presses already queued are still delivered; the output ends after them.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        for (_, task) in self.forwarders.drain(..) {
            task.abort();
        }
        if self.sender.take().is_some() {
            debug!("Aggregator shut down");
        }
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn forward(
    address: HardwareAddress,
    mut presses: PressStream,
    sender: mpsc::Sender<PressEvent>,
) {
    while let Some(event) = presses.next().await {
        if sender.send(event).await.is_err() {
            debug!(%address, "Aggregated receiver dropped, forwarder exiting");
            return;
        }
    }
    warn!(%address, "Press event source ended, button is no longer watched");
}

/// Consuming side of the aggregator: presses from every source in arrival order.
#[derive(Debug)]
pub struct AggregatedEvents {
    receiver: mpsc::Receiver<PressEvent>,
}

impl AggregatedEvents {
    /// Wait for the next press. `None` once the aggregator is torn down and drained.
    pub async fn recv(&mut self) -> Option<PressEvent> {
        self.receiver.recv().await
    }

    /// Take a press if one is already queued
    pub fn try_recv(&mut self) -> Option<PressEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for AggregatedEvents {
    type Item = PressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::ChannelWatcher;
    use std::time::Duration;
    use tokio_test::{assert_pending, task};

    fn addr(raw: &str) -> HardwareAddress {
        HardwareAddress::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_output_survives_dead_source() {
        let watcher = ChannelWatcher::new();
        let a = watcher.register(addr("aa:bb:cc:dd:ee:01"));
        let b = watcher.register(addr("aa:bb:cc:dd:ee:02"));

        let adapters = vec![
            EventSourceAdapter::start(&watcher, "en3", a.address()).unwrap(),
            EventSourceAdapter::start(&watcher, "en3", b.address()).unwrap(),
        ];
        let (aggregator, mut events) = Aggregator::aggregate(adapters, DEFAULT_CAPACITY);
        assert_eq!(aggregator.source_count(), 2);

        // Source A dies without ever pressing
        drop(a);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(aggregator.live_sources(), vec![addr("aa:bb:cc:dd:ee:02")]);

        b.press();
        let event = events.recv().await.unwrap();
        assert_eq!(event.address, addr("aa:bb:cc:dd:ee:02"));

        // Every source gone, output still open while the aggregator lives
        drop(b);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(aggregator.live_sources().is_empty());
        let mut next = task::spawn(events.recv());
        assert_pending!(next.poll());
        drop(next);

        aggregator.shutdown();
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_delivers_queued_presses() {
        let watcher = ChannelWatcher::new();
        let a = watcher.register(addr("aa:bb:cc:dd:ee:01"));
        let adapter = EventSourceAdapter::start(&watcher, "en3", a.address()).unwrap();
        let (aggregator, mut events) = Aggregator::aggregate(vec![adapter], DEFAULT_CAPACITY);

        a.press();
        a.press();
        tokio::time::sleep(Duration::from_millis(20)).await;

        aggregator.shutdown();
        assert!(events.recv().await.is_some());
        assert!(events.recv().await.is_some());
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_attach_after_shutdown_is_ignored() {
        let (mut aggregator, _events) = Aggregator::new(4);
        aggregator.teardown();

        let presses = futures::stream::empty().boxed();
        aggregator.attach_stream(addr("aa:bb:cc:dd:ee:01"), presses);
        assert_eq!(aggregator.source_count(), 0);
    }

    #[test]
    fn test_new_needs_no_runtime() {
        let (aggregator, mut events) = Aggregator::new(4);
        assert_eq!(aggregator.source_count(), 0);
        assert!(events.try_recv().is_none());
        drop(aggregator);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let (_aggregator, mut events) = Aggregator::new(4);
        assert!(events.try_recv().is_none());
    }
}
