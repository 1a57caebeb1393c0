//! The watch factory: per-address subscriptions to press events.
//!
//! How presses are detected (passive ARP observation, a capture program, a
//! test channel) is the watcher's business. Everything downstream only sees a
//! [`PressStream`] per address.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::address::HardwareAddress;
use crate::error::{Result, SourceError};
use crate::event::PressEvent;

/// Stream of presses for one address. Not expected to end while the
/// underlying interface is up.
pub type PressStream = BoxStream<'static, PressEvent>;

/// Factory for per-address press event subscriptions.
///
/// Implementations must be `Send + Sync`; the same watcher is asked for one
/// subscription per configured button.
pub trait ButtonWatcher: Send + Sync {
    /// Subscribe to presses of `address` observed on `interface`.
    fn watch(&self, interface: &str, address: &HardwareAddress) -> Result<PressStream>;
}

/// In-memory watcher fed through channels.
///
/// Each call to [`ChannelWatcher::register`] hands back the sending side for
/// one address; the matching [`ButtonWatcher::watch`] call takes the receiving
/// side. Dropping the sender ends that address's stream, which is how a dead
/// source is simulated.
#[derive(Default)]
pub struct ChannelWatcher {
    pending: Mutex<HashMap<HardwareAddress, mpsc::UnboundedReceiver<PressEvent>>>,
}

impl ChannelWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare a source for `address` and return the handle used to press it
    pub fn register(&self, address: HardwareAddress) -> PressHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.pending().insert(address.clone(), receiver);
        PressHandle { address, sender }
    }

    /// Pending receivers. A panic while the lock was held leaves the map
    /// itself intact, so poisoning is logged and the map is used as is.
    fn pending(&self) -> MutexGuard<'_, HashMap<HardwareAddress, mpsc::UnboundedReceiver<PressEvent>>> {
        self.pending.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Channel watcher lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl ButtonWatcher for ChannelWatcher {
    fn watch(&self, interface: &str, address: &HardwareAddress) -> Result<PressStream> {
        let receiver = self
            .pending()
            .remove(address)
            .ok_or_else(|| SourceError::SubscriptionFailed {
                interface: interface.to_string(),
                address: address.to_string(),
                reason: "no source registered for this address".to_string(),
            })?;

        let events = stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        });
        Ok(events.boxed())
    }
}

/// Sending side of a [`ChannelWatcher`] source.
#[derive(Debug, Clone)]
pub struct PressHandle {
    address: HardwareAddress,
    sender: mpsc::UnboundedSender<PressEvent>,
}

impl PressHandle {
    /// Address this handle presses
    pub fn address(&self) -> &HardwareAddress {
        &self.address
    }

    /// Emit a press stamped now. Returns `false` once the stream is gone.
    pub fn press(&self) -> bool {
        self.sender.send(PressEvent::new(self.address.clone())).is_ok()
    }

    /// Emit an arbitrary event, which may carry a foreign address
    pub fn send(&self, event: PressEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
