//! Event Source Adapter: the lifecycle of one per-address subscription.

use futures::future;
use futures::stream::StreamExt;
use tracing::{debug, warn};

use crate::address::HardwareAddress;
use crate::error::Result;
use crate::watcher::{ButtonWatcher, PressStream};

/// One started subscription for a single button.
pub struct EventSourceAdapter {
    interface: String,
    address: HardwareAddress,
    presses: PressStream,
}

impl EventSourceAdapter {
    /// Subscribe to presses of `address` on `interface` through `watcher`.
    pub fn start(
        watcher: &dyn ButtonWatcher,
        interface: &str,
        address: &HardwareAddress,
    ) -> Result<Self> {
        let presses = watcher.watch(interface, address)?;
        debug!(%address, interface, "Watching button");

        Ok(Self {
            interface: interface.to_string(),
            address: address.clone(),
            presses,
        })
    }

    /// Address this adapter watches
    pub fn address(&self) -> &HardwareAddress {
        &self.address
    }

    /// Interface the subscription was made on
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Consume the adapter, yielding only presses of its own address.
    ///
    /// A watcher that leaks events for other addresses has them dropped here.
    pub fn into_stream(self) -> PressStream {
        let address = self.address;
        self.presses
            .filter(move |event| {
                let own = event.address == address;
                if !own {
                    warn!(
                        expected = %address,
                        received = %event.address,
                        "Dropping press event for a foreign address"
                    );
                }
                future::ready(own)
            })
            .boxed()
    }
}

impl std::fmt::Debug for EventSourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSourceAdapter")
            .field("interface", &self.interface)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
