//! # dash-events
//!
//! Press event plumbing for dash buttons.
//!
//! A [`ButtonWatcher`] hands out one press stream per hardware address. Each
//! stream is wrapped in an [`EventSourceAdapter`], and the [`Aggregator`] fans
//! every adapter into a single [`AggregatedEvents`] queue that one consumer
//! reads in arrival order.
//!
//! ```rust,ignore
//! use dash_events::{Aggregator, EventSourceAdapter, HardwareAddress, DEFAULT_CAPACITY};
//!
//! let address = HardwareAddress::parse("AA:BB:CC:DD:EE:01")?;
//! let adapter = EventSourceAdapter::start(&watcher, "en3", &address)?;
//! let (aggregator, mut events) = Aggregator::aggregate(vec![adapter], DEFAULT_CAPACITY);
//!
//! while let Some(press) = events.recv().await {
//!     println!("{} pressed at {}", press.address, press.timestamp);
//! }
//! ```

mod address;
mod error;
mod event;

pub mod adapter;
pub mod aggregator;
pub mod interface;
pub mod line_feed;
pub mod watcher;

pub use adapter::EventSourceAdapter;
pub use address::HardwareAddress;
pub use aggregator::{AggregatedEvents, Aggregator, DEFAULT_CAPACITY};
pub use error::{AddressError, Result, SourceError};
pub use event::PressEvent;
pub use interface::{lookup_interface, select_network, InterfaceStatus, Ipv4Network};
pub use line_feed::{LineFeed, LineFeedWatcher, DEFAULT_DEBOUNCE};
pub use watcher::{ButtonWatcher, ChannelWatcher, PressHandle, PressStream};
