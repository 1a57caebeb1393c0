//! Press events produced by event sources.

use chrono::{DateTime, Utc};

use crate::address::HardwareAddress;

/// A single detected press of the button with `address`.
///
/// Transient: produced by a source, forwarded once through the aggregator and
/// consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressEvent {
    /// Button that was pressed
    pub address: HardwareAddress,
    /// When the press was detected
    pub timestamp: DateTime<Utc>,
}

impl PressEvent {
    /// Create a press event stamped with the current time
    pub fn new(address: HardwareAddress) -> Self {
        Self::at(address, Utc::now())
    }

    /// Create a press event with an explicit timestamp
    pub fn at(address: HardwareAddress, timestamp: DateTime<Utc>) -> Self {
        Self { address, timestamp }
    }
}
