//! Error types for the dash-events crate.

/// Reasons a raw string is not a usable hardware address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Nothing left after trimming
    #[error("hardware address is empty")]
    Empty,

    /// Not six hex octets separated by `:` or `-`
    #[error("malformed hardware address: {0}")]
    Malformed(String),
}

/// Errors raised while subscribing to or reading from a press event source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The address handed to the watcher could not be used
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The watcher refused the subscription for this address
    #[error("Failed to watch {address} on {interface}: {reason}")]
    SubscriptionFailed {
        /// Network interface the watch was requested on
        interface: String,
        /// Address that could not be watched
        address: String,
        /// Watcher-specific reason
        reason: String,
    },

    /// The external capture program could not be started
    #[error("Capture program failed: {0}")]
    CaptureFailed(String),

    /// The source has already been consumed or shut down
    #[error("Event source closed")]
    Closed,
}

/// Convenience type alias for Results using SourceError.
pub type Result<T> = std::result::Result<T, SourceError>;
