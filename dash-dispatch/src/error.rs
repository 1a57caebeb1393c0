//! Error types for the dash-dispatch crate.

use dash_events::{AddressError, SourceError};
use dash_speech::SpeechError;

/// Fatal start-up errors: the watch loop must not start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A button entry has no hardware address
    #[error("Missing address for button '{name}'")]
    MissingAddress {
        /// Button name from the configuration
        name: String,
    },

    /// A button entry's address is not a six-octet hardware address
    #[error("Invalid address for button '{name}': {source}")]
    InvalidAddress {
        /// Button name from the configuration
        name: String,
        #[source]
        source: AddressError,
    },

    /// A button entry has no non-empty phrase
    #[error("Empty command for button '{name}' ({address})")]
    EmptyCommand {
        /// Button name from the configuration
        name: String,
        /// Normalised address of the button
        address: String,
    },

    /// Two entries share an address while duplicates are rejected
    #[error("Duplicate address {address} for buttons '{first}' and '{second}'")]
    DuplicateAddress {
        /// Normalised address
        address: String,
        /// Name of the earlier entry
        first: String,
        /// Name of the later entry
        second: String,
    },

    /// The speech gateway could not be built (e.g. missing credentials)
    #[error("Speech configuration error: {0}")]
    Speech(#[from] SpeechError),
}

/// Errors that stop the watch loop from starting.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The registry holds no buttons, so there is nothing to watch
    #[error("No buttons configured")]
    NoButtons,

    /// Not a single button could be subscribed
    #[error("No button could be watched: {0}")]
    Source(#[from] SourceError),
}

/// Convenience type alias for Results using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
