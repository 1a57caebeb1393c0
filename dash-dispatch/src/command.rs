//! Button configuration records and the commands built from them.

use std::time::Duration;

use dash_events::HardwareAddress;
use serde::Deserialize;

/// Pacing used when an entry leaves `wait` unset or zero
pub const DEFAULT_PACING_SECS: u64 = 4;

/// One raw button entry as supplied by configuration loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ButtonConfig {
    /// Human-readable button name
    #[serde(default)]
    pub name: String,
    /// Hardware address of the button
    #[serde(default)]
    pub mac: String,
    /// Seconds to pause between phrases; 0 means the default
    #[serde(default)]
    pub wait: u64,
    /// Phrases spoken, in order, when the button is pressed
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ButtonConfig {
    pub fn new(name: impl Into<String>, mac: impl Into<String>, messages: &[&str]) -> Self {
        Self {
            name: name.into(),
            mac: mac.into(),
            wait: 0,
            messages: messages.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Set the pacing in seconds
    pub fn with_wait(mut self, wait: u64) -> Self {
        self.wait = wait;
        self
    }
}

/// The named, ordered phrases bound to one hardware address. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    address: HardwareAddress,
    phrases: Vec<String>,
    pacing: Duration,
}

impl Command {
    /// Build a command; a pacing of zero seconds becomes the default.
    pub(crate) fn new(name: String, address: HardwareAddress, phrases: Vec<String>, pacing_secs: u64) -> Self {
        let pacing_secs = if pacing_secs == 0 {
            DEFAULT_PACING_SECS
        } else {
            pacing_secs
        };
        Self {
            name,
            address,
            phrases,
            pacing: Duration::from_secs(pacing_secs),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &HardwareAddress {
        &self.address
    }

    /// Phrases in speaking order, never empty
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Pause between consecutive phrases
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn pacing_secs(&self) -> u64 {
        self.pacing.as_secs()
    }
}
