//! Address Registry: the immutable address → command table.
//!
//! Built once at start-up from the configured button entries and read-only
//! afterwards, so the dispatcher resolves presses without any locking.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use dash_events::{AddressError, HardwareAddress};
use tracing::{debug, warn};

use crate::command::{ButtonConfig, Command};
use crate::error::{ConfigError, Result};

/// Immutable mapping from hardware address to command.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: HashMap<HardwareAddress, Command>,
}

impl Registry {
    /// Build with the default policy: a duplicate address overwrites the
    /// earlier entry.
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a ButtonConfig>) -> Result<Self> {
        RegistryBuilder::new().build(entries)
    }

    /// Command bound to `address`, or `None` when the address is unknown
    pub fn lookup(&self, address: &HardwareAddress) -> Option<&Command> {
        self.commands.get(address)
    }

    /// Registered addresses, sorted
    pub fn addresses(&self) -> Vec<&HardwareAddress> {
        let mut addresses: Vec<_> = self.commands.keys().collect();
        addresses.sort();
        addresses
    }

    /// Commands ordered by address
    pub fn commands(&self) -> Vec<&Command> {
        self.addresses()
            .into_iter()
            .filter_map(|address| self.commands.get(address))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Builder that decides how duplicate addresses are treated.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    reject_duplicates: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a repeated address with [`ConfigError::DuplicateAddress`]
    /// instead of letting the later entry win
    pub fn strict(mut self, reject_duplicates: bool) -> Self {
        self.reject_duplicates = reject_duplicates;
        self
    }

    pub fn build<'a>(&self, entries: impl IntoIterator<Item = &'a ButtonConfig>) -> Result<Registry> {
        let mut commands: HashMap<HardwareAddress, Command> = HashMap::new();

        for entry in entries {
            let command = command_from_entry(entry)?;

            match commands.entry(command.address().clone()) {
                Entry::Occupied(mut existing) => {
                    if self.reject_duplicates {
                        return Err(ConfigError::DuplicateAddress {
                            address: existing.key().to_string(),
                            first: existing.get().name().to_string(),
                            second: command.name().to_string(),
                        });
                    }
                    warn!(
                        address = %existing.key(),
                        replaced = existing.get().name(),
                        by = command.name(),
                        "Duplicate button address, later entry wins"
                    );
                    existing.insert(command);
                }
                Entry::Vacant(slot) => {
                    slot.insert(command);
                }
            }
        }

        debug!(buttons = commands.len(), "Registry built");
        Ok(Registry { commands })
    }
}

fn command_from_entry(entry: &ButtonConfig) -> Result<Command> {
    let address = HardwareAddress::parse(&entry.mac).map_err(|source| match source {
        AddressError::Empty => ConfigError::MissingAddress {
            name: entry.name.clone(),
        },
        source => ConfigError::InvalidAddress {
            name: entry.name.clone(),
            source,
        },
    })?;

    let phrases: Vec<String> = entry
        .messages
        .iter()
        .filter(|message| !message.trim().is_empty())
        .cloned()
        .collect();
    if phrases.is_empty() {
        return Err(ConfigError::EmptyCommand {
            name: entry.name.clone(),
            address: address.to_string(),
        });
    }

    Ok(Command::new(entry.name.clone(), address, phrases, entry.wait))
}
