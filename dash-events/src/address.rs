//! Hardware (link-layer) addresses used as button identities.

use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// Link-layer address of a physical button, e.g. `aa:bb:cc:dd:ee:01`.
///
/// Addresses are normalised on parse: surrounding whitespace is trimmed,
/// `-` separators become `:` and hex digits are lower-cased, so the same
/// device always maps to the same key regardless of how it was written down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareAddress(String);

impl HardwareAddress {
    /// Parse and normalise a six-octet address.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let octets: Vec<&str> = trimmed.split([':', '-']).collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|octet| octet.len() == 2 && octet.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(AddressError::Malformed(trimmed.to_string()));
        }

        Ok(Self(octets.join(":").to_ascii_lowercase()))
    }

    /// Get the normalised string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a line of capture output mentions this address.
    pub fn appears_in(&self, line: &str) -> bool {
        line.to_ascii_lowercase()
            .replace('-', ":")
            .contains(self.0.as_str())
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HardwareAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for HardwareAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
