//! Start-up lookup of the watched network interface.
//!
//! Presses are detected from traffic seen on one interface. Looking it up
//! before watching catches a misspelt name and reports which IPv4 network the
//! buttons are expected on.

use std::fmt;
use std::net::Ipv4Addr;

/// Largest network (smallest prefix) considered a plausible home LAN
pub const MIN_PREFIX: u8 = 16;

/// One IPv4 address assigned to an interface, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Network {
    pub address: Ipv4Addr,
    pub prefix: u8,
}

impl Ipv4Network {
    pub fn new(address: Ipv4Addr, prefix: u8) -> Self {
        Self {
            address,
            prefix: prefix.min(32),
        }
    }

    /// Build from an address and a contiguous netmask
    pub fn from_netmask(address: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self::new(address, u32::from(netmask).count_ones() as u8)
    }

    /// First address of the network
    pub fn network(&self) -> Ipv4Addr {
        let mask = match self.prefix {
            0 => 0,
            prefix => u32::MAX << (32 - u32::from(prefix)),
        };
        Ipv4Addr::from(u32::from(self.address) & mask)
    }
}

impl fmt::Display for Ipv4Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

/// What is known about an interface name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceStatus {
    /// No interface with that name exists
    Missing,
    /// The interface exists, with these IPv4 networks
    Present { networks: Vec<Ipv4Network> },
    /// Interfaces cannot be listed on this platform or the listing failed
    Unknown,
}

/// First non-loopback network no larger than `/16`
pub fn select_network(networks: &[Ipv4Network]) -> Option<Ipv4Network> {
    networks
        .iter()
        .copied()
        .find(|network| !network.address.is_loopback() && network.prefix >= MIN_PREFIX)
}

/// Look up `name` among the host's network interfaces.
#[cfg(unix)]
pub fn lookup_interface(name: &str) -> InterfaceStatus {
    use std::ffi::CStr;

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: `head` is a valid out-pointer; on success the list is released below.
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        tracing::debug!(
            interface = name,
            "Cannot list network interfaces: {}",
            std::io::Error::last_os_error()
        );
        return InterfaceStatus::Unknown;
    }

    let mut found = false;
    let mut networks = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: every node of the list returned by getifaddrs stays valid
        // until freeifaddrs, and its name is a NUL-terminated string.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        if entry.ifa_name.is_null() || unsafe { CStr::from_ptr(entry.ifa_name) }.to_bytes() != name.as_bytes() {
            continue;
        }
        found = true;

        if entry.ifa_addr.is_null() || entry.ifa_netmask.is_null() {
            continue;
        }
        // SAFETY: non-null socket addresses from getifaddrs; AF_INET entries
        // are laid out as sockaddr_in.
        unsafe {
            if i32::from((*entry.ifa_addr).sa_family) != libc::AF_INET {
                continue;
            }
            let address = &*(entry.ifa_addr as *const libc::sockaddr_in);
            let netmask = &*(entry.ifa_netmask as *const libc::sockaddr_in);
            networks.push(Ipv4Network::from_netmask(
                Ipv4Addr::from(u32::from_be(address.sin_addr.s_addr)),
                Ipv4Addr::from(u32::from_be(netmask.sin_addr.s_addr)),
            ));
        }
    }
    // SAFETY: `head` came from a successful getifaddrs and is freed once.
    unsafe { libc::freeifaddrs(head) };

    if found {
        InterfaceStatus::Present { networks }
    } else {
        InterfaceStatus::Missing
    }
}

/// Look up `name` among the host's network interfaces.
#[cfg(not(unix))]
pub fn lookup_interface(_name: &str) -> InterfaceStatus {
    InterfaceStatus::Unknown
}
