// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster IP derivation from the service network.
//!
//! The DNS service gets a fixed, predictable address: the host at
//! [`DNS_CLUSTER_IP_OFFSET`](crate::constants::DNS_CLUSTER_IP_OFFSET) counted from
//! the network address of the service range. Lower offsets are left to other
//! well-known services (the API server takes offset 1).

use crate::manifest_errors::ManifestError;
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Derives the address at `offset` inside the service network `cidr`.
///
/// Host bits in `cidr` are ignored, so `10.3.0.7/16` is treated as `10.3.0.0/16`.
/// The result is a bare address with no prefix length.
///
/// # Errors
///
/// - [`ManifestError::InvalidServiceCidr`] if `cidr` is not valid CIDR notation
/// - [`ManifestError::ClusterIpOutOfRange`] if the network has no host numbered `offset`
pub fn derive_cluster_ip(cidr: &str, offset: u32) -> Result<String, ManifestError> {
    let network: IpNet = cidr
        .parse()
        .map_err(|e: ipnet::AddrParseError| ManifestError::InvalidServiceCidr {
            cidr: cidr.to_string(),
            reason: e.to_string(),
        })?;
    let network = network.trunc();

    let ip = host_at_offset(&network, offset).ok_or_else(|| ManifestError::ClusterIpOutOfRange {
        cidr: network.to_string(),
        offset,
    })?;

    debug!(cidr = %network, offset, cluster_ip = %ip, "Derived cluster IP");
    Ok(ip.to_string())
}

/// Returns the address `offset` hosts above the network address, or `None` if the
/// prefix is too long to hold it.
///
/// `network` must already be truncated to its network address.
#[must_use]
pub fn host_at_offset(network: &IpNet, offset: u32) -> Option<IpAddr> {
    let host_bits = u32::from(network.max_prefix_len() - network.prefix_len());
    // Largest host number the prefix holds is 2^host_bits - 1. A /0 IPv6 network
    // holds more than any u32 offset.
    if host_bits < 32 && u64::from(offset) >= 1u64 << host_bits {
        return None;
    }

    match network.network() {
        IpAddr::V4(base) => {
            let addr = u32::from(base).checked_add(offset)?;
            Some(IpAddr::V4(Ipv4Addr::from(addr)))
        }
        IpAddr::V6(base) => {
            let addr = u128::from(base).checked_add(u128::from(offset))?;
            Some(IpAddr::V6(Ipv6Addr::from(addr)))
        }
    }
}
