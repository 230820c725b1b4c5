// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label constants and well-known name roles used across the rendered resources.
//!
//! The `dns` label binds a `Service` and its `DaemonSet` to the same pods. Container
//! and volume roles are recognized by name from the embedded templates; the mapping
//! lives here so it can be audited without decoding anything.

use crate::constants::{CONFIG_VOLUME_NAME, CONTAINER_NAME_DNS, CONTAINER_NAME_NODE_RESOLVER};

// ============================================================================
// Deployment-Identifying Labels
// ============================================================================

/// Label (and selector) key identifying which `ClusterDNS` a pod belongs to
pub const DNS_LABEL: &str = "dns";

// ============================================================================
// Container Roles
// ============================================================================

/// Role a container plays inside the rendered `DaemonSet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerRole {
    /// CoreDNS server, receives the DNS image
    Server,
    /// Node resolver sidecar, receives the CLI image and resolver env vars
    NodeResolver,
}

/// Well-known container names and the role each one plays.
pub const CONTAINER_ROLES: &[(&str, ContainerRole)] = &[
    (CONTAINER_NAME_DNS, ContainerRole::Server),
    (CONTAINER_NAME_NODE_RESOLVER, ContainerRole::NodeResolver),
];

impl ContainerRole {
    /// Looks up the role for a container name. Unknown names have no role.
    #[must_use]
    pub fn from_container_name(name: &str) -> Option<Self> {
        CONTAINER_ROLES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, role)| *role)
    }
}

/// Returns true if `name` is the volume that mounts the CoreDNS `ConfigMap`.
#[must_use]
pub fn is_config_volume(name: &str) -> bool {
    name == CONFIG_VOLUME_NAME
}
