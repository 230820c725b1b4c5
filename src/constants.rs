// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the cluster DNS manifests.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `ClusterDNS` CRD
pub const API_GROUP: &str = "dns.openshift.io";

/// API version for the `ClusterDNS` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dns.openshift.io/v1alpha1";

/// Kind name for `ClusterDNS` resource
pub const KIND_CLUSTER_DNS: &str = "ClusterDNS";

// ============================================================================
// Naming Constants
// ============================================================================

/// Prefix applied to a `ClusterDNS` name to derive the `ConfigMap`, `DaemonSet` and `Service` names
pub const DNS_RESOURCE_PREFIX: &str = "dns-";

/// Returns the name shared by all resources rendered for a `ClusterDNS` called `cluster_dns_name`.
#[must_use]
pub fn dns_resource_name(cluster_dns_name: &str) -> String {
    format!("{DNS_RESOURCE_PREFIX}{cluster_dns_name}")
}

// ============================================================================
// Cluster IP Constants
// ============================================================================

/// Host offset from the service network address used for the DNS cluster IP
pub const DNS_CLUSTER_IP_OFFSET: u32 = 10;

// ============================================================================
// CoreDNS Configuration Constants
// ============================================================================

/// `ConfigMap` data key holding the CoreDNS configuration
pub const COREFILE_KEY: &str = "Corefile";

/// Domain written into the embedded Corefile, replaced by `spec.clusterDomain`
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

// ============================================================================
// DaemonSet Template Constants
// ============================================================================

/// Name of the `DaemonSet` volume backed by the CoreDNS `ConfigMap`
pub const CONFIG_VOLUME_NAME: &str = "config-volume";

/// Container running the DNS server
pub const CONTAINER_NAME_DNS: &str = "dns";

/// Sidecar container that keeps node `/etc/hosts` in sync with cluster services
pub const CONTAINER_NAME_NODE_RESOLVER: &str = "dns-node-resolver";

/// Env var carrying the resolved cluster IP into the node resolver
pub const ENV_NAMESERVER: &str = "NAMESERVER";

/// Env var carrying the cluster domain into the node resolver
pub const ENV_CLUSTER_DOMAIN: &str = "CLUSTER_DOMAIN";

// ============================================================================
// Decoder Constants
// ============================================================================

/// Largest manifest the decoder will buffer (1 MiB)
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

// ============================================================================
// Deployment Configuration Constants
// ============================================================================

/// Env var holding the DNS server (CoreDNS) image reference
pub const ENV_DNS_IMAGE: &str = "IMAGE";

/// Env var holding the utility (CLI) image reference used by the node resolver
pub const ENV_CLI_IMAGE: &str = "OPENSHIFT_CLI_IMAGE";

/// Namespace of the `ConfigMap` the installer publishes
pub const INSTALL_CONFIG_MAP_NAMESPACE: &str = "kube-system";

/// Name of the `ConfigMap` the installer publishes
pub const INSTALL_CONFIG_MAP_NAME: &str = "cluster-config-v1";

/// Data key within the installer `ConfigMap` holding the install config document
pub const INSTALL_CONFIG_KEY: &str = "install-config";
