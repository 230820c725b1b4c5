// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Embedded manifest templates.
//!
//! Every resource the factory renders starts from one YAML document compiled into
//! the binary. [`AssetResolver`] is the seam between the factory and wherever those
//! bytes live; [`EmbeddedAssets`] is the compiled-in implementation.

use crate::manifest_errors::ManifestError;
use std::io::{Cursor, Read};

// Embed manifest templates at compile time
const CLUSTER_DNS_DEFAULT_CR: &str = include_str!("../assets/cluster-dns-cr.yaml");
const DNS_NAMESPACE: &str = include_str!("../assets/dns/namespace.yaml");
const DNS_SERVICE_ACCOUNT: &str = include_str!("../assets/dns/service-account.yaml");
const DNS_CLUSTER_ROLE: &str = include_str!("../assets/dns/cluster-role.yaml");
const DNS_CLUSTER_ROLE_BINDING: &str = include_str!("../assets/dns/cluster-role-binding.yaml");
const DNS_CONFIG_MAP: &str = include_str!("../assets/dns/configmap.yaml");
const DNS_DAEMON_SET: &str = include_str!("../assets/dns/daemonset.yaml");
const DNS_SERVICE: &str = include_str!("../assets/dns/service.yaml");

/// Logical name of each template the factory renders from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Default `ClusterDNS` custom resource
    ClusterDnsDefaultCr,
    /// `Namespace` the DNS workload runs in
    Namespace,
    /// `ServiceAccount` used by the DNS pods
    ServiceAccount,
    /// `ClusterRole` granting read access to services and endpoints
    ClusterRole,
    /// `ClusterRoleBinding` tying the role to the service account
    ClusterRoleBinding,
    /// `ConfigMap` holding the Corefile
    ConfigMap,
    /// `DaemonSet` running CoreDNS and the node resolver
    DaemonSet,
    /// `Service` fronting the DNS pods
    Service,
}

impl Asset {
    /// All assets, in the order a caller would typically apply them.
    pub const ALL: [Self; 8] = [
        Self::Namespace,
        Self::ServiceAccount,
        Self::ClusterRole,
        Self::ClusterRoleBinding,
        Self::ClusterDnsDefaultCr,
        Self::ConfigMap,
        Self::DaemonSet,
        Self::Service,
    ];

    /// Stable logical name of the asset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ClusterDnsDefaultCr => "default-custom-resource",
            Self::Namespace => "namespace",
            Self::ServiceAccount => "service-account",
            Self::ClusterRole => "cluster-role",
            Self::ClusterRoleBinding => "cluster-role-binding",
            Self::ConfigMap => "config-map",
            Self::DaemonSet => "daemon-set",
            Self::Service => "service",
        }
    }

    /// Looks up an asset by its logical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|asset| asset.name() == name)
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of raw template bytes.
///
/// Implementations must return the same content for the same asset on every call;
/// the factory decodes a fresh copy each time and never caches.
pub trait AssetResolver {
    /// Returns the raw document for `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::AssetNotFound`] if the resolver has no content for `asset`.
    fn resolve(&self, asset: Asset) -> Result<&[u8], ManifestError>;

    /// Returns the document for `asset` as a readable stream.
    ///
    /// # Errors
    ///
    /// Same as [`AssetResolver::resolve`].
    fn reader(&self, asset: Asset) -> Result<Box<dyn Read + '_>, ManifestError> {
        Ok(Box::new(Cursor::new(self.resolve(asset)?)))
    }
}

/// Templates compiled into the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedAssets;

impl EmbeddedAssets {
    /// Returns the embedded document for `asset`. Every asset is present.
    #[must_use]
    pub fn content(asset: Asset) -> &'static str {
        match asset {
            Asset::ClusterDnsDefaultCr => CLUSTER_DNS_DEFAULT_CR,
            Asset::Namespace => DNS_NAMESPACE,
            Asset::ServiceAccount => DNS_SERVICE_ACCOUNT,
            Asset::ClusterRole => DNS_CLUSTER_ROLE,
            Asset::ClusterRoleBinding => DNS_CLUSTER_ROLE_BINDING,
            Asset::ConfigMap => DNS_CONFIG_MAP,
            Asset::DaemonSet => DNS_DAEMON_SET,
            Asset::Service => DNS_SERVICE,
        }
    }
}

impl AssetResolver for EmbeddedAssets {
    fn resolve(&self, asset: Asset) -> Result<&[u8], ManifestError> {
        Ok(Self::content(asset).as_bytes())
    }
}
