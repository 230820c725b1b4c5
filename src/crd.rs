// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for cluster DNS.
//!
//! [`ClusterDNS`] describes the desired state of the cluster DNS service: which
//! address it answers on and which domain it serves. The manifest factory reads it
//! to name, label and configure the `ConfigMap`, `DaemonSet` and `Service` it renders.
//!
//! # Example
//!
//! ```rust,no_run
//! use cluster_dns_operator::crd::{ClusterDNS, ClusterDNSSpec};
//!
//! let dns = ClusterDNS::new(
//!     "default",
//!     ClusterDNSSpec {
//!         cluster_ip: Some("172.30.0.10".to_string()),
//!         cluster_domain: Some("cluster.local".to_string()),
//!     },
//! );
//! ```

use crate::constants::dns_resource_name;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `ClusterDNS` is the desired state of a cluster DNS deployment.
///
/// # Example
///
/// ```yaml
/// apiVersion: dns.openshift.io/v1alpha1
/// kind: ClusterDNS
/// metadata:
///   name: default
/// spec:
///   clusterIP: 172.30.0.10
///   clusterDomain: cluster.local
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns.openshift.io",
    version = "v1alpha1",
    kind = "ClusterDNS",
    plural = "clusterdnses",
    doc = "ClusterDNS describes a cluster DNS deployment: the service address it answers on and the cluster domain it serves."
)]
#[kube(status = "ClusterDNSStatus")]
#[serde(rename_all = "camelCase")]
pub struct ClusterDNSSpec {
    /// Service address the DNS server answers on.
    ///
    /// Must lie inside the cluster service network. When absent, the rendered
    /// `Service` is assigned an address by the API server and the node resolver
    /// falls back to the node's own resolver configuration.
    #[serde(default, rename = "clusterIP", skip_serializing_if = "Option::is_none")]
    pub cluster_ip: Option<String>,

    /// Cluster domain served by the DNS server (e.g., "cluster.local").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,
}

/// Observed state of a `ClusterDNS`.
///
/// Rendering never reads status; unknown fields written by other controllers are
/// ignored on decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClusterDNSStatus {}

impl ClusterDNS {
    /// Name shared by the `ConfigMap`, `DaemonSet` and `Service` rendered for this resource.
    #[must_use]
    pub fn resource_name(&self) -> String {
        dns_resource_name(&self.name_any())
    }
}
