// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Cluster DNS Operator - manifest rendering
//!
//! Renders the Kubernetes resources that run cluster DNS (CoreDNS plus a node
//! resolver sidecar) from templates embedded in the binary.
//!
//! ## Overview
//!
//! - Embedded templates for every resource, behind a pluggable resolver
//! - Typed decoding of YAML/JSON documents into `k8s-openapi` resources
//! - Cluster IP derivation from the service network
//! - A factory that names, labels and patches each resource so the rendered set
//!   references itself consistently
//!
//! ## Modules
//!
//! - [`assets`] - Embedded templates and the [`assets::AssetResolver`] trait
//! - [`cluster_ip`] - Cluster IP derivation from a service CIDR
//! - [`config`] - Deployment images and installer configuration
//! - [`crd`] - The `ClusterDNS` custom resource
//! - [`decode`] - Typed manifest decoding
//! - [`manifests`] - The [`manifests::ManifestFactory`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use cluster_dns_operator::config::{DeploymentConfig, InstallConfig};
//! use cluster_dns_operator::manifests::ManifestFactory;
//!
//! # fn main() -> anyhow::Result<()> {
//! let factory = ManifestFactory::new(DeploymentConfig::from_env()?);
//! let install_config = InstallConfig::from_file("install-config.yaml")?;
//!
//! let dns = factory.cluster_dns_default_cr(Some(&install_config))?;
//! let config_map = factory.dns_config_map(&dns)?;
//! assert_eq!(config_map.metadata.name.as_deref(), Some("dns-default"));
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod cluster_ip;
pub mod config;
pub mod constants;
pub mod crd;
pub mod decode;
pub mod labels;
pub mod manifest_errors;
pub mod manifests;

#[cfg(test)]
mod manifests_tests;
