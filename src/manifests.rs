// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster DNS manifest factory
//!
//! [`ManifestFactory`] renders the resources that make up the cluster DNS service
//! from embedded templates. Each method decodes a fresh copy of one template and
//! patches it with the deployment images and the desired [`ClusterDNS`] state:
//!
//! - `ConfigMap`, `DaemonSet` and `Service` are all named `dns-<ClusterDNS name>`
//! - the `DaemonSet` pods and the `Service` selector share the `dns=<name>` label
//! - the `DaemonSet` config volume points at the rendered `ConfigMap`
//!
//! The factory holds no mutable state, so it can be shared freely between callers.
//!
//! # Example
//!
//! ```rust,no_run
//! use cluster_dns_operator::config::{DeploymentConfig, InstallConfig};
//! use cluster_dns_operator::manifests::ManifestFactory;
//!
//! # fn main() -> Result<(), cluster_dns_operator::manifest_errors::ManifestError> {
//! let factory = ManifestFactory::new(DeploymentConfig::new(
//!     "quay.io/openshift/origin-coredns:latest",
//!     "quay.io/openshift/origin-cli:latest",
//! ));
//! let install_config = InstallConfig::with_service_cidr("172.30.0.0/16");
//!
//! let dns = factory.cluster_dns_default_cr(Some(&install_config))?;
//! let daemon_set = factory.dns_daemon_set(&dns)?;
//! let service = factory.dns_service(&dns)?;
//! # Ok(())
//! # }
//! ```

use crate::assets::{Asset, AssetResolver, EmbeddedAssets};
use crate::cluster_ip::derive_cluster_ip;
use crate::config::{DeploymentConfig, InstallConfig};
use crate::constants::{
    CONFIG_VOLUME_NAME, COREFILE_KEY, DEFAULT_CLUSTER_DOMAIN, DNS_CLUSTER_IP_OFFSET,
    ENV_CLUSTER_DOMAIN, ENV_NAMESERVER,
};
use crate::crd::ClusterDNS;
use crate::decode::decode_manifest;
use crate::labels::{is_config_volume, ContainerRole, DNS_LABEL};
use crate::manifest_errors::ManifestError;
use k8s_openapi::api::{
    apps::v1::{DaemonSet, DaemonSetSpec},
    core::v1::{
        ConfigMap, Container, EnvVar, Namespace, PodSpec, Service, ServiceAccount, ServiceSpec,
    },
    rbac::v1::{ClusterRole, ClusterRoleBinding},
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

/// Renders cluster DNS resources from templates.
///
/// Generic over the template source so tests and alternative packagings can supply
/// their own [`AssetResolver`]; [`ManifestFactory::new`] uses the embedded templates.
#[derive(Clone, Debug)]
pub struct ManifestFactory<R = EmbeddedAssets> {
    config: DeploymentConfig,
    resolver: R,
}

impl ManifestFactory<EmbeddedAssets> {
    /// Creates a factory over the embedded templates.
    #[must_use]
    pub fn new(config: DeploymentConfig) -> Self {
        Self::with_resolver(config, EmbeddedAssets)
    }
}

impl<R: AssetResolver> ManifestFactory<R> {
    /// Creates a factory that reads templates from `resolver`.
    #[must_use]
    pub fn with_resolver(config: DeploymentConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    fn decode<T: DeserializeOwned>(&self, asset: Asset) -> Result<T, ManifestError> {
        debug!(asset = %asset, "Decoding manifest template");
        let reader = self.resolver.reader(asset)?;
        decode_manifest(reader).map_err(|source| ManifestError::Decode {
            asset: asset.name().to_string(),
            source,
        })
    }

    /// Builds the default `ClusterDNS` with its cluster IP set to the 10th host of
    /// the service network from `install_config`.
    ///
    /// # Errors
    ///
    /// - [`ManifestError::MissingInstallConfig`] if `install_config` is `None`, before any decoding
    /// - [`ManifestError::Decode`] if the template fails to decode
    /// - [`ManifestError::InvalidServiceCidr`] or [`ManifestError::ClusterIpOutOfRange`]
    ///   if no cluster IP can be derived
    pub fn cluster_dns_default_cr(
        &self,
        install_config: Option<&InstallConfig>,
    ) -> Result<ClusterDNS, ManifestError> {
        let install_config = install_config.ok_or(ManifestError::MissingInstallConfig)?;

        let mut cr: ClusterDNS = self.decode(Asset::ClusterDnsDefaultCr)?;
        let cluster_ip = derive_cluster_ip(
            &install_config.networking.service_cidr,
            DNS_CLUSTER_IP_OFFSET,
        )?;

        debug!(cluster_ip = %cluster_ip, "Setting default ClusterDNS cluster IP");
        cr.spec.cluster_ip = Some(cluster_ip);
        Ok(cr)
    }

    /// Builds the `Namespace` the DNS workload runs in.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_namespace(&self) -> Result<Namespace, ManifestError> {
        self.decode(Asset::Namespace)
    }

    /// Builds the `ServiceAccount` used by the DNS pods.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_service_account(&self) -> Result<ServiceAccount, ManifestError> {
        self.decode(Asset::ServiceAccount)
    }

    /// Builds the `ClusterRole` granting the DNS server read access to the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_cluster_role(&self) -> Result<ClusterRole, ManifestError> {
        self.decode(Asset::ClusterRole)
    }

    /// Builds the `ClusterRoleBinding` for the DNS service account.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_cluster_role_binding(&self) -> Result<ClusterRoleBinding, ManifestError> {
        self.decode(Asset::ClusterRoleBinding)
    }

    /// Builds the `ConfigMap` holding the Corefile for `dns`.
    ///
    /// When `dns` sets a cluster domain, every occurrence of `cluster.local` in the
    /// Corefile is replaced with it.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_config_map(&self, dns: &ClusterDNS) -> Result<ConfigMap, ManifestError> {
        let mut cm: ConfigMap = self.decode(Asset::ConfigMap)?;
        let name = dns.resource_name();
        debug!(name = %name, "Rendering DNS ConfigMap");
        cm.metadata.name = Some(name);

        if let Some(cluster_domain) = &dns.spec.cluster_domain {
            let corefile = cm
                .data
                .get_or_insert_with(BTreeMap::new)
                .entry(COREFILE_KEY.to_string())
                .or_default();
            *corefile = corefile.replace(DEFAULT_CLUSTER_DOMAIN, cluster_domain);
        }

        Ok(cm)
    }

    /// Builds the `DaemonSet` running CoreDNS and the node resolver for `dns`.
    ///
    /// # Errors
    ///
    /// - [`ManifestError::Decode`] if the template fails to decode
    /// - [`ManifestError::VolumeNotFound`] if the template has no config-map backed
    ///   `config-volume`
    pub fn dns_daemon_set(&self, dns: &ClusterDNS) -> Result<DaemonSet, ManifestError> {
        let mut ds: DaemonSet = self.decode(Asset::DaemonSet)?;
        let name = dns.resource_name();
        debug!(name = %name, "Rendering DNS DaemonSet");
        ds.metadata.name = Some(name.clone());

        let spec = ds.spec.get_or_insert_with(DaemonSetSpec::default);

        // Selector must match the pods the template creates
        set_dns_label(
            spec.template
                .metadata
                .get_or_insert_with(ObjectMeta::default)
                .labels
                .get_or_insert_with(BTreeMap::new),
            &name,
        );
        set_dns_label(
            spec.selector.match_labels.get_or_insert_with(BTreeMap::new),
            &name,
        );

        let pod_spec = spec.template.spec.get_or_insert_with(PodSpec::default);
        point_config_volume_at(pod_spec, &name)?;

        for container in &mut pod_spec.containers {
            self.configure_container(container, dns);
        }

        Ok(ds)
    }

    /// Builds the `Service` fronting the DNS pods for `dns`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Decode`] if the template fails to decode.
    pub fn dns_service(&self, dns: &ClusterDNS) -> Result<Service, ManifestError> {
        let mut svc: Service = self.decode(Asset::Service)?;
        let name = dns.resource_name();
        debug!(name = %name, cluster_ip = ?dns.spec.cluster_ip, "Rendering DNS Service");
        svc.metadata.name = Some(name.clone());

        set_dns_label(svc.metadata.labels.get_or_insert_with(BTreeMap::new), &name);

        let spec = svc.spec.get_or_insert_with(ServiceSpec::default);
        set_dns_label(spec.selector.get_or_insert_with(BTreeMap::new), &name);

        if let Some(cluster_ip) = &dns.spec.cluster_ip {
            spec.cluster_ip = Some(cluster_ip.clone());
        }

        Ok(svc)
    }

    /// Applies the image and env rules for the container's role, if it has one.
    fn configure_container(&self, container: &mut Container, dns: &ClusterDNS) {
        match ContainerRole::from_container_name(&container.name) {
            Some(ContainerRole::Server) => {
                container.image = Some(self.config.core_dns_image.clone());
            }
            Some(ContainerRole::NodeResolver) => {
                container.image = Some(self.config.openshift_cli_image.clone());
                if let (Some(cluster_ip), Some(cluster_domain)) =
                    (&dns.spec.cluster_ip, &dns.spec.cluster_domain)
                {
                    container
                        .env
                        .get_or_insert_with(Vec::new)
                        .extend(resolver_env(cluster_ip, cluster_domain));
                }
            }
            None => {}
        }
    }
}

/// Sets the deployment-identifying `dns` label in `labels`.
fn set_dns_label(labels: &mut BTreeMap<String, String>, name: &str) {
    labels.insert(DNS_LABEL.to_string(), name.to_string());
}

/// Repoints the config-map backed `config-volume` at `config_map_name`.
fn point_config_volume_at(
    pod_spec: &mut PodSpec,
    config_map_name: &str,
) -> Result<(), ManifestError> {
    let source = pod_spec
        .volumes
        .iter_mut()
        .flatten()
        .find(|volume| is_config_volume(&volume.name))
        .and_then(|volume| volume.config_map.as_mut())
        .ok_or_else(|| ManifestError::VolumeNotFound {
            volume: CONFIG_VOLUME_NAME.to_string(),
        })?;

    source.name = config_map_name.to_string();
    Ok(())
}

/// Env vars telling the node resolver which nameserver and domain to query.
fn resolver_env(cluster_ip: &str, cluster_domain: &str) -> [EnvVar; 2] {
    [
        EnvVar {
            name: ENV_NAMESERVER.into(),
            value: Some(cluster_ip.into()),
            ..Default::default()
        },
        EnvVar {
            name: ENV_CLUSTER_DOMAIN.into(),
            value: Some(cluster_domain.into()),
            ..Default::default()
        },
    ]
}
