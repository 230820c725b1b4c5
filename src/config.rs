// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deployment and install configuration.
//!
//! [`DeploymentConfig`] carries the image references the factory injects into the
//! `DaemonSet`. [`InstallConfig`] is the subset of the installer's configuration the
//! factory needs: the service network the DNS cluster IP is carved from.

use crate::constants::{
    ENV_CLI_IMAGE, ENV_DNS_IMAGE, INSTALL_CONFIG_KEY, INSTALL_CONFIG_MAP_NAME,
    INSTALL_CONFIG_MAP_NAMESPACE,
};
use crate::manifest_errors::ConfigError;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Image references injected into the rendered `DaemonSet`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// DNS server (CoreDNS) image
    pub core_dns_image: String,
    /// Utility image running the node resolver sidecar
    pub openshift_cli_image: String,
}

impl DeploymentConfig {
    /// Creates a configuration from explicit image references.
    #[must_use]
    pub fn new(core_dns_image: impl Into<String>, openshift_cli_image: impl Into<String>) -> Self {
        Self {
            core_dns_image: core_dns_image.into(),
            openshift_cli_image: openshift_cli_image.into(),
        }
    }

    /// Reads image references from `IMAGE` and `OPENSHIFT_CLI_IMAGE`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming the first unset variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads image references through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming the first unset variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingEnv {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            core_dns_image: require(ENV_DNS_IMAGE)?,
            openshift_cli_image: require(ENV_CLI_IMAGE)?,
        })
    }
}

/// Cluster network settings from the installer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    /// Service network in CIDR notation (e.g., "172.30.0.0/16")
    #[serde(rename = "serviceCIDR")]
    pub service_cidr: String,

    /// Pod network in CIDR notation
    #[serde(default, rename = "podCIDR", skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,
}

/// Installer configuration, reduced to the fields manifest rendering reads.
///
/// Unknown fields in the installer document are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    /// Cluster name chosen at install time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Base DNS domain of the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_domain: Option<String>,

    /// Cluster network settings
    pub networking: Networking,
}

impl InstallConfig {
    /// Creates an install config with only the service network set.
    #[must_use]
    pub fn with_service_cidr(service_cidr: impl Into<String>) -> Self {
        Self {
            networking: Networking {
                service_cidr: service_cidr.into(),
                pod_cidr: None,
            },
            ..Self::default()
        }
    }

    /// Parses an install config YAML (or JSON) document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is malformed or lacks `networking.serviceCIDR`.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(document)?)
    }

    /// Reads and parses an install config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or [`ConfigError::Parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading install config");
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&document)
    }

    /// Extracts the install config the installer publishes in
    /// `kube-system/cluster-config-v1` under the `install-config` key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingConfigMapKey`] if the key is absent, or [`ConfigError::Parse`].
    pub fn from_config_map(config_map: &ConfigMap) -> Result<Self, ConfigError> {
        let document = config_map
            .data
            .as_ref()
            .and_then(|data| data.get(INSTALL_CONFIG_KEY))
            .ok_or_else(|| {
                let namespace = config_map
                    .namespace()
                    .unwrap_or_else(|| INSTALL_CONFIG_MAP_NAMESPACE.to_string());
                let name = config_map
                    .metadata
                    .name
                    .clone()
                    .unwrap_or_else(|| INSTALL_CONFIG_MAP_NAME.to_string());
                ConfigError::MissingConfigMapKey {
                    config_map: format!("{namespace}/{name}"),
                    key: INSTALL_CONFIG_KEY.to_string(),
                }
            })?;
        Self::from_yaml(document)
    }
}
