// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for manifest rendering.
//!
//! This module provides specialized error types for:
//! - Decoding embedded YAML/JSON templates into typed resources
//! - Rendering resources from the manifest factory
//! - Loading deployment and install configuration
//!
//! Every factory failure is terminal for that call. [`ManifestError::kind`] classifies
//! a failure so callers can report it without matching on every variant.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a single manifest document.
///
/// These are distinct from [`ManifestError`]: they describe what went wrong with the
/// bytes, not which resource was being rendered.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The underlying reader failed before the document was fully read
    #[error("failed to read manifest: {0}")]
    Read(#[source] std::io::Error),

    /// The document is larger than the decoder is willing to buffer
    #[error("manifest exceeds the {limit} byte limit")]
    TooLarge {
        /// Maximum number of bytes accepted
        limit: u64,
    },

    /// The document is not well-formed YAML/JSON, or holds more than one document
    #[error("malformed manifest: {0}")]
    Syntax(#[source] serde_yaml::Error),

    /// The document is well-formed but does not match the target resource schema
    #[error("manifest does not match the expected schema: {0}")]
    Schema(#[source] serde_yaml::Error),
}

/// Broad classification of a [`ManifestError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied configuration is missing or malformed
    Input,
    /// A template failed to decode against its schema
    Decode,
    /// A structural assumption about a template does not hold
    TemplateContract,
    /// A computed value could not be produced from valid-looking input
    Derivation,
    /// The asset resolver has no content for a requested name
    Asset,
}

/// Errors returned by the manifest factory.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// No install configuration was supplied when rendering the default `ClusterDNS`
    #[error("missing install configuration")]
    MissingInstallConfig,

    /// The service network range could not be parsed as CIDR notation
    #[error("invalid serviceCIDR {cidr:?}: {reason}")]
    InvalidServiceCidr {
        /// The value that failed to parse
        cidr: String,
        /// Parser message
        reason: String,
    },

    /// The service network range has no host at the requested offset
    ///
    /// Returned when the range is too small to hold the DNS cluster IP alongside the
    /// low addresses reserved for other services.
    #[error("invalid serviceCIDR {cidr}: prefix does not accommodate a host numbered {offset}")]
    ClusterIpOutOfRange {
        /// The (normalized) service network
        cidr: String,
        /// Requested host offset from the network address
        offset: u32,
    },

    /// An embedded template failed to decode
    #[error("failed to decode manifest '{asset}': {source}")]
    Decode {
        /// Logical asset name of the template
        asset: String,
        /// Underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// A template is missing a volume the factory needs to patch
    #[error("volume '{volume}' not found")]
    VolumeNotFound {
        /// Name of the expected volume
        volume: String,
    },

    /// The asset resolver holds no content for a name
    #[error("asset '{name}' not found")]
    AssetNotFound {
        /// Logical asset name that was requested
        name: String,
    },
}

impl ManifestError {
    /// Returns the broad classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInstallConfig | Self::InvalidServiceCidr { .. } => ErrorKind::Input,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::VolumeNotFound { .. } => ErrorKind::TemplateContract,
            Self::ClusterIpOutOfRange { .. } => ErrorKind::Derivation,
            Self::AssetNotFound { .. } => ErrorKind::Asset,
        }
    }
}

/// Errors that can occur while loading deployment or install configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("environment variable {name} is required")]
    MissingEnv {
        /// Name of the variable
        name: String,
    },

    /// The install config file could not be read
    #[error("failed to read install config {}: {source}", .path.display())]
    Read {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The install config document could not be parsed
    #[error("failed to parse install config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The installer `ConfigMap` does not carry the install config key
    #[error("config map {config_map} has no '{key}' entry")]
    MissingConfigMapKey {
        /// `namespace/name` of the config map
        config_map: String,
        /// Data key that was expected
        key: String,
    },
}
