// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed manifest decoding.
//!
//! Turns a byte stream holding exactly one YAML or JSON document into a typed
//! Kubernetes resource. Decoding happens in two steps so that malformed syntax and
//! schema mismatches surface as different [`DecodeError`] variants:
//!
//! 1. The stream is read (up to [`MAX_MANIFEST_BYTES`]) and parsed into a generic YAML value.
//! 2. The value is deserialized into the target type, which checks `apiVersion`, `kind`
//!    and every field type.

use crate::constants::MAX_MANIFEST_BYTES;
use crate::crd::ClusterDNS;
use crate::manifest_errors::DecodeError;
use k8s_openapi::api::{
    apps::v1::{DaemonSet, Deployment},
    core::v1::{ConfigMap, Namespace, Service, ServiceAccount},
    rbac::v1::{ClusterRole, ClusterRoleBinding},
};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use serde::de::DeserializeOwned;
use std::io::Read;

/// Decodes a single manifest document into `T`.
///
/// JSON is accepted as well since it is a subset of YAML.
///
/// # Errors
///
/// - [`DecodeError::Read`] if the reader fails
/// - [`DecodeError::TooLarge`] if the stream holds more than [`MAX_MANIFEST_BYTES`]
/// - [`DecodeError::Syntax`] if the bytes are not a single well-formed document
/// - [`DecodeError::Schema`] if the document does not describe a `T`
pub fn decode_manifest<T: DeserializeOwned>(manifest: impl Read) -> Result<T, DecodeError> {
    let mut buf = Vec::new();
    // Read one byte past the ceiling so an oversized stream is detected without
    // buffering the rest of it.
    manifest
        .take(MAX_MANIFEST_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(DecodeError::Read)?;

    if buf.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(DecodeError::TooLarge {
            limit: MAX_MANIFEST_BYTES,
        });
    }

    let value: serde_yaml::Value = serde_yaml::from_slice(&buf).map_err(DecodeError::Syntax)?;
    serde_yaml::from_value(value).map_err(DecodeError::Schema)
}

/// Decodes a `ClusterDNS` custom resource.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_cluster_dns(manifest: impl Read) -> Result<ClusterDNS, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `Namespace`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_namespace(manifest: impl Read) -> Result<Namespace, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `ServiceAccount`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_service_account(manifest: impl Read) -> Result<ServiceAccount, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `ClusterRole`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_cluster_role(manifest: impl Read) -> Result<ClusterRole, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `ClusterRoleBinding`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_cluster_role_binding(
    manifest: impl Read,
) -> Result<ClusterRoleBinding, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `ConfigMap`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_config_map(manifest: impl Read) -> Result<ConfigMap, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `DaemonSet`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_daemon_set(manifest: impl Read) -> Result<DaemonSet, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `Service`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_service(manifest: impl Read) -> Result<Service, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `Deployment`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_deployment(manifest: impl Read) -> Result<Deployment, DecodeError> {
    decode_manifest(manifest)
}

/// Decodes a `CustomResourceDefinition`.
///
/// # Errors
///
/// See [`decode_manifest`].
pub fn decode_custom_resource_definition(
    manifest: impl Read,
) -> Result<CustomResourceDefinition, DecodeError> {
    decode_manifest(manifest)
}
