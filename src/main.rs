// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use cluster_dns_operator::{
    config::{DeploymentConfig, InstallConfig},
    constants::{ENV_CLI_IMAGE, ENV_DNS_IMAGE},
    manifests::ManifestFactory,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Render the cluster DNS manifests as a multi-document YAML stream.
#[derive(Debug, Parser)]
#[command(name = "cluster-dns-render", version, about)]
struct Cli {
    /// Installer configuration file holding `networking.serviceCIDR`
    #[arg(long, short = 'c')]
    install_config: PathBuf,

    /// DNS server image (defaults to $IMAGE)
    #[arg(long)]
    dns_image: Option<String>,

    /// Node resolver image (defaults to $OPENSHIFT_CLI_IMAGE)
    #[arg(long)]
    cli_image: Option<String>,

    /// Name of the `ClusterDNS` resource, overriding the template's
    #[arg(long)]
    name: Option<String>,

    /// Cluster domain, overriding the template's
    #[arg(long)]
    cluster_domain: Option<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = DeploymentConfig::from_lookup(|name| {
        let flag = match name {
            ENV_DNS_IMAGE => cli.dns_image.clone(),
            ENV_CLI_IMAGE => cli.cli_image.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(name).ok())
    })
    .context("Failed to resolve image configuration")?;
    debug!(?config, "Resolved deployment configuration");

    let install_config = InstallConfig::from_file(&cli.install_config)
        .with_context(|| format!("Failed to load {}", cli.install_config.display()))?;

    let factory = ManifestFactory::new(config);

    let mut dns = factory
        .cluster_dns_default_cr(Some(&install_config))
        .context("Failed to render default ClusterDNS")?;
    if let Some(name) = cli.name {
        dns.metadata.name = Some(name);
    }
    if let Some(cluster_domain) = cli.cluster_domain {
        dns.spec.cluster_domain = Some(cluster_domain);
    }
    info!(
        cluster_ip = ?dns.spec.cluster_ip,
        cluster_domain = ?dns.spec.cluster_domain,
        "Rendering cluster DNS manifests"
    );

    let mut out = std::io::stdout().lock();
    emit(&mut out, &factory.dns_namespace()?)?;
    emit(&mut out, &factory.dns_service_account()?)?;
    emit(&mut out, &factory.dns_cluster_role()?)?;
    emit(&mut out, &factory.dns_cluster_role_binding()?)?;
    emit(&mut out, &dns)?;
    emit(&mut out, &factory.dns_config_map(&dns)?)?;
    emit(&mut out, &factory.dns_daemon_set(&dns)?)?;
    emit(&mut out, &factory.dns_service(&dns)?)?;
    out.flush()?;

    info!("Rendered 8 manifests");
    Ok(())
}

/// Writes one document of the YAML stream.
fn emit(out: &mut impl Write, resource: &impl Serialize) -> Result<()> {
    let yaml = serde_yaml::to_string(resource).context("Failed to serialize manifest")?;
    write!(out, "---\n{yaml}")?;
    Ok(())
}

fn init_logging() {
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cluster-dns-render -c install-config.yaml
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cluster-dns-render -c install-config.yaml
    //
    // Logs go to stderr; stdout carries the rendered YAML.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}
