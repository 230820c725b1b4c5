// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `manifests`

#[cfg(test)]
mod tests {
    use crate::assets::{Asset, AssetResolver, EmbeddedAssets};
    use crate::config::{DeploymentConfig, InstallConfig};
    use crate::crd::{ClusterDNS, ClusterDNSSpec};
    use crate::decode::{
        decode_cluster_role, decode_cluster_role_binding, decode_config_map, decode_namespace,
        decode_service_account,
    };
    use crate::manifest_errors::{ErrorKind, ManifestError};
    use crate::manifests::ManifestFactory;
    use k8s_openapi::api::apps::v1::DaemonSet;
    use k8s_openapi::api::core::v1::{Container, PodSpec};

    const DNS_IMAGE: &str = "quay.io/openshift/origin-coredns:v4.0";
    const CLI_IMAGE: &str = "quay.io/openshift/origin-cli:v4.0";

    /// Serves one asset from a string and everything else from the embedded templates.
    struct OverrideAssets {
        asset: Asset,
        content: String,
    }

    impl AssetResolver for OverrideAssets {
        fn resolve(&self, asset: Asset) -> Result<&[u8], ManifestError> {
            if asset == self.asset {
                Ok(self.content.as_bytes())
            } else {
                EmbeddedAssets.resolve(asset)
            }
        }
    }

    /// Resolver that has no templates at all.
    struct EmptyAssets;

    impl AssetResolver for EmptyAssets {
        fn resolve(&self, asset: Asset) -> Result<&[u8], ManifestError> {
            Err(ManifestError::AssetNotFound {
                name: asset.name().to_string(),
            })
        }
    }

    fn deployment_config() -> DeploymentConfig {
        DeploymentConfig::new(DNS_IMAGE, CLI_IMAGE)
    }

    fn factory() -> ManifestFactory {
        ManifestFactory::new(deployment_config())
    }

    fn factory_with(asset: Asset, content: &str) -> ManifestFactory<OverrideAssets> {
        ManifestFactory::with_resolver(
            deployment_config(),
            OverrideAssets {
                asset,
                content: content.to_string(),
            },
        )
    }

    fn cluster_dns(
        name: &str,
        cluster_ip: Option<&str>,
        cluster_domain: Option<&str>,
    ) -> ClusterDNS {
        ClusterDNS::new(
            name,
            ClusterDNSSpec {
                cluster_ip: cluster_ip.map(String::from),
                cluster_domain: cluster_domain.map(String::from),
            },
        )
    }

    fn pod_spec(ds: &DaemonSet) -> &PodSpec {
        ds.spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .expect("daemon set has a pod spec")
    }

    fn container<'a>(ds: &'a DaemonSet, name: &str) -> &'a Container {
        pod_spec(ds)
            .containers
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("container {name} not found"))
    }

    fn env_value(container: &Container, name: &str) -> Option<String> {
        container
            .env
            .as_ref()?
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.value.clone())
    }

    // ------------------------------------------------------------------------
    // Default ClusterDNS
    // ------------------------------------------------------------------------

    #[test]
    fn test_cluster_dns_default_cr_sets_cluster_ip() {
        let ic = InstallConfig::with_service_cidr("172.30.0.0/16");
        let cr = factory().cluster_dns_default_cr(Some(&ic)).unwrap();

        assert_eq!(cr.metadata.name.as_deref(), Some("default"));
        assert_eq!(cr.spec.cluster_ip.as_deref(), Some("172.30.0.10"));
        assert_eq!(cr.spec.cluster_domain.as_deref(), Some("cluster.local"));
    }

    #[test]
    fn test_cluster_dns_default_cr_missing_install_config() {
        let err = factory().cluster_dns_default_cr(None).unwrap_err();
        assert!(matches!(err, ManifestError::MissingInstallConfig));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_cluster_dns_default_cr_checks_install_config_before_decoding() {
        // A broken template would fail to decode; the missing install config must win
        let factory = factory_with(Asset::ClusterDnsDefaultCr, "metadata: [unclosed");
        let err = factory.cluster_dns_default_cr(None).unwrap_err();
        assert!(matches!(err, ManifestError::MissingInstallConfig));
    }

    #[test]
    fn test_cluster_dns_default_cr_invalid_service_cidr() {
        let ic = InstallConfig::with_service_cidr("172.30.0.0");
        let err = factory().cluster_dns_default_cr(Some(&ic)).unwrap_err();
        assert!(
            matches!(err, ManifestError::InvalidServiceCidr { ref cidr, .. } if cidr == "172.30.0.0")
        );
    }

    #[test]
    fn test_cluster_dns_default_cr_service_cidr_too_small() {
        let ic = InstallConfig::with_service_cidr("172.30.0.0/29");
        let err = factory().cluster_dns_default_cr(Some(&ic)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Derivation);
    }

    #[test]
    fn test_cluster_dns_default_cr_decode_failure() {
        let factory = factory_with(Asset::ClusterDnsDefaultCr, "spec: [unclosed");
        let ic = InstallConfig::with_service_cidr("172.30.0.0/16");
        let err = factory.cluster_dns_default_cr(Some(&ic)).unwrap_err();
        assert!(
            matches!(err, ManifestError::Decode { ref asset, .. } if asset == "default-custom-resource")
        );
    }

    // ------------------------------------------------------------------------
    // Pass-through resources
    // ------------------------------------------------------------------------

    #[test]
    fn test_pass_through_resources_match_templates() {
        let factory = factory();
        let embedded = |asset| EmbeddedAssets::content(asset).as_bytes();

        assert_eq!(
            factory.dns_namespace().unwrap(),
            decode_namespace(embedded(Asset::Namespace)).unwrap()
        );
        assert_eq!(
            factory.dns_service_account().unwrap(),
            decode_service_account(embedded(Asset::ServiceAccount)).unwrap()
        );
        assert_eq!(
            factory.dns_cluster_role().unwrap(),
            decode_cluster_role(embedded(Asset::ClusterRole)).unwrap()
        );
        assert_eq!(
            factory.dns_cluster_role_binding().unwrap(),
            decode_cluster_role_binding(embedded(Asset::ClusterRoleBinding)).unwrap()
        );
    }

    #[test]
    fn test_pass_through_decode_failure() {
        let factory = factory_with(
            Asset::Namespace,
            "apiVersion: v1\nkind: Namespace\nmetadata: oops\n",
        );
        let err = factory.dns_namespace().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_missing_asset_is_reported() {
        let factory = ManifestFactory::with_resolver(deployment_config(), EmptyAssets);
        let err = factory.dns_service_account().unwrap_err();
        assert!(
            matches!(err, ManifestError::AssetNotFound { ref name } if name == "service-account")
        );
        assert_eq!(err.kind(), ErrorKind::Asset);
    }

    // ------------------------------------------------------------------------
    // ConfigMap
    // ------------------------------------------------------------------------

    #[test]
    fn test_dns_config_map_name() {
        let cm = factory()
            .dns_config_map(&cluster_dns("default", None, None))
            .unwrap();
        assert_eq!(cm.metadata.name.as_deref(), Some("dns-default"));
    }

    #[test]
    fn test_dns_config_map_without_domain_keeps_corefile() {
        let template =
            decode_config_map(EmbeddedAssets::content(Asset::ConfigMap).as_bytes()).unwrap();
        let cm = factory()
            .dns_config_map(&cluster_dns("default", Some("10.0.0.10"), None))
            .unwrap();
        assert_eq!(cm.data, template.data);
    }

    #[test]
    fn test_dns_config_map_replaces_every_placeholder() {
        let template =
            decode_config_map(EmbeddedAssets::content(Asset::ConfigMap).as_bytes()).unwrap();
        let original = template.data.unwrap()["Corefile"].clone();

        let cm = factory()
            .dns_config_map(&cluster_dns("default", None, Some("foo.bar")))
            .unwrap();
        let data = cm.data.unwrap();
        let corefile = &data["Corefile"];

        assert!(!corefile.contains("cluster.local"));
        assert!(corefile.contains("kubernetes foo.bar in-addr.arpa ip6.arpa"));
        assert_eq!(*corefile, original.replace("cluster.local", "foo.bar"));
    }

    #[test]
    fn test_dns_config_map_replaces_repeated_placeholder() {
        let template = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: dns
data:
  Corefile: "cluster.local:5353 { kubernetes cluster.local }\nsub.cluster.local.example"
  other: "cluster.local"
"#;
        let cm = factory_with(Asset::ConfigMap, template)
            .dns_config_map(&cluster_dns("default", None, Some("foo.bar")))
            .unwrap();
        let data = cm.data.unwrap();

        assert_eq!(
            data["Corefile"],
            "foo.bar:5353 { kubernetes foo.bar }\nsub.foo.bar.example"
        );
        // Only the Corefile entry is rewritten
        assert_eq!(data["other"], "cluster.local");
    }

    #[test]
    fn test_dns_config_map_without_data_creates_corefile() {
        let template = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: dns\n";
        let cm = factory_with(Asset::ConfigMap, template)
            .dns_config_map(&cluster_dns("default", None, Some("foo.bar")))
            .unwrap();
        assert_eq!(cm.data.unwrap()["Corefile"], "");
    }

    // ------------------------------------------------------------------------
    // DaemonSet
    // ------------------------------------------------------------------------

    #[test]
    fn test_dns_daemon_set_name_and_labels() {
        let ds = factory()
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap();
        assert_eq!(ds.metadata.name.as_deref(), Some("dns-default"));

        let spec = ds.spec.as_ref().unwrap();
        let pod_labels = spec
            .template
            .metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref())
            .unwrap();
        let match_labels = spec.selector.match_labels.as_ref().unwrap();

        assert_eq!(pod_labels.get("dns").map(String::as_str), Some("dns-default"));
        assert_eq!(match_labels.get("dns").map(String::as_str), Some("dns-default"));
    }

    #[test]
    fn test_dns_daemon_set_creates_missing_label_maps() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector: {}
  template:
    spec:
      containers:
      - name: dns
        image: coredns
      volumes:
      - name: config-volume
        configMap:
          name: dns
";
        let ds = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("internal", None, None))
            .unwrap();
        let spec = ds.spec.unwrap();
        let pod_labels = spec.template.metadata.unwrap().labels.unwrap();
        let match_labels = spec.selector.match_labels.unwrap();

        assert_eq!(pod_labels["dns"], "dns-internal");
        assert_eq!(match_labels, pod_labels);
    }

    #[test]
    fn test_dns_daemon_set_points_config_volume_at_config_map() {
        let dns = cluster_dns("default", None, None);
        let factory = factory();
        let ds = factory.dns_daemon_set(&dns).unwrap();
        let cm = factory.dns_config_map(&dns).unwrap();

        let volume = pod_spec(&ds)
            .volumes
            .as_ref()
            .unwrap()
            .iter()
            .find(|v| v.name == "config-volume")
            .unwrap();
        assert_eq!(
            Some(volume.config_map.as_ref().unwrap().name.as_str()),
            cm.metadata.name.as_deref()
        );
    }

    #[test]
    fn test_dns_daemon_set_sets_images() {
        let ds = factory()
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap();
        assert_eq!(container(&ds, "dns").image.as_deref(), Some(DNS_IMAGE));
        assert_eq!(
            container(&ds, "dns-node-resolver").image.as_deref(),
            Some(CLI_IMAGE)
        );
    }

    #[test]
    fn test_dns_daemon_set_appends_resolver_env() {
        let ds = factory()
            .dns_daemon_set(&cluster_dns("default", Some("10.0.0.10"), Some("example.local")))
            .unwrap();
        let resolver = container(&ds, "dns-node-resolver");
        let env = resolver.env.as_ref().unwrap();

        // Template env is preserved, resolver env is appended after it
        assert_eq!(env.len(), 3);
        assert_eq!(env[0].name, "SERVICES");
        assert_eq!(env[1].name, "NAMESERVER");
        assert_eq!(env[1].value.as_deref(), Some("10.0.0.10"));
        assert_eq!(env[2].name, "CLUSTER_DOMAIN");
        assert_eq!(env[2].value.as_deref(), Some("example.local"));

        // The server container gets no resolver env
        assert_eq!(env_value(container(&ds, "dns"), "NAMESERVER"), None);
    }

    #[test]
    fn test_dns_daemon_set_skips_resolver_env_without_both_fields() {
        for dns in [
            cluster_dns("default", Some("10.0.0.10"), None),
            cluster_dns("default", None, Some("example.local")),
            cluster_dns("default", None, None),
        ] {
            let ds = factory().dns_daemon_set(&dns).unwrap();
            let resolver = container(&ds, "dns-node-resolver");
            assert_eq!(env_value(resolver, "NAMESERVER"), None);
            assert_eq!(env_value(resolver, "CLUSTER_DOMAIN"), None);
            assert_eq!(resolver.env.as_ref().map(Vec::len), Some(1));
        }
    }

    #[test]
    fn test_dns_daemon_set_creates_resolver_env_list() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector:
    matchLabels: {}
  template:
    metadata:
      labels: {}
    spec:
      containers:
      - name: dns-node-resolver
        image: cli
      volumes:
      - name: config-volume
        configMap:
          name: dns
";
        let ds = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("default", Some("10.0.0.10"), Some("example.local")))
            .unwrap();
        let resolver = container(&ds, "dns-node-resolver");

        assert_eq!(resolver.env.as_ref().map(Vec::len), Some(2));
        assert_eq!(env_value(resolver, "NAMESERVER").as_deref(), Some("10.0.0.10"));
        assert_eq!(
            env_value(resolver, "CLUSTER_DOMAIN").as_deref(),
            Some("example.local")
        );
    }

    #[test]
    fn test_dns_daemon_set_leaves_other_containers_untouched() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector:
    matchLabels: {}
  template:
    metadata:
      labels: {}
    spec:
      containers:
      - name: dns
        image: coredns
      - name: kube-rbac-proxy
        image: rbac-proxy:v1
        env:
        - name: LOG_LEVEL
          value: info
      volumes:
      - name: config-volume
        configMap:
          name: dns
";
        let ds = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("default", Some("10.0.0.10"), Some("example.local")))
            .unwrap();
        let proxy = container(&ds, "kube-rbac-proxy");

        assert_eq!(proxy.image.as_deref(), Some("rbac-proxy:v1"));
        assert_eq!(proxy.env.as_ref().map(Vec::len), Some(1));
        assert_eq!(container(&ds, "dns").image.as_deref(), Some(DNS_IMAGE));
    }

    #[test]
    fn test_dns_daemon_set_missing_config_volume() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector:
    matchLabels: {}
  template:
    spec:
      containers:
      - name: dns
        image: coredns
      volumes:
      - name: hosts-file
        hostPath:
          path: /etc/hosts
";
        let err = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap_err();

        assert!(
            matches!(err, ManifestError::VolumeNotFound { ref volume } if volume == "config-volume")
        );
        assert_eq!(err.kind(), ErrorKind::TemplateContract);
        assert_eq!(err.to_string(), "volume 'config-volume' not found");
    }

    #[test]
    fn test_dns_daemon_set_config_volume_not_config_map_backed() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector:
    matchLabels: {}
  template:
    spec:
      containers:
      - name: dns
        image: coredns
      volumes:
      - name: config-volume
        emptyDir: {}
";
        let err = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateContract);
    }

    #[test]
    fn test_dns_daemon_set_without_volumes() {
        let template = r"
apiVersion: apps/v1
kind: DaemonSet
metadata:
  name: dns
spec:
  selector:
    matchLabels: {}
  template:
    spec:
      containers:
      - name: dns
        image: coredns
";
        let err = factory_with(Asset::DaemonSet, template)
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap_err();
        assert!(matches!(err, ManifestError::VolumeNotFound { .. }));
    }

    #[test]
    fn test_dns_daemon_set_decode_failure() {
        let err = factory_with(Asset::DaemonSet, "spec:\n  template: 42\n")
            .dns_daemon_set(&cluster_dns("default", None, None))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Decode { ref asset, .. } if asset == "daemon-set"));
    }

    // ------------------------------------------------------------------------
    // Service
    // ------------------------------------------------------------------------

    #[test]
    fn test_dns_service_name_labels_and_selector() {
        let svc = factory()
            .dns_service(&cluster_dns("default", None, None))
            .unwrap();
        assert_eq!(svc.metadata.name.as_deref(), Some("dns-default"));
        assert_eq!(svc.metadata.labels.unwrap()["dns"], "dns-default");

        let spec = svc.spec.unwrap();
        assert_eq!(spec.selector.unwrap()["dns"], "dns-default");
        assert!(spec.cluster_ip.is_none());
    }

    #[test]
    fn test_dns_service_sets_cluster_ip() {
        let svc = factory()
            .dns_service(&cluster_dns("default", Some("172.30.0.10"), None))
            .unwrap();
        assert_eq!(
            svc.spec.unwrap().cluster_ip.as_deref(),
            Some("172.30.0.10")
        );
    }

    #[test]
    fn test_dns_service_creates_missing_spec() {
        let template = "apiVersion: v1\nkind: Service\nmetadata:\n  name: dns\n";
        let svc = factory_with(Asset::Service, template)
            .dns_service(&cluster_dns("default", Some("172.30.0.10"), None))
            .unwrap();
        let spec = svc.spec.unwrap();
        assert_eq!(spec.selector.unwrap()["dns"], "dns-default");
        assert_eq!(spec.cluster_ip.as_deref(), Some("172.30.0.10"));
    }

    // ------------------------------------------------------------------------
    // Cross-object consistency
    // ------------------------------------------------------------------------

    #[test]
    fn test_rendered_names_derive_from_cluster_dns_name() {
        let factory = factory();
        for name in ["default", "internal", "a", "dns-with-dashes"] {
            let dns = cluster_dns(name, Some("10.0.0.10"), Some("example.local"));
            let expected = format!("dns-{name}");

            let cm = factory.dns_config_map(&dns).unwrap();
            let ds = factory.dns_daemon_set(&dns).unwrap();
            let svc = factory.dns_service(&dns).unwrap();

            assert_eq!(cm.metadata.name.as_deref(), Some(expected.as_str()));
            assert_eq!(ds.metadata.name.as_deref(), Some(expected.as_str()));
            assert_eq!(svc.metadata.name.as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn test_service_selector_matches_daemon_set_pods() {
        let factory = factory();
        let dns = cluster_dns("default", Some("172.30.0.10"), Some("cluster.local"));
        let ds = factory.dns_daemon_set(&dns).unwrap();
        let svc = factory.dns_service(&dns).unwrap();

        let pod_labels = ds
            .spec
            .unwrap()
            .template
            .metadata
            .unwrap()
            .labels
            .unwrap();
        let selector = svc.spec.unwrap().selector.unwrap();

        assert!(!selector.is_empty());
        for (key, value) in &selector {
            assert_eq!(pod_labels.get(key), Some(value), "selector {key} does not match pods");
        }
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let factory = factory();
        let dns = cluster_dns("default", Some("10.0.0.10"), Some("example.local"));

        let first = factory.dns_daemon_set(&dns).unwrap();
        let second = factory.dns_daemon_set(&dns).unwrap();
        assert_eq!(first, second);

        // Env is appended to a fresh template each time, never accumulated
        assert_eq!(
            container(&second, "dns-node-resolver").env.as_ref().map(Vec::len),
            Some(3)
        );
    }

    #[test]
    fn test_factory_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ManifestFactory>();

        let factory = std::sync::Arc::new(factory());
        let handles: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let factory = std::sync::Arc::clone(&factory);
                std::thread::spawn(move || {
                    let dns = cluster_dns(name, None, None);
                    factory.dns_service(&dns).unwrap().metadata.name
                })
            })
            .collect();

        let mut names: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["dns-a", "dns-b", "dns-c"]);
    }
}
