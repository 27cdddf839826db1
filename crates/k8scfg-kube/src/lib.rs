//! Kubernetes cluster client for k8scfg
//!
//! Connects to the cluster and plugs a [`KubeClusterClient`] into the
//! [`ClusterResolver`] from `k8scfg-core`.
//!
//! ```yaml
//! database:
//!   host: ${k8scfg:configmap:prod:database:data:host}
//!   password: ${k8scfg:secret:prod:database:data:password}
//! ```
//!
//! ```rust,ignore
//! let options = k8scfg_kube::KubeOptions::new().in_cluster();
//! k8scfg_kube::register(&options, true).await?;
//! ```

use std::sync::Arc;

use k8scfg_core::error::Result;
use k8scfg_core::provider::{register_global, ProviderRegistry};
use k8scfg_core::ClusterResolver;

mod client;
mod options;

pub use client::KubeClusterClient;
pub use options::{
    ClientSource, ConnectError, KubeOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
};

/// Connect to the cluster and build a provider on the default scheme
pub async fn new_provider(options: &KubeOptions) -> Result<ClusterResolver> {
    let client = KubeClusterClient::connect(options).await?;
    Ok(ClusterResolver::new(Arc::new(client)))
}

/// Connect and add the provider to `registry`
pub async fn register_into(registry: &mut ProviderRegistry, options: &KubeOptions) -> Result<()> {
    let provider = new_provider(options).await?;
    registry.register_with_force(Arc::new(provider), false)
}

/// Connect and register the provider in the global registry.
///
/// # Arguments
/// * `options` - How to reach the cluster
/// * `force` - Replace an existing provider for the same scheme
pub async fn register(options: &KubeOptions, force: bool) -> Result<()> {
    let provider = new_provider(options).await?;
    register_global(Arc::new(provider), force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8scfg_core::error::{ErrorKind, FetchErrorKind};

    fn unreachable_options() -> KubeOptions {
        KubeOptions::new().kubeconfig(Some("/nonexistent/k8scfg/kubeconfig".into()), None)
    }

    #[tokio::test]
    async fn test_new_provider_surfaces_connect_failure() {
        let err = match new_provider(&unreachable_options()).await {
            Ok(_) => panic!("expected connect failure"),
            Err(e) => e,
        };
        assert!(matches!(
            err.kind,
            ErrorKind::Fetch(FetchErrorKind::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn test_register_into_leaves_registry_untouched_on_failure() {
        let mut registry = ProviderRegistry::new();
        assert!(register_into(&mut registry, &unreachable_options())
            .await
            .is_err());
        assert!(!registry.contains(k8scfg_core::DEFAULT_SCHEME));
    }
}
