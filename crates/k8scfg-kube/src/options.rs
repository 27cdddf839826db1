//! Cluster connection options

use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Timeout for connecting to the API server
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading API server responses
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Where cluster credentials come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientSource {
    /// Kubeconfig if present, otherwise the in-cluster service account
    #[default]
    Infer,
    /// The pod's service account only
    InCluster,
    /// A kubeconfig file, optionally with a specific context
    Kubeconfig {
        path: Option<std::path::PathBuf>,
        context: Option<String>,
    },
}

/// Failures while building a cluster client
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("in-cluster configuration unavailable: {0}")]
    InCluster(#[from] kube::config::InClusterError),
    #[error("could not infer cluster configuration: {0}")]
    Infer(#[from] kube::config::InferConfigError),
    #[error("could not load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
    #[error("could not build cluster client: {0}")]
    Client(#[from] kube::Error),
}

impl From<ConnectError> for k8scfg_core::Error {
    fn from(err: ConnectError) -> Self {
        let help = match &err {
            ConnectError::InCluster(_) => {
                "Run inside a pod with a service account, or use a kubeconfig source"
            }
            _ => "Check the kubeconfig file and selected context",
        };
        k8scfg_core::Error::connection("cluster", err.to_string()).with_help(help)
    }
}

/// Connection options for the cluster client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeOptions {
    pub source: ClientSource,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for KubeOptions {
    fn default() -> Self {
        Self {
            source: ClientSource::Infer,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl KubeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the pod's service account
    pub fn in_cluster(mut self) -> Self {
        self.source = ClientSource::InCluster;
        self
    }

    /// Use a kubeconfig file (default location when `path` is `None`)
    pub fn kubeconfig(
        mut self,
        path: Option<std::path::PathBuf>,
        context: Option<String>,
    ) -> Self {
        self.source = ClientSource::Kubeconfig { path, context };
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Load credentials and build a client
    pub async fn connect(&self) -> Result<Client, ConnectError> {
        let mut config = match &self.source {
            ClientSource::Infer => Config::infer().await?,
            ClientSource::InCluster => Config::incluster()?,
            ClientSource::Kubeconfig { path, context } => {
                let options = KubeConfigOptions {
                    context: context.clone(),
                    ..Default::default()
                };
                match path {
                    Some(path) => {
                        let kubeconfig = Kubeconfig::read_from(path)?;
                        Config::from_custom_kubeconfig(kubeconfig, &options).await?
                    }
                    None => Config::from_kubeconfig(&options).await?,
                }
            }
        };

        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);

        log::debug!(
            "Connecting to cluster at {} ({:?})",
            config.cluster_url,
            self.source
        );

        Ok(Client::try_from(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = KubeOptions::new();

        assert_eq!(options.source, ClientSource::Infer);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
        assert_eq!(options.read_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let options = KubeOptions::new()
            .kubeconfig(None, Some("staging".into()))
            .with_connect_timeout(Duration::from_secs(2))
            .with_read_timeout(Duration::from_secs(5));

        assert_eq!(
            options.source,
            ClientSource::Kubeconfig {
                path: None,
                context: Some("staging".into())
            }
        );
        assert_eq!(options.connect_timeout, Duration::from_secs(2));
        assert_eq!(options.read_timeout, Duration::from_secs(5));

        assert_eq!(KubeOptions::new().in_cluster().source, ClientSource::InCluster);
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_file_is_a_connect_error() {
        let options = KubeOptions::new().kubeconfig(
            Some("/nonexistent/k8scfg/kubeconfig".into()),
            None,
        );

        let err = match options.connect().await {
            Ok(_) => panic!("expected kubeconfig load failure"),
            Err(e) => e,
        };
        assert!(matches!(err, ConnectError::Kubeconfig(_)));

        let err: k8scfg_core::Error = err.into();
        assert!(err.to_string().contains("Cluster request failed: cluster"));
        assert!(err.to_string().contains("Help:"));
    }
}
