//! Kubernetes-backed cluster client

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8scfg_core::error::{Error, Result};
use k8scfg_core::{ClusterClient, KeyValueObject};
use kube::{Api, Client};

use crate::options::KubeOptions;

/// Reads config maps and secrets through the Kubernetes API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from connection options
    pub async fn connect(options: &KubeOptions) -> Result<Self> {
        let client = options.connect().await?;
        Ok(Self::new(client))
    }
}

/// Map a kube error to `NotFound` (HTTP 404) or `Connection` (everything else)
pub(crate) fn fetch_error(err: kube::Error, resource: &str) -> Error {
    match err {
        kube::Error::Api(response) if response.code == 404 => {
            Error::not_found(resource).with_cause(response.message)
        }
        other => Error::connection(resource, other.to_string()),
    }
}

/// `data` becomes the text map and `binaryData` the binary map
pub(crate) fn config_map_object(cm: ConfigMap) -> KeyValueObject {
    KeyValueObject {
        text: cm.data.unwrap_or_default(),
        binary: cm
            .binary_data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect(),
    }
}

/// `data` (already base64-decoded) becomes the binary map and `stringData` the text map
pub(crate) fn secret_object(secret: Secret) -> KeyValueObject {
    KeyValueObject {
        text: secret.string_data.unwrap_or_default(),
        binary: secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, v.0))
            .collect(),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn fetch_config_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let cm = api
            .get(name)
            .await
            .map_err(|e| fetch_error(e, &format!("configmap {}/{}", namespace, name)))?;
        Ok(config_map_object(cm))
    }

    async fn fetch_secret_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get(name)
            .await
            .map_err(|e| fetch_error(e, &format!("secret {}/{}", namespace, name)))?;
        Ok(secret_object(secret))
    }
}
