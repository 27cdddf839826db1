//! Cluster client capability
//!
//! The resolver never talks to a cluster directly. It is handed a
//! [`ClusterClient`] at construction time; `k8scfg-kube` provides the real one
//! and [`StaticClusterClient`] serves fixtures from memory.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A cluster key/value object as seen by the resolver.
///
/// For config maps `text` is `data` and `binary` is `binaryData`. For secrets
/// `binary` is the decoded `data` map and `text` is the `stringData` override map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueObject {
    pub text: BTreeMap<String, String>,
    pub binary: BTreeMap<String, Vec<u8>>,
}

impl KeyValueObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.text.insert(key.into(), value.into());
        self
    }

    pub fn with_binary(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.binary.insert(key.into(), value.into());
        self
    }
}

/// Read access to config maps and secrets.
///
/// Implementations must be safe to share between concurrent resolutions.
/// Errors should be `NotFound` when the object does not exist and `Connection`
/// for every other failure.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch a config map
    async fn fetch_config_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject>;

    /// Fetch a secret
    async fn fetch_secret_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject>;
}

/// In-memory cluster client serving fixed objects
#[derive(Debug, Clone, Default)]
pub struct StaticClusterClient {
    config_objects: HashMap<(String, String), KeyValueObject>,
    secret_objects: HashMap<(String, String), KeyValueObject>,
}

impl StaticClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config map
    pub fn with_config_object(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        object: KeyValueObject,
    ) -> Self {
        self.config_objects
            .insert((namespace.into(), name.into()), object);
        self
    }

    /// Add a secret
    pub fn with_secret_object(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        object: KeyValueObject,
    ) -> Self {
        self.secret_objects
            .insert((namespace.into(), name.into()), object);
        self
    }
}

#[async_trait]
impl ClusterClient for StaticClusterClient {
    async fn fetch_config_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject> {
        self.config_objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("configmap {}/{}", namespace, name)))
    }

    async fn fetch_secret_object(&self, namespace: &str, name: &str) -> Result<KeyValueObject> {
        self.secret_objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("secret {}/{}", namespace, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_static_client_serves_objects_by_kind() {
        let cm = KeyValueObject::new().with_text("k", "v");
        let secret = KeyValueObject::new().with_binary("password", b"s3cret".to_vec());
        let client = StaticClusterClient::new()
            .with_config_object("ns", "app", cm.clone())
            .with_secret_object("ns", "app", secret.clone());

        assert_eq!(client.fetch_config_object("ns", "app").await.unwrap(), cm);
        assert_eq!(client.fetch_secret_object("ns", "app").await.unwrap(), secret);
    }

    #[tokio::test]
    async fn test_static_client_missing_object() {
        let client = StaticClusterClient::new()
            .with_config_object("ns", "app", KeyValueObject::new());

        let err = client.fetch_secret_object("ns", "app").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("secret ns/app"));

        let err = client.fetch_config_object("other", "app").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
