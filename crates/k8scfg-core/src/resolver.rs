//! Cluster-backed provider
//!
//! Turns a reference into bytes: parse, fetch the object from the injected
//! [`ClusterClient`], read one key from one sub-map, wrap as [`Retrieved`].
//! Every call is a fresh single fetch with no retry and no cached state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{ClusterClient, KeyValueObject};
use crate::error::{Error, Result};
use crate::provider::{ChangeNotifier, Provider, ResolveContext};
use crate::reference::{Field, ObjectKind, Reference};
use crate::retrieved::Retrieved;

/// Scheme registered when none is configured
pub const DEFAULT_SCHEME: &str = "k8scfg";

/// Which sub-map of a [`KeyValueObject`] a reference reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubMap {
    Text,
    Binary,
}

/// Map a kind and field to the sub-map holding the value.
///
/// Secrets are crossed relative to config maps: `data` reads the decoded
/// binary map and `binaryData` reads the `stringData` text map. Existing
/// references depend on this mapping.
fn sub_map(kind: ObjectKind, field: Field) -> SubMap {
    match (kind, field) {
        (ObjectKind::ConfigObject, Field::PlainData) => SubMap::Text,
        (ObjectKind::ConfigObject, Field::BinaryData) => SubMap::Binary,
        (ObjectKind::SecretObject, Field::PlainData) => SubMap::Binary,
        (ObjectKind::SecretObject, Field::BinaryData) => SubMap::Text,
    }
}

/// Read the referenced key. Absent keys and empty values both fail with `EmptyValue`.
pub fn extract(object: &KeyValueObject, reference: &Reference) -> Result<Vec<u8>> {
    let bytes = match sub_map(reference.kind, reference.field) {
        SubMap::Text => object
            .text
            .get(&reference.key)
            .map(|s| s.as_bytes().to_vec()),
        SubMap::Binary => object.binary.get(&reference.key).cloned(),
    }
    .unwrap_or_default();

    if bytes.is_empty() {
        return Err(Error::empty_value(reference.field.token(), &reference.key));
    }
    Ok(bytes)
}

/// Provider resolving references against config maps and secrets.
///
/// ## Usage
///
/// ```yaml
/// exporters:
///   otlp:
///     endpoint: ${k8scfg:configmap:observability:collector:data:endpoint}
///     headers:
///       api-key: ${k8scfg:secret:observability:collector-auth:data:api-key}
/// ```
pub struct ClusterResolver {
    client: Arc<dyn ClusterClient>,
    scheme: String,
}

impl ClusterResolver {
    /// Create a resolver using [`DEFAULT_SCHEME`].
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self {
            client,
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }

    /// Register under a different scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Fetch the object a reference points at
    async fn fetch(&self, reference: &Reference) -> Result<KeyValueObject> {
        log::debug!(
            "Fetching {} for key '{}' ({})",
            reference.resource(),
            reference.key,
            reference.field.token()
        );
        match reference.kind {
            ObjectKind::ConfigObject => {
                self.client
                    .fetch_config_object(&reference.namespace, &reference.name)
                    .await
            }
            ObjectKind::SecretObject => {
                self.client
                    .fetch_secret_object(&reference.namespace, &reference.name)
                    .await
            }
        }
    }

    /// Resolve an already parsed reference
    pub async fn resolve_reference(
        &self,
        ctx: &ResolveContext,
        reference: &Reference,
    ) -> Result<Retrieved> {
        let object = ctx.run(self.fetch(reference)).await?;
        let bytes = extract(&object, reference)?;

        Ok(match reference.kind {
            ObjectKind::SecretObject => Retrieved::sensitive(bytes),
            ObjectKind::ConfigObject => Retrieved::from_yaml(bytes),
        })
    }
}

#[async_trait]
impl Provider for ClusterResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        uri: &str,
        notifier: Option<&dyn ChangeNotifier>,
    ) -> Result<Retrieved> {
        if notifier.is_some() {
            log::debug!(
                "'{}' provider does not watch for changes; ignoring change notifier for {}",
                self.scheme,
                uri
            );
        }

        let reference = Reference::parse(uri, &self.scheme)?;
        self.resolve_reference(ctx, &reference)
            .await
            .map_err(|e| e.with_uri(uri))
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }
}
