//! Provider contract
//!
//! A provider owns one URI scheme. The host hands it a full reference string
//! and gets back a [`Retrieved`] document, or an error.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::retrieved::Retrieved;

// Global provider registry for extension crates
static GLOBAL_REGISTRY: OnceLock<RwLock<ProviderRegistry>> = OnceLock::new();

/// Get the global provider registry.
pub fn global_registry() -> &'static RwLock<ProviderRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(ProviderRegistry::new()))
}

/// Register a provider in the global registry.
///
/// # Arguments
/// * `provider` - The provider to register
/// * `force` - If true, overwrite any existing provider for the same scheme.
///   If false, return an error if the scheme is already registered.
pub fn register_global(provider: Arc<dyn Provider>, force: bool) -> Result<()> {
    let mut registry = global_registry()
        .write()
        .map_err(|_| Error::internal("Global registry lock poisoned"))?;
    registry.register_with_force(provider, force)
}

/// Cancellation and deadline for one resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Cancelling this token aborts in-flight fetches
    pub cancellation: CancellationToken,
    /// Point in time after which in-flight fetches are abandoned
    pub deadline: Option<Instant>,
}

impl ResolveContext {
    /// Create a context that is never cancelled and has no deadline
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set a deadline relative to now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Drive `fut` unless the context is cancelled or the deadline passes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Error::cancelled("Context cancelled")),
            _ = deadline => Err(Error::cancelled("Deadline exceeded")),
            result = fut => result,
        }
    }
}

/// Callback a host supplies to learn that a resolved value changed
pub trait ChangeNotifier: Send + Sync {
    fn changed(&self, uri: &str);
}

/// Trait for provider implementations
#[async_trait]
pub trait Provider: Send + Sync {
    /// Resolve a full reference string.
    ///
    /// # Arguments
    /// * `ctx` - Cancellation and deadline for this call
    /// * `uri` - The reference, including the scheme
    /// * `notifier` - Change callback; only invoked when [`Provider::supports_watch`] is true
    async fn resolve(
        &self,
        ctx: &ResolveContext,
        uri: &str,
        notifier: Option<&dyn ChangeNotifier>,
    ) -> Result<Retrieved>;

    /// The URI scheme this provider handles
    fn scheme(&self) -> &str;

    /// Whether this provider ever calls the change notifier
    fn supports_watch(&self) -> bool {
        false
    }

    /// Release any resources held by the provider
    async fn shutdown(&self, _ctx: &ResolveContext) -> Result<()> {
        Ok(())
    }
}

/// Registry of providers keyed by scheme
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider for the same scheme
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.scheme().to_string(), provider);
    }

    /// Register a provider with optional force overwrite.
    pub fn register_with_force(&mut self, provider: Arc<dyn Provider>, force: bool) -> Result<()> {
        let scheme = provider.scheme().to_string();
        if !force && self.providers.contains_key(&scheme) {
            return Err(Error::provider_already_registered(&scheme));
        }
        self.providers.insert(scheme, provider);
        Ok(())
    }

    /// Get a provider by scheme
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.get(scheme)
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.providers.contains_key(scheme)
    }

    /// Route `uri` to the provider owning its scheme (the text before the first colon)
    pub async fn resolve(
        &self,
        ctx: &ResolveContext,
        uri: &str,
        notifier: Option<&dyn ChangeNotifier>,
    ) -> Result<Retrieved> {
        let scheme = uri.split_once(':').map_or(uri, |(scheme, _)| scheme);
        let provider = self
            .providers
            .get(scheme)
            .ok_or_else(|| Error::unknown_scheme(scheme).with_uri(uri))?;
        provider.resolve(ctx, uri, notifier).await
    }

    /// Shut down every registered provider, stopping at the first failure
    pub async fn shutdown(&self, ctx: &ResolveContext) -> Result<()> {
        for provider in self.providers.values() {
            provider.shutdown(ctx).await?;
        }
        Ok(())
    }
}
