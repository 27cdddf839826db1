//! k8scfg-core: resolve configuration references from cluster objects
//!
//! A reference names one key of one config map or secret:
//!
//! ```text
//! k8scfg:<configmap|secret>:<namespace>:<name>:<data|binaryData>:<key>
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use k8scfg_core::{ClusterResolver, KeyValueObject, Provider, ResolveContext, StaticClusterClient};
//!
//! # tokio_test_block(async {
//! let client = StaticClusterClient::new().with_config_object(
//!     "default",
//!     "app",
//!     KeyValueObject::new().with_text("log_level", "debug"),
//! );
//! let resolver = ClusterResolver::new(Arc::new(client));
//!
//! let retrieved = resolver
//!     .resolve(&ResolveContext::new(), "k8scfg:configmap:default:app:data:log_level", None)
//!     .await
//!     .unwrap();
//! assert_eq!(retrieved.as_str(), Some("debug"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

pub mod client;
pub mod error;
pub mod provider;
pub mod reference;
pub mod resolver;
pub mod retrieved;

pub use client::{ClusterClient, KeyValueObject, StaticClusterClient};
pub use error::{Error, Result};
pub use provider::{ChangeNotifier, Provider, ProviderRegistry, ResolveContext};
pub use reference::{Field, ObjectKind, Reference};
pub use resolver::{ClusterResolver, DEFAULT_SCHEME};
pub use retrieved::Retrieved;
