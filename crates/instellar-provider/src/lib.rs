//! Instellar provider
//!
//! Resources and data sources for managing an Instellar installation
//! declaratively. The provider is configured once with a host and an auth
//! token; every resource then shares the resulting API client.
//!
//! ## Resources
//!
//! | type | entity |
//! |------|--------|
//! | `instellar_cluster` | cluster of nodes running instellar |
//! | `instellar_node` | node of a cluster |
//! | `instellar_component` | database, bucket or other shared service |
//! | `instellar_balancer` | load balancer in front of a cluster |
//! | `instellar_storage` | object storage for build artifacts |
//! | `instellar_uplink` | uplink installed on a cluster |
//!
//! The `instellar_uplink` data source exposes the nodes of an uplink.
//!
//! ## Example
//!
//! ```ignore
//! use instellar_provider::{InstellarProvider, ProviderConfig};
//! use serde_json::json;
//!
//! let provider = InstellarProvider::default().configure(&ProviderConfig::default())?;
//! let cluster = provider.resource("instellar_cluster")?;
//!
//! let state = cluster
//!     .create(json!({
//!         "name": "acme-1",
//!         "provider_name": "aws",
//!         "region": "ap-southeast-1",
//!         "endpoint": "127.0.0.1:8443",
//!         "password_token": "secret"
//!     }))
//!     .await?;
//! ```

pub mod acceptance;
pub mod config;
pub mod data_sources;
pub mod diagnostics;
pub mod error;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;

pub use config::{AUTH_TOKEN_ENV, HOST_ENV, ProviderConfig, ResolvedConfig};
pub use data_sources::DataSourceKind;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Operation, ProviderError, Result};
pub use provider::{ConfiguredProvider, InstellarProvider, PROVIDER_TYPE_NAME, ProviderSchemas};
pub use resource::{DataSource, DataSourceHandle, Resource, ResourceHandle};
pub use resources::ResourceKind;
pub use schema::{Attribute, AttributeType, Block, Schema, Validator};
