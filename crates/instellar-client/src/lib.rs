//! Instellar automation API client
//!
//! Thin async client for the automation endpoints of an Instellar
//! installation. Every entity exposes the same four calls (create, get,
//! update, delete) and every successful response carries its payload under
//! `data.attributes`.
//!
//! # Example
//!
//! ```ignore
//! use instellar_client::{Client, ClusterParams};
//!
//! let client = Client::new("https://web.instellar.app", "token")?;
//!
//! let cluster = client
//!     .create_cluster(&ClusterParams {
//!         name: Some("acme-1".to_string()),
//!         provider: Some("aws".to_string()),
//!         region: Some("ap-southeast-1".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! println!("{}", cluster.data.attributes.current_state);
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod sensitive;

pub use client::{Client, DEFAULT_HOST};
pub use error::{ClientError, Result};
pub use models::{
    BalancerAttributes, BalancerParams, ClusterAttributes, ClusterParams, ComponentAttributes,
    ComponentCredentialAttributes, ComponentCredentialParams, ComponentParams, Data,
    NodeAttributes, NodeParams, Response, StorageAttributes, StorageParams, UplinkAttributes,
    UplinkSetupParams,
};
pub use sensitive::Sensitive;
