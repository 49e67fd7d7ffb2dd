//! Request parameters and response payloads per entity

mod balancer;
mod cluster;
mod component;
mod node;
mod storage;
mod uplink;

pub use balancer::{BalancerAttributes, BalancerParams};
pub use cluster::{ClusterAttributes, ClusterParams};
pub use component::{
    ComponentAttributes, ComponentCredentialAttributes, ComponentCredentialParams, ComponentParams,
};
pub use node::{NodeAttributes, NodeParams};
pub use storage::{StorageAttributes, StorageParams};
pub use uplink::{UplinkAttributes, UplinkSetupParams};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response envelope returned by every entity endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: Data<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data<T> {
    pub attributes: T,
}

impl<T> Response<T> {
    pub fn into_attributes(self) -> T {
        self.data.attributes
    }
}

/// Nest request parameters under their entity key, e.g. `{"cluster": {...}}`
pub(crate) fn wrap<'a, T: Serialize>(
    key: &'static str,
    params: &'a T,
) -> BTreeMap<&'static str, &'a T> {
    BTreeMap::from([(key, params)])
}
