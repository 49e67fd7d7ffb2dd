//! Managed Instellar resources

mod balancer;
mod cluster;
mod component;
mod node;
mod storage;
mod uplink;

pub use balancer::{BalancerModel, BalancerResource};
pub use cluster::{ClusterModel, ClusterResource};
pub use component::{ComponentCredentialModel, ComponentModel, ComponentResource};
pub use node::{NodeModel, NodeResource};
pub use storage::{StorageModel, StorageResource};
pub use uplink::{UplinkModel, UplinkResource};

use crate::resource::{Resource, ResourceAdapter, ResourceHandle};
use crate::schema::{Attribute, AttributeType, CLOUD_PROVIDERS, NAME_PATTERN, Schema, Validator};
use instellar_client::Client;
use std::sync::Arc;

/// Every resource type the provider registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Cluster,
    Node,
    Component,
    Balancer,
    Storage,
    Uplink,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Cluster,
        ResourceKind::Node,
        ResourceKind::Component,
        ResourceKind::Balancer,
        ResourceKind::Storage,
        ResourceKind::Uplink,
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "instellar_cluster",
            ResourceKind::Node => "instellar_node",
            ResourceKind::Component => "instellar_component",
            ResourceKind::Balancer => "instellar_balancer",
            ResourceKind::Storage => "instellar_storage",
            ResourceKind::Uplink => "instellar_uplink",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    pub fn schema(&self) -> Schema {
        match self {
            ResourceKind::Cluster => ClusterResource::schema(),
            ResourceKind::Node => NodeResource::schema(),
            ResourceKind::Component => ComponentResource::schema(),
            ResourceKind::Balancer => BalancerResource::schema(),
            ResourceKind::Storage => StorageResource::schema(),
            ResourceKind::Uplink => UplinkResource::schema(),
        }
    }

    /// Build the adapter for this kind around a shared client
    pub fn build(&self, client: Arc<Client>) -> Box<dyn ResourceHandle> {
        let name = self.type_name();
        match self {
            ResourceKind::Cluster => Box::new(ResourceAdapter::new(name, ClusterResource::new(client))),
            ResourceKind::Node => Box::new(ResourceAdapter::new(name, NodeResource::new(client))),
            ResourceKind::Component => {
                Box::new(ResourceAdapter::new(name, ComponentResource::new(client)))
            }
            ResourceKind::Balancer => {
                Box::new(ResourceAdapter::new(name, BalancerResource::new(client)))
            }
            ResourceKind::Storage => Box::new(ResourceAdapter::new(name, StorageResource::new(client))),
            ResourceKind::Uplink => Box::new(ResourceAdapter::new(name, UplinkResource::new(client))),
        }
    }
}

/// Identifier every resource exposes
pub(crate) fn id_attribute(entity: &'static str) -> Attribute {
    Attribute::computed(AttributeType::String, entity)
}

pub(crate) fn current_state_attribute() -> Attribute {
    Attribute::computed(AttributeType::String, "Current state reported by Instellar")
}

pub(crate) fn last_updated_attribute() -> Attribute {
    Attribute::computed(AttributeType::String, "Time of the last create or update")
}

/// User chosen name, also used to derive the slug
pub(crate) fn name_attribute(description: &'static str) -> Attribute {
    Attribute::required(AttributeType::String, description)
        .with_validator(Validator::length_between(3, 64))
        .with_validator(Validator::regex_matches(
            &NAME_PATTERN,
            "must contain only lowercase alphanumeric characters",
        ))
}

pub(crate) fn provider_name_attribute(description: &'static str) -> Attribute {
    Attribute::required(AttributeType::String, description)
        .with_validator(Validator::one_of(CLOUD_PROVIDERS))
}
