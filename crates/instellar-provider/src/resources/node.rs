//! `instellar_node`

use super::{current_state_attribute, id_attribute, last_updated_attribute};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use instellar_client::{Client, NodeAttributes, NodeParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "node";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeModel {
    pub id: Option<String>,
    pub slug: String,
    pub cluster_id: String,
    pub public_ip: String,
    pub current_state: String,
    pub last_updated: String,
}

impl NodeModel {
    fn refresh(&mut self, node: NodeAttributes) {
        self.id = Some(node.id.to_string());
        self.slug = node.slug;
        self.cluster_id = node.cluster_id.to_string();
        self.public_ip = node.public_ip;
        self.current_state = node.current_state;
    }
}

pub struct NodeResource {
    client: Arc<Client>,
}

impl NodeResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for NodeResource {
    type Model = NodeModel;

    fn schema() -> Schema {
        Schema::new("Manages a node belonging to an instellar cluster")
            .attribute("id", id_attribute("Identifier of the node"))
            .attribute(
                "slug",
                Attribute::required(AttributeType::String, "Slug of the node, unique in its cluster"),
            )
            .attribute(
                "cluster_id",
                Attribute::required(AttributeType::String, "Cluster the node belongs to"),
            )
            .attribute(
                "public_ip",
                Attribute::required(AttributeType::String, "Public address of the node").updatable(),
            )
            .attribute("current_state", current_state_attribute())
            .attribute("last_updated", last_updated_attribute())
    }

    async fn create(&self, mut plan: NodeModel) -> Result<NodeModel> {
        let params = NodeParams {
            public_ip: plan.public_ip.clone(),
        };

        let node = self
            .client
            .create_node(&plan.cluster_id, &plan.slug, &params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!("Created node: {} in cluster {}", node.slug, plan.cluster_id);
        plan.id = Some(node.id.to_string());
        plan.current_state = node.current_state;
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: NodeModel) -> Result<NodeModel> {
        let id = require_id(ENTITY, &state.id)?;
        let node = self
            .client
            .get_node(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(node);
        Ok(state)
    }

    async fn update(&self, prior: NodeModel, plan: NodeModel) -> Result<NodeModel> {
        let id = require_id(ENTITY, &prior.id)?;
        let params = NodeParams {
            public_ip: plan.public_ip,
        };

        self.client
            .update_node(&prior.cluster_id, &prior.slug, &params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let node = self
            .client
            .get_node(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated node: {}", id);
        let mut state = prior;
        state.refresh(node);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: NodeModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting node: {}", id);
        self.client
            .delete_node(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}
