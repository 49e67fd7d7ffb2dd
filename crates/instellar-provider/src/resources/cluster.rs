//! `instellar_cluster`

use super::{
    current_state_attribute, id_attribute, last_updated_attribute, name_attribute,
    provider_name_attribute,
};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use instellar_client::{Client, ClusterAttributes, ClusterParams, Sensitive};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "cluster";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterModel {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub current_state: String,
    pub provider_name: String,
    pub region: String,
    pub endpoint: String,
    pub password_token: Sensitive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insterra_component_id: Option<i64>,
    pub last_updated: String,
}

impl ClusterModel {
    fn refresh(&mut self, cluster: ClusterAttributes) {
        self.id = Some(cluster.id.to_string());
        self.name = cluster.name;
        self.slug = cluster.slug;
        self.provider_name = cluster.provider;
        self.region = cluster.region;
        self.endpoint = cluster.endpoint;
        self.current_state = cluster.current_state;
    }
}

pub struct ClusterResource {
    client: Arc<Client>,
}

impl ClusterResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ClusterResource {
    type Model = ClusterModel;

    fn schema() -> Schema {
        Schema::new("Manages a cluster of nodes running instellar")
            .attribute("id", id_attribute("Identifier of the cluster"))
            .attribute("name", name_attribute("Name of the cluster"))
            .attribute(
                "slug",
                Attribute::computed(AttributeType::String, "Slug derived from the name"),
            )
            .attribute("current_state", current_state_attribute())
            .attribute(
                "provider_name",
                provider_name_attribute("Infrastructure provider hosting the cluster"),
            )
            .attribute(
                "region",
                Attribute::required(AttributeType::String, "Region of the cluster"),
            )
            .attribute(
                "endpoint",
                Attribute::required(AttributeType::String, "Address of the cluster API")
                    .updatable(),
            )
            .attribute(
                "password_token",
                Attribute::required(AttributeType::String, "Trust password of the cluster")
                    .sensitive(),
            )
            .attribute(
                "insterra_component_id",
                Attribute::optional(
                    AttributeType::Int64,
                    "Component provisioned by insterra for this cluster",
                ),
            )
            .attribute("last_updated", last_updated_attribute())
    }

    async fn create(&self, mut plan: ClusterModel) -> Result<ClusterModel> {
        let params = ClusterParams {
            name: Some(plan.name.clone()),
            provider: Some(plan.provider_name.clone()),
            region: Some(plan.region.clone()),
            credential_endpoint: Some(plan.endpoint.clone()),
            credential_password: Some(plan.password_token.clone()),
            credential_password_confirmation: Some(plan.password_token.clone()),
            insterra_component_id: plan.insterra_component_id,
        };

        let cluster = self
            .client
            .create_cluster(&params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!("Created cluster: {} ({})", cluster.slug, cluster.id);
        plan.refresh(cluster);
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: ClusterModel) -> Result<ClusterModel> {
        let id = require_id(ENTITY, &state.id)?;
        let cluster = self
            .client
            .get_cluster(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(cluster);
        Ok(state)
    }

    async fn update(&self, prior: ClusterModel, plan: ClusterModel) -> Result<ClusterModel> {
        let id = require_id(ENTITY, &prior.id)?;
        let params = ClusterParams {
            credential_endpoint: Some(plan.endpoint.clone()),
            ..Default::default()
        };

        self.client
            .update_cluster(id, &params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let cluster = self
            .client
            .get_cluster(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated cluster: {}", id);
        let mut state = ClusterModel {
            password_token: plan.password_token,
            ..prior
        };
        state.refresh(cluster);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: ClusterModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting cluster: {}", id);
        self.client
            .delete_cluster(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}
