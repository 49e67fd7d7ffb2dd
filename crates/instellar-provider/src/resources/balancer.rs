//! `instellar_balancer`

use super::{current_state_attribute, id_attribute, last_updated_attribute};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use instellar_client::{BalancerAttributes, BalancerParams, Client};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "balancer";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerModel {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub cluster_id: String,
    pub current_state: String,
    pub last_updated: String,
}

impl BalancerModel {
    fn params(&self) -> BalancerParams {
        BalancerParams {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }

    fn refresh(&mut self, balancer: BalancerAttributes) {
        self.id = Some(balancer.id.to_string());
        self.name = balancer.name;
        self.address = balancer.address;
        self.cluster_id = balancer.cluster_id.to_string();
        self.current_state = balancer.current_state;
    }
}

pub struct BalancerResource {
    client: Arc<Client>,
}

impl BalancerResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for BalancerResource {
    type Model = BalancerModel;

    fn schema() -> Schema {
        Schema::new("Manages the load balancer in front of an instellar cluster")
            .attribute("id", id_attribute("Identifier of the balancer"))
            .attribute(
                "name",
                Attribute::required(AttributeType::String, "Name of the balancer").updatable(),
            )
            .attribute(
                "address",
                Attribute::required(AttributeType::String, "Address traffic is balanced on")
                    .updatable(),
            )
            .attribute(
                "cluster_id",
                Attribute::required(AttributeType::String, "Cluster behind the balancer"),
            )
            .attribute("current_state", current_state_attribute())
            .attribute("last_updated", last_updated_attribute())
    }

    async fn create(&self, mut plan: BalancerModel) -> Result<BalancerModel> {
        let balancer = self
            .client
            .create_balancer(&plan.cluster_id, &plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!("Created balancer: {} -> {}", balancer.name, balancer.address);
        plan.id = Some(balancer.id.to_string());
        plan.current_state = balancer.current_state;
        plan.cluster_id = balancer.cluster_id.to_string();
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: BalancerModel) -> Result<BalancerModel> {
        let id = require_id(ENTITY, &state.id)?;
        let balancer = self
            .client
            .get_balancer(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(balancer);
        Ok(state)
    }

    async fn update(&self, prior: BalancerModel, plan: BalancerModel) -> Result<BalancerModel> {
        let id = require_id(ENTITY, &prior.id)?;

        self.client
            .update_balancer(id, &plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let balancer = self
            .client
            .get_balancer(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated balancer: {}", id);
        let mut state = prior;
        state.refresh(balancer);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: BalancerModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting balancer: {}", id);
        self.client
            .delete_balancer(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}
