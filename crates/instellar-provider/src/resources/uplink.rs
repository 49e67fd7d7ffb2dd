//! `instellar_uplink`

use super::{current_state_attribute, id_attribute, last_updated_attribute};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Schema, Validator};
use async_trait::async_trait;
use instellar_client::{Client, UplinkAttributes, UplinkSetupParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "uplink";

/// Uplink kits Instellar can install
pub const UPLINK_KITS: &[&str] = &["lite", "pro"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UplinkModel {
    pub id: Option<String>,
    pub channel_slug: String,
    pub kit_slug: String,
    pub cluster_id: String,
    pub installation_id: String,
    pub current_state: String,
    pub last_updated: String,
}

impl UplinkModel {
    fn params(&self) -> UplinkSetupParams {
        UplinkSetupParams {
            channel_slug: self.channel_slug.clone(),
            kit_slug: self.kit_slug.clone(),
        }
    }

    fn refresh(&mut self, uplink: UplinkAttributes) {
        self.id = Some(uplink.id.to_string());
        self.channel_slug = uplink.channel_slug;
        self.kit_slug = uplink.kit_slug;
        self.cluster_id = uplink.cluster_id.to_string();
        self.installation_id = uplink
            .installation_id
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.current_state = uplink.current_state;
    }
}

pub struct UplinkResource {
    client: Arc<Client>,
}

impl UplinkResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for UplinkResource {
    type Model = UplinkModel;

    fn schema() -> Schema {
        Schema::new("Manages the uplink installed on an instellar cluster")
            .attribute("id", id_attribute("Identifier of the uplink"))
            .attribute(
                "channel_slug",
                Attribute::required(AttributeType::String, "Distribution channel of the uplink")
                    .updatable(),
            )
            .attribute(
                "kit_slug",
                Attribute::required(AttributeType::String, "Kit to install")
                    .with_validator(Validator::one_of(UPLINK_KITS))
                    .updatable(),
            )
            .attribute(
                "cluster_id",
                Attribute::required(AttributeType::String, "Cluster the uplink is installed on"),
            )
            .attribute(
                "installation_id",
                Attribute::computed(AttributeType::String, "Installation backing the uplink"),
            )
            .attribute("current_state", current_state_attribute())
            .attribute("last_updated", last_updated_attribute())
    }

    async fn create(&self, mut plan: UplinkModel) -> Result<UplinkModel> {
        let uplink = self
            .client
            .create_uplink(&plan.cluster_id, &plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!(
            "Created uplink: {} ({}) on cluster {}",
            uplink.channel_slug,
            uplink.kit_slug,
            uplink.cluster_id
        );
        plan.refresh(uplink);
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: UplinkModel) -> Result<UplinkModel> {
        let id = require_id(ENTITY, &state.id)?;
        let uplink = self
            .client
            .get_uplink(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(uplink);
        Ok(state)
    }

    async fn update(&self, prior: UplinkModel, plan: UplinkModel) -> Result<UplinkModel> {
        let id = require_id(ENTITY, &prior.id)?;

        self.client
            .update_uplink(id, &plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let uplink = self
            .client
            .get_uplink(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated uplink: {}", id);
        let mut state = prior;
        state.refresh(uplink);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: UplinkModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting uplink: {}", id);
        self.client
            .delete_uplink(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{client, envelope};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_records_installation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/provider/automation/clusters/7/uplinks"))
            .and(body_json(json!({
                "uplink": { "channel_slug": "develop", "kit_slug": "lite" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(envelope(json!({
                "id": 4,
                "channel_slug": "develop",
                "kit_slug": "lite",
                "current_state": "pending",
                "cluster_id": 7,
                "installation_id": 19,
                "nodes": []
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let resource = UplinkResource::new(client(&server));
        let state = resource
            .create(UplinkModel {
                channel_slug: "develop".to_string(),
                kit_slug: "lite".to_string(),
                cluster_id: "7".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(state.id.as_deref(), Some("4"));
        assert_eq!(state.installation_id, "19");
        assert_eq!(state.current_state, "pending");
    }

    #[test]
    fn test_kit_slug_is_validated() {
        let diags = UplinkResource::schema().validate_config(&json!({
            "channel_slug": "develop",
            "kit_slug": "enterprise",
            "cluster_id": "7"
        }));
        assert_eq!(diags.for_attribute("kit_slug").count(), 1);
    }

    #[test]
    fn test_numeric_cluster_reference_is_coerced() {
        let schema = UplinkResource::schema();
        let mut config = json!({ "channel_slug": "develop", "kit_slug": "pro", "cluster_id": 7 });
        schema.coerce(&mut config);
        assert_eq!(config["cluster_id"], json!("7"));
        assert!(schema.validate_config(&config).is_empty());
    }
}
