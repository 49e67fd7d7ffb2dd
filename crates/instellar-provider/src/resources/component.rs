//! `instellar_component`
//!
//! A component is an external service (database, object store, ...) made
//! available to one or more clusters. Its connection details live in the
//! nested `credential` block.

use super::{
    current_state_attribute, id_attribute, last_updated_attribute, name_attribute,
    provider_name_attribute,
};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Block, Schema, Validator};
use async_trait::async_trait;
use instellar_client::{
    Client, ComponentAttributes, ComponentCredentialAttributes, ComponentCredentialParams,
    ComponentParams, Sensitive,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "component";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub current_state: String,
    pub provider_name: String,
    pub driver: String,
    pub driver_version: String,
    pub cluster_ids: Vec<u64>,
    pub channels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insterra_component_id: Option<i64>,
    pub credential: ComponentCredentialModel,
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentCredentialModel {
    pub username: String,
    pub password: Sensitive,
    pub resource: String,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Sensitive>,
}

impl ComponentCredentialModel {
    fn to_params(&self) -> ComponentCredentialParams {
        ComponentCredentialParams {
            username: self.username.clone(),
            password: self.password.clone(),
            resource: self.resource.clone(),
            host: self.host.clone(),
            port: self.port,
            secure: self.secure,
            certificate: self.certificate.clone(),
        }
    }

    /// Secrets are only overwritten when Instellar returns them
    fn refresh(&mut self, credential: ComponentCredentialAttributes) {
        self.username = credential.username;
        self.resource = credential.resource;
        self.host = credential.host;
        self.port = credential.port;
        self.secure = credential.secure;
        if let Some(password) = credential.password {
            self.password = password;
        }
        if credential.certificate.is_some() {
            self.certificate = credential.certificate;
        }
    }
}

impl ComponentModel {
    fn refresh(&mut self, component: ComponentAttributes) {
        self.id = Some(component.id.to_string());
        // the component payload carries no name, the slug is derived from it
        self.name = component.slug.clone();
        self.slug = component.slug;
        self.current_state = component.current_state;
        self.provider_name = component.provider;
        self.driver = component.driver;
        self.driver_version = component.version;
        self.cluster_ids = component.cluster_ids;
        self.channels = component.channels;
        if let Some(credential) = component.credential {
            self.credential.refresh(credential);
        }
    }
}

pub struct ComponentResource {
    client: Arc<Client>,
}

impl ComponentResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ComponentResource {
    type Model = ComponentModel;

    fn schema() -> Schema {
        let credential = Block::new("Connection details of the component")
            .required()
            .attribute(
                "username",
                Attribute::required(AttributeType::String, "Username"),
            )
            .attribute(
                "password",
                Attribute::required(AttributeType::String, "Password").sensitive(),
            )
            .attribute(
                "resource",
                Attribute::required(AttributeType::String, "Database, bucket or other resource"),
            )
            .attribute("host", Attribute::required(AttributeType::String, "Host"))
            .attribute(
                "port",
                Attribute::required(AttributeType::Int64, "Port")
                    .with_validator(Validator::int_between(1, u16::MAX as i64)),
            )
            .attribute(
                "secure",
                Attribute::optional(AttributeType::Bool, "Connect over TLS"),
            )
            .attribute(
                "certificate",
                Attribute::optional(AttributeType::String, "CA certificate for TLS").sensitive(),
            );

        Schema::new("Manages a component shared with instellar clusters")
            .attribute("id", id_attribute("Identifier of the component"))
            .attribute("name", name_attribute("Name of the component"))
            .attribute(
                "slug",
                Attribute::computed(AttributeType::String, "Slug derived from the name"),
            )
            .attribute("current_state", current_state_attribute())
            .attribute(
                "provider_name",
                provider_name_attribute("Infrastructure provider hosting the component"),
            )
            .attribute(
                "driver",
                Attribute::required(AttributeType::String, "Driver, e.g. database/postgresql"),
            )
            .attribute(
                "driver_version",
                Attribute::required(AttributeType::String, "Version of the driver"),
            )
            .attribute(
                "cluster_ids",
                Attribute::required(
                    AttributeType::list_of(AttributeType::Int64),
                    "Clusters the component is available to",
                )
                .with_validator(Validator::int_between(0, i64::MAX))
                .updatable(),
            )
            .attribute(
                "channels",
                Attribute::required(
                    AttributeType::list_of(AttributeType::String),
                    "Channels the component is available to",
                )
                .updatable(),
            )
            .attribute(
                "insterra_component_id",
                Attribute::optional(
                    AttributeType::Int64,
                    "Component provisioned by insterra for this component",
                ),
            )
            .attribute("last_updated", last_updated_attribute())
            .block("credential", credential)
    }

    async fn create(&self, mut plan: ComponentModel) -> Result<ComponentModel> {
        let params = ComponentParams {
            name: Some(plan.name.clone()),
            provider: Some(plan.provider_name.clone()),
            driver: Some(plan.driver.clone()),
            version: Some(plan.driver_version.clone()),
            cluster_ids: Some(plan.cluster_ids.clone()),
            channels: Some(plan.channels.clone()),
            insterra_component_id: plan.insterra_component_id,
            credential: Some(plan.credential.to_params()),
        };

        let component = self
            .client
            .create_component(&params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!("Created component: {} ({})", component.slug, component.id);
        plan.id = Some(component.id.to_string());
        plan.slug = component.slug;
        plan.current_state = component.current_state;
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: ComponentModel) -> Result<ComponentModel> {
        let id = require_id(ENTITY, &state.id)?;
        let component = self
            .client
            .get_component(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(component);
        Ok(state)
    }

    async fn update(&self, prior: ComponentModel, plan: ComponentModel) -> Result<ComponentModel> {
        let id = require_id(ENTITY, &prior.id)?;
        let params = ComponentParams {
            cluster_ids: Some(plan.cluster_ids),
            channels: Some(plan.channels),
            ..Default::default()
        };

        self.client
            .update_component(id, &params)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let component = self
            .client
            .get_component(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated component: {}", id);
        let mut state = prior;
        state.refresh(component);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: ComponentModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting component: {}", id);
        self.client
            .delete_component(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}
