//! `instellar_storage`

use super::{current_state_attribute, id_attribute, last_updated_attribute};
use crate::error::{Operation, ProviderError, Result};
use crate::resource::{Resource, require_id, timestamp};
use crate::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use instellar_client::{Client, Sensitive, StorageAttributes, StorageParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ENTITY: &str = "storage";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageModel {
    pub id: Option<String>,
    pub host: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: Sensitive,
    pub current_state: String,
    pub last_updated: String,
}

impl StorageModel {
    fn params(&self) -> StorageParams {
        StorageParams {
            host: self.host.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            credential_access_key_id: self.access_key_id.clone(),
            credential_secret_access_key: self.secret_access_key.clone(),
        }
    }

    fn refresh(&mut self, storage: StorageAttributes) {
        self.id = Some(storage.id.to_string());
        self.host = storage.host;
        self.bucket = storage.bucket;
        self.region = storage.region;
        self.access_key_id = storage.credential_access_key_id;
        if let Some(secret) = storage.credential_secret_access_key {
            self.secret_access_key = secret;
        }
        self.current_state = storage.current_state;
    }
}

pub struct StorageResource {
    client: Arc<Client>,
}

impl StorageResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for StorageResource {
    type Model = StorageModel;

    fn schema() -> Schema {
        Schema::new("Manages the object storage instellar keeps build artifacts in")
            .attribute("id", id_attribute("Identifier of the storage"))
            .attribute(
                "host",
                Attribute::required(AttributeType::String, "S3 compatible endpoint").updatable(),
            )
            .attribute(
                "bucket",
                Attribute::required(AttributeType::String, "Bucket name").updatable(),
            )
            .attribute(
                "region",
                Attribute::required(AttributeType::String, "Bucket region").updatable(),
            )
            .attribute(
                "access_key_id",
                Attribute::required(AttributeType::String, "Access key id").updatable(),
            )
            .attribute(
                "secret_access_key",
                Attribute::required(AttributeType::String, "Secret access key")
                    .sensitive()
                    .updatable(),
            )
            .attribute("current_state", current_state_attribute())
            .attribute("last_updated", last_updated_attribute())
    }

    async fn create(&self, mut plan: StorageModel) -> Result<StorageModel> {
        let storage = self
            .client
            .create_storage(&plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Create, None, e))?
            .into_attributes();

        tracing::info!("Created storage: {}/{}", storage.host, storage.bucket);
        plan.refresh(storage);
        plan.last_updated = timestamp();
        Ok(plan)
    }

    async fn read(&self, mut state: StorageModel) -> Result<StorageModel> {
        let id = require_id(ENTITY, &state.id)?;
        let storage = self
            .client
            .get_storage(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        state.refresh(storage);
        Ok(state)
    }

    async fn update(&self, prior: StorageModel, plan: StorageModel) -> Result<StorageModel> {
        let id = require_id(ENTITY, &prior.id)?;

        self.client
            .update_storage(id, &plan.params())
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Update, Some(id), e))?;

        let storage = self
            .client
            .get_storage(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::info!("Updated storage: {}", id);
        let mut state = StorageModel {
            secret_access_key: plan.secret_access_key,
            ..prior
        };
        state.refresh(storage);
        state.last_updated = timestamp();
        Ok(state)
    }

    async fn delete(&self, state: StorageModel) -> Result<()> {
        let id = require_id(ENTITY, &state.id)?;
        tracing::info!("Deleting storage: {}", id);
        self.client
            .delete_storage(id)
            .await
            .map_err(|e| ProviderError::remote(ENTITY, Operation::Delete, Some(id), e))
    }
}
