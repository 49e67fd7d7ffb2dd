use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use crate::sensitive::Sensitive;
use serde::{Deserialize, Serialize};

/// S3 compatible object storage the platform uses for build artifacts
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageParams {
    pub host: String,
    pub bucket: String,
    pub region: String,
    pub credential_access_key_id: String,
    pub credential_secret_access_key: Sensitive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageAttributes {
    pub id: u64,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub credential_access_key_id: String,
    #[serde(default)]
    pub credential_secret_access_key: Option<Sensitive>,
}

impl Client {
    pub async fn create_storage(&self, params: &StorageParams) -> Result<Response<StorageAttributes>> {
        self.post(&["storages"], &wrap("storage", params)).await
    }

    pub async fn get_storage(&self, id: &str) -> Result<Response<StorageAttributes>> {
        self.get(&["storages", id]).await
    }

    pub async fn update_storage(
        &self,
        id: &str,
        params: &StorageParams,
    ) -> Result<Response<StorageAttributes>> {
        self.patch(&["storages", id], &wrap("storage", params)).await
    }

    pub async fn delete_storage(&self, id: &str) -> Result<()> {
        self.delete(&["storages", id]).await
    }
}
