use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use serde::{Deserialize, Serialize};

/// Which distribution channel and kit an uplink installs
#[derive(Debug, Clone, Default, Serialize)]
pub struct UplinkSetupParams {
    pub channel_slug: String,
    pub kit_slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkAttributes {
    pub id: u64,
    #[serde(default)]
    pub channel_slug: String,
    #[serde(default)]
    pub kit_slug: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub cluster_id: u64,
    #[serde(default)]
    pub installation_id: Option<u64>,
    #[serde(default)]
    pub nodes: Vec<String>,
}

impl Client {
    pub async fn create_uplink(
        &self,
        cluster_id: &str,
        params: &UplinkSetupParams,
    ) -> Result<Response<UplinkAttributes>> {
        self.post(&["clusters", cluster_id, "uplinks"], &wrap("uplink", params)).await
    }

    pub async fn get_uplink(&self, id: &str) -> Result<Response<UplinkAttributes>> {
        self.get(&["uplinks", id]).await
    }

    pub async fn update_uplink(
        &self,
        id: &str,
        params: &UplinkSetupParams,
    ) -> Result<Response<UplinkAttributes>> {
        self.patch(&["uplinks", id], &wrap("uplink", params)).await
    }

    pub async fn delete_uplink(&self, id: &str) -> Result<()> {
        self.delete(&["uplinks", id]).await
    }
}
