use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct BalancerParams {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancerAttributes {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub cluster_id: u64,
}

impl Client {
    pub async fn create_balancer(
        &self,
        cluster_id: &str,
        params: &BalancerParams,
    ) -> Result<Response<BalancerAttributes>> {
        self.post(&["clusters", cluster_id, "balancers"], &wrap("balancer", params)).await
    }

    pub async fn get_balancer(&self, id: &str) -> Result<Response<BalancerAttributes>> {
        self.get(&["balancers", id]).await
    }

    pub async fn update_balancer(
        &self,
        id: &str,
        params: &BalancerParams,
    ) -> Result<Response<BalancerAttributes>> {
        self.patch(&["balancers", id], &wrap("balancer", params)).await
    }

    pub async fn delete_balancer(&self, id: &str) -> Result<()> {
        self.delete(&["balancers", id]).await
    }
}
