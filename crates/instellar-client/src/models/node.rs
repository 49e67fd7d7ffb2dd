use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeParams {
    pub public_ip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub cluster_id: u64,
    #[serde(default)]
    pub public_ip: String,
    #[serde(default)]
    pub current_state: String,
}

#[derive(Serialize)]
struct NewNode<'a> {
    slug: &'a str,
    public_ip: &'a str,
}

impl Client {
    /// Register a node under a cluster. Nodes are addressed by slug within
    /// their cluster for writes and by id for reads and deletes.
    pub async fn create_node(
        &self,
        cluster_id: &str,
        slug: &str,
        params: &NodeParams,
    ) -> Result<Response<NodeAttributes>> {
        let body = NewNode {
            slug,
            public_ip: &params.public_ip,
        };
        self.post(&["clusters", cluster_id, "nodes"], &wrap("node", &body))
            .await
    }

    pub async fn get_node(&self, id: &str) -> Result<Response<NodeAttributes>> {
        self.get(&["nodes", id]).await
    }

    pub async fn update_node(
        &self,
        cluster_id: &str,
        slug: &str,
        params: &NodeParams,
    ) -> Result<Response<NodeAttributes>> {
        self.patch(&["clusters", cluster_id, "nodes", slug], &wrap("node", params)).await
    }

    pub async fn delete_node(&self, id: &str) -> Result<()> {
        self.delete(&["nodes", id]).await
    }
}
