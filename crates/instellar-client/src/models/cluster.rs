use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use crate::sensitive::Sensitive;
use serde::{Deserialize, Serialize};

/// Parameters for creating or updating a cluster
///
/// Unset fields are left out of the request body, so an update only carries
/// what the caller filled in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_password: Option<Sensitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_password_confirmation: Option<Sensitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insterra_component_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterAttributes {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub current_state: String,
}

impl Client {
    pub async fn create_cluster(
        &self,
        params: &ClusterParams,
    ) -> Result<Response<ClusterAttributes>> {
        self.post(&["clusters"], &wrap("cluster", params)).await
    }

    pub async fn get_cluster(&self, id: &str) -> Result<Response<ClusterAttributes>> {
        self.get(&["clusters", id]).await
    }

    pub async fn update_cluster(
        &self,
        id: &str,
        params: &ClusterParams,
    ) -> Result<Response<ClusterAttributes>> {
        self.patch(&["clusters", id], &wrap("cluster", params)).await
    }

    pub async fn delete_cluster(&self, id: &str) -> Result<()> {
        self.delete(&["clusters", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cluster_body(endpoint: &str) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "attributes": {
                    "id": 42,
                    "name": "acme-1",
                    "slug": "acme-1",
                    "provider": "aws",
                    "region": "ap-southeast-1",
                    "endpoint": endpoint,
                    "current_state": "connecting"
                }
            }
        })
    }

    #[tokio::test]
    async fn test_create_cluster_wraps_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/provider/automation/clusters"))
            .and(body_json(serde_json::json!({
                "cluster": {
                    "name": "acme-1",
                    "provider": "aws",
                    "region": "ap-southeast-1",
                    "credential_endpoint": "127.0.0.1:8443",
                    "credential_password": "pw",
                    "credential_password_confirmation": "pw"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(cluster_body("127.0.0.1:8443")))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token").unwrap();
        let params = ClusterParams {
            name: Some("acme-1".to_string()),
            provider: Some("aws".to_string()),
            region: Some("ap-southeast-1".to_string()),
            credential_endpoint: Some("127.0.0.1:8443".to_string()),
            credential_password: Some("pw".into()),
            credential_password_confirmation: Some("pw".into()),
            insterra_component_id: None,
        };

        let cluster = client.create_cluster(&params).await.unwrap().into_attributes();
        assert_eq!(cluster.id, 42);
        assert_eq!(cluster.current_state, "connecting");
    }

    #[tokio::test]
    async fn test_update_cluster_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/provider/automation/clusters/42"))
            .and(body_json(serde_json::json!({
                "cluster": { "credential_endpoint": "10.0.0.1:8443" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(cluster_body("10.0.0.1:8443")))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token").unwrap();
        let params = ClusterParams {
            credential_endpoint: Some("10.0.0.1:8443".to_string()),
            ..Default::default()
        };

        let cluster = client.update_cluster("42", &params).await.unwrap().into_attributes();
        assert_eq!(cluster.endpoint, "10.0.0.1:8443");
    }
}
