//! `instellar_uplink` data source
//!
//! Exposes the nodes an uplink is running on, e.g. to feed a DNS record.

use crate::error::{Operation, ProviderError, Result};
use crate::resource::{DataSource, require_id};
use crate::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use instellar_client::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UplinkDataModel {
    pub id: Option<String>,
    pub nodes: Vec<String>,
}

pub struct UplinkDataSource {
    client: Arc<Client>,
}

impl UplinkDataSource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for UplinkDataSource {
    type Model = UplinkDataModel;

    fn schema() -> Schema {
        Schema::new("Nodes of an instellar uplink")
            .attribute(
                "id",
                Attribute::required(AttributeType::String, "Identifier of the uplink"),
            )
            .attribute(
                "nodes",
                Attribute::computed(
                    AttributeType::list_of(AttributeType::String),
                    "Nodes the uplink is running on",
                ),
            )
    }

    async fn read(&self, mut config: UplinkDataModel) -> Result<UplinkDataModel> {
        let id = require_id("uplink", &config.id)?;
        let uplink = self
            .client
            .get_uplink(id)
            .await
            .map_err(|e| ProviderError::remote("uplink", Operation::Read, Some(id), e))?
            .into_attributes();

        tracing::debug!("Uplink {} has {} nodes", id, uplink.nodes.len());
        config.nodes = uplink.nodes;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::DataSourceKind;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_read_projects_nodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/provider/automation/uplinks/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "attributes": {
                        "id": 4,
                        "channel_slug": "develop",
                        "kit_slug": "lite",
                        "current_state": "active",
                        "cluster_id": 7,
                        "nodes": ["some-node-01", "some-node-02"]
                    }
                }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = Arc::new(Client::new(&server.uri(), "test-token").unwrap());
        let handle = DataSourceKind::Uplink.build(client);

        // every read goes back to Instellar
        for _ in 0..2 {
            let state = handle.read(json!({ "id": "4" })).await.unwrap();
            assert_eq!(state["nodes"], json!(["some-node-01", "some-node-02"]));
        }
    }

    #[tokio::test]
    async fn test_id_is_required() {
        let server = MockServer::start().await;
        let client = Arc::new(Client::new(&server.uri(), "test-token").unwrap());
        let handle = DataSourceKind::Uplink.build(client);

        let err = handle.read(json!({})).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_id_never_reaches_instellar() {
        let server = MockServer::start().await;
        Mock::given(path_regex("^/provider/automation/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Arc::new(Client::new(&server.uri(), "test-token").unwrap());
        let handle = DataSourceKind::Uplink.build(client);

        let err = handle.read(json!({ "id": "" })).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingId("uplink")));
    }
}
