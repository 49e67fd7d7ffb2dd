use crate::client::Client;
use crate::error::Result;
use crate::models::{Response, wrap};
use crate::sensitive::Sensitive;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComponentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insterra_component_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<ComponentCredentialParams>,
}

/// Connection details the platform hands to applications using the component
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComponentCredentialParams {
    pub username: String,
    pub password: Sensitive,
    pub resource: String,
    pub host: String,
    pub port: u16,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Sensitive>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAttributes {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cluster_ids: Vec<u64>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub credential: Option<ComponentCredentialAttributes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCredentialAttributes {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<Sensitive>,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub certificate: Option<Sensitive>,
}

impl Client {
    pub async fn create_component(
        &self,
        params: &ComponentParams,
    ) -> Result<Response<ComponentAttributes>> {
        self.post(&["components"], &wrap("component", params)).await
    }

    pub async fn get_component(&self, id: &str) -> Result<Response<ComponentAttributes>> {
        self.get(&["components", id]).await
    }

    pub async fn update_component(
        &self,
        id: &str,
        params: &ComponentParams,
    ) -> Result<Response<ComponentAttributes>> {
        self.patch(&["components", id], &wrap("component", params)).await
    }

    pub async fn delete_component(&self, id: &str) -> Result<()> {
        self.delete(&["components", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = ComponentCredentialParams {
            username: "postgres".to_string(),
            password: "correct-horse".into(),
            resource: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            secure: false,
            certificate: None,
        };

        let rendered = format!("{credential:?}");
        assert!(rendered.contains("postgres"));
        assert!(!rendered.contains("correct-horse"));
    }

    #[test]
    fn test_attributes_tolerate_missing_credential() {
        let attributes: ComponentAttributes = serde_json::from_value(serde_json::json!({
            "id": 5,
            "slug": "acme-db",
            "current_state": "active",
            "channels": ["develop"]
        }))
        .unwrap();

        assert!(attributes.credential.is_none());
        assert!(attributes.cluster_ids.is_empty());
        assert_eq!(attributes.channels, vec!["develop".to_string()]);
    }
}
