//! HTTP transport shared by all entity calls

use crate::error::{ClientError, Result};
use crate::sensitive::Sensitive;
use reqwest::{RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default Instellar installation
pub const DEFAULT_HOST: &str = "https://web.instellar.app";

const API_PREFIX: [&str; 2] = ["provider", "automation"];

/// Instellar automation API client
///
/// Cheap to share: wrap it in an `Arc` and hand it to every caller. The
/// client is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Sensitive,
}

impl Client {
    /// Create a client for `host` authenticating with `auth_token`
    pub fn new(host: &str, auth_token: impl Into<Sensitive>) -> Result<Self> {
        let mut base_url = Url::parse(host).map_err(|e| ClientError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidHost {
                host: host.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("instellar-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth_token: auth_token.into(),
        })
    }

    /// Base URL of the installation
    pub fn host(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `<host>/provider/automation/<segments..>`, each segment
    /// percent-encoded so an identifier can never change the route
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(segment) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ClientError::InvalidPathSegment(segment.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidHost {
                host: self.base_url.to_string(),
                reason: "expected an http(s) URL".to_string(),
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    pub(crate) async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!("POST {}", url);
        self.send(self.http.post(url).json(body)).await
    }

    pub(crate) async fn patch<B, T>(&self, path: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!("PATCH {}", url);
        self.send(self.http.patch(url).json(body)).await
    }

    pub(crate) async fn delete(&self, path: &[&str]) -> Result<()> {
        let url = self.url(path)?;
        tracing::debug!("DELETE {}", url);
        let response = self
            .http
            .delete(url)
            .bearer_auth(self.auth_token.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(self.auth_token.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Request failed with status {}", status);
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterAttributes, Response};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_new_appends_trailing_slash() {
        let client = Client::new("http://localhost:4000", "token").unwrap();
        assert_eq!(client.host(), "http://localhost:4000/");

        let url = client.url(&["clusters", "1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:4000/provider/automation/clusters/1"
        );
    }

    #[test]
    fn test_new_keeps_host_path() {
        let client = Client::new("https://example.com/instellar", "token").unwrap();
        let url = client.url(&["nodes", "7"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/instellar/provider/automation/nodes/7"
        );
    }

    #[test]
    fn test_new_rejects_invalid_host() {
        assert!(matches!(
            Client::new("not a url", "token"),
            Err(ClientError::InvalidHost { .. })
        ));
        assert!(matches!(
            Client::new("ftp://example.com", "token"),
            Err(ClientError::InvalidHost { .. })
        ));
    }

    #[test]
    fn test_identifier_cannot_escape_its_collection() {
        let client = Client::new("http://localhost:4000", "token").unwrap();

        let url = client.url(&["clusters", "7/../../components/3"]).unwrap();
        assert_eq!(
            url.path(),
            "/provider/automation/clusters/7%2F..%2F..%2Fcomponents%2F3"
        );

        let url = client.url(&["clusters", "7?admin=true"]).unwrap();
        assert_eq!(url.path(), "/provider/automation/clusters/7%3Fadmin=true");
        assert_eq!(url.query(), None);

        for id in ["", ".", ".."] {
            assert!(matches!(
                client.url(&["clusters", id]),
                Err(ClientError::InvalidPathSegment(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_get_with_traversing_id_stays_in_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/provider/automation/components/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "attributes": { "id": 3, "slug": "pg-01" } }
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token").unwrap();
        let err = client
            .get::<Response<ClusterAttributes>>(&["clusters", "7/../../components/3"])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = Client::new(DEFAULT_HOST, "super-secret").unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/provider/automation/clusters/1"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "attributes": {
                        "id": 1,
                        "name": "acme-1",
                        "slug": "acme-1",
                        "provider": "aws",
                        "region": "ap-southeast-1",
                        "current_state": "connecting"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token-123").unwrap();
        let response: Response<ClusterAttributes> = client.get(&["clusters", "1"]).await.unwrap();

        assert_eq!(response.data.attributes.id, 1);
        assert_eq!(response.data.attributes.slug, "acme-1");
    }

    #[tokio::test]
    async fn test_error_status_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/provider/automation/clusters/404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "not_found"})),
            )
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token").unwrap();
        let err = client
            .get::<Response<ClusterAttributes>>(&["clusters", "404"])
            .await
            .unwrap_err();

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not_found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/provider/automation/clusters/9"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "token").unwrap();
        let err = client.delete(&["clusters", "9"]).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("database unavailable"));
    }
}
