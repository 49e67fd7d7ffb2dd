//! Acceptance test harness
//!
//! Drives resources through the same lifecycle a plan/apply run would:
//! every [`TestStep::apply`] creates resources that have no state yet,
//! updates them in place or replaces them when a create-only attribute
//! changed, then checks the resulting state. Once all steps ran, every
//! resource is destroyed and a read is expected to fail.
//!
//! State is inspected in flat-map form: nested attributes are joined with
//! dots (`credential.host`) and lists expose their length as `name.#` and
//! their elements as `name.0`, `name.1`, ...
//!
//! ```ignore
//! let provider = provider_factory(&server.uri())?;
//! TestCase::new(vec![TestStep::apply(
//!     vec![("instellar_cluster.test", json!({ "name": "acme-1", ... }))],
//!     vec![Check::attr("instellar_cluster.test", "current_state", "connecting")],
//! )])
//! .run(&provider)
//! .await?;
//! ```

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::{ConfiguredProvider, InstellarProvider};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Token every acceptance provider authenticates with
pub const ACCEPTANCE_TOKEN: &str = "acceptance";

#[derive(Error, Debug)]
pub enum AcceptanceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid resource address: {0}")]
    InvalidAddress(String),

    #[error("No state for {0}")]
    UnknownAddress(String),

    #[error("{address}: attribute {attribute} expected {expected}, got {}", display_actual(.actual))]
    CheckFailed {
        address: String,
        attribute: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("{address}: imported {attribute} is {}, expected {expected}", display_actual(.actual))]
    ImportMismatch {
        address: String,
        attribute: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("{0} still exists after destroy")]
    DestroyNotVerified(String),

    #[error("{} resources failed to destroy: {}", .0.len(), display_errors(.0))]
    DestroyFailed(Vec<AcceptanceError>),
}

fn display_errors(errors: &[AcceptanceError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn display_actual(actual: &Option<String>) -> String {
    match actual {
        Some(value) => format!("\"{}\"", value),
        None => "no value".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, AcceptanceError>;

/// Configure a provider against `host`
pub fn provider_factory(host: &str) -> Result<ConfiguredProvider> {
    let config = ProviderConfig::new(Some(host.to_string()), Some(ACCEPTANCE_TOKEN.to_string()));
    Ok(InstellarProvider::default().configure(&config)?)
}

/// Assertion on the flat-map state of one resource
#[derive(Debug, Clone)]
pub enum Check {
    Attr {
        address: String,
        attribute: String,
        value: String,
    },
    AttrSet {
        address: String,
        attribute: String,
    },
    AttrOneOf {
        address: String,
        attribute: String,
        values: Vec<String>,
    },
}

impl Check {
    pub fn attr(address: &str, attribute: &str, value: impl Into<String>) -> Self {
        Check::Attr {
            address: address.to_string(),
            attribute: attribute.to_string(),
            value: value.into(),
        }
    }

    /// Attribute is present and not empty
    pub fn attr_set(address: &str, attribute: &str) -> Self {
        Check::AttrSet {
            address: address.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub fn attr_one_of(address: &str, attribute: &str, values: &[&str]) -> Self {
        Check::AttrOneOf {
            address: address.to_string(),
            attribute: attribute.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn verify(&self, applied: &Applied) -> Result<()> {
        let (address, attribute) = match self {
            Check::Attr {
                address, attribute, ..
            }
            | Check::AttrSet { address, attribute }
            | Check::AttrOneOf {
                address, attribute, ..
            } => (address, attribute),
        };

        let flat = flatten(applied.state(address)?);
        let actual = flat.get(attribute.as_str()).cloned();

        let (ok, expected) = match self {
            Check::Attr { value, .. } => (actual.as_ref() == Some(value), format!("\"{}\"", value)),
            Check::AttrSet { .. } => (
                actual.as_ref().is_some_and(|v| !v.is_empty()),
                "a value".to_string(),
            ),
            Check::AttrOneOf { values, .. } => (
                actual.as_ref().is_some_and(|v| values.contains(v)),
                format!("one of {}", values.join(", ")),
            ),
        };

        if ok {
            Ok(())
        } else {
            Err(AcceptanceError::CheckFailed {
                address: address.clone(),
                attribute: attribute.clone(),
                expected,
                actual,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub enum TestStep {
    /// Bring the named resources to the given configurations
    Apply {
        resources: Vec<(String, Value)>,
        checks: Vec<Check>,
    },
    /// Import a resource by id and compare with its current state
    ImportVerify {
        address: String,
        ignore: Vec<String>,
    },
}

impl TestStep {
    pub fn apply<'a>(
        resources: impl IntoIterator<Item = (&'a str, Value)>,
        checks: Vec<Check>,
    ) -> Self {
        TestStep::Apply {
            resources: resources
                .into_iter()
                .map(|(address, config)| (address.to_string(), config))
                .collect(),
            checks,
        }
    }

    /// `ignore` lists attributes, or attribute prefixes such as
    /// `credential`, left out of the comparison
    pub fn import_verify(address: &str, ignore: &[&str]) -> Self {
        TestStep::ImportVerify {
            address: address.to_string(),
            ignore: ignore.iter().map(|i| i.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestCase {
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn new(steps: Vec<TestStep>) -> Self {
        Self { steps }
    }

    /// Run every step, then destroy whatever was created
    pub async fn run(&self, provider: &ConfiguredProvider) -> Result<()> {
        let mut applied = Applied::default();

        let outcome = self.run_steps(provider, &mut applied).await;
        let destroyed = destroy(provider, &applied).await;

        outcome?;
        destroyed
    }

    async fn run_steps(&self, provider: &ConfiguredProvider, applied: &mut Applied) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            tracing::info!("Running step {}", index + 1);
            match step {
                TestStep::Apply { resources, checks } => {
                    for (address, config) in resources {
                        apply(provider, applied, address, config).await?;
                    }
                    for check in checks {
                        check.verify(applied)?;
                    }
                }
                TestStep::ImportVerify { address, ignore } => {
                    import_verify(provider, applied, address, ignore).await?;
                }
            }
        }
        Ok(())
    }
}

/// States of the resources created so far, in creation order
#[derive(Debug, Default)]
struct Applied {
    order: Vec<String>,
    states: BTreeMap<String, Value>,
}

impl Applied {
    fn state(&self, address: &str) -> Result<&Value> {
        self.states
            .get(address)
            .ok_or_else(|| AcceptanceError::UnknownAddress(address.to_string()))
    }

    fn record(&mut self, address: &str, state: Value) {
        if !self.states.contains_key(address) {
            self.order.push(address.to_string());
        }
        self.states.insert(address.to_string(), state);
    }

    fn forget(&mut self, address: &str) {
        self.states.remove(address);
        self.order.retain(|a| a != address);
    }

    /// Resolve `${<address>.<attribute>}` references against known state
    fn interpolate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => {
                if let Some(reference) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
                    *value = self.lookup(reference)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.interpolate(item)?;
                }
            }
            Value::Object(fields) => {
                for field in fields.values_mut() {
                    self.interpolate(field)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lookup(&self, reference: &str) -> Result<Value> {
        for (address, state) in &self.states {
            let Some(attribute) = reference
                .strip_prefix(address.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
            else {
                continue;
            };

            let mut current = state;
            for segment in attribute.split('.') {
                current = match current {
                    Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                    other => other.get(segment),
                }
                .ok_or_else(|| AcceptanceError::UnknownAddress(reference.to_string()))?;
            }
            return Ok(current.clone());
        }
        Err(AcceptanceError::UnknownAddress(reference.to_string()))
    }
}

fn resource_type(address: &str) -> Result<&str> {
    match address.split_once('.') {
        Some((resource_type, name)) if !resource_type.is_empty() && !name.is_empty() => {
            Ok(resource_type)
        }
        _ => Err(AcceptanceError::InvalidAddress(address.to_string())),
    }
}

async fn apply(
    provider: &ConfiguredProvider,
    applied: &mut Applied,
    address: &str,
    config: &Value,
) -> Result<()> {
    let handle = provider.resource(resource_type(address)?)?;

    let schema = handle.schema();
    let mut config = config.clone();
    applied.interpolate(&mut config)?;
    schema.coerce(&mut config);

    let Some(prior) = applied.states.get(address).cloned() else {
        tracing::info!("Creating {}", address);
        let state = handle.create(config).await?;
        applied.record(address, state);
        return Ok(());
    };

    let replaced = schema.replaced_attributes(&prior, &config);
    let state = if !replaced.is_empty() {
        tracing::info!("Replacing {} ({})", address, replaced.join(", "));
        handle.delete(prior).await?;
        applied.forget(address);
        handle.create(config).await?
    } else if differs(&config, &prior) {
        tracing::info!("Updating {}", address);
        handle.update(prior, config).await?
    } else {
        tracing::debug!("Refreshing {}", address);
        handle.read(prior).await?
    };

    applied.record(address, state);
    Ok(())
}

/// Whether any configured value differs from the stored one
fn differs(config: &Value, stored: &Value) -> bool {
    match (config, stored) {
        (Value::Object(configured), Value::Object(stored)) => {
            configured.iter().any(|(key, value)| match stored.get(key) {
                Some(current) => differs(value, current),
                None => !value.is_null(),
            })
        }
        (Value::Null, _) => false,
        (configured, stored) => configured != stored,
    }
}

async fn import_verify(
    provider: &ConfiguredProvider,
    applied: &Applied,
    address: &str,
    ignore: &[String],
) -> Result<()> {
    let handle = provider.resource(resource_type(address)?)?;
    let state = applied.state(address)?;

    let id = state
        .get("id")
        .and_then(Value::as_str)
        .ok_or(ProviderError::MissingId("resource"))?;

    tracing::info!("Importing {} as {}", id, address);
    let imported = flatten(&handle.import_state(id).await?);

    let is_ignored = |attribute: &str| {
        ignore.iter().any(|prefix| {
            attribute == prefix
                || attribute
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    };

    for (attribute, expected) in flatten(state) {
        if is_ignored(&attribute) {
            continue;
        }
        let actual = imported.get(&attribute);
        if actual != Some(&expected) {
            return Err(AcceptanceError::ImportMismatch {
                address: address.to_string(),
                attribute,
                expected,
                actual: actual.cloned(),
            });
        }
    }
    Ok(())
}

/// Delete every recorded resource, newest first, carrying on past failures
async fn destroy(provider: &ConfiguredProvider, applied: &Applied) -> Result<()> {
    let mut errors = Vec::new();

    for address in applied.order.iter().rev() {
        if let Err(err) = destroy_one(provider, applied, address).await {
            tracing::error!("Failed to destroy {}: {}", address, err);
            errors.push(err);
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(AcceptanceError::DestroyFailed(errors)),
    }
}

async fn destroy_one(
    provider: &ConfiguredProvider,
    applied: &Applied,
    address: &str,
) -> Result<()> {
    let handle = provider.resource(resource_type(address)?)?;
    let state = applied.state(address)?;

    tracing::info!("Destroying {}", address);
    handle.delete(state.clone()).await?;

    if handle.read(state.clone()).await.is_ok() {
        return Err(AcceptanceError::DestroyNotVerified(address.to_string()));
    }
    Ok(())
}

/// Flatten a state document into dotted attribute paths
pub fn flatten(state: &Value) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    if let Value::Object(fields) = state {
        for (key, value) in fields {
            flatten_into(key, value, &mut flat);
        }
    }
    flat
}

fn flatten_into(path: &str, value: &Value, flat: &mut BTreeMap<String, String>) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            flat.insert(path.to_string(), s.clone());
        }
        Value::Bool(_) | Value::Number(_) => {
            flat.insert(path.to_string(), value.to_string());
        }
        Value::Array(items) => {
            flat.insert(format!("{}.#", path), items.len().to_string());
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", path, index), item, flat);
            }
        }
        Value::Object(fields) => {
            for (key, nested) in fields {
                flatten_into(&format!("{}.{}", path, key), nested, flat);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cluster_state() -> Value {
        json!({
            "id": "7",
            "name": "acme-1",
            "slug": "acme-1",
            "current_state": "connecting",
            "provider_name": "aws",
            "region": "ap-southeast-1",
            "endpoint": "127.0.0.1:8443",
            "password_token": "some-password",
            "last_updated": "Monday, 02-Jan-06 15:04:05 UTC"
        })
    }

    #[tokio::test]
    async fn test_destroy_continues_after_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/provider/automation/nodes/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("node busy"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/provider/automation/clusters/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_factory(&server.uri()).unwrap();
        let mut applied = Applied::default();
        applied.record("instellar_cluster.test", cluster_state());
        applied.record(
            "instellar_node.test",
            json!({ "id": "3", "slug": "node-01", "cluster_id": "7", "public_ip": "127.0.0.1" }),
        );

        let err = destroy(&provider, &applied).await.unwrap_err();
        assert!(err.to_string().contains("node busy"), "{err}");
    }

    #[tokio::test]
    async fn test_failed_replacement_forgets_deleted_state() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/provider/automation/clusters/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/provider/automation/clusters"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_factory(&server.uri()).unwrap();
        let mut applied = Applied::default();
        applied.record("instellar_cluster.test", cluster_state());

        let config = json!({
            "name": "acme-1",
            "provider_name": "aws",
            "region": "us-east-1",
            "endpoint": "127.0.0.1:8443",
            "password_token": "some-password"
        });
        let result = apply(&provider, &mut applied, "instellar_cluster.test", &config).await;

        assert!(matches!(result, Err(AcceptanceError::Provider(ProviderError::Remote { .. }))));
        assert!(applied.states.is_empty());
        assert!(applied.order.is_empty());
    }

    #[test]
    fn test_flatten_lists_and_blocks() {
        let flat = flatten(&json!({
            "id": "1",
            "channels": ["develop", "master"],
            "cluster_ids": [7],
            "credential": { "host": "localhost", "port": 5432, "secure": false },
            "insterra_component_id": null
        }));

        assert_eq!(flat["channels.#"], "2");
        assert_eq!(flat["channels.1"], "master");
        assert_eq!(flat["cluster_ids.0"], "7");
        assert_eq!(flat["credential.port"], "5432");
        assert_eq!(flat["credential.secure"], "false");
        assert!(!flat.contains_key("insterra_component_id"));
    }

    #[test]
    fn test_interpolate_references() {
        let mut applied = Applied::default();
        applied.record("instellar_cluster.test", json!({ "id": "7", "slug": "acme-1" }));

        let mut config = json!({
            "cluster_id": "${instellar_cluster.test.id}",
            "cluster_ids": ["${instellar_cluster.test.id}"],
            "slug": "node-01"
        });
        applied.interpolate(&mut config).unwrap();
        assert_eq!(config["cluster_id"], "7");
        assert_eq!(config["cluster_ids"], json!(["7"]));

        let mut missing = json!({ "cluster_id": "${instellar_cluster.other.id}" });
        assert!(matches!(
            applied.interpolate(&mut missing),
            Err(AcceptanceError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_differs_ignores_unconfigured_attributes() {
        let stored = json!({
            "id": "1",
            "public_ip": "127.0.0.1",
            "credential": { "host": "localhost", "secure": false }
        });
        assert!(!differs(&json!({ "public_ip": "127.0.0.1" }), &stored));
        assert!(!differs(&json!({ "credential": { "host": "localhost" } }), &stored));
        assert!(differs(&json!({ "public_ip": "127.0.0.2" }), &stored));
    }

    #[test]
    fn test_checks() {
        let mut applied = Applied::default();
        applied.record(
            "instellar_node.test",
            json!({ "id": "3", "current_state": "created", "last_updated": "" }),
        );

        assert!(Check::attr("instellar_node.test", "current_state", "created").verify(&applied).is_ok());
        assert!(Check::attr_set("instellar_node.test", "id").verify(&applied).is_ok());
        assert!(matches!(
            Check::attr_set("instellar_node.test", "last_updated").verify(&applied),
            Err(AcceptanceError::CheckFailed { .. })
        ));
        assert!(
            Check::attr_one_of("instellar_node.test", "current_state", &["created", "syncing"])
                .verify(&applied)
                .is_ok()
        );
        assert!(matches!(
            Check::attr("instellar_node.other", "id", "3").verify(&applied),
            Err(AcceptanceError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_resource_type_from_address() {
        assert_eq!(resource_type("instellar_cluster.test").unwrap(), "instellar_cluster");
        assert!(resource_type("instellar_cluster").is_err());
    }
}
