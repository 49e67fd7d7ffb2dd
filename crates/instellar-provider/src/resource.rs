//! Resource and data source abstraction
//!
//! Each entity implements the typed [`Resource`] trait over its own state
//! model. The provider stores them behind [`ResourceHandle`], which speaks
//! JSON state documents and validates configuration before delegating.

use crate::error::{ProviderError, Result};
use crate::schema::Schema;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Typed lifecycle of one Instellar entity
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// State model; every field defaults so that an import can seed it with
    /// the identifier alone.
    type Model: Serialize + DeserializeOwned + Default + Send + Sync;

    fn schema() -> Schema;

    /// Create the entity from a validated plan and return the new state
    async fn create(&self, plan: Self::Model) -> Result<Self::Model>;

    /// Refresh server owned attributes of an existing state
    async fn read(&self, state: Self::Model) -> Result<Self::Model>;

    /// Send the updatable attributes of `plan`, then refresh
    async fn update(&self, prior: Self::Model, plan: Self::Model) -> Result<Self::Model>;

    async fn delete(&self, state: Self::Model) -> Result<()>;
}

/// Read-only projection of an Instellar entity
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    type Model: Serialize + DeserializeOwned + Default + Send + Sync;

    fn schema() -> Schema;

    async fn read(&self, config: Self::Model) -> Result<Self::Model>;
}

/// Type erased resource operating on JSON documents
#[async_trait]
pub trait ResourceHandle: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, config: Value) -> Result<Value>;

    async fn read(&self, state: Value) -> Result<Value>;

    async fn update(&self, prior: Value, config: Value) -> Result<Value>;

    async fn delete(&self, state: Value) -> Result<()>;

    /// Seed state with the literal identifier and read the entity
    async fn import_state(&self, id: &str) -> Result<Value>;
}

/// Type erased data source operating on JSON documents
#[async_trait]
pub trait DataSourceHandle: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, config: Value) -> Result<Value>;
}

pub(crate) struct ResourceAdapter<R> {
    type_name: &'static str,
    resource: R,
}

impl<R: Resource> ResourceAdapter<R> {
    pub(crate) fn new(type_name: &'static str, resource: R) -> Self {
        Self {
            type_name,
            resource,
        }
    }
}

#[async_trait]
impl<R: Resource> ResourceHandle for ResourceAdapter<R> {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        R::schema()
    }

    async fn create(&self, config: Value) -> Result<Value> {
        let plan = decode_config::<R::Model>(&R::schema(), config)?;
        tracing::debug!("Creating {}", self.type_name);
        let state = self.resource.create(plan).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn read(&self, state: Value) -> Result<Value> {
        let state: R::Model = serde_json::from_value(state)?;
        let state = self.resource.read(state).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn update(&self, prior: Value, config: Value) -> Result<Value> {
        let plan = decode_config::<R::Model>(&R::schema(), config)?;
        let prior: R::Model = serde_json::from_value(prior)?;
        tracing::debug!("Updating {}", self.type_name);
        let state = self.resource.update(prior, plan).await?;
        Ok(serde_json::to_value(state)?)
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let state: R::Model = serde_json::from_value(state)?;
        tracing::debug!("Deleting {}", self.type_name);
        self.resource.delete(state).await
    }

    async fn import_state(&self, id: &str) -> Result<Value> {
        let mut seed = Map::new();
        seed.insert("id".to_string(), Value::String(id.to_string()));
        let state: R::Model = serde_json::from_value(Value::Object(seed))?;

        tracing::debug!("Importing {} {}", self.type_name, id);
        let state = self.resource.read(state).await?;
        Ok(serde_json::to_value(state)?)
    }
}

pub(crate) struct DataSourceAdapter<D> {
    type_name: &'static str,
    data_source: D,
}

impl<D: DataSource> DataSourceAdapter<D> {
    pub(crate) fn new(type_name: &'static str, data_source: D) -> Self {
        Self {
            type_name,
            data_source,
        }
    }
}

#[async_trait]
impl<D: DataSource> DataSourceHandle for DataSourceAdapter<D> {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn schema(&self) -> Schema {
        D::schema()
    }

    async fn read(&self, config: Value) -> Result<Value> {
        let config = decode_config::<D::Model>(&D::schema(), config)?;
        let state = self.data_source.read(config).await?;
        Ok(serde_json::to_value(state)?)
    }
}

fn decode_config<M: DeserializeOwned>(schema: &Schema, mut config: Value) -> Result<M> {
    schema.coerce(&mut config);

    let diags = schema.validate_config(&config);
    if diags.has_error() {
        return Err(ProviderError::Validation(diags));
    }

    Ok(serde_json::from_value(config)?)
}

/// Identifier of a state model, or an error when it was never assigned
pub(crate) fn require_id<'a>(entity: &'static str, id: &'a Option<String>) -> Result<&'a str> {
    id.as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(ProviderError::MissingId(entity))
}

/// Timestamp recorded as `last_updated`, RFC 850 style in UTC
pub(crate) fn timestamp() -> String {
    format_timestamp(Utc::now())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%A, %d-%b-%y %H:%M:%S %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("cluster", &Some("12".to_string())).unwrap(), "12");
        assert!(matches!(
            require_id("cluster", &None),
            Err(ProviderError::MissingId("cluster"))
        ));
        assert!(require_id("cluster", &Some(String::new())).is_err());
    }

    #[test]
    fn test_timestamp_is_rfc850() {
        let at = DateTime::parse_from_rfc3339("2006-01-02T15:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(at), "Monday, 02-Jan-06 15:04:05 UTC");

        assert!(timestamp().ends_with(" UTC"));
    }
}
