//! The `instellar` provider

use crate::config::ProviderConfig;
use crate::data_sources::DataSourceKind;
use crate::error::{ProviderError, Result};
use crate::resource::{DataSourceHandle, ResourceHandle};
use crate::resources::ResourceKind;
use crate::schema::{Attribute, AttributeType, Schema};
use instellar_client::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const PROVIDER_TYPE_NAME: &str = "instellar";

/// Every schema the provider publishes
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchemas {
    pub provider: Schema,
    pub resource_schemas: BTreeMap<&'static str, Schema>,
    pub data_source_schemas: BTreeMap<&'static str, Schema>,
}

#[derive(Debug, Clone, Copy)]
pub struct InstellarProvider {
    version: &'static str,
}

impl Default for InstellarProvider {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl InstellarProvider {
    pub fn new(version: &'static str) -> Self {
        Self { version }
    }

    pub fn type_name(&self) -> &'static str {
        PROVIDER_TYPE_NAME
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn schema() -> Schema {
        Schema::new("Interact with an Instellar installation")
            .attribute(
                "host",
                Attribute::optional(
                    AttributeType::String,
                    "URI for Instellar API. May also be provided via INSTELLAR_HOST environment variable.",
                ),
            )
            .attribute(
                "auth_token",
                Attribute::optional(
                    AttributeType::String,
                    "Auth token for Instellar API. May also be provided via INSTELLAR_AUTH_TOKEN environment variable.",
                )
                .sensitive(),
            )
    }

    pub fn schemas() -> ProviderSchemas {
        ProviderSchemas {
            provider: Self::schema(),
            resource_schemas: ResourceKind::ALL
                .iter()
                .map(|kind| (kind.type_name(), kind.schema()))
                .collect(),
            data_source_schemas: DataSourceKind::ALL
                .iter()
                .map(|kind| (kind.type_name(), kind.schema()))
                .collect(),
        }
    }

    /// Build the shared client and every resource and data source around it
    pub fn configure(&self, config: &ProviderConfig) -> Result<ConfiguredProvider> {
        tracing::info!("Configuring Instellar client");

        let resolved = config.resolve()?;

        tracing::debug!(instellar_host = %resolved.host, "Creating Instellar client");

        let client = Client::new(&resolved.host, resolved.auth_token)
            .map_err(ProviderError::ClientSetup)?;

        let provider = ConfiguredProvider::new(Arc::new(client));

        tracing::info!(success = true, "Configured Instellar client");
        Ok(provider)
    }

    /// Validate a raw configuration document, then configure
    pub fn configure_value(&self, mut config: Value) -> Result<ConfiguredProvider> {
        let schema = Self::schema();
        schema.coerce(&mut config);

        let diags = schema.validate_config(&config);
        if diags.has_error() {
            return Err(ProviderError::Validation(diags));
        }

        let config: ProviderConfig = serde_json::from_value(config)?;
        self.configure(&config)
    }
}

/// Provider after configuration, holding the shared API client
pub struct ConfiguredProvider {
    client: Arc<Client>,
    resources: BTreeMap<&'static str, Box<dyn ResourceHandle>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSourceHandle>>,
}

impl ConfiguredProvider {
    fn new(client: Arc<Client>) -> Self {
        let resources = ResourceKind::ALL
            .iter()
            .map(|kind| (kind.type_name(), kind.build(Arc::clone(&client))))
            .collect();

        let data_sources = DataSourceKind::ALL
            .iter()
            .map(|kind| (kind.type_name(), kind.build(Arc::clone(&client))))
            .collect();

        Self {
            client,
            resources,
            data_sources,
        }
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn ResourceHandle> {
        self.resources
            .get(type_name)
            .map(|handle| handle.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSourceHandle> {
        self.data_sources
            .get(type_name)
            .map(|handle| handle.as_ref())
            .ok_or_else(|| ProviderError::UnknownDataSource(type_name.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }
}
