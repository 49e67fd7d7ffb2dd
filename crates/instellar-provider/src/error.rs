//! Provider error types

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::config::AUTH_TOKEN_ENV;
use instellar_client::ClientError;
use std::fmt;
use thiserror::Error;

/// Lifecycle operation that reached the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "creating"),
            Operation::Read => write!(f, "reading"),
            Operation::Update => write!(f, "updating"),
            Operation::Delete => write!(f, "deleting"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing Instellar API Auth Token")]
    MissingAuthToken,

    #[error("Unable to create Instellar API Client: {0}")]
    ClientSetup(#[source] ClientError),

    #[error("Invalid configuration: {0}")]
    Validation(Diagnostics),

    #[error("Error {operation} instellar {entity}: {source}")]
    Remote {
        entity: &'static str,
        operation: Operation,
        id: Option<String>,
        #[source]
        source: ClientError,
    },

    #[error("Missing identifier for instellar {0}")]
    MissingId(&'static str),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    #[error("State error: {0}")]
    State(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn remote(
        entity: &'static str,
        operation: Operation,
        id: Option<&str>,
        source: ClientError,
    ) -> Self {
        ProviderError::Remote {
            entity,
            operation,
            id: id.map(str::to_string),
            source,
        }
    }

    /// Render this error the way it is reported to the user
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            ProviderError::MissingAuthToken => Diagnostic::attribute_error(
                "auth_token",
                "Missing Instellar API Auth Token",
                format!(
                    "The provider cannot create the Instellar API client as there is a missing or empty \
                     value for the Instellar API auth token. Set the auth_token value in the configuration \
                     or use the {} environment variable. If either is already set, ensure the value is not empty.",
                    AUTH_TOKEN_ENV
                ),
            )
            .into(),
            ProviderError::ClientSetup(e) => Diagnostic::error(
                "Unable to create Instellar API Client",
                format!(
                    "An unexpected error occurred when creating the Instellar API client. \
                     If the error is not clear, please contact the provider developers.\n\n\
                     Instellar Client Error: {}",
                    e
                ),
            )
            .into(),
            ProviderError::Validation(diags) => diags.clone(),
            ProviderError::Remote {
                entity,
                operation,
                id,
                source,
            } => {
                let detail = match (operation, id) {
                    (Operation::Read, Some(id)) => {
                        format!("Could not read {} id {}: {}", entity, id, source)
                    }
                    _ => format!(
                        "Could not {} {}, unexpected error: {}",
                        operation.verb(),
                        entity,
                        source
                    ),
                };
                Diagnostic::error(format!("Error {} instellar {}", operation, entity), detail).into()
            }
            ProviderError::MissingId(entity) => Diagnostic::attribute_error(
                "id",
                format!("Missing instellar {} identifier", entity),
                "The state does not carry the identifier assigned by Instellar. Import the resource by id \
                 or create it first.",
            )
            .into(),
            ProviderError::UnknownResource(name) => Diagnostic::error(
                "Unknown resource type",
                format!("The instellar provider does not support resource type \"{}\".", name),
            )
            .into(),
            ProviderError::UnknownDataSource(name) => Diagnostic::error(
                "Unknown data source type",
                format!("The instellar provider does not support data source \"{}\".", name),
            )
            .into(),
            ProviderError::State(e) => {
                Diagnostic::error("Unable to decode state", e.to_string()).into()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
