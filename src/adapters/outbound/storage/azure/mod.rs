//! Azure Blob Storage backend built on the object_store crate
//!
//! Clients are created per container so that files recorded under an
//! older container stay reachable after the configured one changes.

mod connection_string;
mod provider;

pub use connection_string::{ConnectionString, ConnectionStringError, DEVELOPMENT_BLOB_ENDPOINT};
pub use provider::{AzureBlobBackend, AzureContainerProvider};

/// How the Azure client authenticates
#[derive(Debug, Clone, PartialEq)]
pub enum AzureCredentials {
    /// Storage account name with an optional shared key
    Account {
        account: String,
        access_key: Option<String>,
    },

    /// A parsed storage connection string
    ConnectionString(ConnectionString),

    /// Nothing configured; object_store resolves credentials from the
    /// process environment when the first request is made
    Ambient,
}

/// Connection settings for the Azure backend
#[derive(Debug, Clone, PartialEq)]
pub struct AzureSettings {
    pub credentials: AzureCredentials,
    /// Replacement for the default blob service endpoint
    pub host: Option<String>,
}

impl AzureSettings {
    pub fn new(credentials: AzureCredentials) -> Self {
        Self {
            credentials,
            host: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}
