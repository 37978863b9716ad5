use serde::Deserialize;
use std::sync::Arc;

use crate::{
    adapters::outbound::storage::{
        AzureBlobBackend, AzureCredentials, AzureSettings, InMemoryBlobBackend,
        azure::{ConnectionString, ConnectionStringError},
    },
    domain::{
        errors::ValidationError,
        models::FileSchema,
        value_objects::ContainerName,
    },
    ports::storage::BlobBackend,
    services::{BlobStorageAdapter, UrlContainerPolicy},
};

/// Connection string read when no explicit credentials are configured
pub const ENV_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
/// Account name read when no explicit credentials are configured
pub const ENV_ACCOUNT: &str = "AZURE_STORAGE_ACCOUNT";
/// Account key paired with [`ENV_ACCOUNT`]
pub const ENV_ACCESS_KEY: &str = "AZURE_STORAGE_ACCESS_KEY";
/// Container fallback, see [`AdapterConfig::resolve`]
pub const ENV_CONTAINER: &str = "AZURE_STORAGE_CONTAINER";

/// Azure-specific options
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOptions {
    pub account_name: Option<String>,
    pub connection_string: Option<String>,
    pub account_key: Option<String>,
    pub host: Option<String>,
    pub container: Option<String>,
}

/// Options bag handed over by the host storage layer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterOptions {
    /// Generic container field shared by all storage adapters
    pub container: Option<String>,
    #[serde(default)]
    pub azure: AzureOptions,
    #[serde(default)]
    pub url_container: UrlContainerPolicy,
}

/// Fully resolved adapter configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    pub settings: AzureSettings,
    pub container: ContainerName,
    pub url_container: UrlContainerPolicy,
}

/// Configuration errors, reported when the adapter is built
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Azure storage configuration error: missing container setting")]
    MissingContainer,

    #[error("Azure storage configuration error: invalid container '{value}': {source}")]
    InvalidContainer {
        value: String,
        #[source]
        source: ValidationError,
    },

    #[error("Azure storage configuration error: {0}")]
    ConnectionString(#[from] ConnectionStringError),
}

/// Unset and empty values are treated alike
fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl AdapterConfig {
    /// Resolve options against an environment lookup
    ///
    /// Credentials: explicit `accountName`, then explicit
    /// `connectionString`, then the environment (connection string, then
    /// account and key), then ambient resolution by the client itself.
    ///
    /// Container: only `azure.container` is accepted. The environment
    /// fallback fills the generic `container` field, which existing
    /// deployments rely on being ignored, so it does not satisfy the
    /// requirement on its own.
    pub fn resolve<F>(mut options: AdapterOptions, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = resolve_credentials(&options.azure, &env)?;

        if non_empty(options.container.as_ref()).is_none() {
            options.container = env(ENV_CONTAINER);
        }

        let container = non_empty(options.azure.container.as_ref())
            .ok_or(ConfigError::MissingContainer)?;
        let container = ContainerName::new(container.clone())
            .map_err(|source| ConfigError::InvalidContainer {
                value: container,
                source,
            })?;

        let mut settings = AzureSettings::new(credentials);
        settings.host = non_empty(options.azure.host.as_ref());

        Ok(Self {
            settings,
            container,
            url_container: options.url_container,
        })
    }

    /// Resolve options against the process environment
    pub fn from_env(options: AdapterOptions) -> Result<Self, ConfigError> {
        Self::resolve(options, |key| std::env::var(key).ok())
    }
}

fn resolve_credentials<F>(azure: &AzureOptions, env: &F) -> Result<AzureCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let account_key = non_empty(azure.account_key.as_ref());

    if let Some(account) = non_empty(azure.account_name.as_ref()) {
        return Ok(AzureCredentials::Account {
            account,
            access_key: account_key,
        });
    }

    if let Some(raw) = non_empty(azure.connection_string.as_ref()) {
        let mut cs: ConnectionString = raw.parse()?;
        if cs.account_key.is_none() {
            cs.account_key = account_key;
        }
        return Ok(AzureCredentials::ConnectionString(cs));
    }

    // Explicit options are exhausted; from here on only the environment counts
    if let Some(raw) = non_empty(env(ENV_CONNECTION_STRING).as_ref()) {
        return Ok(AzureCredentials::ConnectionString(raw.parse()?));
    }

    if let Some(account) = non_empty(env(ENV_ACCOUNT).as_ref()) {
        return Ok(AzureCredentials::Account {
            account,
            access_key: non_empty(env(ENV_ACCESS_KEY).as_ref()),
        });
    }

    Ok(AzureCredentials::Ambient)
}

/// Builder wiring options, schema and backend into an adapter
pub struct AdapterBuilder {
    options: AdapterOptions,
    schema: FileSchema,
    backend: Option<Arc<dyn BlobBackend>>,
}

impl AdapterBuilder {
    pub fn new() -> Self {
        Self {
            options: AdapterOptions::default(),
            schema: FileSchema::default(),
            backend: None,
        }
    }

    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_schema(mut self, schema: FileSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Use this backend instead of the Azure client
    pub fn with_backend(mut self, backend: Arc<dyn BlobBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build, resolving fallbacks through `env`
    pub fn build_with_env<F>(self, env: F) -> Result<BlobStorageAdapter, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AdapterConfig::resolve(self.options, env)?;
        Ok(Self::assemble(config, self.schema, self.backend))
    }

    /// Build, resolving fallbacks through the process environment
    pub fn build(self) -> Result<BlobStorageAdapter, ConfigError> {
        let config = AdapterConfig::from_env(self.options)?;
        Ok(Self::assemble(config, self.schema, self.backend))
    }

    fn assemble(
        config: AdapterConfig,
        schema: FileSchema,
        backend: Option<Arc<dyn BlobBackend>>,
    ) -> BlobStorageAdapter {
        let backend =
            backend.unwrap_or_else(|| Arc::new(AzureBlobBackend::azure(config.settings)));
        BlobStorageAdapter::new(backend, config.container)
            .with_schema(schema)
            .with_url_container_policy(config.url_container)
    }
}

impl Default for AdapterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStorageAdapter {
    /// Build an Azure-backed adapter from the host's options bag
    pub fn from_options(options: AdapterOptions, schema: FileSchema) -> Result<Self, ConfigError> {
        AdapterBuilder::new()
            .with_options(options)
            .with_schema(schema)
            .build()
    }
}

/// Options naming only a container
pub fn container_options(container: impl Into<String>) -> AdapterOptions {
    AdapterOptions {
        azure: AzureOptions {
            container: Some(container.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Create an in-memory adapter for testing and development
pub fn create_in_memory_adapter(container: &str) -> Result<BlobStorageAdapter, ConfigError> {
    AdapterBuilder::new()
        .with_options(container_options(container))
        .with_backend(Arc::new(InMemoryBlobBackend::in_memory()))
        .build_with_env(|_| None)
}

/// Create an Azure-backed adapter configured purely from the environment
pub fn create_adapter_from_env() -> Result<BlobStorageAdapter, ConfigError> {
    AdapterBuilder::new().build()
}
