use async_trait::async_trait;
use object_store::{
    ObjectStore as ApacheObjectStore,
    azure::{AzureConfigKey, MicrosoftAzureBuilder},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{AzureCredentials, AzureSettings};
use crate::{
    adapters::outbound::storage::object_store_backend::{
        ContainerStoreProvider, ObjectStoreBlobBackend, encode_blob_path,
    },
    domain::value_objects::{BlobName, ContainerName},
};

/// Builds Azure Blob Storage clients, one per container
///
/// Clients are created on first use of a container and then reused.
pub struct AzureContainerProvider {
    settings: AzureSettings,
    clients: RwLock<HashMap<ContainerName, Arc<dyn ApacheObjectStore>>>,
}

impl AzureContainerProvider {
    pub fn new(settings: AzureSettings) -> Self {
        Self {
            settings,
            clients: RwLock::new(HashMap::new()),
        }
    }

    fn builder(&self) -> MicrosoftAzureBuilder {
        let mut builder = match &self.settings.credentials {
            // object_store reads AZURE_STORAGE_ACCOUNT_NAME and friends itself
            AzureCredentials::Ambient => MicrosoftAzureBuilder::from_env(),
            AzureCredentials::Account {
                account,
                access_key,
            } => {
                let builder = MicrosoftAzureBuilder::new().with_account(account);
                match access_key {
                    Some(key) => builder.with_access_key(key),
                    None => builder,
                }
            }
            AzureCredentials::ConnectionString(cs) if cs.use_development_storage => {
                MicrosoftAzureBuilder::new().with_use_emulator(true)
            }
            AzureCredentials::ConnectionString(cs) => {
                let mut builder = MicrosoftAzureBuilder::new();
                if let Some(account) = &cs.account_name {
                    builder = builder.with_account(account);
                }
                if let Some(key) = &cs.account_key {
                    builder = builder.with_access_key(key);
                }
                if let Some(sas) = &cs.shared_access_signature {
                    builder = builder.with_config(AzureConfigKey::SasKey, sas);
                }
                if cs.blob_endpoint.is_some()
                    || cs.endpoint_suffix.is_some()
                    || cs.protocol.is_some()
                {
                    if let Some(base) = cs.blob_base_url() {
                        builder = with_endpoint(builder, base);
                    }
                }
                builder
            }
        };

        if let Some(host) = self.host_override() {
            builder = with_endpoint(builder, normalize_host(host));
        }

        builder
    }

    /// Host override, unless the emulator is in use
    ///
    /// object_store always talks to the emulator at its own address, so the
    /// override has to be dropped for URLs to match where blobs are written.
    fn host_override(&self) -> Option<&str> {
        match &self.settings.credentials {
            AzureCredentials::ConnectionString(cs) if cs.use_development_storage => None,
            _ => self.settings.host.as_deref(),
        }
    }

    fn base_url(&self) -> Option<String> {
        if let Some(host) = self.host_override() {
            return Some(normalize_host(host));
        }

        match &self.settings.credentials {
            AzureCredentials::Account { account, .. } => {
                Some(format!("https://{}.blob.core.windows.net", account))
            }
            AzureCredentials::ConnectionString(cs) => cs.blob_base_url(),
            AzureCredentials::Ambient => None,
        }
    }
}

fn with_endpoint(builder: MicrosoftAzureBuilder, endpoint: String) -> MicrosoftAzureBuilder {
    let allow_http = endpoint.starts_with("http://");
    builder.with_endpoint(endpoint).with_allow_http(allow_http)
}

/// Host overrides may be given with or without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl ContainerStoreProvider for AzureContainerProvider {
    async fn store_for(
        &self,
        container: &ContainerName,
    ) -> Result<Arc<dyn ApacheObjectStore>, object_store::Error> {
        if let Some(client) = self.clients.read().await.get(container) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        if let Some(client) = clients.get(container) {
            return Ok(client.clone());
        }

        debug!("Creating Azure blob client for container {}", container);
        let client: Arc<dyn ApacheObjectStore> = Arc::new(
            self.builder()
                .with_container_name(container.as_str())
                .build()?,
        );
        clients.insert(container.clone(), client.clone());
        Ok(client)
    }

    fn blob_url(&self, container: &ContainerName, blob: &BlobName) -> String {
        let path = format!("{}/{}", container, encode_blob_path(blob));
        match self.base_url() {
            Some(base) => format!("{}/{}", base, path),
            None => format!("/{}", path),
        }
    }
}

/// Blob backend talking to Azure Blob Storage
pub type AzureBlobBackend = ObjectStoreBlobBackend<AzureContainerProvider>;

impl AzureBlobBackend {
    pub fn azure(settings: AzureSettings) -> Self {
        ObjectStoreBlobBackend::new(AzureContainerProvider::new(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::storage::azure::ConnectionString;

    fn url_for(settings: AzureSettings, blob: &str) -> String {
        AzureContainerProvider::new(settings).blob_url(
            &ContainerName::new("media".to_string()).unwrap(),
            &BlobName::new(blob.to_string()).unwrap(),
        )
    }

    fn account(name: &str) -> AzureCredentials {
        AzureCredentials::Account {
            account: name.to_string(),
            access_key: Some("a2V5".to_string()),
        }
    }

    #[test]
    fn test_account_url() {
        let settings = AzureSettings::new(account("acme"));
        assert_eq!(
            url_for(settings, "x.png"),
            "https://acme.blob.core.windows.net/media/x.png"
        );
    }

    #[test]
    fn test_host_override_url() {
        let settings = AzureSettings::new(account("acme")).with_host("cdn.example.com/");
        assert_eq!(
            url_for(settings, "dir/a b.png"),
            "https://cdn.example.com/media/dir/a%20b.png"
        );

        let settings = AzureSettings::new(account("acme")).with_host("http://localhost:10000/acme");
        assert_eq!(
            url_for(settings, "x.png"),
            "http://localhost:10000/acme/media/x.png"
        );
    }

    #[test]
    fn test_connection_string_url() {
        let cs: ConnectionString =
            "DefaultEndpointsProtocol=http;AccountName=acme;EndpointSuffix=core.chinacloudapi.cn"
                .parse()
                .unwrap();
        let settings = AzureSettings::new(AzureCredentials::ConnectionString(cs));
        assert_eq!(
            url_for(settings, "x.png"),
            "http://acme.blob.core.chinacloudapi.cn/media/x.png"
        );

        let dev: ConnectionString = "UseDevelopmentStorage=true".parse().unwrap();
        let settings = AzureSettings::new(AzureCredentials::ConnectionString(dev));
        assert_eq!(
            url_for(settings, "x.png"),
            "http://127.0.0.1:10000/devstoreaccount1/media/x.png"
        );
    }

    #[test]
    fn test_development_storage_ignores_host_override() {
        let dev: ConnectionString = "UseDevelopmentStorage=true".parse().unwrap();
        let settings =
            AzureSettings::new(AzureCredentials::ConnectionString(dev)).with_host("cdn.example.com");
        assert_eq!(
            url_for(settings, "x.png"),
            "http://127.0.0.1:10000/devstoreaccount1/media/x.png"
        );
    }

    #[tokio::test]
    async fn test_blob_endpoint_with_sas_builds_client() {
        let cs: ConnectionString =
            "BlobEndpoint=https://acme.blob.core.windows.net/;SharedAccessSignature=sv=2022-11-02&ss=b&sig=abc%3D"
                .parse()
                .unwrap();
        let provider = AzureContainerProvider::new(AzureSettings::new(
            AzureCredentials::ConnectionString(cs),
        ));
        let media = ContainerName::new("media".to_string()).unwrap();

        assert!(provider.store_for(&media).await.is_ok());
        assert_eq!(
            provider.blob_url(&media, &BlobName::new("x.png".to_string()).unwrap()),
            "https://acme.blob.core.windows.net/media/x.png"
        );
    }

    #[test]
    fn test_ambient_url_without_account_is_path_only() {
        let settings = AzureSettings::new(AzureCredentials::Ambient);
        assert_eq!(url_for(settings, "x.png"), "/media/x.png");
    }

    #[tokio::test]
    async fn test_clients_are_reused_per_container() {
        let provider = AzureContainerProvider::new(AzureSettings::new(account("acme")));
        let media = ContainerName::new("media".to_string()).unwrap();

        let first = provider.store_for(&media).await.unwrap();
        let second = provider.store_for(&media).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = provider
            .store_for(&ContainerName::new("other".to_string()).unwrap())
            .await
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
