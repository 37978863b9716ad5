use std::str::FromStr;
use thiserror::Error as ThisError;

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Blob endpoint of the local storage emulator
pub const DEVELOPMENT_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum ConnectionStringError {
    #[error("Malformed connection string segment: '{0}'")]
    MalformedSegment(String),

    #[error("Unsupported endpoint protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("Connection string names neither an account, a blob endpoint nor development storage")]
    MissingAccount,

    #[error("No account name given and none can be read from blob endpoint '{0}'")]
    AccountNotInEndpoint(String),
}

/// A parsed Azure storage connection string
///
/// `AccountName=acme;AccountKey=...;EndpointSuffix=core.windows.net`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub shared_access_signature: Option<String>,
    pub blob_endpoint: Option<String>,
    pub protocol: Option<String>,
    pub endpoint_suffix: Option<String>,
    pub use_development_storage: bool,
}

impl ConnectionString {
    /// Base URL that blob paths hang off
    pub fn blob_base_url(&self) -> Option<String> {
        if self.use_development_storage {
            return Some(DEVELOPMENT_BLOB_ENDPOINT.to_string());
        }
        if let Some(endpoint) = &self.blob_endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        self.account_name.as_ref().map(|account| {
            format!(
                "{}://{}.blob.{}",
                self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
                account,
                self.endpoint_suffix
                    .as_deref()
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
            )
        })
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parsed = ConnectionString::default();

        for segment in s.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            // Values such as account keys and SAS tokens may contain '='
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let value = value.trim().to_string();

            match key.trim() {
                "AccountName" => parsed.account_name = Some(value),
                "AccountKey" => parsed.account_key = Some(value),
                "SharedAccessSignature" => parsed.shared_access_signature = Some(value),
                "BlobEndpoint" => parsed.blob_endpoint = Some(value),
                "EndpointSuffix" => parsed.endpoint_suffix = Some(value),
                "DefaultEndpointsProtocol" => {
                    if value != "https" && value != "http" {
                        return Err(ConnectionStringError::UnsupportedProtocol(value));
                    }
                    parsed.protocol = Some(value);
                }
                "UseDevelopmentStorage" => {
                    parsed.use_development_storage = value.eq_ignore_ascii_case("true")
                }
                // Queue, table and file endpoints are irrelevant for blobs
                _ => {}
            }
        }

        if !parsed.use_development_storage && parsed.account_name.is_none() {
            // Clients are addressed by account, so SAS-only strings need one
            let endpoint = parsed
                .blob_endpoint
                .as_deref()
                .ok_or(ConnectionStringError::MissingAccount)?;
            let account = account_from_endpoint(endpoint)
                .ok_or_else(|| ConnectionStringError::AccountNotInEndpoint(endpoint.to_string()))?;
            parsed.account_name = Some(account);
        }

        Ok(parsed)
    }
}

/// `https://acme.blob.core.windows.net/` -> `acme`
fn account_from_endpoint(endpoint: &str) -> Option<String> {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest)
        .split(['/', ':'])
        .next()?;
    let mut labels = host.split('.');
    let account = labels.next().filter(|label| !label.is_empty())?;
    (labels.next() == Some("blob")).then(|| account.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_connection_string() {
        let cs: ConnectionString =
            "DefaultEndpointsProtocol=https;AccountName=acme;AccountKey=a2V5==;EndpointSuffix=core.windows.net"
                .parse()
                .unwrap();

        assert_eq!(cs.account_name.as_deref(), Some("acme"));
        assert_eq!(cs.account_key.as_deref(), Some("a2V5=="));
        assert_eq!(
            cs.blob_base_url().as_deref(),
            Some("https://acme.blob.core.windows.net")
        );
    }

    #[test]
    fn test_parse_blob_endpoint_with_sas() {
        let cs: ConnectionString =
            "BlobEndpoint=https://acme.blob.core.windows.net/;SharedAccessSignature=sv=2020&sig=abc%3D"
                .parse()
                .unwrap();

        assert_eq!(cs.account_name.as_deref(), Some("acme"));
        assert_eq!(
            cs.shared_access_signature.as_deref(),
            Some("sv=2020&sig=abc%3D")
        );
        assert_eq!(
            cs.blob_base_url().as_deref(),
            Some("https://acme.blob.core.windows.net")
        );
    }

    #[test]
    fn test_blob_endpoint_without_account_label_is_rejected() {
        assert_eq!(
            "BlobEndpoint=https://cdn.example.com/;SharedAccessSignature=sv=2020&sig=abc"
                .parse::<ConnectionString>(),
            Err(ConnectionStringError::AccountNotInEndpoint(
                "https://cdn.example.com/".to_string()
            ))
        );

        // An explicit account makes any endpoint acceptable
        let cs: ConnectionString =
            "AccountName=acme;BlobEndpoint=https://cdn.example.com/;SharedAccessSignature=sv=2020"
                .parse()
                .unwrap();
        assert_eq!(cs.account_name.as_deref(), Some("acme"));
        assert_eq!(cs.blob_base_url().as_deref(), Some("https://cdn.example.com"));
    }

    #[test]
    fn test_parse_development_storage() {
        let cs: ConnectionString = "UseDevelopmentStorage=true".parse().unwrap();
        assert!(cs.use_development_storage);
        assert_eq!(cs.blob_base_url().as_deref(), Some(DEVELOPMENT_BLOB_ENDPOINT));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "AccountName".parse::<ConnectionString>(),
            Err(ConnectionStringError::MalformedSegment("AccountName".to_string()))
        );
        assert_eq!(
            "AccountKey=abc".parse::<ConnectionString>(),
            Err(ConnectionStringError::MissingAccount)
        );
        assert!(matches!(
            "DefaultEndpointsProtocol=ftp;AccountName=a".parse::<ConnectionString>(),
            Err(ConnectionStringError::UnsupportedProtocol(_))
        ));
    }
}
