// # HTTP IP Source
//
// This crate discovers the host's current public address by asking an
// external "what is my IP" service, for invocations that do not pass an
// address explicitly.
//
// ## Behavior
//
// - One GET request per `current()` call, no polling, no caching
// - The response body must be a bare address, surrounding whitespace allowed
// - An optional version filter rejects addresses of the other family
// - HTTP timeout configured (10 seconds)
//
// Services known to answer in this format: api64.ipify.org (both families),
// api.ipify.org (IPv4 only), icanhazip.com.

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default HTTP timeout for discovery requests (10 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public address source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// Address family to accept (None = both)
    version: Option<IpVersion>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api64.ipify.org")
    /// - `version`: Address family to accept (None = both)
    pub fn new(url: impl Into<String>, version: Option<IpVersion>) -> Self {
        Self {
            url: url.into(),
            version,
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a source from configuration
    pub fn from_config(config: &IpSourceConfig) -> Self {
        Self::new(config.url.clone(), config.version)
    }

    /// The URL queried by this source
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Discovering public address via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;
        let ip_text = ip_text.trim();

        let ip: IpAddr = ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("Invalid IP address: '{}'", ip_text)))?;

        if let Some(version) = self.version
            && !version.matches(&ip)
        {
            return Err(Error::ip_source(format!(
                "Expected an {:?} address, got: {}",
                version, ip
            )));
        }

        tracing::info!("Discovered public address {}", ip);
        Ok(ip)
    }

    fn version(&self) -> Option<IpVersion> {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn serve(body: &str, status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_parses_trimmed_address() {
        let server = serve("2001:db8::42\n", 200).await;
        let source = HttpIpSource::new(server.uri(), None);

        let ip = source.current().await.unwrap();
        assert_eq!(ip, "2001:db8::42".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_version_filter_rejects_other_family() {
        let server = serve("203.0.113.5", 200).await;
        let source = HttpIpSource::new(server.uri(), Some(IpVersion::V6));

        let err = source.current().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IpSource);
        assert_eq!(source.version(), Some(IpVersion::V6));
    }

    #[tokio::test]
    async fn test_garbage_body_is_error() {
        let server = serve("<html>rate limited</html>", 200).await;
        let source = HttpIpSource::new(server.uri(), None);

        let err = source.current().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IpSource);
        assert!(err.to_string().contains("Invalid IP address"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = serve("", 503).await;
        let source = HttpIpSource::new(server.uri(), None);

        let err = source.current().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_each_call_queries_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("198.51.100.1"))
            .expect(2)
            .mount(&server)
            .await;

        let source = HttpIpSource::new(server.uri(), Some(IpVersion::V4));
        source.current().await.unwrap();
        source.current().await.unwrap();
    }

    #[test]
    fn test_from_config() {
        let config = IpSourceConfig::default();
        let source = HttpIpSource::from_config(&config);
        assert_eq!(source.url(), ddns_core::config::DEFAULT_IP_SOURCE_URL);
        assert_eq!(source.version(), None);
    }
}
