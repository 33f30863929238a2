use crate::common::build_http_client;
use config::BackingServiceConfig;
use reqwest::Client;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum BackingServiceError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Backing service request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Client for the secured backing service, called on behalf of the logged-in user
pub struct BackingServiceClient {
    url: String,
    http_client: Client,
}

impl BackingServiceClient {
    pub fn new(
        config: &BackingServiceConfig,
        skip_tls_verify: bool,
    ) -> Result<Self, BackingServiceError> {
        Ok(Self {
            url: config.url.clone(),
            http_client: build_http_client(skip_tls_verify).map_err(BackingServiceError::Client)?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call the backing service with the user's access token and return the raw payload
    pub async fn hello(&self, access_token: &str) -> Result<String, BackingServiceError> {
        debug!(url = %self.url, "Calling backing service");

        let response = self
            .http_client
            .get(&self.url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Backing service returned an error status");
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_hello_forwards_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/hello")
                    .header("authorization", "Bearer user-token");
                then.status(200).body("Hello, marissa");
            })
            .await;

        let client = BackingServiceClient::new(
            &BackingServiceConfig {
                url: server.url("/api/hello"),
            },
            false,
        )
        .unwrap();

        assert_eq!(client.hello("user-token").await.unwrap(), "Hello, marissa");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = BackingServiceClient::new(
            &BackingServiceConfig {
                url: "http://127.0.0.1:1/api/hello".to_string(),
            },
            false,
        )
        .unwrap();

        assert!(matches!(
            client.hello("t").await,
            Err(BackingServiceError::Request(_))
        ));
    }
}
