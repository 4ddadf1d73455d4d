//! HTTP implementation of [`ModelsApi`] against the proxy's admin API.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::*;

pub struct HttpModelsApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpModelsApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Append percent-encoded path segments to the base URL.
    ///
    /// Dot segments are rejected: `url` drops them instead of encoding
    /// them, which would address a different endpoint.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(ApiError::InvalidSegment(dot.to_string()));
        }
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ModelsApi for HttpModelsApi {
    async fn discover(&self, provider: &ProviderIndex) -> Result<DiscoveryPayload, ApiError> {
        let url = self.endpoint(&["api", "models", "discover", provider.as_str()])?;
        self.get_json(url).await
    }

    async fn validate(
        &self,
        provider: &ProviderIndex,
        model: &str,
    ) -> Result<ValidationPayload, ApiError> {
        let url = self.endpoint(&["api", "models", "validate", provider.as_str(), model])?;
        self.get_json(url).await
    }
}
