use super::error::OcrClientError;
use super::interfaces::{AnalyzeOperation, OperationStatus};
use app_state::{OcrSettings, SecretSettings};
use async_trait::async_trait;
use bon::bon;
use common_types::LayoutAnalysis;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "Operation-Location";

/// Extracts words, lines and page size from a document image.
#[async_trait]
pub trait LayoutAnalyzer: Send + Sync {
    async fn analyze_layout(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<LayoutAnalysis, OcrClientError>;
}

/// Azure AI Document Intelligence REST client for the layout model.
#[derive(Clone)]
pub struct AzureLayoutClient {
    http: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    model_id: String,
    api_version: String,
    poll_interval: Duration,
    timeout: Duration,
}

#[bon]
impl AzureLayoutClient {
    /// Missing credentials are not an error here; they surface on the first analysis instead.
    #[builder]
    #[must_use]
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        model_id: Option<String>,
        api_version: Option<String>,
        poll_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            api_key,
            model_id: model_id.unwrap_or_else(|| "prebuilt-layout".to_string()),
            api_version: api_version.unwrap_or_else(|| "2023-07-31".to_string()),
            poll_interval: poll_interval.unwrap_or(Duration::from_secs(1)),
            timeout: timeout.unwrap_or(Duration::from_secs(120)),
        }
    }

    #[must_use]
    pub fn from_settings(secrets: &SecretSettings, ocr: &OcrSettings) -> Self {
        Self::builder()
            .maybe_endpoint(secrets.ocr_endpoint.clone())
            .maybe_api_key(secrets.ocr_key.clone())
            .model_id(ocr.model_id.clone())
            .api_version(ocr.api_version.clone())
            .poll_interval(Duration::from_millis(ocr.poll_interval_ms))
            .timeout(Duration::from_secs(ocr.timeout_secs))
            .build()
    }

    fn credentials(&self) -> Result<(&str, &str), OcrClientError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(OcrClientError::NotConfigured("endpoint"))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(OcrClientError::NotConfigured("API key"))?;
        Ok((endpoint, api_key))
    }

    fn analyze_url(&self, endpoint: &str) -> Result<Url, OcrClientError> {
        let mut url = Url::parse(&format!(
            "{endpoint}/formrecognizer/documentModels/{}:analyze",
            self.model_id
        ))?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    async fn submit(
        &self,
        url: Url,
        api_key: &str,
        image: &[u8],
        content_type: &str,
    ) -> Result<String, OcrClientError> {
        let response = self
            .http
            .post(url)
            .header(KEY_HEADER, api_key)
            .header(CONTENT_TYPE, content_type)
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(OcrClientError::Api { status, body });
        }

        response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
            .ok_or(OcrClientError::MissingOperationLocation)
    }

    async fn poll(
        &self,
        operation_url: &str,
        api_key: &str,
    ) -> Result<LayoutAnalysis, OcrClientError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .http
                .get(operation_url)
                .header(KEY_HEADER, api_key)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(OcrClientError::Api { status, body });
            }

            let operation: AnalyzeOperation = serde_json::from_str(&body)?;
            debug!("Layout analysis status: {:?}", operation.status);
            match operation.status {
                OperationStatus::Succeeded => {
                    return Ok(operation.analyze_result.unwrap_or_default().into());
                }
                OperationStatus::Failed | OperationStatus::Canceled => {
                    let reason = operation
                        .error
                        .map_or_else(|| format!("{:?}", operation.status), |e| e.to_string());
                    return Err(OcrClientError::AnalysisFailed(reason));
                }
                OperationStatus::NotStarted
                | OperationStatus::Running
                | OperationStatus::Unknown => {}
            }

            if Instant::now() >= deadline {
                return Err(OcrClientError::Timeout(self.timeout));
            }
        }
    }
}

#[async_trait]
impl LayoutAnalyzer for AzureLayoutClient {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn analyze_layout(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<LayoutAnalysis, OcrClientError> {
        let (endpoint, api_key) = self.credentials()?;
        let url = self.analyze_url(endpoint)?;

        let operation_url = self.submit(url, api_key, image, content_type).await?;
        let analysis = self.poll(&operation_url, api_key).await?;

        info!(
            "Layout analysis found {} words and {} lines",
            analysis.words.len(),
            analysis.lines.len()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    #[tokio::test]
    async fn missing_credentials_fail_per_request() {
        let client = AzureLayoutClient::builder().api_key("key".to_string()).build();
        let result = client.analyze_layout(b"img", "image/png").await;
        assert!(matches!(result, Err(OcrClientError::NotConfigured("endpoint"))));

        let client = AzureLayoutClient::builder()
            .endpoint("https://example.cognitiveservices.azure.com".to_string())
            .build();
        let result = client.analyze_layout(b"img", "image/png").await;
        assert!(matches!(result, Err(OcrClientError::NotConfigured("API key"))));
    }

    #[test]
    fn builds_analyze_url() -> Result<()> {
        let client = AzureLayoutClient::builder()
            .endpoint("https://forms.cognitiveservices.azure.com/".to_string())
            .api_key("key".to_string())
            .build();
        let (endpoint, _) = client.credentials()?;
        assert_eq!(
            client.analyze_url(endpoint)?.as_str(),
            "https://forms.cognitiveservices.azure.com/formrecognizer/documentModels/prebuilt-layout:analyze?api-version=2023-07-31"
        );
        Ok(())
    }
}
