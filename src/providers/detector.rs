use std::time::Duration;
use async_trait::async_trait;
use serde::Serialize;
use log::{debug, trace, error};

#[derive(Debug, Clone, Serialize)]
struct DetectRequest<'a>
{   key: &'a str
  , text: &'a str
}

/// HTTP client for the AI-detection scoring service
pub struct DetectorClient
{   api_key: Option<String>
  , api_url: String
  , http_client: reqwest::Client
}

impl DetectorClient
{   /// Create a client whose calls are bounded by `timeout`
    pub fn new(
      api_key: Option<String>
    , api_url: impl Into<String>
    , timeout: Duration
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating DetectorClient with {:?} timeout", timeout);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(DetectorClient
        {   api_key
          , api_url: api_url.into()
          , http_client
        })
    }

    pub fn from_config(
      config: &crate::config::DetectorConfig
    ) -> Result<Self, crate::error::Error>
    {   DetectorClient::new(
          config.api_key.clone(),
          config.api_url.clone(),
          Duration::from_secs(config.timeout_secs)
        )
    }
}

#[async_trait]
impl crate::providers::DetectionBackend for DetectorClient
{   async fn detect(
      &self
    , text: &str
    ) -> Result<serde_json::Value, crate::error::Error>
    {   let key = self.api_key.as_deref().ok_or_else(|| {
          error!("No detector API key configured");
          crate::error::Error::MissingApiKey("detector".to_string())
        })?;

        debug!("Scoring {} chars", text.len());

        let response = self.http_client
          .post(&self.api_url)
          .json(&DetectRequest { key, text })
          .send()
          .await
          .map_err(|e| {
            error!("Detector HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Detector response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Detector API error ({}): {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("detector {}: {}", status, error_text)
            ));
        }

        response.json().await.map_err(|e| {
          error!("Detector parse error: {}", e);
          crate::error::Error::ParseError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::providers::DetectionBackend;

    #[tokio::test]
    async fn missing_key_is_reported()
    {   let client = DetectorClient::new(
          None,
          "http://127.0.0.1:9/detect",
          Duration::from_secs(1)
        ).unwrap();
        assert_eq!(
          client.detect("text").await,
          Err(crate::error::Error::MissingApiKey("detector".to_string()))
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_an_upstream_error()
    {   // Port 9 (discard) is not expected to accept HTTP.
        let client = DetectorClient::new(
          Some("k".to_string()),
          "http://127.0.0.1:9/detect",
          Duration::from_secs(2)
        ).unwrap();
        let err = client.detect("text").await.unwrap_err();
        assert!(err.is_upstream(), "unexpected {:?}", err);
    }
}
