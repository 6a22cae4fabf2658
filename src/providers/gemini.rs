use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   pub content: Option<Content>
  , pub finish_reason: Option<String>
}

impl GenerateContentResponse
{   /// Concatenated text parts of the first candidate.
    ///
    /// `None` when the candidate carries no text part at all, as with
    /// safety blocks or `MAX_TOKENS` stops.
    pub fn text(&self) -> Option<String>
    {   let content = self.candidates.first()?.content.as_ref()?;
        let mut texts = content.parts
          .iter()
          .filter_map(|p| p.text.as_deref())
          .peekable();
        texts.peek()?;
        Some(texts.collect())
    }
}

// ===== Gemini Client =====

/// HTTP client for the Gemini `generateContent` API
pub struct GeminiClient
{   api_key: Option<String>
  , api_base: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   /// Create a client with a per-request timeout
    pub fn new(
      api_key: Option<String>
    , api_base: impl Into<String>
    , timeout: Duration
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating GeminiClient");
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(GeminiClient
        {   api_key
          , api_base: api_base.into()
          , http_client
        })
    }

    /// Build from the `gemini` section of the configuration
    pub fn from_config(
      config: &crate::config::GeminiConfig
    ) -> Result<Self, crate::error::Error>
    {   GeminiClient::new(
          config.api_key.clone(),
          config.api_base.clone(),
          Duration::from_secs(config.timeout_secs)
        )
    }

    fn get_api_key(&self) -> Result<&str, crate::error::Error>
    {   self.api_key.as_deref().ok_or_else(|| {
          error!("No Gemini API key configured");
          crate::error::Error::MissingApiKey("Gemini".to_string())
        })
    }

    fn endpoint(&self, model: &str) -> String
    {   format!("{}/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl crate::providers::GenerativeBackend for GeminiClient
{   async fn generate_content(
      &self
    , model: &str
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   debug!("Handling generate_content for: {}", model);

        let api_key = self.get_api_key()?;

        let request = GenerateContentRequest
        {   contents: vec![
              Content
              {   role: Some("user".to_string())
                , parts: vec![
                    Part { text: Some(prompt.to_string()) }
                  ]
              }
            ]
        };

        trace!("Gemini request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint(model))
          .header("x-goog-api-key", api_key)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("Gemini {}: {}", status, error_text)
            ));
        }

        let body: GenerateContentResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        body.text().ok_or_else(|| {
          error!("No candidates in response");
          crate::error::Error::NoCandidatesInResponse
        })
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::providers::GenerativeBackend;

    #[test]
    fn joins_text_parts_of_first_candidate()
    {   let body: GenerateContentResponse = serde_json::from_value(
          serde_json::json!({
            "candidates": [
              { "content": { "role": "model", "parts": [
                  { "text": "Hello, " }, { "text": "world" }
                ] }, "finishReason": "STOP" },
              { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
          })
        ).unwrap();
        assert_eq!(body.text().as_deref(), Some("Hello, world"));
        assert_eq!(
          body.candidates[0].finish_reason.as_deref(),
          Some("STOP")
        );
    }

    #[test]
    fn empty_candidates_have_no_text()
    {   let body: GenerateContentResponse
          = serde_json::from_str("{}").unwrap();
        assert!(body.text().is_none());
    }

    #[test]
    fn candidate_without_text_parts_has_no_text()
    {   for body in [
          serde_json::json!({ "candidates": [
            { "content": { "role": "model" }, "finishReason": "MAX_TOKENS" }
          ] })
        , serde_json::json!({ "candidates": [
            { "content": { "parts": [ {} ] }, "finishReason": "SAFETY" }
          ] })
        , serde_json::json!({ "candidates": [ { "finishReason": "SAFETY" } ] })
        ]
        {   let body: GenerateContentResponse
              = serde_json::from_value(body).unwrap();
            assert!(body.text().is_none());
        }
    }

    #[test]
    fn endpoint_uses_qualified_model_id()
    {   let client = GeminiClient::new(
          None,
          "https://example.test/v1beta",
          Duration::from_secs(1)
        ).unwrap();
        assert_eq!(
          client.endpoint("models/gemini-2.5-flash"),
          "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request()
    {   let client = GeminiClient::new(
          None,
          "http://127.0.0.1:9",
          Duration::from_secs(1)
        ).unwrap();
        let result = client
          .generate_content("models/gemini-2.5-flash", "hi")
          .await;
        assert_eq!(
          result,
          Err(crate::error::Error::MissingApiKey("Gemini".to_string()))
        );
    }

    #[tokio::test]
    #[ignore]
    async fn live_generate_content()
    {   let Ok(key) = std::env::var("GEMINI_API_KEY") else
        {   println!("Skipping: GEMINI_API_KEY not set");
            return;
        };
        let client = GeminiClient::new(
          Some(key),
          crate::config::DEFAULT_GEMINI_API_BASE,
          Duration::from_secs(60)
        ).unwrap();
        let text = client
          .generate_content(crate::registry::FLASH_MODEL, "Say hello")
          .await
          .unwrap();
        assert!(!text.is_empty());
    }
}
