//! External backend interfaces and their HTTP clients

use async_trait::async_trait;

pub mod detector;
pub mod gemini;

// Re-export for convenience
pub use detector::DetectorClient;
pub use gemini::GeminiClient;

/// A generative-model backend: prompt in, text out
#[async_trait]
pub trait GenerativeBackend: Send + Sync
{   /// Run `prompt` against the fully-qualified `model` id
    async fn generate_content(
      &self
    , model: &str
    , prompt: &str
    ) -> Result<String, crate::error::Error>;
}

/// An AI-detection backend returning its raw JSON verdict
#[async_trait]
pub trait DetectionBackend: Send + Sync
{   async fn detect(
      &self
    , text: &str
    ) -> Result<serde_json::Value, crate::error::Error>;
}
