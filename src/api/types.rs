//! API request and response types.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::QuillConfig;
use crate::document::DocumentStore;
use crate::failover::{FallbackRoute, Orchestrator};
use crate::prompt::Persona;
use crate::providers::{
  DetectionBackend, DetectorClient, GeminiClient, GenerativeBackend
};
use crate::registry::ModelRegistry;
use crate::scoring::Scorer;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState
{   pub orchestrator: Orchestrator
  , pub generation_registry: Arc<ModelRegistry>
  , pub humanization_registry: Arc<ModelRegistry>
  , pub persona: Persona
  , pub scorer: Scorer
  , pub documents: DocumentStore
}

impl AppState
{   /// Wire the handlers to arbitrary backends.
    pub fn new(
      generator: Arc<dyn GenerativeBackend>
    , detector: Arc<dyn DetectionBackend>
    , persona: Persona
    , documents: DocumentStore
    ) -> Self
    {   AppState
        {   orchestrator: Orchestrator::new(generator, FallbackRoute::default())
          , generation_registry: Arc::new(ModelRegistry::generation())
          , humanization_registry: Arc::new(ModelRegistry::humanization())
          , persona
          , scorer: Scorer::new(detector)
          , documents
        }
    }

    /// Build the real HTTP clients from configuration.
    pub fn from_config(config: &QuillConfig)
      -> Result<Self, crate::error::Error>
    {   let generator = GeminiClient::from_config(&config.gemini)?;
        let detector = DetectorClient::from_config(&config.detector)?;
        Ok(AppState::new(
          Arc::new(generator),
          Arc::new(detector),
          config.persona,
          DocumentStore::new(config.documents.output_dir.clone())
        ))
    }
}

/// `POST /generate` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateBody
{   pub prompt: Option<String>
  , pub ai_model: Option<Value>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse
{   pub model_used: String
  , pub output: String
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HumanizeConstraints
{   pub length_change: Option<String>
}

/// `POST /humanize` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HumanizeBody
{   pub content: Option<String>
  , pub audience: Option<String>
  , pub tone: Option<String>
  , pub purpose: Option<String>
  , pub constraints: Option<HumanizeConstraints>
  , pub ai_model: Option<Value>
}

/// The requested model key as the registry sees it. `null` counts as
/// absent; any other non-string value becomes its JSON text, which no
/// registry accepts.
pub fn requested_model_key(ai_model: Option<Value>) -> Option<String>
{   match ai_model?
    {   Value::Null => None
      , Value::String(key) => Some(key)
      , other => Some(other.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanizeResponse
{   pub content: String
}

/// `POST /score` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreBody
{   pub text: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse
{   pub score: u8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareDocxResponse
{   pub status: String
  , pub file_id: String
  , pub message: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse
{   pub status: String
}
