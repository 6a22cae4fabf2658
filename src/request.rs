//! Validated generation inputs and outputs

use serde::{Deserialize, Serialize};

/// A prompt bound for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// The prompt text, never empty
    pub prompt: String
  , /// Client-facing model key
    pub model_key: String
}

pub const MISSING_PROMPT: &str = "Missing 'prompt'";

impl GenerationRequest
{   /// Reject an absent or blank prompt; the key is checked by the registry
    pub fn new(
      prompt: Option<String>
    , model_key: Option<String>
    ) -> Result<Self, crate::error::Error>
    {   let prompt = prompt
          .filter(|p| !p.trim().is_empty())
          .ok_or_else(|| crate::error::Error::validation(MISSING_PROMPT))?;
        Ok(GenerationRequest
        {   prompt
          , model_key: model_key.unwrap_or_default()
        })
    }
}

/// What a successful generation produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult
{   /// Model key, or the fallback marker when the fallback answered
    pub model_used: String
  , /// Generated text
    pub output: String
}
