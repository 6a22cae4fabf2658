//! AI-detection score pass-through

use std::sync::Arc;
use log::{debug, error};

use crate::providers::DetectionBackend;

/// Field carrying the fractional probability in detector responses
pub const SCORE_FIELD: &str = "score";

/// Turns detector verdicts into integer percentages
#[derive(Clone)]
pub struct Scorer
{   backend: Arc<dyn DetectionBackend>
}

impl Scorer
{   pub fn new(backend: Arc<dyn DetectionBackend>) -> Self
    {   Scorer { backend }
    }

    /// Score `text` in 0..=100; one backend call, no retries
    pub async fn score(&self, text: &str)
      -> Result<u8, crate::error::Error>
    {   if text.trim().is_empty()
        {   return Err(crate::error::Error::validation("Missing 'text'"));
        }
        let verdict = self.backend.detect(text).await?;
        let score = score_from_response(&verdict)?;
        debug!("Detector score: {}", score);
        Ok(score)
    }
}

/// Scale the fractional `score` field to a truncated percentage
pub fn score_from_response(
  verdict: &serde_json::Value
) -> Result<u8, crate::error::Error>
{   let raw = verdict
      .get(SCORE_FIELD)
      .and_then(|v| v.as_f64())
      .filter(|v| v.is_finite())
      .ok_or_else(|| {
        error!("Detector response has no numeric '{}'", SCORE_FIELD);
        crate::error::Error::InvalidUpstreamResponse(
          format!("missing '{}' field", SCORE_FIELD)
        )
      })?;
    let percent = (raw * 100.0).trunc().clamp(0.0, 100.0);
    Ok(percent as u8)
}
