//! Generation with a one-shot fallback to the low-tier model

use std::sync::Arc;
use log::{debug, warn, error};

use crate::providers::GenerativeBackend;
use crate::registry::ModelRegistry;
use crate::request::GenerationResult;

/// Which key falls back, where to, and how the substitution is reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRoute
{   /// Key whose failures trigger the fallback
    pub high_tier_key: String
  , /// Backend model id used for the single fallback attempt
    pub fallback_model: String
  , /// Reported as `model_used` when the fallback answers
    pub fallback_marker: String
}

impl FallbackRoute
{   pub fn new(
      high_tier_key: impl Into<String>
    , fallback_model: impl Into<String>
    , fallback_marker: impl Into<String>
    ) -> Self
    {   FallbackRoute
        {   high_tier_key: high_tier_key.into()
          , fallback_model: fallback_model.into()
          , fallback_marker: fallback_marker.into()
        }
    }

    /// Whether a failure on `model_key` gets a second attempt
    pub fn applies_to(&self, model_key: &str) -> bool
    {   model_key == self.high_tier_key
    }
}

impl Default for FallbackRoute
{   fn default() -> Self
    {   FallbackRoute::new(
          "pro",
          crate::registry::FLASH_MODEL,
          "flash_fallback"
        )
    }
}

/// Runs prompts against a backend, resolving keys per call-site
#[derive(Clone)]
pub struct Orchestrator
{   backend: Arc<dyn GenerativeBackend>
  , route: FallbackRoute
}

impl Orchestrator
{   pub fn new(
      backend: Arc<dyn GenerativeBackend>
    , route: FallbackRoute
    ) -> Self
    {   Orchestrator { backend, route }
    }

    pub fn route(&self) -> &FallbackRoute
    {   &self.route
    }

    /// Resolve `model_key`, call the backend, fall back at most once.
    ///
    /// The fallback ignores the cause of the primary failure, so a prompt
    /// the backend rejects outright is still sent a second time.
    pub async fn generate(
      &self
    , prompt: &str
    , model_key: &str
    , registry: &ModelRegistry
    ) -> Result<GenerationResult, crate::error::Error>
    {   let model = registry.resolve(model_key)?;
        debug!("Generating with {} ({})", model_key, model);

        let primary_err = match self.backend
          .generate_content(model, prompt)
          .await
        {   Ok(output) => {
              return Ok(GenerationResult
              {   model_used: model_key.to_string()
                , output
              });
            }
          , Err(e) => e
        };

        if !self.route.applies_to(model_key)
        {   error!("Generation with {} failed: {}", model, primary_err);
            return Err(crate::error::Error::GenerationFailed);
        }

        warn!(
          "Generation with {} failed ({}), falling back to {}",
          model, primary_err, self.route.fallback_model
        );

        match self.backend
          .generate_content(&self.route.fallback_model, prompt)
          .await
        {   Ok(output) => Ok(GenerationResult
            {   model_used: self.route.fallback_marker.clone()
              , output
            })
          , Err(e) => {
              error!(
                "Fallback {} failed: {}",
                self.route.fallback_model, e
              );
              Err(crate::error::Error::GenerationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use crate::error::Error;
    use crate::registry::{FLASH_MODEL, GENERATION_PRO_MODEL};
    use tokio_test::{assert_err, assert_ok};

    /// Backend that fails for listed models and records every call
    struct ScriptedBackend
    {   failing: Vec<&'static str>
      , failure: Error
      , calls: Mutex<Vec<String>>
    }

    impl ScriptedBackend
    {   fn failing(models: &[&'static str]) -> Arc<Self>
        {   ScriptedBackend::failing_with(
              models,
              Error::ApiError("unavailable".to_string())
            )
        }

        fn failing_with(models: &[&'static str], failure: Error) -> Arc<Self>
        {   Arc::new(ScriptedBackend
            {   failing: models.to_vec()
              , failure
              , calls: Mutex::new(vec![])
            })
        }

        fn calls(&self) -> Vec<String>
        {   self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend
    {   async fn generate_content(
          &self
        , model: &str
        , prompt: &str
        ) -> Result<String, Error>
        {   self.calls.lock().unwrap().push(model.to_string());
            if self.failing.iter().any(|m| *m == model)
            {   Err(self.failure.clone())
            } else
            {   Ok(format!("{} says {}", model, prompt))
            }
        }
    }

    fn orchestrator(backend: Arc<ScriptedBackend>) -> Orchestrator
    {   Orchestrator::new(backend, FallbackRoute::default())
    }

    #[tokio::test]
    async fn flash_is_a_single_call()
    {   let backend = ScriptedBackend::failing(&[]);
        let result = assert_ok!(
          orchestrator(backend.clone())
            .generate("hi", "flash", &ModelRegistry::generation())
            .await
        );
        assert_eq!(result.model_used, "flash");
        assert_eq!(result.output, format!("{} says hi", FLASH_MODEL));
        assert_eq!(backend.calls(), vec![FLASH_MODEL]);
    }

    #[tokio::test]
    async fn failing_flash_does_not_retry()
    {   let backend = ScriptedBackend::failing(&[FLASH_MODEL]);
        let result = orchestrator(backend.clone())
          .generate("hi", "flash", &ModelRegistry::generation())
          .await;
        assert_eq!(result, Err(Error::GenerationFailed));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn failing_pro_falls_back_once()
    {   let backend = ScriptedBackend::failing(&[GENERATION_PRO_MODEL]);
        let result = assert_ok!(
          orchestrator(backend.clone())
            .generate("hi", "pro", &ModelRegistry::generation())
            .await
        );
        assert_eq!(result.model_used, "flash_fallback");
        assert_eq!(backend.calls(), vec![GENERATION_PRO_MODEL, FLASH_MODEL]);
    }

    #[tokio::test]
    async fn pro_answer_without_text_falls_back()
    {   let backend = ScriptedBackend::failing_with(
          &[GENERATION_PRO_MODEL],
          Error::NoCandidatesInResponse
        );
        let result = assert_ok!(
          orchestrator(backend.clone())
            .generate("hi", "pro", &ModelRegistry::generation())
            .await
        );
        assert_eq!(result.model_used, "flash_fallback");
        assert_eq!(result.output, format!("{} says hi", FLASH_MODEL));
        assert_eq!(backend.calls(), vec![GENERATION_PRO_MODEL, FLASH_MODEL]);
    }

    #[tokio::test]
    async fn flash_answer_without_text_is_a_failure()
    {   let backend = ScriptedBackend::failing_with(
          &[FLASH_MODEL],
          Error::NoCandidatesInResponse
        );
        let err = assert_err!(
          orchestrator(backend.clone())
            .generate("hi", "flash", &ModelRegistry::generation())
            .await
        );
        assert_eq!(err, Error::GenerationFailed);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn pro_and_fallback_failing_stops_after_two_calls()
    {   let backend = ScriptedBackend::failing(
          &[GENERATION_PRO_MODEL, FLASH_MODEL]
        );
        let result = orchestrator(backend.clone())
          .generate("hi", "pro", &ModelRegistry::generation())
          .await;
        assert_eq!(result, Err(Error::GenerationFailed));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn unknown_key_never_reaches_backend()
    {   let backend = ScriptedBackend::failing(&[]);
        let err = assert_err!(
          orchestrator(backend.clone())
            .generate("hi", "ultra", &ModelRegistry::generation())
            .await
        );
        assert!(matches!(err, Error::InvalidModelKey { .. }));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn fallback_target_is_fixed_per_route()
    {   let backend = ScriptedBackend::failing(&["m/big"]);
        let registry = ModelRegistry::new([("small", "m/small"), ("big", "m/big")]);
        let route = FallbackRoute::new("big", "m/tiny", "tiny_fallback");
        let result = Orchestrator::new(backend.clone(), route)
          .generate("hi", "big", &registry)
          .await
          .unwrap();
        assert_eq!(result.model_used, "tiny_fallback");
        assert_eq!(backend.calls(), vec!["m/big", "m/tiny"]);
    }
}
