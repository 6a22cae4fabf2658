//! API request handlers.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::document::{DocumentSpec, DOCX_CONTENT_TYPE, DOCX_EXTENSION};
use crate::prompt::StyleParameters;
use crate::request::GenerationRequest;

use super::{
  error::{ApiError, BODY_NOT_JSON},
  types::{
    requested_model_key, AppState, GenerateBody, GenerateResponse,
    HealthResponse, HumanizeBody, HumanizeResponse, PrepareDocxResponse,
    ScoreBody, ScoreResponse,
  },
};

const DEFAULT_HUMANIZE_MODEL: &str = "flash";

/// Every body must be a JSON object before it is read into `T`.
fn object_body<T: DeserializeOwned>(
  payload: Result<Json<Value>, JsonRejection>
) -> Result<T, ApiError>
{   let Json(value) = payload.map_err(ApiError::from_rejection)?;
    if !value.is_object()
    {   warn!("Rejected request body: not a JSON object");
        return Err(ApiError::bad_request(BODY_NOT_JSON));
    }
    serde_json::from_value(value).map_err(|e| {
      warn!("Rejected request body: {}", e);
      ApiError::bad_request(BODY_NOT_JSON)
    })
}

/// POST /generate
///
/// Sends `prompt` to the model selected by `ai_model`. A failing `pro`
/// call is retried once on the flash model and reported as
/// `flash_fallback`.
pub async fn generate_handler(
  State(state): State<AppState>
, payload: Result<Json<Value>, JsonRejection>
) -> Result<Json<GenerateResponse>, ApiError>
{   let body: GenerateBody = object_body(payload)?;
    let request = GenerationRequest::new(
      body.prompt,
      requested_model_key(body.ai_model)
    )?;

    let result = state.orchestrator
      .generate(
        &request.prompt,
        &request.model_key,
        &state.generation_registry
      )
      .await
      .map_err(|e| ApiError::from_generation(e, "Generation failed"))?;

    info!("Generated {} chars with {}", result.output.len(), result.model_used);
    Ok(Json(GenerateResponse
    {   model_used: result.model_used
      , output: result.output
    }))
}

/// POST /humanize
///
/// Rewrites `content` through the deployment's persona template.
pub async fn humanize_handler(
  State(state): State<AppState>
, payload: Result<Json<Value>, JsonRejection>
) -> Result<Json<HumanizeResponse>, ApiError>
{   let body: HumanizeBody = object_body(payload)?;
    let content = body.content
      .filter(|c| !c.trim().is_empty())
      .ok_or_else(|| ApiError::bad_request("Missing 'content'"))?;
    let model_key = requested_model_key(body.ai_model)
      .unwrap_or_else(|| DEFAULT_HUMANIZE_MODEL.to_string());

    // Reject bad keys before spending time on the prompt.
    state.humanization_registry.resolve(&model_key)?;

    let style = StyleParameters::from_optional(
      body.audience,
      body.tone,
      body.purpose,
      body.constraints.and_then(|c| c.length_change)
    );
    let prompt = state.persona.build(&content, &style);
    debug!("Humanizing with {} persona, style {:?}", state.persona, style);

    let result = state.orchestrator
      .generate(&prompt, &model_key, &state.humanization_registry)
      .await
      .map_err(|e| ApiError::from_generation(e, "Humanization failed"))?;

    info!("Humanized {} chars with {}", content.len(), result.model_used);
    Ok(Json(HumanizeResponse { content: result.output }))
}

/// POST /score
pub async fn score_handler(
  State(state): State<AppState>
, payload: Result<Json<Value>, JsonRejection>
) -> Result<Json<ScoreResponse>, ApiError>
{   let body: ScoreBody = object_body(payload)?;
    let text = body.text.unwrap_or_default();
    let score = state.scorer
      .score(&text)
      .await
      .map_err(ApiError::from_scoring)?;
    Ok(Json(ScoreResponse { score }))
}

/// POST /prepare_docx
///
/// Lays out the document and saves it under a fresh id. The file is left
/// in the output directory for the caller to fetch.
pub async fn prepare_docx_handler(
  State(state): State<AppState>
, payload: Result<Json<Value>, JsonRejection>
) -> Result<Json<PrepareDocxResponse>, ApiError>
{   let spec: DocumentSpec = object_body(payload)?;
    spec.validate()?;

    let store = state.documents.clone();
    let prepared = tokio::task::spawn_blocking(move || store.prepare(&spec))
      .await
      .map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      })??;

    Ok(Json(PrepareDocxResponse
    {   status: "success".to_string()
      , file_id: prepared.file_id.to_string()
      , message: "Document prepared successfully".to_string()
    }))
}

/// GET /download/{file_id}
pub async fn download_handler(
  State(state): State<AppState>
, Path(file_id): Path<String>
) -> Result<Response, ApiError>
{   let path = state.documents.locate(&file_id)?;
    let bytes = tokio::fs::read(&path)
      .await
      .map_err(crate::error::Error::from)?;
    let file_name = path
      .file_name()
      .and_then(|n| n.to_str())
      .map(|n| n.to_string())
      .unwrap_or_else(|| format!("document.{}", DOCX_EXTENSION));
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    Ok((
      [
        (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string())
      , (header::CONTENT_DISPOSITION, disposition)
      ],
      bytes
    ).into_response())
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse>
{   Json(HealthResponse { status: "ok".to_string() })
}
