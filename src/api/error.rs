//! Mapping from crate errors to HTTP responses.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use log::warn;
use serde::Serialize;

use crate::error::Error;

pub const BODY_NOT_JSON: &str = "Request body must be JSON";

#[derive(Debug, Serialize)]
struct ErrorBody
{   error: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    allowed_values: Option<Vec<String>>
}

/// An error ready to be written as `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError
{   pub status: StatusCode
  , pub message: String
  , pub allowed_values: Option<Vec<String>>
}

impl ApiError
{   pub fn new(status: StatusCode, message: impl Into<String>) -> Self
    {   ApiError
        {   status
          , message: message.into()
          , allowed_values: None
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self
    {   ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generation endpoints report exhausted fallbacks with their own wording.
    pub fn from_generation(err: Error, failure_message: &str) -> Self
    {   match err
        {   Error::GenerationFailed => {
              ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
            }
          , other => ApiError::from(other)
        }
    }

    /// Detection failures surface as a bad gateway.
    pub fn from_scoring(err: Error) -> Self
    {   match err
        {   Error::InvalidUpstreamResponse(_) => ApiError::new(
              StatusCode::BAD_GATEWAY,
              "Invalid response from detection service"
            )
          , e if e.is_upstream() => ApiError::new(
              StatusCode::BAD_GATEWAY,
              "Detection service unavailable"
            )
          , other => ApiError::from(other)
        }
    }

    pub fn from_rejection(rejection: JsonRejection) -> Self
    {   warn!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE
        {   ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
        } else
        {   ApiError::bad_request(BODY_NOT_JSON)
        }
    }
}

impl From<Error> for ApiError
{   fn from(err: Error) -> Self
    {   match err
        {   Error::Validation(msg) => ApiError::bad_request(msg)
          , Error::InvalidModelKey { allowed, .. } => ApiError
            {   status: StatusCode::BAD_REQUEST
              , message: "Invalid 'ai_model'".to_string()
              , allowed_values: Some(allowed)
            }
          , Error::NotFound(what) => {
              ApiError::new(StatusCode::NOT_FOUND, format!("{} not found", what))
            }
          , Error::GenerationFailed => {
              ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Generation failed")
            }
          , e if e.is_upstream() => {
              ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())
            }
          , e => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

impl IntoResponse for ApiError
{   fn into_response(self) -> Response
    {   if self.status.is_server_error()
        {   log::error!("{} {}", self.status, self.message);
        }
        let body = ErrorBody
        {   error: self.message
          , allowed_values: self.allowed_values
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn invalid_model_key_carries_allowed_values()
    {   let err = ApiError::from(Error::InvalidModelKey
        {   key: "x".into()
          , allowed: vec!["flash".into(), "pro".into()]
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid 'ai_model'");
        assert_eq!(err.allowed_values, Some(vec!["flash".into(), "pro".into()]));
    }

    #[test]
    fn generation_failure_uses_endpoint_wording()
    {   let err = ApiError::from_generation(
          Error::GenerationFailed,
          "Humanization failed"
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Humanization failed");
    }

    #[test]
    fn scoring_failures_are_bad_gateway()
    {   assert_eq!(
          ApiError::from_scoring(Error::Timeout).status,
          StatusCode::BAD_GATEWAY
        );
        assert_eq!(
          ApiError::from_scoring(Error::InvalidUpstreamResponse("x".into())).message,
          "Invalid response from detection service"
        );
        assert_eq!(
          ApiError::from_scoring(Error::MissingApiKey("detector".into())).status,
          StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
