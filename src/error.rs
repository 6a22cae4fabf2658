use std::fmt;

/// Custom error type for quill operations
/// Implements Clone so one failure can be logged and returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request field missing or malformed
    Validation(String)
  , /// Model key not present in the registry used by the call-site
    InvalidModelKey
    {   key: String
      , allowed: Vec<String>
    }
  , /// API key is missing for a backend
    MissingApiKey(String)
  , /// HTTP transport error talking to a backend
    HttpError(String)
  , /// Backend returned a non-success status
    ApiError(String)
  , /// Failed to parse backend response
    ParseError(String)
  , /// No candidates in generative backend response
    NoCandidatesInResponse
  , /// Backend response lacked an expected field
    InvalidUpstreamResponse(String)
  , /// Generation failed after the fallback route was exhausted
    GenerationFailed
  , /// Timeout error
    Timeout
  , /// Filesystem error while writing or reading a document
    Io(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Requested artifact does not exist
    NotFound(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self
    {   Error::Validation(msg.into())
    }

    /// Whether the failure came from talking to an external backend
    pub fn is_upstream(&self) -> bool
    {   matches!(
          self
        , Error::HttpError(_)
          | Error::ApiError(_)
          | Error::ParseError(_)
          | Error::NoCandidatesInResponse
          | Error::InvalidUpstreamResponse(_)
          | Error::Timeout
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "Validation error: {}", msg)
            }
          , Error::InvalidModelKey { key, allowed } => {
              write!(f,
                "Invalid model key '{}', allowed: {}",
                key,
                allowed.join(", ")
              )
            }
          , Error::MissingApiKey(backend) => {
              write!(f, "Missing API key for: {}", backend)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoCandidatesInResponse => {
              write!(f, "API response contained no candidates")
            }
          , Error::InvalidUpstreamResponse(msg) => {
              write!(f, "Invalid upstream response: {}", msg)
            }
          , Error::GenerationFailed => {
              write!(f, "Generation failed")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::NotFound(what) => {
              write!(f, "Not found: {}", what)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn invalid_model_key_lists_allowed_values()
    {   let err = Error::InvalidModelKey
        {   key: "ultra".to_string()
          , allowed: vec!["flash".to_string(), "pro".to_string()]
        };
        assert_eq!(
          err.to_string(),
          "Invalid model key 'ultra', allowed: flash, pro"
        );
    }

    #[test]
    fn upstream_classification()
    {   assert!(Error::Timeout.is_upstream());
        assert!(Error::HttpError("reset".into()).is_upstream());
        assert!(!Error::validation("x").is_upstream());
        assert!(!Error::GenerationFailed.is_upstream());
    }

    #[test]
    fn io_errors_convert()
    {   let io = std::io::Error::new(
          std::io::ErrorKind::PermissionDenied,
          "denied"
        );
        assert_eq!(Error::from(io), Error::Io("denied".to_string()));
    }
}
