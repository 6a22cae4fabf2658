//! Configuration for quill backends, personas and the HTTP server

use std::path::PathBuf;
use std::str::FromStr;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::prompt::Persona;

pub const DEFAULT_GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DETECTOR_API_URL: &str
  = "https://api.sapling.ai/api/v1/aidetect";

/// Generative backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig
{   /// API key (GEMINI_API_KEY)
    pub api_key: Option<String>
  , /// API base URL
    pub api_base: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl Default for GeminiConfig
{   fn default() -> Self
    {   GeminiConfig
        {   api_key: None
          , api_base: DEFAULT_GEMINI_API_BASE.to_string()
          , timeout_secs: 60
        }
    }
}

/// Detection backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig
{   /// API key (DETECTOR_API_KEY)
    pub api_key: Option<String>
  , /// Scoring endpoint
    pub api_url: String
  , /// Per-call timeout in seconds
    pub timeout_secs: u64
}

impl Default for DetectorConfig
{   fn default() -> Self
    {   DetectorConfig
        {   api_key: None
          , api_url: DEFAULT_DETECTOR_API_URL.to_string()
          , timeout_secs: 10
        }
    }
}

/// Where prepared documents are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig
{   pub output_dir: PathBuf
}

impl Default for DocumentConfig
{   fn default() -> Self
    {   DocumentConfig
        {   output_dir: std::env::temp_dir()
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub host: String
  , pub port: u16
  , /// Maximum accepted request body in bytes
    pub max_request_body_bytes: usize
  , /// Allowed CORS origins, empty allows any
    pub cors_origins: Vec<String>
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   host: "0.0.0.0".to_string()
          , port: 8080
          , max_request_body_bytes: 10 * 1024 * 1024
          , cors_origins: vec![]
        }
    }
}

/// Quill configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuillConfig
{   pub gemini: GeminiConfig
  , pub detector: DetectorConfig
  , pub documents: DocumentConfig
  , pub server: ServerConfig
  , /// Persona used by the humanize endpoint
    pub persona: Persona
}

impl QuillConfig
{   /// Build configuration from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
      F: Fn(&str) -> Option<String>
    {   debug!("Loading configuration");
        let mut config = QuillConfig::default();
        let non_empty = |name: &str| {
          lookup(name).filter(|v| !v.trim().is_empty())
        };

        config.gemini.api_key = non_empty("GEMINI_API_KEY");
        if let Some(base) = non_empty("GEMINI_API_BASE")
        {   config.gemini.api_base
              = base.trim_end_matches('/').to_string();
        }
        parse_into(
          &lookup,
          "QUILL_GENERATION_TIMEOUT_SECS",
          &mut config.gemini.timeout_secs
        );

        config.detector.api_key = non_empty("DETECTOR_API_KEY");
        if let Some(url) = non_empty("DETECTOR_API_URL")
        {   config.detector.api_url = url;
        }
        parse_into(
          &lookup,
          "QUILL_SCORE_TIMEOUT_SECS",
          &mut config.detector.timeout_secs
        );

        parse_into(&lookup, "QUILL_PERSONA", &mut config.persona);

        if let Some(dir) = non_empty("QUILL_OUTPUT_DIR")
        {   config.documents.output_dir = PathBuf::from(dir);
        }

        if let Some(host) = non_empty("QUILL_HOST")
        {   config.server.host = host;
        }
        parse_into(&lookup, "QUILL_PORT", &mut config.server.port);
        parse_into(
          &lookup,
          "QUILL_MAX_REQUEST_BODY_BYTES",
          &mut config.server.max_request_body_bytes
        );
        if let Some(origins) = non_empty("QUILL_CORS_ORIGINS")
        {   config.server.cors_origins = origins
              .split(',')
              .map(|s| s.trim())
              .filter(|s| !s.is_empty())
              .map(|s| s.to_string())
              .collect();
        }

        config
    }
}

/// Overwrite `slot` with the parsed variable, keeping the default on
/// absent or unparseable input
fn parse_into<F, T>(lookup: &F, name: &str, slot: &mut T)
where
  F: Fn(&str) -> Option<String>
, T: FromStr
{   let Some(raw) = lookup(name) else { return };
    match raw.trim().parse::<T>()
    {   Ok(value) => *slot = value
      , Err(_) => {
          warn!("Ignoring unparseable {}='{}'", name, raw);
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup_from(
      pairs: &[(&str, &str)]
    ) -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment()
    {   let config = QuillConfig::from_lookup(|_| None);
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.api_base, DEFAULT_GEMINI_API_BASE);
        assert_eq!(config.detector.timeout_secs, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.persona, Persona::Editor);
    }

    #[test]
    fn reads_overrides()
    {   let config = QuillConfig::from_lookup(lookup_from(&[
          ("GEMINI_API_KEY", "g-key")
        , ("GEMINI_API_BASE", "http://localhost:9000/v1/")
        , ("QUILL_SCORE_TIMEOUT_SECS", "50")
        , ("QUILL_PERSONA", "ghostwriter")
        , ("QUILL_PORT", "9090")
        , ("QUILL_CORS_ORIGINS", "https://a.example, ,https://b.example")
        ]));
        assert_eq!(config.gemini.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.gemini.api_base, "http://localhost:9000/v1");
        assert_eq!(config.detector.timeout_secs, 50);
        assert_eq!(config.persona, Persona::Ghostwriter);
        assert_eq!(config.server.port, 9090);
        assert_eq!(
          config.server.cors_origins,
          vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn bad_values_keep_defaults()
    {   let config = QuillConfig::from_lookup(lookup_from(&[
          ("QUILL_PORT", "not-a-port")
        , ("QUILL_PERSONA", "poet")
        , ("GEMINI_API_KEY", "   ")
        ]));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.persona, Persona::Editor);
        assert!(config.gemini.api_key.is_none());
    }
}
