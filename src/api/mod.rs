//! HTTP surface for generation, humanization, scoring and documents.
//!
//! # Endpoints
//!
//! - `POST /generate` - Run a prompt against `flash` or `pro`
//! - `POST /humanize` - Rewrite content through the configured persona
//! - `POST /score` - AI-detection score as an integer percentage
//! - `POST /prepare_docx` - Assemble a `.docx` and return its id
//! - `GET /download/{file_id}` - Fetch a prepared document
//! - `GET /health` - Health check
//!
//! # cURL Examples
//!
//! ```bash
//! curl -X POST http://localhost:8080/generate \
//!      -H 'content-type: application/json' \
//!      -d '{"prompt": "Explain borrowing", "ai_model": "pro"}'
//!
//! curl -X POST http://localhost:8080/score \
//!      -H 'content-type: application/json' \
//!      -d '{"text": "Some paragraph"}'
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, serve};
pub use types::{
  AppState, GenerateBody, GenerateResponse, HealthResponse, HumanizeBody,
  HumanizeConstraints, HumanizeResponse, PrepareDocxResponse, ScoreBody,
  ScoreResponse,
};
