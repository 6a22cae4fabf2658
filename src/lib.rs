pub mod error;
pub mod config;
pub mod registry;
pub mod prompt;
pub mod providers;
pub mod request;
pub mod failover;
pub mod scoring;
pub mod document;
pub mod api;

/*

quill is a thin HTTP service over a generative-text backend (Gemini),
an AI-detection scorer and a .docx writer.

quill/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and crate overview
│   ├── main.rs         # Binary: logging, config, serve
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # Environment configuration
│   ├── registry.rs     # Model key -> backend model id, per call-site
│   ├── prompt.rs       # Persona templates and style parameters
│   ├── providers/      # Backend traits and HTTP clients
│   │   ├── mod.rs
│   │   ├── gemini.rs
│   │   └── detector.rs
│   ├── request.rs      # Generation request/result types
│   ├── failover.rs     # One-shot fallback orchestration
│   ├── scoring.rs      # Detection score pass-through
│   ├── document.rs     # Footer rules and the .docx writer
│   └── api/            # axum routes, handlers, error mapping
└── tests/              # Router-level integration tests

*/

pub use config::QuillConfig;
pub use document::{DocumentSpec, DocumentStore};
pub use error::Error;
pub use failover::{FallbackRoute, Orchestrator};
pub use prompt::{Persona, StyleParameters};
pub use providers::{DetectionBackend, GenerativeBackend};
pub use registry::ModelRegistry;
pub use request::{GenerationRequest, GenerationResult};
pub use scoring::Scorer;
