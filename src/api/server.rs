//! API server setup and configuration.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
  Router,
  extract::{DefaultBodyLimit, Request},
  http::HeaderValue,
  middleware::{self, Next},
  response::Response,
  routing::{get, post},
};
use log::{info, warn};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  limit::RequestBodyLimitLayer,
};

use crate::config::{QuillConfig, ServerConfig};

use super::{
  handlers::{
    download_handler, generate_handler, health_handler, humanize_handler,
    prepare_docx_handler, score_handler,
  },
  types::AppState,
};

fn cors_layer(origins: &[String]) -> CorsLayer
{   let parsed: Vec<HeaderValue> = origins
      .iter()
      .filter_map(|o| o.parse::<HeaderValue>().ok())
      .collect();

    if parsed.is_empty()
    {   if !origins.is_empty()
        {   warn!("QUILL_CORS_ORIGINS contained no valid origins, allowing any");
        }
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else
    {   info!("CORS configured with {} allowed origin(s)", parsed.len());
        CorsLayer::new()
          .allow_origin(AllowOrigin::list(parsed))
          .allow_methods(Any)
          .allow_headers(Any)
    }
}

async fn log_requests(request: Request, next: Next) -> Response
{   let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
      "{} {} -> {} ({} ms)",
      method,
      path,
      response.status().as_u16(),
      started.elapsed().as_millis()
    );
    response
}

/// Create the API router with all routes configured.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router
{   Router::new()
      .route("/generate", post(generate_handler))
      .route("/humanize", post(humanize_handler))
      .route("/score", post(score_handler))
      .route("/prepare_docx", post(prepare_docx_handler))
      .route("/download/{file_id}", get(download_handler))
      .route("/health", get(health_handler))
      .layer(DefaultBodyLimit::max(server.max_request_body_bytes))
      .layer(RequestBodyLimitLayer::new(server.max_request_body_bytes))
      .layer(cors_layer(&server.cors_origins))
      .layer(middleware::from_fn(log_requests))
      .with_state(state)
}

/// Build the real backends from `config` and serve until shutdown.
pub async fn serve(config: QuillConfig) -> Result<(), crate::error::Error>
{   let state = AppState::from_config(&config)?;
    let router = create_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
      .parse()
      .map_err(|e| crate::error::Error::InvalidConfiguration(
        format!("bad listen address: {}", e)
      ))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
      "quill listening on {} (persona: {}, output: {})",
      addr,
      config.persona,
      config.documents.output_dir.display()
    );

    axum::serve(listener, router)
      .with_graceful_shutdown(shutdown_signal())
      .await?;
    info!("quill shut down");
    Ok(())
}

async fn shutdown_signal()
{   if let Err(e) = tokio::signal::ctrl_c().await
    {   warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
