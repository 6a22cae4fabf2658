use log::{error, info};

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = quill::QuillConfig::from_env();
    if config.gemini.api_key.is_none()
    {   log::warn!("GEMINI_API_KEY is not set, generation will fail");
    }
    if config.detector.api_key.is_none()
    {   log::warn!("DETECTOR_API_KEY is not set, scoring will fail");
    }

    info!("Starting quill {}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = quill::api::serve(config).await
    {   error!("quill exited: {}", e);
        std::process::exit(1);
    }
}
