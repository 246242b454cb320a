use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gaspar::app::build_router;
use gaspar::config::AppConfig;
use gaspar::db;
use gaspar::services::ai::gemini::GeminiProvider;
use gaspar::services::ai::TextModel;
use gaspar::services::places::google::GoogleMapsProvider;
use gaspar::services::places::PlacesProvider;
use gaspar::services::random::{ThreadDice, TokioClock};
use gaspar::services::rate_limit::RateLimiter;
use gaspar::services::speech::deepgram::DeepgramProvider;
use gaspar::services::speech::SpeechToText;
use gaspar::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let speech: Option<Box<dyn SpeechToText>> = if config.deepgram_api_key.is_empty() {
        tracing::warn!("DEEPGRAM_API_KEY not set, transcription disabled");
        None
    } else {
        Some(Box::new(DeepgramProvider::new(config.deepgram_api_key.clone())))
    };

    let places: Option<Box<dyn PlacesProvider>> = if config.google_maps_api_key.is_empty() {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set, using sample vendors");
        None
    } else {
        Some(Box::new(GoogleMapsProvider::new(
            config.google_maps_api_key.clone(),
        )))
    };

    let text_model: Option<Box<dyn TextModel>> = if config.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY not set, search term refinement disabled");
        None
    } else {
        tracing::info!("using Gemini model {}", config.gemini_model);
        Some(Box::new(GeminiProvider::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
        )))
    };

    if config.fast_demo {
        tracing::info!("fast demo mode: simulation delays shortened");
    }

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        limiter: RateLimiter::new(config.rate_limit_max, config.rate_limit_window_secs),
        config: config.clone(),
        speech,
        places,
        text_model,
        dice: Arc::new(ThreadDice),
        clock: Arc::new(TokioClock),
        runs: Mutex::new(HashMap::new()),
        events_tx,
    });

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
